use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub username: String,
}

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Paginated listing envelope. `total` counts every matching record,
/// independent of the returned page slice.
#[derive(Serialize, Deserialize, Debug)]
pub struct Paginated<T> {
    pub total: u32,
    pub page: u32,
    pub limit: u32,
    pub data: Vec<T>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    pub date: i64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Deserialize, Debug)]
pub struct CreateExpensePayload {
    pub user: String,
    pub amount: f64,
    pub description: String,
    pub date: String,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateExpensePayload {
    pub user: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GetExpensesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Income {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub source: Option<String>,
    pub date: i64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Deserialize, Debug)]
pub struct CreateIncomePayload {
    pub user: String,
    pub amount: f64,
    pub source: Option<String>,
    pub date: String,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateIncomePayload {
    pub user: Option<String>,
    pub amount: Option<f64>,
    pub source: Option<String>,
    pub date: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GetIncomesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub source: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SavingGoal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target_amount: Option<f64>,
    pub current_amount: f64,
    pub deadline: Option<i64>,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A saving goal as returned by listings, with the derived progress
/// percentage. `progress` is null when the goal has no positive target.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SavingGoalWithProgress {
    #[serde(flatten)]
    pub goal: SavingGoal,
    pub progress: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct CreateSavingPayload {
    pub user: String,
    pub title: String,
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateSavingPayload {
    pub user: Option<String>,
    pub title: Option<String>,
    pub target_amount: Option<f64>,
    pub current_amount: Option<f64>,
    pub deadline: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GetSavingsExportQuery {
    pub title: Option<String>,
    pub min_target_amount: Option<f64>,
    pub max_target_amount: Option<f64>,
    pub min_current_amount: Option<f64>,
    pub max_current_amount: Option<f64>,
    pub start_deadline: Option<String>,
    pub end_deadline: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct BalanceQuery {
    pub month: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SummaryQuery {
    pub month: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MonthlyBalance {
    pub month: String,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

/// Inclusive [from, to] range, unix seconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub from: i64,
    pub to: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GoalProgress {
    pub title: String,
    pub target_amount: Option<f64>,
    pub current_amount: f64,
    pub progress_percent: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SavingsSummary {
    pub total_contributed: f64,
    pub goals: Vec<GoalProgress>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FinancialSummary {
    pub period: Period,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    pub savings: SavingsSummary,
}
