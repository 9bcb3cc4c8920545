//! Financial aggregation: monthly income/expense sums, period summaries,
//! and savings progress.
//!
//! Monthly sums run over the half-open interval `[first of month, first of
//! next month)`; the period summary uses inclusive `[from, to]` bounds.
//! The asymmetry is observed behavior carried over from the product, not
//! an accident. Every reduction here is request-scoped: reference dates
//! come in as parameters and nothing is cached between calls.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use time::{Date, Month, OffsetDateTime};
use tower_sessions::Session;

use crate::auth::get_current_user;
use crate::constants::*;
use crate::database::Db;
use crate::models::{
    BalanceQuery, FinancialSummary, GoalProgress, MonthlyBalance, Period, SavingsSummary,
    SummaryQuery,
};
use crate::savings::get_saving_goals_by_user;
use crate::utils::{db_error, db_error_with_context, parse_date, validate_user_id};

fn first_of_month(year: i32, month: Month) -> i64 {
    // Saturates past the supported calendar range (year > 9999).
    Date::from_calendar_date(year, month, 1)
        .map(|date| date.midnight().assume_utc().unix_timestamp())
        .unwrap_or(i64::MAX)
}

fn next_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        _ => (year, month.next()),
    }
}

/// Half-open `[start, end)` bounds of the calendar month containing
/// `date`, in unix seconds (UTC).
pub fn month_bounds(date: Date) -> (i64, i64) {
    let (next_year, next) = next_month(date.year(), date.month());
    (
        first_of_month(date.year(), date.month()),
        first_of_month(next_year, next),
    )
}

/// Inclusive first-to-last-second span of one calendar month.
pub fn calendar_month_span(year: i32, month: Month) -> (i64, i64) {
    let (next_year, next) = next_month(year, month);
    (
        first_of_month(year, month),
        first_of_month(next_year, next) - 1,
    )
}

/// Parse a `YYYY-MM` month token.
pub fn parse_month_token(token: &str) -> Result<(i32, Month), (StatusCode, String)> {
    let invalid = || (StatusCode::BAD_REQUEST, ERR_INVALID_DATE.to_string());
    let (year, month) = token.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    if !(0..=9999).contains(&year) {
        return Err(invalid());
    }
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;
    Ok((year, month))
}

/// Resolve the summary period: a `month` token wins over explicit bounds;
/// absent bounds default to the current calendar month.
pub fn resolve_period(query: &SummaryQuery, today: Date) -> Result<Period, (StatusCode, String)> {
    if let Some(month) = &query.month {
        let (year, month) = parse_month_token(month)?;
        let (from, to) = calendar_month_span(year, month);
        return Ok(Period { from, to });
    }

    let (default_from, default_to) = calendar_month_span(today.year(), today.month());
    let from = match &query.from {
        Some(value) => parse_date(value)?,
        None => default_from,
    };
    let to = match &query.to {
        Some(value) => parse_date(value)?,
        None => default_to,
    };
    Ok(Period { from, to })
}

/// `round(clamp(current / target * 100, 0, 100))`; null without a
/// positive target.
pub fn progress_percent(target_amount: Option<f64>, current_amount: f64) -> Option<u32> {
    match target_amount {
        Some(target) if target > 0.0 => {
            Some((current_amount / target * 100.0).clamp(0.0, 100.0).round() as u32)
        }
        _ => None,
    }
}

async fn monthly_sum(
    db: &Db,
    table: &str,
    user_id: &str,
    reference: Date,
) -> Result<f64, (StatusCode, String)> {
    validate_user_id(user_id)?;
    let (start, end) = month_bounds(reference);

    let conn = db.read().await;
    let sql = format!(
        "SELECT COALESCE(SUM(amount), 0.0) FROM {} WHERE user_id = ? AND date >= ? AND date < ?",
        table
    );
    let mut rows = conn
        .query(&sql, (user_id, start, end))
        .await
        .map_err(|e| db_error_with_context(&format!("monthly sum on {} failed: {}", table, e)))?;

    match rows.next().await.map_err(|_| db_error())? {
        Some(row) => row.get(0).map_err(|_| db_error()),
        None => Ok(0.0),
    }
}

/// Total income of `user_id` in the calendar month containing
/// `reference`. 0 for an empty month, never an error.
pub async fn monthly_income_sum(
    db: &Db,
    user_id: &str,
    reference: Date,
) -> Result<f64, (StatusCode, String)> {
    monthly_sum(db, "incomes", user_id, reference).await
}

/// Total expenses of `user_id` in the calendar month containing
/// `reference`.
pub async fn monthly_expense_sum(
    db: &Db,
    user_id: &str,
    reference: Date,
) -> Result<f64, (StatusCode, String)> {
    monthly_sum(db, "expenses", user_id, reference).await
}

async fn amounts_in_period(
    db: &Db,
    table: &str,
    user_id: &str,
    period: Period,
) -> Result<Vec<f64>, (StatusCode, String)> {
    let conn = db.read().await;
    let sql = format!(
        "SELECT amount FROM {} WHERE user_id = ? AND date BETWEEN ? AND ?",
        table
    );
    let mut rows = conn
        .query(&sql, (user_id, period.from, period.to))
        .await
        .map_err(|e| db_error_with_context(&format!("period query on {} failed: {}", table, e)))?;

    let mut amounts = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        let amount: f64 = row.get(0).map_err(|_| db_error())?;
        amounts.push(amount);
    }
    Ok(amounts)
}

/// Income and expense totals over the inclusive period plus the savings
/// snapshot. The snapshot covers every goal of the owner regardless of
/// the period filter.
pub async fn build_financial_summary(
    db: &Db,
    user_id: &str,
    period: Period,
) -> Result<FinancialSummary, (StatusCode, String)> {
    validate_user_id(user_id)?;

    let incomes = amounts_in_period(db, "incomes", user_id, period).await?;
    let expenses = amounts_in_period(db, "expenses", user_id, period).await?;
    let total_income: f64 = incomes.iter().sum();
    let total_expenses: f64 = expenses.iter().sum();

    let goals = get_saving_goals_by_user(db, user_id).await?;
    let total_contributed: f64 = goals.iter().map(|g| g.goal.current_amount).sum();
    let goals = goals
        .into_iter()
        .map(|g| GoalProgress {
            title: g.goal.title,
            target_amount: g.goal.target_amount,
            current_amount: g.goal.current_amount,
            progress_percent: g.progress,
        })
        .collect();

    Ok(FinancialSummary {
        period,
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses,
        savings: SavingsSummary {
            total_contributed,
            goals,
        },
    })
}

pub async fn balance(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<BalanceQuery>,
) -> Result<(StatusCode, Json<MonthlyBalance>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let month = query.month.ok_or((
        StatusCode::BAD_REQUEST,
        "Month is required in query string (e.g. ?month=2025-06-01)".to_string(),
    ))?;
    let timestamp = parse_date(&month)?;
    let date = OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|_| (StatusCode::BAD_REQUEST, ERR_INVALID_DATE.to_string()))?
        .date();

    let total_income = monthly_income_sum(&db, &user.id, date).await?;
    let total_expense = monthly_expense_sum(&db, &user.id, date).await?;

    Ok((
        StatusCode::OK,
        Json(MonthlyBalance {
            month: format!("{:04}-{:02}", date.year(), date.month() as u8),
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }),
    ))
}

pub async fn summary(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<SummaryQuery>,
) -> Result<(StatusCode, Json<FinancialSummary>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let today = OffsetDateTime::now_utc().date();
    let period = resolve_period(&query, today)?;
    let summary = build_financial_summary(&db, &user.id, period).await?;

    Ok((StatusCode::OK, Json(summary)))
}
