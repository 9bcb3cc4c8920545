#![allow(dead_code)]

use tempfile::{TempDir, tempdir};
use uuid::Uuid;

use finance_tracker_server::database::{Db, init_db};
use finance_tracker_server::expenses::create_expense;
use finance_tracker_server::incomes::create_income;
use finance_tracker_server::models::{
    CreateExpensePayload, CreateIncomePayload, CreateSavingPayload,
};
use finance_tracker_server::savings::create_saving;

/// Fresh database in a temp directory with one seeded user. The TempDir
/// must stay alive for the duration of the test.
pub async fn setup_test_environment() -> (Db, String, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_db(&data_path)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize database at {}: {}", data_path, e));

    let user_id = create_test_user(&db, "user@example.com", "testuser").await;

    (db, user_id, temp_dir)
}

pub async fn create_test_user(db: &Db, email: &str, username: &str) -> String {
    let user_id = Uuid::new_v4().to_string();

    let conn = db.write().await;
    conn.execute(
        "INSERT INTO users (id, email, username, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        (user_id.as_str(), email, username, "test-hash", 0i64, 0i64),
    )
    .await
    .unwrap_or_else(|e| panic!("Failed to insert test user {}: {}", email, e));

    user_id
}

pub async fn create_test_expense(
    db: &Db,
    user_id: &str,
    amount: f64,
    description: &str,
    date: &str,
) -> String {
    let payload = CreateExpensePayload {
        user: user_id.to_string(),
        amount,
        description: description.to_string(),
        date: date.to_string(),
        note: None,
    };

    create_expense(db, &payload)
        .await
        .unwrap_or_else(|e| panic!("Failed to create test expense '{}': {}", description, e.1))
        .id
}

pub async fn create_test_income(
    db: &Db,
    user_id: &str,
    amount: f64,
    source: Option<&str>,
    date: &str,
) -> String {
    let payload = CreateIncomePayload {
        user: user_id.to_string(),
        amount,
        source: source.map(str::to_string),
        date: date.to_string(),
        note: None,
    };

    create_income(db, &payload)
        .await
        .unwrap_or_else(|e| panic!("Failed to create test income: {}", e.1))
        .id
}

pub async fn create_test_saving(
    db: &Db,
    user_id: &str,
    title: &str,
    target_amount: Option<f64>,
    current_amount: f64,
    deadline: Option<&str>,
) -> String {
    let payload = CreateSavingPayload {
        user: user_id.to_string(),
        title: title.to_string(),
        target_amount,
        current_amount,
        deadline: deadline.map(str::to_string),
        note: None,
    };

    create_saving(db, &payload)
        .await
        .unwrap_or_else(|e| panic!("Failed to create test saving goal '{}': {}", title, e.1))
        .id
}
