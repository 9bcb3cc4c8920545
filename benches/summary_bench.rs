use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tempfile::tempdir;
use time::macros::{date, datetime};
use tokio::runtime::Runtime;
use uuid::Uuid;

use finance_tracker_server::database::{Db, init_db};
use finance_tracker_server::expenses::find_expenses;
use finance_tracker_server::finance::{build_financial_summary, monthly_income_sum};
use finance_tracker_server::models::Period;
use finance_tracker_server::query::{Pagination, RecordFilter};
use finance_tracker_server::utils::opt_text;

// Benchmark constants
const BENCH_RECORD_COUNT: usize = 1000;

fn bench_base_timestamp() -> i64 {
    datetime!(2025-06-01 0:00 UTC).unix_timestamp()
}

async fn setup_benchmark_environment() -> (Db, String, tempfile::TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir.path().to_str().unwrap().to_string();

    let db = init_db(&data_path).await.unwrap();
    let user_id = Uuid::new_v4().to_string();

    let conn = db.write().await;
    conn.execute(
        "INSERT INTO users (id, email, username, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        (user_id.as_str(), "bench@example.com", "bench", "bench-hash", 0i64, 0i64),
    )
    .await
    .unwrap();
    drop(conn);

    (db, user_id, temp_dir)
}

async fn create_benchmark_records(db: &Db, user_id: &str, count: usize) {
    let base = bench_base_timestamp();
    let conn = db.write().await;

    for i in 0..count {
        // Spread records over several weeks so the month window only
        // covers part of the set.
        let date = base + (i as i64) * 3600;
        let amount = 10.0 + (i % 100) as f64;

        conn.execute(
            "INSERT INTO incomes (id, user_id, amount, source, date, note, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                Uuid::new_v4().to_string(),
                user_id,
                amount,
                format!("source_{}", i % 10),
                date,
                opt_text(None),
                date,
                date,
            ),
        )
        .await
        .unwrap();

        conn.execute(
            "INSERT INTO expenses (id, user_id, amount, description, date, note, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                Uuid::new_v4().to_string(),
                user_id,
                amount / 2.0,
                format!("Benchmark Expense {}", i),
                date,
                opt_text(None),
                date,
                date,
            ),
        )
        .await
        .unwrap();
    }
}

async fn benchmark_monthly_sum(db: &Db, user_id: &str) {
    let total = monthly_income_sum(db, user_id, date!(2025 - 06 - 15))
        .await
        .unwrap();

    black_box(total);
}

async fn benchmark_filtered_find(db: &Db, user_id: &str) {
    let filter = RecordFilter {
        min_amount: Some(20.0),
        max_amount: Some(80.0),
        start_date: Some(bench_base_timestamp()),
        end_date: Some(bench_base_timestamp() + 500 * 3600),
        ..Default::default()
    };
    let page = find_expenses(db, user_id, &filter, Pagination { page: 2, limit: 50 })
        .await
        .unwrap();

    black_box(page.total);
}

async fn benchmark_financial_summary(db: &Db, user_id: &str) {
    let period = Period {
        from: bench_base_timestamp(),
        to: datetime!(2025-07-01 0:00 UTC).unix_timestamp() - 1,
    };
    let summary = build_financial_summary(db, user_id, period).await.unwrap();

    black_box(summary.net_balance);
}

fn criterion_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    // Setup benchmark data once
    let (db, user_id, _temp_dir) = rt.block_on(setup_benchmark_environment());
    rt.block_on(create_benchmark_records(&db, &user_id, BENCH_RECORD_COUNT));

    c.bench_function("monthly_income_sum", |b| {
        b.to_async(&rt).iter(|| benchmark_monthly_sum(&db, &user_id))
    });

    c.bench_function("filtered_find", |b| {
        b.to_async(&rt).iter(|| benchmark_filtered_find(&db, &user_id))
    });

    c.bench_function("financial_summary", |b| {
        b.to_async(&rt)
            .iter(|| benchmark_financial_summary(&db, &user_id))
    });

    // Keep temp_dir alive until the end
    std::mem::forget(_temp_dir);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
