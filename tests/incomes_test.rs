/*!
 * Income Store Integration Tests
 *
 * Covers the income record store: creation, the source filter that only
 * incomes carry, range filters, partial updates, and deletion.
 *
 * All tests use isolated temporary databases for complete test isolation.
 */

mod common;

use axum::http::StatusCode;
use common::*;

use finance_tracker_server::incomes::{
    create_income, delete_income_by_id, find_incomes, find_incomes_for_export, update_income_by_id,
};
use finance_tracker_server::models::{CreateIncomePayload, UpdateIncomePayload};
use finance_tracker_server::query::{Pagination, RecordFilter};
use finance_tracker_server::utils::parse_date;

#[tokio::test]
async fn create_then_find_round_trip() {
    let (db, user_id, _temp_dir) = setup_test_environment().await;

    let payload = CreateIncomePayload {
        user: user_id.clone(),
        amount: 3200.0,
        source: Some("salary".to_string()),
        date: "2025-06-01".to_string(),
        note: Some("June paycheck".to_string()),
    };
    let created = create_income(&db, &payload).await.unwrap();

    let result = find_incomes(&db, &user_id, &RecordFilter::default(), Pagination::default())
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.data[0].id, created.id);
    assert_eq!(result.data[0].source.as_deref(), Some("salary"));
    assert_eq!(result.data[0].note.as_deref(), Some("June paycheck"));
}

#[tokio::test]
async fn source_filter_is_exact_match() {
    let (db, user_id, _temp_dir) = setup_test_environment().await;

    create_test_income(&db, &user_id, 3200.0, Some("salary"), "2025-06-01").await;
    create_test_income(&db, &user_id, 150.0, Some("freelance"), "2025-06-10").await;
    create_test_income(&db, &user_id, 80.0, None, "2025-06-15").await;

    let filter = RecordFilter {
        source: Some("salary".to_string()),
        ..Default::default()
    };
    let result = find_incomes(&db, &user_id, &filter, Pagination::default())
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.data[0].amount, 3200.0);
}

#[tokio::test]
async fn absent_filters_match_everything() {
    let (db, user_id, _temp_dir) = setup_test_environment().await;

    create_test_income(&db, &user_id, 3200.0, Some("salary"), "2025-06-01").await;
    create_test_income(&db, &user_id, 150.0, Some("freelance"), "2025-06-10").await;
    create_test_income(&db, &user_id, -40.0, None, "2025-06-15").await;

    let result = find_incomes(&db, &user_id, &RecordFilter::default(), Pagination::default())
        .await
        .unwrap();

    assert_eq!(result.total, 3);
}

#[tokio::test]
async fn amount_and_date_filters_compose() {
    let (db, user_id, _temp_dir) = setup_test_environment().await;

    create_test_income(&db, &user_id, 3200.0, Some("salary"), "2025-06-01").await;
    create_test_income(&db, &user_id, 150.0, Some("freelance"), "2025-06-10").await;
    create_test_income(&db, &user_id, 90.0, Some("freelance"), "2025-07-10").await;

    let filter = RecordFilter {
        min_amount: Some(100.0),
        end_date: Some(parse_date("2025-06-30").unwrap()),
        ..Default::default()
    };
    let result = find_incomes(&db, &user_id, &filter, Pagination::default())
        .await
        .unwrap();

    assert_eq!(result.total, 2);
}

#[tokio::test]
async fn find_rejects_malformed_owner_id() {
    let (db, _user_id, _temp_dir) = setup_test_environment().await;

    let result = find_incomes(
        &db,
        "not-a-uuid",
        &RecordFilter::default(),
        Pagination::default(),
    )
    .await;

    let (status, message) = result.err().unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Invalid user ID");
}

#[tokio::test]
async fn update_replaces_source_and_keeps_amount() {
    let (db, user_id, _temp_dir) = setup_test_environment().await;

    let income_id = create_test_income(&db, &user_id, 150.0, Some("freelance"), "2025-06-10").await;

    let updates = UpdateIncomePayload {
        source: Some("consulting".to_string()),
        ..Default::default()
    };
    let updated = update_income_by_id(&db, &income_id, &updates).await.unwrap();

    assert_eq!(updated.source.as_deref(), Some("consulting"));
    assert_eq!(updated.amount, 150.0);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let (db, _user_id, _temp_dir) = setup_test_environment().await;

    let (status, message) = update_income_by_id(
        &db,
        &uuid::Uuid::new_v4().to_string(),
        &UpdateIncomePayload::default(),
    )
    .await
    .err()
    .unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message, "Income not found");
}

#[tokio::test]
async fn delete_returns_prior_state() {
    let (db, user_id, _temp_dir) = setup_test_environment().await;

    let income_id = create_test_income(&db, &user_id, 150.0, Some("freelance"), "2025-06-10").await;

    let removed = delete_income_by_id(&db, &income_id).await.unwrap();
    assert_eq!(removed.id, income_id);

    let (status, _) = delete_income_by_id(&db, &income_id).await.err().unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_honors_source_filter_without_pagination() {
    let (db, user_id, _temp_dir) = setup_test_environment().await;

    for i in 0..15 {
        create_test_income(&db, &user_id, 100.0 + i as f64, Some("salary"), "2025-06-01").await;
    }
    create_test_income(&db, &user_id, 55.0, Some("freelance"), "2025-06-01").await;

    let filter = RecordFilter {
        source: Some("salary".to_string()),
        ..Default::default()
    };
    let incomes = find_incomes_for_export(&db, &user_id, &filter).await.unwrap();

    assert_eq!(incomes.len(), 15);
}
