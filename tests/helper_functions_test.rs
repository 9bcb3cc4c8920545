/*!
 * Helper Functions Unit Tests
 *
 * Unit tests for the pure helpers behind the query builder and the
 * aggregation engine: pagination parsing, predicate composition, month
 * boundary arithmetic, period resolution, progress percentages, and date
 * parsing. Nothing here touches a database.
 */

use time::Month;
use time::macros::{date, datetime};

use finance_tracker_server::constants::{DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use finance_tracker_server::finance::{
    calendar_month_span, month_bounds, parse_month_token, progress_percent, resolve_period,
};
use finance_tracker_server::models::SummaryQuery;
use finance_tracker_server::query::{Pagination, QueryPredicate, RecordFilter, record_predicate};
use finance_tracker_server::utils::{format_date, parse_date};

const OWNER: &str = "3f2c1d6e-9a4b-4c8d-b1e2-7f6a5d4c3b2a";

#[test]
fn pagination_defaults_when_absent() {
    let pagination = Pagination::from_raw(None, None);

    assert_eq!(pagination.page, DEFAULT_PAGE);
    assert_eq!(pagination.limit, DEFAULT_PAGE_LIMIT);
}

#[test]
fn pagination_defaults_when_non_numeric() {
    let pagination = Pagination::from_raw(Some("abc"), Some("ten"));

    assert_eq!(pagination.page, DEFAULT_PAGE);
    assert_eq!(pagination.limit, DEFAULT_PAGE_LIMIT);
}

#[test]
fn pagination_rejects_zero_values() {
    let pagination = Pagination::from_raw(Some("0"), Some("0"));

    assert_eq!(pagination.page, DEFAULT_PAGE);
    assert_eq!(pagination.limit, DEFAULT_PAGE_LIMIT);
}

#[test]
fn pagination_caps_oversized_limit() {
    let pagination = Pagination::from_raw(Some("2"), Some("100000"));

    assert_eq!(pagination.page, 2);
    assert_eq!(pagination.limit, DEFAULT_PAGE_LIMIT);
}

#[test]
fn pagination_accepts_limit_at_cap() {
    let cap = MAX_PAGE_LIMIT.to_string();
    let pagination = Pagination::from_raw(Some("1"), Some(cap.as_str()));

    assert_eq!(pagination.limit, MAX_PAGE_LIMIT);
}

#[test]
fn pagination_offset_skips_previous_pages() {
    let pagination = Pagination::from_raw(Some("3"), Some("10"));

    assert_eq!(pagination.offset(), 20);
}

#[test]
fn predicate_rejects_malformed_owner() {
    let result = QueryPredicate::for_owner("not-a-uuid");

    assert!(result.is_err());
    let (status, message) = result.err().unwrap();
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(message, "Invalid user ID");
}

#[test]
fn predicate_with_no_filters_matches_owner_only() {
    let predicate = record_predicate(OWNER, &RecordFilter::default()).unwrap();

    assert_eq!(predicate.where_sql(), "WHERE user_id = ?");
    assert_eq!(predicate.params().len(), 1);
}

#[test]
fn predicate_adds_clause_per_present_bound() {
    let filter = RecordFilter {
        min_amount: Some(10.0),
        ..Default::default()
    };
    let predicate = record_predicate(OWNER, &filter).unwrap();

    assert_eq!(predicate.where_sql(), "WHERE user_id = ? AND amount >= ?");
    assert_eq!(predicate.params().len(), 2);
}

#[test]
fn predicate_composes_all_filters() {
    let filter = RecordFilter {
        source: Some("salary".to_string()),
        min_amount: Some(10.0),
        max_amount: Some(100.0),
        start_date: Some(1_000),
        end_date: Some(2_000),
    };
    let predicate = record_predicate(OWNER, &filter).unwrap();

    assert_eq!(
        predicate.where_sql(),
        "WHERE user_id = ? AND source = ? AND amount >= ? AND amount <= ? AND date >= ? AND date <= ?"
    );
    assert_eq!(predicate.params().len(), 6);
}

#[test]
fn month_bounds_are_half_open() {
    let (start, end) = month_bounds(date!(2025 - 06 - 15));

    assert_eq!(start, datetime!(2025-06-01 0:00 UTC).unix_timestamp());
    assert_eq!(end, datetime!(2025-07-01 0:00 UTC).unix_timestamp());
}

#[test]
fn month_bounds_roll_over_december() {
    let (start, end) = month_bounds(date!(2024 - 12 - 31));

    assert_eq!(start, datetime!(2024-12-01 0:00 UTC).unix_timestamp());
    assert_eq!(end, datetime!(2025-01-01 0:00 UTC).unix_timestamp());
}

#[test]
fn calendar_month_span_is_inclusive() {
    let (from, to) = calendar_month_span(2025, Month::June);

    assert_eq!(from, datetime!(2025-06-01 0:00 UTC).unix_timestamp());
    assert_eq!(to, datetime!(2025-07-01 0:00 UTC).unix_timestamp() - 1);
}

#[test]
fn month_token_parses_year_and_month() {
    let (year, month) = parse_month_token("2025-06").unwrap();

    assert_eq!(year, 2025);
    assert_eq!(month, Month::June);
}

#[test]
fn month_token_rejects_garbage() {
    assert!(parse_month_token("June 2025").is_err());
    assert!(parse_month_token("2025-13").is_err());
    assert!(parse_month_token("2025-06-01").is_err());
    assert!(parse_month_token("99999-06").is_err());
}

#[test]
fn period_from_month_token_covers_whole_month() {
    let query = SummaryQuery {
        month: Some("2025-06".to_string()),
        ..Default::default()
    };
    let period = resolve_period(&query, date!(2024 - 01 - 01)).unwrap();

    assert_eq!(period.from, datetime!(2025-06-01 0:00 UTC).unix_timestamp());
    assert_eq!(
        period.to,
        datetime!(2025-07-01 0:00 UTC).unix_timestamp() - 1
    );
}

#[test]
fn period_month_token_overrides_explicit_bounds() {
    let query = SummaryQuery {
        month: Some("2025-06".to_string()),
        from: Some("2020-01-01".to_string()),
        to: Some("2020-12-31".to_string()),
    };
    let period = resolve_period(&query, date!(2024 - 01 - 01)).unwrap();

    assert_eq!(period.from, datetime!(2025-06-01 0:00 UTC).unix_timestamp());
}

#[test]
fn period_defaults_to_current_month() {
    let period = resolve_period(&SummaryQuery::default(), date!(2025 - 06 - 15)).unwrap();

    assert_eq!(period.from, datetime!(2025-06-01 0:00 UTC).unix_timestamp());
    assert_eq!(
        period.to,
        datetime!(2025-07-01 0:00 UTC).unix_timestamp() - 1
    );
}

#[test]
fn period_accepts_partial_bounds() {
    let query = SummaryQuery {
        from: Some("2025-03-01".to_string()),
        ..Default::default()
    };
    let period = resolve_period(&query, date!(2025 - 06 - 15)).unwrap();

    assert_eq!(period.from, datetime!(2025-03-01 0:00 UTC).unix_timestamp());
    assert_eq!(
        period.to,
        datetime!(2025-07-01 0:00 UTC).unix_timestamp() - 1
    );
}

#[test]
fn period_rejects_unparseable_dates() {
    let query = SummaryQuery {
        from: Some("soon".to_string()),
        ..Default::default()
    };

    assert!(resolve_period(&query, date!(2025 - 06 - 15)).is_err());
}

#[test]
fn progress_is_ratio_of_target() {
    assert_eq!(progress_percent(Some(5000.0), 1250.0), Some(25));
}

#[test]
fn progress_is_null_without_positive_target() {
    assert_eq!(progress_percent(Some(0.0), 100.0), None);
    assert_eq!(progress_percent(None, 100.0), None);
    assert_eq!(progress_percent(Some(-10.0), 100.0), None);
}

#[test]
fn progress_clamps_to_hundred() {
    assert_eq!(progress_percent(Some(1000.0), 2500.0), Some(100));
}

#[test]
fn progress_clamps_negative_contributions_to_zero() {
    assert_eq!(progress_percent(Some(1000.0), -50.0), Some(0));
}

#[test]
fn progress_rounds_to_nearest_percent() {
    assert_eq!(progress_percent(Some(300.0), 100.0), Some(33));
    assert_eq!(progress_percent(Some(300.0), 200.0), Some(67));
}

#[test]
fn parse_date_accepts_plain_dates() {
    assert_eq!(
        parse_date("2025-06-01").unwrap(),
        datetime!(2025-06-01 0:00 UTC).unix_timestamp()
    );
}

#[test]
fn parse_date_accepts_rfc3339() {
    assert_eq!(
        parse_date("2025-06-01T12:30:00Z").unwrap(),
        datetime!(2025-06-01 12:30 UTC).unix_timestamp()
    );
}

#[test]
fn parse_date_rejects_garbage() {
    assert!(parse_date("yesterday").is_err());
    assert!(parse_date("2025-02-30").is_err());
}

#[test]
fn format_date_round_trips_stored_dates() {
    let timestamp = parse_date("2025-06-05").unwrap();

    assert_eq!(format_date(timestamp), "2025-06-05");
}
