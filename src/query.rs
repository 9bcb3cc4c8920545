//! Filtered-query construction shared by the three record stores.
//!
//! A [QueryPredicate] is always scoped to one owner and narrowed by
//! whatever filter bounds the request actually supplied; an absent bound
//! contributes no clause at all, so an empty filter matches everything the
//! owner has.

use axum::http::StatusCode;
use libsql::Value;

use crate::constants::*;
use crate::utils::{db_error_with_context, validate_user_id};

#[derive(Debug, Clone)]
pub struct QueryPredicate {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl QueryPredicate {
    /// Seed a predicate with the owning user. Fails with an
    /// invalid-identifier error before any query executes when the id is
    /// malformed.
    pub fn for_owner(user_id: &str) -> Result<Self, (StatusCode, String)> {
        validate_user_id(user_id)?;
        Ok(QueryPredicate {
            conditions: vec!["user_id = ?".to_string()],
            params: vec![Value::Text(user_id.to_string())],
        })
    }

    /// Inclusive numeric bounds; either side may be present alone.
    pub fn numeric_range(mut self, column: &str, min: Option<f64>, max: Option<f64>) -> Self {
        if let Some(min) = min {
            self.conditions.push(format!("{} >= ?", column));
            self.params.push(Value::Real(min));
        }
        if let Some(max) = max {
            self.conditions.push(format!("{} <= ?", column));
            self.params.push(Value::Real(max));
        }
        self
    }

    /// Inclusive date bounds over a unix-seconds column.
    pub fn date_range(mut self, column: &str, start: Option<i64>, end: Option<i64>) -> Self {
        if let Some(start) = start {
            self.conditions.push(format!("{} >= ?", column));
            self.params.push(Value::Integer(start));
        }
        if let Some(end) = end {
            self.conditions.push(format!("{} <= ?", column));
            self.params.push(Value::Integer(end));
        }
        self
    }

    /// Exact match on a text column.
    pub fn equals(mut self, column: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.conditions.push(format!("{} = ?", column));
            self.params.push(Value::Text(value.to_string()));
        }
        self
    }

    /// Case-insensitive substring match on a text column.
    pub fn contains(mut self, column: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.conditions
                .push(format!("LOWER({}) LIKE '%' || LOWER(?) || '%'", column));
            self.params.push(Value::Text(value.to_string()));
        }
        self
    }

    pub fn where_sql(&self) -> String {
        format!("WHERE {}", self.conditions.join(" AND "))
    }

    pub fn params(&self) -> Vec<Value> {
        self.params.clone()
    }

    /// Parameters extended with the LIMIT/OFFSET values of a page slice.
    pub fn page_params(&self, pagination: Pagination) -> Vec<Value> {
        let mut params = self.params.clone();
        params.push(Value::Integer(pagination.limit as i64));
        params.push(Value::Integer(pagination.offset() as i64));
        params
    }
}

/// Filter criteria for expense and income listings. `source` only applies
/// to incomes; expense queries leave it unset.
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    pub source: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

pub fn record_predicate(
    user_id: &str,
    filter: &RecordFilter,
) -> Result<QueryPredicate, (StatusCode, String)> {
    Ok(QueryPredicate::for_owner(user_id)?
        .equals("source", filter.source.as_deref())
        .numeric_range("amount", filter.min_amount, filter.max_amount)
        .date_range("date", filter.start_date, filter.end_date))
}

/// Filter criteria for the saving-goal report export.
#[derive(Debug, Default, Clone)]
pub struct SavingFilter {
    pub title: Option<String>,
    pub min_target_amount: Option<f64>,
    pub max_target_amount: Option<f64>,
    pub min_current_amount: Option<f64>,
    pub max_current_amount: Option<f64>,
    pub start_deadline: Option<i64>,
    pub end_deadline: Option<i64>,
}

pub fn saving_predicate(
    user_id: &str,
    filter: &SavingFilter,
) -> Result<QueryPredicate, (StatusCode, String)> {
    Ok(QueryPredicate::for_owner(user_id)?
        .contains("title", filter.title.as_deref())
        .numeric_range(
            "target_amount",
            filter.min_target_amount,
            filter.max_target_amount,
        )
        .numeric_range(
            "current_amount",
            filter.min_current_amount,
            filter.max_current_amount,
        )
        .date_range("deadline", filter.start_deadline, filter.end_deadline))
}

/// Page slice parameters. Raw query-string values that are absent,
/// non-numeric, zero, or over the cap fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l >= 1 && *l <= MAX_PAGE_LIMIT)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        Pagination { page, limit }
    }

    pub fn offset(self) -> u32 {
        (self.page - 1) * self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Count every record matching the predicate, ignoring pagination.
pub async fn count_matching(
    conn: &libsql::Connection,
    table: &str,
    predicate: &QueryPredicate,
) -> Result<u32, (StatusCode, String)> {
    let sql = format!("SELECT COUNT(*) FROM {} {}", table, predicate.where_sql());
    let mut rows = conn
        .query(&sql, libsql::params_from_iter(predicate.params()))
        .await
        .map_err(|e| db_error_with_context(&format!("count on {} failed: {}", table, e)))?;

    match rows
        .next()
        .await
        .map_err(|e| db_error_with_context(&format!("count row read failed: {}", e)))?
    {
        Some(row) => row
            .get(0)
            .map_err(|e| db_error_with_context(&format!("count value read failed: {}", e))),
        None => Ok(0),
    }
}
