use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::auth::{get_current_user, user_exists};
use crate::constants::*;
use crate::database::Db;
use crate::models::{
    CreateExpensePayload, Expense, GetExpensesQuery, Paginated, UpdateExpensePayload,
};
use crate::query::{Pagination, RecordFilter, count_matching, record_predicate};
use crate::report;
use crate::utils::{
    column_opt_text, db_error, db_error_with_context, now_timestamp, opt_text, parse_date,
    parse_date_opt, validate_record_id, validate_string_length, validate_user_id,
};

const EXPENSE_COLUMNS: &str = "id, user_id, amount, description, date, note, created_at, updated_at";

pub fn extract_expense_from_row(row: libsql::Row) -> Result<Expense, (StatusCode, String)> {
    let id: String = row
        .get(0)
        .map_err(|_| db_error_with_context("invalid expense data"))?;
    let user_id: String = row
        .get(1)
        .map_err(|_| db_error_with_context("invalid expense data"))?;
    let amount: f64 = row
        .get(2)
        .map_err(|_| db_error_with_context("invalid expense data"))?;
    let description: String = row
        .get(3)
        .map_err(|_| db_error_with_context("invalid expense data"))?;
    let date: i64 = row
        .get(4)
        .map_err(|_| db_error_with_context("invalid expense data"))?;
    let note: Option<String> =
        column_opt_text(&row, 5).map_err(|_| db_error_with_context("invalid expense data"))?;
    let created_at: i64 = row
        .get(6)
        .map_err(|_| db_error_with_context("invalid expense data"))?;
    let updated_at: i64 = row
        .get(7)
        .map_err(|_| db_error_with_context("invalid expense data"))?;

    Ok(Expense {
        id,
        user_id,
        amount,
        description,
        date,
        note,
        created_at,
        updated_at,
    })
}

pub async fn create_expense(
    db: &Db,
    payload: &CreateExpensePayload,
) -> Result<Expense, (StatusCode, String)> {
    validate_user_id(&payload.user)?;
    validate_string_length(&payload.description, "Description", MAX_TEXT_FIELD_LENGTH)?;
    let date = parse_date(&payload.date)?;

    if !user_exists(db, &payload.user).await? {
        return Err((StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND.to_string()));
    }

    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        user_id: payload.user.clone(),
        amount: payload.amount,
        description: payload.description.trim().to_string(),
        date,
        note: payload.note.clone(),
        created_at: now_timestamp(),
        updated_at: now_timestamp(),
    };

    let conn = db.write().await;
    conn.execute(
        "INSERT INTO expenses (id, user_id, amount, description, date, note, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            expense.id.as_str(),
            expense.user_id.as_str(),
            expense.amount,
            expense.description.as_str(),
            expense.date,
            opt_text(expense.note.as_deref()),
            expense.created_at,
            expense.updated_at,
        ),
    )
    .await
    .map_err(|e| db_error_with_context(&format!("expense creation failed: {}", e)))?;

    Ok(expense)
}

pub async fn find_expenses(
    db: &Db,
    user_id: &str,
    filter: &RecordFilter,
    pagination: Pagination,
) -> Result<Paginated<Expense>, (StatusCode, String)> {
    let predicate = record_predicate(user_id, filter)?;
    let conn = db.read().await;

    let total = count_matching(&conn, "expenses", &predicate).await?;

    let sql = format!(
        "SELECT {} FROM expenses {} ORDER BY rowid LIMIT ? OFFSET ?",
        EXPENSE_COLUMNS,
        predicate.where_sql()
    );
    let mut rows = conn
        .query(&sql, libsql::params_from_iter(predicate.page_params(pagination)))
        .await
        .map_err(|e| db_error_with_context(&format!("expense query failed: {}", e)))?;

    let mut data = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        data.push(extract_expense_from_row(row)?);
    }

    Ok(Paginated {
        total,
        page: pagination.page,
        limit: pagination.limit,
        data,
    })
}

/// The full filtered set, unpaginated, for report export.
pub async fn find_expenses_for_export(
    db: &Db,
    user_id: &str,
    filter: &RecordFilter,
) -> Result<Vec<Expense>, (StatusCode, String)> {
    let predicate = record_predicate(user_id, filter)?;
    let conn = db.read().await;

    let sql = format!(
        "SELECT {} FROM expenses {} ORDER BY rowid",
        EXPENSE_COLUMNS,
        predicate.where_sql()
    );
    let mut rows = conn
        .query(&sql, libsql::params_from_iter(predicate.params()))
        .await
        .map_err(|e| db_error_with_context(&format!("expense export query failed: {}", e)))?;

    let mut expenses = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        expenses.push(extract_expense_from_row(row)?);
    }

    Ok(expenses)
}

async fn get_expense(db: &Db, expense_id: &str) -> Result<Option<Expense>, (StatusCode, String)> {
    let conn = db.read().await;
    let sql = format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS);
    let mut rows = conn
        .query(&sql, [expense_id])
        .await
        .map_err(|e| db_error_with_context(&format!("expense lookup failed: {}", e)))?;

    match rows.next().await.map_err(|_| db_error())? {
        Some(row) => Ok(Some(extract_expense_from_row(row)?)),
        None => Ok(None),
    }
}

/// Apply only the supplied fields; everything else keeps its stored value.
pub async fn update_expense_by_id(
    db: &Db,
    expense_id: &str,
    updates: &UpdateExpensePayload,
) -> Result<Expense, (StatusCode, String)> {
    validate_record_id(expense_id, "expense")?;
    if let Some(user) = &updates.user {
        validate_user_id(user)?;
    }
    if let Some(description) = &updates.description {
        validate_string_length(description, "Description", MAX_TEXT_FIELD_LENGTH)?;
    }
    let date = parse_date_opt(updates.date.as_deref())?;

    let existing = get_expense(db, expense_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Expense not found".to_string()))?;

    let updated = Expense {
        id: existing.id,
        user_id: updates.user.clone().unwrap_or(existing.user_id),
        amount: updates.amount.unwrap_or(existing.amount),
        description: updates
            .description
            .as_deref()
            .map(|d| d.trim().to_string())
            .unwrap_or(existing.description),
        date: date.unwrap_or(existing.date),
        note: updates.note.clone().or(existing.note),
        created_at: existing.created_at,
        updated_at: now_timestamp(),
    };

    let conn = db.write().await;
    conn.execute(
        "UPDATE expenses SET user_id = ?, amount = ?, description = ?, date = ?, note = ?, updated_at = ? WHERE id = ?",
        (
            updated.user_id.as_str(),
            updated.amount,
            updated.description.as_str(),
            updated.date,
            opt_text(updated.note.as_deref()),
            updated.updated_at,
            expense_id,
        ),
    )
    .await
    .map_err(|e| db_error_with_context(&format!("expense update failed: {}", e)))?;

    Ok(updated)
}

/// Remove the row and return its prior state.
pub async fn delete_expense_by_id(
    db: &Db,
    expense_id: &str,
) -> Result<Expense, (StatusCode, String)> {
    validate_record_id(expense_id, "expense")?;

    let existing = get_expense(db, expense_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Expense not found".to_string()))?;

    let conn = db.write().await;
    conn.execute("DELETE FROM expenses WHERE id = ?", [expense_id])
        .await
        .map_err(|e| db_error_with_context(&format!("expense deletion failed: {}", e)))?;

    Ok(existing)
}

fn filter_from_query(query: &GetExpensesQuery) -> Result<RecordFilter, (StatusCode, String)> {
    Ok(RecordFilter {
        source: None,
        min_amount: query.min_amount,
        max_amount: query.max_amount,
        start_date: parse_date_opt(query.start_date.as_deref())?,
        end_date: parse_date_opt(query.end_date.as_deref())?,
    })
}

pub async fn create(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let expense = create_expense(&db, &payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn find(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<GetExpensesQuery>,
) -> Result<(StatusCode, Json<Paginated<Expense>>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let filter = filter_from_query(&query)?;
    let pagination = Pagination::from_raw(query.page.as_deref(), query.limit.as_deref());
    let expenses = find_expenses(&db, &user.id, &filter, pagination).await?;

    Ok((StatusCode::OK, Json(expenses)))
}

pub async fn update(
    State(db): State<Db>,
    session: Session,
    Path(expense_id): Path<String>,
    Json(payload): Json<UpdateExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let expense = update_expense_by_id(&db, &expense_id, &payload).await?;
    Ok((StatusCode::OK, Json(expense)))
}

pub async fn remove(
    State(db): State<Db>,
    session: Session,
    Path(expense_id): Path<String>,
) -> Result<(StatusCode, Json<Expense>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let expense = delete_expense_by_id(&db, &expense_id).await?;
    Ok((StatusCode::OK, Json(expense)))
}

pub async fn export(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<GetExpensesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let filter = filter_from_query(&query)?;
    let expenses = find_expenses_for_export(&db, &user.id, &filter).await?;
    let document = report::expense_report(&expenses)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"expense_report.pdf\"",
            ),
        ],
        document,
    ))
}
