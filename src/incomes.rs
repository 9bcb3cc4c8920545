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
    CreateIncomePayload, GetIncomesQuery, Income, Paginated, UpdateIncomePayload,
};
use crate::query::{Pagination, RecordFilter, count_matching, record_predicate};
use crate::report;
use crate::utils::{
    column_opt_text, db_error, db_error_with_context, now_timestamp, opt_text, parse_date,
    parse_date_opt, validate_record_id, validate_string_length, validate_user_id,
};

const INCOME_COLUMNS: &str = "id, user_id, amount, source, date, note, created_at, updated_at";

pub fn extract_income_from_row(row: libsql::Row) -> Result<Income, (StatusCode, String)> {
    let id: String = row
        .get(0)
        .map_err(|_| db_error_with_context("invalid income data"))?;
    let user_id: String = row
        .get(1)
        .map_err(|_| db_error_with_context("invalid income data"))?;
    let amount: f64 = row
        .get(2)
        .map_err(|_| db_error_with_context("invalid income data"))?;
    let source: Option<String> =
        column_opt_text(&row, 3).map_err(|_| db_error_with_context("invalid income data"))?;
    let date: i64 = row
        .get(4)
        .map_err(|_| db_error_with_context("invalid income data"))?;
    let note: Option<String> =
        column_opt_text(&row, 5).map_err(|_| db_error_with_context("invalid income data"))?;
    let created_at: i64 = row
        .get(6)
        .map_err(|_| db_error_with_context("invalid income data"))?;
    let updated_at: i64 = row
        .get(7)
        .map_err(|_| db_error_with_context("invalid income data"))?;

    Ok(Income {
        id,
        user_id,
        amount,
        source,
        date,
        note,
        created_at,
        updated_at,
    })
}

pub async fn create_income(
    db: &Db,
    payload: &CreateIncomePayload,
) -> Result<Income, (StatusCode, String)> {
    validate_user_id(&payload.user)?;
    if let Some(source) = &payload.source {
        validate_string_length(source, "Source", MAX_TEXT_FIELD_LENGTH)?;
    }
    let date = parse_date(&payload.date)?;

    if !user_exists(db, &payload.user).await? {
        return Err((StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND.to_string()));
    }

    let income = Income {
        id: Uuid::new_v4().to_string(),
        user_id: payload.user.clone(),
        amount: payload.amount,
        source: payload.source.as_deref().map(|s| s.trim().to_string()),
        date,
        note: payload.note.clone(),
        created_at: now_timestamp(),
        updated_at: now_timestamp(),
    };

    let conn = db.write().await;
    conn.execute(
        "INSERT INTO incomes (id, user_id, amount, source, date, note, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            income.id.as_str(),
            income.user_id.as_str(),
            income.amount,
            opt_text(income.source.as_deref()),
            income.date,
            opt_text(income.note.as_deref()),
            income.created_at,
            income.updated_at,
        ),
    )
    .await
    .map_err(|e| db_error_with_context(&format!("income creation failed: {}", e)))?;

    Ok(income)
}

pub async fn find_incomes(
    db: &Db,
    user_id: &str,
    filter: &RecordFilter,
    pagination: Pagination,
) -> Result<Paginated<Income>, (StatusCode, String)> {
    let predicate = record_predicate(user_id, filter)?;
    let conn = db.read().await;

    let total = count_matching(&conn, "incomes", &predicate).await?;

    let sql = format!(
        "SELECT {} FROM incomes {} ORDER BY rowid LIMIT ? OFFSET ?",
        INCOME_COLUMNS,
        predicate.where_sql()
    );
    let mut rows = conn
        .query(&sql, libsql::params_from_iter(predicate.page_params(pagination)))
        .await
        .map_err(|e| db_error_with_context(&format!("income query failed: {}", e)))?;

    let mut data = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        data.push(extract_income_from_row(row)?);
    }

    Ok(Paginated {
        total,
        page: pagination.page,
        limit: pagination.limit,
        data,
    })
}

/// The full filtered set, unpaginated, for report export.
pub async fn find_incomes_for_export(
    db: &Db,
    user_id: &str,
    filter: &RecordFilter,
) -> Result<Vec<Income>, (StatusCode, String)> {
    let predicate = record_predicate(user_id, filter)?;
    let conn = db.read().await;

    let sql = format!(
        "SELECT {} FROM incomes {} ORDER BY rowid",
        INCOME_COLUMNS,
        predicate.where_sql()
    );
    let mut rows = conn
        .query(&sql, libsql::params_from_iter(predicate.params()))
        .await
        .map_err(|e| db_error_with_context(&format!("income export query failed: {}", e)))?;

    let mut incomes = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        incomes.push(extract_income_from_row(row)?);
    }

    Ok(incomes)
}

async fn get_income(db: &Db, income_id: &str) -> Result<Option<Income>, (StatusCode, String)> {
    let conn = db.read().await;
    let sql = format!("SELECT {} FROM incomes WHERE id = ?", INCOME_COLUMNS);
    let mut rows = conn
        .query(&sql, [income_id])
        .await
        .map_err(|e| db_error_with_context(&format!("income lookup failed: {}", e)))?;

    match rows.next().await.map_err(|_| db_error())? {
        Some(row) => Ok(Some(extract_income_from_row(row)?)),
        None => Ok(None),
    }
}

/// Apply only the supplied fields; everything else keeps its stored value.
pub async fn update_income_by_id(
    db: &Db,
    income_id: &str,
    updates: &UpdateIncomePayload,
) -> Result<Income, (StatusCode, String)> {
    validate_record_id(income_id, "income")?;
    if let Some(user) = &updates.user {
        validate_user_id(user)?;
    }
    if let Some(source) = &updates.source {
        validate_string_length(source, "Source", MAX_TEXT_FIELD_LENGTH)?;
    }
    let date = parse_date_opt(updates.date.as_deref())?;

    let existing = get_income(db, income_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Income not found".to_string()))?;

    let updated = Income {
        id: existing.id,
        user_id: updates.user.clone().unwrap_or(existing.user_id),
        amount: updates.amount.unwrap_or(existing.amount),
        source: updates
            .source
            .as_deref()
            .map(|s| s.trim().to_string())
            .or(existing.source),
        date: date.unwrap_or(existing.date),
        note: updates.note.clone().or(existing.note),
        created_at: existing.created_at,
        updated_at: now_timestamp(),
    };

    let conn = db.write().await;
    conn.execute(
        "UPDATE incomes SET user_id = ?, amount = ?, source = ?, date = ?, note = ?, updated_at = ? WHERE id = ?",
        (
            updated.user_id.as_str(),
            updated.amount,
            opt_text(updated.source.as_deref()),
            updated.date,
            opt_text(updated.note.as_deref()),
            updated.updated_at,
            income_id,
        ),
    )
    .await
    .map_err(|e| db_error_with_context(&format!("income update failed: {}", e)))?;

    Ok(updated)
}

/// Remove the row and return its prior state.
pub async fn delete_income_by_id(
    db: &Db,
    income_id: &str,
) -> Result<Income, (StatusCode, String)> {
    validate_record_id(income_id, "income")?;

    let existing = get_income(db, income_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Income not found".to_string()))?;

    let conn = db.write().await;
    conn.execute("DELETE FROM incomes WHERE id = ?", [income_id])
        .await
        .map_err(|e| db_error_with_context(&format!("income deletion failed: {}", e)))?;

    Ok(existing)
}

fn filter_from_query(query: &GetIncomesQuery) -> Result<RecordFilter, (StatusCode, String)> {
    Ok(RecordFilter {
        source: query.source.clone(),
        min_amount: query.min_amount,
        max_amount: query.max_amount,
        start_date: parse_date_opt(query.start_date.as_deref())?,
        end_date: parse_date_opt(query.end_date.as_deref())?,
    })
}

pub async fn create(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<CreateIncomePayload>,
) -> Result<(StatusCode, Json<Income>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let income = create_income(&db, &payload).await?;
    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn find(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<GetIncomesQuery>,
) -> Result<(StatusCode, Json<Paginated<Income>>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let filter = filter_from_query(&query)?;
    let pagination = Pagination::from_raw(query.page.as_deref(), query.limit.as_deref());
    let incomes = find_incomes(&db, &user.id, &filter, pagination).await?;

    Ok((StatusCode::OK, Json(incomes)))
}

pub async fn update(
    State(db): State<Db>,
    session: Session,
    Path(income_id): Path<String>,
    Json(payload): Json<UpdateIncomePayload>,
) -> Result<(StatusCode, Json<Income>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let income = update_income_by_id(&db, &income_id, &payload).await?;
    Ok((StatusCode::OK, Json(income)))
}

pub async fn remove(
    State(db): State<Db>,
    session: Session,
    Path(income_id): Path<String>,
) -> Result<(StatusCode, Json<Income>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let income = delete_income_by_id(&db, &income_id).await?;
    Ok((StatusCode::OK, Json(income)))
}

pub async fn export(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<GetIncomesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let filter = filter_from_query(&query)?;
    let incomes = find_incomes_for_export(&db, &user.id, &filter).await?;
    let document = report::income_report(&incomes)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"income_report.pdf\"",
            ),
        ],
        document,
    ))
}
