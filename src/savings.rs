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
use crate::finance::progress_percent;
use crate::models::{
    CreateSavingPayload, GetSavingsExportQuery, SavingGoal, SavingGoalWithProgress,
    UpdateSavingPayload,
};
use crate::query::{SavingFilter, saving_predicate};
use crate::report;
use crate::utils::{
    column_opt_integer, column_opt_real, column_opt_text, db_error, db_error_with_context,
    now_timestamp, opt_integer, opt_real, opt_text, parse_date_opt, validate_record_id,
    validate_string_length, validate_user_id,
};

const SAVING_COLUMNS: &str =
    "id, user_id, title, target_amount, current_amount, deadline, note, created_at, updated_at";

pub fn extract_saving_from_row(row: libsql::Row) -> Result<SavingGoal, (StatusCode, String)> {
    let id: String = row
        .get(0)
        .map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let user_id: String = row
        .get(1)
        .map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let title: String = row
        .get(2)
        .map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let target_amount: Option<f64> =
        column_opt_real(&row, 3).map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let current_amount: f64 = row
        .get(4)
        .map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let deadline: Option<i64> = column_opt_integer(&row, 5)
        .map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let note: Option<String> =
        column_opt_text(&row, 6).map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let created_at: i64 = row
        .get(7)
        .map_err(|_| db_error_with_context("invalid saving goal data"))?;
    let updated_at: i64 = row
        .get(8)
        .map_err(|_| db_error_with_context("invalid saving goal data"))?;

    Ok(SavingGoal {
        id,
        user_id,
        title,
        target_amount,
        current_amount,
        deadline,
        note,
        created_at,
        updated_at,
    })
}

pub fn with_progress(goal: SavingGoal) -> SavingGoalWithProgress {
    let progress = progress_percent(goal.target_amount, goal.current_amount);
    SavingGoalWithProgress { goal, progress }
}

pub async fn create_saving(
    db: &Db,
    payload: &CreateSavingPayload,
) -> Result<SavingGoal, (StatusCode, String)> {
    validate_user_id(&payload.user)?;
    validate_string_length(&payload.title, "Title", MAX_TEXT_FIELD_LENGTH)?;
    let deadline = parse_date_opt(payload.deadline.as_deref())?;

    if !user_exists(db, &payload.user).await? {
        return Err((StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND.to_string()));
    }

    let goal = SavingGoal {
        id: Uuid::new_v4().to_string(),
        user_id: payload.user.clone(),
        title: payload.title.trim().to_string(),
        target_amount: payload.target_amount,
        current_amount: payload.current_amount,
        deadline,
        note: payload.note.clone(),
        created_at: now_timestamp(),
        updated_at: now_timestamp(),
    };

    let conn = db.write().await;
    conn.execute(
        "INSERT INTO saving_goals (id, user_id, title, target_amount, current_amount, deadline, note, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            goal.id.as_str(),
            goal.user_id.as_str(),
            goal.title.as_str(),
            opt_real(goal.target_amount),
            goal.current_amount,
            opt_integer(goal.deadline),
            opt_text(goal.note.as_deref()),
            goal.created_at,
            goal.updated_at,
        ),
    )
    .await
    .map_err(|e| db_error_with_context(&format!("saving goal creation failed: {}", e)))?;

    Ok(goal)
}

/// Every goal of the owner with derived progress, nearest deadline first.
pub async fn get_saving_goals_by_user(
    db: &Db,
    user_id: &str,
) -> Result<Vec<SavingGoalWithProgress>, (StatusCode, String)> {
    validate_user_id(user_id)?;
    let conn = db.read().await;

    let sql = format!(
        "SELECT {} FROM saving_goals WHERE user_id = ? ORDER BY deadline ASC",
        SAVING_COLUMNS
    );
    let mut rows = conn
        .query(&sql, [user_id])
        .await
        .map_err(|e| db_error_with_context(&format!("saving goal query failed: {}", e)))?;

    let mut goals = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        goals.push(with_progress(extract_saving_from_row(row)?));
    }

    Ok(goals)
}

/// The full filtered set, unpaginated, for report export.
pub async fn find_savings_for_export(
    db: &Db,
    user_id: &str,
    filter: &SavingFilter,
) -> Result<Vec<SavingGoal>, (StatusCode, String)> {
    let predicate = saving_predicate(user_id, filter)?;
    let conn = db.read().await;

    let sql = format!(
        "SELECT {} FROM saving_goals {} ORDER BY deadline ASC",
        SAVING_COLUMNS,
        predicate.where_sql()
    );
    let mut rows = conn
        .query(&sql, libsql::params_from_iter(predicate.params()))
        .await
        .map_err(|e| db_error_with_context(&format!("saving goal export query failed: {}", e)))?;

    let mut goals = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        goals.push(extract_saving_from_row(row)?);
    }

    Ok(goals)
}

async fn get_saving(db: &Db, saving_id: &str) -> Result<Option<SavingGoal>, (StatusCode, String)> {
    let conn = db.read().await;
    let sql = format!("SELECT {} FROM saving_goals WHERE id = ?", SAVING_COLUMNS);
    let mut rows = conn
        .query(&sql, [saving_id])
        .await
        .map_err(|e| db_error_with_context(&format!("saving goal lookup failed: {}", e)))?;

    match rows.next().await.map_err(|_| db_error())? {
        Some(row) => Ok(Some(extract_saving_from_row(row)?)),
        None => Ok(None),
    }
}

/// Apply only the supplied fields; everything else keeps its stored value.
pub async fn update_saving_by_id(
    db: &Db,
    saving_id: &str,
    updates: &UpdateSavingPayload,
) -> Result<SavingGoal, (StatusCode, String)> {
    validate_record_id(saving_id, "saving goal")?;
    if let Some(user) = &updates.user {
        validate_user_id(user)?;
    }
    if let Some(title) = &updates.title {
        validate_string_length(title, "Title", MAX_TEXT_FIELD_LENGTH)?;
    }
    let deadline = parse_date_opt(updates.deadline.as_deref())?;

    let existing = get_saving(db, saving_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Saving goal not found".to_string()))?;

    let updated = SavingGoal {
        id: existing.id,
        user_id: updates.user.clone().unwrap_or(existing.user_id),
        title: updates
            .title
            .as_deref()
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.title),
        target_amount: updates.target_amount.or(existing.target_amount),
        current_amount: updates.current_amount.unwrap_or(existing.current_amount),
        deadline: deadline.or(existing.deadline),
        note: updates.note.clone().or(existing.note),
        created_at: existing.created_at,
        updated_at: now_timestamp(),
    };

    let conn = db.write().await;
    conn.execute(
        "UPDATE saving_goals SET user_id = ?, title = ?, target_amount = ?, current_amount = ?, deadline = ?, note = ?, updated_at = ? WHERE id = ?",
        (
            updated.user_id.as_str(),
            updated.title.as_str(),
            opt_real(updated.target_amount),
            updated.current_amount,
            opt_integer(updated.deadline),
            opt_text(updated.note.as_deref()),
            updated.updated_at,
            saving_id,
        ),
    )
    .await
    .map_err(|e| db_error_with_context(&format!("saving goal update failed: {}", e)))?;

    Ok(updated)
}

/// Remove the row and return its prior state.
pub async fn delete_saving_by_id(
    db: &Db,
    saving_id: &str,
) -> Result<SavingGoal, (StatusCode, String)> {
    validate_record_id(saving_id, "saving goal")?;

    let existing = get_saving(db, saving_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "Saving goal not found".to_string()))?;

    let conn = db.write().await;
    conn.execute("DELETE FROM saving_goals WHERE id = ?", [saving_id])
        .await
        .map_err(|e| db_error_with_context(&format!("saving goal deletion failed: {}", e)))?;

    Ok(existing)
}

fn filter_from_query(query: &GetSavingsExportQuery) -> Result<SavingFilter, (StatusCode, String)> {
    Ok(SavingFilter {
        title: query.title.clone(),
        min_target_amount: query.min_target_amount,
        max_target_amount: query.max_target_amount,
        min_current_amount: query.min_current_amount,
        max_current_amount: query.max_current_amount,
        start_deadline: parse_date_opt(query.start_deadline.as_deref())?,
        end_deadline: parse_date_opt(query.end_deadline.as_deref())?,
    })
}

pub async fn create(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<CreateSavingPayload>,
) -> Result<(StatusCode, Json<SavingGoal>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let goal = create_saving(&db, &payload).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn find(
    State(db): State<Db>,
    session: Session,
) -> Result<(StatusCode, Json<Vec<SavingGoalWithProgress>>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let goals = get_saving_goals_by_user(&db, &user.id).await?;
    Ok((StatusCode::OK, Json(goals)))
}

pub async fn update(
    State(db): State<Db>,
    session: Session,
    Path(saving_id): Path<String>,
    Json(payload): Json<UpdateSavingPayload>,
) -> Result<(StatusCode, Json<SavingGoal>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let goal = update_saving_by_id(&db, &saving_id, &payload).await?;
    Ok((StatusCode::OK, Json(goal)))
}

pub async fn remove(
    State(db): State<Db>,
    session: Session,
    Path(saving_id): Path<String>,
) -> Result<(StatusCode, Json<SavingGoal>), (StatusCode, String)> {
    get_current_user(&session).await?;

    let goal = delete_saving_by_id(&db, &saving_id).await?;
    Ok((StatusCode::OK, Json(goal)))
}

pub async fn export(
    State(db): State<Db>,
    session: Session,
    Query(query): Query<GetSavingsExportQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = get_current_user(&session).await?;

    let filter = filter_from_query(&query)?;
    let goals = find_savings_for_export(&db, &user.id, &filter).await?;
    let document = report::saving_report(&goals)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"saving_report.pdf\"",
            ),
        ],
        document,
    ))
}
