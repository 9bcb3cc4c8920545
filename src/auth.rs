use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use uuid::Uuid;

use crate::constants::*;
use crate::database::Db;
use crate::models::{LoginPayload, PublicUser, RegisterPayload, User};
use crate::utils::{db_error_with_context, now_timestamp};

async fn create_user(db: &Db, email: &str, username: &str, password: &str) -> anyhow::Result<PublicUser> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    let id = Uuid::new_v4().to_string();
    let now = now_timestamp();
    let conn = db.write().await;

    conn.execute(
        "INSERT INTO users (id, email, username, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        (id.as_str(), email, username, hash.as_str(), now, now),
    )
    .await?;

    Ok(PublicUser {
        id,
        email: email.to_string(),
        username: username.to_string(),
    })
}

pub async fn register(
    State(db): State<Db>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    // Input validation
    let email = payload.email.trim();
    if email.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Email cannot be empty".to_string()));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err((
            StatusCode::BAD_REQUEST,
            "Email must be a valid address".to_string(),
        ));
    }
    if payload.username.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Username cannot be empty".to_string(),
        ));
    }
    if payload.username.len() > MAX_USERNAME_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Username must be less than {} characters", MAX_USERNAME_LENGTH),
        ));
    }
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }

    let user = create_user(&db, email, payload.username.trim(), &payload.password)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                (StatusCode::CONFLICT, "User already exists".to_string())
            } else {
                db_error_with_context(&format!("user creation failed: {}", e))
            }
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user_by_email(db: &Db, email: &str) -> anyhow::Result<Option<User>> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, email, username, password_hash FROM users WHERE email = ?",
            [email],
        )
        .await?;

    if let Some(row) = rows.next().await? {
        let id: String = row.get(0)?;
        let email: String = row.get(1)?;
        let username: String = row.get(2)?;
        let password_hash: String = row.get(3)?;
        Ok(Some(User {
            id,
            email,
            username,
            password_hash,
        }))
    } else {
        Ok(None)
    }
}

fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn login(
    State(db): State<Db>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    // Input validation
    if payload.email.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Email cannot be empty".to_string()));
    }
    if payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Password cannot be empty".to_string(),
        ));
    }

    let user_data = get_user_by_email(&db, payload.email.trim())
        .await
        .map_err(|e| db_error_with_context(&format!("login lookup failed: {}", e)))?;

    let user = match user_data {
        Some(data) => data,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                ERR_INVALID_CREDENTIALS.to_string(),
            ));
        }
    };

    let is_valid = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| db_error_with_context(&format!("password verification failed: {}", e)))?;

    if !is_valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            ERR_INVALID_CREDENTIALS.to_string(),
        ));
    }

    // Set user session
    session
        .insert("user_id", &user.id)
        .await
        .map_err(|e| db_error_with_context(&format!("session write failed: {}", e)))?;
    session
        .insert("email", &user.email)
        .await
        .map_err(|e| db_error_with_context(&format!("session write failed: {}", e)))?;
    session
        .insert("username", &user.username)
        .await
        .map_err(|e| db_error_with_context(&format!("session write failed: {}", e)))?;

    Ok((
        StatusCode::OK,
        Json(PublicUser {
            id: user.id,
            email: user.email,
            username: user.username,
        }),
    ))
}

/// Resolve the authenticated owner from the session. Every protected
/// handler goes through this; absence is the unauthorized condition.
pub async fn get_current_user(session: &Session) -> Result<PublicUser, (StatusCode, String)> {
    let user_id: Option<String> = session
        .get("user_id")
        .await
        .map_err(|e| db_error_with_context(&format!("session read failed: {}", e)))?;

    let email: Option<String> = session
        .get("email")
        .await
        .map_err(|e| db_error_with_context(&format!("session read failed: {}", e)))?;

    let username: Option<String> = session
        .get("username")
        .await
        .map_err(|e| db_error_with_context(&format!("session read failed: {}", e)))?;

    match (user_id, email, username) {
        (Some(id), Some(email), Some(username)) => Ok(PublicUser {
            id,
            email,
            username,
        }),
        _ => Err((StatusCode::UNAUTHORIZED, ERR_NOT_LOGGED_IN.to_string())),
    }
}

/// Whether a user row with this id exists. Record creation references an
/// owner supplied in the payload, so the id is existence-checked first.
pub async fn user_exists(db: &Db, user_id: &str) -> Result<bool, (StatusCode, String)> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT id FROM users WHERE id = ?", [user_id])
        .await
        .map_err(|e| db_error_with_context(&format!("user existence check failed: {}", e)))?;

    Ok(rows
        .next()
        .await
        .map_err(|e| db_error_with_context(&format!("user existence row read failed: {}", e)))?
        .is_some())
}

pub async fn me(session: Session) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;
    Ok((StatusCode::OK, Json(user)))
}

pub async fn logout(session: Session) -> Result<StatusCode, (StatusCode, String)> {
    session.clear().await;

    Ok(StatusCode::NO_CONTENT)
}
