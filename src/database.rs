use std::{path::Path, sync::Arc};

use anyhow::Result;
use libsql::{Builder, Connection};
use tokio::sync::RwLock;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id             TEXT    PRIMARY KEY,
    email          TEXT    UNIQUE NOT NULL,
    username       TEXT    NOT NULL,
    password_hash  TEXT    NOT NULL,
    created_at     INTEGER NOT NULL,
    updated_at     INTEGER NOT NULL
);
"#;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id           TEXT    PRIMARY KEY,
    user_id      TEXT    NOT NULL REFERENCES users(id),
    amount       REAL    NOT NULL,
    description  TEXT    NOT NULL,
    date         INTEGER NOT NULL,
    note         TEXT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
"#;

const CREATE_INCOMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS incomes (
    id           TEXT    PRIMARY KEY,
    user_id      TEXT    NOT NULL REFERENCES users(id),
    amount       REAL    NOT NULL,
    source       TEXT,
    date         INTEGER NOT NULL,
    note         TEXT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
"#;

const CREATE_SAVING_GOALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS saving_goals (
    id              TEXT    PRIMARY KEY,
    user_id         TEXT    NOT NULL REFERENCES users(id),
    title           TEXT    NOT NULL,
    target_amount   REAL,
    current_amount  REAL    NOT NULL DEFAULT 0,
    deadline        INTEGER,
    note            TEXT,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);
"#;

pub type Db = Arc<RwLock<Connection>>;

/// Application database (finance.db): users plus the three owner-scoped
/// record tables.
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join("finance.db");
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    conn.execute(CREATE_USERS_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute(CREATE_INCOMES_TABLE, ()).await?;
    conn.execute(CREATE_SAVING_GOALS_TABLE, ()).await?;

    Ok(Arc::new(RwLock::new(conn)))
}
