use std::str::FromStr;

use anyhow::Context;
use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parse database url {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir).with_context(|| format!("create database dir {}", dir))?;
    }

    let db = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn migrate(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

fn sqlite_parent_dir(database_url: &str) -> Option<&str> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.starts_with(":memory:") {
        return None;
    }
    let (dir, _) = path.rsplit_once('/')?;
    (!dir.is_empty()).then_some(dir)
}

/// Row of `sqlite_schema`, exposed by the database status route.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SchemaEntry {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub tbl_name: String,
    pub sql: Option<String>,
}

pub async fn schema_entries(db: &SqlitePool) -> anyhow::Result<Vec<SchemaEntry>> {
    let rows = sqlx::query_as::<_, SchemaEntry>(
        r#"
        SELECT type, name, tbl_name, sql
        FROM sqlite_schema
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await
    .context("read sqlite_schema")?;
    Ok(rows)
}
