use std::fs;
use std::path::Path;

use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement,
};

use crate::config::AppConfig;

pub async fn connect_db(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let url = config.database_url();
    ensure_sqlite_dir(&url);
    connect(&url).await
}

/// Opens a pool for `url` and makes sure the Warbler tables exist on SQLite.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(url.to_string());
    opts.sqlx_logging(false);
    if url.contains(":memory:") {
        // every pooled connection would otherwise get its own empty database
        opts.max_connections(1).min_connections(1);
    }
    let db = Database::connect(opts).await?;
    init_sqlite_schema(&db).await?;
    Ok(db)
}

fn ensure_sqlite_dir(url: &str) {
    let Some(rest) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return;
    };
    if rest.starts_with(":memory:") {
        return;
    }
    let path = rest.split('?').next().unwrap_or(rest);
    if let Some(parent) = Path::new(path).parent() {
        let _ = fs::create_dir_all(parent);
    }
}

async fn init_sqlite_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    if backend != DatabaseBackend::Sqlite {
        return Ok(());
    }
    let exists_stmt = Statement::from_string(
        backend,
        "SELECT name FROM sqlite_master WHERE type='table' AND name='users' LIMIT 1",
    );
    if db.query_one(exists_stmt).await?.is_some() {
        return Ok(());
    }

    let sql = include_str!("../schema-sqlite.sql");
    for stmt in split_sql(sql) {
        db.execute(Statement::from_string(backend, stmt)).await?;
    }
    info!("sqlite schema created");
    Ok(())
}

fn split_sql(input: &str) -> Vec<String> {
    let mut buf = String::new();
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }
        buf.push_str(line);
        buf.push('\n');
    }
    buf.split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sql_drops_comments_and_blank_statements() {
        let stmts = split_sql("-- users\nCREATE TABLE a (id INTEGER);\n\n;CREATE INDEX b ON a (id);\n");
        assert_eq!(stmts, vec!["CREATE TABLE a (id INTEGER)", "CREATE INDEX b ON a (id)"]);
    }

    #[test]
    fn embedded_schema_has_all_tables() {
        let stmts = split_sql(include_str!("../schema-sqlite.sql"));
        for table in ["users", "messages", "follows", "likes"] {
            let needle = format!("CREATE TABLE {}", table);
            assert!(stmts.iter().any(|s| s.starts_with(&needle)), "missing {}", table);
        }
    }
}
