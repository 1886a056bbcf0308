//! Apply a record type to the database: CREATE SCHEMA and CREATE TABLE derived from its descriptors.

use crate::case::to_snake_case;
use crate::config::{validate, FieldDescriptor, FieldKind, RecordType};
use crate::error::{AppError, ConfigError};
use crate::sql::{column_pg_type, is_timestamp_column};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn column_def(d: &FieldDescriptor) -> String {
    let name = quote(&to_snake_case(&d.name));
    if d.primary_key && d.kind == FieldKind::Integer {
        return format!("{} BIGSERIAL", name);
    }
    let mut def = format!("{} {}", name, column_pg_type(d).to_uppercase());
    if !d.nullable {
        def.push_str(" NOT NULL");
    }
    if is_timestamp_column(d) {
        def.push_str(" DEFAULT NOW()");
    }
    if d.kind == FieldKind::Enum {
        let values: Vec<String> = d.constraints.allowed_values.iter().map(|v| literal(v)).collect();
        def.push_str(&format!(" CHECK ({} IN ({}))", name, values.join(", ")));
    }
    def
}

/// DDL for one record type. Idempotent (`IF NOT EXISTS`).
pub fn create_table_sql(schema: &str, record: &RecordType) -> Result<String, ConfigError> {
    validate(record)?;
    let mut col_defs: Vec<String> = record.fields.iter().map(column_def).collect();
    if let Some(pk) = record.primary_key() {
        col_defs.push(format!("PRIMARY KEY ({})", quote(&to_snake_case(&pk.name))));
    }
    for f in record.fields.iter().filter(|f| f.unique) {
        let col = to_snake_case(&f.name);
        col_defs.push(format!(
            "CONSTRAINT {} UNIQUE ({})",
            quote(&format!("{}_{}_key", record.name, col)),
            quote(&col)
        ));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}.{} (\n  {}\n)",
        quote(schema),
        quote(&record.name),
        col_defs.join(",\n  ")
    ))
}

/// Create the schema and the record type's table if missing.
pub async fn apply_migrations(pool: &PgPool, schema: &str, record: &RecordType) -> Result<(), AppError> {
    let ddl = create_table_sql(schema, record)?;
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote(schema)))
        .execute(pool)
        .await
        .map_err(|e| AppError::Store(e.into()))?;
    tracing::debug!(sql = %ddl, "migration");
    sqlx::query(&ddl)
        .execute(pool)
        .await
        .map_err(|e| AppError::Store(e.into()))?;
    tracing::info!(table = %record.name, "table ready");
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database when it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Config(ConfigError::Load(format!("invalid DATABASE_URL: {}", e))))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(|e| AppError::Store(e.into()))?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(|e| AppError::Store(e.into()))?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(|e| AppError::Store(e.into()))?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::Config(ConfigError::Load("DATABASE_URL: no path".into())))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user_record_type;

    #[test]
    fn users_table_ddl() {
        let ddl = create_table_sql("public", &user_record_type()).unwrap();
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"public\".\"users\""));
        assert!(ddl.contains("\"id\" BIGSERIAL"));
        assert!(ddl.contains("\"account\" TEXT NOT NULL"));
        assert!(ddl.contains("\"nick_name\" TEXT,"));
        assert!(ddl.contains("\"associated_uid\" BIGINT,"));
        assert!(ddl.contains("\"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
        assert!(ddl.contains("PRIMARY KEY (\"id\")"));
        assert!(ddl.contains("CONSTRAINT \"users_account_key\" UNIQUE (\"account\")"));
    }

    #[test]
    fn enum_columns_get_check_constraint() {
        let record = RecordType::new(
            "t",
            vec![FieldDescriptor::new("role", FieldKind::Enum).allowed(["admin", "o'neil"])],
        );
        let ddl = create_table_sql("public", &record).unwrap();
        assert!(ddl.contains("CHECK (\"role\" IN ('admin', 'o''neil'))"));
    }

    #[test]
    fn db_name_is_split_from_url() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/accounts?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "accounts");
    }
}
