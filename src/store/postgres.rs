//! PostgreSQL store: parameterized SQL built from the record type, rows decoded with `FromRow`.

use super::UserStore;
use crate::config::RecordType;
use crate::error::StoreError;
use crate::model::User;
use crate::sql::{self, PgBindValue, QueryBuf, TableRef};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    table: TableRef,
}

impl PgUserStore {
    pub fn new(pool: PgPool, schema: &str, record: &RecordType) -> Self {
        PgUserStore {
            pool,
            table: TableRef::from_record(schema, record),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<User>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, User>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query.fetch_optional(&self.pool).await.map_err(StoreError::from_sqlx)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let result = query.execute(&self.pool).await.map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_key(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.fetch_optional(&sql::select_by_id(&self.table, id)).await
    }

    async fn find_one(&self, field: &str, value: &Value) -> Result<Option<User>, StoreError> {
        match sql::select_one(&self.table, field, value) {
            Some(q) => self.fetch_optional(&q).await,
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let q = sql::select_all(&self.table);
        tracing::debug!(sql = %q.sql, "query");
        sqlx::query_as::<_, User>(&q.sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create(&self, fields: &Map<String, Value>) -> Result<User, StoreError> {
        self.fetch_optional(&sql::insert(&self.table, fields))
            .await?
            .ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update(&self, id: i64, fields: &Map<String, Value>) -> Result<u64, StoreError> {
        self.execute(&sql::update(&self.table, id, fields)).await
    }

    async fn destroy(&self, id: i64) -> Result<u64, StoreError> {
        self.execute(&sql::delete(&self.table, id)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}
