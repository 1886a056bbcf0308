//! In-process store backed by a BTreeMap. Used for tests and database-less runs.

use super::UserStore;
use crate::error::StoreError;
use crate::model::{User, ACCOUNT_FIELD};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn account_taken(rows: &BTreeMap<i64, User>, account: &str, except: Option<i64>) -> bool {
        rows.values().any(|u| u.account == account && Some(u.id) != except)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".into())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_key(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn find_one(&self, field: &str, value: &Value) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .rows
            .values()
            .find(|u| u.field_value(field).as_ref() == Some(value))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn create(&self, fields: &Map<String, Value>) -> Result<User, StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let id = inner.next_id + 1;
        let user = User::from_fields(id, fields, Utc::now())?;
        if user.account.is_empty() || user.password.is_empty() {
            return Err(StoreError::Constraint("account and password must not be null".into()));
        }
        if Self::account_taken(&inner.rows, &user.account, None) {
            return Err(StoreError::Conflict(format!("{} '{}' already exists", ACCOUNT_FIELD, user.account)));
        }
        inner.next_id = id;
        inner.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, fields: &Map<String, Value>) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let Some(current) = inner.rows.get(&id) else {
            return Ok(0);
        };
        let mut updated = current.clone();
        updated.apply_fields(fields)?;
        if Self::account_taken(&inner.rows, &updated.account, Some(id)) {
            return Err(StoreError::Conflict(format!("{} '{}' already exists", ACCOUNT_FIELD, updated.account)));
        }
        updated.updated_at = Utc::now();
        inner.rows.insert(id, updated);
        Ok(1)
    }

    async fn destroy(&self, id: i64) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        Ok(inner.rows.remove(&id).map(|_| 1).unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
