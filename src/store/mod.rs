//! Record store capability: single-record create/read/update/delete keyed by id.
//!
//! The store enforces uniqueness of the account field and reports violations as
//! [`StoreError::Conflict`] so callers can tell them apart from other failures.

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use crate::error::StoreError;
use crate::model::User;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_key(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// First record (lowest id) whose `field` equals `value`. Unknown fields match nothing.
    async fn find_one(&self, field: &str, value: &Value) -> Result<Option<User>, StoreError>;

    /// All records ordered by id.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Insert a record from validated fields (API field names). Returns the stored row.
    async fn create(&self, fields: &Map<String, Value>) -> Result<User, StoreError>;

    /// Apply the present fields to record `id`. Returns the number of affected records.
    async fn update(&self, id: i64, fields: &Map<String, Value>) -> Result<u64, StoreError>;

    /// Returns the number of removed records.
    async fn destroy(&self, id: i64) -> Result<u64, StoreError>;

    /// Cheap liveness check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}
