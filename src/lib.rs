//! Account kit: user accounts over a relational store, with request validation
//! derived from field descriptors and token-based authentication.

pub mod auth;
pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::{Argon2Hasher, Claims, CredentialHasher, JwtIssuer, TokenIssuer};
pub use config::{FieldDescriptor, FieldKind, RecordType, Settings};
pub use error::{AppError, ConfigError, FieldIssue, StoreError, ValidationError};
pub use migration::{apply_migrations, ensure_database_exists};
pub use model::{user_record_type, User};
pub use response::{BizCode, ResponseEnvelope};
pub use routes::{build_router, common_routes, common_routes_with_ready, user_routes};
pub use schema::{derive_schema, DerivedSchema};
pub use service::{Caller, RequestValidator, UserSchemas, UserService, ValidatedInput};
pub use state::AppState;
pub use store::{MemoryUserStore, PgUserStore, UserStore};
