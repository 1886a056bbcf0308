//! Record types served by the API.

pub mod user;

pub use user::{login_record_type, user_record_type, User, ACCOUNT_FIELD, SERVER_ASSIGNED, USERS_TABLE};
