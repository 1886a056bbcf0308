//! HTTP handlers for the user account routes.

pub mod users;
pub use users::*;
