//! UserService: validated account operations over the store.

mod users;
mod validation;
pub use users::{Caller, UserSchemas, UserService};
pub use validation::{RequestValidator, ValidatedInput};
