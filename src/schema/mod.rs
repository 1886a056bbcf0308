//! Schema derivation: record-type descriptors compiled into reusable validation rules.

mod derive;
mod rule;

pub use derive::{derive_schema, DerivedSchema};
pub use rule::{BaseRule, FieldRule};
