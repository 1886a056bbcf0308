//! Safe SQL builder and parameter binding for record-type tables.

pub mod builder;
pub mod params;

pub use builder::*;
pub use params::PgBindValue;
