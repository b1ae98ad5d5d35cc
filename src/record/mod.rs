//! Vacancy record schema.
//!
//! Field names on the wire are the datastore's column names; the fixed
//! column set is closed and not extensible at parse time.

pub mod types;

pub use types::*;
