//! Client for the external tabular datastore and the confirmed-record
//! write path.

mod client;
mod write;

pub use client::TableClient;
pub use write::{write_records, WriteOutcome};
