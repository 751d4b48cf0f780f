//! Application layer: ingestion and report use cases
//!
//! This layer orchestrates domain logic and depends on the record-source boundary trait.

pub mod error;
pub mod error_ext;
pub mod ingest;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use ingest::{decode_expenses, decode_units, Ingested};
