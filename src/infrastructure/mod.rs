//! Infrastructure layer: I/O implementations
//!
//! This layer implements the record-source boundary trait.

pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use traits::{is_remote, RealRecordSource, RecordSource};
