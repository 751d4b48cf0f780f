//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (RecordSource)
//! but are themselves concrete structs, not traits.

mod report;

pub use report::{ReportOptions, ReportOutput, ReportService, ReportStats};
