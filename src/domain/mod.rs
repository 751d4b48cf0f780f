//! Domain layer: records, forest assembly, and cost rollup
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod report;
pub mod tree_display;

pub use aggregate::{CostAggregator, CostRollup};
pub use arena::{AttachSummary, Forest, ForestIterator, UnitNode};
pub use builder::ForestBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult, RecordKind};
pub use report::{project, ReportNode, MAX_REPORT_DEPTH};
pub use tree_display::{render_forest, TreeDisplay};
