//! Cost report service
//!
//! Fetches company and travel payloads, assembles the company forest and
//! rolls up travel costs into the nested report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::application::{decode_expenses, decode_units, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    project, CostAggregator, DomainError, Expense, ForestBuilder, ReportNode, Unit,
};
use crate::infrastructure::traits::RecordSource;

/// Where to read records from and how to aggregate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub companies_source: String,
    pub travels_source: String,
    pub parallel: bool,
}

impl From<&Settings> for ReportOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            companies_source: settings.companies_source.clone(),
            travels_source: settings.travels_source.clone(),
            parallel: settings.parallel,
        }
    }
}

/// Bookkeeping for one report run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub companies: usize,
    pub companies_rejected: usize,
    pub duplicate_companies: usize,
    pub travels: usize,
    pub travels_rejected: usize,
    pub travels_dropped: usize,
    pub roots: usize,
    pub total_cost: Decimal,
    pub elapsed: Duration,
}

/// Output from building a cost report.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    /// One node per root company, in input order
    pub roots: Vec<ReportNode>,
    pub stats: ReportStats,
    /// Parent cycle among companies no root reaches; `roots` are unaffected by it
    pub cycle: Option<DomainError>,
}

struct LoadedRecords {
    units: Vec<Unit>,
    units_rejected: usize,
    expenses: Vec<Expense>,
    expenses_rejected: usize,
}

/// Service for building the company cost report.
pub struct ReportService {
    source: Arc<dyn RecordSource>,
    options: ReportOptions,
}

impl ReportService {
    /// Create a new report service.
    pub fn new(source: Arc<dyn RecordSource>, options: ReportOptions) -> Self {
        Self { source, options }
    }

    /// Fetch, assemble, aggregate and project.
    ///
    /// A parent cycle does not fail the build; it is returned in
    /// [`ReportOutput::cycle`] next to the trees the roots reach.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self) -> ApplicationResult<ReportOutput> {
        let start = Instant::now();

        let loaded = self.load()?;
        let companies = loaded.units.len();
        let travels = loaded.expenses.len();

        // Companies must be known before travels can be attached
        let mut builder = ForestBuilder::new();
        let forest = builder.build(loaded.units, loaded.expenses);

        let unreachable = forest.unreachable_ids();
        if !unreachable.is_empty() {
            warn!(
                "{} companies are not reachable from any root: {}",
                unreachable.len(),
                unreachable.join(", ")
            );
        }

        let rollup = CostAggregator::new()
            .with_parallel(self.options.parallel)
            .aggregate_reachable(&forest)?;
        let roots = project(&forest, &rollup)?;

        let cycle = match CostAggregator::check_detached(&forest, &rollup) {
            Ok(()) => None,
            Err(e @ DomainError::CyclicHierarchy { .. }) => {
                warn!("{}", e);
                Some(e)
            }
            Err(e) => return Err(e.into()),
        };

        let stats = ReportStats {
            companies,
            companies_rejected: loaded.units_rejected,
            duplicate_companies: builder.duplicates().len(),
            travels,
            travels_rejected: loaded.expenses_rejected,
            travels_dropped: forest.attach_summary().dropped,
            roots: roots.len(),
            total_cost: rollup.grand_total(&forest)?,
            elapsed: start.elapsed(),
        };
        info!(
            "report built: {} roots, total cost {}, {:?}",
            stats.roots, stats.total_cost, stats.elapsed
        );

        Ok(ReportOutput {
            roots,
            stats,
            cycle,
        })
    }

    /// Fetch both payloads concurrently, then decode them.
    fn load(&self) -> ApplicationResult<LoadedRecords> {
        let companies_loc = self.options.companies_source.as_str();
        let travels_loc = self.options.travels_source.as_str();

        let (companies_raw, travels_raw) = rayon::join(
            || self.source.fetch(companies_loc),
            || self.source.fetch(travels_loc),
        );
        let companies_raw = companies_raw.with_source_context(companies_loc)?;
        let travels_raw = travels_raw.with_source_context(travels_loc)?;
        debug!(
            "fetched payloads: companies={}B travels={}B",
            companies_raw.len(),
            travels_raw.len()
        );

        let units = decode_units(&companies_raw, companies_loc)?;
        let expenses = decode_expenses(&travels_raw, travels_loc)?;

        Ok(LoadedRecords {
            units_rejected: units.rejected.len(),
            units: units.records,
            expenses_rejected: expenses.rejected.len(),
            expenses: expenses.records,
        })
    }
}
