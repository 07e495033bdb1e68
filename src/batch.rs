//! Parallel conversion of many records using Rayon.
//!
//! [`convert_all`] runs one conversion per record on a dedicated pool of at
//! most `concurrency` threads. Records are independent, so a slow citation
//! lookup in one record only delays that record. Outcomes come back in input
//! order whatever order the work finished in.
//!
//! # Examples
//!
//! ```ignore
//! use ckan_crosswalk::batch::convert_all;
//! use ckan_crosswalk::Schema;
//!
//! let report = convert_all(&crosswalk, &records, Schema::DataCite, 8)?;
//! println!("{}/{} converted", report.succeeded(), report.len());
//! # Ok::<(), ckan_crosswalk::CrosswalkError>(())
//! ```

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::info;

use crate::convert::Crosswalk;
use crate::error::{ConversionError, CrosswalkError, Result};
use crate::formats::Schema;
use crate::record::SourceRecord;

/// Result of converting one record.
pub type Outcome = std::result::Result<String, ConversionError>;

/// Per-record outcomes of a batch, in input order.
#[derive(Debug)]
pub struct BatchReport {
    /// Target schema.
    pub schema: Schema,
    /// One outcome per input record.
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    /// Number of records converted successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }

    /// Number of records that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterates over the failures.
    pub fn errors(&self) -> impl Iterator<Item = &ConversionError> {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().err())
    }
}

/// Converts every record to `schema` on a pool of `concurrency` threads.
///
/// A `concurrency` of 0 lets Rayon pick the thread count.
///
/// # Errors
///
/// Returns [`CrosswalkError::Config`] if the thread pool cannot be built.
/// Per-record failures are reported in the [`BatchReport`], never here.
pub fn convert_all(
    crosswalk: &Crosswalk,
    records: &[SourceRecord],
    schema: Schema,
    concurrency: usize,
) -> Result<BatchReport> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .thread_name(|index| format!("crosswalk-{index}"))
        .build()
        .map_err(|err| CrosswalkError::Config(format!("cannot build thread pool: {err}")))?;

    let outcomes: Vec<Outcome> = pool.install(|| {
        records
            .par_iter()
            .map(|record| crosswalk.convert(record, schema))
            .collect()
    });

    let report = BatchReport { schema, outcomes };
    info!(
        %schema,
        total = report.len(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "batch converted"
    );
    Ok(report)
}
