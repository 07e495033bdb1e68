//! The assembler trait shared by every target schema.
//!
//! An assembler is a pure function of its [`AssemblyContext`]: the record,
//! the schema's mapping section, catalog settings, and the two injected
//! collaborators (citation source and clock). It returns an unvalidated
//! tree; validation is a separate step so callers can inspect partial
//! output.

use std::fmt;

use tracing::warn;

use crate::clock::Clock;
use crate::config::{CatalogSettings, SchemaMapping};
use crate::doi::{CitationSource, DoiMiner};
use crate::geometry::{transcode, Geometry, GeoNode, GmlIds};
use crate::mapper::FieldMapper;
use crate::record::SourceRecord;
use crate::tree::Document;

use super::Schema;

/// Everything an assembler may read.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    /// Record being converted.
    pub record: &'a SourceRecord,
    /// Mapping section of the target schema.
    pub mapping: &'a SchemaMapping,
    /// Catalog constants.
    pub catalog: &'a CatalogSettings,
    /// Citation service used by the DOI miner.
    pub citations: &'a dyn CitationSource,
    /// Time source for time-dependent defaults.
    pub clock: &'a dyn Clock,
    /// DOI reserved for the record when it carries none itself.
    pub reserved_doi: Option<&'a str>,
}

impl<'a> AssemblyContext<'a> {
    /// Mapper over the record through the schema's mapping.
    #[must_use]
    pub fn mapper(&self) -> FieldMapper<'a> {
        FieldMapper::for_record(self.record, self.mapping)
    }

    /// DOI miner configured from the catalog settings.
    #[must_use]
    pub fn miner(&self) -> DoiMiner<'a> {
        DoiMiner::new(
            self.citations,
            &self.catalog.citation,
            &self.catalog.cites_prefixes,
        )
    }

    /// Name of the record, for logging.
    #[must_use]
    pub fn record_name(&self) -> &'a str {
        self.record.name()
    }

    /// Reads and transcodes the geometry mapped for `tag`.
    ///
    /// Malformed geometries are logged and omitted.
    pub fn geometry(&self, tag: &str, target: Schema, ids: &mut GmlIds) -> GeoNode {
        let Some(value) = self.mapper().value(tag) else {
            return GeoNode::default();
        };
        match Geometry::from_value(&value) {
            Ok(Some(geometry)) => transcode(&geometry, target, ids),
            Ok(None) => GeoNode::default(),
            Err(err) => {
                warn!(record = %self.record_name(), schema = %target, error = %err, "omitting spatial block");
                GeoNode::default()
            },
        }
    }
}

/// Builds the document tree of one schema.
pub trait Assembler: fmt::Debug + Send + Sync {
    /// The schema this assembler produces.
    fn schema(&self) -> Schema;

    /// Assembles the unvalidated document for the context's record.
    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Document;
}
