//! The conversion pipeline: assemble, validate, render.
//!
//! [`Crosswalk`] owns everything a conversion reads: the loaded
//! configuration, the citation source used by the DOI miner, and the clock.
//! It holds no per-record state, so one value can convert any number of
//! records, from any number of threads.
//!
//! # Examples
//!
//! ```ignore
//! use ckan_crosswalk::{Crosswalk, Schema, SourceRecord};
//!
//! let crosswalk = Crosswalk::envidat()?;
//! let record = SourceRecord::from_json(&package_json)?;
//! match crosswalk.convert(&record, Schema::DataCite) {
//!     Ok(xml) => println!("{xml}"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use crate::clock::{Clock, SystemClock};
use crate::config::CrosswalkConfig;
use crate::doi::{CitationSource, HttpCitationSource};
use crate::error::{ConversionError, Result};
use crate::formats::{assembler_for, dcat, render, AssemblyContext, Schema};
use crate::record::SourceRecord;
use crate::tree::Document;
use crate::validation::{validate, ValidationResult};

/// Record name used in errors about a whole-catalog export.
pub const CATALOG_RECORD: &str = "catalog";

/// A configured converter.
#[derive(Debug, Clone)]
pub struct Crosswalk {
    config: CrosswalkConfig,
    citations: Arc<dyn CitationSource>,
    clock: Arc<dyn Clock>,
}

impl Crosswalk {
    /// Creates a converter that queries the configured citation service and
    /// reads the system clock.
    ///
    /// `API_HOST` and `API_ENVIDAT_DORA` override the citation service
    /// location.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(mut config: CrosswalkConfig) -> Result<Self> {
        config.catalog.citation = config.catalog.citation.clone().with_env_overrides();
        let citations = HttpCitationSource::new(&config.catalog.citation)?;
        Ok(Self {
            config,
            citations: Arc::new(citations),
            clock: Arc::new(SystemClock),
        })
    }

    /// Creates a converter over the built-in EnviDat configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn envidat() -> Result<Self> {
        Self::new(CrosswalkConfig::envidat()?)
    }

    /// Replaces the citation source.
    #[must_use]
    pub fn with_citation_source(mut self, citations: impl CitationSource + 'static) -> Self {
        self.citations = Arc::new(citations);
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &CrosswalkConfig {
        &self.config
    }

    fn context<'a>(
        &'a self,
        record: &'a SourceRecord,
        schema: Schema,
        reserved_doi: Option<&'a str>,
    ) -> AssemblyContext<'a> {
        AssemblyContext {
            record,
            mapping: self.config.mapping.section(schema),
            catalog: &self.config.catalog,
            citations: self.citations.as_ref(),
            clock: self.clock.as_ref(),
            reserved_doi,
        }
    }

    /// Builds the unvalidated document of `record` for `schema`.
    #[must_use]
    pub fn assemble(&self, record: &SourceRecord, schema: Schema) -> Document {
        assembler_for(schema).assemble(&self.context(record, schema, None))
    }

    /// Checks a document's mandatory elements.
    #[must_use]
    pub fn validate(&self, document: &Document) -> ValidationResult {
        validate(document)
    }

    /// Converts one record to one schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Invalid`] with every missing mandatory
    /// element, or [`ConversionError::Serialization`] if rendering fails.
    pub fn convert(&self, record: &SourceRecord, schema: Schema) -> std::result::Result<String, ConversionError> {
        self.finish(record.name(), self.assemble(record, schema))
    }

    /// Converts one record to DataCite, taking the DOI from `name_doi_map`
    /// when the record has none of its own.
    ///
    /// # Errors
    ///
    /// As for [`convert`](Self::convert).
    pub fn convert_datacite(
        &self,
        record: &SourceRecord,
        name_doi_map: &HashMap<String, String>,
    ) -> std::result::Result<String, ConversionError> {
        let reserved = name_doi_map.get(record.name()).map(String::as_str);
        let context = self.context(record, Schema::DataCite, reserved);
        self.finish(record.name(), assembler_for(Schema::DataCite).assemble(&context))
    }

    /// Converts many records into one DCAT-AP catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Serialization`] if rendering fails.
    pub fn convert_dcat_catalog(&self, records: &[SourceRecord]) -> std::result::Result<String, ConversionError> {
        let datasets = records
            .iter()
            .map(|record| dcat::dataset(&self.context(record, Schema::DcatAp, None)))
            .collect();
        self.finish(CATALOG_RECORD, dcat::catalog(datasets))
    }

    fn finish(&self, record: &str, document: Document) -> std::result::Result<String, ConversionError> {
        let schema = document.schema;
        let result = self.validate(&document);
        if !result.is_valid() {
            let failures = result.failures;
            error!(record, %schema, ?failures, "record failed validation");
            return Err(ConversionError::Invalid {
                record: record.to_string(),
                schema,
                failures,
            });
        }
        let rendered = render(&document).map_err(|source| {
            error!(record, %schema, error = %source, "record could not be serialized");
            ConversionError::Serialization {
                record: record.to_string(),
                schema,
                source,
            }
        })?;
        debug!(record, %schema, bytes = rendered.len(), "record converted");
        Ok(rendered)
    }
}
