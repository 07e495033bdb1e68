//! Error types for crosswalk operations.
//!
//! This module provides the [`CrosswalkError`] type for failures that stop a
//! whole run (bad configuration, I/O, serializer faults) and the [`Result`]
//! convenience type. Per-record problems that only suppress one document are
//! reported as [`ConversionError`] values instead.

use thiserror::Error;

use crate::formats::Schema;
use crate::validation::ValidationFailure;

/// Error type for all crosswalk library operations.
#[derive(Error, Debug)]
pub enum CrosswalkError {
    /// The mapping configuration document is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A tag the schema requires has no mapping entry.
    #[error("Missing mapping for {schema}: {tag}")]
    MissingMapping {
        /// Schema whose section is incomplete.
        schema: Schema,
        /// Required tag lacking an entry.
        tag: String,
    },

    /// JSON decoding failure for a record or configuration document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A geometry whose coordinates do not match its declared type.
    #[error("Malformed geometry: {0}")]
    Geometry(String),

    /// The XML writer rejected the document tree.
    #[error("XML error: {0}")]
    Xml(String),

    /// The external citation service could not be used.
    #[error("Citation service error: {0}")]
    Citation(String),

    /// RDF graph construction or serialization failed.
    #[error("RDF error: {0}")]
    Rdf(String),
}

/// Convenience type alias for [`std::result::Result`] with [`CrosswalkError`].
pub type Result<T> = std::result::Result<T, CrosswalkError>;

/// Failure value for one record converted to one schema.
///
/// Returned by the conversion pipeline instead of a document so that batch
/// callers can count partial successes and report per-record reasons.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The assembled tree lacks mandatory elements.
    #[error("{schema} record '{record}' is invalid: {}", join_failures(.failures))]
    Invalid {
        /// Name of the source record.
        record: String,
        /// Target schema.
        schema: Schema,
        /// Every missing element found.
        failures: Vec<ValidationFailure>,
    },

    /// The tree could not be rendered to its wire format.
    #[error("{schema} record '{record}' could not be serialized: {source}")]
    Serialization {
        /// Name of the source record.
        record: String,
        /// Target schema.
        schema: Schema,
        /// Underlying serializer error.
        #[source]
        source: CrosswalkError,
    },
}

impl ConversionError {
    /// Returns the name of the record that failed.
    #[must_use]
    pub fn record(&self) -> &str {
        match self {
            Self::Invalid { record, .. } | Self::Serialization { record, .. } => record,
        }
    }

    /// Returns the validation failures, empty for serializer faults.
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            Self::Invalid { failures, .. } => failures,
            Self::Serialization { .. } => &[],
        }
    }
}

fn join_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_lists_every_failure() {
        let err = ConversionError::Invalid {
            record: "gem2".into(),
            schema: Schema::DataCite,
            failures: vec![
                ValidationFailure::MissingIdentifier,
                ValidationFailure::MissingTitle,
            ],
        };
        assert_eq!(
            err.to_string(),
            "DataCite record 'gem2' is invalid: missing identifier, missing title"
        );
        assert_eq!(err.record(), "gem2");
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_missing_mapping_display() {
        let err = CrosswalkError::MissingMapping {
            schema: Schema::Iso19139,
            tag: "title".into(),
        };
        assert_eq!(err.to_string(), "Missing mapping for ISO 19139: title");
    }
}
