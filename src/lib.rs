#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # ckan-crosswalk
//!
//! Republishes CKAN dataset records in the metadata schemas harvesters and
//! registries expect: DataCite 4.4, ISO 19139, DCAT-AP (OpenDataSwiss),
//! GCMD DIF 10.2, RIS and BibTeX.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ckan_crosswalk::{Crosswalk, Schema, SourceRecord};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let crosswalk = Crosswalk::envidat()?;
//! let record = SourceRecord::from_json(&std::fs::read_to_string("package.json")?)?;
//!
//! for schema in Schema::ALL {
//!     match crosswalk.convert(&record, schema) {
//!         Ok(text) => println!("{text}"),
//!         Err(err) => eprintln!("{err}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Tag mappings per schema and catalog settings
//! - [`record`] — The source record and embedded-JSON decoding
//! - [`mapper`] — Resolves target tags through the mapping
//! - [`person`] — Authors and contacts
//! - [`vocabulary`] — Controlled-vocabulary normalization
//! - [`doi`] — DOI extraction and related-identifier mining
//! - [`geometry`] — GeoJSON to DataCite, GML and DIF spatial markup
//! - [`formats`] — One assembler per target schema
//! - [`validation`] — Mandatory-element checks
//! - [`convert`] — The assemble, validate, render pipeline
//! - [`batch`] — Parallel conversion of many records
//! - [`rdf`] — RDF graph export of DCAT-AP (feature `format-rdf`)

pub mod batch;
pub mod clock;
pub mod config;
pub mod convert;
pub mod doi;
pub mod error;
/// Target schemas and their assemblers.
///
/// See the [`formats`] module documentation for the wire format of each
/// schema.
pub mod formats;
pub mod geometry;
pub mod mapper;
pub mod person;
#[cfg(feature = "format-rdf")]
pub mod rdf;
pub mod record;
pub mod tree;
pub mod validation;
pub mod vocabulary;
pub mod xml;

pub use batch::{convert_all, BatchReport};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CatalogSettings, CitationSettings, CrosswalkConfig, MappingConfig, SchemaMapping, TagMapping};
pub use convert::Crosswalk;
pub use doi::{extract_doi, CitationSource, HttpCitationSource, RelatedIdentifier, StaticCitationSource};
pub use error::{ConversionError, CrosswalkError, Result};
pub use formats::{Assembler, AssemblyContext, Schema};
pub use geometry::Geometry;
pub use mapper::FieldMapper;
pub use person::Person;
pub use record::SourceRecord;
pub use tree::{Document, Element};
pub use validation::{validate, ValidationFailure, ValidationResult};
pub use vocabulary::{normalize, Vocabulary};
