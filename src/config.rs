//! Mapping configuration and catalog settings.
//!
//! A configuration document maps every tag of every target schema to the
//! source-record field it is read from. It is JSON with one section per
//! schema (`datacite_converter`, `iso19139_converter`, `dcat_ap_converter`,
//! `dif_converter`, `ris_converter`, `bibtex_converter`) and an optional
//! `catalog` section holding [`CatalogSettings`].
//!
//! Each tag maps to one of:
//! - a field name (`"title": "title"`), optionally a one-level path into an
//!   embedded JSON field (`"publisher": "publication.publisher"`),
//! - a list of field names, read in order (`"subject": ["display_name", "name"]`),
//! - a nested mapping describing the sub-fields of composite items
//!   (`"creator": {"familyName": "name", ...}`).
//!
//! The document is validated when it is loaded: a section lacking a tag its
//! schema requires is a load-time error, never a per-record one.
//!
//! # Examples
//!
//! ```ignore
//! use ckan_crosswalk::config::CrosswalkConfig;
//!
//! // Built-in EnviDat mapping
//! let config = CrosswalkConfig::envidat()?;
//!
//! // Custom mapping; sections other than DataCite may be omitted
//! let config = CrosswalkConfig::from_file("converters.json")?;
//! # Ok::<(), ckan_crosswalk::CrosswalkError>(())
//! ```

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CrosswalkError, Result};
use crate::formats::Schema;

/// Built-in EnviDat configuration document.
pub const ENVIDAT_CONFIG: &str = include_str!("../config/converters.json");

/// How one target tag is read from the source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagMapping {
    /// A single field name or `field.key` path.
    Field(String),
    /// Several candidate fields, in priority order.
    Fields(Vec<String>),
    /// Sub-field mapping for composite items.
    Nested(SchemaMapping),
}

impl TagMapping {
    /// Returns the field names this mapping reads, in order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Field(field) => vec![field.as_str()],
            Self::Fields(fields) => fields.iter().map(String::as_str).collect(),
            Self::Nested(_) => Vec::new(),
        }
    }
}

/// Ordered target-tag to source-field mapping for one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaMapping {
    tags: IndexMap<String, TagMapping>,
}

impl SchemaMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a tag entry.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>, mapping: TagMapping) -> Self {
        self.tags.insert(tag.into(), mapping);
        self
    }

    /// Adds a tag read from a single field.
    #[must_use]
    pub fn with_field(self, tag: impl Into<String>, field: impl Into<String>) -> Self {
        self.with_tag(tag, TagMapping::Field(field.into()))
    }

    /// Returns the entry for a tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&TagMapping> {
        self.tags.get(tag)
    }

    /// Returns true if the tag has an entry.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Returns the first field name mapped for a tag.
    #[must_use]
    pub fn field(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(|mapping| mapping.fields().first().copied())
    }

    /// Returns every field name mapped for a tag.
    #[must_use]
    pub fn fields(&self, tag: &str) -> Vec<&str> {
        self.get(tag).map(TagMapping::fields).unwrap_or_default()
    }

    /// Returns the nested mapping of a composite tag.
    #[must_use]
    pub fn nested(&self, tag: &str) -> Option<&SchemaMapping> {
        match self.get(tag) {
            Some(TagMapping::Nested(mapping)) => Some(mapping),
            _ => None,
        }
    }

    /// Iterates over tags in document order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Number of mapped tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if no tag is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Immutable per-run mapping for every target schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConfig {
    sections: IndexMap<Schema, SchemaMapping>,
}

impl MappingConfig {
    /// Validates and wraps the given sections.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::MissingMapping`] if a section lacks a tag its
    /// schema requires, or [`CrosswalkError::Config`] if a composite tag is
    /// not a nested mapping.
    pub fn new(sections: IndexMap<Schema, SchemaMapping>) -> Result<Self> {
        for schema in Schema::ALL {
            let section = sections.get(&schema).ok_or_else(|| {
                CrosswalkError::Config(format!("missing section '{}'", schema.config_key()))
            })?;
            validate_section(schema, section)?;
        }
        Ok(Self { sections })
    }

    /// Returns the mapping section of a schema.
    #[must_use]
    pub fn section(&self, schema: Schema) -> &SchemaMapping {
        // `new` guarantees every schema has a section.
        &self.sections[&schema]
    }
}

fn validate_section(schema: Schema, section: &SchemaMapping) -> Result<()> {
    for tag in schema.required_tags() {
        if !section.contains(tag) {
            return Err(CrosswalkError::MissingMapping {
                schema,
                tag: (*tag).to_string(),
            });
        }
    }
    for tag in schema.nested_tags() {
        if section.contains(tag) && section.nested(tag).is_none() {
            return Err(CrosswalkError::Config(format!(
                "{}: tag '{tag}' must be a nested mapping",
                schema.config_key()
            )));
        }
    }
    Ok(())
}

/// Settings of the external citation service that resolves repository PIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationSettings {
    /// Service host, e.g. `https://envidat.ch`.
    pub base_url: String,
    /// Service path appended to the host, e.g. `/dora`.
    pub path: String,
    /// URL fragment after which a repository PID starts.
    pub marker: String,
    /// Citation style whose text is scanned for a DOI.
    pub style: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CitationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://envidat.ch".into(),
            path: "/dora".into(),
            marker: "dora.lib4ri.ch/wsl/islandora/object/".into(),
            style: "ACS".into(),
            timeout_secs: 10,
        }
    }
}

impl CitationSettings {
    /// Full endpoint URL without the PID.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.path
        )
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Overrides host and path from `API_HOST` and `API_ENVIDAT_DORA` when set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("API_HOST") {
            if !host.trim().is_empty() {
                self.base_url = host;
            }
        }
        if let Ok(path) = std::env::var("API_ENVIDAT_DORA") {
            if !path.trim().is_empty() {
                self.path = path;
            }
        }
        self
    }
}

/// Catalog-level constants used by the assemblers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Base of dataset pages; the dataset name or id is appended.
    pub dataset_url: String,
    /// Base of metadata landing pages; the dataset name is appended.
    pub metadata_url: String,
    /// URL prefixes of the catalog's own dataset pages. Related URLs starting
    /// with one of these are `Cites` relations.
    pub cites_prefixes: Vec<String>,
    /// Publisher used when a record names none.
    pub publisher: String,
    /// Publisher home page.
    pub publisher_url: String,
    /// Display name of the support contact.
    pub support_name: String,
    /// Support contact mailbox.
    pub support_email: String,
    /// Suffix appended to dataset ids in catalog-scoped identifiers.
    pub identifier_suffix: String,
    /// DCAT theme URI assigned to every dataset.
    pub dcat_theme: String,
    /// Short name of the hosting organization.
    pub organization: String,
    /// Long name of the hosting organization.
    pub organization_name: String,
    /// Home page of the hosting organization.
    pub organization_url: String,
    /// External citation service.
    pub citation: CitationSettings,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            dataset_url: "https://www.envidat.ch/dataset/".into(),
            metadata_url: "https://www.envidat.ch/#/metadata/".into(),
            cites_prefixes: vec![
                "https://envidat.ch/#/metadata/".into(),
                "https://envidat.ch/dataset/".into(),
            ],
            publisher: "EnviDat".into(),
            publisher_url: "https://envidat.ch/#/about".into(),
            support_name: "EnviDat Support".into(),
            support_email: "envidat@wsl.ch".into(),
            identifier_suffix: "@envidat".into(),
            dcat_theme: "http://opendata.swiss/themes/education".into(),
            organization: "WSL".into(),
            organization_name: "Swiss Federal Institute for Forest, Snow and Landscape Research WSL"
                .into(),
            organization_url: "https://www.wsl.ch".into(),
            citation: CitationSettings::default(),
        }
    }
}

impl CatalogSettings {
    /// Sets the dataset page base URL.
    #[must_use]
    pub fn with_dataset_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_url = url.into();
        self
    }

    /// Sets the prefixes that mark `Cites` relations.
    #[must_use]
    pub fn with_cites_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cites_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the default publisher.
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Sets the citation service settings.
    #[must_use]
    pub fn with_citation(mut self, citation: CitationSettings) -> Self {
        self.citation = citation;
        self
    }

    /// Page URL of a dataset by name or id.
    #[must_use]
    pub fn dataset_page(&self, name_or_id: &str) -> String {
        format!("{}{name_or_id}", self.dataset_url)
    }

    /// Page URL of one resource of a dataset.
    #[must_use]
    pub fn resource_page(&self, dataset: &str, resource_id: &str) -> String {
        format!("{}{dataset}/resource/{resource_id}", self.dataset_url)
    }

    /// Landing page of a dataset's metadata.
    #[must_use]
    pub fn metadata_page(&self, name: &str) -> String {
        format!("{}{name}", self.metadata_url)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    catalog: Option<CatalogSettings>,
    #[serde(flatten)]
    sections: IndexMap<String, SchemaMapping>,
}

/// A loaded configuration: tag mappings plus catalog settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrosswalkConfig {
    /// Tag mappings per schema.
    pub mapping: MappingConfig,
    /// Catalog constants.
    pub catalog: CatalogSettings,
}

impl CrosswalkConfig {
    /// Loads the built-in EnviDat configuration.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded document is inconsistent.
    pub fn envidat() -> Result<Self> {
        Self::parse(ENVIDAT_CONFIG, None)
    }

    /// Parses a configuration document.
    ///
    /// The `datacite_converter` section is mandatory. Other sections and the
    /// `catalog` block fall back to the built-in EnviDat values.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON, the DataCite section is
    /// missing, or any section lacks a required tag.
    pub fn from_json(json: &str) -> Result<Self> {
        let builtin = Self::envidat()?;
        Self::parse(json, Some(&builtin))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn parse(json: &str, fallback: Option<&Self>) -> Result<Self> {
        let mut document: ConfigDocument = serde_json::from_str(json)?;

        let mut sections = IndexMap::new();
        for schema in Schema::ALL {
            let section = match document.sections.shift_remove(schema.config_key()) {
                Some(section) => section,
                None if schema == Schema::DataCite => {
                    return Err(CrosswalkError::Config(format!(
                        "missing section '{}'",
                        schema.config_key()
                    )));
                },
                None => match fallback {
                    Some(builtin) => builtin.mapping.section(schema).clone(),
                    None => {
                        return Err(CrosswalkError::Config(format!(
                            "missing section '{}'",
                            schema.config_key()
                        )))
                    },
                },
            };
            sections.insert(schema, section);
        }

        let catalog = document
            .catalog
            .or_else(|| fallback.map(|builtin| builtin.catalog.clone()))
            .unwrap_or_default();

        Ok(Self {
            mapping: MappingConfig::new(sections)?,
            catalog,
        })
    }
}
