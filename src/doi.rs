//! DOI mining from free text.
//!
//! Related publications and datasets are entered as free text, often with
//! Markdown links. This module pulls DOIs and URLs out of that text and
//! classifies them as DataCite related identifiers. Tokens pointing into an
//! institutional repository (recognized by a configurable path marker) are
//! resolved through an external citation service whose citation text is
//! scanned for a DOI.
//!
//! The citation service is the only blocking call in a conversion. It sits
//! behind the [`CitationSource`] trait; failures are logged and treated as
//! "no DOI found", never propagated.
//!
//! # Examples
//!
//! ```ignore
//! use ckan_crosswalk::doi::extract_doi;
//!
//! assert_eq!(
//!     extract_doi("https://doi.org/10.1525/cse.2022.1561651").as_deref(),
//!     Some("10.1525/cse.2022.1561651")
//! );
//! assert_eq!(extract_doi("no identifier here"), None);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::CitationSettings;
use crate::error::{CrosswalkError, Result};

lazy_static! {
    /// Line breaks and Markdown link punctuation.
    static ref LINK_SYNTAX: Regex = Regex::new(r"[\r\n\[\]()]").expect("valid regex");
}

/// Returns the DOI embedded in a citation token.
///
/// The token must contain the literal `doi`; the DOI is everything from the
/// first `10.` onwards. Trailing punctuation is not stripped.
#[must_use]
pub fn extract_doi(word: &str) -> Option<String> {
    if !word.contains("doi") {
        return None;
    }
    word.find("10.").map(|start| word[start..].to_string())
}

/// Normalizes a repository PID: `%3A` becomes `:`, asterisks are removed.
#[must_use]
pub fn normalize_pid(pid: &str) -> String {
    pid.replace("%3A", ":").replace('*', "")
}

/// A service that returns citation text for a repository PID.
pub trait CitationSource: fmt::Debug + Send + Sync {
    /// Returns the citation of `pid` in `style`, or `None` if the service
    /// knows no such citation.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or an unexpected response.
    fn citation(&self, pid: &str, style: &str) -> Result<Option<String>>;
}

/// Citation source backed by the repository's JSON API.
///
/// Requests `GET {base_url}{path}/{pid}` and reads `[pid].citation[style]`.
#[derive(Debug, Clone)]
pub struct HttpCitationSource {
    client: Client,
    endpoint: String,
}

impl HttpCitationSource {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Citation`] if the HTTP client cannot be built.
    pub fn new(settings: &CitationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(format!("ckan-crosswalk/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| CrosswalkError::Citation(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint(),
        })
    }
}

impl CitationSource for HttpCitationSource {
    fn citation(&self, pid: &str, style: &str) -> Result<Option<String>> {
        let url = format!("{}/{pid}", self.endpoint);
        let body: Value = self
            .client
            .get(&url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json)
            .map_err(|err| CrosswalkError::Citation(format!("{url}: {err}")))?;
        Ok(body
            .get(pid)
            .and_then(|entry| entry.get("citation"))
            .and_then(|citation| citation.get(style))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

/// Citation source answering from a fixed table; never touches the network.
#[derive(Debug, Clone, Default)]
pub struct StaticCitationSource {
    citations: HashMap<String, String>,
}

impl StaticCitationSource {
    /// Creates an empty source that knows no citations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the citation text for a PID.
    #[must_use]
    pub fn with_citation(mut self, pid: impl Into<String>, text: impl Into<String>) -> Self {
        self.citations.insert(pid.into(), text.into());
        self
    }
}

impl CitationSource for StaticCitationSource {
    fn citation(&self, pid: &str, _style: &str) -> Result<Option<String>> {
        Ok(self.citations.get(pid).cloned())
    }
}

/// Kind of a related identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// A DOI such as `10.16904/envidat.1`.
    Doi,
    /// Any other URL.
    Url,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doi => write!(f, "DOI"),
            Self::Url => write!(f, "URL"),
        }
    }
}

/// DataCite relation of the described dataset to a related identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// The dataset supplements a publication.
    IsSupplementTo,
    /// The dataset cites another catalog dataset.
    Cites,
    /// The dataset is required by one of its own resources.
    IsRequiredBy,
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsSupplementTo => write!(f, "IsSupplementTo"),
            Self::Cites => write!(f, "Cites"),
            Self::IsRequiredBy => write!(f, "IsRequiredBy"),
        }
    }
}

/// One mined related identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedIdentifier {
    /// DOI or URL text.
    pub value: String,
    /// Identifier kind.
    pub kind: IdentifierKind,
    /// Relation type.
    pub relation: RelationType,
}

impl RelatedIdentifier {
    fn new(value: impl Into<String>, kind: IdentifierKind, relation: RelationType) -> Self {
        Self {
            value: value.into(),
            kind,
            relation,
        }
    }
}

/// Returns true for absolute http, https or ftp URLs with a host.
#[must_use]
pub fn is_web_url(word: &str) -> bool {
    Url::parse(word)
        .map(|url| matches!(url.scheme(), "http" | "https" | "ftp") && url.host_str().is_some())
        .unwrap_or(false)
}

/// Mines related identifiers using a citation source.
#[derive(Debug, Clone, Copy)]
pub struct DoiMiner<'a> {
    source: &'a dyn CitationSource,
    settings: &'a CitationSettings,
    cites_prefixes: &'a [String],
}

impl<'a> DoiMiner<'a> {
    /// Creates a miner.
    #[must_use]
    pub fn new(
        source: &'a dyn CitationSource,
        settings: &'a CitationSettings,
        cites_prefixes: &'a [String],
    ) -> Self {
        Self {
            source,
            settings,
            cites_prefixes,
        }
    }

    /// Resolves a repository PID to a DOI through the citation service.
    ///
    /// Returns `None` on any failure; the failure is logged.
    #[must_use]
    pub fn resolve_external_doi(&self, pid: &str) -> Option<String> {
        let pid = normalize_pid(pid);
        match self.source.citation(&pid, &self.settings.style) {
            Ok(Some(citation)) => {
                let doi = citation.split_whitespace().find_map(extract_doi);
                if doi.is_none() {
                    debug!(pid = %pid, "citation carries no DOI");
                }
                doi
            },
            Ok(None) => {
                debug!(pid = %pid, style = %self.settings.style, "no citation for PID");
                None
            },
            Err(err) => {
                warn!(pid = %pid, error = %err, "citation lookup failed");
                None
            },
        }
    }

    /// Classifies identifiers in `free_text`, then appends resource URLs.
    ///
    /// Tokens are taken in order. Repository links are resolved to DOIs,
    /// DOI-bearing tokens become `IsSupplementTo` DOIs, other URLs become
    /// `Cites` (catalog dataset pages) or `IsSupplementTo`. Values are
    /// deduplicated. Each resource URL is appended as `IsRequiredBy`.
    #[must_use]
    pub fn mine_related_identifiers(
        &self,
        free_text: &str,
        resource_urls: &[String],
    ) -> Vec<RelatedIdentifier> {
        let cleaned = LINK_SYNTAX.replace_all(free_text, " ");
        let mut seen = HashSet::new();
        let mut related = Vec::new();

        for word in cleaned.split_whitespace() {
            let mut doi = extract_doi(word);
            if let Some(index) = word.find(self.settings.marker.as_str()) {
                let pid = &word[index + self.settings.marker.len()..];
                if let Some(resolved) = self.resolve_external_doi(pid) {
                    doi = Some(resolved);
                }
            }

            if let Some(doi) = doi.filter(|doi| doi.contains('/')) {
                if seen.insert(doi.clone()) {
                    related.push(RelatedIdentifier::new(
                        doi,
                        IdentifierKind::Doi,
                        RelationType::IsSupplementTo,
                    ));
                    continue;
                }
            }

            if is_web_url(word) && !word.contains("doi") && seen.insert(word.to_string()) {
                let relation = if self
                    .cites_prefixes
                    .iter()
                    .any(|prefix| word.starts_with(prefix.as_str()))
                {
                    RelationType::Cites
                } else {
                    RelationType::IsSupplementTo
                };
                related.push(RelatedIdentifier::new(word, IdentifierKind::Url, relation));
            }
        }

        related.extend(
            resource_urls
                .iter()
                .filter(|url| !url.trim().is_empty())
                .map(|url| {
                    RelatedIdentifier::new(url.trim(), IdentifierKind::Url, RelationType::IsRequiredBy)
                }),
        );
        related
    }
}
