//! Controlled-vocabulary normalization.
//!
//! Free-text values from a source record are matched against the fixed code
//! lists of each target schema. Matching is insensitive to case, spaces and
//! underscores, so `"Data Collector"`, `"datacollector"` and `"DATA_COLLECTOR"`
//! all resolve to DataCite's `DataCollector`.
//!
//! # Examples
//!
//! ```ignore
//! use ckan_crosswalk::vocabulary::{normalize, Vocabulary};
//!
//! let kind = normalize("data_collector", Vocabulary::ContributorType, None);
//! assert_eq!(kind.as_deref(), Some("DataCollector"));
//!
//! let general = normalize("spreadsheet", Vocabulary::ResourceTypeGeneral, Some("Dataset"));
//! assert_eq!(general.as_deref(), Some("Dataset"));
//! ```

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// A fixed code list of one target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// DataCite `titleType`.
    TitleType,
    /// DataCite `resourceTypeGeneral`.
    ResourceTypeGeneral,
    /// DataCite `descriptionType`.
    DescriptionType,
    /// DataCite `contributorType`.
    ContributorType,
    /// DataCite `dateType`.
    DateType,
    /// SPDX identifiers used as DataCite `rightsIdentifier`.
    RightsIdentifier,
    /// ISO 639-2/B language codes used by ISO 19139.
    Iso639Language,
    /// OpenDataSwiss terms-of-use codes used as `dct:rights`.
    OpenDataSwissRights,
    /// ISO 19115 `MD_ProgressCode` values.
    ProgressCode,
    /// GCMD DIF `Dataset_Progress` values.
    DifProgress,
}

impl Vocabulary {
    /// Returns the tag name this vocabulary constrains.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::TitleType => "titleType",
            Self::ResourceTypeGeneral => "resourceTypeGeneral",
            Self::DescriptionType => "descriptionType",
            Self::ContributorType => "contributorType",
            Self::DateType => "dateType",
            Self::RightsIdentifier => "rightsIdentifier",
            Self::Iso639Language => "gmd:language",
            Self::OpenDataSwissRights => "dct:rights",
            Self::ProgressCode => "gmd:MD_ProgressCode",
            Self::DifProgress => "Dataset_Progress",
        }
    }

    fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::TitleType => TITLE_TYPES,
            Self::ResourceTypeGeneral => RESOURCE_TYPES_GENERAL,
            Self::DescriptionType => DESCRIPTION_TYPES,
            Self::ContributorType => CONTRIBUTOR_TYPES,
            Self::DateType => DATE_TYPES,
            Self::RightsIdentifier => RIGHTS_IDENTIFIERS,
            Self::Iso639Language => ISO_639_LANGUAGES,
            Self::OpenDataSwissRights => OPENDATASWISS_RIGHTS,
            Self::ProgressCode => PROGRESS_CODES,
            Self::DifProgress => DIF_PROGRESS,
        }
    }

    const ALL: [Self; 10] = [
        Self::TitleType,
        Self::ResourceTypeGeneral,
        Self::DescriptionType,
        Self::ContributorType,
        Self::DateType,
        Self::RightsIdentifier,
        Self::Iso639Language,
        Self::OpenDataSwissRights,
        Self::ProgressCode,
        Self::DifProgress,
    ];
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

const TITLE_TYPES: &[(&str, &str)] = &[
    ("alternativetitle", "AlternativeTitle"),
    ("subtitle", "Subtitle"),
    ("translatedtitle", "TranslatedTitle"),
    ("other", "Other"),
];

const RESOURCE_TYPES_GENERAL: &[(&str, &str)] = &[
    ("audiovisual", "Audiovisual"),
    ("collection", "Collection"),
    ("dataset", "Dataset"),
    ("event", "Event"),
    ("image", "Image"),
    ("interactiveresource", "InteractiveResource"),
    ("model", "Model"),
    ("physicalobject", "PhysicalObject"),
    ("service", "Service"),
    ("software", "Software"),
    ("sound", "Sound"),
    ("text", "Text"),
    ("workflow", "Workflow"),
    ("other", "Other"),
];

const DESCRIPTION_TYPES: &[(&str, &str)] = &[
    ("abstract", "Abstract"),
    ("methods", "Methods"),
    ("seriesinformation", "SeriesInformation"),
    ("tableofcontents", "TableOfContents"),
    ("other", "Other"),
];

const CONTRIBUTOR_TYPES: &[(&str, &str)] = &[
    ("contactperson", "ContactPerson"),
    ("datacollector", "DataCollector"),
    ("datacurator", "DataCurator"),
    ("datamanager", "DataManager"),
    ("distributor", "Distributor"),
    ("editor", "Editor"),
    ("funder", "Funder"),
    ("hostinginstitution", "HostingInstitution"),
    ("other", "Other"),
    ("producer", "Producer"),
    ("projectleader", "ProjectLeader"),
    ("projectmanager", "ProjectManager"),
    ("projectmember", "ProjectMember"),
    ("registrationagency", "RegistrationAgency"),
    ("registrationauthority", "RegistrationAuthority"),
    ("relatedperson", "RelatedPerson"),
    ("researchgroup", "ResearchGroup"),
    ("rightsholder", "RightsHolder"),
    ("researcher", "Researcher"),
    ("sponsor", "Sponsor"),
    ("supervisor", "Supervisor"),
    ("workpackageleader", "WorkPackageLeader"),
];

// Only the two types the catalog records itself; everything else becomes Valid.
const DATE_TYPES: &[(&str, &str)] = &[("created", "Created"), ("collected", "Collected")];

const RIGHTS_IDENTIFIERS: &[(&str, &str)] = &[
    ("odc-odbl", "ODbL-1.0"),
    ("cc-by-sa", "CC-BY-SA-4.0"),
    ("cc-by-nc", "CC-BY-NC-4.0"),
];

const ISO_639_LANGUAGES: &[(&str, &str)] = &[
    ("en", "eng"),
    ("de", "ger"),
    ("it", "ita"),
    ("fr", "fre"),
    ("ro", "roh"),
];

const OPENDATASWISS_RIGHTS: &[(&str, &str)] = &[
    (
        "wsl-data",
        "NonCommercialWithPermission-CommercialWithPermission-ReferenceRequired",
    ),
    (
        "odc-odbl",
        "NonCommercialAllowed-CommercialAllowed-ReferenceRequired",
    ),
    ("cc-by", "NonCommercialAllowed-CommercialAllowed-ReferenceRequired"),
    (
        "cc-by-sa",
        "NonCommercialAllowed-CommercialAllowed-ReferenceRequired",
    ),
    (
        "cc-zero",
        "NonCommercialAllowed-CommercialAllowed-ReferenceNotRequired",
    ),
    (
        "cc0-1.0",
        "NonCommercialAllowed-CommercialAllowed-ReferenceNotRequired",
    ),
];

const PROGRESS_CODES: &[(&str, &str)] = &[
    ("completed", "completed"),
    ("historicalarchive", "historicalArchive"),
    ("obsolete", "obsolete"),
    ("ongoing", "onGoing"),
    ("planned", "planned"),
    ("required", "required"),
    ("underdevelopment", "underDevelopment"),
];

const DIF_PROGRESS: &[(&str, &str)] = &[
    ("planned", "PLANNED"),
    ("inwork", "IN WORK"),
    ("ongoing", "IN WORK"),
    ("complete", "COMPLETE"),
    ("completed", "COMPLETE"),
    ("notprovided", "NOT PROVIDED"),
];

/// OpenDataSwiss terms used when a licence is not in the table.
pub const OPENDATASWISS_DEFAULT_RIGHTS: &str =
    "NonCommercialWithPermission-CommercialWithPermission-ReferenceRequired";

lazy_static! {
    static ref TABLES: HashMap<Vocabulary, HashMap<&'static str, &'static str>> = Vocabulary::ALL
        .iter()
        .map(|vocabulary| (*vocabulary, vocabulary.entries().iter().copied().collect()))
        .collect();
}

/// Reduces a token to its lookup key: lower-cased, spaces and underscores removed.
#[must_use]
pub fn lookup_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalizes `value` against `vocabulary`.
///
/// Returns the canonical code value, or `default` when the token is not in
/// the table. Never fails.
#[must_use]
pub fn normalize(value: &str, vocabulary: Vocabulary, default: Option<&str>) -> Option<String> {
    let key = lookup_key(value);
    TABLES
        .get(&vocabulary)
        .and_then(|table| table.get(key.as_str()))
        .copied()
        .or(default)
        .map(str::to_string)
}

/// Returns true if `value` names an entry of `vocabulary`.
#[must_use]
pub fn is_known(value: &str, vocabulary: Vocabulary) -> bool {
    normalize(value, vocabulary, None).is_some()
}
