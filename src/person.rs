//! People named by a record: authors, maintainers and contacts.
//!
//! Every assembler reads people the same way, through a nested mapping with
//! the tags `familyName`, `givenName`, `nameIdentifier`, `affiliation` and
//! `email`, so name formatting lives here once.

use crate::mapper::FieldMapper;

/// Maximum number of affiliations kept per person.
pub const MAX_AFFILIATIONS: usize = 3;

const ORCID_PREFIXES: [&str; 2] = ["https://orcid.org/", "http://orcid.org/"];

/// An author or contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    /// Family name.
    pub family_name: String,
    /// Given name(s).
    pub given_name: String,
    /// Up to three affiliations, in order.
    pub affiliations: Vec<String>,
    /// ORCID or other name identifier.
    pub identifier: Option<String>,
    /// Contact mailbox.
    pub email: Option<String>,
}

impl Person {
    /// Creates a person from family and given names.
    #[must_use]
    pub fn new(family_name: impl Into<String>, given_name: impl Into<String>) -> Self {
        Self {
            family_name: family_name.into(),
            given_name: given_name.into(),
            ..Self::default()
        }
    }

    /// Reads a person through a nested mapping.
    ///
    /// Returns `None` when neither name is present.
    #[must_use]
    pub fn from_mapper(mapper: &FieldMapper<'_>) -> Option<Self> {
        let person = Self {
            family_name: mapper.text_or("familyName", ""),
            given_name: mapper.text_or("givenName", ""),
            affiliations: mapper
                .texts("affiliation")
                .into_iter()
                .take(MAX_AFFILIATIONS)
                .collect(),
            identifier: mapper.text("nameIdentifier"),
            email: mapper.text("email"),
        };
        (!person.is_anonymous()).then_some(person)
    }

    /// Returns true if the person has no name at all.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.family_name.is_empty() && self.given_name.is_empty()
    }

    /// `"Given Family"`, or whichever part exists.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (self.given_name.is_empty(), self.family_name.is_empty()) {
            (false, false) => format!("{} {}", self.given_name, self.family_name),
            (false, true) => self.given_name.clone(),
            _ => self.family_name.clone(),
        }
    }

    /// `"Family, Given"` as used in citations.
    #[must_use]
    pub fn inverted_name(&self) -> String {
        if self.given_name.is_empty() || self.family_name.is_empty() {
            self.full_name()
        } else {
            format!("{}, {}", self.family_name, self.given_name)
        }
    }

    /// The first affiliation, if any.
    #[must_use]
    pub fn organisation(&self) -> Option<&str> {
        self.affiliations.first().map(String::as_str)
    }

    /// The bare ORCID iD, without an `orcid.org` URL prefix.
    #[must_use]
    pub fn orcid(&self) -> Option<&str> {
        let identifier = self.identifier.as_deref()?.trim();
        let bare = ORCID_PREFIXES
            .iter()
            .find_map(|prefix| identifier.strip_prefix(prefix))
            .unwrap_or(identifier);
        (!bare.is_empty()).then_some(bare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SchemaMapping, TagMapping};
    use serde_json::json;

    fn person_mapping() -> SchemaMapping {
        SchemaMapping::new()
            .with_field("familyName", "name")
            .with_field("givenName", "given_name")
            .with_field("nameIdentifier", "identifier")
            .with_tag(
                "affiliation",
                TagMapping::Fields(vec![
                    "affiliation".into(),
                    "affiliation_02".into(),
                    "affiliation_03".into(),
                    "affiliation_04".into(),
                ]),
            )
    }

    #[test]
    fn test_from_mapper() {
        let source = json!({
            "name": "Phillips ",
            "given_name": "Marcia",
            "identifier": "0000-0002-1825-0097",
            "affiliation": "WSL",
            "affiliation_02": "",
            "affiliation_03": "SLF",
            "affiliation_04": "ETH",
        });
        let source = source.as_object().expect("object").clone();
        let mapping = person_mapping();
        let person = Person::from_mapper(&FieldMapper::new(&source, &mapping)).expect("named");
        assert_eq!(person.full_name(), "Marcia Phillips");
        assert_eq!(person.inverted_name(), "Phillips, Marcia");
        assert_eq!(person.affiliations, vec!["WSL", "SLF", "ETH"]);
        assert_eq!(person.identifier.as_deref(), Some("0000-0002-1825-0097"));
    }

    #[test]
    fn test_orcid_prefix_is_stripped() {
        let mut person = Person::new("Phillips", "Marcia");
        assert_eq!(person.orcid(), None);
        person.identifier = Some("https://orcid.org/0000-0002-1825-0097".into());
        assert_eq!(person.orcid(), Some("0000-0002-1825-0097"));
        person.identifier = Some("0000-0002-1825-0097".into());
        assert_eq!(person.orcid(), Some("0000-0002-1825-0097"));
    }

    #[test]
    fn test_family_name_only() {
        let person = Person::new("Bartlome", "");
        assert_eq!(person.full_name(), "Bartlome");
        assert_eq!(person.inverted_name(), "Bartlome");
    }

    #[test]
    fn test_anonymous_person_is_skipped() {
        let source = json!({"email": "x@example.org"});
        let source = source.as_object().expect("object").clone();
        let mapping = person_mapping();
        assert!(Person::from_mapper(&FieldMapper::new(&source, &mapping)).is_none());
    }
}
