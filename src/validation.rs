//! Required-element checks on assembled documents.
//!
//! Only DataCite has mandatory elements the assembler cannot default: a DOI
//! identifier, at least one named creator and a title. Every other schema
//! passes unconditionally because its assembler fills all required slots.

use std::fmt;

use crate::formats::Schema;
use crate::tree::{Document, Element};

/// A named reason a document is not publishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationFailure {
    /// No DOI in the `identifier` element.
    MissingIdentifier,
    /// No `creator` with a non-blank `creatorName`.
    MissingCreators,
    /// No non-blank `title`.
    MissingTitle,
}

impl ValidationFailure {
    /// Name of the offending element.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "identifier",
            Self::MissingCreators => "creators",
            Self::MissingTitle => "title",
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing {}", self.tag())
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Schema that was checked.
    pub schema: Schema,
    /// Every failure found, in check order.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    /// Returns true if no failure was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts into a `Result` carrying the failures.
    ///
    /// # Errors
    ///
    /// Returns the failure list when the document is invalid.
    pub fn into_result(self) -> std::result::Result<(), Vec<ValidationFailure>> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self.failures)
        }
    }
}

fn has_text(element: Option<&Element>) -> bool {
    element.is_some_and(|element| !element.text_or_empty().trim().is_empty())
}

/// A DOI is `10.<registrant>/<suffix>` with neither part empty.
fn is_doi(text: &str) -> bool {
    text.trim()
        .strip_prefix("10.")
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(registrant, suffix)| !registrant.is_empty() && !suffix.is_empty())
}

/// Checks a document's mandatory elements.
#[must_use]
pub fn validate(document: &Document) -> ValidationResult {
    let failures = match document.schema {
        Schema::DataCite => validate_datacite(&document.root),
        _ => Vec::new(),
    };
    ValidationResult {
        schema: document.schema,
        failures,
    }
}

fn validate_datacite(root: &Element) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    if !root.child("identifier").is_some_and(|identifier| is_doi(identifier.text_or_empty())) {
        failures.push(ValidationFailure::MissingIdentifier);
    }

    let named_creators = root
        .child("creators")
        .map(|creators| {
            creators
                .children_named("creator")
                .filter(|creator| has_text(creator.child("creatorName")))
                .count()
        })
        .unwrap_or_default();
    if named_creators == 0 {
        failures.push(ValidationFailure::MissingCreators);
    }

    if !has_text(root.find("titles/title")) {
        failures.push(ValidationFailure::MissingTitle);
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datacite(identifier: &str, creator: Option<&str>, title: Option<&str>) -> Document {
        let creators = Element::new("creators").with_children(
            creator.map(|name| Element::new("creator").with_child(Element::text_node("creatorName", name))),
        );
        let titles = title.map(|title| Element::new("titles").with_child(Element::text_node("title", title)));
        Document::new(
            Schema::DataCite,
            Element::new("resource")
                .with_child(Element::text_node("identifier", identifier))
                .with_child(creators)
                .with_opt_child(titles),
        )
    }

    #[test]
    fn test_valid_datacite() {
        let result = validate(&datacite("10.16904/envidat.1", Some("Marcia Phillips"), Some("GEM2")));
        assert!(result.is_valid());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_collects_every_failure() {
        let result = validate(&datacite(" ", None, None));
        assert_eq!(
            result.failures,
            vec![
                ValidationFailure::MissingIdentifier,
                ValidationFailure::MissingCreators,
                ValidationFailure::MissingTitle,
            ]
        );
    }

    #[test]
    fn test_blank_creator_name_is_not_a_creator() {
        let result = validate(&datacite("10.1/x", Some("  "), Some("GEM2")));
        assert_eq!(result.failures, vec![ValidationFailure::MissingCreators]);
    }

    #[test]
    fn test_identifier_must_be_doi_shaped() {
        for identifier in ["gem2", "https://www.envidat.ch/dataset/gem2", "10.16904", "10./x", "10.16904/"] {
            let result = validate(&datacite(identifier, Some("Marcia Phillips"), Some("GEM2")));
            assert_eq!(result.failures, vec![ValidationFailure::MissingIdentifier], "identifier {identifier}");
        }
        assert!(validate(&datacite(" 10.16904/envidat.1 ", Some("Marcia Phillips"), Some("GEM2"))).is_valid());
    }

    #[test]
    fn test_other_schemas_always_pass() {
        let document = Document::new(Schema::Ris, Element::new("ris"));
        assert!(validate(&document).is_valid());
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(ValidationFailure::MissingTitle.to_string(), "missing title");
        assert_eq!(ValidationFailure::MissingIdentifier.tag(), "identifier");
    }
}
