//! Property tests for vocabulary normalization and DOI mining.

use ckan_crosswalk::{extract_doi, normalize, Vocabulary};
use proptest::prelude::*;

const CONTRIBUTOR_TYPES: &[&str] = &[
    "ContactPerson",
    "DataCollector",
    "DataCurator",
    "HostingInstitution",
    "ProjectLeader",
    "RightsHolder",
    "WorkPackageLeader",
];

/// Rewrites `canonical` with the given per-character case flips and
/// separators inserted before characters.
fn disguise(canonical: &str, flips: &[bool], separators: &[u8]) -> String {
    let mut out = String::new();
    for (index, c) in canonical.chars().enumerate() {
        match separators.get(index).copied().unwrap_or(0) % 4 {
            1 => out.push(' '),
            2 => out.push('_'),
            _ => {},
        }
        if flips.get(index).copied().unwrap_or(false) {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
    }
    out
}

proptest! {
    #[test]
    fn test_contributor_type_ignores_case_and_separators(
        index in 0..CONTRIBUTOR_TYPES.len(),
        flips in prop::collection::vec(any::<bool>(), 32),
        separators in prop::collection::vec(any::<u8>(), 32),
    ) {
        let canonical = CONTRIBUTOR_TYPES[index];
        let input = disguise(canonical, &flips, &separators);
        let normalized = normalize(&input, Vocabulary::ContributorType, None);
        prop_assert_eq!(normalized.as_deref(), Some(canonical), "input {}", input);
    }

    #[test]
    fn test_unknown_tokens_take_the_default(word in "[x-z]{12,20}") {
        let normalized = normalize(&word, Vocabulary::ContributorType, Some("ContactPerson"));
        prop_assert_eq!(normalized.as_deref(), Some("ContactPerson"));
    }

    #[test]
    fn test_normalization_is_idempotent(index in 0..CONTRIBUTOR_TYPES.len(), pad in " {0,3}") {
        let canonical = CONTRIBUTOR_TYPES[index];
        let padded = format!("{pad}{canonical}{pad}");
        let once = normalize(&padded, Vocabulary::ContributorType, None);
        prop_assert_eq!(once.as_deref(), Some(canonical));
        let twice = once.as_deref().and_then(|value| normalize(value, Vocabulary::ContributorType, None));
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn test_extracted_doi_starts_at_prefix(prefix in "[a-z:]{0,6}", suffix in "[0-9]{4,5}/[a-z0-9.]{1,12}") {
        let word = format!("doi{prefix}10.{suffix}");
        prop_assert_eq!(extract_doi(&word), Some(format!("10.{suffix}")));
    }

    #[test]
    fn test_words_without_marker_are_not_dois(word in "[a-c0-9./]{0,24}") {
        prop_assert_eq!(extract_doi(&word), None);
    }
}

#[test]
fn test_extract_doi_examples() {
    assert_eq!(extract_doi("doi:10.1000/xyz123"), Some("10.1000/xyz123".to_string()));
    assert_eq!(extract_doi("https://doi.org/10.16904/envidat.42"), Some("10.16904/envidat.42".to_string()));
    assert_eq!(extract_doi("10.1000/xyz123"), None);
    assert_eq!(extract_doi("doi:pending"), None);
}
