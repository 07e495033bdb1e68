//! DataCite conversion of complete and incomplete records.

mod common;

use std::collections::HashMap;

use ckan_crosswalk::{ConversionError, Schema, ValidationFailure};
use common::{gem2_record, offline_crosswalk, package_record};

#[test]
fn test_identifier_is_trimmed_doi() {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DataCite);
    let identifier = document.find("identifier").expect("identifier");
    assert_eq!(identifier.text_or_empty(), "10.16904/envidat.42");
    assert_eq!(identifier.attr("identifierType"), Some("DOI"));
}

#[test]
fn test_creators_keep_names_and_affiliations() {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DataCite);
    let creators: Vec<_> = document.root.descendants("creator");
    assert_eq!(creators.len(), 2);

    let first = creators[0];
    assert_eq!(first.child("creatorName").map(|e| e.text_or_empty()), Some("Marcia Phillips"));
    assert_eq!(first.child("givenName").map(|e| e.text_or_empty()), Some("Marcia"));
    assert_eq!(first.child("familyName").map(|e| e.text_or_empty()), Some("Phillips"));
    assert_eq!(first.child("nameIdentifier").and_then(|e| e.attr("nameIdentifierScheme")), Some("ORCID"));
    let affiliations: Vec<_> = first.children_named("affiliation").map(|e| e.text_or_empty()).collect();
    assert_eq!(affiliations, vec!["WSL", "SLF"]);

    let second = creators[1];
    assert_eq!(second.child("creatorName").map(|e| e.text_or_empty()), Some("Bartelt"));
    assert!(second.child("givenName").is_none());
}

#[test]
fn test_dates_sizes_and_formats() {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DataCite);

    let dates: Vec<_> = document
        .root
        .descendants("date")
        .into_iter()
        .map(|date| (date.text_or_empty().to_string(), date.attr("dateType").unwrap_or_default().to_string()))
        .collect();
    assert_eq!(
        dates,
        vec![
            ("2014-07-01/2015-06-30".to_string(), "Collected".to_string()),
            ("2016-03-15".to_string(), "Valid".to_string()),
        ]
    );

    let sizes: Vec<_> = document.root.descendants("size").into_iter().map(|e| e.text_or_empty()).collect();
    assert_eq!(sizes, vec!["2048 bytes", "2.5 MB"]);

    let formats: Vec<_> = document.root.descendants("format").into_iter().map(|e| e.text_or_empty()).collect();
    assert_eq!(formats, vec!["csv", "ZIP"]);
}

#[test]
fn test_related_identifiers_in_emission_order() {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DataCite);
    let related: Vec<_> = document
        .root
        .descendants("relatedIdentifier")
        .into_iter()
        .map(|e| {
            (
                e.text_or_empty().to_string(),
                e.attr("relatedIdentifierType").unwrap_or_default().to_string(),
                e.attr("relationType").unwrap_or_default().to_string(),
            )
        })
        .collect();

    let expected = [
        ("10.1000/xyz123", "DOI", "IsSupplementTo"),
        ("https://example.org/paper", "URL", "IsSupplementTo"),
        ("https://envidat.ch/dataset/snow-depth", "URL", "Cites"),
        (
            "https://www.envidat.ch/dataset/gem2-station-data/resource/c2b0a1d4-0001/download/gem2_hourly.csv",
            "URL",
            "IsRequiredBy",
        ),
        ("gem2_archive.zip", "URL", "IsRequiredBy"),
    ];
    assert_eq!(related.len(), expected.len());
    for ((value, kind, relation), (want_value, want_kind, want_relation)) in related.iter().zip(expected) {
        assert_eq!(value, want_value);
        assert_eq!(kind, want_kind);
        assert_eq!(relation, want_relation);
    }
}

#[test]
fn test_point_geolocation_and_place() {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DataCite);
    let point = document.root.descendants("geoLocationPoint");
    assert_eq!(point.len(), 1);
    assert_eq!(point[0].child("pointLongitude").map(|e| e.text_or_empty()), Some("8.60904"));
    assert_eq!(point[0].child("pointLatitude").map(|e| e.text_or_empty()), Some("46.60369"));
    let place = document.root.descendants("geoLocationPlace");
    assert_eq!(place[0].text_or_empty(), "Gemsstock, Switzerland");
}

#[test]
fn test_rights_and_funding() {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DataCite);
    let rights = document.find("rightsList/rights").expect("rights");
    assert_eq!(rights.attr("rightsIdentifier"), Some("CC-BY-SA-4.0"));
    assert_eq!(rights.attr("rightsURI"), Some("https://creativecommons.org/licenses/by-sa/4.0/"));

    let references = document.root.descendants("fundingReference");
    assert_eq!(references.len(), 2);
    assert!(references[0].child("awardNumber").is_some());
    assert!(references[1].child("awardNumber").is_none());
}

#[test]
fn test_full_record_serializes() {
    let xml = offline_crosswalk()
        .convert(&package_record(), Schema::DataCite)
        .expect("valid record");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("xmlns=\"http://datacite.org/schema/kernel-4\""));
    assert!(xml.contains("<publicationYear>2016</publicationYear>"));
}

#[test]
fn test_gem2_fails_without_doi() {
    let err = offline_crosswalk()
        .convert(&gem2_record(), Schema::DataCite)
        .expect_err("no identifier");
    assert!(matches!(err, ConversionError::Invalid { schema: Schema::DataCite, .. }));
    assert_eq!(err.failures(), &[ValidationFailure::MissingIdentifier]);
}

#[test]
fn test_missing_title_is_named_failure() {
    let mut record = gem2_record();
    record.set("doi", "10.16904/envidat.1");
    record.set("title", "");
    let err = offline_crosswalk()
        .convert(&record, Schema::DataCite)
        .expect_err("no title");
    assert_eq!(err.failures(), &[ValidationFailure::MissingTitle]);
    assert!(err.to_string().contains("missing title"));
}

#[test]
fn test_reservation_map_supplies_doi() {
    let mut reserved = HashMap::new();
    reserved.insert("gem2".to_string(), "10.16904/envidat.77".to_string());
    let xml = offline_crosswalk()
        .convert_datacite(&gem2_record(), &reserved)
        .expect("reserved DOI");
    assert!(xml.contains(">10.16904/envidat.77</identifier>"));
}

#[test]
fn test_publication_year_defaults_to_clock() {
    let mut record = gem2_record();
    record.set("doi", "10.16904/envidat.1");
    record.set("publication", "");
    let document = offline_crosswalk().assemble(&record, Schema::DataCite);
    assert_eq!(document.find("publicationYear").map(|e| e.text_or_empty()), Some("2024"));
    assert_eq!(document.find("publisher").map(|e| e.text_or_empty()), Some("EnviDat"));
}

#[test]
fn test_subjects_use_display_names() {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DataCite);
    let subjects: Vec<_> = document.root.descendants("subject").into_iter().map(|e| e.text_or_empty()).collect();
    assert_eq!(subjects, vec!["permafrost", "snow"]);
}

#[test]
fn test_size_without_value_defaults_to_zero() {
    let mut record = gem2_record();
    record.set("doi", "10.16904/envidat.1");
    record.set(
        "resources",
        serde_json::json!([
            {"name": "unit only", "resource_size": "{\"size_units\": \"mb\"}"},
            {"name": "empty object", "resource_size": "{}"},
            {"name": "garbage", "resource_size": "about a gigabyte"}
        ]),
    );
    let document = offline_crosswalk().assemble(&record, Schema::DataCite);
    let sizes: Vec<_> = document.root.descendants("size").into_iter().map(|e| e.text_or_empty()).collect();
    assert_eq!(sizes, vec!["0 MB", "0 KB"]);
}

#[test]
fn test_non_doi_identifier_is_rejected() {
    let mut record = gem2_record();
    record.set("doi", "envidat.gem2");
    let err = offline_crosswalk()
        .convert(&record, Schema::DataCite)
        .expect_err("not a DOI");
    assert_eq!(err.failures(), &[ValidationFailure::MissingIdentifier]);
}
