//! DCAT-AP (OpenDataSwiss) conversion.

mod common;

use ckan_crosswalk::{Element, Schema};
use common::{gem2_record, offline_crosswalk, package_record};

fn dataset() -> Element {
    let document = offline_crosswalk().assemble(&package_record(), Schema::DcatAp);
    document
        .find("dcat:Catalog/dcat:dataset/dcat:Dataset")
        .cloned()
        .expect("dataset node")
}

#[test]
fn test_dataset_identity() {
    let dataset = dataset();
    assert_eq!(dataset.attr("rdf:about"), Some("https://www.envidat.ch/#/metadata/gem2-station-data"));
    assert_eq!(
        dataset.child("dct:identifier").map(Element::text_or_empty),
        Some("8f1c5a4e-3b52-4c1a-9d7e-2f64d1b0a9c3@envidat")
    );
    let issued = dataset.child("dct:issued").expect("issued");
    assert_eq!(issued.text_or_empty(), "2016-03-07T14:40:42Z");
    assert_eq!(issued.attr("rdf:datatype"), Some("http://www.w3.org/2001/XMLSchema#dateTime"));
}

#[test]
fn test_contact_points_include_support_desk() {
    let dataset = dataset();
    let contacts: Vec<_> = dataset.children_named("dcat:contactPoint").collect();
    assert_eq!(contacts.len(), 2);
    assert_eq!(
        contacts[0].find("vcard:Individual/vcard:fn").map(Element::text_or_empty),
        Some("Marcia Phillips")
    );
    assert_eq!(
        contacts[1].find("vcard:Organization/vcard:hasEmail").and_then(|e| e.attr("rdf:resource")),
        Some("mailto:envidat@wsl.ch")
    );
}

#[test]
fn test_support_maintainer_gets_single_contact() {
    let mut record = gem2_record();
    record.set("maintainer", "{\"name\": \"Support\", \"email\": \"envidat@wsl.ch\"}");
    let document = offline_crosswalk().assemble(&record, Schema::DcatAp);
    let dataset = document
        .find("dcat:Catalog/dcat:dataset/dcat:Dataset")
        .expect("dataset node");
    assert_eq!(dataset.children_named("dcat:contactPoint").count(), 1);
}

#[test]
fn test_distributions() {
    let dataset = dataset();
    let distributions: Vec<_> = dataset.descendants("dcat:Distribution");
    assert_eq!(distributions.len(), 2);

    let first = distributions[0];
    assert_eq!(
        first.child("dct:identifier").map(Element::text_or_empty),
        Some("gem2-station-data.c2b0a1d4-0001")
    );
    assert_eq!(first.child("dcat:byteSize").map(Element::text_or_empty), Some("2048"));
    assert_eq!(first.child("dct:modified").map(Element::text_or_empty), Some("2016-04-01T12:00:00Z"));
    assert_eq!(
        first.child("dct:rights").map(Element::text_or_empty),
        Some("NonCommercialAllowed-CommercialAllowed-ReferenceRequired")
    );

    let second = distributions[1];
    assert_eq!(second.child("dcat:byteSize").map(Element::text_or_empty), Some("2621440"));
    assert_eq!(second.child("dcat:mediaType").map(Element::text_or_empty), Some("application/zip"));
    assert_eq!(second.child("dct:description").map(Element::text_or_empty), Some("No description"));
    assert_eq!(second.child("dct:modified").map(Element::text_or_empty), Some("2016-03-15T09:31:00Z"));
}

#[test]
fn test_keywords_carry_language() {
    let dataset = dataset();
    let keywords: Vec<_> = dataset.children_named("dcat:keyword").collect();
    assert_eq!(keywords.len(), 2);
    assert_eq!(keywords[0].text_or_empty(), "PERMAFROST");
    assert_eq!(keywords[0].attr("xml:lang"), Some("en"));
}

#[test]
fn test_catalog_export() {
    let records = vec![package_record(), gem2_record()];
    let rdf = offline_crosswalk().convert_dcat_catalog(&records).expect("catalog");
    assert!(rdf.contains("<rdf:RDF"));
    assert_eq!(rdf.matches("<dcat:dataset>").count(), 2);
}
