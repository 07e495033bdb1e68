//! ISO 19139 conversion of the EnviDat package fixture.

mod common;

use ckan_crosswalk::{Document, Element, Schema};
use common::{offline_crosswalk, package_record};

fn iso() -> Document {
    offline_crosswalk().assemble(&package_record(), Schema::Iso19139)
}

fn text<'a>(element: &'a Element, path: &str) -> Option<&'a str> {
    element.find(path).map(Element::text_or_empty)
}

const IDENTIFICATION: &str = "gmd:identificationInfo/gmd:MD_DataIdentification";

#[test]
fn test_header_fields() {
    let document = iso();
    assert_eq!(document.root.name, "gmd:MD_Metadata");
    assert_eq!(
        text(&document.root, "gmd:fileIdentifier/gco:CharacterString"),
        Some("doi:10.16904/envidat.42")
    );
    assert_eq!(text(&document.root, "gmd:language/gco:CharacterString"), Some("eng"));
    assert_eq!(text(&document.root, "gmd:dateStamp/gco:DateTime"), Some("2016-03-07T14:40:42"));
    assert_eq!(
        text(&document.root, "gmd:contact/gmd:CI_ResponsibleParty/gmd:individualName/gco:CharacterString"),
        Some("Marcia Phillips")
    );
}

#[test]
fn test_citation_uses_available_date() {
    let document = iso();
    let identification = document.find(IDENTIFICATION).expect("identification");
    assert_eq!(
        text(identification, "gmd:citation/gmd:CI_Citation/gmd:date/gmd:CI_Date/gmd:date/gco:Date"),
        Some("2016-03-15")
    );
    assert_eq!(
        text(identification, "gmd:citation/gmd:CI_Citation/gmd:title/gco:CharacterString"),
        Some("GEM2 station data")
    );
}

#[test]
fn test_extras_become_code_lists() {
    let document = iso();
    let identification = document.find(IDENTIFICATION).expect("identification");
    assert_eq!(
        text(identification, "gmd:purpose/gco:CharacterString"),
        Some("Long-term permafrost monitoring")
    );
    assert_eq!(text(identification, "gmd:status/gmd:MD_ProgressCode"), Some("underDevelopment"));
    assert_eq!(
        text(
            identification,
            "gmd:resourceMaintenance/gmd:MD_MaintenanceInformation/gmd:maintenanceAndUpdateFrequency/gmd:MD_MaintenanceFrequencyCode"
        ),
        Some("asNeeded")
    );
    assert_eq!(
        text(identification, "gmd:resourceConstraints/gmd:MD_LegalConstraints/gmd:accessConstraints/gmd:MD_RestrictionCode"),
        Some("otherRestrictions")
    );
    assert_eq!(
        text(identification, "gmd:topicCategory/gmd:MD_TopicCategoryCode"),
        Some("climatologyMeteorologyAtmosphere")
    );
}

#[test]
fn test_keywords_are_uppercased() {
    let document = iso();
    let keywords: Vec<_> = document
        .root
        .descendants("gmd:keyword")
        .into_iter()
        .filter_map(|keyword| keyword.child("gco:CharacterString"))
        .map(Element::text_or_empty)
        .collect();
    assert_eq!(keywords, vec!["PERMAFROST", "SNOW"]);
}

#[test]
fn test_extents_share_gml_id_counter() {
    let document = iso();
    let periods = document.root.descendants("gml:TimePeriod");
    let instants = document.root.descendants("gml:TimeInstant");
    assert_eq!(periods.len(), 1);
    assert_eq!(instants.len(), 1);
    assert_eq!(periods[0].attr("gml:id"), Some("D001"));
    assert_eq!(instants[0].attr("gml:id"), Some("D002"));

    let points = document.root.descendants("gml:Point");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].attr("gml:id"), Some("P003"));
    assert_eq!(text(points[0], "gml:pos"), Some("8.60904 46.60369"));
}

#[test]
fn test_distribution_formats_and_links() {
    let document = iso();
    let formats: Vec<_> = document
        .root
        .descendants("gmd:MD_Format")
        .into_iter()
        .filter_map(|format| text(format, "gmd:name/gco:CharacterString"))
        .collect();
    assert_eq!(formats, vec!["CSV", "ZIP"]);

    let links: Vec<_> = document.root.descendants("gmd:CI_OnlineResource");
    assert_eq!(links.len(), 3);
    assert_eq!(
        text(links[0], "gmd:linkage/gmd:URL"),
        Some("https://www.envidat.ch/dataset/gem2-station-data")
    );
    assert_eq!(text(links[0], "gmd:name/gco:CharacterString"), Some("DATASET METADATA"));
    assert_eq!(text(links[0], "gmd:function/gmd:CI_OnLineFunctionCode"), Some("information"));

    assert_eq!(text(links[1], "gmd:name/gco:CharacterString"), Some("GEM2_HOURLY.CSV"));
    assert_eq!(text(links[1], "gmd:protocol/gco:CharacterString"), Some("HTTPS"));

    assert_eq!(
        text(links[2], "gmd:linkage/gmd:URL"),
        Some("https://www.envidat.ch/dataset/gem2-station-data/resource/c2b0a1d4-0002")
    );
    assert_eq!(text(links[2], "gmd:name/gco:CharacterString"), Some("C2B0A1D4-0002"));
}

#[test]
fn test_serializes_with_namespaces() {
    let xml = offline_crosswalk()
        .convert(&package_record(), Schema::Iso19139)
        .expect("ISO conversion");
    assert!(xml.contains("xmlns:gmd=\"http://www.isotc211.org/2005/gmd\""));
    assert!(xml.contains("<gco:CharacterString>EPSG:4326</gco:CharacterString>"));
}
