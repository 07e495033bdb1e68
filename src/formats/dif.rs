//! GCMD Directory Interchange Format 10.2.
//!
//! Produces a `DIF` document. Fields DIF requires but a catalog record
//! cannot supply (science keywords, platform) are written with the DIF
//! `Not provided` marker so the document stays schema-valid.

use crate::clock::parse_timestamp;
use crate::geometry::GmlIds;
use crate::mapper::FieldMapper;
use crate::person::Person;
use crate::tree::{Document, Element};
use crate::vocabulary::{normalize, Vocabulary};

use super::{AssemblyContext, Assembler, Schema};

/// DIF 10 namespace.
pub const NAMESPACE: &str = "http://gcmd.gsfc.nasa.gov/Aboutus/xml/dif/";
/// Location of the 10.2 XSD.
pub const SCHEMA_LOCATION: &str = "https://gcmd.nasa.gov/Aboutus/xml/dif/dif_v10.2.xsd";

const NOT_PROVIDED: &str = "Not provided";

/// Assembler for DIF XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifAssembler;

impl Assembler for DifAssembler {
    fn schema(&self) -> Schema {
        Schema::Dif
    }

    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Document {
        let mapper = ctx.mapper();
        let entry_id = mapper.text_or("entryId", ctx.record_name());

        let root = Element::new("DIF")
            .with_attr("xmlns", NAMESPACE)
            .with_attr("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")
            .with_attr("xsi:schemaLocation", format!("{NAMESPACE} {SCHEMA_LOCATION}"))
            .with_child(
                Element::new("Entry_ID")
                    .with_child(Element::text_node("Short_Name", entry_id.as_str()))
                    .with_child(Element::text_node("Version", mapper.text_or("version", NOT_PROVIDED))),
            )
            .with_child(Element::text_node("Entry_Title", mapper.text_or("title", "")))
            .with_child(dataset_citation(ctx, &mapper, &entry_id))
            .with_opt_child(personnel(&mapper))
            .with_child(science_keywords())
            .with_children(
                mapper
                    .map_items("keywords", "keyword", |tag| tag.text("keyword"))
                    .into_iter()
                    .map(|keyword| Element::text_node("Ancillary_Keyword", keyword.to_uppercase())),
            )
            .with_child(platform())
            .with_children(temporal_coverage(&mapper))
            .with_opt_child(mapper.text("progress").map(|progress| {
                let progress = normalize(&progress, Vocabulary::DifProgress, Some("NOT PROVIDED")).unwrap_or_default();
                Element::text_node("Dataset_Progress", progress)
            }))
            .with_child(spatial_coverage(ctx))
            .with_opt_child(mapper.text("spatialInfo").map(|place| {
                Element::new("Location")
                    .with_child(Element::text_node("Location_Category", "GEOGRAPHIC REGION"))
                    .with_child(Element::text_node("Detailed_Location", place))
            }))
            .with_child(Element::text_node("Dataset_Language", language(&mapper)))
            .with_child(organization(ctx))
            .with_child(
                Element::new("Summary")
                    .with_child(Element::text_node("Abstract", mapper.text_or("summary", NOT_PROVIDED))),
            )
            .with_children(related_urls(&mapper))
            .with_child(Element::text_node("Metadata_Name", "CEOS IDN DIF"))
            .with_child(Element::text_node("Metadata_Version", "VERSION 10.2"))
            .with_child(metadata_dates(&mapper));

        Document::new(Schema::Dif, root)
    }
}

fn date_or_not_provided(raw: Option<String>) -> String {
    raw.as_deref()
        .and_then(parse_timestamp)
        .map_or_else(|| NOT_PROVIDED.to_string(), |parsed| parsed.format("%Y-%m-%d").to_string())
}

fn dataset_citation(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>, entry_id: &str) -> Element {
    let creators = mapper
        .map_items("creators", "person", Person::from_mapper)
        .iter()
        .map(Person::inverted_name)
        .collect::<Vec<_>>()
        .join("; ");
    let year = mapper
        .text("publicationYear")
        .unwrap_or_else(|| ctx.clock.current_year().to_string());
    let doi = mapper.text("doi").map(|doi| {
        Element::new("Persistent_Identifier")
            .with_child(Element::text_node("Type", "DOI"))
            .with_child(Element::text_node("Identifier", format!("doi:{doi}")))
    });

    Element::new("Dataset_Citation")
        .with_opt_child((!creators.is_empty()).then(|| Element::text_node("Dataset_Creator", creators)))
        .with_child(Element::text_node("Dataset_Title", mapper.text_or("title", "")))
        .with_child(Element::text_node("Dataset_Release_Date", year))
        .with_child(Element::text_node(
            "Dataset_Publisher",
            mapper.text_or("publisher", &ctx.catalog.publisher),
        ))
        .with_opt_child(mapper.text("version").map(|version| Element::text_node("Version", version)))
        .with_opt_child(doi)
        .with_child(Element::text_node("Online_Resource", ctx.catalog.dataset_page(entry_id)))
}

fn personnel(mapper: &FieldMapper<'_>) -> Option<Element> {
    let person = mapper.map_object("contact", "person", Person::from_mapper)?;
    let mut contact = Element::new("Contact_Person");
    if !person.given_name.is_empty() {
        contact.push(Element::text_node("First_Name", person.given_name.as_str()));
    }
    let contact = contact
        .with_child(Element::text_node("Last_Name", person.family_name.as_str()))
        .with_opt_child(person.email.map(|email| Element::text_node("Email", email)));
    Some(
        Element::new("Personnel")
            .with_child(Element::text_node("Role", "TECHNICAL CONTACT"))
            .with_child(contact),
    )
}

fn science_keywords() -> Element {
    Element::new("Science_Keywords")
        .with_child(Element::text_node("Category", "EARTH SCIENCE"))
        .with_child(Element::text_node("Topic", NOT_PROVIDED))
        .with_child(Element::text_node("Term", NOT_PROVIDED))
}

fn platform() -> Element {
    Element::new("Platform")
        .with_child(Element::text_node("Type", NOT_PROVIDED))
        .with_child(Element::text_node("Short_Name", NOT_PROVIDED))
        .with_child(Element::new("Instrument").with_child(Element::text_node("Short_Name", NOT_PROVIDED)))
}

fn temporal_coverage(mapper: &FieldMapper<'_>) -> Vec<Element> {
    mapper.map_items("dates", "date", |date| {
        let start = date.text("date")?;
        let coverage = match date.text("endDate") {
            Some(end) => Element::new("Range_DateTime")
                .with_child(Element::text_node("Beginning_Date_Time", start))
                .with_child(Element::text_node("Ending_Date_Time", end)),
            None => Element::text_node("Single_DateTime", start),
        };
        Some(Element::new("Temporal_Coverage").with_child(coverage))
    })
}

fn spatial_coverage(ctx: &AssemblyContext<'_>) -> Element {
    let geometry = ctx.geometry("spatial", Schema::Dif, &mut GmlIds::new());
    Element::new("Spatial_Coverage")
        .with_child(Element::text_node("Granule_Spatial_Representation", "CARTESIAN"))
        .with_children(geometry.elements)
}

fn language(mapper: &FieldMapper<'_>) -> String {
    let code = mapper
        .text("language")
        .and_then(|language| normalize(&language, Vocabulary::Iso639Language, None))
        .unwrap_or_else(|| "eng".to_string());
    match code.as_str() {
        "ger" => "German",
        "fre" => "French",
        "ita" => "Italian",
        "roh" => "Romansh",
        _ => "English",
    }
    .to_string()
}

fn organization(ctx: &AssemblyContext<'_>) -> Element {
    let catalog = ctx.catalog;
    Element::new("Organization")
        .with_child(Element::text_node("Organization_Type", "DISTRIBUTOR"))
        .with_child(
            Element::new("Organization_Name")
                .with_child(Element::text_node("Short_Name", catalog.organization.as_str()))
                .with_child(Element::text_node("Long_Name", catalog.organization_name.as_str())),
        )
        .with_child(Element::text_node("Organization_URL", catalog.organization_url.as_str()))
        .with_child(
            Element::new("Personnel")
                .with_child(Element::text_node("Role", "DATA CENTER CONTACT"))
                .with_child(
                    Element::new("Contact_Group")
                        .with_child(Element::text_node("Name", catalog.support_name.as_str()))
                        .with_child(Element::text_node("Email", catalog.support_email.as_str())),
                ),
        )
}

fn related_urls(mapper: &FieldMapper<'_>) -> Vec<Element> {
    mapper.map_items("resources", "resource", |resource| {
        let url = resource.text("url")?;
        let description = resource
            .text("description")
            .or_else(|| resource.text("name"));
        Some(
            Element::new("Related_URL")
                .with_child(Element::new("URL_Content_Type").with_child(Element::text_node("Type", "GET DATA")))
                .with_child(Element::text_node("URL", url))
                .with_opt_child(description.map(|description| Element::text_node("Description", description))),
        )
    })
}

fn metadata_dates(mapper: &FieldMapper<'_>) -> Element {
    let created = date_or_not_provided(mapper.text("created"));
    let modified = mapper
        .text("modified")
        .map_or_else(|| created.clone(), |modified| date_or_not_provided(Some(modified)));
    Element::new("Metadata_Dates")
        .with_child(Element::text_node("Metadata_Creation", created))
        .with_child(Element::text_node("Metadata_Last_Revision", modified))
        .with_child(Element::text_node("Data_Creation", NOT_PROVIDED))
        .with_child(Element::text_node("Data_Last_Revision", NOT_PROVIDED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_or_not_provided() {
        assert_eq!(date_or_not_provided(Some("2019-07-03T10:12:44.123".into())), "2019-07-03");
        assert_eq!(date_or_not_provided(Some("soon".into())), NOT_PROVIDED);
        assert_eq!(date_or_not_provided(None), NOT_PROVIDED);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(science_keywords().find("Category").map(Element::text_or_empty), Some("EARTH SCIENCE"));
        assert_eq!(platform().find("Instrument/Short_Name").map(Element::text_or_empty), Some(NOT_PROVIDED));
    }
}
