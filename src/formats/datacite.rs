//! DataCite Metadata Schema 4.4.
//!
//! Produces a `resource` document in namespace
//! `http://datacite.org/schema/kernel-4` with elements in schema order:
//! identifier, creators, titles, publicationYear, publisher, subjects,
//! contributors, dates, language, resourceType, alternateIdentifiers,
//! relatedIdentifiers, sizes, formats, version, rightsList, descriptions,
//! geoLocations and fundingReferences.
//!
//! Defaults: publisher from the catalog settings, publication year from the
//! injected clock, language `en`, resource type `dataset` / `Dataset`.

use tracing::{error, warn};

use crate::geometry::GmlIds;
use crate::mapper::FieldMapper;
use crate::person::Person;
use crate::tree::{Document, Element};
use crate::vocabulary::{normalize, Vocabulary};

use super::{AssemblyContext, Assembler, Schema};

/// DataCite kernel-4 namespace.
pub const NAMESPACE: &str = "http://datacite.org/schema/kernel-4";
/// Location of the 4.4 XSD.
pub const SCHEMA_LOCATION: &str = "http://schema.datacite.org/meta/kernel-4.4/metadata.xsd";
/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

const LANG: &str = "xml:lang";
const LANG_VALUE: &str = "en-us";

/// Assembler for DataCite XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCiteAssembler;

impl Assembler for DataCiteAssembler {
    fn schema(&self) -> Schema {
        Schema::DataCite
    }

    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Document {
        let mapper = ctx.mapper();

        let root = Element::new("resource")
            .with_attr("xsi:schemaLocation", format!("{NAMESPACE} {SCHEMA_LOCATION}"))
            .with_attr("xmlns", NAMESPACE)
            .with_attr("xmlns:xsi", XSI_NAMESPACE)
            .with_child(identifier(ctx, &mapper))
            .with_child(creators(&mapper))
            .with_opt_child(titles(&mapper))
            .with_child(Element::text_node(
                "publicationYear",
                mapper
                    .text("publicationYear")
                    .unwrap_or_else(|| ctx.clock.current_year().to_string()),
            ))
            .with_child(
                Element::text_node("publisher", mapper.text_or("publisher", &ctx.catalog.publisher))
                    .with_attr(LANG, LANG_VALUE),
            )
            .with_opt_child(subjects(&mapper))
            .with_opt_child(contributors(&mapper))
            .with_opt_child(dates(ctx, &mapper))
            .with_child(Element::text_node("language", mapper.text_or("language", "en")))
            .with_child(resource_type(&mapper))
            .with_opt_child(alternate_identifiers(ctx, &mapper))
            .with_opt_child(related_identifiers(ctx, &mapper))
            .with_opt_child(sizes(ctx, &mapper))
            .with_opt_child(formats(&mapper))
            .with_opt_child(mapper.text("version").map(|version| Element::text_node("version", version)))
            .with_opt_child(rights(&mapper))
            .with_opt_child(descriptions(&mapper))
            .with_opt_child(geo_locations(ctx, &mapper))
            .with_opt_child(funding_references(&mapper));

        Document::new(Schema::DataCite, root)
    }
}

fn identifier(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Element {
    let doi = mapper
        .text("identifier")
        .or_else(|| ctx.reserved_doi.map(|doi| doi.trim().to_string()))
        .unwrap_or_default();
    Element::text_node("identifier", doi).with_attr("identifierType", "DOI")
}

fn name_identifier(identifier: Option<&str>, scheme: &str) -> Option<Element> {
    identifier.map(|id| Element::text_node("nameIdentifier", id).with_attr("nameIdentifierScheme", scheme))
}

fn creators(mapper: &FieldMapper<'_>) -> Element {
    let creators = mapper.map_items("creators", "creator", Person::from_mapper);
    Element::new("creators").with_children(creators.iter().map(|person| {
        let mut creator = Element::new("creator").with_child(Element::text_node("creatorName", person.full_name()));
        if !person.given_name.is_empty() {
            creator.push(Element::text_node("givenName", person.given_name.as_str()));
            creator.push(Element::text_node("familyName", person.family_name.as_str()));
        }
        creator
            .with_opt_child(name_identifier(person.orcid(), "ORCID"))
            .with_children(
                person
                    .affiliations
                    .iter()
                    .map(|affiliation| Element::text_node("affiliation", affiliation.as_str())),
            )
    }))
}

fn titles(mapper: &FieldMapper<'_>) -> Option<Element> {
    let title = mapper.text("title")?;
    Some(Element::new("titles").with_child(Element::text_node("title", title).with_attr(LANG, LANG_VALUE)))
}

fn subjects(mapper: &FieldMapper<'_>) -> Option<Element> {
    let subjects = mapper.map_items("subjects", "subject", |tag| tag.text("subject"));
    (!subjects.is_empty()).then(|| {
        Element::new("subjects").with_children(
            subjects
                .into_iter()
                .map(|subject| Element::text_node("subject", subject).with_attr(LANG, LANG_VALUE)),
        )
    })
}

fn contributors(mapper: &FieldMapper<'_>) -> Option<Element> {
    mapper.map_object("contributors", "contributor", |maintainer| {
        let person = Person::from_mapper(maintainer)?;
        let kind = maintainer
            .text("contributorType")
            .and_then(|kind| normalize(&kind, Vocabulary::ContributorType, None))
            .unwrap_or_else(|| "ContactPerson".to_string());
        let scheme = maintainer.text_or("nameIdentifierScheme", "orcid").to_uppercase();

        let mut contributor = Element::new("contributor")
            .with_attr("contributorType", kind)
            .with_child(Element::text_node("contributorName", person.full_name()));
        if !person.given_name.is_empty() {
            contributor.push(Element::text_node("givenName", person.given_name.as_str()));
            contributor.push(Element::text_node("familyName", person.family_name.as_str()));
        }
        let identifier = if scheme == "ORCID" {
            person.orcid()
        } else {
            person.identifier.as_deref()
        };
        let contributor = contributor
            .with_opt_child(name_identifier(identifier, &scheme))
            .with_opt_child(
                person
                    .organisation()
                    .map(|affiliation| Element::text_node("affiliation", affiliation)),
            );
        Some(Element::new("contributors").with_child(contributor))
    })
}

/// Title-cases each alphabetic run: `"CREATED"` becomes `"Created"`.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn date_type(ctx: &AssemblyContext<'_>, raw: Option<String>) -> String {
    let raw = raw.unwrap_or_else(|| "Valid".to_string());
    let titled = title_case(&raw);
    if let Some(known) = normalize(&titled, Vocabulary::DateType, None) {
        return known;
    }
    if titled != "Valid" {
        warn!(record = %ctx.record_name(), date_type = %raw, "unsupported DataCite dateType, using Valid");
    }
    "Valid".to_string()
}

fn dates(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Option<Element> {
    let dates = mapper.map_items("dates", "date", |date| {
        let start = date.text("date")?;
        let text = match date.text("endDate") {
            Some(end) => format!("{start}/{end}"),
            None => start,
        };
        Some(Element::text_node("date", text).with_attr("dateType", date_type(ctx, date.text("dateType"))))
    });
    (!dates.is_empty()).then(|| Element::new("dates").with_children(dates))
}

fn resource_type(mapper: &FieldMapper<'_>) -> Element {
    let general = mapper
        .text("resourceTypeGeneral")
        .and_then(|general| normalize(&general, Vocabulary::ResourceTypeGeneral, Some("Dataset")))
        .unwrap_or_else(|| "Dataset".to_string());
    Element::text_node("resourceType", mapper.text_or("resourceType", "dataset")).with_attr("resourceTypeGeneral", general)
}

fn alternate_identifiers(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Option<Element> {
    let urls = mapper.texts("alternateIdentifiers");
    (!urls.is_empty()).then(|| {
        Element::new("alternateIdentifiers").with_children(urls.iter().map(|name_or_id| {
            Element::text_node("alternateIdentifier", ctx.catalog.dataset_page(name_or_id))
                .with_attr("alternateIdentifierType", "URL")
        }))
    })
}

fn related_identifiers(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Option<Element> {
    let free_text = mapper.texts("relatedIdentifiers").join(" ");
    let resource_urls = mapper.map_items("resources", "resource", |resource| resource.text("url"));
    let related = ctx.miner().mine_related_identifiers(&free_text, &resource_urls);
    (!related.is_empty()).then(|| {
        Element::new("relatedIdentifiers").with_children(related.into_iter().map(|related| {
            Element::text_node("relatedIdentifier", related.value)
                .with_attr("relatedIdentifierType", related.kind.to_string())
                .with_attr("relationType", related.relation.to_string())
        }))
    })
}

fn sizes(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Option<Element> {
    let sizes = mapper.map_items("resources", "resource", |resource| {
        if let Some(size) = resource.text("size") {
            return Some(format!("{size} bytes"));
        }
        let raw = resource.text("resourceSize")?;
        if serde_json::from_str::<serde_json::Value>(&raw).is_err() {
            error!(record = %ctx.record_name(), resource_size = %raw, "non-parsable resource size");
            return None;
        }
        let value = resource.text_or("sizeValue", "0");
        Some(format!("{value} {}", resource.text_or("sizeUnit", "KB").to_uppercase()).trim().to_string())
    });
    (!sizes.is_empty()).then(|| Element::new("sizes").with_children(sizes.into_iter().map(|size| Element::text_node("size", size))))
}

fn formats(mapper: &FieldMapper<'_>) -> Option<Element> {
    let mut formats: Vec<String> = Vec::new();
    for format in mapper.map_items("resources", "resource", |resource| resource.text("format")) {
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    (!formats.is_empty())
        .then(|| Element::new("formats").with_children(formats.into_iter().map(|format| Element::text_node("format", format))))
}

fn rights(mapper: &FieldMapper<'_>) -> Option<Element> {
    let title = mapper.text("rights");
    let uri = mapper.text("rightsURI");
    let spdx = mapper
        .text("rightsIdentifier")
        .and_then(|license| normalize(&license, Vocabulary::RightsIdentifier, None));
    if title.is_none() && uri.is_none() && spdx.is_none() {
        return None;
    }

    let mut rights = Element::new("rights");
    if let Some(title) = title {
        rights = rights.with_attr(LANG, LANG_VALUE).with_text(title);
    }
    rights = rights.with_opt_attr("rightsURI", uri);
    if let Some(spdx) = spdx {
        rights = rights
            .with_attr("schemeURI", "https://spdx.org/licenses/")
            .with_attr("rightsIdentifierScheme", "SPDX")
            .with_attr("rightsIdentifier", spdx);
    }
    Some(Element::new("rightsList").with_child(rights))
}

/// Strips Markdown noise from an abstract.
fn clean_description(notes: &str) -> String {
    notes
        .replace('\r', "")
        .replace(['>', '<'], "-")
        .replace("__", "")
        .replace('#', "")
        .replace("\n\n", "\n")
        .replace("\n\n", "\n")
        .trim()
        .to_string()
}

fn descriptions(mapper: &FieldMapper<'_>) -> Option<Element> {
    let notes = mapper.text("description")?;
    Some(
        Element::new("descriptions").with_child(
            Element::text_node("description", clean_description(&notes))
                .with_attr("descriptionType", "Abstract")
                .with_attr(LANG, LANG_VALUE),
        ),
    )
}

fn geo_locations(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Option<Element> {
    let node = ctx.geometry("geoLocations", Schema::DataCite, &mut GmlIds::new());
    if node.is_empty() {
        return None;
    }
    let place = mapper
        .text("geoLocationPlace")
        .map(|place| Element::new("geoLocation").with_child(Element::text_node("geoLocationPlace", place)));
    Some(Element::new("geoLocations").with_children(node.elements).with_opt_child(place))
}

fn funding_references(mapper: &FieldMapper<'_>) -> Option<Element> {
    let references = mapper.map_items("fundingReferences", "fundingReference", |funder| {
        let name = funder.text("funderName")?;
        Some(
            Element::new("fundingReference")
                .with_child(Element::text_node("funderName", name))
                .with_opt_child(funder.text("awardNumber").map(|award| Element::text_node("awardNumber", award))),
        )
    });
    (!references.is_empty()).then(|| Element::new("fundingReferences").with_children(references))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("created"), "Created");
        assert_eq!(title_case("COLLECTED"), "Collected");
        assert_eq!(title_case("date of issue"), "Date Of Issue");
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(
            clean_description("# Heading\r\n\n\n\nSee <b>__bold__</b>"),
            "Heading\nSee -b-bold-/b-"
        );
    }
}
