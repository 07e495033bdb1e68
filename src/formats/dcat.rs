//! DCAT-AP in the OpenDataSwiss dialect.
//!
//! Every record becomes one `dcat:Dataset`. A single conversion wraps it in
//! `rdf:RDF/dcat:Catalog/dcat:dataset`; [`catalog`] wraps many datasets the
//! same way for a catalog-wide export.
//!
//! # Usage
//!
//! ```ignore
//! use ckan_crosswalk::formats::dcat;
//!
//! let datasets = contexts.iter().map(dcat::dataset).collect::<Vec<_>>();
//! let document = dcat::catalog(datasets);
//! ```

use tracing::error;

use crate::clock::parse_timestamp;
use crate::mapper::FieldMapper;
use crate::person::Person;
use crate::tree::{Document, Element};
use crate::vocabulary::{normalize, Vocabulary, OPENDATASWISS_DEFAULT_RIGHTS};

use super::{AssemblyContext, Assembler, Schema};

/// Namespace declarations of the `rdf:RDF` root.
pub const NAMESPACES: [(&str, &str); 10] = [
    ("dct", "http://purl.org/dc/terms/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcat", "http://www.w3.org/ns/dcat#"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("vcard", "http://www.w3.org/2006/vcard/ns#"),
    ("odrs", "http://schema.theodi.org/odrs#"),
    ("schema", "http://schema.org/"),
];

/// Datatype of every timestamp literal.
pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

const LANG: &str = "xml:lang";

/// Multipliers of the `resource_size` units.
const SIZE_UNITS: [(&str, f64); 4] = [
    ("KB", 1024.0),
    ("MB", 1_048_576.0),
    ("GB", 1_073_741_824.0),
    ("TB", 1_099_511_627_776.0),
];

/// Assembler for OpenDataSwiss RDF/XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcatAssembler;

impl Assembler for DcatAssembler {
    fn schema(&self) -> Schema {
        Schema::DcatAp
    }

    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Document {
        catalog(vec![dataset(ctx)])
    }
}

/// Wraps datasets into a `rdf:RDF/dcat:Catalog` document.
#[must_use]
pub fn catalog(datasets: Vec<Element>) -> Document {
    let mut root = Element::new("rdf:RDF");
    for (prefix, uri) in NAMESPACES {
        root = root.with_attr(format!("xmlns:{prefix}"), uri);
    }
    let catalog = Element::new("dcat:Catalog").with_children(
        datasets
            .into_iter()
            .map(|dataset| Element::new("dcat:dataset").with_child(dataset)),
    );
    Document::new(Schema::DcatAp, root.with_child(catalog))
}

/// Builds the `dcat:Dataset` element of one record.
#[must_use]
pub fn dataset(ctx: &AssemblyContext<'_>) -> Element {
    let mapper = ctx.mapper();
    let catalog = ctx.catalog;
    let name = mapper.text_or("name", ctx.record_name());
    let page = catalog.metadata_page(&name);

    let issued = mapper.text("issued").and_then(|raw| timestamp(ctx, &raw));
    let modified = mapper
        .text("modified")
        .and_then(|raw| timestamp(ctx, &raw))
        .or_else(|| issued.clone());

    let publisher = Element::new("foaf:Organization")
        .with_attr("rdf:about", catalog.publisher_url.as_str())
        .with_child(Element::text_node("foaf:name", catalog.publisher.as_str()));

    let rights = mapper
        .text("license")
        .and_then(|license| normalize(&license, Vocabulary::OpenDataSwissRights, None))
        .unwrap_or_else(|| OPENDATASWISS_DEFAULT_RIGHTS.to_string());

    Element::new("dcat:Dataset")
        .with_attr("rdf:about", page.as_str())
        .with_child(Element::text_node(
            "dct:identifier",
            format!("{}{}", mapper.text_or("identifier", ""), catalog.identifier_suffix),
        ))
        .with_child(Element::text_node("dct:title", mapper.text_or("title", "")).with_attr(LANG, "en"))
        .with_child(
            Element::text_node("dct:description", clean_text(&mapper.text_or("description", "")))
                .with_attr(LANG, "en"),
        )
        .with_opt_child(issued.map(|issued| date_time("dct:issued", issued)))
        .with_opt_child(modified.map(|modified| date_time("dct:modified", modified)))
        .with_child(Element::new("dct:publisher").with_child(publisher))
        .with_child(Element::new("dcat:landingPage").with_attr("rdf:resource", page.as_str()))
        .with_children(contact_points(ctx, &mapper))
        .with_child(Element::new("dcat:theme").with_attr("rdf:resource", catalog.dcat_theme.as_str()))
        .with_child(Element::text_node("dct:language", mapper.text_or("language", "en")))
        .with_children(
            mapper
                .map_items("keywords", "keyword", |tag| tag.text("keyword"))
                .into_iter()
                .map(|keyword| Element::text_node("dcat:keyword", keyword.to_uppercase()).with_attr(LANG, "en")),
        )
        .with_children(distributions(ctx, &mapper, &name, &rights))
}

/// Strips Markdown headings and emphasis markers and folds line breaks.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.replace("###", "")
        .replace("##", "")
        .replace(" #", " ")
        .replace("# ", " ")
        .replace("__", "")
        .replace("  ", " ")
        .replace('\r', "\n")
        .replace("\n\n", "\n")
}

fn timestamp(ctx: &AssemblyContext<'_>, raw: &str) -> Option<String> {
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        error!(record = %ctx.record_name(), timestamp = %raw, "unparsable timestamp");
    }
    parsed.map(|parsed| parsed.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn date_time(name: &str, text: String) -> Element {
    Element::text_node(name, text).with_attr("rdf:datatype", DATE_TIME)
}

fn vcard(kind: &str, name: &str, email: Option<&str>) -> Element {
    Element::new("dcat:contactPoint").with_child(
        Element::new(kind)
            .with_child(Element::text_node("vcard:fn", name))
            .with_opt_child(
                email.map(|email| Element::new("vcard:hasEmail").with_attr("rdf:resource", format!("mailto:{email}"))),
            ),
    )
}

/// The maintainer, plus the catalog support desk unless the maintainer is
/// the support desk.
fn contact_points(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Vec<Element> {
    let catalog = ctx.catalog;
    let maintainer = mapper.map_object("contactPoint", "person", Person::from_mapper);
    let mut points = Vec::new();
    if let Some(person) = &maintainer {
        points.push(vcard("vcard:Individual", &person.full_name(), person.email.as_deref()));
    }
    let is_support = maintainer
        .as_ref()
        .and_then(|person| person.email.as_deref())
        .is_some_and(|email| email.eq_ignore_ascii_case(&catalog.support_email));
    if !is_support {
        points.push(vcard(
            "vcard:Organization",
            &catalog.support_name,
            Some(catalog.support_email.as_str()),
        ));
    }
    points
}

/// Size in bytes: `size`, else `resource_size` value times its unit.
fn byte_size(ctx: &AssemblyContext<'_>, resource: &FieldMapper<'_>) -> String {
    if let Some(size) = resource.text("size") {
        return size;
    }
    let Some(value) = resource.text("sizeValue") else {
        return "0".to_string();
    };
    let unit = resource.text_or("sizeUnit", "KB").to_uppercase();
    let multiplier = SIZE_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, multiplier)| *multiplier);
    match (value.parse::<f64>(), multiplier) {
        (Ok(value), Some(multiplier)) => format!("{:.0}", value * multiplier),
        _ => {
            error!(
                record = %ctx.record_name(),
                resource_size = %resource.text_or("resourceSize", ""),
                "non-parsable resource size"
            );
            "0".to_string()
        },
    }
}

fn distributions(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>, dataset: &str, rights: &str) -> Vec<Element> {
    mapper.map_items("resources", "resource", |resource| {
        let id = resource.text_or("id", "");
        let page = ctx.catalog.resource_page(dataset, &id);
        let issued = resource.text("issued").and_then(|raw| timestamp(ctx, &raw));
        let modified = resource
            .text("modified")
            .and_then(|raw| timestamp(ctx, &raw))
            .or_else(|| issued.clone());
        let description = clean_text(&resource.text_or("description", "No description"));

        Some(
            Element::new("dcat:Distribution")
                .with_attr("rdf:about", page.as_str())
                .with_child(Element::text_node("dct:identifier", format!("{dataset}.{id}")))
                .with_child(Element::text_node("dct:title", resource.text_or("name", &id)).with_attr(LANG, "en"))
                .with_child(Element::text_node("dct:description", description).with_attr(LANG, "en"))
                .with_opt_child(issued.map(|issued| date_time("dct:issued", issued)))
                .with_opt_child(modified.map(|modified| date_time("dct:modified", modified)))
                .with_child(Element::text_node("dct:language", "en"))
                .with_child(Element::new("dcat:accessURL").with_attr("rdf:resource", page.as_str()))
                .with_child(Element::text_node("dct:rights", rights))
                .with_child(Element::text_node("dcat:byteSize", byte_size(ctx, resource)))
                .with_opt_child(resource.text("mediaType").map(|media| Element::text_node("dcat:mediaType", media)))
                .with_opt_child(resource.text("format").map(|format| Element::text_node("dct:format", format))),
        )
    })
    .into_iter()
    .map(|distribution| Element::new("dcat:distribution").with_child(distribution))
    .collect()
}
