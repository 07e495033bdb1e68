//! ISO 19139, the XML encoding of ISO 19115 geographic metadata.
//!
//! Produces a `gmd:MD_Metadata` document. Code-list values point into the
//! ISO TC211 `gmxCodelists.xml` catalogue and are written in lower camel
//! case (`"Under Development"` becomes `underDevelopment`).
//!
//! Several ISO fields have no CKAN counterpart and are read from the
//! record's `extras` list instead: for those tags the mapping names extras
//! keys, matched ignoring case, spaces and underscores.

use tracing::warn;

use crate::clock::parse_timestamp;
use crate::geometry::GmlIds;
use crate::mapper::FieldMapper;
use crate::person::Person;
use crate::tree::{Document, Element};
use crate::vocabulary::{lookup_key, normalize, Vocabulary};

use super::{AssemblyContext, Assembler, Schema};

/// Base URL of the ISO TC211 code lists.
pub const CODELIST_BASE: &str = "http://www.isotc211.org/2005/resources/Codelist/gmxCodelists.xml#";

const NAMESPACES: [(&str, &str); 9] = [
    ("xmlns:gmd", "http://www.isotc211.org/2005/gmd"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xmlns:gml", "http://www.opengis.net/gml"),
    ("xmlns:gts", "http://www.isotc211.org/2005/gts"),
    ("xmlns:gco", "http://www.isotc211.org/2005/gco"),
    ("xmlns:geonet", "http://www.fao.org/geonetwork"),
    ("xmlns:csw", "http://www.opengis.net/cat/csw/2.0.2"),
    ("xmlns:srv", "http://www.isotc211.org/2005/srv"),
    ("xmlns:gmx", "http://www.isotc211.org/2005/gmx"),
];

const SCHEMA_LOCATION: &str = "http://www.isotc211.org/2005/gmd http://www.isotc211.org/2005/gmd/gmd.xsd";

/// Assembler for ISO 19139 XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso19139Assembler;

impl Assembler for Iso19139Assembler {
    fn schema(&self) -> Schema {
        Schema::Iso19139
    }

    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Document {
        let mapper = ctx.mapper();
        let contact = contact(&mapper);
        let language = language(&mapper);

        let mut root = Element::new("gmd:MD_Metadata");
        for (name, uri) in NAMESPACES {
            root = root.with_attr(name, uri);
        }
        let root = root
            .with_attr("xsi:schemaLocation", SCHEMA_LOCATION)
            .with_child(wrap("gmd:fileIdentifier", character_string(file_identifier(&mapper))))
            .with_child(language.clone())
            .with_child(character_set())
            .with_child(Element::new("gmd:hierarchyLevel").with_child(code("gmd:MD_ScopeCode", "dataset")))
            .with_child(wrap("gmd:contact", contact.clone()))
            .with_child(date_stamp(ctx, &mapper))
            .with_child(wrap("gmd:metadataStandardName", character_string("ISO 19115:2003/19139")))
            .with_child(wrap("gmd:metadataStandardVersion", character_string("1.0")))
            .with_child(reference_system())
            .with_child(identification(ctx, &mapper, contact, language))
            .with_child(distribution(ctx, &mapper));

        Document::new(Schema::Iso19139, root)
    }
}

fn character_string(text: impl Into<String>) -> Element {
    Element::text_node("gco:CharacterString", text)
}

fn wrap(name: &str, child: Element) -> Element {
    Element::new(name).with_child(child)
}

/// An element marked as intentionally empty.
fn missing(name: &str) -> Element {
    Element::new(name).with_attr("gco:nilReason", "missing")
}

/// Converts a label to an ISO code-list value.
///
/// Multi-word labels become lower camel case; single words only get their
/// first letter lowercased.
#[must_use]
pub fn code_value(label: &str) -> String {
    let label = label.trim();
    if label.contains(' ') && label.len() >= 3 {
        let mut words = label.split_whitespace();
        let mut out = words.next().unwrap_or_default().to_lowercase();
        for word in words {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
        out
    } else {
        let mut chars = label.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_lowercase().chain(chars).collect()
        })
    }
}

/// A code-list element such as `gmd:MD_ScopeCode`.
fn code(name: &str, value: &str) -> Element {
    let list = name.rsplit(':').next().unwrap_or(name);
    Element::new(name)
        .with_attr("codeList", format!("{CODELIST_BASE}{list}"))
        .with_attr("codeListValue", value)
        .with_text(value)
}

fn file_identifier(mapper: &FieldMapper<'_>) -> String {
    mapper
        .text("doi")
        .map(|doi| format!("doi:{doi}"))
        .unwrap_or_else(|| mapper.text_or("id", ""))
}

fn language(mapper: &FieldMapper<'_>) -> Element {
    let code = mapper
        .text("language")
        .and_then(|language| normalize(&language, Vocabulary::Iso639Language, None))
        .unwrap_or_else(|| "eng".to_string());
    wrap("gmd:language", character_string(code))
}

fn character_set() -> Element {
    let value = "MD_CharacterSetCode_utf8";
    wrap(
        "gmd:characterSet",
        Element::new("gmd:MD_CharacterSetCode")
            .with_attr("codeListValue", value)
            .with_attr("codeList", format!("{CODELIST_BASE}MD_CharacterSetCode"))
            .with_attr("codeSpace", "ISOTC211/19115")
            .with_text(value),
    )
}

fn contact(mapper: &FieldMapper<'_>) -> Element {
    let person = mapper
        .map_object("contact", "person", Person::from_mapper)
        .unwrap_or_default();
    let email = person.email.as_deref().map_or_else(
        || missing("gmd:electronicMailAddress"),
        |email| wrap("gmd:electronicMailAddress", character_string(email)),
    );

    Element::new("gmd:CI_ResponsibleParty")
        .with_child(wrap("gmd:individualName", character_string(person.full_name())))
        .with_child(wrap(
            "gmd:organisationName",
            character_string(person.organisation().unwrap_or_default()),
        ))
        .with_child(wrap(
            "gmd:contactInfo",
            wrap("gmd:CI_Contact", wrap("gmd:address", wrap("gmd:CI_Address", email))),
        ))
        .with_child(wrap("gmd:role", code("gmd:CI_RoleCode", "pointOfContact")))
}

fn date_stamp(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Element {
    let raw = mapper.text("dateStamp");
    let stamp = match raw.as_deref().map(|raw| (raw, parse_timestamp(raw))) {
        Some((_, Some(parsed))) => parsed,
        Some((raw, None)) => {
            warn!(record = %ctx.record_name(), date_stamp = %raw, "unparsable metadata date, using now");
            ctx.clock.now().naive_utc()
        },
        None => ctx.clock.now().naive_utc(),
    };
    wrap(
        "gmd:dateStamp",
        Element::text_node("gco:DateTime", stamp.format("%Y-%m-%dT%H:%M:%S").to_string()),
    )
}

fn reference_system() -> Element {
    wrap(
        "gmd:referenceSystemInfo",
        wrap(
            "gmd:MD_ReferenceSystem",
            wrap(
                "gmd:referenceSystemIdentifier",
                wrap("gmd:RS_Identifier", wrap("gmd:code", character_string("EPSG:4326"))),
            ),
        ),
    )
}

/// A date from the record's `dates` list.
struct DateEntry {
    date: String,
    end_date: Option<String>,
    date_type: String,
}

fn date_entries(mapper: &FieldMapper<'_>) -> Vec<DateEntry> {
    mapper.map_items("dates", "date", |date| {
        Some(DateEntry {
            date: date.text("date")?,
            end_date: date.text("endDate"),
            date_type: date.text_or("dateType", ""),
        })
    })
}

/// The citation date: the last `available` date, else 31 December of the
/// publication year.
fn publication_date(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>, dates: &[DateEntry]) -> String {
    dates
        .iter()
        .rev()
        .filter(|entry| entry.date_type.eq_ignore_ascii_case("available"))
        .find_map(|entry| parse_timestamp(&entry.date))
        .map(|available| available.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| {
            let year = mapper
                .text("publicationYear")
                .unwrap_or_else(|| ctx.clock.current_year().to_string());
            format!("{year}-12-31")
        })
}

fn citation(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>, dates: &[DateEntry]) -> Element {
    let date = Element::new("gmd:CI_Date")
        .with_child(wrap(
            "gmd:date",
            Element::text_node("gco:Date", publication_date(ctx, mapper, dates)),
        ))
        .with_child(wrap("gmd:dateType", code("gmd:CI_DateTypeCode", "publication")));

    let form = mapper
        .text("presentationForm")
        .map(|form| code_value(&form))
        .filter(|form| !form.is_empty())
        .map(|form| wrap("gmd:presentationForm", code("gmd:CI_PresentationFormCode", &form)));

    wrap(
        "gmd:citation",
        Element::new("gmd:CI_Citation")
            .with_child(wrap("gmd:title", character_string(mapper.text_or("title", ""))))
            .with_child(wrap("gmd:date", date))
            .with_opt_child(form),
    )
}

/// Looks up a value in the record's extras by the keys mapped for `tag`.
fn extra(mapper: &FieldMapper<'_>, tag: &str) -> Option<String> {
    let keys: Vec<String> = mapper.mapping().fields(tag).into_iter().map(lookup_key).collect();
    if keys.is_empty() {
        return None;
    }
    let extras = mapper.map_items("extras", "extra", |extra| Some((extra.text("key")?, extra.text("value")?)));
    keys.iter().find_map(|wanted| {
        extras
            .iter()
            .find(|(key, _)| lookup_key(key) == *wanted)
            .map(|(_, value)| value.clone())
    })
}

fn keywords(mapper: &FieldMapper<'_>) -> Option<Element> {
    let keywords = mapper.map_items("keywords", "keyword", |tag| tag.text("keyword"));
    (!keywords.is_empty()).then(|| {
        wrap(
            "gmd:descriptiveKeywords",
            Element::new("gmd:MD_Keywords")
                .with_children(
                    keywords
                        .into_iter()
                        .map(|keyword| wrap("gmd:keyword", character_string(keyword.to_uppercase()))),
                )
                .with_child(wrap("gmd:type", code("gmd:MD_KeywordTypeCode", "theme"))),
        )
    })
}

fn constraints(mapper: &FieldMapper<'_>) -> Element {
    let restriction = |tag: &str, name: &str| {
        extra(mapper, tag).map(|value| wrap(name, code("gmd:MD_RestrictionCode", &code_value(&value))))
    };
    let other = mapper.text("otherConstraints").map_or_else(
        || missing("gmd:otherConstraints"),
        |license| wrap("gmd:otherConstraints", character_string(license)),
    );
    wrap(
        "gmd:resourceConstraints",
        Element::new("gmd:MD_LegalConstraints")
            .with_opt_child(restriction("accessConstraints", "gmd:accessConstraints"))
            .with_opt_child(restriction("useConstraints", "gmd:useConstraints"))
            .with_child(other),
    )
}

fn temporal_extents(dates: &[DateEntry], ids: &mut GmlIds) -> Vec<Element> {
    dates
        .iter()
        .map(|entry| {
            let id = ids.next_id("D");
            let time = match &entry.end_date {
                Some(end) => Element::new("gml:TimePeriod")
                    .with_attr("gml:id", id)
                    .with_child(Element::text_node("gml:beginPosition", entry.date.as_str()))
                    .with_child(Element::text_node("gml:endPosition", end.as_str())),
                None => Element::new("gml:TimeInstant")
                    .with_attr("gml:id", id)
                    .with_child(Element::text_node("gml:timePosition", entry.date.as_str())),
            };
            wrap(
                "gmd:extent",
                Element::new("gmd:EX_Extent")
                    .with_child(wrap("gmd:description", character_string(entry.date_type.as_str())))
                    .with_child(wrap(
                        "gmd:temporalElement",
                        wrap("gmd:EX_TemporalExtent", wrap("gmd:extent", time)),
                    )),
            )
        })
        .collect()
}

fn identification(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>, contact: Element, language: Element) -> Element {
    let dates = date_entries(mapper);
    let mut ids = GmlIds::new();
    let temporal = temporal_extents(&dates, &mut ids);
    let spatial = ctx.geometry("extent", Schema::Iso19139, &mut ids);

    let abstract_text = mapper.text_or("abstract", "").replace(['\n', '\r'], " ");
    let purpose = extra(mapper, "purpose").map(|purpose| wrap("gmd:purpose", character_string(purpose)));
    let status = extra(mapper, "status").map(|status| {
        let value = normalize(&status, Vocabulary::ProgressCode, None).unwrap_or_else(|| code_value(&status));
        wrap("gmd:status", code("gmd:MD_ProgressCode", &value))
    });
    let maintenance = extra(mapper, "maintenance").map(|frequency| {
        wrap(
            "gmd:resourceMaintenance",
            wrap(
                "gmd:MD_MaintenanceInformation",
                wrap(
                    "gmd:maintenanceAndUpdateFrequency",
                    code("gmd:MD_MaintenanceFrequencyCode", &code_value(&frequency)),
                ),
            ),
        )
    });
    let topic = extra(mapper, "topicCategory")
        .map(|category| Element::text_node("gmd:MD_TopicCategoryCode", code_value(&category)))
        .map(|category| wrap("gmd:topicCategory", category));
    let spatial = (!spatial.is_empty())
        .then(|| wrap("gmd:extent", Element::new("gmd:EX_Extent").with_children(spatial.elements)));

    wrap(
        "gmd:identificationInfo",
        Element::new("gmd:MD_DataIdentification")
            .with_child(citation(ctx, mapper, &dates))
            .with_child(wrap("gmd:abstract", character_string(abstract_text)))
            .with_opt_child(purpose)
            .with_opt_child(status)
            .with_child(wrap("gmd:pointOfContact", contact))
            .with_opt_child(maintenance)
            .with_opt_child(keywords(mapper))
            .with_child(constraints(mapper))
            .with_child(language)
            .with_child(character_set())
            .with_opt_child(topic)
            .with_children(temporal)
            .with_opt_child(spatial),
    )
}

fn online_resource(url: &str, name: &str, function: &str) -> Element {
    let protocol = url.split(':').next().unwrap_or_default().to_uppercase();
    wrap(
        "gmd:onLine",
        Element::new("gmd:CI_OnlineResource")
            .with_child(wrap("gmd:linkage", Element::text_node("gmd:URL", url)))
            .with_child(wrap("gmd:protocol", character_string(protocol)))
            .with_child(wrap("gmd:name", character_string(name.to_uppercase())))
            .with_child(wrap("gmd:function", code("gmd:CI_OnLineFunctionCode", function))),
    )
}

fn distribution(ctx: &AssemblyContext<'_>, mapper: &FieldMapper<'_>) -> Element {
    let dataset = mapper.text_or("name", ctx.record_name());

    let mut formats: Vec<String> = Vec::new();
    let resources = mapper.map_items("resources", "resource", |resource| {
        if let Some(format) = resource.text("format").map(|format| format.to_uppercase()) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        let id = resource.text_or("id", "");
        let name = resource
            .text("name")
            .or_else(|| (!id.is_empty()).then(|| id.clone()))
            .unwrap_or_else(|| "DATASET RESOURCE".to_string());
        let url = resource
            .text("url")
            .filter(|url| crate::doi::is_web_url(url))
            .unwrap_or_else(|| ctx.catalog.resource_page(&dataset, &id));
        Some(online_resource(&url, &name, "download"))
    });

    let formats = formats.into_iter().map(|format| {
        wrap(
            "gmd:distributionFormat",
            Element::new("gmd:MD_Format")
                .with_child(wrap("gmd:name", character_string(format)))
                .with_child(Element::new("gmd:version").with_attr("gco:nilReason", "unknown")),
        )
    });

    wrap(
        "gmd:distributionInfo",
        Element::new("gmd:MD_Distribution").with_children(formats).with_child(wrap(
            "gmd:transferOptions",
            Element::new("gmd:MD_DigitalTransferOptions")
                .with_child(online_resource(
                    &ctx.catalog.dataset_page(&dataset),
                    "dataset metadata",
                    "information",
                ))
                .with_children(resources),
        )),
    )
}
