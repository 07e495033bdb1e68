//! BibTeX `@misc` entries.
//!
//! The tree is a `misc` root carrying the citation key as its `key`
//! attribute and one child per field. Rendering quotes every field value.

use crate::person::Person;
use crate::tree::{Document, Element};

use super::{AssemblyContext, Assembler, Schema};

/// Root element name of a BibTeX tree; also the entry type.
pub const ENTRY_TYPE: &str = "misc";

/// Resolver prefix of the `DOI` field.
pub const DOI_RESOLVER: &str = "http://dx.doi.org/";

/// Assembler for BibTeX.
#[derive(Debug, Clone, Copy, Default)]
pub struct BibtexAssembler;

impl Assembler for BibtexAssembler {
    fn schema(&self) -> Schema {
        Schema::Bibtex
    }

    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Document {
        let mapper = ctx.mapper();
        let name = mapper.text_or("name", ctx.record_name());
        let year = mapper
            .text("publicationYear")
            .unwrap_or_else(|| ctx.clock.current_year().to_string());
        let authors = mapper
            .map_items("authors", "person", Person::from_mapper)
            .iter()
            .map(Person::full_name)
            .collect::<Vec<_>>()
            .join(" and ");

        let root = Element::new(ENTRY_TYPE)
            .with_attr("key", format!("{name}-{year}"))
            .with_child(Element::text_node("year", year))
            .with_child(Element::text_node(
                "publisher",
                mapper.text_or("publisher", &ctx.catalog.publisher),
            ))
            .with_child(Element::text_node("title", mapper.text_or("title", "")))
            .with_child(Element::text_node("author", authors))
            .with_opt_child(
                mapper
                    .text("doi")
                    .map(|doi| Element::text_node("DOI", format!("{DOI_RESOLVER}{doi}"))),
            )
            .with_child(Element::text_node("url", ctx.catalog.dataset_page(&name)));

        Document::new(Schema::Bibtex, root)
    }
}

/// Writes a BibTeX tree as one entry.
#[must_use]
pub fn render(root: &Element) -> String {
    let mut entry = format!("@{}{{{}", root.name, root.attr("key").unwrap_or_default());
    for field in &root.children {
        entry.push_str(&format!(",\n  {} = \"{}\"", field.name, field.text_or_empty()));
    }
    entry.push_str("\n}");
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_entry() {
        let root = Element::new(ENTRY_TYPE)
            .with_attr("key", "gem2-2016")
            .with_child(Element::text_node("year", "2016"))
            .with_child(Element::text_node("title", "GEM2 station data"));
        assert_eq!(
            render(&root),
            "@misc{gem2-2016,\n  year = \"2016\",\n  title = \"GEM2 station data\"\n}"
        );
    }
}
