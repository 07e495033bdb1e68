//! RIS citation records.
//!
//! The document tree is flat: a `ris` root whose children are named by RIS
//! tag (`TY`, `T1`, `AU`, ...) and carry the line value as text. Rendering
//! writes one `TAG  - value` line per child and the `ER` terminator.

use crate::person::Person;
use crate::tree::{Document, Element};

use super::{AssemblyContext, Assembler, Schema};

/// Root element name of a RIS tree.
pub const ROOT: &str = "ris";

/// Closing line of every record.
pub const TERMINATOR: &str = "ER  -  ";

/// Assembler for RIS.
#[derive(Debug, Clone, Copy, Default)]
pub struct RisAssembler;

impl Assembler for RisAssembler {
    fn schema(&self) -> Schema {
        Schema::Ris
    }

    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Document {
        let mapper = ctx.mapper();
        let line = |tag: &str, value: String| Element::text_node(tag, value);

        let mut root = Element::new(ROOT)
            .with_child(line("TY", "DATA".to_string()))
            .with_child(line("T1", mapper.text_or("title", "")))
            .with_children(
                mapper
                    .map_items("authors", "person", Person::from_mapper)
                    .iter()
                    .map(|author| line("AU", author.full_name())),
            )
            .with_opt_child(mapper.text("doi").map(|doi| line("DO", doi)))
            .with_child(line("UR", ctx.catalog.dataset_page(&mapper.text_or("name", ctx.record_name()))))
            .with_children(
                mapper
                    .map_items("keywords", "keyword", |tag| tag.text("keyword"))
                    .into_iter()
                    .map(|keyword| line("KW", keyword.to_uppercase())),
            );
        if let Some(year) = mapper.text("publicationYear") {
            root.push(line("PY", year));
        }
        root.push(line("PB", mapper.text_or("publisher", &ctx.catalog.publisher)));
        root.push(line("LA", mapper.text_or("language", "en")));

        Document::new(Schema::Ris, root)
    }
}

/// Writes a RIS tree as newline-joined tagged lines.
#[must_use]
pub fn render(root: &Element) -> String {
    root.children
        .iter()
        .map(|line| format!("{}  - {}", line.name, line.text_or_empty()))
        .chain(std::iter::once(TERMINATOR.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lines() {
        let root = Element::new(ROOT)
            .with_child(Element::text_node("TY", "DATA"))
            .with_child(Element::text_node("T1", "GEM2 station data"));
        assert_eq!(render(&root), "TY  - DATA\nT1  - GEM2 station data\nER  -  ");
    }

    #[test]
    fn test_render_empty_record() {
        assert_eq!(render(&Element::new(ROOT)), TERMINATOR);
    }
}
