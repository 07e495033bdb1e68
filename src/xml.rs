//! XML serialization of document trees.
//!
//! Writes an [`Element`] tree with an XML declaration and two-space
//! indentation. Text and attribute values are escaped by the writer; element
//! and attribute order follow the tree exactly.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{CrosswalkError, Result};
use crate::tree::Element;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serializes a tree rooted at `root` to an XML document string.
///
/// # Errors
///
/// Returns [`CrosswalkError::Xml`] if the writer fails or produces invalid UTF-8.
pub fn to_xml_string(root: &Element) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    write_element(&mut writer, root)?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| CrosswalkError::Xml(e.to_string()))
}

fn write_element(writer: &mut XmlWriter, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_error)
}

fn xml_error(err: impl std::fmt::Display) -> CrosswalkError {
    CrosswalkError::Xml(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_and_nesting() {
        let root = Element::new("resource")
            .with_attr("xmlns", "http://datacite.org/schema/kernel-4")
            .with_child(Element::text_node("identifier", "10.16904/1").with_attr("identifierType", "DOI"));
        let xml = to_xml_string(&root).expect("serialize");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<resource xmlns=\"http://datacite.org/schema/kernel-4\">"));
        assert!(xml.contains("<identifier identifierType=\"DOI\">10.16904/1</identifier>"));
        assert!(xml.trim_end().ends_with("</resource>"));
    }

    #[test]
    fn test_escaping() {
        let root = Element::text_node("title", "Snow & Ice <2016>").with_attr("note", "a\"b");
        let xml = to_xml_string(&root).expect("serialize");
        assert!(xml.contains("Snow &amp; Ice &lt;2016&gt;"));
        assert!(xml.contains("note=\"a&quot;b\""));
    }

    #[test]
    fn test_empty_element_is_self_closing() {
        let root = Element::new("gmd:version").with_attr("gco:nilReason", "missing");
        let xml = to_xml_string(&root).expect("serialize");
        assert!(xml.contains("<gmd:version gco:nilReason=\"missing\"/>"));
    }
}
