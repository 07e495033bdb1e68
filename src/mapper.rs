//! Schema field mapper.
//!
//! [`FieldMapper`] is the single place where target-schema tag names are
//! translated to source-record fields. Assemblers ask for `"publisher"` or
//! `"creators"`; the mapper looks the tag up in the schema's
//! [`SchemaMapping`], reads the field, decodes embedded JSON when needed and
//! returns `None` (or the caller's default) for absent or blank values.
//!
//! The same type works one level down: a composite item such as one author
//! is read through a mapper built from the tag's nested mapping.
//!
//! # Examples
//!
//! ```ignore
//! use ckan_crosswalk::mapper::FieldMapper;
//!
//! let mapper = FieldMapper::for_record(&record, config.mapping.section(Schema::Ris));
//! let title = mapper.text_or("title", "");
//! let authors = mapper.map_items("authors", "person", Person::from_mapper);
//! ```

use lazy_static::lazy_static;
use serde_json::{Map, Value};
use tracing::trace;

use crate::config::{SchemaMapping, TagMapping};
use crate::record::{embedded_list, embedded_object, scalar_text, SourceRecord};

lazy_static! {
    static ref EMPTY_MAPPING: SchemaMapping = SchemaMapping::new();
}

/// Resolves target tags against one source map.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'a> {
    source: &'a Map<String, Value>,
    mapping: &'a SchemaMapping,
}

impl<'a> FieldMapper<'a> {
    /// Creates a mapper over an arbitrary source map.
    #[must_use]
    pub fn new(source: &'a Map<String, Value>, mapping: &'a SchemaMapping) -> Self {
        Self { source, mapping }
    }

    /// Creates a mapper over a whole source record.
    #[must_use]
    pub fn for_record(record: &'a SourceRecord, mapping: &'a SchemaMapping) -> Self {
        Self::new(record.fields(), mapping)
    }

    /// The mapping this mapper reads through.
    #[must_use]
    pub fn mapping(&self) -> &'a SchemaMapping {
        self.mapping
    }

    /// Reads one source path.
    ///
    /// An exact field name wins. Otherwise `head.key` reads `key` from the
    /// JSON embedded in field `head`.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> Option<Value> {
        if let Some(value) = self.source.get(path) {
            return Some(value.clone());
        }
        let (head, key) = path.split_once('.')?;
        let embedded = embedded_object(self.source.get(head)?);
        embedded.get(key).cloned()
    }

    fn candidates(&self, tag: &str) -> Vec<Value> {
        let fields = self.mapping.fields(tag);
        if fields.is_empty() {
            trace!(tag, "tag has no field mapping");
        }
        fields
            .into_iter()
            .filter_map(|field| self.resolve_path(field))
            .filter(is_present)
            .collect()
    }

    /// Returns the first present value mapped for `tag`.
    #[must_use]
    pub fn value(&self, tag: &str) -> Option<Value> {
        self.candidates(tag).into_iter().next()
    }

    /// Returns the first non-blank scalar mapped for `tag`, trimmed.
    #[must_use]
    pub fn text(&self, tag: &str) -> Option<String> {
        self.texts(tag).into_iter().next()
    }

    /// Like [`text`](Self::text) but falls back to `default`.
    #[must_use]
    pub fn text_or(&self, tag: &str, default: &str) -> String {
        self.text(tag).unwrap_or_else(|| default.to_string())
    }

    /// Returns every non-blank scalar mapped for `tag`, in mapping order.
    #[must_use]
    pub fn texts(&self, tag: &str) -> Vec<String> {
        self.candidates(tag)
            .iter()
            .filter_map(scalar_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Returns the list of composite items mapped for `tag`.
    ///
    /// JSON-encoded lists are decoded; malformed content yields no items.
    #[must_use]
    pub fn items(&self, tag: &str) -> Vec<Map<String, Value>> {
        self.value(tag)
            .map(|value| embedded_list(&value))
            .unwrap_or_default()
    }

    /// Returns the composite object mapped for `tag`, or an empty map.
    #[must_use]
    pub fn object(&self, tag: &str) -> Map<String, Value> {
        self.value(tag)
            .map(|value| embedded_object(&value))
            .unwrap_or_default()
    }

    /// The nested mapping of a composite tag; empty when unmapped.
    #[must_use]
    pub fn nested(&self, tag: &str) -> &'a SchemaMapping {
        self.mapping.nested(tag).unwrap_or_else(|| {
            trace!(tag, "tag has no nested mapping");
            &EMPTY_MAPPING
        })
    }

    /// The mapping items of `item_tag` are read through.
    ///
    /// A nested mapping is used as is. A plain field list stays in this
    /// mapping, so the item closure reads `item_tag` itself, as in
    /// `tag.text("keyword")`.
    fn item_mapping(&self, item_tag: &str) -> &'a SchemaMapping {
        match self.mapping.get(item_tag) {
            Some(TagMapping::Field(_) | TagMapping::Fields(_)) => self.mapping,
            _ => self.nested(item_tag),
        }
    }

    /// Maps every item of `list_tag` through the sub-mapping `item_tag`.
    ///
    /// Items for which `f` returns `None` are skipped.
    pub fn map_items<T, F>(&self, list_tag: &str, item_tag: &str, mut f: F) -> Vec<T>
    where
        F: FnMut(&FieldMapper<'_>) -> Option<T>,
    {
        let nested = self.item_mapping(item_tag);
        self.items(list_tag)
            .iter()
            .filter_map(|item| f(&FieldMapper::new(item, nested)))
            .collect()
    }

    /// Reads the single composite object of `object_tag` through `item_tag`.
    pub fn map_object<T, F>(&self, object_tag: &str, item_tag: &str, f: F) -> Option<T>
    where
        F: FnOnce(&FieldMapper<'_>) -> Option<T>,
    {
        let object = self.object(object_tag);
        if object.is_empty() {
            return None;
        }
        f(&FieldMapper::new(&object, self.item_mapping(item_tag)))
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
