//! Target document trees.
//!
//! Assemblers build an [`Element`] tree bottom-up: ordered children, ordered
//! attributes, optional text. The tree is handed to a serializer unchanged,
//! so attribute and child order here is exactly the order on the wire.

use std::fmt;

use crate::formats::Schema;

/// One element of a target document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified element name, e.g. `gmd:title`.
    pub name: String,
    /// Attributes in output order.
    pub attributes: Vec<(String, String)>,
    /// Text content.
    pub text: Option<String>,
    /// Child elements in output order.
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an element holding only text.
    #[must_use]
    pub fn text_node(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends an attribute when a value is given.
    #[must_use]
    pub fn with_opt_attr(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_attr(name, value),
            None => self,
        }
    }

    /// Appends a child.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child when one is given.
    #[must_use]
    pub fn with_opt_child(mut self, child: Option<Element>) -> Self {
        if let Some(child) = child {
            self.children.push(child);
        }
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Appends a child in place.
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first direct child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns every direct child with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follows a `/`-separated path of child names.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .try_fold(self, |element, name| element.child(name))
    }

    /// Collects every element with the given name, depth first.
    #[must_use]
    pub fn descendants(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Text of the element, or `""`.
    #[must_use]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Returns true if the element carries no text, attributes or children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.attributes.is_empty() && self.children.is_empty()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {key}=\"{value}\"")?;
        }
        write!(f, ">")
    }
}

/// A fully assembled document for one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Target schema.
    pub schema: Schema,
    /// Root element.
    pub root: Element,
}

impl Document {
    /// Wraps a root element.
    #[must_use]
    pub fn new(schema: Schema, root: Element) -> Self {
        Self { schema, root }
    }

    /// Follows a path below the root.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.root.find(path)
    }
}
