//! RDF graph export of DCAT-AP documents.
//!
//! The DCAT-AP assembler builds an RDF/XML element tree in striped syntax:
//! node elements (`dcat:Dataset`, `vcard:Individual`, ...) alternate with
//! property elements (`dct:title`, `dcat:distribution`, ...). This module
//! reads that tree back as triples so the catalog can be published as
//! Turtle, N-Triples or JSON-LD as well as RDF/XML, using the oxrdfio
//! serializers.
//!
//! # Examples
//!
//! ```ignore
//! use ckan_crosswalk::rdf::{graph_from_document, RdfFormat};
//!
//! let document = crosswalk.assemble(&record, Schema::DcatAp);
//! let turtle = graph_from_document(&document)?.serialize(RdfFormat::Turtle)?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};

use oxrdf::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Quad, Term, Triple};
use oxrdfio::{JsonLdProfileSet, RdfFormat as OxRdfFormat, RdfParser, RdfSerializer};

use crate::error::{CrosswalkError, Result};
use crate::tree::{Document, Element};

/// RDF syntax namespace.
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// Datatype oxrdf gives plain literals.
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Output syntax of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RdfFormat {
    /// RDF/XML (`application/rdf+xml`).
    #[default]
    RdfXml,
    /// JSON-LD (`application/ld+json`).
    JsonLd,
    /// Turtle (`text/turtle`).
    Turtle,
    /// N-Triples (`application/n-triples`).
    NTriples,
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RdfXml => write!(f, "RDF/XML"),
            Self::JsonLd => write!(f, "JSON-LD"),
            Self::Turtle => write!(f, "Turtle"),
            Self::NTriples => write!(f, "N-Triples"),
        }
    }
}

impl RdfFormat {
    /// Returns the MIME type for this RDF format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::RdfXml => "application/rdf+xml",
            Self::JsonLd => "application/ld+json",
            Self::Turtle => "text/turtle",
            Self::NTriples => "application/n-triples",
        }
    }

    /// Returns the typical file extension for this RDF format.
    #[must_use]
    pub const fn file_extension(&self) -> &'static str {
        match self {
            Self::RdfXml => "rdf",
            Self::JsonLd => "jsonld",
            Self::Turtle => "ttl",
            Self::NTriples => "nt",
        }
    }
}

/// Subject or object of a triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfNode {
    /// A named node.
    Uri(String),
    /// A blank node with a local identifier.
    BlankNode(String),
    /// A literal with optional language tag or datatype.
    Literal {
        /// Lexical value.
        value: String,
        /// Language tag, e.g. `en`.
        language: Option<String>,
        /// Datatype IRI.
        datatype: Option<String>,
    },
}

impl RdfNode {
    /// Creates a named node.
    #[must_use]
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    /// Creates a plain literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Returns true if this is a literal.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }
}

/// One statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfTriple {
    /// Subject node.
    pub subject: RdfNode,
    /// Predicate IRI.
    pub predicate: String,
    /// Object node.
    pub object: RdfNode,
}

/// An ordered set of triples.
#[derive(Debug, Clone, Default)]
pub struct RdfGraph {
    triples: Vec<RdfTriple>,
    blank_node_counter: usize,
}

impl RdfGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple.
    pub fn add(&mut self, subject: RdfNode, predicate: impl Into<String>, object: RdfNode) {
        self.triples.push(RdfTriple {
            subject,
            predicate: predicate.into(),
            object,
        });
    }

    /// Returns a fresh blank node.
    pub fn new_blank_node(&mut self) -> RdfNode {
        self.blank_node_counter += 1;
        RdfNode::BlankNode(format!("b{}", self.blank_node_counter))
    }

    /// Number of triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the graph has no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterates over the triples in insertion order.
    pub fn triples(&self) -> impl Iterator<Item = &RdfTriple> {
        self.triples.iter()
    }

    /// Serializes the graph to a string.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Rdf`] if a node is not valid RDF.
    pub fn serialize(&self, format: RdfFormat) -> Result<String> {
        let mut output = Vec::new();
        self.serialize_to_writer(&mut output, format)?;
        String::from_utf8(output).map_err(|err| CrosswalkError::Rdf(err.to_string()))
    }

    /// Serializes the graph to a writer.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Rdf`] if a node is not valid RDF or the
    /// writer fails.
    pub fn serialize_to_writer<W: Write>(&self, writer: W, format: RdfFormat) -> Result<()> {
        let mut serializer = RdfSerializer::from_format(to_oxrdf_format(format)).for_writer(writer);
        for triple in &self.triples {
            serializer
                .serialize_triple(&to_oxrdf_triple(triple)?)
                .map_err(|err| CrosswalkError::Rdf(err.to_string()))?;
        }
        serializer
            .finish()
            .map_err(|err| CrosswalkError::Rdf(err.to_string()))?;
        Ok(())
    }

    /// Parses a graph from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Rdf`] if the input is not valid.
    pub fn parse_from_reader<R: Read>(reader: R, format: RdfFormat) -> Result<Self> {
        let mut graph = Self::new();
        for quad in RdfParser::from_format(to_oxrdf_format(format)).for_reader(reader) {
            let quad = quad.map_err(|err| CrosswalkError::Rdf(err.to_string()))?;
            graph.triples.push(from_oxrdf_quad(&quad)?);
        }
        Ok(graph)
    }

    /// Parses a graph from a string.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Rdf`] if the input is not valid.
    pub fn parse(input: &str, format: RdfFormat) -> Result<Self> {
        Self::parse_from_reader(input.as_bytes(), format)
    }
}

/// Reads the triples of an RDF/XML element tree.
///
/// # Errors
///
/// Returns [`CrosswalkError::Rdf`] if an element uses an undeclared prefix.
pub fn graph_from_document(document: &Document) -> Result<RdfGraph> {
    let prefixes: HashMap<&str, &str> = document
        .root
        .attributes
        .iter()
        .filter_map(|(name, uri)| name.strip_prefix("xmlns:").map(|prefix| (prefix, uri.as_str())))
        .collect();
    let mut reader = TreeReader {
        prefixes,
        graph: RdfGraph::new(),
    };
    for node in &document.root.children {
        reader.node(node)?;
    }
    Ok(reader.graph)
}

struct TreeReader<'a> {
    prefixes: HashMap<&'a str, &'a str>,
    graph: RdfGraph,
}

impl TreeReader<'_> {
    fn expand(&self, qname: &str) -> Result<String> {
        let (prefix, local) = qname
            .split_once(':')
            .ok_or_else(|| CrosswalkError::Rdf(format!("unqualified name '{qname}'")))?;
        self.prefixes
            .get(prefix)
            .map(|namespace| format!("{namespace}{local}"))
            .ok_or_else(|| CrosswalkError::Rdf(format!("undeclared prefix '{prefix}'")))
    }

    /// Reads a node element and returns its subject.
    fn node(&mut self, element: &Element) -> Result<RdfNode> {
        let subject = match element.attr("rdf:about") {
            Some(about) => RdfNode::uri(about),
            None => self.graph.new_blank_node(),
        };
        let class = self.expand(&element.name)?;
        self.graph.add(subject.clone(), format!("{RDF}type"), RdfNode::uri(class));
        for property in &element.children {
            let predicate = self.expand(&property.name)?;
            let object = self.object(property)?;
            self.graph.add(subject.clone(), predicate, object);
        }
        Ok(subject)
    }

    fn object(&mut self, property: &Element) -> Result<RdfNode> {
        if let Some(resource) = property.attr("rdf:resource") {
            return Ok(RdfNode::uri(resource));
        }
        if let Some(node) = property.children.first() {
            return self.node(node);
        }
        Ok(RdfNode::Literal {
            value: property.text_or_empty().to_string(),
            language: property.attr("xml:lang").map(str::to_string),
            datatype: property.attr("rdf:datatype").map(str::to_string),
        })
    }
}

fn to_oxrdf_format(format: RdfFormat) -> OxRdfFormat {
    match format {
        RdfFormat::RdfXml => OxRdfFormat::RdfXml,
        RdfFormat::JsonLd => OxRdfFormat::JsonLd {
            profile: JsonLdProfileSet::default(),
        },
        RdfFormat::Turtle => OxRdfFormat::Turtle,
        RdfFormat::NTriples => OxRdfFormat::NTriples,
    }
}

fn named(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|err| CrosswalkError::Rdf(format!("invalid IRI '{iri}': {err}")))
}

fn to_oxrdf_triple(triple: &RdfTriple) -> Result<Triple> {
    let subject = match &triple.subject {
        RdfNode::Uri(uri) => NamedOrBlankNode::NamedNode(named(uri)?),
        RdfNode::BlankNode(id) => NamedOrBlankNode::BlankNode(
            BlankNode::new(id).map_err(|err| CrosswalkError::Rdf(format!("invalid blank node: {err}")))?,
        ),
        RdfNode::Literal { .. } => {
            return Err(CrosswalkError::Rdf("literals cannot be subjects".into()));
        },
    };
    let object = match &triple.object {
        RdfNode::Uri(uri) => Term::NamedNode(named(uri)?),
        RdfNode::BlankNode(id) => Term::BlankNode(
            BlankNode::new(id).map_err(|err| CrosswalkError::Rdf(format!("invalid blank node: {err}")))?,
        ),
        RdfNode::Literal {
            value,
            language,
            datatype,
        } => Term::Literal(match (language, datatype) {
            (Some(language), _) => Literal::new_language_tagged_literal(value, language)
                .map_err(|err| CrosswalkError::Rdf(format!("invalid language tag: {err}")))?,
            (None, Some(datatype)) => Literal::new_typed_literal(value, named(datatype)?),
            (None, None) => Literal::new_simple_literal(value),
        }),
    };
    Ok(Triple::new(subject, named(&triple.predicate)?, object))
}

fn from_oxrdf_quad(quad: &Quad) -> Result<RdfTriple> {
    let subject = match &quad.subject {
        NamedOrBlankNode::NamedNode(node) => RdfNode::Uri(node.as_str().to_string()),
        NamedOrBlankNode::BlankNode(node) => RdfNode::BlankNode(node.as_str().to_string()),
        #[allow(unreachable_patterns)]
        _ => return Err(CrosswalkError::Rdf("unsupported subject".into())),
    };
    let object = match &quad.object {
        Term::NamedNode(node) => RdfNode::Uri(node.as_str().to_string()),
        Term::BlankNode(node) => RdfNode::BlankNode(node.as_str().to_string()),
        Term::Literal(literal) => {
            let language = literal.language().map(String::from);
            let datatype = (language.is_none() && literal.datatype().as_str() != XSD_STRING)
                .then(|| literal.datatype().as_str().to_string());
            RdfNode::Literal {
                value: literal.value().to_string(),
                language,
                datatype,
            }
        },
        #[allow(unreachable_patterns)]
        _ => return Err(CrosswalkError::Rdf("unsupported object".into())),
    };
    Ok(RdfTriple {
        subject,
        predicate: quad.predicate.as_str().to_string(),
        object,
    })
}
