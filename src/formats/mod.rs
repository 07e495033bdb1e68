//! Target metadata schemas.
//!
//! Each schema has an assembler that turns a source record into a
//! [`Document`](crate::tree::Document) tree, and a wire format the tree is
//! rendered to.
//!
//! # Supported Schemas
//!
//! | Schema | Module | Wire format |
//! |--------|--------|-------------|
//! | DataCite 4.4 | [`datacite`] | XML, root `resource` |
//! | ISO 19139 | [`iso19139`] | XML, root `gmd:MD_Metadata` |
//! | DCAT-AP (OpenDataSwiss) | [`dcat`] | RDF/XML, root `rdf:RDF` |
//! | GCMD DIF 10.2 | [`dif`] | XML, root `DIF` |
//! | RIS | [`ris`] | tagged lines |
//! | BibTeX | [`bibtex`] | one `@misc` entry |
//!
//! # Usage
//!
//! ```ignore
//! use ckan_crosswalk::formats::{assembler_for, render, Schema};
//!
//! let document = assembler_for(Schema::Ris).assemble(&context);
//! let ris = render(&document)?;
//! # Ok::<(), ckan_crosswalk::CrosswalkError>(())
//! ```

mod traits;

pub mod bibtex;
pub mod datacite;
pub mod dcat;
pub mod dif;
pub mod iso19139;
pub mod ris;

use std::fmt;
use std::str::FromStr;

pub use traits::{AssemblyContext, Assembler};

use crate::error::{CrosswalkError, Result};
use crate::tree::Document;

/// A target metadata schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Schema {
    /// DataCite Metadata Schema 4.4.
    DataCite,
    /// ISO 19139 XML encoding of ISO 19115.
    Iso19139,
    /// DCAT-AP in the OpenDataSwiss dialect.
    DcatAp,
    /// GCMD Directory Interchange Format 10.2.
    Dif,
    /// RIS citation format.
    Ris,
    /// BibTeX citation format.
    Bibtex,
}

/// How a schema's document tree is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// An XML document.
    Xml,
    /// RIS tagged lines.
    RisLines,
    /// A BibTeX entry.
    BibtexEntry,
}

impl Schema {
    /// Every schema, in configuration order.
    pub const ALL: [Self; 6] = [
        Self::DataCite,
        Self::Iso19139,
        Self::DcatAp,
        Self::Dif,
        Self::Ris,
        Self::Bibtex,
    ];

    /// Top-level key of the schema's configuration section.
    #[must_use]
    pub const fn config_key(&self) -> &'static str {
        match self {
            Self::DataCite => "datacite_converter",
            Self::Iso19139 => "iso19139_converter",
            Self::DcatAp => "dcat_ap_converter",
            Self::Dif => "dif_converter",
            Self::Ris => "ris_converter",
            Self::Bibtex => "bibtex_converter",
        }
    }

    /// Returns the MIME type of the rendered document.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::DataCite | Self::Iso19139 | Self::Dif => "application/xml",
            Self::DcatAp => "application/rdf+xml",
            Self::Ris => "application/x-research-info-systems",
            Self::Bibtex => "application/x-bibtex",
        }
    }

    /// Returns the typical file extension of the rendered document.
    #[must_use]
    pub const fn file_extension(&self) -> &'static str {
        match self {
            Self::DataCite | Self::Iso19139 | Self::Dif => "xml",
            Self::DcatAp => "rdf",
            Self::Ris => "ris",
            Self::Bibtex => "bib",
        }
    }

    /// Returns the wire format of the schema.
    #[must_use]
    pub const fn wire_format(&self) -> WireFormat {
        match self {
            Self::DataCite | Self::Iso19139 | Self::DcatAp | Self::Dif => WireFormat::Xml,
            Self::Ris => WireFormat::RisLines,
            Self::Bibtex => WireFormat::BibtexEntry,
        }
    }

    /// Tags that must have a configuration entry.
    #[must_use]
    pub const fn required_tags(&self) -> &'static [&'static str] {
        match self {
            Self::DataCite => &["identifier", "creators", "creator", "title"],
            _ => &["title"],
        }
    }

    /// Tags that, when present, must be nested mappings.
    #[must_use]
    pub const fn nested_tags(&self) -> &'static [&'static str] {
        match self {
            Self::DataCite => &["creator", "contributor", "date", "resource", "fundingReference"],
            Self::Iso19139 => &["person", "date", "extra", "resource"],
            Self::Dif => &["person", "date", "resource"],
            Self::DcatAp => &["person", "resource"],
            Self::Ris | Self::Bibtex => &["person"],
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataCite => write!(f, "DataCite"),
            Self::Iso19139 => write!(f, "ISO 19139"),
            Self::DcatAp => write!(f, "DCAT-AP"),
            Self::Dif => write!(f, "GCMD DIF"),
            Self::Ris => write!(f, "RIS"),
            Self::Bibtex => write!(f, "BibTeX"),
        }
    }
}

impl FromStr for Schema {
    type Err = CrosswalkError;

    fn from_str(name: &str) -> Result<Self> {
        match crate::vocabulary::lookup_key(name).replace('-', "").as_str() {
            "datacite" => Ok(Self::DataCite),
            "iso" | "iso19139" => Ok(Self::Iso19139),
            "dcat" | "dcatap" | "opendataswiss" => Ok(Self::DcatAp),
            "dif" | "gcmddif" => Ok(Self::Dif),
            "ris" => Ok(Self::Ris),
            "bibtex" => Ok(Self::Bibtex),
            _ => Err(CrosswalkError::Config(format!("unknown schema '{name}'"))),
        }
    }
}

/// Returns the assembler of a schema.
#[must_use]
pub fn assembler_for(schema: Schema) -> &'static dyn Assembler {
    match schema {
        Schema::DataCite => &datacite::DataCiteAssembler,
        Schema::Iso19139 => &iso19139::Iso19139Assembler,
        Schema::DcatAp => &dcat::DcatAssembler,
        Schema::Dif => &dif::DifAssembler,
        Schema::Ris => &ris::RisAssembler,
        Schema::Bibtex => &bibtex::BibtexAssembler,
    }
}

/// Renders a document in its schema's wire format.
///
/// # Errors
///
/// Returns an error if the XML writer fails.
pub fn render(document: &Document) -> Result<String> {
    match document.schema.wire_format() {
        WireFormat::Xml => crate::xml::to_xml_string(&document.root),
        WireFormat::RisLines => Ok(ris::render(&document.root)),
        WireFormat::BibtexEntry => Ok(bibtex::render(&document.root)),
    }
}
