//! Per-format capabilities, consulted once when an export starts.

use crate::config::{OutputFormat, EMBEDDED_JSON_FIELD, RAW_XML_FIELD};

/// Which writer turns a page into a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterKind {
    /// Documents as returned, pretty-printed JSON
    Raw,
    /// `<iati-activities>` envelope around each document's original XML
    Xml,
    /// Array of each document's embedded JSON rendering
    EmbeddedJson,
    /// CSV table
    CsvTable,
}

/// Shape of a data response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// JSON envelope with a document array
    Documents,
    /// Body rendered by the index (`wt=csv`), used as is
    Tabular,
}

/// Capabilities of one output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Data responses carry `nextCursorMark`, so pages can be walked directly.
    /// Otherwise the export counts first and pages with separate metadata requests.
    pub paginates_natively: bool,
    /// `fl` restriction for data requests
    pub field_list: Option<&'static str>,
    /// `wt` for data requests; `None` leaves the index default (JSON)
    pub response_writer: Option<&'static str>,
    /// Shape of data response bodies
    pub payload: PayloadKind,
    /// Writer for each page
    pub writer: WriterKind,
    /// Page file extension
    pub extension: &'static str,
}

impl FormatDescriptor {
    /// Descriptor for an output format.
    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Solr => Self {
                paginates_natively: true,
                field_list: None,
                response_writer: None,
                payload: PayloadKind::Documents,
                writer: WriterKind::Raw,
                extension: "json",
            },
            OutputFormat::Xml => Self {
                paginates_natively: true,
                field_list: Some(RAW_XML_FIELD),
                response_writer: None,
                payload: PayloadKind::Documents,
                writer: WriterKind::Xml,
                extension: "xml",
            },
            OutputFormat::Json => Self {
                paginates_natively: true,
                field_list: Some(EMBEDDED_JSON_FIELD),
                response_writer: None,
                payload: PayloadKind::Documents,
                writer: WriterKind::EmbeddedJson,
                extension: "json",
            },
            OutputFormat::Csv => Self {
                paginates_natively: false,
                field_list: None,
                response_writer: Some("csv"),
                payload: PayloadKind::Tabular,
                writer: WriterKind::CsvTable,
                extension: "csv",
            },
            OutputFormat::FlatCsv => Self {
                paginates_natively: false,
                field_list: None,
                response_writer: Some("json"),
                payload: PayloadKind::Documents,
                writer: WriterKind::CsvTable,
                extension: "csv",
            },
        }
    }
}
