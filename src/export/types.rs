//! Export types.

use std::path::PathBuf;

use serde_json::Value;

/// One page of data handed to a writer.
#[derive(Debug, Clone, Copy)]
pub enum PagePayload<'a> {
    /// Documents from a JSON response
    Documents(&'a [Value]),
    /// Body of a response the index rendered itself
    Tabular(&'a str),
}

impl PagePayload<'_> {
    /// Short name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PagePayload::Documents(_) => "documents",
            PagePayload::Tabular(_) => "tabular",
        }
    }
}

/// Outcome of a completed export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Page files written, in page order
    pub files: Vec<PathBuf>,
    /// Total matching documents, when the export counted them first
    pub documents_found: Option<u64>,
    /// Documents written from JSON responses
    pub documents_written: u64,
    /// Requests sent to the datastore
    pub requests: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

impl ExportReport {
    /// Number of page files written.
    pub fn pages_written(&self) -> usize {
        self.files.len()
    }
}
