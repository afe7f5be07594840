//! CSV tables.
//!
//! Documents are flattened locally: the columns are the fields of the page's
//! first document that has any and multi-valued fields are joined into one
//! cell. A page where no document has fields gives an empty file. Tabular
//! bodies rendered by the index already are CSV and are written unchanged.

use std::path::Path;

use csv::Writer;
use log::debug;
use serde_json::Value;

use crate::config::CSV_MULTIVALUE_SEPARATOR;
use crate::error_handling::ExportError;
use crate::export::types::PagePayload;

use super::{create_writer, io_error, PageWriter};

/// Writes one CSV file per page.
pub struct CsvTableWriter;

impl CsvTableWriter {
    /// Column names: the keys of the first document with fields, in response order.
    pub fn columns(docs: &[Value]) -> Vec<String> {
        docs.iter()
            .filter_map(Value::as_object)
            .find(|doc| !doc.is_empty())
            .map(|doc| doc.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Text of one cell.
    ///
    /// Arrays are joined with `CSV_MULTIVALUE_SEPARATOR`, strings are used
    /// verbatim, nested objects become compact JSON and missing or null values
    /// leave the cell empty.
    pub fn cell(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| Self::cell(Some(item)))
                .collect::<Vec<_>>()
                .join(CSV_MULTIVALUE_SEPARATOR),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    fn write_documents(docs: &[Value], path: &Path) -> Result<(), ExportError> {
        let columns = Self::columns(docs);
        if columns.is_empty() {
            debug!("No document has fields, writing empty {}", path.display());
            return std::fs::write(path, "").map_err(|e| io_error(path, e));
        }

        let mut writer = Writer::from_writer(create_writer(path)?);

        writer.write_record(&columns)?;
        for doc in docs {
            let row = columns.iter().map(|column| Self::cell(doc.get(column)));
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| io_error(path, e))
    }
}

impl PageWriter for CsvTableWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write_page(&self, payload: &PagePayload<'_>, path: &Path) -> Result<(), ExportError> {
        match payload {
            PagePayload::Documents(docs) => Self::write_documents(docs, path),
            PagePayload::Tabular(body) => std::fs::write(path, body).map_err(|e| io_error(path, e)),
        }
    }
}
