//! Activities rebuilt from their embedded JSON rendering.

use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::config::EMBEDDED_JSON_FIELD;
use crate::error_handling::ExportError;
use crate::export::types::PagePayload;

use super::{create_writer, io_error, unsupported, PageWriter};

/// Writes the array of each document's parsed `iati_json`.
///
/// Documents without the field are skipped. A field that is already structured
/// (not a string) is used as is.
pub struct EmbeddedJsonWriter;

impl EmbeddedJsonWriter {
    fn activities(docs: &[Value]) -> Result<Vec<Value>, ExportError> {
        let mut activities = Vec::with_capacity(docs.len());
        for doc in docs {
            match doc.get(EMBEDDED_JSON_FIELD) {
                None | Some(Value::Null) => continue,
                Some(Value::String(text)) => {
                    let parsed = serde_json::from_str(text).map_err(|source| {
                        ExportError::EmbeddedJson {
                            id: doc
                                .get("id")
                                .and_then(Value::as_str)
                                .unwrap_or("?")
                                .to_string(),
                            source,
                        }
                    })?;
                    activities.push(parsed);
                }
                Some(structured) => activities.push(structured.clone()),
            }
        }
        Ok(activities)
    }
}

impl PageWriter for EmbeddedJsonWriter {
    fn name(&self) -> &'static str {
        "embedded json"
    }

    fn write_page(&self, payload: &PagePayload<'_>, path: &Path) -> Result<(), ExportError> {
        let PagePayload::Documents(docs) = payload else {
            return Err(unsupported(self, payload));
        };

        let activities = Self::activities(docs)?;
        let mut writer = create_writer(path)?;
        serde_json::to_writer_pretty(&mut writer, &activities)?;
        writer.flush().map_err(|e| io_error(path, e))
    }
}
