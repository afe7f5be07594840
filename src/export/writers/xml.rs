//! `<iati-activities>` documents rebuilt from each activity's stored XML.

use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use log::debug;
use serde_json::Value;

use crate::config::{IATI_XML_VERSION, RAW_XML_FIELD};
use crate::error_handling::ExportError;
use crate::export::types::PagePayload;

use super::{create_writer, io_error, unsupported, PageWriter};

/// Wraps each document's `iati_xml` in an `<iati-activities>` root.
///
/// Documents without XML are skipped.
pub struct XmlWriter;

impl PageWriter for XmlWriter {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn write_page(&self, payload: &PagePayload<'_>, path: &Path) -> Result<(), ExportError> {
        let PagePayload::Documents(docs) = payload else {
            return Err(unsupported(self, payload));
        };

        let mut writer = create_writer(path)?;
        let generated = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut write = || -> std::io::Result<()> {
            writeln!(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
            writeln!(
                writer,
                "<iati-activities version=\"{}\" generated-datetime=\"{}\">",
                IATI_XML_VERSION, generated
            )?;
            for doc in docs.iter() {
                match doc.get(RAW_XML_FIELD).and_then(Value::as_str) {
                    Some(xml) if !xml.is_empty() => writeln!(writer, "{}", xml)?,
                    _ => debug!(
                        "Skipping document {} without {}",
                        doc.get("id").unwrap_or(&Value::Null),
                        RAW_XML_FIELD
                    ),
                }
            }
            writeln!(writer, "</iati-activities>")?;
            writer.flush()
        };

        write().map_err(|e| io_error(path, e))
    }
}
