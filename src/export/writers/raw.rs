//! Index documents, unchanged.

use std::io::Write;
use std::path::Path;

use crate::error_handling::ExportError;
use crate::export::types::PagePayload;

use super::{create_writer, io_error, unsupported, PageWriter};

/// Writes the page's documents as a pretty-printed JSON array.
pub struct RawWriter;

impl PageWriter for RawWriter {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn write_page(&self, payload: &PagePayload<'_>, path: &Path) -> Result<(), ExportError> {
        let PagePayload::Documents(docs) = payload else {
            return Err(unsupported(self, payload));
        };

        let mut writer = create_writer(path)?;
        serde_json::to_writer_pretty(&mut writer, docs)?;
        writer.flush().map_err(|e| io_error(path, e))
    }
}
