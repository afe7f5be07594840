//! Page writers.
//!
//! Each writer turns one page of datastore output into one file. Writes are
//! synchronous; the export awaits nothing while a page is on its way to disk.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error_handling::ExportError;

use super::format::WriterKind;
use super::types::PagePayload;

mod csv;
mod json;
mod raw;
mod xml;

pub use self::csv::CsvTableWriter;
pub use json::EmbeddedJsonWriter;
pub use raw::RawWriter;
pub use xml::XmlWriter;

/// Writes one page to one file.
pub trait PageWriter: Send + Sync {
    /// Name used in log and error messages.
    fn name(&self) -> &'static str;

    /// Writes `payload` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::UnsupportedPayload` if the writer cannot use the
    /// payload, or an I/O or serialization error if the write fails.
    fn write_page(&self, payload: &PagePayload<'_>, path: &Path) -> Result<(), ExportError>;
}

/// Writer for a descriptor's writer kind.
pub fn writer_for(kind: WriterKind) -> Box<dyn PageWriter> {
    match kind {
        WriterKind::Raw => Box::new(RawWriter),
        WriterKind::Xml => Box::new(XmlWriter),
        WriterKind::EmbeddedJson => Box::new(EmbeddedJsonWriter),
        WriterKind::CsvTable => Box::new(CsvTableWriter),
    }
}

/// Creates `path` for buffered writing.
pub(crate) fn create_writer(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    Ok(BufWriter::new(file))
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn unsupported(writer: &dyn PageWriter, payload: &PagePayload<'_>) -> ExportError {
    ExportError::UnsupportedPayload {
        writer: writer.name(),
        payload: payload.kind(),
    }
}
