//! Export of datastore query results to page files.
//!
//! An export walks the result set of one compiled query page by page and writes
//! each page to `page{n}.{ext}` in the output directory. How a format pages and
//! what its files look like is described by its [`FormatDescriptor`].

mod cursor;
mod format;
mod pipeline;
mod types;
pub mod writers;

pub use cursor::CursorState;
pub use format::{FormatDescriptor, PayloadKind, WriterKind};
pub use pipeline::{ExportPipeline, PipelineOptions, PipelineState};
pub use types::{ExportReport, PagePayload};
