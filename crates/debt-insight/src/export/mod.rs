//! Paginated document export for composed reports.

mod backend;
mod layout;
pub mod wrap;

pub use backend::{ExportEncoding, Latin1Backend, LineBackend, LineError, Utf8Backend};
pub use layout::{
    ExportError, ExportedReport, LineFailure, Page, ReportExporter, ReportLayout, DOCUMENT_TITLE,
};
pub use wrap::{wrap, MonospaceMeasure, TextMeasure, WrappedLines, HARD_SPLIT_CHARS};
