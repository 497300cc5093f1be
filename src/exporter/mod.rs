pub mod file_exporter;
pub mod layout;
pub mod report;

pub use file_exporter::{ExportFailure, ExportProgress, FileExporter};
pub use layout::{LayoutMode, FLAT_SEPARATOR};
pub use report::{ConfigSnapshot, ExportReport, OutputManager};
