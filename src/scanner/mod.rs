pub mod file_filter;
pub mod source_scanner;

pub use file_filter::SourceFilter;
pub use source_scanner::{ScanStatistics, SourceFile, SourceScanner};
