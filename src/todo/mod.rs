//! TODO comment matching and current-tree scanning

pub mod extractor;
pub mod scanner;

pub use extractor::{TodoExtractor, DEFAULT_SCAN_PATTERN, DEFAULT_TODO_PATTERN};
pub use scanner::{scan, ScanOptions, DEFAULT_EXTENSIONS};
