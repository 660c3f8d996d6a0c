//! whattodo - TODO comment discovery and history reconstruction
//!
//! Finds TODO comments in a source tree and, for a single file, rebuilds
//! when each TODO was added and removed by walking the file's git history
//! across renames.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod models;
pub mod reporters;
pub mod todo;

pub use error::{HistoryError, HistoryResult};
pub use history::{HistoryOptions, TodoHistory};
pub use todo::TodoExtractor;
