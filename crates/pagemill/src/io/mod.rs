//! File system access for inputs and artifacts.
//!
//! The library core works on bytes; this layer reads input files from disk
//! and writes finished artifacts back, using `tokio` so the CLI stays on one
//! async runtime.

pub mod reader;
pub mod writer;

pub use reader::{InputReader, LoadStatistics, LoadedInput};
pub use writer::{ArtifactWriter, OutputCheck, WriteOptions, WriteStatistics};

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
