//! Reading input files from disk.
//!
//! Files are read one after another, in the order given, so the resulting
//! batch keeps that order when it is ingested. The media type is guessed
//! from the file extension; ingestion decides what to do with it.
//!
//! # Examples
//!
//! ```no_run
//! use pagemill::io::InputReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = InputReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("scan.png")];
//! let (results, stats) = reader.load_all(&paths).await;
//! println!("Read {} files ({})", stats.success_count, stats.format_total_size());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PageMillError, Result};
use crate::ingest::InputFile;

use super::format_file_size;

/// An input file read from disk.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    /// The file, ready for ingestion.
    pub file: InputFile,

    /// Path to the source file.
    pub path: PathBuf,

    /// Time taken to read the file.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedInput>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadStatistics {
    /// Number of files successfully read.
    pub success_count: usize,

    /// Number of files that could not be read.
    pub failure_count: usize,

    /// Total time taken for all reads.
    pub total_time: Duration,

    /// Total size of successfully read files.
    pub total_size: u64,
}

impl LoadStatistics {
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            total_time,
            ..Self::default()
        };
        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size;
                }
                Err(_) => stats.failure_count += 1,
            }
        }
        stats
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Reads input files into [`InputFile`] values.
#[derive(Debug, Clone, Default)]
pub struct InputReader {
    /// Reject empty files instead of passing them on.
    reject_empty: bool,
}

impl InputReader {
    /// Create a reader that rejects empty files.
    pub fn new() -> Self {
        Self { reject_empty: true }
    }

    /// Create a reader that passes empty files through to ingestion.
    pub fn allowing_empty() -> Self {
        Self { reject_empty: false }
    }

    /// Read one file.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::FileNotFound`] for a missing file,
    /// [`PageMillError::IngestFailed`] for an empty one (unless allowed),
    /// and an I/O error for anything else.
    pub async fn load(&self, path: &Path) -> Result<LoadedInput> {
        let start = Instant::now();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PageMillError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PageMillError::Io { source: e }
            }
        })?;

        if self.reject_empty && bytes.is_empty() {
            return Err(PageMillError::ingest_failed(format!(
                "{} is empty",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file_size = bytes.len() as u64;
        let file = InputFile::guessed(name, bytes);
        log::debug!("Read {} as {} ({})", path.display(), file.mime, format_file_size(file_size));

        Ok(LoadedInput {
            file,
            path: path.to_path_buf(),
            load_time: start.elapsed(),
            file_size,
        })
    }

    /// Read files one at a time, in order.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            results.push(self.load(path).await);
        }
        results
    }

    /// Read every file and report aggregate statistics.
    pub async fn load_all(&self, paths: &[PathBuf]) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();
        let results = self.load_sequential(paths).await;
        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }
}
