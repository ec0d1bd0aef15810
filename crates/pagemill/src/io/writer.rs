//! Writing assembled artifacts to disk.
//!
//! Writes are atomic by default: bytes go to a temporary file next to the
//! destination, which is then renamed over it. The blocking file work runs
//! on `tokio`'s blocking pool.
//!
//! # Examples
//!
//! ```no_run
//! use pagemill::io::ArtifactWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = ArtifactWriter::new();
//! let stats = writer.save_with_stats(bytes, Path::new("merged.pdf")).await?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::OverwriteMode;
use crate::error::{PageMillError, Result};

use super::format_file_size;

/// Options for writing artifacts.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// What writing to a path would do, given an overwrite mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCheck {
    /// Nothing exists at the path.
    Fresh,
    /// An existing file will be replaced.
    Overwrite,
    /// A file exists and the user must confirm first.
    NeedsConfirmation,
}

/// Artifact writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct ArtifactWriter {
    options: WriteOptions,
}

impl ArtifactWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Save bytes to a file.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::FailedToWrite`] if the file cannot be
    /// created, written or moved into place.
    pub async fn save(&self, bytes: Vec<u8>, path: &Path) -> Result<()> {
        self.save_with_stats(bytes, path).await?;
        Ok(())
    }

    /// Save bytes and return statistics about the operation.
    ///
    /// # Errors
    ///
    /// As [`save`](Self::save).
    pub async fn save_with_stats(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            let write_path = if options.atomic {
                path_buf.with_extension("tmp")
            } else {
                path_buf.clone()
            };

            let failed = |path: &Path| {
                let path = path.to_path_buf();
                move |source: std::io::Error| PageMillError::FailedToWrite { path, source }
            };

            let file = std::fs::File::create(&write_path).map_err(failed(&write_path))?;
            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
            writer.write_all(&bytes).map_err(failed(&write_path))?;
            writer.flush().map_err(failed(&write_path))?;
            drop(writer);

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(failed(&path_buf))?;
            }

            Ok::<_, PageMillError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PageMillError::Io {
            source: std::io::Error::other(format!("Write task failed: {e}")),
        })??;

        log::debug!(
            "Wrote {} to {}",
            stats.format_file_size(),
            stats.output_path.display()
        );
        Ok(stats)
    }

    /// Check whether `path` can be written under `mode`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the parent directory is missing,
    /// and [`PageMillError::OutputExists`] for an existing file under
    /// [`OverwriteMode::NoClobber`].
    pub async fn check_output(&self, path: &Path, mode: OverwriteMode) -> Result<OutputCheck> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && !tokio::fs::try_exists(parent).await.unwrap_or(false)
        {
            return Err(PageMillError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            )));
        }

        if !self.exists(path).await {
            return Ok(OutputCheck::Fresh);
        }
        match mode {
            OverwriteMode::Force => Ok(OutputCheck::Overwrite),
            OverwriteMode::Prompt => Ok(OutputCheck::NeedsConfirmation),
            OverwriteMode::NoClobber => Err(PageMillError::output_exists(path.to_path_buf())),
        }
    }

    /// Whether a file exists at `path`.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}
