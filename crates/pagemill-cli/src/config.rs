//! Validated run configuration.
//!
//! [`Cli`](crate::cli::Cli) is turned into a [`Config`] before any file is
//! touched. Everything that can be checked without reading inputs is checked
//! here:
//! - Argument combinations (mixing needs two inputs)
//! - Rotation, quality and chunk size domains
//! - Output page size settings

use std::path::PathBuf;

use pagemill::config::{CompressionSettings, ExportSettings, OverwriteMode, SplitMode};
use pagemill::model::{MixOptions, Rotation};
use pagemill::range::RangePreset;
use pagemill::{PageMillError, Result};

/// What a run produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// One PDF of every selected page.
    Merge,
    /// A ZIP of page thumbnails.
    Images,
    /// A ZIP of smaller PDFs.
    Split {
        /// How pages are grouped into documents.
        mode: SplitMode,
        /// Entry name prefix.
        prefix: String,
    },
    /// List sources and pages without writing anything.
    Info {
        /// Emit JSON instead of text.
        json: bool,
    },
}

/// Page selection requested on the command line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    /// Range expression, e.g. `1-3, 5`.
    pub range: Option<String>,
    /// Canned range.
    pub preset: Option<RangePreset>,
}

impl Selection {
    /// Whether anything narrows the default "all pages" selection.
    pub fn is_restricted(&self) -> bool {
        self.range.is_some() || self.preset.is_some()
    }
}

/// Configuration for one `pagemill` run.
#[derive(Debug, Clone)]
pub struct Config {
    /// What to produce.
    pub task: Task,
    /// Input files, after glob expansion.
    pub inputs: Vec<PathBuf>,
    /// Artifact destination. `None` only for [`Task::Info`].
    pub output: Option<PathBuf>,
    /// Behavior when `output` already exists.
    pub overwrite_mode: OverwriteMode,
    /// Stop before assembling.
    pub dry_run: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Show statistics and per-file details.
    pub verbose: bool,
    /// Which pages take part.
    pub selection: Selection,
    /// Rotation in degrees applied to every selected page.
    pub rotation: Option<i32>,
    /// Interleave the first two sources.
    pub mix: Option<MixOptions>,
    /// Compression intent.
    pub compression: Option<CompressionSettings>,
    /// Page size and password.
    pub export: ExportSettings,
}

impl Config {
    /// Check the configuration for problems that need no file access.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::InvalidConfig`] or the domain error of the
    /// offending value.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PageMillError::invalid_config("No input files specified"));
        }

        match (&self.task, &self.output) {
            (Task::Info { .. }, _) => {}
            (_, None) => {
                return Err(PageMillError::invalid_config("An output path is required"));
            }
            (_, Some(output)) if self.inputs.contains(output) => {
                return Err(PageMillError::invalid_config(format!(
                    "Output file cannot also be an input: {}",
                    output.display()
                )));
            }
            _ => {}
        }

        if let Task::Split { mode, prefix } = &self.task {
            mode.chunk_size()?;
            if prefix.trim().is_empty() || prefix.contains(['/', '\\']) {
                return Err(PageMillError::invalid_config(format!(
                    "Invalid split prefix: {prefix:?}"
                )));
            }
        }

        if let Some(degrees) = self.rotation {
            Rotation::from_degrees(degrees)?;
        }

        if let Some(range) = &self.selection.range
            && range.trim().is_empty()
        {
            return Err(PageMillError::invalid_range(range.clone(), "empty page range"));
        }

        if self.mix.is_some() && self.inputs.len() < 2 {
            return Err(PageMillError::invalid_mix(
                "mixing needs at least two input files",
            ));
        }

        if let Some(compression) = &self.compression {
            compression.validate()?;
        }

        self.export.page_size.validate()
    }

    /// Whether a run writes an artifact.
    pub fn writes_output(&self) -> bool {
        !self.dry_run && !matches!(self.task, Task::Info { .. })
    }
}
