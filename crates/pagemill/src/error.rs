//! Error types for pagemill.
//!
//! Every fallible operation in the crate returns [`PageMillError`]. Errors are
//! local: none of them leave a [`Workspace`](crate::Workspace) in an unusable
//! state, and the caller can retry the operation after fixing its input.
//!
//! # Error Categories
//!
//! - **Ingestion**: malformed PDF bytes or undecodable images in a batch
//! - **Selection**: nothing selected, bad range expressions, bad picks
//! - **Engine**: failures inside the PDF, raster or archive collaborators
//! - **I/O**: reading inputs and writing artifacts

use std::io;
use std::path::PathBuf;

use crate::model::{PageId, SourceId};

/// Result type alias for pagemill operations.
pub type Result<T> = std::result::Result<T, PageMillError>;

/// Coarse classification of an error, used by callers that only need to
/// know which kind of message to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A batch of inputs could not be ingested.
    Ingestion,
    /// The requested operation has no qualifying pages or picks.
    Selection,
    /// The PDF, raster or archive engine failed during assembly.
    Engine,
    /// Reading or writing files failed.
    Io,
    /// Invalid settings or arguments.
    Config,
}

/// Main error type for pagemill operations.
#[derive(Debug, thiserror::Error)]
pub enum PageMillError {
    /// A batch of input files could not be ingested.
    ///
    /// The message deliberately does not name the offending file: the whole
    /// batch is rejected as one unit.
    #[error("Failed to process input files: {reason}")]
    IngestFailed {
        /// Underlying engine message.
        reason: String,
    },

    /// An export, split or merge was requested with no selected pages.
    #[error("Please select at least one page")]
    EmptySelection,

    /// A page range expression was rejected.
    #[error("Invalid page range '{token}': {reason}")]
    InvalidPageRange {
        /// The offending token, as typed.
        token: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No source document with this id is loaded.
    #[error("Source document not found: {id}")]
    SourceNotFound {
        /// The missing source id.
        id: SourceId,
    },

    /// No page with this id is in the page sequence.
    #[error("Page not found: {id}")]
    PageNotFound {
        /// The missing page id.
        id: PageId,
    },

    /// A rotation outside the quarter-turn domain.
    #[error("Invalid rotation: {degrees}. Must be a multiple of 90")]
    InvalidRotation {
        /// Requested degrees.
        degrees: i32,
    },

    /// A compression quality outside (0, 1].
    #[error("Invalid compression quality: {quality}. Must be greater than 0 and at most 1")]
    InvalidQuality {
        /// Requested quality.
        quality: f32,
    },

    /// A reorder request did not contain exactly the current pages.
    #[error("Invalid page order: {reason}")]
    InvalidReorder {
        /// What is wrong with the proposed order.
        reason: String,
    },

    /// Mix was invoked without two distinct loaded documents.
    #[error("Cannot mix documents: {reason}")]
    InvalidMix {
        /// What is wrong with the picks.
        reason: String,
    },

    /// Split was requested with a chunk size of zero.
    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,

    /// The rasterizer could not render a page.
    #[error("Failed to render page {page_number}: {reason}")]
    RenderFailed {
        /// 1-indexed page number within the source.
        page_number: u32,
        /// Underlying renderer message.
        reason: String,
    },

    /// A selected page has no thumbnail to export.
    #[error("Page {id} has no rendered thumbnail")]
    MissingThumbnail {
        /// The page without a raster.
        id: PageId,
    },

    /// Assembling the output document failed.
    #[error("Failed to assemble output: {reason}")]
    AssemblyFailed {
        /// Underlying engine message.
        reason: String,
    },

    /// Building a ZIP archive failed.
    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to write an artifact.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl PageMillError {
    /// Create an IngestFailed error.
    pub fn ingest_failed(reason: impl Into<String>) -> Self {
        Self::IngestFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidPageRange error.
    pub fn invalid_range(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPageRange {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidMix error.
    pub fn invalid_mix(reason: impl Into<String>) -> Self {
        Self::InvalidMix {
            reason: reason.into(),
        }
    }

    /// Create an InvalidReorder error.
    pub fn invalid_reorder(reason: impl Into<String>) -> Self {
        Self::InvalidReorder {
            reason: reason.into(),
        }
    }

    /// Create an AssemblyFailed error.
    pub fn assembly_failed(reason: impl Into<String>) -> Self {
        Self::AssemblyFailed {
            reason: reason.into(),
        }
    }

    /// Create a RenderFailed error.
    pub fn render_failed(page_number: u32, reason: impl Into<String>) -> Self {
        Self::RenderFailed {
            page_number,
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IngestFailed { .. } | Self::RenderFailed { .. } => ErrorCategory::Ingestion,
            Self::EmptySelection
            | Self::InvalidPageRange { .. }
            | Self::SourceNotFound { .. }
            | Self::PageNotFound { .. }
            | Self::InvalidReorder { .. }
            | Self::InvalidMix { .. } => ErrorCategory::Selection,
            Self::MissingThumbnail { .. } | Self::AssemblyFailed { .. } | Self::Archive(_) => {
                ErrorCategory::Engine
            }
            Self::FileNotFound { .. }
            | Self::OutputExists { .. }
            | Self::FailedToWrite { .. }
            | Self::Cancelled
            | Self::Io { .. } => ErrorCategory::Io,
            Self::InvalidRotation { .. }
            | Self::InvalidQuality { .. }
            | Self::InvalidChunkSize
            | Self::InvalidConfig { .. } => ErrorCategory::Config,
        }
    }

    /// Check if the user can fix this by changing their picks and retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Selection | ErrorCategory::Config
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 130,
            Self::OutputExists { .. } => 4,
            Self::FailedToWrite { .. } | Self::Io { .. } => 5,
            Self::FileNotFound { .. } => 2,
            _ => match self.category() {
                ErrorCategory::Ingestion => 3,
                ErrorCategory::Engine => 6,
                _ => 1,
            },
        }
    }
}
