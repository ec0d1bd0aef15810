//! pagemill - Select, reorder, rotate, annotate and recombine PDF pages.
//!
//! This library keeps an in-memory page model drawn from several source
//! files and rebuilds output artifacts from it. It supports:
//!
//! - Ingesting PDFs, PNG/JPEG images, plain text and HTML
//! - Per-page selection, rotation, compression and annotations
//! - Reordering, removal and interleaving of two sources
//! - Page range expressions and presets
//! - Merged PDFs, page image archives and split archives
//!
//! # Examples
//!
//! ## Merge selected pages
//!
//! ```no_run
//! use pagemill::assemble::Assembler;
//! use pagemill::config::ExportSettings;
//! use pagemill::ingest::InputFile;
//! use pagemill::render::PlaceholderRenderer;
//! use pagemill::Workspace;
//!
//! # fn example(a: Vec<u8>, b: Vec<u8>) -> pagemill::Result<()> {
//! let mut workspace = Workspace::new();
//! workspace.ingest(
//!     vec![
//!         InputFile::new("a.pdf", a, "application/pdf"),
//!         InputFile::new("b.pdf", b, "application/pdf"),
//!     ],
//!     &PlaceholderRenderer,
//! )?;
//!
//! workspace.deselect_all();
//! workspace.select_range("1-3, 5")?;
//!
//! let output = Assembler::new(ExportSettings::default()).merge(&workspace)?;
//! println!("{} bytes", output.bytes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Page ranges
//!
//! ```
//! use pagemill::range::PageRange;
//!
//! let range = PageRange::parse("1-3, 5", 10).unwrap();
//! assert_eq!(range.indices(), &[0, 1, 2, 4]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod config;
pub mod error;
pub mod ingest;
pub mod io;
pub mod model;
pub mod range;
pub mod render;

mod pdf;

// Re-export commonly used types
pub use assemble::{Assembler, AssemblyOutput, AssemblyWarning};
pub use error::{PageMillError, Result};
pub use model::{Page, PageId, Rotation, SourceId, Workspace};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
