//! Assembly of the page sequence into output artifacts.
//!
//! The [`Assembler`] turns the selected pages of a [`Workspace`] into one of:
//! - a single merged PDF,
//! - a ZIP of page thumbnails (`page-{n}.jpg`),
//! - a ZIP of split PDFs (`{prefix}-{n}.pdf`), one page or one chunk each.
//!
//! Every output page is copied from its source, then rotated absolutely,
//! resized if a page size preset is set, annotated and finally recompressed.
//! Anything the engine cannot honour is reported as an [`AssemblyWarning`]
//! instead of failing the assembly.
//!
//! # Examples
//!
//! ```no_run
//! use pagemill::assemble::Assembler;
//! use pagemill::config::ExportSettings;
//! use pagemill::Workspace;
//!
//! # fn example(workspace: &Workspace) -> pagemill::Result<()> {
//! let assembler = Assembler::new(ExportSettings::default());
//! let output = assembler.merge(workspace)?;
//! println!("{} pages, {} bytes", output.statistics.pages, output.bytes.len());
//! # Ok(())
//! # }
//! ```

mod archive;
mod compress;
mod copier;
mod overlay;

use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::{ExportSettings, SplitMode};
use crate::error::{PageMillError, Result};
use crate::io::format_file_size;
use crate::model::{Page, PageId, Workspace};
use crate::pdf;
use compress::{PageRequest, Recompressed};
use copier::{PageCopier, SourceCache};

/// File name prefix used for split archives when none is given.
pub const DEFAULT_SPLIT_PREFIX: &str = "split";

/// Something the engine could not honour. The output is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssemblyWarning {
    /// A password was requested but the output is not encrypted.
    PasswordNotApplied,

    /// A page asked for compression that could not be applied.
    CompressionSkipped {
        /// Affected page.
        page: PageId,
        /// Why nothing was recompressed.
        reason: String,
    },

    /// An image signature was left out of the overlay.
    SignatureImageSkipped {
        /// Affected page.
        page: PageId,
    },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PasswordNotApplied => {
                write!(f, "Password protection is not supported; output is not encrypted")
            }
            Self::CompressionSkipped { page, reason } => {
                write!(f, "Compression skipped for page {page}: {reason}")
            }
            Self::SignatureImageSkipped { page } => {
                write!(f, "Image signature on page {page} was not embedded")
            }
        }
    }
}

/// Statistics about one assembly.
#[derive(Debug, Clone, Default)]
pub struct AssemblyStatistics {
    /// Pages written across all outputs.
    pub pages: usize,

    /// Files produced: 1 for a merge, one per image or split document.
    pub documents: usize,

    /// Images whose data was replaced by recompression.
    pub images_recompressed: usize,

    /// Bytes saved by recompression.
    pub bytes_saved: u64,

    /// Size of the final artifact.
    pub output_size: u64,

    /// Wall time of the assembly.
    pub elapsed: Duration,
}

impl AssemblyStatistics {
    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// A finished artifact.
#[derive(Debug, Clone)]
pub struct AssemblyOutput {
    /// PDF or ZIP bytes.
    pub bytes: Vec<u8>,

    /// Capability gaps hit along the way.
    pub warnings: Vec<AssemblyWarning>,

    /// Statistics about the assembly.
    pub statistics: AssemblyStatistics,
}

/// A file destined for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    /// Archive entry name.
    pub name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl NamedFile {
    /// Create a named file.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Split documents before they are archived.
#[derive(Debug, Clone)]
pub struct SplitOutput {
    /// `{prefix}-{n}.pdf` documents in output order.
    pub documents: Vec<NamedFile>,

    /// Capability gaps hit along the way.
    pub warnings: Vec<AssemblyWarning>,

    /// Statistics about the assembly.
    pub statistics: AssemblyStatistics,
}

/// Builds output artifacts from a workspace.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    settings: ExportSettings,
}

impl Assembler {
    /// Create an assembler with the given export settings.
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Export settings in use.
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Merge every selected page, in sequence order, into one PDF.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::EmptySelection`] when nothing is selected,
    /// a configuration error for invalid page size settings, and
    /// [`PageMillError::AssemblyFailed`] if the engine rejects a source.
    pub fn merge(&self, workspace: &Workspace) -> Result<AssemblyOutput> {
        let start = Instant::now();
        let pages = self.selection(workspace)?;
        let mut warnings = self.settings_warnings();
        let mut cache = SourceCache::new(workspace.sources());

        let (bytes, recompressed) = self.build(&pages, &mut cache, &mut warnings)?;

        let statistics = AssemblyStatistics {
            pages: pages.len(),
            documents: 1,
            images_recompressed: recompressed.images,
            bytes_saved: recompressed.saved,
            output_size: bytes.len() as u64,
            elapsed: start.elapsed(),
        };
        log::info!(
            "Merged {} pages into {} ({} warning(s))",
            statistics.pages,
            statistics.format_output_size(),
            warnings.len()
        );

        Ok(AssemblyOutput {
            bytes,
            warnings,
            statistics,
        })
    }

    /// Archive each selected page's thumbnail as `page-{n}.jpg`.
    ///
    /// `n` counts selected pages from 1, not source page numbers.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::EmptySelection`] when nothing is selected and
    /// [`PageMillError::MissingThumbnail`] for a selected page that was never
    /// rendered.
    pub fn export_images(&self, workspace: &Workspace) -> Result<AssemblyOutput> {
        let start = Instant::now();
        let pages = self.selection(workspace)?;

        let files = pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let thumbnail = page
                    .thumbnail
                    .as_ref()
                    .ok_or(PageMillError::MissingThumbnail { id: page.id })?;
                Ok(NamedFile::new(format!("page-{}.jpg", index + 1), thumbnail.jpeg.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let bytes = archive::build_zip(&files)?;
        let statistics = AssemblyStatistics {
            pages: pages.len(),
            documents: files.len(),
            output_size: bytes.len() as u64,
            elapsed: start.elapsed(),
            ..AssemblyStatistics::default()
        };
        log::info!(
            "Archived {} page images ({})",
            statistics.documents,
            statistics.format_output_size()
        );

        Ok(AssemblyOutput {
            bytes,
            warnings: Vec::new(),
            statistics,
        })
    }

    /// Build split documents named `{prefix}-{n}.pdf` without archiving them.
    ///
    /// # Errors
    ///
    /// Returns [`PageMillError::EmptySelection`] when nothing is selected,
    /// [`PageMillError::InvalidChunkSize`] for `Chunks(0)`, and any engine
    /// error from building a document.
    pub fn split_documents(&self, workspace: &Workspace, mode: SplitMode, prefix: &str) -> Result<SplitOutput> {
        let start = Instant::now();
        let pages = self.selection(workspace)?;
        let chunk_size = mode.chunk_size()?;
        let mut warnings = self.settings_warnings();
        let mut cache = SourceCache::new(workspace.sources());

        let mut documents = Vec::new();
        let mut statistics = AssemblyStatistics {
            pages: pages.len(),
            ..AssemblyStatistics::default()
        };
        for (index, chunk) in pages.chunks(chunk_size).enumerate() {
            let (bytes, recompressed) = self.build(chunk, &mut cache, &mut warnings)?;
            statistics.images_recompressed += recompressed.images;
            statistics.bytes_saved += recompressed.saved;
            statistics.output_size += bytes.len() as u64;
            documents.push(NamedFile::new(format!("{prefix}-{}.pdf", index + 1), bytes));
        }
        statistics.documents = documents.len();
        statistics.elapsed = start.elapsed();

        log::info!(
            "Split {} pages into {} documents",
            statistics.pages,
            statistics.documents
        );

        Ok(SplitOutput {
            documents,
            warnings,
            statistics,
        })
    }

    /// Split the selection and archive the documents as one ZIP.
    ///
    /// # Errors
    ///
    /// As [`split_documents`](Self::split_documents), plus archive errors.
    pub fn split_archive(&self, workspace: &Workspace, mode: SplitMode, prefix: &str) -> Result<AssemblyOutput> {
        let SplitOutput {
            documents,
            warnings,
            mut statistics,
        } = self.split_documents(workspace, mode, prefix)?;

        let bytes = archive::build_zip(&documents)?;
        statistics.output_size = bytes.len() as u64;

        Ok(AssemblyOutput {
            bytes,
            warnings,
            statistics,
        })
    }

    /// Selected pages in sequence order, after validating the settings.
    fn selection<'a>(&self, workspace: &'a Workspace) -> Result<Vec<&'a Page>> {
        self.settings.page_size.validate()?;
        let pages: Vec<&Page> = workspace.selected_pages().collect();
        if pages.is_empty() {
            return Err(PageMillError::EmptySelection);
        }
        Ok(pages)
    }

    fn settings_warnings(&self) -> Vec<AssemblyWarning> {
        let mut warnings = Vec::new();
        if self.settings.password.as_deref().is_some_and(|p| !p.is_empty()) {
            log::warn!("Password protection is not supported; writing an unencrypted document");
            warnings.push(AssemblyWarning::PasswordNotApplied);
        }
        warnings
    }

    /// Build one PDF from `pages`.
    fn build(
        &self,
        pages: &[&Page],
        cache: &mut SourceCache<'_>,
        warnings: &mut Vec<AssemblyWarning>,
    ) -> Result<(Vec<u8>, Recompressed)> {
        let mut copier = PageCopier::new();
        let mut requests = Vec::with_capacity(pages.len());

        for page in pages {
            let source = cache.load(page.source_id())?;
            let object = copier.copy_page(page.source_id(), source, page.page_number())?;
            copier.set_rotation(object, page.rotation)?;
            copier.set_size(object, &self.settings.page_size)?;
            overlay::burn_in(copier.document_mut(), object, page.id, &page.annotations, warnings)?;
            requests.push(PageRequest {
                object,
                page: page.id,
                quality: page.compression_quality,
            });
            log::debug!("Assembled page {}", page.id);
        }

        let recompressed = if requests.iter().any(|request| request.quality < 1.0) {
            compress::recompress(copier.document_mut(), &requests, warnings)
        } else {
            Recompressed::default()
        };

        let mut doc = copier.finish();
        doc.prune_objects();
        doc.renumber_objects();
        doc.compress();
        let bytes = pdf::save(&mut doc).map_err(PageMillError::assembly_failed)?;
        Ok((bytes, recompressed))
    }
}
