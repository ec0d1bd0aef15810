//! The steps of a `pagemill` run: load, transform, assemble, write.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use pagemill::assemble::{Assembler, AssemblyOutput};
use pagemill::config::OverwriteMode;
use pagemill::ingest::InputFile;
use pagemill::io::{ArtifactWriter, InputReader, OutputCheck};
use pagemill::model::{PageId, SourceId};
use pagemill::render::{PageRenderer, default_renderer};
use pagemill::{PageMillError, Result, Workspace};

use crate::config::{Config, Task};
use crate::output::{
    OutputFormatter, display_ingest_summary, display_load_statistics, display_warnings,
};

/// Read every input and ingest it into a fresh workspace, drawing
/// thumbnails with `renderer`.
///
/// Stops at the first file that cannot be read.
pub async fn load_workspace(
    config: &Config,
    renderer: &dyn PageRenderer,
    formatter: &OutputFormatter,
) -> Result<Workspace> {
    formatter.info(&format!("Reading {} input file(s)...", config.inputs.len()));

    let reader = InputReader::new();
    let (results, stats) = reader.load_all(&config.inputs).await;
    let loaded = results.into_iter().collect::<Result<Vec<_>>>()?;
    display_load_statistics(formatter, &stats);

    for input in &loaded {
        formatter.detail(
            &input.path.display().to_string(),
            &format!("{} ({})", input.file.mime, pagemill::io::format_file_size(input.file_size)),
        );
    }

    let files: Vec<InputFile> = loaded.into_iter().map(|input| input.file).collect();
    let mut workspace = Workspace::new();
    let summary = workspace.ingest(files, renderer)?;
    display_ingest_summary(formatter, &summary);

    Ok(workspace)
}

/// Apply the transforms requested in `config`, in a fixed order:
/// mix, selection, rotation, compression.
pub fn apply_transforms(
    workspace: &mut Workspace,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<()> {
    if let Some(options) = config.mix {
        let ids: Vec<SourceId> = workspace.sources().iter().map(|s| s.id).take(2).collect();
        let [first, second] = ids[..] else {
            return Err(PageMillError::invalid_mix(
                "mixing needs two ingested sources",
            ));
        };
        workspace.mix(first, second, options)?;
        formatter.info(&format!(
            "Mixed {first} and {second} ({} pages in sequence)",
            workspace.len()
        ));
    }

    if config.selection.is_restricted() {
        workspace.deselect_all();
        let matched = match (&config.selection.range, config.selection.preset) {
            (Some(range), _) => workspace.select_range(range)?,
            (None, Some(preset)) => workspace.select_preset(preset)?,
            (None, None) => 0,
        };
        formatter.info(&format!("Selected {matched} of {} page(s)", workspace.len()));
    }

    if let Some(degrees) = config.rotation {
        let selected: Vec<PageId> = workspace.selected_pages().map(|p| p.id).collect();
        for id in &selected {
            workspace.rotate(*id, degrees)?;
        }
        log::debug!("Rotated {} page(s) to {degrees} degrees", selected.len());
    }

    if let Some(settings) = config.compression {
        let changed = workspace.set_compression(settings)?;
        let estimate = workspace.estimate_compressed_size(settings.quality, settings.scope)?;
        formatter.info(&format!(
            "Compression at {:.0}% quality on {changed} page(s): ~{} -> ~{} ({:.0}% smaller)",
            settings.quality * 100.0,
            pagemill::io::format_file_size(estimate.original),
            pagemill::io::format_file_size(estimate.estimated),
            estimate.savings_percent()
        ));
        if let Some(target) = settings.target_size_kb
            && estimate.estimated > u64::from(target) * 1024
        {
            formatter.warning(&format!(
                "Estimated size is above the {target} KB target; try a lower --quality"
            ));
        }
    }

    Ok(())
}

/// Build the artifact for an assembling task.
pub fn assemble(workspace: &Workspace, config: &Config) -> Result<AssemblyOutput> {
    let assembler = Assembler::new(config.export.clone());
    match &config.task {
        Task::Merge => assembler.merge(workspace),
        Task::Images => assembler.export_images(workspace),
        Task::Split { mode, prefix } => assembler.split_archive(workspace, *mode, prefix),
        Task::Info { .. } => Err(PageMillError::invalid_config(
            "info does not produce an artifact",
        )),
    }
}

/// Warning for an image export drawn by a renderer that only makes blank pages.
fn placeholder_notice(task: &Task, renderer: &dyn PageRenderer) -> Option<&'static str> {
    (matches!(task, Task::Images) && renderer.is_placeholder()).then_some(
        "No rasterizer in this build; exported images are blank placeholders (build with --features mupdf)",
    )
}

/// Decide whether `output` may be written, prompting when needed.
pub async fn handle_output_overwrite(
    output: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<()> {
    match ArtifactWriter::new().check_output(output, mode).await? {
        OutputCheck::Fresh | OutputCheck::Overwrite => Ok(()),
        // Nobody can answer a prompt that was never shown.
        OutputCheck::NeedsConfirmation if formatter.is_quiet() => {
            Err(PageMillError::output_exists(output.to_path_buf()))
        }
        OutputCheck::NeedsConfirmation => {
            formatter.warning(&format!("Output file already exists: {}", output.display()));

            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin().read_line(&mut response)?;

            if is_yes(&response) {
                Ok(())
            } else {
                Err(PageMillError::Cancelled)
            }
        }
    }
}

fn is_yes(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Run an assembling task end to end.
pub async fn run_assembly(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let Some(output_path) = config.output.as_deref() else {
        return Err(PageMillError::invalid_config("An output path is required"));
    };

    if config.writes_output() {
        handle_output_overwrite(output_path, config.overwrite_mode, formatter).await?;
    }

    let renderer = default_renderer();
    let mut workspace = load_workspace(config, renderer.as_ref(), formatter).await?;
    apply_transforms(&mut workspace, config, formatter)?;
    if let Some(notice) = placeholder_notice(&config.task, renderer.as_ref()) {
        formatter.warning(notice);
    }

    if config.dry_run {
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!(
            "  {} of {} page(s) would be written to {}",
            workspace.selected_count(),
            workspace.len(),
            output_path.display()
        ));
        return Ok(());
    }

    formatter.info("Assembling...");
    let result = assemble(&workspace, config)?;
    display_warnings(formatter, &result.warnings);

    let statistics = result.statistics;
    let write_stats = ArtifactWriter::new()
        .save_with_stats(result.bytes, output_path)
        .await?;

    formatter.success(&format!(
        "Created {} ({}, {} page(s))",
        output_path.display(),
        write_stats.format_file_size(),
        statistics.pages
    ));

    if formatter.is_verbose() {
        formatter.section("Statistics");
        formatter.detail("Pages", &statistics.pages.to_string());
        formatter.detail("Files", &statistics.documents.to_string());
        formatter.detail("Images recompressed", &statistics.images_recompressed.to_string());
        formatter.detail(
            "Bytes saved",
            &pagemill::io::format_file_size(statistics.bytes_saved),
        );
        formatter.detail("Output size", &statistics.format_output_size());
        formatter.detail(
            "Assembly time",
            &format!("{:.2}s", statistics.elapsed.as_secs_f64()),
        );
        formatter.detail(
            "Write time",
            &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
        );
    }

    Ok(())
}

/// Listing printed by `pagemill info`.
#[derive(Debug, Serialize)]
pub struct InfoReport<'a> {
    /// Sources in ingestion order.
    pub sources: Vec<SourceInfo<'a>>,
    /// Pages in sequence order.
    pub pages: Vec<PageInfo<'a>>,
}

/// One source of an [`InfoReport`].
#[derive(Debug, Serialize)]
pub struct SourceInfo<'a> {
    pub id: SourceId,
    pub name: &'a str,
    pub pages: u32,
    pub size: usize,
    pub image_derived: bool,
}

/// One page of an [`InfoReport`].
#[derive(Debug, Serialize)]
pub struct PageInfo<'a> {
    pub position: usize,
    pub source: &'a str,
    pub page_number: u32,
    pub thumbnail: Option<(u32, u32)>,
}

impl<'a> InfoReport<'a> {
    /// Describe the sources and pages of `workspace`.
    pub fn from_workspace(workspace: &'a Workspace) -> Self {
        let sources = workspace
            .sources()
            .iter()
            .map(|source| SourceInfo {
                id: source.id,
                name: &source.display_name,
                pages: source.page_count,
                size: source.bytes.len(),
                image_derived: source.is_image_derived,
            })
            .collect();

        let pages = workspace
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| PageInfo {
                position: index + 1,
                source: &page.source_name,
                page_number: page.page_number(),
                thumbnail: page.thumbnail.as_ref().map(|t| (t.width, t.height)),
            })
            .collect();

        Self { sources, pages }
    }
}

/// Run `pagemill info`.
pub async fn run_info(config: &Config, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let json = matches!(config.task, Task::Info { json: true });

    // JSON goes to stdout alone.
    let status = if json {
        OutputFormatter::quiet()
    } else {
        OutputFormatter::new(formatter.is_quiet(), formatter.is_verbose())
    };
    let workspace = load_workspace(config, default_renderer().as_ref(), &status).await?;
    let report = InfoReport::from_workspace(&workspace);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    formatter.section("Sources");
    for (index, source) in report.sources.iter().enumerate() {
        let kind = if source.image_derived { ", from image" } else { "" };
        formatter.list_item(
            index + 1,
            &format!(
                "{} ({} page(s), {}{kind})",
                source.name,
                source.pages,
                pagemill::io::format_file_size(source.size as u64)
            ),
        );
    }

    if formatter.is_verbose() {
        formatter.section("Pages");
        for page in &report.pages {
            formatter.detail(
                &page.position.to_string(),
                &format!("{} page {}", page.source, page.page_number),
            );
        }
    }

    formatter.blank_line();
    formatter.info(&format!("Total: {} page(s)", report.pages.len()));
    Ok(())
}
