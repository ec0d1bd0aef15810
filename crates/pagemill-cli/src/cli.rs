//! Command-line interface for pagemill.
//!
//! Defines the `clap` argument structure and its conversion into a validated
//! [`Config`].

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use pagemill::assemble::DEFAULT_SPLIT_PREFIX;
use pagemill::config::{
    CompressionScope, CompressionSettings, ExportSettings, Orientation, OverwriteMode,
    PageSizePreset, PageSizeSettings, SplitMode,
};
use pagemill::model::{MixOptions, MixPattern};
use pagemill::range::RangePreset;
use pagemill::{PageMillError, Result};

use crate::config::{Config, Selection, Task};
use crate::paths::collect_paths_for_patterns;

/// Select, reorder, rotate and recombine PDF pages.
///
/// pagemill reads PDFs, images and text files, turns every page into an
/// editable page sequence and writes a merged PDF, a ZIP of page images or a
/// ZIP of split documents.
#[derive(Parser, Debug)]
#[command(name = "pagemill")]
#[command(version)]
#[command(about = "Select, reorder, rotate and recombine PDF pages", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge the selected pages into one PDF
    Merge(AssembleArgs),

    /// Export the selected pages as a ZIP of JPEG images
    Images(AssembleArgs),

    /// Split the selected pages into a ZIP of smaller PDFs
    Split(SplitArgs),

    /// List sources and pages
    Info(InfoArgs),
}

/// Inputs and verbosity shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input files, in order
    ///
    /// PDF, PNG, JPEG, plain text and HTML files are accepted.
    /// Glob patterns are expanded; other file types are skipped.
    ///
    /// Examples:
    ///   pagemill merge scan-*.pdf cover.png -o book.pdf
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Verbose output - show statistics and per-file details
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments of commands that write an artifact.
#[derive(Args, Debug, Clone)]
pub struct AssembleArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Dry run - load inputs and apply transforms without writing output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Pages to keep, counted across all inputs (e.g. "1-3, 5")
    ///
    /// Page numbers are 1-indexed positions in the combined page sequence,
    /// after mixing.
    #[arg(long, value_name = "RANGE")]
    pub pages: Option<String>,

    /// Keep a canned set of pages
    #[arg(long, value_enum, value_name = "PRESET", conflicts_with = "pages")]
    pub preset: Option<PresetArg>,

    /// Rotate selected pages by a multiple of 90 degrees
    #[arg(long, value_name = "DEGREES", allow_hyphen_values = true)]
    pub rotate: Option<i32>,

    /// Interleave the pages of the first two sources
    #[arg(long)]
    pub mix: bool,

    /// Interleaving pattern used with --mix
    #[arg(long, value_name = "PATTERN", default_value = "1:1")]
    #[arg(value_parser = ["1:1", "2:1", "1:2"])]
    pub mix_pattern: String,

    /// Reverse the second source before interleaving
    #[arg(long)]
    pub reverse_second: bool,

    /// JPEG quality for embedded images, between 0 (exclusive) and 1
    #[arg(long, value_name = "QUALITY")]
    pub quality: Option<f32>,

    /// Target size in KB shown next to the compression estimate
    #[arg(long, value_name = "KB", requires = "quality")]
    pub target_size: Option<u32>,

    /// Output page size
    #[arg(long, value_name = "SIZE", default_value = "original")]
    #[arg(value_parser = ["original", "a4", "letter", "legal", "a3", "a5", "tabloid", "custom"])]
    pub page_size: String,

    /// Page width in points for --page-size custom
    #[arg(long, value_name = "POINTS")]
    pub width: Option<f32>,

    /// Page height in points for --page-size custom
    #[arg(long, value_name = "POINTS")]
    pub height: Option<f32>,

    /// Use landscape orientation for the output page size
    #[arg(long)]
    pub landscape: bool,

    /// Password for the output (reported, not applied)
    #[arg(long, value_name = "PASSWORD", env = "PAGEMILL_PASSWORD")]
    pub password: Option<String>,
}

/// Arguments of `pagemill split`.
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[command(flatten)]
    pub assemble: AssembleArgs,

    /// Pages per document (default: one page per document)
    #[arg(long, value_name = "N")]
    pub chunk: Option<usize>,

    /// Name prefix of the documents in the archive
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_SPLIT_PREFIX)]
    pub prefix: String,
}

/// Arguments of `pagemill info`.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

/// Canned page sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    /// Every page
    All,
    /// Pages 1, 3, 5, ...
    Odd,
    /// Pages 2, 4, 6, ...
    Even,
    /// The first half, rounded up
    FirstHalf,
    /// Everything after the first half
    SecondHalf,
}

impl From<PresetArg> for RangePreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::All => RangePreset::All,
            PresetArg::Odd => RangePreset::Odd,
            PresetArg::Even => RangePreset::Even,
            PresetArg::FirstHalf => RangePreset::FirstHalf,
            PresetArg::SecondHalf => RangePreset::SecondHalf,
        }
    }
}

impl Cli {
    /// Whether the chosen subcommand asked for quiet output.
    pub fn is_quiet(&self) -> bool {
        self.input_args().quiet
    }

    /// Whether the chosen subcommand asked for verbose output.
    pub fn is_verbose(&self) -> bool {
        self.input_args().verbose
    }

    fn input_args(&self) -> &InputArgs {
        match &self.command {
            Command::Merge(args) | Command::Images(args) => &args.input,
            Command::Split(args) => &args.assemble.input,
            Command::Info(args) => &args.input,
        }
    }

    /// Convert CLI arguments into a validated [`Config`].
    ///
    /// Input patterns are expanded here, so the returned configuration only
    /// holds concrete paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is malformed, an option value is
    /// out of its domain or the resulting configuration fails validation.
    pub fn to_config(&self) -> Result<Config> {
        let config = match &self.command {
            Command::Merge(args) => args.to_config(Task::Merge)?,
            Command::Images(args) => args.to_config(Task::Images)?,
            Command::Split(args) => {
                let mode = match args.chunk {
                    Some(size) => SplitMode::Chunks(size),
                    None => SplitMode::Individual,
                };
                args.assemble.to_config(Task::Split {
                    mode,
                    prefix: args.prefix.clone(),
                })?
            }
            Command::Info(args) => Config {
                task: Task::Info { json: args.json },
                inputs: args.input.resolve()?,
                output: None,
                overwrite_mode: OverwriteMode::default(),
                dry_run: false,
                quiet: args.input.quiet,
                verbose: args.input.verbose,
                selection: Selection::default(),
                rotation: None,
                mix: None,
                compression: None,
                export: ExportSettings::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

impl InputArgs {
    /// Expand the input patterns into paths.
    ///
    /// A pattern that matches nothing is kept as a literal path so a missing
    /// file is reported by name when it is read.
    fn resolve(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for pattern in &self.inputs {
            let matched = collect_paths_for_patterns([pattern])?;
            if matched.is_empty() {
                paths.push(PathBuf::from(pattern));
            } else {
                paths.extend(matched);
            }
        }
        Ok(paths)
    }
}

impl AssembleArgs {
    fn to_config(&self, task: Task) -> Result<Config> {
        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        if !self.mix && (self.reverse_second || self.mix_pattern != "1:1") {
            return Err(PageMillError::invalid_config(
                "--mix-pattern and --reverse-second require --mix",
            ));
        }

        let mix = if self.mix {
            Some(MixOptions {
                pattern: MixPattern::from_str(&self.mix_pattern)?,
                reverse_second: self.reverse_second,
            })
        } else {
            None
        };

        let compression = self.quality.map(|quality| CompressionSettings {
            quality,
            target_size_kb: self.target_size,
            scope: CompressionScope::Selected,
        });

        Ok(Config {
            task,
            inputs: self.input.resolve()?,
            output: Some(self.output.clone()),
            overwrite_mode,
            dry_run: self.dry_run,
            quiet: self.input.quiet,
            verbose: self.input.verbose,
            selection: Selection {
                range: self.pages.clone(),
                preset: self.preset.map(RangePreset::from),
            },
            rotation: self.rotate,
            mix,
            compression,
            export: ExportSettings {
                password: self.password.clone(),
                page_size: self.page_size_settings()?,
            },
        })
    }

    fn page_size_settings(&self) -> Result<PageSizeSettings> {
        let preset = PageSizePreset::from_str(&self.page_size)?;
        let orientation = if self.landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };

        match (preset, self.width, self.height) {
            (PageSizePreset::Custom, Some(width), Some(height)) => {
                Ok(PageSizeSettings::custom(width, height, orientation))
            }
            (PageSizePreset::Custom, _, _) => Err(PageMillError::invalid_config(
                "--page-size custom requires --width and --height",
            )),
            (_, None, None) => Ok(PageSizeSettings::preset(preset, orientation)),
            _ => Err(PageMillError::invalid_config(
                "--width and --height are only valid with --page-size custom",
            )),
        }
    }
}
