//! Export and transform settings.
//!
//! These values travel from the caller into the page model and the assembly
//! engine. They handle:
//! - Output page size presets and orientation
//! - Compression intent and its scope
//! - Split modes
//! - Output overwrite policy

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PageMillError, Result};

/// Named output page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSizePreset {
    /// Keep each page's own size.
    #[default]
    Original,
    /// ISO A4.
    A4,
    /// US Letter.
    Letter,
    /// US Legal.
    Legal,
    /// ISO A3.
    A3,
    /// ISO A5.
    A5,
    /// US Tabloid.
    Tabloid,
    /// Caller-provided width and height.
    Custom,
}

impl PageSizePreset {
    /// Nominal (width, height) in points, portrait. `Original` is (0, 0).
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            Self::Original => (0.0, 0.0),
            Self::A4 => (595.28, 841.89),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
            Self::A3 => (841.89, 1190.55),
            Self::A5 => (419.53, 595.28),
            Self::Tabloid => (792.0, 1224.0),
            Self::Custom => (612.0, 792.0),
        }
    }
}

impl FromStr for PageSizePreset {
    type Err = PageMillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "a3" => Ok(Self::A3),
            "a5" => Ok(Self::A5),
            "tabloid" => Ok(Self::Tabloid),
            "custom" => Ok(Self::Custom),
            _ => Err(PageMillError::invalid_config(format!(
                "Invalid page size: {s}. Must be one of: original, a4, letter, legal, a3, a5, tabloid, custom"
            ))),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

/// Output page size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSizeSettings {
    /// Size preset.
    pub preset: PageSizePreset,
    /// Width in points; zero for `Original`.
    pub width: f32,
    /// Height in points; zero for `Original`.
    pub height: f32,
    /// Orientation.
    pub orientation: Orientation,
}

impl PageSizeSettings {
    /// Settings for a preset at its nominal dimensions.
    pub fn preset(preset: PageSizePreset, orientation: Orientation) -> Self {
        let (width, height) = preset.dimensions();
        Self {
            preset,
            width,
            height,
            orientation,
        }
    }

    /// Settings for a custom size in points.
    pub fn custom(width: f32, height: f32, orientation: Orientation) -> Self {
        Self {
            preset: PageSizePreset::Custom,
            width,
            height,
            orientation,
        }
    }

    /// Whether pages keep their own size.
    pub fn is_original(&self) -> bool {
        self.preset == PageSizePreset::Original
    }

    /// Effective (width, height) in points, or `None` for `Original`.
    ///
    /// Portrait puts the shorter side horizontally, landscape the longer one.
    pub fn effective_dimensions(&self) -> Option<(f32, f32)> {
        if self.is_original() {
            return None;
        }
        let (short, long) = if self.width <= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        Some(match self.orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        })
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-original size has a non-positive side.
    pub fn validate(&self) -> Result<()> {
        if !self.is_original() && (self.width <= 0.0 || self.height <= 0.0) {
            return Err(PageMillError::invalid_config(format!(
                "Page size must be positive, got {} x {} points",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Settings that shape an assembled document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Requested user password. Not applied by this engine; assembly reports
    /// a warning when it is set.
    pub password: Option<String>,
    /// Output page size.
    pub page_size: PageSizeSettings,
}

/// Which pages a compression setting targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionScope {
    /// Every page.
    #[default]
    All,
    /// Only selected pages.
    Selected,
}

/// Compression intent applied at assembly time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionSettings {
    /// JPEG quality in (0, 1].
    pub quality: f32,
    /// Size the user is aiming for. Advisory only; never enforced.
    pub target_size_kb: Option<u32>,
    /// Pages the setting applies to.
    pub scope: CompressionScope,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: 0.7,
            target_size_kb: None,
            scope: CompressionScope::All,
        }
    }
}

impl CompressionSettings {
    /// Validate the quality domain.
    ///
    /// # Errors
    ///
    /// Returns an error if `quality` is not in (0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(PageMillError::InvalidQuality {
                quality: self.quality,
            });
        }
        Ok(())
    }
}

/// How a split archive groups pages into documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// One page per document.
    Individual,
    /// Consecutive runs of this many pages; the last may be shorter.
    Chunks(usize),
}

impl SplitMode {
    /// Pages per output document.
    ///
    /// # Errors
    ///
    /// Returns an error for `Chunks(0)`.
    pub fn chunk_size(self) -> Result<usize> {
        match self {
            Self::Individual => Ok(1),
            Self::Chunks(0) => Err(PageMillError::InvalidChunkSize),
            Self::Chunks(size) => Ok(size),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}
