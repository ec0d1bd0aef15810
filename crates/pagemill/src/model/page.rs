//! Page records and their per-page transform state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PageMillError, Result};
use crate::model::annotation::Annotation;
use crate::model::source::SourceId;

/// Stable identifier of a page: its source plus its 1-indexed page number.
///
/// The id never changes when the page sequence is reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId {
    /// Owning source.
    pub source: SourceId,
    /// 1-indexed page number within the source.
    pub page_number: u32,
}

impl PageId {
    /// Build the id of page `page_number` of `source`.
    pub fn new(source: SourceId, page_number: u32) -> Self {
        Self {
            source,
            page_number,
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.page_number)
    }
}

/// Page rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "i32")]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// Rotate 90 degrees clockwise.
    Clockwise90,
    /// Rotate 180 degrees.
    Rotate180,
    /// Rotate 270 degrees clockwise (90 counter-clockwise).
    Clockwise270,
}

/// Direction of a relative quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    /// +90 degrees.
    Clockwise,
    /// -90 degrees.
    CounterClockwise,
}

impl Rotation {
    /// Parse rotation from degrees.
    ///
    /// Any multiple of 90 is accepted and normalized modulo 360, so `450`
    /// becomes `Clockwise90` and `-90` becomes `Clockwise270`.
    ///
    /// # Errors
    ///
    /// Returns an error if `degrees` is not a multiple of 90.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagemill::Rotation;
    ///
    /// assert_eq!(Rotation::from_degrees(450).unwrap(), Rotation::Clockwise90);
    /// assert!(Rotation::from_degrees(45).is_err());
    /// ```
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(PageMillError::InvalidRotation { degrees });
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Self::None,
            90 => Self::Clockwise90,
            180 => Self::Rotate180,
            _ => Self::Clockwise270,
        })
    }

    /// Get rotation as degrees.
    pub fn as_degrees(&self) -> u16 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Rotate180 => 180,
            Self::Clockwise270 => 270,
        }
    }

    /// Turn a quarter in `direction`, wrapping around at 360.
    pub fn turned(self, direction: RotateDirection) -> Self {
        let delta = match direction {
            RotateDirection::Clockwise => 90,
            RotateDirection::CounterClockwise => -90,
        };
        // Always a multiple of 90.
        Self::from_degrees(i32::from(self.as_degrees()) + delta).unwrap_or_default()
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.as_degrees()
    }
}

impl TryFrom<i32> for Rotation {
    type Error = PageMillError;

    fn try_from(degrees: i32) -> Result<Self> {
        Self::from_degrees(degrees)
    }
}

/// A rendered page preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// JPEG-encoded raster.
    pub jpeg: Vec<u8>,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
}

/// One page of the page sequence.
#[derive(Debug, Clone)]
pub struct Page {
    /// Stable id.
    pub id: PageId,

    /// Display name of the owning source.
    pub source_name: String,

    /// Whether the page takes part in assembly.
    pub selected: bool,

    /// Preview raster, rendered at ingestion.
    pub thumbnail: Option<Thumbnail>,

    /// Absolute rotation applied at assembly.
    pub rotation: Rotation,

    /// JPEG quality applied to the page's images at assembly, in (0, 1].
    pub compression_quality: f32,

    /// Annotations burned in at assembly.
    pub annotations: Vec<Annotation>,

    /// Approximate size of the page in the source, in bytes.
    pub original_size_estimate: Option<u64>,
}

impl Page {
    /// Create a freshly ingested page: selected, unrotated, uncompressed.
    pub fn new(id: PageId, source_name: impl Into<String>) -> Self {
        Self {
            id,
            source_name: source_name.into(),
            selected: true,
            thumbnail: None,
            rotation: Rotation::None,
            compression_quality: 1.0,
            annotations: Vec::new(),
            original_size_estimate: None,
        }
    }

    /// Owning source.
    pub fn source_id(&self) -> SourceId {
        self.id.source
    }

    /// 1-indexed page number within the source.
    pub fn page_number(&self) -> u32 {
        self.id.page_number
    }
}
