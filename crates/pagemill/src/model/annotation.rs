//! Page annotations.
//!
//! Geometry is expressed in fractions of the page box with a top-left origin,
//! so annotations survive page size changes unchanged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an annotation draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Translucent filled rectangle.
    Highlight,
    /// Freehand polyline through `points`.
    Drawing,
    /// Signature, either typed text or an image data URL in `content`.
    Signature,
    /// Free text from `content`.
    Text,
}

impl AnnotationKind {
    /// Color used when an annotation has none.
    pub fn default_color(self) -> &'static str {
        match self {
            Self::Highlight => "#ffeb3b",
            Self::Drawing => "#ef4444",
            Self::Signature | Self::Text => "#000000",
        }
    }
}

/// A point in page fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal fraction, 0 at the left edge.
    pub x: f32,
    /// Vertical fraction, 0 at the top edge.
    pub y: f32,
}

/// One annotation attached to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique id.
    pub id: Uuid,
    /// What to draw.
    pub kind: AnnotationKind,
    /// Left edge as a page fraction.
    pub x: f32,
    /// Top edge as a page fraction.
    pub y: f32,
    /// Width as a page fraction.
    pub width: f32,
    /// Height as a page fraction.
    pub height: f32,
    /// `#rrggbb` color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Text for `Text` and `Signature` annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Stroke for `Drawing` annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
}

impl Annotation {
    /// Create an annotation covering the given rectangle.
    pub fn new(kind: AnnotationKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width,
            height,
            color: None,
            content: None,
            points: Vec::new(),
        }
    }

    /// Create a text annotation.
    pub fn text(x: f32, y: f32, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(AnnotationKind::Text, x, y, 0.0, 0.0)
        }
    }

    /// Create a drawing from a stroke; the bounding box is derived from it.
    pub fn drawing(points: Vec<Point>) -> Self {
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (1.0_f32, 1.0_f32, 0.0_f32, 0.0_f32);
        for p in &points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if points.is_empty() {
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
        }
        Self {
            points,
            ..Self::new(
                AnnotationKind::Drawing,
                min_x,
                min_y,
                max_x - min_x,
                max_y - min_y,
            )
        }
    }

    /// Set the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Effective color as RGB components in 0..=1.
    ///
    /// Falls back to the kind's default when the color is missing or not a
    /// `#rrggbb` string.
    pub fn rgb(&self) -> (f32, f32, f32) {
        self.color
            .as_deref()
            .and_then(parse_hex_color)
            .or_else(|| parse_hex_color(self.kind.default_color()))
            .unwrap_or((0.0, 0.0, 0.0))
    }
}

fn parse_hex_color(color: &str) -> Option<(f32, f32, f32)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_parses_hex() {
        let a = Annotation::new(AnnotationKind::Highlight, 0.1, 0.1, 0.2, 0.2).with_color("#ff0000");
        assert_eq!(a.rgb(), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rgb_falls_back_to_kind_default() {
        let a = Annotation::new(AnnotationKind::Text, 0.0, 0.0, 0.0, 0.0).with_color("red");
        assert_eq!(a.rgb(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_drawing_bounding_box() {
        let a = Annotation::drawing(vec![
            Point { x: 0.2, y: 0.5 },
            Point { x: 0.6, y: 0.1 },
        ]);
        assert_eq!(a.kind, AnnotationKind::Drawing);
        assert!((a.x - 0.2).abs() < f32::EPSILON);
        assert!((a.y - 0.1).abs() < f32::EPSILON);
        assert!((a.width - 0.4).abs() < 1e-6);
        assert!((a.height - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Annotation::text(0.1, 0.1, "a");
        let b = Annotation::text(0.1, 0.1, "a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serde_kind_lowercase() {
        let a = Annotation::text(0.5, 0.5, "hello");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["kind"], "text");
        assert!(json.get("points").is_none());
    }
}
