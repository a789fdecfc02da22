// ── Detection zone geometry ──

use serde::{Deserialize, Serialize};

use super::area::ZoneKind;

/// A point in frame pixel coordinates. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// Region of interest, tagged on `type`.
///
/// ```json
/// { "type": "LINE", "start": [0, 240], "end": [640, 240] }
/// { "type": "POLYGON", "points": [[100, 100], [540, 100], [320, 400]] }
/// { "type": "RECTANGLE", "x": 100, "y": 80, "width": 200, "height": 150 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ZoneGeometry {
    /// Counting line (entrances).
    Line { start: Point2D, end: Point2D },
    /// Closed outline (dining floors).
    Polygon { points: Vec<Point2D> },
    /// Axis-aligned box (counters, kitchens).
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl ZoneGeometry {
    pub fn kind(&self) -> ZoneKind {
        match self {
            Self::Line { .. } => ZoneKind::Line,
            Self::Polygon { .. } => ZoneKind::Polygon,
            Self::Rectangle { .. } => ZoneKind::Rectangle,
        }
    }

    /// One-line description for tables.
    pub fn summary(&self) -> String {
        match self {
            Self::Line { start, end } => format!(
                "LINE ({}, {}) -> ({}, {})",
                start.x, start.y, end.x, end.y
            ),
            Self::Polygon { points } => format!("POLYGON {} points", points.len()),
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => format!("RECTANGLE {width}x{height} at ({x}, {y})"),
        }
    }
}
