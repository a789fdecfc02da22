// ── Zone schema ──
//
// Parsing and validation of detection zones against the geometry an area
// expects. Everything here is synchronous and side-effect free.

use serde_json::Value;
use thiserror::Error;

use crate::model::{AreaType, Point2D, ZoneGeometry, ZoneKind};

/// Why a zone was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{area} cameras take a {expected} zone, got {found}")]
    SchemaMismatch {
        area: AreaType,
        expected: ZoneKind,
        found: ZoneKind,
    },

    #[error("Malformed zone geometry: {reason}")]
    MalformedGeometry { reason: String },
}

impl ValidationError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            reason: reason.into(),
        }
    }
}

/// The geometry variant `area` requires.
pub fn expected_variant(area: AreaType) -> ZoneKind {
    area.zone_kind()
}

/// Check `candidate` against `area` and return its normalized form.
///
/// Polygons lose a closing point that repeats the first one and any
/// consecutive duplicates before the distinct-point count is checked.
pub fn validate(area: AreaType, candidate: &ZoneGeometry) -> Result<ZoneGeometry, ValidationError> {
    let expected = expected_variant(area);
    let found = candidate.kind();
    if found != expected {
        return Err(ValidationError::SchemaMismatch {
            area,
            expected,
            found,
        });
    }

    match candidate {
        ZoneGeometry::Line { start, end } => {
            if !start.is_finite() || !end.is_finite() {
                return Err(ValidationError::malformed("line coordinates must be finite"));
            }
            if start == end {
                return Err(ValidationError::malformed("line endpoints must be distinct"));
            }
            Ok(candidate.clone())
        }
        ZoneGeometry::Polygon { points } => {
            if points.iter().any(|p| !p.is_finite()) {
                return Err(ValidationError::malformed(
                    "polygon coordinates must be finite",
                ));
            }
            let points = normalize_ring(points);
            let distinct = count_distinct(&points);
            if distinct < 3 {
                return Err(ValidationError::malformed(format!(
                    "polygon needs at least 3 distinct points, got {distinct}"
                )));
            }
            Ok(ZoneGeometry::Polygon { points })
        }
        ZoneGeometry::Rectangle {
            x,
            y,
            width,
            height,
        } => {
            if ![x, y, width, height].iter().all(|v| v.is_finite()) {
                return Err(ValidationError::malformed(
                    "rectangle fields must be finite",
                ));
            }
            if *width <= 0.0 || *height <= 0.0 {
                return Err(ValidationError::malformed(format!(
                    "rectangle width and height must be positive, got {width}x{height}"
                )));
            }
            Ok(candidate.clone())
        }
    }
}

/// Validate an untyped payload. The `type` tag is checked before the
/// shape, so a wrong-variant payload always reports `SchemaMismatch`.
pub fn validate_value(area: AreaType, candidate: &Value) -> Result<ZoneGeometry, ValidationError> {
    let Some(obj) = candidate.as_object() else {
        return Err(ValidationError::malformed("zone must be a JSON object"));
    };
    let Some(tag) = obj.get("type").and_then(Value::as_str) else {
        return Err(ValidationError::malformed("missing `type` field"));
    };
    let found: ZoneKind = tag
        .parse()
        .map_err(|_| ValidationError::malformed(format!("unknown zone type `{tag}`")))?;

    let expected = expected_variant(area);
    if found != expected {
        return Err(ValidationError::SchemaMismatch {
            area,
            expected,
            found,
        });
    }

    let geometry: ZoneGeometry = serde_json::from_value(candidate.clone())
        .map_err(|e| ValidationError::malformed(e.to_string()))?;
    validate(area, &geometry)
}

/// Parse and validate structured text in one step.
pub fn validate_text(area: AreaType, text: &str) -> Result<ZoneGeometry, ValidationError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ValidationError::malformed(e.to_string()))?;
    validate_value(area, &value)
}

/// Parse the structured-text form. Checks syntax and field types only.
pub fn parse(text: &str) -> Result<ZoneGeometry, ValidationError> {
    serde_json::from_str(text).map_err(|e| ValidationError::malformed(e.to_string()))
}

/// Render a zone in the structured-text form accepted by [`parse`].
pub fn serialize(geometry: &ZoneGeometry) -> String {
    // A zone has no map keys or non-string keys, so this cannot fail.
    serde_json::to_string_pretty(geometry).unwrap_or_default()
}

/// A valid starter zone for `area`, sized for a 640x480 frame.
pub fn template(area: AreaType) -> ZoneGeometry {
    match expected_variant(area) {
        ZoneKind::Line => ZoneGeometry::Line {
            start: Point2D::new(0.0, 240.0),
            end: Point2D::new(640.0, 240.0),
        },
        ZoneKind::Polygon => ZoneGeometry::Polygon {
            points: vec![
                Point2D::new(80.0, 80.0),
                Point2D::new(560.0, 80.0),
                Point2D::new(560.0, 400.0),
                Point2D::new(80.0, 400.0),
            ],
        },
        ZoneKind::Rectangle => ZoneGeometry::Rectangle {
            x: 160.0,
            y: 120.0,
            width: 320.0,
            height: 240.0,
        },
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn normalize_ring(points: &[Point2D]) -> Vec<Point2D> {
    let mut out: Vec<Point2D> = Vec::with_capacity(points.len());
    for p in points {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

fn count_distinct(points: &[Point2D]) -> usize {
    let mut seen: Vec<Point2D> = Vec::with_capacity(points.len());
    for p in points {
        if !seen.contains(p) {
            seen.push(*p);
        }
    }
    seen.len()
}
