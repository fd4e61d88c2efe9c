//! Three-point angle geometry.
//!
//! Pure functions over canvas coordinates:
//! - angle computation at a vertex (inner and outer measurement)
//! - arc direction selection for rendering the measured angle
//! - label placement for the arc
//! - proximity tests used for dragging and hit-testing

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in canvas pixel coordinates.
///
/// Points are not bounded by the canvas; a point being dragged may lie outside it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Vector from `origin` to this point.
    fn relative_to(&self, origin: &Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Exactly three points forming an angle. Index 1 is the vertex.
///
/// Serialized as a JSON array of three points; any other length is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct AnglePointTriple([Point; 3]);

impl AnglePointTriple {
    pub const fn new(p1: Point, vertex: Point, p3: Point) -> Self {
        Self([p1, vertex, p3])
    }

    /// All three points in placement order.
    pub fn points(&self) -> &[Point; 3] {
        &self.0
    }

    /// The vertex (middle point).
    pub fn vertex(&self) -> Point {
        self.0[1]
    }

    /// Get the point at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Point> {
        self.0.get(index).copied()
    }

    /// Return a copy with the point at `index` replaced.
    /// Returns None if the index is out of range.
    pub fn with_point(&self, index: usize, point: Point) -> Option<Self> {
        let mut points = self.0;
        *points.get_mut(index)? = point;
        Some(Self(points))
    }

    /// Compute the inner/outer measurement of this triple.
    pub fn measure(&self) -> Result<AngleMeasure, GeometryError> {
        compute_angle(self.0[0], self.0[1], self.0[2])
    }

    /// Choose the arc to draw for this triple.
    pub fn arc(&self) -> ArcSpan {
        choose_arc_direction(self.0[0], self.0[1], self.0[2])
    }
}

impl TryFrom<&[Point]> for AnglePointTriple {
    type Error = GeometryError;

    fn try_from(points: &[Point]) -> Result<Self, Self::Error> {
        match points {
            [p1, p2, p3] => Ok(Self::new(*p1, *p2, *p3)),
            other => Err(GeometryError::for_point_count(other.len())
                .unwrap_or(GeometryError::Incomplete { found: other.len() })),
        }
    }
}

impl TryFrom<Vec<Point>> for AnglePointTriple {
    type Error = GeometryError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::try_from(points.as_slice())
    }
}

impl From<AnglePointTriple> for Vec<Point> {
    fn from(triple: AnglePointTriple) -> Self {
        triple.0.to_vec()
    }
}

/// Which of the two measurements of an angle is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleKind {
    /// The angle in [0, 180] degrees between the two arms
    #[default]
    Inner,
    /// 360 degrees minus the inner angle
    Outer,
}

impl AngleKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            AngleKind::Inner => "Inner",
            AngleKind::Outer => "Outer",
        }
    }

    /// The other kind.
    pub fn toggled(self) -> Self {
        match self {
            AngleKind::Inner => AngleKind::Outer,
            AngleKind::Outer => AngleKind::Inner,
        }
    }
}

/// Both measurements of a three-point angle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleMeasure {
    /// In [0, 180].
    pub inner: f64,
    /// Always `360 - inner`, so in [180, 360].
    pub outer: f64,
}

impl AngleMeasure {
    /// Select the measurement for a display kind.
    pub fn value(&self, kind: AngleKind) -> f64 {
        match kind {
            AngleKind::Inner => self.inner,
            AngleKind::Outer => self.outer,
        }
    }
}

// ============================================================================
// Angle Computation
// ============================================================================

/// Compute the angle at vertex `p2` formed by `p1` and `p3`.
///
/// Uses the arccos of the normalized dot product of the two arm vectors, with
/// the cosine clamped to [-1, 1] so floating-point overshoot cannot yield NaN.
/// The outer angle is the arithmetic complement to 360 degrees.
///
/// # Errors
/// [`GeometryError::Degenerate`] if `p1` or `p3` coincides with the vertex.
pub fn compute_angle(p1: Point, p2: Point, p3: Point) -> Result<AngleMeasure, GeometryError> {
    let (v1x, v1y) = p1.relative_to(&p2);
    let (v2x, v2y) = p3.relative_to(&p2);

    let mag1 = v1x.hypot(v1y);
    let mag2 = v2x.hypot(v2y);
    if mag1 == 0.0 || mag2 == 0.0 {
        return Err(GeometryError::Degenerate);
    }

    let dot = v1x * v2x + v1y * v2y;
    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    let inner = cos.acos().to_degrees();

    Ok(AngleMeasure {
        inner,
        outer: 360.0 - inner,
    })
}

/// Compute the angle for a point list that must hold exactly three points.
pub fn compute_angle_from_slice(points: &[Point]) -> Result<AngleMeasure, GeometryError> {
    AnglePointTriple::try_from(points)?.measure()
}

// ============================================================================
// Arc Rendering
// ============================================================================

/// Start/end bearings (radians) of the arc drawn at an angle's vertex.
///
/// Directly consumable by a canvas-style `arc(cx, cy, r, start, end, anticlockwise)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    pub start_angle: f64,
    pub end_angle: f64,
    /// The `anticlockwise` flag to use when drawing the outer angle.
    /// The inner angle is drawn with the complementary flag.
    pub sweep_flag_for_outer: bool,
}

impl ArcSpan {
    /// The `anticlockwise` flag to draw the given measurement.
    pub fn anticlockwise(&self, kind: AngleKind) -> bool {
        match kind {
            AngleKind::Inner => !self.sweep_flag_for_outer,
            AngleKind::Outer => self.sweep_flag_for_outer,
        }
    }

    /// Bearing through the middle of the drawn arc.
    pub fn mid_angle(&self, kind: AngleKind) -> f64 {
        let mid = (self.start_angle + self.end_angle) / 2.0;
        match kind {
            AngleKind::Inner => mid,
            AngleKind::Outer => mid + PI,
        }
    }
}

/// Choose which way to draw the arc at vertex `p2`.
///
/// The winding (sign of the cross product of the arms) decides which arm the
/// arc starts from; when the bearings differ by more than half a turn the
/// smaller bound is lifted by a full turn. Collinear points take whichever
/// branch the comparison yields.
pub fn choose_arc_direction(p1: Point, p2: Point, p3: Point) -> ArcSpan {
    let (v1x, v1y) = p1.relative_to(&p2);
    let (v2x, v2y) = p3.relative_to(&p2);

    let angle_to_p1 = v1y.atan2(v1x);
    let angle_to_p3 = v2y.atan2(v2x);
    let cross = v1x * v2y - v1y * v2x;

    let (mut start_angle, mut end_angle) = if cross > 0.0 {
        (angle_to_p1, angle_to_p3)
    } else {
        (angle_to_p3, angle_to_p1)
    };

    if (end_angle - start_angle).abs() > PI {
        if start_angle < end_angle {
            start_angle += TAU;
        } else {
            end_angle += TAU;
        }
    }

    ArcSpan {
        start_angle,
        end_angle,
        sweep_flag_for_outer: true,
    }
}

/// Arc direction for a point list that must hold exactly three points.
pub fn choose_arc_direction_from_slice(points: &[Point]) -> Result<ArcSpan, GeometryError> {
    Ok(AnglePointTriple::try_from(points)?.arc())
}

/// Position of the degree label for an arc, `distance` away from the vertex.
pub fn arc_label_position(vertex: Point, span: &ArcSpan, kind: AngleKind, distance: f64) -> Point {
    let mid = span.mid_angle(kind);
    Point::new(
        vertex.x + distance * mid.cos(),
        vertex.y + distance * mid.sin(),
    )
}

/// Everything needed to draw the arc and label of one angle.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcDrawing {
    /// The vertex.
    pub center: Point,
    pub radius: f64,
    pub span: ArcSpan,
    /// Flag for the displayed measurement.
    pub anticlockwise: bool,
    pub label_position: Point,
    pub label: String,
}

/// Lay out the arc and label for `triple` showing the `kind` measurement.
pub fn arc_drawing(
    triple: &AnglePointTriple,
    kind: AngleKind,
    radius: f64,
    label_distance: f64,
) -> Result<ArcDrawing, GeometryError> {
    let value = triple.measure()?.value(kind);
    let span = triple.arc();
    let center = triple.vertex();
    Ok(ArcDrawing {
        center,
        radius,
        span,
        anticlockwise: span.anticlockwise(kind),
        label_position: arc_label_position(center, &span, kind, label_distance),
        label: format_degrees(value),
    })
}

/// Label text for an angle value, e.g. `"90.0°"`.
pub fn format_degrees(degrees: f64) -> String {
    format!("{degrees:.1}°")
}

// ============================================================================
// Proximity
// ============================================================================

/// True iff `point` is strictly closer than `threshold` to `target`.
pub fn is_near_point(point: Point, target: Point, threshold: f64) -> bool {
    point.distance_to(&target) < threshold
}

/// Index of the first of `points` near `point`.
pub fn find_near_point(point: Point, points: &[Point], threshold: f64) -> Option<usize> {
    points
        .iter()
        .position(|target| is_near_point(point, *target, threshold))
}

// ============================================================================
// Tests
// ============================================================================
