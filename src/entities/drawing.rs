//! Drawing annotation objects.
//!
//! Objects are vector strokes in the live sheet's content space
//! (unscrolled document pixels). Each object is one of four kinds -
//! pen, line, rectangle, ellipse - with per-variant hit testing for the
//! eraser. Objects are immutable once committed; the only mutation is
//! whole-object removal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum bounding-box span (px, either axis) for a shape gesture to
/// count as deliberate rather than an accidental click.
pub const MIN_SHAPE_SPAN_PX: f32 = 3.0;

/// Toolbar tool selection. `Select` and `Eraser` never produce objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Select,
    Pen,
    Line,
    Rectangle,
    Ellipse,
    Eraser,
}

impl Tool {
    /// Object kind this tool draws, if any.
    pub fn object_kind(self) -> Option<ObjectKind> {
        match self {
            Tool::Pen => Some(ObjectKind::Pen),
            Tool::Line => Some(ObjectKind::Line),
            Tool::Rectangle => Some(ObjectKind::Rectangle),
            Tool::Ellipse => Some(ObjectKind::Ellipse),
            Tool::Select | Tool::Eraser => None,
        }
    }
}

/// Kind of committed drawing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Pen,
    Line,
    Rectangle,
    Ellipse,
}

/// One captured point, with stylus pressure when the device reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, pressure: None }
    }

    pub fn with_pressure(x: f32, y: f32, pressure: f32) -> Self {
        Self { x, y, pressure: Some(pressure) }
    }
}

/// Stroke color and base line width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// RGBA, unmultiplied.
    pub color: [u8; 4],
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { color: [255, 0, 0, 255], width: 2.0 }
    }
}

/// A committed (or in-progress) annotation object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingObject {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub kind: ObjectKind,
    pub style: StrokeStyle,
    pub points: Vec<StrokePoint>,
}

impl DrawingObject {
    pub fn new(kind: ObjectKind, style: StrokeStyle) -> Self {
        Self { id: Uuid::new_v4(), kind, style, points: Vec::new() }
    }

    /// Whether this gesture is a deliberate, committable object.
    ///
    /// Pen needs at least two captured points. Shapes need exactly the two
    /// anchor/endpoint captures plus a bounding box spanning at least
    /// [`MIN_SHAPE_SPAN_PX`] in one axis.
    pub fn is_commit_valid(&self) -> bool {
        match self.kind {
            ObjectKind::Pen => self.points.len() >= 2,
            ObjectKind::Line | ObjectKind::Rectangle | ObjectKind::Ellipse => {
                if self.points.len() != 2 {
                    return false;
                }
                let (p0, p1) = (self.points[0], self.points[1]);
                (p1.x - p0.x).abs() >= MIN_SHAPE_SPAN_PX
                    || (p1.y - p0.y).abs() >= MIN_SHAPE_SPAN_PX
            }
        }
    }

    /// Eraser hit test: is any part of this object within `radius` px of
    /// the point?
    pub fn hit_test(&self, x: f32, y: f32, radius: f32) -> bool {
        if self.points.is_empty() {
            return false;
        }
        match self.kind {
            ObjectKind::Pen => self.hit_test_pen(x, y, radius),
            ObjectKind::Line => {
                if self.points.len() < 2 {
                    return false;
                }
                let (p0, p1) = (self.points[0], self.points[1]);
                dist_point_to_segment(x, y, p0.x, p0.y, p1.x, p1.y) <= radius
            }
            ObjectKind::Rectangle => self.hit_test_rectangle(x, y, radius),
            ObjectKind::Ellipse => self.hit_test_ellipse(x, y, radius),
        }
    }

    fn hit_test_pen(&self, x: f32, y: f32, radius: f32) -> bool {
        for (i, p) in self.points.iter().enumerate() {
            if (p.x - x).hypot(p.y - y) <= radius {
                return true;
            }
            if i > 0 {
                let prev = self.points[i - 1];
                if dist_point_to_segment(x, y, prev.x, prev.y, p.x, p.y) <= radius {
                    return true;
                }
            }
        }
        false
    }

    fn hit_test_rectangle(&self, x: f32, y: f32, radius: f32) -> bool {
        if self.points.len() < 2 {
            return false;
        }
        let (p0, p1) = (self.points[0], self.points[1]);
        let left = p0.x.min(p1.x);
        let right = p0.x.max(p1.x);
        let top = p0.y.min(p1.y);
        let bottom = p0.y.max(p1.y);

        if x < left - radius || x > right + radius || y < top - radius || y > bottom + radius {
            return false;
        }
        // Inside the box counts as a hit.
        if x >= left && x <= right && y >= top && y <= bottom {
            return true;
        }
        // Near a vertical edge while inside its perpendicular span.
        if y >= top && y <= bottom && ((x - left).abs() <= radius || (x - right).abs() <= radius) {
            return true;
        }
        // Near a horizontal edge while inside its perpendicular span.
        if x >= left && x <= right && ((y - top).abs() <= radius || (y - bottom).abs() <= radius) {
            return true;
        }
        false
    }

    /// Approximate "inside or near boundary" test in normalized ellipse
    /// space. Intentionally not exact point-to-ellipse distance: the
    /// threshold is widened by `radius / min(rx, ry)`.
    fn hit_test_ellipse(&self, x: f32, y: f32, radius: f32) -> bool {
        if self.points.len() < 2 {
            return false;
        }
        let (p0, p1) = (self.points[0], self.points[1]);
        let cx = (p0.x + p1.x) / 2.0;
        let cy = (p0.y + p1.y) / 2.0;
        let rx = (p1.x - p0.x).abs() / 2.0;
        let ry = (p1.y - p0.y).abs() / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (x - cx) / rx;
        let ny = (y - cy) / ry;
        nx.hypot(ny) <= 1.0 + radius / rx.min(ry)
    }
}

/// Distance from a point to a line segment via projection and clamp.
pub fn dist_point_to_segment(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (px - x1).hypot(py - y1);
    }
    let t = (((px - x1) * dx + (py - y1) * dy) / len_sq).clamp(0.0, 1.0);
    (px - (x1 + t * dx)).hypot(py - (y1 + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(kind: ObjectKind, pts: &[(f32, f32)]) -> DrawingObject {
        let mut o = DrawingObject::new(kind, StrokeStyle::default());
        o.points = pts.iter().map(|&(x, y)| StrokePoint::new(x, y)).collect();
        o
    }

    #[test]
    fn test_pen_commit_needs_two_points() {
        assert!(!obj(ObjectKind::Pen, &[(0.0, 0.0)]).is_commit_valid());
        assert!(obj(ObjectKind::Pen, &[(0.0, 0.0), (1.0, 1.0)]).is_commit_valid());
    }

    #[test]
    fn test_shape_commit_rejects_tiny_bbox() {
        // <3px in both axes: accidental click.
        assert!(!obj(ObjectKind::Rectangle, &[(10.0, 10.0), (12.0, 12.0)]).is_commit_valid());
        assert!(!obj(ObjectKind::Ellipse, &[(10.0, 10.0), (12.9, 12.9)]).is_commit_valid());
        // >=3px in one axis is enough.
        assert!(obj(ObjectKind::Line, &[(10.0, 10.0), (13.0, 10.0)]).is_commit_valid());
        assert!(obj(ObjectKind::Rectangle, &[(10.0, 10.0), (10.0, 14.0)]).is_commit_valid());
    }

    #[test]
    fn test_shape_commit_rejects_wrong_point_count() {
        assert!(!obj(ObjectKind::Line, &[(0.0, 0.0)]).is_commit_valid());
        assert!(!obj(ObjectKind::Rectangle, &[(0.0, 0.0), (10.0, 10.0), (20.0, 20.0)])
            .is_commit_valid());
    }

    #[test]
    fn test_dist_point_to_segment() {
        assert_eq!(dist_point_to_segment(0.0, 5.0, 0.0, 0.0, 10.0, 0.0), 5.0);
        // Beyond the endpoint the distance clamps to the endpoint.
        assert_eq!(dist_point_to_segment(15.0, 0.0, 0.0, 0.0, 10.0, 0.0), 5.0);
        // Degenerate zero-length segment.
        assert_eq!(dist_point_to_segment(3.0, 4.0, 0.0, 0.0, 0.0, 0.0), 5.0);
    }

    #[test]
    fn test_pen_hit_on_segment_interior() {
        let o = obj(ObjectKind::Pen, &[(0.0, 0.0), (100.0, 0.0)]);
        assert!(o.hit_test(50.0, 3.0, 5.0)); // near the segment, far from points
        assert!(!o.hit_test(50.0, 20.0, 5.0));
    }

    #[test]
    fn test_rectangle_hit_inside_and_on_edge() {
        let o = obj(ObjectKind::Rectangle, &[(10.0, 10.0), (50.0, 40.0)]);
        assert!(o.hit_test(30.0, 25.0, 5.0)); // inside
        assert!(o.hit_test(30.0, 10.0, 5.0)); // on top edge
        assert!(o.hit_test(52.0, 25.0, 5.0)); // near right edge, within span
        assert!(!o.hit_test(60.0, 50.0, 5.0)); // outside corner diagonal
    }

    #[test]
    fn test_ellipse_hit_approximate_boundary() {
        let o = obj(ObjectKind::Ellipse, &[(0.0, 0.0), (100.0, 50.0)]);
        assert!(o.hit_test(50.0, 25.0, 5.0)); // center
        assert!(o.hit_test(98.0, 25.0, 5.0)); // near boundary on major axis
        assert!(!o.hit_test(200.0, 25.0, 5.0));
    }

    #[test]
    fn test_degenerate_ellipse_never_hits() {
        let o = obj(ObjectKind::Ellipse, &[(10.0, 10.0), (10.0, 40.0)]);
        assert!(!o.hit_test(10.0, 25.0, 5.0));
    }

    #[test]
    fn test_serde_round_trip_with_pressure() {
        let mut o = DrawingObject::new(ObjectKind::Pen, StrokeStyle::default());
        o.points.push(StrokePoint::with_pressure(1.0, 2.0, 0.7));
        o.points.push(StrokePoint::new(3.0, 4.0));
        let json = serde_json::to_string(&o).unwrap();
        let back: DrawingObject = serde_json::from_str(&json).unwrap();
        assert_eq!(o, back);
        // Kind serializes as the lowercase tool name.
        assert!(json.contains("\"pen\""));
    }
}
