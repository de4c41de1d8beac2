//! Backend-neutral 2D stroke surface.
//!
//! Live rendering paints through an egui painter; export rendering records
//! into a [`RecordingSurface`] whose command list is handed to the PDF
//! rasterizer collaborator. Both go through the same [`Surface`] trait and
//! the same per-tool path construction, so live view and export cannot
//! diverge.

use serde::{Deserialize, Serialize};

use crate::entities::drawing::{DrawingObject, ObjectKind, StrokePoint};

/// Segments used to approximate an ellipse outline.
pub const ELLIPSE_SEGMENTS: usize = 64;

/// Pressure assumed for devices that do not report it (mouse, touch).
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// Stroke parameters for one path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f32,
    /// RGBA, unmultiplied.
    pub color: [u8; 4],
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCmd {
    /// Open polyline stroked with round caps/joins.
    Polyline { points: Vec<[f32; 2]>, stroke: Stroke },
    /// Closed polygon, filled then stroked.
    Polygon { points: Vec<[f32; 2]>, fill: [u8; 4], stroke: Stroke },
}

/// Minimal stroke surface every renderer targets.
pub trait Surface {
    fn stroke_polyline(&mut self, points: &[[f32; 2]], stroke: Stroke);
    fn fill_polygon(&mut self, points: &[[f32; 2]], fill: [u8; 4], stroke: Stroke);
}

/// Surface that records commands instead of painting.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCmd>,
}

impl Surface for RecordingSurface {
    fn stroke_polyline(&mut self, points: &[[f32; 2]], stroke: Stroke) {
        if points.len() >= 2 {
            self.commands.push(DrawCmd::Polyline { points: points.to_vec(), stroke });
        }
    }

    fn fill_polygon(&mut self, points: &[[f32; 2]], fill: [u8; 4], stroke: Stroke) {
        if points.len() >= 3 {
            self.commands.push(DrawCmd::Polygon { points: points.to_vec(), fill, stroke });
        }
    }
}

/// Pressure-modulated line width:
/// `base * clamp(0.5 + pressure, 0.3, 1.5)`.
pub fn effective_line_width(base_width: f32, pressure: f32) -> f32 {
    base_width * (0.5 + pressure).clamp(0.3, 1.5)
}

/// Draw one object with its own style, honoring per-point pen pressure.
pub fn draw_object(obj: &DrawingObject, surface: &mut dyn Surface) {
    draw_object_with_width(obj, obj.style.width, true, surface);
}

/// Draw one object at an explicit uniform width, ignoring pressure.
/// The export reprojection path uses this with its scaled, clamped width.
pub fn draw_object_uniform(obj: &DrawingObject, width: f32, surface: &mut dyn Surface) {
    draw_object_with_width(obj, width, false, surface);
}

fn draw_object_with_width(
    obj: &DrawingObject,
    width: f32,
    use_pressure: bool,
    surface: &mut dyn Surface,
) {
    if obj.points.is_empty() {
        return;
    }
    let color = obj.style.color;

    match obj.kind {
        ObjectKind::Pen => {
            let has_pressure = use_pressure && obj.points.iter().any(|p| p.pressure.is_some());
            if has_pressure && obj.points.len() > 1 {
                // Discrete segments, each at the width implied by the mean
                // of its endpoint pressures.
                for pair in obj.points.windows(2) {
                    let p0 = pair[0].pressure.unwrap_or(DEFAULT_PRESSURE);
                    let p1 = pair[1].pressure.unwrap_or(DEFAULT_PRESSURE);
                    let seg_width = effective_line_width(width, (p0 + p1) / 2.0);
                    surface.stroke_polyline(
                        &[[pair[0].x, pair[0].y], [pair[1].x, pair[1].y]],
                        Stroke { width: seg_width, color },
                    );
                }
            } else {
                let pts: Vec<[f32; 2]> = obj.points.iter().map(|p| [p.x, p.y]).collect();
                surface.stroke_polyline(&pts, Stroke { width, color });
            }
        }
        ObjectKind::Line => {
            if obj.points.len() >= 2 {
                let (a, b) = (obj.points[0], obj.points[1]);
                surface.stroke_polyline(&[[a.x, a.y], [b.x, b.y]], Stroke { width, color });
            }
        }
        ObjectKind::Rectangle => {
            if obj.points.len() >= 2 {
                let (a, b) = (obj.points[0], obj.points[1]);
                surface.stroke_polyline(
                    &[[a.x, a.y], [b.x, a.y], [b.x, b.y], [a.x, b.y], [a.x, a.y]],
                    Stroke { width, color },
                );
            }
        }
        ObjectKind::Ellipse => {
            if obj.points.len() >= 2 {
                let pts = ellipse_outline(obj.points[0], obj.points[1]);
                surface.stroke_polyline(&pts, Stroke { width, color });
            }
        }
    }
}

/// Closed polyline approximating the ellipse inscribed in the bounding box
/// of two corner points.
fn ellipse_outline(p0: StrokePoint, p1: StrokePoint) -> Vec<[f32; 2]> {
    let cx = (p0.x + p1.x) / 2.0;
    let cy = (p0.y + p1.y) / 2.0;
    let rx = (p1.x - p0.x).abs() / 2.0;
    let ry = (p1.y - p0.y).abs() / 2.0;
    let mut pts = Vec::with_capacity(ELLIPSE_SEGMENTS + 1);
    for i in 0..=ELLIPSE_SEGMENTS {
        let a = (i as f32 / ELLIPSE_SEGMENTS as f32) * std::f32::consts::TAU;
        pts.push([cx + rx * a.cos(), cy + ry * a.sin()]);
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::drawing::{DrawingObject, StrokeStyle};

    fn pen(points: Vec<StrokePoint>) -> DrawingObject {
        let mut o = DrawingObject::new(
            ObjectKind::Pen,
            StrokeStyle { color: [0, 0, 0, 255], width: 4.0 },
        );
        o.points = points;
        o
    }

    #[test]
    fn test_effective_width_clamps() {
        assert_eq!(effective_line_width(4.0, 0.5), 4.0); // 0.5+0.5 = 1.0x
        assert_eq!(effective_line_width(4.0, 0.0), 2.0); // 0.5x
        assert_eq!(effective_line_width(4.0, 2.0), 6.0); // clamped to 1.5x
        assert_eq!(effective_line_width(10.0, -1.0), 3.0); // clamped to 0.3x
    }

    #[test]
    fn test_pressure_pen_emits_per_segment_widths() {
        // Points (0,0,p=0.2) and (10,0,p=0.8), base 4: avg pressure 0.5,
        // effective segment width 4 * clamp(1.0) = 4.
        let o = pen(vec![
            StrokePoint::with_pressure(0.0, 0.0, 0.2),
            StrokePoint::with_pressure(10.0, 0.0, 0.8),
        ]);
        let mut rec = RecordingSurface::default();
        draw_object(&o, &mut rec);
        assert_eq!(rec.commands.len(), 1);
        match &rec.commands[0] {
            DrawCmd::Polyline { points, stroke } => {
                assert_eq!(points.len(), 2);
                assert_eq!(stroke.width, 4.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_pressureless_pen_is_single_polyline() {
        let o = pen(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(5.0, 5.0),
            StrokePoint::new(10.0, 0.0),
        ]);
        let mut rec = RecordingSurface::default();
        draw_object(&o, &mut rec);
        assert_eq!(rec.commands.len(), 1);
        match &rec.commands[0] {
            DrawCmd::Polyline { points, stroke } => {
                assert_eq!(points.len(), 3);
                assert_eq!(stroke.width, 4.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_uniform_draw_ignores_pressure() {
        let o = pen(vec![
            StrokePoint::with_pressure(0.0, 0.0, 1.0),
            StrokePoint::with_pressure(10.0, 0.0, 1.0),
        ]);
        let mut rec = RecordingSurface::default();
        draw_object_uniform(&o, 7.0, &mut rec);
        match &rec.commands[0] {
            DrawCmd::Polyline { stroke, .. } => assert_eq!(stroke.width, 7.0),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rectangle_closes_path() {
        let mut o =
            DrawingObject::new(ObjectKind::Rectangle, StrokeStyle { color: [0; 4], width: 2.0 });
        o.points = vec![StrokePoint::new(0.0, 0.0), StrokePoint::new(10.0, 20.0)];
        let mut rec = RecordingSurface::default();
        draw_object(&o, &mut rec);
        match &rec.commands[0] {
            DrawCmd::Polyline { points, .. } => {
                assert_eq!(points.len(), 5);
                assert_eq!(points.first(), points.last());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ellipse_outline_closed_and_bounded() {
        let mut o =
            DrawingObject::new(ObjectKind::Ellipse, StrokeStyle { color: [0; 4], width: 2.0 });
        o.points = vec![StrokePoint::new(0.0, 0.0), StrokePoint::new(100.0, 50.0)];
        let mut rec = RecordingSurface::default();
        draw_object(&o, &mut rec);
        match &rec.commands[0] {
            DrawCmd::Polyline { points, .. } => {
                assert_eq!(points.len(), ELLIPSE_SEGMENTS + 1);
                let first = points.first().unwrap();
                let last = points.last().unwrap();
                assert!((first[0] - last[0]).abs() < 1e-4);
                for p in points {
                    assert!((0.0..=100.0).contains(&p[0]));
                    assert!((0.0..=50.0).contains(&p[1]));
                }
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
