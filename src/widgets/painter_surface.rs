//! egui painter adapter for the backend-neutral surface.

use eframe::egui;

use crate::render::surface::{Stroke, Surface};

fn color32(c: [u8; 4]) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

/// Paints surface commands through an egui painter, offset by `origin`.
/// The caller is responsible for clipping.
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2) -> Self {
        Self { painter, origin }
    }

    fn map(&self, points: &[[f32; 2]]) -> Vec<egui::Pos2> {
        points
            .iter()
            .map(|p| egui::pos2(self.origin.x + p[0], self.origin.y + p[1]))
            .collect()
    }
}

impl Surface for PainterSurface<'_> {
    fn stroke_polyline(&mut self, points: &[[f32; 2]], stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        self.painter.add(egui::Shape::line(
            self.map(points),
            egui::Stroke::new(stroke.width, color32(stroke.color)),
        ));
    }

    fn fill_polygon(&mut self, points: &[[f32; 2]], fill: [u8; 4], stroke: Stroke) {
        if points.len() < 3 {
            return;
        }
        self.painter.add(egui::Shape::Path(egui::epaint::PathShape {
            points: self.map(points),
            closed: true,
            fill: color32(fill),
            stroke: egui::epaint::PathStroke::new(stroke.width, color32(stroke.color)),
        }));
    }
}
