//! Export preview window.
//!
//! Replays a built [`ExportPage`] inside an egui window: table grid,
//! header fields, cell text and the page's draw-command list through the
//! same painter surface the live sheet uses. What this window shows is
//! exactly what a rasterizer backend receives.

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, pos2, vec2};

use crate::entities::project::{ColumnKind, COLUMNS};
use crate::export::{ExportPage, RowRule, SheetLayout};
use crate::render::surface::Surface;

use super::painter_surface::PainterSurface;

/// Renders the preview window. Returns false once the user closes it.
pub fn render_export_preview(ctx: &egui::Context, page: &ExportPage) -> bool {
    let mut open = true;
    egui::Window::new("Export Preview")
        .open(&mut open)
        .default_size(vec2(page.geometry.width + 40.0, 600.0))
        .show(ctx, |ui| {
            ui.label(format!(
                "{} — page {} — {}",
                page.project_name, page.metadata.page_number, page.metadata.date
            ));
            egui::ScrollArea::both().show(ui, |ui| {
                draw_page(ui, page);
            });
        });
    open
}

fn draw_page(ui: &mut egui::Ui, page: &ExportPage) {
    let total_h = page.geometry.header_height + page.geometry.body_height;
    let (rect, _) =
        ui.allocate_exact_size(vec2(page.geometry.width, total_h), Sense::hover());
    let painter = ui.painter().with_clip_rect(rect.intersect(ui.clip_rect()));
    painter.rect_filled(rect, 0.0, Color32::WHITE);

    let x_scale = page.geometry.width / SheetLayout::table_width();
    let body_top = rect.min.y + page.geometry.header_height;
    let line = Color32::from_gray(120);

    // Column titles and separators.
    let mut x = rect.min.x;
    for col in COLUMNS {
        let w = col.width * x_scale;
        painter.text(
            pos2(x + w / 2.0, rect.min.y + page.geometry.header_height / 2.0),
            Align2::CENTER_CENTER,
            col.title,
            FontId::proportional(9.0),
            Color32::BLACK,
        );
        x += w;
        painter.vline(x, rect.min.y..=rect.max.y, (0.5, line));
    }
    painter.hline(rect.x_range(), body_top, (1.0, line));

    // Rows: weighted grid line, frame numbers and cell text.
    for row in &page.rows {
        let i = row.frame_number - 1;
        let y = body_top + i as f32 * page.row_height;
        let rule = RowRule::for_row(i, page.metadata.fps);
        let color = match rule {
            RowRule::Second => Color32::from_gray(60),
            RowRule::Eighth => Color32::from_gray(95),
            RowRule::Plain => line,
        };
        painter.hline(rect.x_range(), y, (rule.line_width(), color));
        let cy = y + page.row_height / 2.0;
        let mut cx = rect.min.x;
        for col in COLUMNS {
            let w = col.width * x_scale;
            match col.kind {
                ColumnKind::FrameNumber => {
                    painter.text(
                        pos2(cx + w / 2.0, cy),
                        Align2::CENTER_CENTER,
                        row.frame_number.to_string(),
                        FontId::monospace(8.0),
                        Color32::BLACK,
                    );
                }
                ColumnKind::Text(field) => {
                    let text = row.cells.get(field);
                    if !text.is_empty() {
                        let cell = Rect::from_min_size(
                            pos2(cx + 1.0, y),
                            vec2(w - 2.0, page.row_height),
                        );
                        painter.with_clip_rect(cell).text(
                            pos2(cell.min.x, cy),
                            Align2::LEFT_CENTER,
                            text,
                            FontId::proportional(8.0),
                            Color32::BLACK,
                        );
                    }
                }
                ColumnKind::Waveform => {}
            }
            cx += w;
        }
    }
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, line),
        egui::epaint::StrokeKind::Inside,
    );

    // Waveform column and reprojected annotations, already in page space.
    let mut surface = PainterSurface::new(&painter, rect.min);
    for cmd in &page.commands {
        match cmd {
            crate::render::surface::DrawCmd::Polyline { points, stroke } => {
                surface.stroke_polyline(points, *stroke);
            }
            crate::render::surface::DrawCmd::Polygon { points, fill, stroke } => {
                surface.fill_polygon(points, *fill, *stroke);
            }
        }
    }
}
