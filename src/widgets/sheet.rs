//! The exposure sheet grid.
//!
//! One scrollable table: header strip, frame rows with editable text
//! cells, the live waveform column and the annotation overlay on top.
//! Rows are painted manually from the visible viewport slice, so a
//! thousand-frame sheet costs the same as a short one.
//!
//! Input routing follows the active tool: with the select tool the text
//! cells are editable and the waveform column scrubs; with any drawing
//! tool the overlay owns the pointer and cells render as plain text.

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, pos2, vec2};

use crate::annotate::pointer::{PointerDevice, PointerInput, PointerPhase};
use crate::app::XSheetApp;
use crate::core::events::AppEvent;
use crate::entities::drawing::Tool;
use crate::entities::project::{ColumnKind, COLUMNS};
use crate::export::{RowRule, SheetLayout};
use crate::render::surface::draw_object;
use crate::waveform::{render_waveform, WaveformLayout, WaveformStyle};

use super::painter_surface::PainterSurface;

const GRID_LINE: Color32 = Color32::from_gray(60);
const GRID_LINE_SECOND: Color32 = Color32::from_gray(140);
const GRID_LINE_EIGHTH: Color32 = Color32::from_gray(95);
const HEADER_BG: Color32 = Color32::from_gray(40);
const ROW_HIGHLIGHT: Color32 = Color32::from_rgba_premultiplied(60, 60, 20, 60);
const CELL_TEXT: Color32 = Color32::from_gray(210);

/// Single stable id for the one mouse/pen pointer stream egui exposes.
const POINTER_STREAM_ID: u64 = 0;

pub fn render_sheet(ui: &mut egui::Ui, app: &mut XSheetApp) {
    let layout = SheetLayout::default();
    let table_w = SheetLayout::table_width();

    draw_header(ui, layout.header_height, table_w);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show_viewport(ui, |ui, viewport| {
            let row_h = layout.row_height;
            let frame_count = app.project.frame_count;
            let total_h = frame_count as f32 * row_h;
            let (rect, _bg) =
                ui.allocate_exact_size(vec2(table_w, total_h), Sense::hover());
            let painter = ui.painter().with_clip_rect(rect.intersect(ui.clip_rect()));

            let first_row = ((viewport.min.y / row_h).floor().max(0.0)) as usize;
            let last_row = (((viewport.max.y / row_h).ceil()) as usize).min(frame_count);

            draw_row_highlight(app, &painter, rect, row_h, first_row, last_row);
            draw_grid(app, &painter, rect, row_h, table_w, first_row, last_row, viewport);
            draw_cells(ui, app, rect, row_h, first_row, last_row);
            draw_waveform_column(ui, app, rect, row_h, viewport);
            draw_overlay(ui, app, rect);
        });
}

fn draw_header(ui: &mut egui::Ui, header_h: f32, table_w: f32) {
    let (rect, _) = ui.allocate_exact_size(vec2(table_w, header_h), Sense::hover());
    let painter = ui.painter().with_clip_rect(rect);
    painter.rect_filled(rect, 0.0, HEADER_BG);
    let mut x = rect.min.x;
    for col in COLUMNS {
        painter.text(
            pos2(x + col.width / 2.0, rect.center().y),
            Align2::CENTER_CENTER,
            col.title,
            FontId::proportional(12.0),
            Color32::from_gray(220),
        );
        x += col.width;
        painter.vline(x, rect.y_range(), (1.0, GRID_LINE));
    }
    painter.hline(rect.x_range(), rect.max.y, (1.0, GRID_LINE_SECOND));
}

fn draw_row_highlight(
    app: &XSheetApp,
    painter: &egui::Painter,
    rect: Rect,
    row_h: f32,
    first_row: usize,
    last_row: usize,
) {
    if !app.project.audio.is_loaded() {
        return;
    }
    let frame = app.project.timeline().frame_for_time(app.project.audio.current_time);
    if frame >= first_row && frame < last_row {
        let y = rect.min.y + frame as f32 * row_h;
        painter.rect_filled(
            Rect::from_min_size(pos2(rect.min.x, y), vec2(rect.width(), row_h)),
            0.0,
            ROW_HIGHLIGHT,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_grid(
    app: &XSheetApp,
    painter: &egui::Painter,
    rect: Rect,
    row_h: f32,
    table_w: f32,
    first_row: usize,
    last_row: usize,
    viewport: Rect,
) {
    // Horizontal row lines, weighted like the export table.
    for i in first_row..=last_row {
        let y = rect.min.y + i as f32 * row_h;
        let rule = RowRule::for_row(i, app.project.metadata.fps);
        let color = match rule {
            RowRule::Second => GRID_LINE_SECOND,
            RowRule::Eighth => GRID_LINE_EIGHTH,
            RowRule::Plain => GRID_LINE,
        };
        painter.hline(rect.min.x..=rect.min.x + table_w, y, (rule.line_width(), color));
    }

    // Vertical column separators across the visible slice.
    let y_top = rect.min.y + viewport.min.y;
    let y_bottom = rect.min.y + viewport.max.y.min(rect.height());
    let mut x = rect.min.x;
    for col in COLUMNS {
        x += col.width;
        painter.vline(x, y_top..=y_bottom, (1.0, GRID_LINE_EIGHTH));
    }
    painter.vline(rect.min.x, y_top..=y_bottom, (1.0, GRID_LINE_EIGHTH));

    // Frame numbers, 1-based like a paper sheet.
    for i in first_row..last_row {
        let cy = rect.min.y + (i as f32 + 0.5) * row_h;
        let mut cx = rect.min.x;
        for col in COLUMNS {
            if col.kind == ColumnKind::FrameNumber {
                painter.text(
                    pos2(cx + col.width / 2.0, cy),
                    Align2::CENTER_CENTER,
                    (i + 1).to_string(),
                    FontId::monospace(11.0),
                    Color32::from_gray(170),
                );
            }
            cx += col.width;
        }
    }
}

fn draw_cells(
    ui: &mut egui::Ui,
    app: &mut XSheetApp,
    rect: Rect,
    row_h: f32,
    first_row: usize,
    last_row: usize,
) {
    let editable = app.tools.tool == Tool::Select;
    for frame in first_row..last_row {
        let y = rect.min.y + frame as f32 * row_h;
        let mut x = rect.min.x;
        for (col_idx, col) in COLUMNS.iter().enumerate() {
            if let ColumnKind::Text(field) = col.kind {
                let cell = Rect::from_min_size(pos2(x + 2.0, y), vec2(col.width - 4.0, row_h));
                if editable {
                    let mut text = app.project.cell(frame, field).to_string();
                    let resp = ui.put(
                        cell,
                        egui::TextEdit::singleline(&mut text)
                            .id_salt((frame, col_idx))
                            .frame(false)
                            .font(FontId::proportional(11.0)),
                    );
                    if resp.changed() {
                        app.project.set_cell(frame, field, text);
                    }
                } else {
                    let text = app.project.cell(frame, field);
                    if !text.is_empty() {
                        ui.painter().with_clip_rect(cell).text(
                            pos2(cell.min.x, cell.center().y),
                            Align2::LEFT_CENTER,
                            text,
                            FontId::proportional(11.0),
                            CELL_TEXT,
                        );
                    }
                }
            }
            x += col.width;
        }
    }
}

fn draw_waveform_column(
    ui: &mut egui::Ui,
    app: &mut XSheetApp,
    rect: Rect,
    row_h: f32,
    viewport: Rect,
) {
    let Some(envelope) = app.project.envelope.clone() else {
        return;
    };
    let (col_x, col_w) = SheetLayout::waveform_column();
    let visible = Rect::from_min_size(
        pos2(rect.min.x + col_x, rect.min.y + viewport.min.y),
        vec2(col_w, viewport.height()),
    )
    .intersect(rect);

    let timeline = app.project.timeline();
    let layout = WaveformLayout {
        width: col_w,
        row_height: row_h,
        scroll_offset: viewport.min.y,
        clip_height: visible.height(),
    };
    let painter = ui.painter().with_clip_rect(visible.intersect(ui.clip_rect()));
    let mut surface = PainterSurface::new(&painter, visible.min);
    render_waveform(
        &envelope,
        &timeline,
        &layout,
        &WaveformStyle::default(),
        Some(app.project.audio.current_time),
        &mut surface,
    );

    // Scrubbing only while the select tool is active; drawing tools own
    // the pointer over the whole table.
    if app.tools.tool != Tool::Select {
        return;
    }
    let resp = ui.interact(visible, ui.id().with("waveform_scrub"), Sense::drag());
    let phase = pointer_phase(&resp);
    let Some((phase, pos)) = phase.zip(resp.interact_pointer_pos()) else {
        return;
    };
    // Strip-space y: content coordinates, scroll already folded into rect.
    let ev = PointerInput::mouse(POINTER_STREAM_ID, phase, pos.x - rect.min.x, pos.y - rect.min.y);
    let out = app.scrub.handle_pointer(ev, &timeline, row_h, app.transport.as_mut());
    if let Some(t) = out.time {
        app.project.set_playback_position(t);
        app.bus.emit(AppEvent::PlaybackPositionChanged { time: t, visual_only: !out.snippet });
        ui.ctx().request_repaint();
    }
}

fn draw_overlay(ui: &mut egui::Ui, app: &mut XSheetApp, rect: Rect) {
    // Committed objects and the in-progress preview, whole-table space.
    let painter = ui.painter().with_clip_rect(rect.intersect(ui.clip_rect()));
    let mut surface = PainterSurface::new(&painter, rect.min);
    for layer in app.project.drawing.visible_layers() {
        for obj in &layer.objects {
            draw_object(obj, &mut surface);
        }
    }
    if let Some(obj) = app.engine.current_object() {
        draw_object(obj, &mut surface);
    }

    if app.tools.tool == Tool::Select {
        return;
    }
    let resp = ui.interact(rect, ui.id().with("annotation_overlay"), Sense::drag());
    let Some((phase, pos)) = pointer_phase(&resp).zip(resp.interact_pointer_pos()) else {
        return;
    };
    let mut ev =
        PointerInput::mouse(POINTER_STREAM_ID, phase, pos.x - rect.min.x, pos.y - rect.min.y);
    if let Some(force) = latest_touch_force(ui) {
        ev.device = PointerDevice::Pen;
        ev.pressure = Some(force);
    }
    let out = app.engine.handle_pointer(ev, &mut app.project.drawing, &mut app.grab);
    if out.committed || out.erased {
        app.project.modified = true;
        app.bus.emit(AppEvent::DrawingChanged {
            layer: Some(app.project.drawing.active_layer_index),
        });
    }
    if out.redraw {
        ui.ctx().request_repaint();
    }
}

/// Translates a drag-sensed response into a pointer phase. With a pure
/// drag sense the press itself starts the drag, so a stationary tap still
/// produces Down then Up and reaches the eraser and the scrubber.
fn pointer_phase(resp: &egui::Response) -> Option<PointerPhase> {
    if resp.drag_started() {
        Some(PointerPhase::Down)
    } else if resp.drag_stopped() {
        Some(PointerPhase::Up)
    } else if resp.dragged() {
        Some(PointerPhase::Move)
    } else {
        None
    }
}

/// Stylus pressure from the most recent touch event this frame, if any.
fn latest_touch_force(ui: &egui::Ui) -> Option<f32> {
    ui.input(|i| {
        i.events.iter().rev().find_map(|e| match e {
            egui::Event::Touch { force, .. } => *force,
            _ => None,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{PointerButton, RawInput};

    fn button(pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: pos2(60.0, 60.0),
            button: PointerButton::Primary,
            pressed,
            modifiers: Default::default(),
        }
    }

    fn run_frame(ctx: &egui::Context, events: Vec<egui::Event>, phases: &mut Vec<PointerPhase>) {
        let input = RawInput { events, ..Default::default() };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let resp = ui.interact(
                    Rect::from_min_size(pos2(0.0, 0.0), vec2(300.0, 300.0)),
                    ui.id().with("tap_target"),
                    Sense::drag(),
                );
                if let Some(p) = pointer_phase(&resp) {
                    phases.push(p);
                }
            });
        });
    }

    // A stationary tap has to surface as Down then Up: the eraser erases
    // at the press point and the scrubber seeks without any movement.
    #[test]
    fn test_stationary_tap_yields_down_then_up() {
        let ctx = egui::Context::default();
        let mut phases = Vec::new();
        // Widgets become interactive one frame after they first appear.
        run_frame(&ctx, vec![], &mut phases);
        run_frame(&ctx, vec![button(true)], &mut phases);
        run_frame(&ctx, vec![button(false)], &mut phases);
        assert_eq!(phases, vec![PointerPhase::Down, PointerPhase::Up]);
    }

    #[test]
    fn test_held_pointer_reports_moves() {
        let ctx = egui::Context::default();
        let mut phases = Vec::new();
        run_frame(&ctx, vec![], &mut phases);
        run_frame(&ctx, vec![button(true)], &mut phases);
        run_frame(&ctx, vec![egui::Event::PointerMoved(pos2(80.0, 90.0))], &mut phases);
        run_frame(&ctx, vec![button(false)], &mut phases);
        assert_eq!(
            phases,
            vec![PointerPhase::Down, PointerPhase::Move, PointerPhase::Up]
        );
    }
}
