//! Top toolbar: file actions, tool palette, stroke settings and sheet
//! parameters.

use eframe::egui;

use crate::app::XSheetApp;
use crate::entities::drawing::Tool;

const TOOLS: &[(Tool, &str)] = &[
    (Tool::Select, "Select"),
    (Tool::Pen, "Pen"),
    (Tool::Line, "Line"),
    (Tool::Rectangle, "Rect"),
    (Tool::Ellipse, "Ellipse"),
    (Tool::Eraser, "Eraser"),
];

pub fn render_toolbar(ctx: &egui::Context, app: &mut XSheetApp) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            if ui.button("New").clicked() {
                app.new_project();
            }
            if ui.button("Open…").clicked() {
                app.open_project_dialog();
            }
            if ui.button("Save").clicked() {
                app.save_project();
            }
            if ui.button("Save As…").clicked() {
                app.save_project_as();
            }
            ui.separator();
            if ui.button("Load Audio…").clicked() {
                app.load_audio_dialog();
            }
            if ui
                .add_enabled(app.project.audio.is_loaded(), egui::Button::new("Clear Audio"))
                .clicked()
            {
                app.project.clear_audio();
            }
            ui.separator();
            if ui.button("Sheet Info…").clicked() {
                app.show_sheet_info = !app.show_sheet_info;
            }
            if ui.button("Export…").clicked() {
                app.begin_export();
            }
            ui.separator();

            for &(tool, label) in TOOLS {
                if ui.selectable_label(app.tools.tool == tool, label).clicked() {
                    app.select_tool(tool);
                }
            }
            ui.separator();

            let mut color = egui::Color32::from_rgba_unmultiplied(
                app.tools.color[0],
                app.tools.color[1],
                app.tools.color[2],
                app.tools.color[3],
            );
            if ui.color_edit_button_srgba(&mut color).changed() {
                app.tools.color = [color.r(), color.g(), color.b(), color.a()];
            }
            ui.add(
                egui::Slider::new(&mut app.tools.width, 0.5..=12.0)
                    .text("px")
                    .fixed_decimals(1),
            );
            ui.separator();

            ui.label("fps");
            let mut fps = app.project.metadata.fps;
            if ui
                .add(egui::DragValue::new(&mut fps).range(1.0..=120.0).speed(1.0))
                .changed()
            {
                app.project.set_fps(fps);
            }
            ui.label("frames");
            let mut frames = app.project.frame_count;
            if ui
                .add(egui::DragValue::new(&mut frames).range(1..=9999))
                .changed()
            {
                app.project.set_frame_count(frames);
            }
            ui.separator();

            if ui
                .add_enabled(app.project.drawing.has_objects(), egui::Button::new("Clear Drawings"))
                .clicked()
            {
                app.confirm_clear = true;
            }
        });
    });

    render_sheet_info(ctx, app);

    if app.confirm_clear {
        render_confirm_clear(ctx, app);
    }
}

/// Header metadata editor. Everything here lands on the exported page.
fn render_sheet_info(ctx: &egui::Context, app: &mut XSheetApp) {
    if !app.show_sheet_info {
        return;
    }
    let mut open = app.show_sheet_info;
    egui::Window::new("Sheet Info")
        .open(&mut open)
        .resizable(false)
        .show(ctx, |ui| {
            let mut changed = false;
            egui::Grid::new("sheet_info_grid").num_columns(2).show(ui, |ui| {
                changed |= info_row(ui, "Project", &mut app.project.project_name);
                changed |= info_row(ui, "Project #", &mut app.project.metadata.project_number);
                changed |= info_row(ui, "Shot #", &mut app.project.metadata.shot_number);
                changed |= info_row(ui, "Animator", &mut app.project.metadata.animator_name);
                changed |= info_row(ui, "Date", &mut app.project.metadata.date);
                changed |= info_row(ui, "Page #", &mut app.project.metadata.page_number);
                changed |= info_row(ui, "Version", &mut app.project.metadata.version_number);
            });
            if changed {
                app.project.modified = true;
            }
        });
    app.show_sheet_info = open;
}

fn info_row(ui: &mut egui::Ui, label: &str, value: &mut String) -> bool {
    ui.label(label);
    let changed = ui.text_edit_singleline(value).changed();
    ui.end_row();
    changed
}

fn render_confirm_clear(ctx: &egui::Context, app: &mut XSheetApp) {
    egui::Window::new("Clear all drawings?")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label("This removes every annotation on every layer.");
            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    app.project.clear_all_drawings();
                    app.confirm_clear = false;
                }
                if ui.button("Cancel").clicked() {
                    app.confirm_clear = false;
                }
            });
        });
}
