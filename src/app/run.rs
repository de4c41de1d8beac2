//! Main frame update - eframe::App implementation.

use eframe::egui;
use log::trace;

use crate::widgets::{export_preview, sheet, toolbar};

use super::XSheetApp;

impl eframe::App for XSheetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Toolbar edits land in `tools`; the engine picks them up here so
        // a stroke started this frame already has the new color/width.
        self.engine.settings.color = self.tools.color;
        self.engine.settings.width = self.tools.width;

        self.handle_events(ctx);

        toolbar::render_toolbar(ctx, self);
        self.status.render(ctx, &self.project);
        egui::CentralPanel::default().show(ctx, |ui| {
            sheet::render_sheet(ui, self);
        });

        let keep = match &self.export_page {
            Some(page) => export_preview::render_export_preview(ctx, page),
            None => true,
        };
        if !keep {
            self.export_page = None;
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(json) = serde_json::to_string(self) {
            storage.set_string(eframe::APP_KEY, json);
            trace!(
                "app state saved: {} frames, tool {:?}",
                self.project.frame_count,
                self.tools.tool
            );
        }
    }
}
