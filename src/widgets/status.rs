//! Bottom status bar.

use eframe::egui;

use crate::entities::Project;

/// How long a transient status message stays visible.
const MESSAGE_TIMEOUT_S: f64 = 5.0;

#[derive(Default)]
pub struct StatusBar {
    message: String,
    message_at: f64,
}

impl StatusBar {
    pub fn set_message(&mut self, ctx: &egui::Context, message: impl Into<String>) {
        self.message = message.into();
        self.message_at = ctx.input(|i| i.time);
    }

    pub fn render(&mut self, ctx: &egui::Context, project: &Project) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let modified = if project.modified { "*" } else { "" };
                ui.monospace(format!("{}{}", project.project_name, modified));
                ui.separator();
                ui.monospace(format!(
                    "{} frames @ {:.0} fps",
                    project.frame_count, project.metadata.fps
                ));
                ui.separator();
                if project.audio.is_loaded() {
                    let name = project.audio.file_name.as_deref().unwrap_or("audio");
                    ui.monospace(format!(
                        "{} {:.2}s @ {} Hz | {:.2}s",
                        name,
                        project.audio.duration,
                        project.audio.sample_rate,
                        project.audio.current_time
                    ));
                } else {
                    ui.monospace("no audio");
                }

                let now = ctx.input(|i| i.time);
                if !self.message.is_empty() && now - self.message_at < MESSAGE_TIMEOUT_S {
                    ui.separator();
                    ui.monospace(&self.message);
                }
            });
        });
    }
}
