//! Event handling: the bus is drained once per frame and every reaction
//! lives here.

use eframe::egui;
use log::debug;

use crate::core::events::{AppEvent, ChangeReason};

use super::XSheetApp;

impl XSheetApp {
    pub fn handle_events(&mut self, ctx: &egui::Context) {
        for event in self.bus.drain() {
            match event {
                AppEvent::ProjectChanged(reason) => {
                    debug!("project changed: {reason:?}");
                    match reason {
                        ChangeReason::AudioLoaded => {
                            self.status.set_message(ctx, "Audio loaded");
                        }
                        ChangeReason::AudioCleared => {
                            self.status.set_message(ctx, "Audio cleared");
                        }
                        ChangeReason::NewProject | ChangeReason::ProjectLoaded => {
                            // Stale scrub or stroke state from the old
                            // project must not leak into the new one.
                            self.scrub = Default::default();
                            self.engine = crate::annotate::AnnotationEngine::new(self.tools);
                        }
                        _ => {}
                    }
                    ctx.request_repaint();
                }
                AppEvent::DrawingChanged { .. } => ctx.request_repaint(),
                AppEvent::ToolChanged(tool) => debug!("tool changed: {tool:?}"),
                AppEvent::PlaybackPositionChanged { time, visual_only } => {
                    if !visual_only {
                        self.transport.seek(time);
                    }
                    ctx.request_repaint();
                }
                AppEvent::StatusMessage(message) => self.status.set_message(ctx, message),
            }
        }
    }
}
