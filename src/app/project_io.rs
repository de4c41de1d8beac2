//! Project and audio I/O for XSheetApp.
//!
//! File dialogs via rfd, JSON persistence through Project, WAV decoding
//! through the AudioDecoder collaborator. Failures surface as a status
//! message and a log entry, never a panic.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::audio::AudioDecoder;
use crate::core::events::AppEvent;
use crate::entities::Project;
use crate::export::{build_export_page, ExportLayout, SheetLayout};

use super::XSheetApp;

fn project_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("X-Sheet Project", &["json"])
        .set_title(title)
}

fn audio_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("WAV Audio", &["wav"])
        .set_title("Load Audio")
}

impl XSheetApp {
    pub fn new_project(&mut self) {
        let fps = self.project.metadata.fps;
        self.project.init_new(fps, 48);
        self.project_path = None;
    }

    pub fn open_project_dialog(&mut self) {
        if let Some(path) = project_dialog("Open Project").pick_file() {
            self.load_project_from(path);
        }
    }

    pub fn load_project_from(&mut self, path: PathBuf) {
        let result: Result<Project> = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|json| Project::from_json(&json, self.bus.clone()));
        match result {
            Ok(project) => {
                info!("loaded project from {}", path.display());
                let needs_relink = project.audio.is_loaded();
                self.project = project;
                self.project_path = Some(path);
                if needs_relink {
                    // Samples are not persisted; the waveform comes back
                    // once the audio file is loaded again.
                    let name = self
                        .project
                        .audio
                        .file_name
                        .clone()
                        .unwrap_or_else(|| "audio".into());
                    warn!("project references audio '{name}', re-load it to restore the waveform");
                    self.bus
                        .emit(AppEvent::StatusMessage(format!("Re-load audio: {name}")));
                } else {
                    self.bus.emit(AppEvent::StatusMessage("Project loaded".into()));
                }
            }
            Err(e) => {
                error!("failed to load project: {e:#}");
                self.bus.emit(AppEvent::StatusMessage(format!("Load failed: {e:#}")));
            }
        }
    }

    pub fn save_project(&mut self) {
        match self.project_path.clone() {
            Some(path) => self.write_project(path),
            None => self.save_project_as(),
        }
    }

    pub fn save_project_as(&mut self) {
        let suggested = format!("{}.json", self.project.project_name);
        if let Some(path) = project_dialog("Save Project").set_file_name(suggested).save_file() {
            self.write_project(path);
        }
    }

    fn write_project(&mut self, path: PathBuf) {
        let result = self
            .project
            .to_json()
            .and_then(|json| {
                fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
            });
        match result {
            Ok(()) => {
                info!("saved project to {}", path.display());
                self.project.modified = false;
                self.project_path = Some(path);
                self.bus.emit(AppEvent::StatusMessage("Project saved".into()));
            }
            Err(e) => {
                error!("failed to save project: {e:#}");
                self.bus.emit(AppEvent::StatusMessage(format!("Save failed: {e:#}")));
            }
        }
    }

    pub fn load_audio_dialog(&mut self) {
        if let Some(path) = audio_dialog().pick_file() {
            self.load_audio_from(path);
        }
    }

    pub fn load_audio_from(&mut self, path: PathBuf) {
        match self.decoder.decode(&path) {
            Ok(decoded) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.project.load_audio(&decoded, file_name);
            }
            Err(e) => {
                error!("failed to load audio: {e:#}");
                self.bus.emit(AppEvent::StatusMessage(format!("Audio load failed: {e:#}")));
            }
        }
    }

    /// Lay out the sheet at export resolution and open the preview.
    pub fn begin_export(&mut self) {
        let page =
            build_export_page(&self.project, &SheetLayout::default(), &ExportLayout::default());
        self.bus.emit(AppEvent::StatusMessage(format!(
            "Export page built: {} rows",
            page.rows.len()
        )));
        self.export_page = Some(page);
    }
}
