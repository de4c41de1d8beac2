//! Project: the unit of serialization.
//!
//! Holds sheet metadata, per-frame row cells, audio metadata and the
//! drawing store. Projects are saved and loaded as JSON via
//! [`Project::to_json`] / [`Project::from_json`]; decoded audio samples
//! are never persisted - only metadata - so loading a project re-links
//! the audio asset by file name.
//!
//! All mutations go through methods that set the modified flag and emit
//! [`AppEvent`]s on the shared bus.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::audio::DecodedAudio;
use crate::core::envelope::{AmplitudeEnvelope, DEFAULT_ENVELOPE_POINTS};
use crate::core::events::{AppEvent, ChangeReason, EventBus};
use crate::core::timeline::TimelineModel;
use crate::entities::store::DrawingStore;

/// Editable text fields of a sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellField {
    Action,
    Dialogue,
    SoundFx,
    TechNotes,
    Camera,
}

/// What a logical column displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text(CellField),
    FrameNumber,
    Waveform,
}

/// One logical column of the sheet.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub kind: ColumnKind,
    pub title: &'static str,
    /// Preferred width in px at the live sheet's reference scale.
    pub width: f32,
}

/// Column layout shared by the live grid and the export table.
pub const COLUMNS: &[Column] = &[
    Column { kind: ColumnKind::Text(CellField::Action), title: "Action/Description", width: 160.0 },
    Column { kind: ColumnKind::FrameNumber, title: "Fr", width: 36.0 },
    Column { kind: ColumnKind::Waveform, title: "Audio Waveform", width: 90.0 },
    Column { kind: ColumnKind::Text(CellField::Dialogue), title: "Dialogue", width: 120.0 },
    Column { kind: ColumnKind::Text(CellField::SoundFx), title: "Sound FX", width: 100.0 },
    Column { kind: ColumnKind::Text(CellField::TechNotes), title: "Tech. Notes", width: 110.0 },
    Column { kind: ColumnKind::FrameNumber, title: "Fr", width: 36.0 },
    Column { kind: ColumnKind::Text(CellField::Camera), title: "Camera Moves", width: 130.0 },
];

/// Cell text for one frame row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowCells {
    pub action: String,
    pub dialogue: String,
    pub sound_fx: String,
    pub tech_notes: String,
    pub camera: String,
}

impl RowCells {
    pub fn get(&self, field: CellField) -> &str {
        match field {
            CellField::Action => &self.action,
            CellField::Dialogue => &self.dialogue,
            CellField::SoundFx => &self.sound_fx,
            CellField::TechNotes => &self.tech_notes,
            CellField::Camera => &self.camera,
        }
    }

    pub fn set(&mut self, field: CellField, value: String) {
        let slot = match field {
            CellField::Action => &mut self.action,
            CellField::Dialogue => &mut self.dialogue,
            CellField::SoundFx => &mut self.sound_fx,
            CellField::TechNotes => &mut self.tech_notes,
            CellField::Camera => &mut self.camera,
        };
        *slot = value;
    }
}

/// Sheet header metadata, printed on the export page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub project_number: String,
    pub date: String,
    pub page_number: String,
    pub animator_name: String,
    pub version_number: String,
    pub shot_number: String,
    pub fps: f64,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            project_number: String::new(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            page_number: "1".to_string(),
            animator_name: String::new(),
            version_number: "1.0".to_string(),
            shot_number: String::new(),
            fps: 24.0,
        }
    }
}

/// Persisted audio metadata. No raw samples: re-linking on load requires
/// re-supplying the original file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioMeta {
    pub file_name: Option<String>,
    pub duration: f64,
    pub sample_rate: u32,
    pub channel_count: usize,
    pub current_time: f64,
}

impl AudioMeta {
    pub fn is_loaded(&self) -> bool {
        self.duration > 0.0
    }
}

fn default_frame_count() -> usize {
    48
}

/// Top-level project state.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub project_name: String,
    pub metadata: Metadata,
    pub frame_count: usize,
    pub rows: Vec<RowCells>,
    pub audio: AudioMeta,
    pub drawing: DrawingStore,

    /// Runtime amplitude envelope, rebuilt whenever audio is (re)loaded.
    #[serde(skip)]
    pub envelope: Option<AmplitudeEnvelope>,
    #[serde(skip)]
    pub modified: bool,
    #[serde(skip)]
    bus: EventBus,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}

impl Project {
    pub fn new(bus: EventBus) -> Self {
        let frame_count = default_frame_count();
        Self {
            project_name: default_project_name(),
            metadata: Metadata::default(),
            frame_count,
            rows: vec![RowCells::default(); frame_count],
            audio: AudioMeta::default(),
            drawing: DrawingStore::default(),
            envelope: None,
            modified: false,
            bus,
        }
    }

    /// Reset everything to a fresh sheet.
    pub fn init_new(&mut self, fps: f64, frame_count: usize) {
        info!("new project: fps={fps} frames={frame_count}");
        self.project_name = default_project_name();
        self.metadata = Metadata { fps: if fps > 0.0 { fps } else { 24.0 }, ..Metadata::default() };
        self.frame_count = frame_count.max(1);
        self.rows = vec![RowCells::default(); self.frame_count];
        self.clear_audio_silent();
        self.drawing = DrawingStore::default();
        self.modified = false;
        self.bus.emit(AppEvent::ProjectChanged(ChangeReason::NewProject));
    }

    /// Replace the runtime event bus (after deserialization).
    pub fn attach_bus(&mut self, bus: EventBus) {
        self.bus = bus;
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Timeline model derived from the current sheet and audio state.
    pub fn timeline(&self) -> TimelineModel {
        TimelineModel::new(self.frame_count, self.metadata.fps, self.audio.duration)
    }

    // ---------- rows ----------

    /// Resize the sheet, keeping existing row content. Never goes below 1.
    pub fn set_frame_count(&mut self, count: usize) {
        let count = count.max(1);
        if count == self.frame_count {
            return;
        }
        self.frame_count = count;
        self.rows.resize_with(count, RowCells::default);
        self.modified = true;
        self.bus.emit(AppEvent::ProjectChanged(ChangeReason::FrameCount));
    }

    pub fn cell(&self, frame: usize, field: CellField) -> &str {
        self.rows.get(frame).map_or("", |r| r.get(field))
    }

    pub fn set_cell(&mut self, frame: usize, field: CellField, value: String) {
        let Some(row) = self.rows.get_mut(frame) else {
            return;
        };
        if row.get(field) == value {
            return;
        }
        row.set(field, value);
        self.modified = true;
        self.bus.emit(AppEvent::ProjectChanged(ChangeReason::CellData));
    }

    pub fn set_fps(&mut self, fps: f64) {
        if fps <= 0.0 || fps == self.metadata.fps {
            return;
        }
        self.metadata.fps = fps;
        self.modified = true;
        // A new fps can make the loaded audio outgrow the sheet.
        self.grow_to_fit_audio();
        self.bus.emit(AppEvent::ProjectChanged(ChangeReason::Metadata));
    }

    // ---------- audio ----------

    /// Install decoded audio: record metadata, rebuild the envelope and
    /// grow (never shrink) the sheet to cover the audio duration.
    pub fn load_audio(&mut self, decoded: &DecodedAudio, file_name: String) {
        if decoded.is_empty() {
            self.clear_audio();
            return;
        }
        self.audio = AudioMeta {
            file_name: Some(file_name),
            duration: decoded.duration,
            sample_rate: decoded.sample_rate,
            channel_count: decoded.channel_count(),
            current_time: 0.0,
        };
        self.envelope = Some(AmplitudeEnvelope::from_audio(decoded, DEFAULT_ENVELOPE_POINTS));
        self.modified = true;
        self.grow_to_fit_audio();
        self.bus.emit(AppEvent::ProjectChanged(ChangeReason::AudioLoaded));
    }

    pub fn clear_audio(&mut self) {
        self.clear_audio_silent();
        self.modified = true;
        self.bus.emit(AppEvent::ProjectChanged(ChangeReason::AudioCleared));
    }

    fn clear_audio_silent(&mut self) {
        self.audio = AudioMeta::default();
        self.envelope = None;
    }

    fn grow_to_fit_audio(&mut self) {
        if !self.audio.is_loaded() {
            return;
        }
        let required = TimelineModel::required_frames(self.metadata.fps, self.audio.duration);
        if required > self.frame_count {
            info!("growing sheet {} -> {} frames to fit audio", self.frame_count, required);
            self.set_frame_count(required);
        }
    }

    pub fn set_playback_position(&mut self, time: f64) {
        self.audio.current_time = time.clamp(0.0, self.audio.duration.max(0.0));
    }

    // ---------- drawing (store wrappers that mark modified) ----------

    pub fn add_drawing_object(&mut self, object: crate::entities::drawing::DrawingObject) -> bool {
        let layer = self.drawing.active_layer_index;
        if self.drawing.add_object(layer, object) {
            self.modified = true;
            self.bus.emit(AppEvent::DrawingChanged { layer: Some(layer) });
            true
        } else {
            false
        }
    }

    pub fn erase_at_point(&mut self, x: f32, y: f32, radius: f32) -> bool {
        if self.drawing.erase_at_point(x, y, radius) {
            self.modified = true;
            self.bus
                .emit(AppEvent::DrawingChanged { layer: Some(self.drawing.active_layer_index) });
            true
        } else {
            false
        }
    }

    pub fn clear_all_drawings(&mut self) {
        self.drawing.clear_all_layers();
        self.modified = true;
        self.bus.emit(AppEvent::DrawingChanged { layer: None });
    }

    // ---------- serialization ----------

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing project")
    }

    pub fn from_json(json: &str, bus: EventBus) -> Result<Self> {
        let mut project: Project = serde_json::from_str(json).context("parsing project JSON")?;
        project.frame_count = project.frame_count.max(1);
        project.rows.resize_with(project.frame_count, RowCells::default);
        if project.drawing.layers.is_empty() {
            project.drawing = DrawingStore::default();
        }
        project.attach_bus(bus);
        project.modified = false;
        project.bus.emit(AppEvent::ProjectChanged(ChangeReason::ProjectLoaded));
        Ok(project)
    }
}

fn default_project_name() -> String {
    format!("AnimationXSheet_{}", chrono::Local::now().format("%Y-%m-%d"))
}
