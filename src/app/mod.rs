//! Application state and main loop.
//!
//! Submodules:
//! - `events` - draining the event bus once per frame
//! - `project_io` - project save/load, audio loading, export
//! - `run` - the eframe::App implementation

mod events;
mod project_io;
mod run;

use std::path::PathBuf;

use crate::annotate::{AlwaysGrab, AnnotationEngine, ToolSettings};
use crate::audio::{AudioTransport, NullTransport, WavDecoder};
use crate::core::events::{AppEvent, EventBus};
use crate::entities::drawing::Tool;
use crate::entities::Project;
use crate::export::ExportPage;
use crate::waveform::scrub::ScrubEngine;
use crate::widgets::StatusBar;

fn default_transport() -> Box<dyn AudioTransport> {
    Box::new(NullTransport)
}

/// Main application state. The project and toolbar settings persist
/// through eframe storage; engines and the bus are rebuilt on startup.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct XSheetApp {
    pub project: Project,
    pub tools: ToolSettings,
    pub project_path: Option<PathBuf>,

    #[serde(skip)]
    pub engine: AnnotationEngine,
    #[serde(skip)]
    pub scrub: ScrubEngine,
    #[serde(skip)]
    pub bus: EventBus,
    #[serde(skip, default = "default_transport")]
    pub transport: Box<dyn AudioTransport>,
    #[serde(skip)]
    pub decoder: WavDecoder,
    #[serde(skip)]
    pub status: StatusBar,
    #[serde(skip)]
    pub grab: AlwaysGrab,
    #[serde(skip)]
    pub confirm_clear: bool,
    #[serde(skip)]
    pub show_sheet_info: bool,
    #[serde(skip)]
    pub export_page: Option<ExportPage>,
}

impl Default for XSheetApp {
    fn default() -> Self {
        let bus = EventBus::new();
        let tools = ToolSettings::default();
        Self {
            project: Project::new(bus.clone()),
            tools,
            project_path: None,
            engine: AnnotationEngine::new(tools),
            scrub: ScrubEngine::default(),
            bus,
            transport: default_transport(),
            decoder: WavDecoder,
            status: StatusBar::default(),
            grab: AlwaysGrab,
            confirm_clear: false,
            show_sheet_info: false,
            export_page: None,
        }
    }
}

impl XSheetApp {
    /// Re-wire runtime state after deserialization and apply CLI options.
    pub fn bootstrap(&mut self, args: &crate::cli::Args) {
        self.project.attach_bus(self.bus.clone());
        self.engine.settings = self.tools;
        if let Some(path) = &args.project {
            self.load_project_from(path.clone());
        }
        if let Some(fps) = args.fps {
            self.project.set_fps(fps);
        }
        if let Some(frames) = args.frames {
            self.project.set_frame_count(frames);
        }
        if let Some(audio) = &args.audio {
            self.load_audio_from(audio.clone());
        }
    }

    /// Change the active tool through the engine, so an in-progress
    /// stroke is cancelled rather than committed.
    pub fn select_tool(&mut self, tool: Tool) {
        self.engine.set_tool(tool, &mut self.grab);
        self.tools.tool = tool;
        self.bus.emit(AppEvent::ToolChanged(tool));
    }
}
