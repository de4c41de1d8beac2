//! Core engine: event bus, timeline math, envelope extraction.

pub mod envelope;
pub mod events;
pub mod timeline;

pub use envelope::{AmplitudeEnvelope, DEFAULT_ENVELOPE_POINTS};
pub use events::{AppEvent, ChangeReason, EventBus};
pub use timeline::TimelineModel;
