//! Typed application event bus.
//!
//! Components emit [`AppEvent`]s instead of calling each other directly;
//! the main loop drains the queue once per frame and reacts in one place
//! (see `app/events.rs`). Events are plain data - no callbacks, no
//! type erasure - so the full event surface is visible in one enum.
//!
//! Ordering is FIFO within a frame. The queue is bounded: when it
//! overflows (a component emitting in a tight loop), the oldest events
//! are evicted with a warning rather than growing without limit.

use std::sync::{Arc, Mutex};

use log::warn;

use crate::entities::drawing::Tool;

/// Maximum queued events before oldest are evicted.
const MAX_QUEUE_SIZE: usize = 1000;

/// Why project data changed. Mirrors the granularity the UI cares about:
/// a frame-count change rebuilds the grid, a cell edit does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    NewProject,
    ProjectLoaded,
    FrameCount,
    CellData,
    Metadata,
    AudioLoaded,
    AudioCleared,
    ActiveLayerChanged,
}

/// Application-wide events.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Project data changed for the given reason.
    ProjectChanged(ChangeReason),
    /// Drawing objects changed on one layer (`Some`) or all layers (`None`).
    DrawingChanged { layer: Option<usize> },
    /// The active annotation tool changed.
    ToolChanged(Tool),
    /// Playback position moved. `visual_only` positions come from scrub
    /// moves and should not restart the transport.
    PlaybackPositionChanged { time: f64, visual_only: bool },
    /// One-line status message for the status bar.
    StatusMessage(String),
}

/// Queued event bus. Cheap to clone; all clones share one queue.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Arc<Mutex<Vec<AppEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next drain.
    pub fn emit(&self, event: AppEvent) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evicted = queue.len() - MAX_QUEUE_SIZE + 1;
            warn!("event queue full, evicting {evicted} oldest event(s)");
            queue.drain(0..evicted);
        }
        queue.push(event);
    }

    /// Take all queued events, oldest first.
    pub fn drain(&self) -> Vec<AppEvent> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *queue)
    }

    /// Number of queued events (for tests and diagnostics).
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
