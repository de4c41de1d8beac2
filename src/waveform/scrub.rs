//! Waveform scrubbing: pointer position to audio time, with throttled
//! snippet playback.
//!
//! Dragging in the waveform column always moves the visual playhead, but
//! audio snippets fire at most once per `0.7 / fps` seconds of audio-time
//! movement so slow drags do not machine-gun the transport. Each snippet
//! is one frame long (`1 / fps`). Release plays a final snippet at the
//! release position so the last heard audio matches where the playhead
//! stopped.

use log::debug;

use crate::annotate::pointer::{PointerInput, PointerPhase};
use crate::audio::AudioTransport;
use crate::core::timeline::TimelineModel;

/// Minimum audio-time distance (in frames) between two mid-drag snippets.
pub const SCRUB_THROTTLE_FACTOR: f64 = 0.7;

/// Result of one scrub pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrubOutcome {
    /// New playhead time, if the event moved it.
    pub time: Option<f64>,
    /// A snippet was sent to the transport.
    pub snippet: bool,
}

/// Pointer-to-transport scrub state machine for the waveform column.
#[derive(Debug, Default)]
pub struct ScrubEngine {
    active_pointer: Option<u64>,
    last_snippet_time: f64,
}

impl ScrubEngine {
    pub fn is_scrubbing(&self) -> bool {
        self.active_pointer.is_some()
    }

    /// Feed one pointer event. `y` in the event is strip-space (already
    /// unscrolled); the timeline maps it to audio time.
    pub fn handle_pointer(
        &mut self,
        ev: PointerInput,
        timeline: &TimelineModel,
        row_height: f32,
        transport: &mut dyn AudioTransport,
    ) -> ScrubOutcome {
        if timeline.duration <= 0.0 {
            return ScrubOutcome::default();
        }
        let snippet_len = 1.0 / timeline.fps;
        let throttle = SCRUB_THROTTLE_FACTOR / timeline.fps;

        match ev.phase {
            PointerPhase::Down => {
                if !ev.primary || ev.is_palm() || self.active_pointer.is_some() {
                    return ScrubOutcome::default();
                }
                let t = timeline.time_for_y(ev.y as f64, row_height);
                self.active_pointer = Some(ev.id);
                self.last_snippet_time = t;
                transport.play_scrub_snippet(t, snippet_len);
                debug!("scrub start at {t:.3}s");
                ScrubOutcome { time: Some(t), snippet: true }
            }
            PointerPhase::Move => {
                if Some(ev.id) != self.active_pointer {
                    return ScrubOutcome::default();
                }
                let t = timeline.time_for_y(ev.y as f64, row_height);
                let mut snippet = false;
                if (t - self.last_snippet_time).abs() > throttle {
                    transport.play_scrub_snippet(t, snippet_len);
                    self.last_snippet_time = t;
                    snippet = true;
                }
                ScrubOutcome { time: Some(t), snippet }
            }
            PointerPhase::Up => {
                if Some(ev.id) != self.active_pointer {
                    return ScrubOutcome::default();
                }
                self.active_pointer = None;
                let t = timeline.time_for_y(ev.y as f64, row_height);
                transport.play_scrub_snippet(t, snippet_len);
                debug!("scrub end at {t:.3}s");
                ScrubOutcome { time: Some(t), snippet: true }
            }
            PointerPhase::Cancel => {
                if Some(ev.id) != self.active_pointer {
                    return ScrubOutcome::default();
                }
                self.active_pointer = None;
                let t = timeline.time_for_y(ev.y as f64, row_height);
                transport.play_scrub_snippet(t, snippet_len);
                ScrubOutcome { time: Some(t), snippet: true }
            }
        }
    }
}
