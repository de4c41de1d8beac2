//! Vertical waveform strip rendering.
//!
//! One renderer serves both the live scrollable column and the export
//! column: the caller parametrizes geometry (width, row height, scroll
//! window) through [`WaveformLayout`] and the output goes to any
//! [`Surface`]. Vertical position is time: the strip runs top-to-bottom
//! with `TimelineModel` supplying the mapping, so the waveform lines up
//! with the frame rows beside it.

pub mod scrub;

use crate::core::envelope::AmplitudeEnvelope;
use crate::core::timeline::TimelineModel;
use crate::render::surface::{Stroke, Surface};

/// Fraction of the half-width the loudest envelope point deflects to.
/// Keeps a visual gutter between the band and the column border.
pub const BAND_DEFLECTION: f32 = 0.9;

/// Playhead line width in px.
pub const PLAYHEAD_WIDTH: f32 = 1.5;

/// Colors for the waveform column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformStyle {
    pub band_fill: [u8; 4],
    pub band_outline: [u8; 4],
    pub axis: [u8; 4],
    pub playhead: [u8; 4],
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            band_fill: [70, 130, 180, 200],
            band_outline: [70, 130, 180, 255],
            axis: [150, 150, 150, 255],
            playhead: [255, 0, 0, 255],
        }
    }
}

/// Geometry of one render pass. Output coordinates are local to the
/// visible window: `(0, 0)` is the top-left of the clip rectangle, and
/// strip position `y` lands at `y - scroll_offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformLayout {
    /// Column width in px.
    pub width: f32,
    /// Height of one frame row in px.
    pub row_height: f32,
    /// Strip-space y at the top of the visible window.
    pub scroll_offset: f32,
    /// Visible window height. The renderer overscans one row beyond each
    /// edge so partially visible geometry is not clipped mid-row.
    pub clip_height: f32,
}

impl WaveformLayout {
    /// Full-strip layout with no scrolling, as the export column uses.
    pub fn unclipped(width: f32, row_height: f32, total_height: f32) -> Self {
        Self { width, row_height, scroll_offset: 0.0, clip_height: total_height }
    }
}

/// Render the envelope band, center axis and optional playhead.
///
/// An empty envelope renders nothing at all, playhead included.
pub fn render_waveform(
    envelope: &AmplitudeEnvelope,
    timeline: &TimelineModel,
    layout: &WaveformLayout,
    style: &WaveformStyle,
    playhead_time: Option<f64>,
    surface: &mut dyn Surface,
) {
    if envelope.is_empty() || layout.width <= 0.0 {
        return;
    }

    let total_height = timeline.total_pixel_height(layout.row_height) as f32;
    if total_height <= 0.0 {
        return;
    }

    let margin = layout.row_height;
    let view_top = layout.scroll_offset - margin;
    let view_bottom = layout.scroll_offset + layout.clip_height + margin;

    let center_x = layout.width / 2.0;
    let half_width = layout.width / 2.0;
    let amps = envelope.samples();
    let n = amps.len();
    let y_step = if n > 1 { total_height / (n - 1) as f32 } else { 0.0 };

    // Index range of envelope points inside the overscanned window.
    let first = if y_step > 0.0 {
        ((view_top / y_step).floor().max(0.0) as usize).min(n - 1)
    } else {
        0
    };
    let last = if y_step > 0.0 {
        ((view_bottom / y_step).ceil().max(0.0) as usize).min(n - 1)
    } else {
        n - 1
    };

    // Center axis across the visible slice.
    let axis_top = (first as f32 * y_step) - layout.scroll_offset;
    let axis_bottom = (last as f32 * y_step) - layout.scroll_offset;
    surface.stroke_polyline(
        &[[center_x, axis_top], [center_x, axis_bottom]],
        Stroke { width: 1.0, color: style.axis },
    );

    // Mirrored band: right side top-to-bottom, left side bottom-to-top,
    // closed into one filled polygon.
    if last > first {
        let count = last - first + 1;
        let mut polygon = Vec::with_capacity(count * 2);
        for i in first..=last {
            let y = i as f32 * y_step - layout.scroll_offset;
            let deflect = amps[i] * BAND_DEFLECTION * half_width;
            polygon.push([center_x + deflect, y]);
        }
        for i in (first..=last).rev() {
            let y = i as f32 * y_step - layout.scroll_offset;
            let deflect = amps[i] * BAND_DEFLECTION * half_width;
            polygon.push([center_x - deflect, y]);
        }
        surface.fill_polygon(
            &polygon,
            style.band_fill,
            Stroke { width: 1.0, color: style.band_outline },
        );
    }

    if let Some(t) = playhead_time {
        let y = timeline.y_for_time(t.clamp(0.0, timeline.duration), layout.row_height) as f32
            - layout.scroll_offset;
        if y >= view_top - layout.scroll_offset && y <= view_bottom - layout.scroll_offset {
            surface.stroke_polyline(
                &[[0.0, y], [layout.width, y]],
                Stroke { width: PLAYHEAD_WIDTH, color: style.playhead },
            );
        }
    }
}
