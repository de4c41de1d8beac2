//! Rendering: the backend-neutral surface and object stroking.

pub mod surface;

pub use surface::{
    draw_object, draw_object_uniform, effective_line_width, DrawCmd, RecordingSurface, Stroke,
    Surface, DEFAULT_PRESSURE,
};
