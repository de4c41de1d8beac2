//! Pointer-driven live annotation: input events and the drawing engine.

pub mod engine;
pub mod pointer;

pub use engine::{
    AlwaysGrab, AnnotationEngine, EngineOutcome, EngineState, PointerGrab, ToolSettings,
    ERASER_RADIUS_FACTOR,
};
pub use pointer::{PointerDevice, PointerInput, PointerPhase, PALM_CONTACT_AREA_PX2};
