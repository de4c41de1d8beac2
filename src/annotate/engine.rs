//! Live annotation engine: the pointer-driven drawing state machine.
//!
//! One engine instance owns all interaction state (active tool, stroke in
//! progress, capturing pointer id) - no ambient globals. Pointer capture
//! is the concurrency discipline: exactly one pointer id owns an
//! interaction; events from other ids are ignored until release.
//!
//! # States
//!
//! - `Idle` - no interaction; pen hover may set a precision-cursor flag.
//! - `DrawingPen` - appending pressure-tagged points to a pen stroke.
//! - `DrawingShape` - rubber-banding a line/rectangle/ellipse: the object
//!   holds the anchor plus one live endpoint overwritten on every move.
//! - `Erasing` - continuous [`erase`](crate::entities::DrawingStore::erase_at_point)
//!   on every move of the captured pointer.
//!
//! Pointer-up validates and commits; pointer-cancel and tool changes
//! discard without committing. A pointer-down while already mid-stroke is
//! stale-state recovery: the in-progress work is dropped and the event is
//! NOT treated as a new stroke start.

use log::{debug, warn};

use crate::entities::drawing::{DrawingObject, StrokePoint, StrokeStyle, Tool};
use crate::entities::store::DrawingStore;
use crate::render::surface::DEFAULT_PRESSURE;

use super::pointer::{PointerDevice, PointerInput, PointerPhase};

/// Eraser radius as a multiple of the active line width.
pub const ERASER_RADIUS_FACTOR: f32 = 3.0;

/// Exclusive pointer capture offered by the hosting canvas. Capture can
/// fail (soft failure): the engine aborts the interaction and returns to
/// idle instead of drawing uncaptured.
pub trait PointerGrab {
    /// Request exclusive capture of a pointer id. Returns false on failure.
    fn grab(&mut self, id: u64) -> bool;
    fn release(&mut self, id: u64);
}

/// Capture that always succeeds. egui routes drag events to the widget
/// that saw pointer-down, which is capture enough for the live canvas.
#[derive(Debug, Default)]
pub struct AlwaysGrab;

impl PointerGrab for AlwaysGrab {
    fn grab(&mut self, _id: u64) -> bool {
        true
    }
    fn release(&mut self, _id: u64) {}
}

/// Current toolbar selection. Persisted with the app state.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub tool: Tool,
    pub color: [u8; 4],
    pub width: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self { tool: Tool::Pen, color: [255, 0, 0, 255], width: 2.0 }
    }
}

impl ToolSettings {
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle { color: self.color, width: self.width }
    }

    pub fn eraser_radius(&self) -> f32 {
        self.width * ERASER_RADIUS_FACTOR
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    DrawingPen,
    DrawingShape,
    Erasing,
}

/// What a pointer event did, so the app can redraw / mark modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOutcome {
    /// The overlay needs repainting.
    pub redraw: bool,
    /// A finished object was committed to the store.
    pub committed: bool,
    /// Objects were erased.
    pub erased: bool,
}

impl EngineOutcome {
    const NONE: Self = Self { redraw: false, committed: false, erased: false };

    fn redraw() -> Self {
        Self { redraw: true, ..Self::NONE }
    }
}

/// The pointer-driven drawing state machine.
pub struct AnnotationEngine {
    pub settings: ToolSettings,
    state: EngineState,
    current: Option<DrawingObject>,
    active_pointer: Option<u64>,
    device: PointerDevice,
    last_pressure: f32,
    hovering: bool,
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self {
            settings: ToolSettings::default(),
            state: EngineState::Idle,
            current: None,
            active_pointer: None,
            device: PointerDevice::Mouse,
            last_pressure: DEFAULT_PRESSURE,
            hovering: false,
        }
    }
}

impl AnnotationEngine {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings, ..Self::default() }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The in-progress object, for overlay preview rendering.
    pub fn current_object(&self) -> Option<&DrawingObject> {
        self.current.as_ref()
    }

    pub fn is_interacting(&self) -> bool {
        self.state != EngineState::Idle
    }

    /// Pen hovering over the canvas with no button down (precision cursor).
    pub fn is_pen_hovering(&self) -> bool {
        self.hovering
    }

    /// Change the active tool. A tool change mid-stroke cancels the stroke
    /// (discards, never commits).
    pub fn set_tool(&mut self, tool: Tool, grab: &mut dyn PointerGrab) -> EngineOutcome {
        if self.settings.tool == tool {
            return EngineOutcome::NONE;
        }
        let mut outcome = EngineOutcome::NONE;
        if self.is_interacting() {
            debug!("tool changed mid-stroke, cancelling in-progress work");
            self.abort(grab);
            outcome.redraw = true;
        }
        self.settings.tool = tool;
        outcome
    }

    /// Feed one pointer event.
    pub fn handle_pointer(
        &mut self,
        ev: PointerInput,
        store: &mut DrawingStore,
        grab: &mut dyn PointerGrab,
    ) -> EngineOutcome {
        match ev.phase {
            PointerPhase::Down => self.on_down(ev, store, grab),
            PointerPhase::Move => self.on_move(ev, store),
            PointerPhase::Up => self.on_up(ev, store, grab),
            PointerPhase::Cancel => self.on_cancel(ev, grab),
        }
    }

    fn on_down(
        &mut self,
        ev: PointerInput,
        store: &mut DrawingStore,
        grab: &mut dyn PointerGrab,
    ) -> EngineOutcome {
        if !ev.primary {
            return EngineOutcome::NONE;
        }
        if ev.is_palm() {
            debug!("large pen contact area, treating as palm - ignored");
            return EngineOutcome::NONE;
        }

        self.device = ev.device;
        if let Some(p) = ev.pressure {
            self.last_pressure = p;
        }

        if self.is_interacting() {
            // Stale state: the previous interaction missed its up/cancel.
            // Discard it and do not start a new stroke from this event.
            warn!("pointer-down while already {:?}, resetting without commit", self.state);
            self.abort(grab);
            return EngineOutcome::redraw();
        }

        match self.settings.tool {
            Tool::Select => EngineOutcome::NONE,
            Tool::Eraser => {
                let erased = store.erase_at_point(ev.x, ev.y, self.settings.eraser_radius());
                self.begin_capture(ev.id, EngineState::Erasing, grab);
                EngineOutcome { redraw: erased, committed: false, erased }
            }
            tool => {
                let Some(kind) = tool.object_kind() else {
                    return EngineOutcome::NONE;
                };
                let mut obj = DrawingObject::new(kind, self.settings.stroke_style());
                obj.points.push(self.stroke_point(ev));
                self.current = Some(obj);
                self.hovering = false;
                let state = if tool == Tool::Pen {
                    EngineState::DrawingPen
                } else {
                    EngineState::DrawingShape
                };
                if !self.begin_capture(ev.id, state, grab) {
                    self.current = None;
                    return EngineOutcome::redraw();
                }
                EngineOutcome::redraw()
            }
        }
    }

    fn on_move(&mut self, ev: PointerInput, store: &mut DrawingStore) -> EngineOutcome {
        if self.state == EngineState::Idle {
            // Pen hover with no contact drives the precision cursor only.
            if ev.device == PointerDevice::Pen {
                self.device = PointerDevice::Pen;
                self.hovering = true;
            }
            return EngineOutcome::NONE;
        }
        if Some(ev.id) != self.active_pointer {
            return EngineOutcome::NONE;
        }

        match self.state {
            EngineState::DrawingPen => {
                let point = self.stroke_point(ev);
                if let Some(obj) = self.current.as_mut() {
                    obj.points.push(point);
                }
                EngineOutcome::redraw()
            }
            EngineState::DrawingShape => {
                // Rubber band: anchor stays, the live endpoint is replaced.
                let point = self.stroke_point(ev);
                if let Some(obj) = self.current.as_mut() {
                    if obj.points.len() < 2 {
                        obj.points.push(point);
                    } else {
                        obj.points[1] = point;
                    }
                }
                EngineOutcome::redraw()
            }
            EngineState::Erasing => {
                let erased = store.erase_at_point(ev.x, ev.y, self.settings.eraser_radius());
                EngineOutcome { redraw: erased, committed: false, erased }
            }
            EngineState::Idle => EngineOutcome::NONE,
        }
    }

    fn on_up(
        &mut self,
        ev: PointerInput,
        store: &mut DrawingStore,
        grab: &mut dyn PointerGrab,
    ) -> EngineOutcome {
        if !self.is_interacting() || Some(ev.id) != self.active_pointer {
            return EngineOutcome::NONE;
        }

        let finished = self.current.take();
        let was_erasing = self.state == EngineState::Erasing;
        self.reset(grab);

        if was_erasing {
            return EngineOutcome::redraw();
        }

        let mut outcome = EngineOutcome::redraw();
        if let Some(obj) = finished {
            if obj.is_commit_valid() {
                outcome.committed = store.add_to_active(obj);
            } else {
                debug!("dropping degenerate {:?} gesture", obj.kind);
            }
        }
        outcome
    }

    fn on_cancel(&mut self, ev: PointerInput, grab: &mut dyn PointerGrab) -> EngineOutcome {
        if !self.is_interacting() || Some(ev.id) != self.active_pointer {
            return EngineOutcome::NONE;
        }
        debug!("pointer cancel, discarding in-progress work");
        self.abort(grab);
        EngineOutcome::redraw()
    }

    fn begin_capture(&mut self, id: u64, state: EngineState, grab: &mut dyn PointerGrab) -> bool {
        if !grab.grab(id) {
            warn!("pointer capture failed, aborting interaction");
            self.reset_uncaptured();
            return false;
        }
        self.active_pointer = Some(id);
        self.state = state;
        true
    }

    fn stroke_point(&mut self, ev: PointerInput) -> StrokePoint {
        if ev.device == PointerDevice::Pen {
            let pressure = ev.pressure.unwrap_or(self.last_pressure);
            self.last_pressure = pressure;
            StrokePoint::with_pressure(ev.x, ev.y, pressure)
        } else {
            StrokePoint::new(ev.x, ev.y)
        }
    }

    /// Discard in-progress work and return to idle.
    fn abort(&mut self, grab: &mut dyn PointerGrab) {
        self.current = None;
        self.reset(grab);
    }

    fn reset(&mut self, grab: &mut dyn PointerGrab) {
        if let Some(id) = self.active_pointer.take() {
            grab.release(id);
        }
        self.reset_uncaptured();
    }

    fn reset_uncaptured(&mut self) {
        self.state = EngineState::Idle;
        self.active_pointer = None;
        self.hovering = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::drawing::ObjectKind;

    fn down(id: u64, x: f32, y: f32) -> PointerInput {
        PointerInput::mouse(id, PointerPhase::Down, x, y)
    }
    fn mv(id: u64, x: f32, y: f32) -> PointerInput {
        PointerInput::mouse(id, PointerPhase::Move, x, y)
    }
    fn up(id: u64, x: f32, y: f32) -> PointerInput {
        PointerInput::mouse(id, PointerPhase::Up, x, y)
    }
    fn cancel(id: u64) -> PointerInput {
        PointerInput::mouse(id, PointerPhase::Cancel, 0.0, 0.0)
    }

    fn engine(tool: Tool) -> AnnotationEngine {
        AnnotationEngine::new(ToolSettings { tool, color: [0, 0, 0, 255], width: 2.0 })
    }

    fn committed_count(store: &DrawingStore) -> usize {
        store.active_layer().unwrap().objects.len()
    }

    #[test]
    fn test_eraser_radius_is_three_times_line_width() {
        let settings = ToolSettings { tool: Tool::Eraser, color: [0, 0, 0, 255], width: 4.0 };
        assert_eq!(settings.eraser_radius(), 12.0);
        let d = ToolSettings::default();
        assert_eq!(d.eraser_radius(), d.width * ERASER_RADIUS_FACTOR);
    }

    #[test]
    fn test_pen_stroke_commits_with_two_points() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        assert_eq!(e.state(), EngineState::DrawingPen);
        e.handle_pointer(mv(1, 10.0, 0.0), &mut store, &mut grab);
        let out = e.handle_pointer(up(1, 10.0, 0.0), &mut store, &mut grab);
        assert!(out.committed);
        assert_eq!(committed_count(&store), 1);
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn test_single_point_pen_never_commits() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        let out = e.handle_pointer(up(1, 0.0, 0.0), &mut store, &mut grab);
        assert!(!out.committed);
        assert_eq!(committed_count(&store), 0);
    }

    #[test]
    fn test_shape_rubber_band_keeps_two_points() {
        let mut e = engine(Tool::Rectangle);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        assert_eq!(e.state(), EngineState::DrawingShape);
        for i in 1..20 {
            e.handle_pointer(mv(1, i as f32, i as f32), &mut store, &mut grab);
        }
        let obj = e.current_object().unwrap();
        assert_eq!(obj.points.len(), 2);
        assert_eq!((obj.points[1].x, obj.points[1].y), (19.0, 19.0));
        let out = e.handle_pointer(up(1, 19.0, 19.0), &mut store, &mut grab);
        assert!(out.committed);
    }

    #[test]
    fn test_tiny_shape_rejected_exactly_once_committed_when_big() {
        // <3px in both axes: rejected.
        let mut e = engine(Tool::Ellipse);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 10.0, 10.0), &mut store, &mut grab);
        e.handle_pointer(mv(1, 12.0, 12.0), &mut store, &mut grab);
        let out = e.handle_pointer(up(1, 12.0, 12.0), &mut store, &mut grab);
        assert!(!out.committed);
        assert_eq!(committed_count(&store), 0);

        // >=3px in one axis: committed exactly once.
        e.handle_pointer(down(2, 10.0, 10.0), &mut store, &mut grab);
        e.handle_pointer(mv(2, 14.0, 10.0), &mut store, &mut grab);
        let out = e.handle_pointer(up(2, 14.0, 10.0), &mut store, &mut grab);
        assert!(out.committed);
        assert_eq!(committed_count(&store), 1);
    }

    #[test]
    fn test_cancel_never_commits_even_when_valid() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        e.handle_pointer(mv(1, 50.0, 50.0), &mut store, &mut grab);
        let out = e.handle_pointer(cancel(1), &mut store, &mut grab);
        assert!(!out.committed);
        assert_eq!(committed_count(&store), 0);
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn test_tool_change_mid_stroke_cancels() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        e.handle_pointer(mv(1, 50.0, 50.0), &mut store, &mut grab);
        e.set_tool(Tool::Line, &mut grab);
        assert_eq!(e.state(), EngineState::Idle);
        assert_eq!(committed_count(&store), 0);
        assert!(e.current_object().is_none());
    }

    #[test]
    fn test_competing_pointer_ids_ignored() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        e.handle_pointer(mv(7, 500.0, 500.0), &mut store, &mut grab); // other pointer
        e.handle_pointer(mv(1, 10.0, 0.0), &mut store, &mut grab);
        let obj = e.current_object().unwrap();
        assert_eq!(obj.points.len(), 2);
        assert!((obj.points[1].x - 10.0).abs() < f32::EPSILON);
        // Up from the wrong pointer is also ignored.
        let out = e.handle_pointer(up(7, 0.0, 0.0), &mut store, &mut grab);
        assert!(!out.committed);
        assert_eq!(e.state(), EngineState::DrawingPen);
    }

    #[test]
    fn test_stale_down_recovers_without_new_stroke() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        e.handle_pointer(mv(1, 10.0, 0.0), &mut store, &mut grab);
        // Second down without an up: stale-state recovery.
        e.handle_pointer(down(2, 5.0, 5.0), &mut store, &mut grab);
        assert_eq!(e.state(), EngineState::Idle);
        assert!(e.current_object().is_none());
        assert_eq!(committed_count(&store), 0);
    }

    #[test]
    fn test_palm_down_is_ignored() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        let mut ev = PointerInput::pen(1, PointerPhase::Down, 0.0, 0.0, 0.5);
        ev.contact = Some((25.0, 25.0));
        let out = e.handle_pointer(ev, &mut store, &mut grab);
        assert_eq!(out, EngineOutcome::NONE);
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn test_eraser_erases_on_down_and_moves() {
        let mut e = engine(Tool::Eraser);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        // Two strokes far apart.
        let mut a = DrawingObject::new(ObjectKind::Line, StrokeStyle::default());
        a.points = vec![StrokePoint::new(0.0, 0.0), StrokePoint::new(10.0, 0.0)];
        let mut b = DrawingObject::new(ObjectKind::Line, StrokeStyle::default());
        b.points = vec![StrokePoint::new(100.0, 100.0), StrokePoint::new(110.0, 100.0)];
        store.add_to_active(a);
        store.add_to_active(b);

        let out = e.handle_pointer(down(1, 5.0, 0.0), &mut store, &mut grab);
        assert!(out.erased);
        assert_eq!(e.state(), EngineState::Erasing);
        assert_eq!(committed_count(&store), 1);
        // Drag over the second stroke.
        let out = e.handle_pointer(mv(1, 105.0, 100.0), &mut store, &mut grab);
        assert!(out.erased);
        assert_eq!(committed_count(&store), 0);
        // Nothing left: move reports no erase.
        let out = e.handle_pointer(mv(1, 105.0, 100.0), &mut store, &mut grab);
        assert!(!out.erased);
        let out = e.handle_pointer(up(1, 105.0, 100.0), &mut store, &mut grab);
        assert!(!out.committed);
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn test_select_tool_is_inert() {
        let mut e = engine(Tool::Select);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        let out = e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        assert_eq!(out, EngineOutcome::NONE);
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn test_capture_failure_aborts_softly() {
        struct NeverGrab;
        impl PointerGrab for NeverGrab {
            fn grab(&mut self, _id: u64) -> bool {
                false
            }
            fn release(&mut self, _id: u64) {}
        }
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = NeverGrab;
        e.handle_pointer(down(1, 0.0, 0.0), &mut store, &mut grab);
        assert_eq!(e.state(), EngineState::Idle);
        assert!(e.current_object().is_none());
    }

    #[test]
    fn test_pen_points_carry_pressure_mouse_points_do_not() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        e.handle_pointer(PointerInput::pen(1, PointerPhase::Down, 0.0, 0.0, 0.9), &mut store, &mut grab);
        e.handle_pointer(PointerInput::pen(1, PointerPhase::Move, 5.0, 0.0, 0.4), &mut store, &mut grab);
        let obj = e.current_object().unwrap();
        assert_eq!(obj.points[0].pressure, Some(0.9));
        assert_eq!(obj.points[1].pressure, Some(0.4));
        e.handle_pointer(PointerInput::pen(1, PointerPhase::Up, 5.0, 0.0, 0.4), &mut store, &mut grab);

        e.handle_pointer(down(2, 0.0, 0.0), &mut store, &mut grab);
        e.handle_pointer(mv(2, 5.0, 0.0), &mut store, &mut grab);
        assert!(e.current_object().unwrap().points.iter().all(|p| p.pressure.is_none()));
    }

    #[test]
    fn test_pen_hover_sets_flag_down_clears_it() {
        let mut e = engine(Tool::Pen);
        let mut store = DrawingStore::default();
        let mut grab = AlwaysGrab;
        let hover = PointerInput::pen(1, PointerPhase::Move, 3.0, 3.0, 0.0);
        e.handle_pointer(hover, &mut store, &mut grab);
        assert!(e.is_pen_hovering());
        e.handle_pointer(PointerInput::pen(1, PointerPhase::Down, 3.0, 3.0, 0.5), &mut store, &mut grab);
        assert!(!e.is_pen_hovering());
    }
}
