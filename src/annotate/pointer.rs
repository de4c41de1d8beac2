//! UI-independent pointer input.
//!
//! The annotation and scrub engines consume these events; widget glue
//! translates egui input into them. Positions are in the sheet's content
//! space (unscrolled document pixels).

/// Contact-area threshold (px²) above which a pen contact is treated as a
/// resting palm and ignored.
pub const PALM_CONTACT_AREA_PX2: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDevice {
    Mouse,
    Pen,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One pointer event in content space.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub id: u64,
    pub device: PointerDevice,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    /// Stylus pressure in [0,1] when the device reports it.
    pub pressure: Option<f32>,
    /// Contact footprint (width, height) in px when the device reports it.
    pub contact: Option<(f32, f32)>,
    /// Primary button / contact.
    pub primary: bool,
}

impl PointerInput {
    pub fn mouse(id: u64, phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            id,
            device: PointerDevice::Mouse,
            phase,
            x,
            y,
            pressure: None,
            contact: None,
            primary: true,
        }
    }

    pub fn pen(id: u64, phase: PointerPhase, x: f32, y: f32, pressure: f32) -> Self {
        Self {
            id,
            device: PointerDevice::Pen,
            phase,
            x,
            y,
            pressure: Some(pressure),
            contact: None,
            primary: true,
        }
    }

    /// Palm rejection: a pen contact with a footprint larger than
    /// [`PALM_CONTACT_AREA_PX2`] is a resting palm, not a stroke.
    pub fn is_palm(&self) -> bool {
        if self.device != PointerDevice::Pen {
            return false;
        }
        match self.contact {
            Some((w, h)) => w * h > PALM_CONTACT_AREA_PX2,
            None => false,
        }
    }
}
