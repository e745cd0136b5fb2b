//! Pointer gesture state for the crop box.
//!
//! A gesture holds a [`CaptureGuard`] for as long as it is active. Replacing
//! the state (pointer-up, cancel, new image, or dropping the session) drops
//! the guard, which releases the capture.

use std::cell::Cell;
use std::rc::Rc;

use eframe::egui::Pos2;

use crate::crop_box::{CropBox, Handle};

/// Host hook for routing pointer move/up events to the crop box while a
/// gesture is in progress.
pub trait PointerCapture {
    fn acquire(&self);
    fn release(&self);
}

/// Holds a pointer capture; releases it on drop.
pub struct CaptureGuard {
    capture: Rc<dyn PointerCapture>,
}

impl CaptureGuard {
    pub fn acquire(capture: &Rc<dyn PointerCapture>) -> Self {
        capture.acquire();
        Self {
            capture: Rc::clone(capture),
        }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.capture.release();
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CaptureGuard")
    }
}

/// Capture that only records whether a gesture currently owns the pointer.
/// The egui host already keeps delivering drag events to the widget that
/// started them; the flag drives the cursor icon.
#[derive(Debug, Default)]
pub struct CaptureFlag {
    active: Cell<bool>,
}

impl CaptureFlag {
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl PointerCapture for CaptureFlag {
    fn acquire(&self) {
        log::trace!("pointer captured");
        self.active.set(true);
    }

    fn release(&self) {
        log::trace!("pointer released");
        self.active.set(false);
    }
}

/// Exactly one gesture (or none) per session. `origin` is the box as it was
/// when the gesture began, used to restore it on cancel.
#[derive(Debug, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        start_pointer: Pos2,
        start_position: Pos2,
        origin: CropBox,
        _capture: CaptureGuard,
    },
    Resizing {
        handle: Handle,
        anchor: Pos2,
        locked_ratio: f32,
        origin: CropBox,
        _capture: CaptureGuard,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn origin(&self) -> Option<CropBox> {
        match self {
            Interaction::Idle => None,
            Interaction::Dragging { origin, .. } | Interaction::Resizing { origin, .. } => {
                Some(*origin)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Dragging { .. } => "dragging",
            Interaction::Resizing { .. } => "resizing",
        }
    }
}
