//! One cropping session: the active image, its crop box, and the pointer
//! gesture in progress.
//!
//! The host feeds pointer positions (display space) in delivery order.
//! Every move recomputes geometry from the absolute position, so dropped or
//! coalesced events only skip intermediate frames.

use std::path::PathBuf;
use std::rc::Rc;

use eframe::egui::{Pos2, Rect};

use crate::crop_box::{CropBox, Hit};
use crate::error::CropError;
use crate::interaction::{CaptureGuard, Interaction, PointerCapture};
use crate::ratio::TargetRatio;
use crate::viewport::{CropResult, DisplayImage, ViewportMapper};

/// Where the active image came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageSource {
    pub folder: PathBuf,
    pub name: String,
}

/// Everything the save collaborator needs to write one cropped image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    pub folder_path: PathBuf,
    pub image_name: String,
    pub coords: CropResult,
    pub description: String,
    pub resize: bool,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
}

/// The box's content rectangle in original pixels, kept unrounded. Layout
/// changes rebuild the display box from this rather than from the previous
/// layout, so rounding error never compounds.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Selection {
    original: Rect,
    ratio: f32,
}

pub struct Session {
    viewport: ViewportMapper,
    source: Option<ImageSource>,
    crop_box: Option<CropBox>,
    selection: Option<Selection>,
    target: Option<TargetRatio>,
    interaction: Interaction,
    capture: Rc<dyn PointerCapture>,
}

impl Session {
    pub fn new(capture: Rc<dyn PointerCapture>) -> Self {
        Self {
            viewport: ViewportMapper::new(),
            source: None,
            crop_box: None,
            selection: None,
            target: None,
            interaction: Interaction::Idle,
            capture,
        }
    }

    pub fn viewport(&self) -> &ViewportMapper {
        &self.viewport
    }

    pub fn crop_box(&self) -> Option<&CropBox> {
        self.crop_box.as_ref()
    }

    pub fn target(&self) -> Option<TargetRatio> {
        self.target
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Re-reads the target inputs. A defined ratio resets the box; an
    /// undefined one leaves the box in its last valid state.
    pub fn set_target(&mut self, width: &str, height: &str) -> Result<TargetRatio, CropError> {
        match TargetRatio::parse(width, height) {
            Ok(ratio) => {
                self.target = Some(ratio);
                if self.viewport.image().is_ok() {
                    self.reset_box()?;
                }
                Ok(ratio)
            }
            Err(err) => {
                log::debug!("target {width:?}x{height:?} ignored: {err}");
                self.target = None;
                Err(err)
            }
        }
    }

    /// Makes `image` the active image. Any gesture on the previous image is
    /// abandoned and the box starts over.
    pub fn load_image(&mut self, source: ImageSource, image: DisplayImage) {
        log::info!(
            "active image {:?} ({}x{})",
            source.name,
            image.natural_width,
            image.natural_height
        );
        self.interaction = Interaction::Idle;
        self.viewport.set_image(image);
        self.source = Some(source);
        self.crop_box = None;
        self.selection = None;
        if let Err(err) = self.reset_box() {
            log::debug!("no initial crop box: {err}");
        }
    }

    pub fn close_image(&mut self) {
        self.interaction = Interaction::Idle;
        self.viewport.clear();
        self.source = None;
        self.crop_box = None;
        self.selection = None;
    }

    /// Layout changed for the same image (window resize). A running gesture
    /// ends where it is, and the box is rebuilt on the new layout from the
    /// selection in original pixels.
    pub fn reflow(&mut self, layout: DisplayImage) -> Result<(), CropError> {
        if self.viewport.container_bounds()? == layout.display_rect() {
            return Ok(());
        }

        if !self.interaction.is_idle() {
            log::debug!("gesture ended by reflow: {}", self.interaction.name());
        }
        self.interaction = Interaction::Idle;
        self.viewport.reflow(layout)?;
        let bounds = self.viewport.container_bounds()?;
        if let Some(selection) = self.selection {
            let content = self.viewport.to_display_rect(selection.original)?;
            self.crop_box = Some(CropBox::fitted(content, selection.ratio, bounds));
        }
        log::debug!("reflowed to {bounds:?}");
        Ok(())
    }

    /// Records `crop` as the current selection, in original pixels.
    fn select(&mut self, crop: CropBox, ratio: f32) -> Result<(), CropError> {
        let original = self.viewport.to_original_rect(crop.content_rect())?;
        self.crop_box = Some(crop);
        self.selection = Some(Selection { original, ratio });
        Ok(())
    }

    /// Ratio the box is held to: the target, or its own shape without one.
    fn ratio_for(&self, crop: &CropBox) -> f32 {
        self.target.map_or_else(|| crop.aspect(), |t| t.value())
    }

    /// Centers a fresh box for the current target ratio.
    pub fn reset_box(&mut self) -> Result<(), CropError> {
        let bounds = self.viewport.container_bounds()?;
        let ratio = self.target.ok_or(CropError::UndefinedRatio)?;

        self.interaction = Interaction::Idle;
        let crop = CropBox::centered(&ratio, bounds);
        log::debug!("crop box reset to {ratio}: {:?}", crop.content_rect());
        self.select(crop, ratio.value())
    }

    /// Starts a drag or resize gesture if `pos` lands on the box. Presses
    /// while a gesture is already running are ignored.
    pub fn pointer_down(&mut self, pos: Pos2) -> Result<Option<Hit>, CropError> {
        self.viewport.image()?;
        if !self.interaction.is_idle() {
            return Ok(None);
        }
        let Some(crop) = self.crop_box else {
            return Ok(None);
        };

        let hit = crop.hit_test(pos);
        match hit {
            Some(Hit::Body) => {
                self.interaction = Interaction::Dragging {
                    start_pointer: pos,
                    start_position: crop.position(),
                    origin: crop,
                    _capture: CaptureGuard::acquire(&self.capture),
                };
            }
            Some(Hit::Handle(handle)) => {
                // Without a target the box keeps whatever shape it had when
                // the gesture began.
                let locked_ratio = self.ratio_for(&crop);
                self.interaction = Interaction::Resizing {
                    handle,
                    anchor: handle.anchor(crop.content_rect()),
                    locked_ratio,
                    origin: crop,
                    _capture: CaptureGuard::acquire(&self.capture),
                };
            }
            None => {}
        }

        if hit.is_some() {
            log::debug!("gesture started: {}", self.interaction.name());
        }
        Ok(hit)
    }

    /// Applies the current pointer position to the running gesture.
    ///
    /// `ResizeRejected` means this frame was skipped; the gesture stays
    /// active and picks up again once the pointer is back in range.
    pub fn pointer_move(&mut self, pos: Pos2) -> Result<(), CropError> {
        let bounds = self.viewport.container_bounds()?;
        let Some(mut crop) = self.crop_box else {
            return Ok(());
        };

        let ratio = match &self.interaction {
            Interaction::Idle => return Ok(()),
            Interaction::Dragging {
                start_pointer,
                start_position,
                ..
            } => {
                crop.translate(*start_position, pos - *start_pointer, bounds);
                self.selection.map_or_else(|| self.ratio_for(&crop), |s| s.ratio)
            }
            Interaction::Resizing {
                handle,
                anchor,
                locked_ratio,
                ..
            } => {
                crop.resize(*handle, *anchor, pos, bounds, *locked_ratio)?;
                *locked_ratio
            }
        };
        self.select(crop, ratio)
    }

    /// Ends the running gesture, keeping the geometry it produced.
    pub fn pointer_up(&mut self) {
        if !self.interaction.is_idle() {
            log::debug!("gesture finished: {}", self.interaction.name());
        }
        self.interaction = Interaction::Idle;
    }

    /// Ends the running gesture and puts the box back where it started.
    pub fn cancel_gesture(&mut self) {
        if let Some(origin) = self.interaction.origin() {
            log::debug!("gesture cancelled: {}", self.interaction.name());
            let ratio = self.ratio_for(&origin);
            if let Err(err) = self.select(origin, ratio) {
                log::warn!("could not restore crop box: {err}");
            }
        }
        self.interaction = Interaction::Idle;
    }

    /// Builds the request for the save collaborator from the box's content
    /// rectangle in original pixels.
    pub fn save_request(&self, description: &str, resize: bool) -> Result<SaveRequest, CropError> {
        let source = self.source.as_ref().ok_or(CropError::NoSelection)?;
        let crop = self.crop_box.as_ref().ok_or(CropError::NoSelection)?;
        let coords = self
            .viewport
            .to_original_pixels(crop.content_rect())
            .map_err(|_| CropError::NoSelection)?;

        let target = self.target.filter(|_| resize);
        Ok(SaveRequest {
            folder_path: source.folder.clone(),
            image_name: source.name.clone(),
            coords,
            description: description.to_string(),
            resize,
            target_width: target.map(|t| t.width()),
            target_height: target.map(|t| t.height()),
        })
    }
}
