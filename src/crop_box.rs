//! Crop box geometry: centering, dragging, and aspect-locked corner resizing.
//!
//! All coordinates are display space. `left`/`top` describe the outer box
//! (border included); the content rectangle sits `BORDER_WIDTH` inside it and
//! is what gets cropped.

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::error::CropError;
use crate::ratio::TargetRatio;

/// Stroke width drawn around the content rectangle, on every side.
pub const BORDER_WIDTH: f32 = 2.0;

/// Smallest content width/height a resize may produce.
pub const MIN_CONTENT_SIZE: f32 = 20.0;

/// Share of the binding container dimension a fresh box occupies.
pub const FILL_FRACTION: f32 = 0.9;

/// Pointer distance from a corner that still grabs the corner handle.
pub const HANDLE_TOLERANCE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    fn grows_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::BottomRight)
    }

    fn grows_down(self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomRight)
    }

    /// The corner of `rect` this handle sits on.
    pub fn corner(self, rect: Rect) -> Pos2 {
        match self {
            Handle::TopLeft => rect.left_top(),
            Handle::TopRight => rect.right_top(),
            Handle::BottomLeft => rect.left_bottom(),
            Handle::BottomRight => rect.right_bottom(),
        }
    }

    /// The opposite corner, which stays fixed while this handle is dragged.
    pub fn anchor(self, rect: Rect) -> Pos2 {
        match self {
            Handle::TopLeft => rect.right_bottom(),
            Handle::TopRight => rect.left_bottom(),
            Handle::BottomLeft => rect.right_top(),
            Handle::BottomRight => rect.left_top(),
        }
    }
}

/// What a pointer-down landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Handle(Handle),
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropBox {
    pub left: f32,
    pub top: f32,
    pub content_width: f32,
    pub content_height: f32,
}

impl CropBox {
    /// Largest box honoring `ratio` inside `FILL_FRACTION` of `bounds`,
    /// centered in `bounds`.
    pub fn centered(ratio: &TargetRatio, bounds: Rect) -> Self {
        let ratio = ratio.value();
        let container_aspect = bounds.width() / bounds.height();

        let (mut content_width, mut content_height) = if container_aspect > ratio {
            let height = (bounds.height() * FILL_FRACTION).round();
            ((height * ratio).round(), height)
        } else {
            let width = (bounds.width() * FILL_FRACTION).round();
            (width, (width / ratio).round())
        };

        // In tiny containers the border no longer fits around the fill.
        let inner = bounds.shrink(BORDER_WIDTH);
        if content_width > inner.width() || content_height > inner.height() {
            (content_width, content_height) = fit_ratio(
                inner.width().max(0.0).floor(),
                inner.height().max(0.0).floor(),
                ratio,
            );
        }

        let mut crop = Self {
            left: 0.0,
            top: 0.0,
            content_width,
            content_height,
        };
        let centered = bounds.min + (bounds.size() - crop.outer_size()) / 2.0;
        crop.translate(centered, Vec2::ZERO, bounds);
        crop
    }

    /// Rebuilds a box from a content rectangle that came from another
    /// layout. The longer side follows `content` and the other one is
    /// derived from `ratio`, so the shape never drifts from the ratio.
    pub fn fitted(content: Rect, ratio: f32, bounds: Rect) -> Self {
        let inner = bounds.shrink(BORDER_WIDTH);
        let inner_w = inner.width().max(1.0).floor();
        let inner_h = inner.height().max(1.0).floor();

        let (limit_w, limit_h) = if ratio >= 1.0 {
            (content.width().round().clamp(1.0, inner_w), inner_h)
        } else {
            (inner_w, content.height().round().clamp(1.0, inner_h))
        };
        let (content_width, content_height) = fit_ratio(limit_w, limit_h, ratio);

        let mut crop = Self {
            left: 0.0,
            top: 0.0,
            content_width: content_width.max(1.0),
            content_height: content_height.max(1.0),
        };
        crop.translate(content.min - Vec2::splat(BORDER_WIDTH), Vec2::ZERO, bounds);
        crop
    }

    pub fn position(&self) -> Pos2 {
        pos2(self.left, self.top)
    }

    pub fn outer_size(&self) -> Vec2 {
        vec2(self.content_width, self.content_height) + Vec2::splat(BORDER_WIDTH * 2.0)
    }

    pub fn outer_rect(&self) -> Rect {
        Rect::from_min_size(self.position(), self.outer_size())
    }

    pub fn content_rect(&self) -> Rect {
        Rect::from_min_size(
            self.position() + Vec2::splat(BORDER_WIDTH),
            vec2(self.content_width, self.content_height),
        )
    }

    /// Current `content_width / content_height`.
    pub fn aspect(&self) -> f32 {
        self.content_width / self.content_height.max(1.0)
    }

    /// Corner handles take priority over the body so small boxes stay
    /// resizable.
    pub fn hit_test(&self, pos: Pos2) -> Option<Hit> {
        let content = self.content_rect();
        for handle in Handle::ALL {
            if pos.distance(handle.corner(content)) < HANDLE_TOLERANCE {
                return Some(Hit::Handle(handle));
            }
        }

        if self.outer_rect().contains(pos) {
            return Some(Hit::Body);
        }

        None
    }

    /// Moves the box to `from + delta`, clamped per axis so the outer box
    /// stays inside `bounds`. Size is untouched.
    pub fn translate(&mut self, from: Pos2, delta: Vec2, bounds: Rect) {
        let proposed = (from + delta).round();
        let outer = self.outer_size();

        // min before max: an oversized box pins to the leading edge.
        self.left = proposed.x.min(bounds.max.x - outer.x).max(bounds.min.x);
        self.top = proposed.y.min(bounds.max.y - outer.y).max(bounds.min.y);
    }

    /// Resizes from `handle` with the content corner `anchor` held fixed.
    ///
    /// The new size is the largest `ratio`-shaped rectangle that fits both the
    /// room between the anchor and the container edges and the pointer's
    /// reach from the anchor. Steps that would go below `MIN_CONTENT_SIZE`
    /// are rejected and leave the box as it was.
    pub fn resize(
        &mut self,
        handle: Handle,
        anchor: Pos2,
        pointer: Pos2,
        bounds: Rect,
        ratio: f32,
    ) -> Result<(), CropError> {
        // Room is measured against the inset bounds so the border also fits.
        let inner = bounds.shrink(BORDER_WIDTH);
        let pointer = pointer.clamp(bounds.min, bounds.max);

        let (room_x, reach_x) = if handle.grows_right() {
            (inner.max.x - anchor.x, pointer.x - anchor.x)
        } else {
            (anchor.x - inner.min.x, anchor.x - pointer.x)
        };
        let (room_y, reach_y) = if handle.grows_down() {
            (inner.max.y - anchor.y, pointer.y - anchor.y)
        } else {
            (anchor.y - inner.min.y, anchor.y - pointer.y)
        };

        let limit_w = room_x.min(reach_x).max(0.0);
        let limit_h = room_y.min(reach_y).max(0.0);
        let (width, height) = fit_ratio(limit_w, limit_h, ratio);

        if width < MIN_CONTENT_SIZE || height < MIN_CONTENT_SIZE {
            return Err(CropError::ResizeRejected);
        }

        let content_left = if handle.grows_right() {
            anchor.x
        } else {
            anchor.x - width
        };
        let content_top = if handle.grows_down() {
            anchor.y
        } else {
            anchor.y - height
        };

        self.left = (content_left - BORDER_WIDTH).round();
        self.top = (content_top - BORDER_WIDTH).round();
        self.content_width = width;
        self.content_height = height;
        Ok(())
    }
}

/// Largest integral `(width, height)` with `width / height ≈ ratio` that
/// fits inside `limit_w × limit_h`. The longer side is rounded first so the
/// ratio error stays within one unit of the shorter side.
fn fit_ratio(limit_w: f32, limit_h: f32, ratio: f32) -> (f32, f32) {
    let width = limit_w.min(limit_h * ratio);

    if ratio >= 1.0 {
        let width = round_within(width, limit_w);
        (width, round_within(width / ratio, limit_h))
    } else {
        let height = round_within(width / ratio, limit_h);
        (round_within(height * ratio, limit_w), height)
    }
}

fn round_within(value: f32, limit: f32) -> f32 {
    let rounded = value.round();
    if rounded > limit { limit.floor() } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    fn square() -> TargetRatio {
        TargetRatio::new(1, 1).unwrap()
    }

    fn assert_ratio(crop: &CropBox, ratio: f32) {
        let error = (crop.content_width - crop.content_height * ratio).abs();
        assert!(
            error <= ratio.max(1.0),
            "{}x{} is not {ratio}",
            crop.content_width,
            crop.content_height
        );
    }

    #[test]
    fn centered_square_in_landscape_container() {
        let crop = CropBox::centered(&square(), container());

        assert_eq!(crop.content_width, 540.0);
        assert_eq!(crop.content_height, 540.0);
        assert_eq!(crop.content_rect().min, pos2(130.0, 30.0));
        assert_eq!(crop.position(), pos2(128.0, 28.0));
        assert!(container().contains_rect(crop.outer_rect()));
    }

    #[test]
    fn centered_wide_ratio_is_width_bound() {
        let ratio = TargetRatio::new(16, 9).unwrap();
        let bounds = Rect::from_min_size(pos2(50.0, 20.0), vec2(600.0, 600.0));
        let crop = CropBox::centered(&ratio, bounds);

        assert_eq!(crop.content_width, 540.0);
        assert_eq!(crop.content_height, 304.0);
        assert_ratio(&crop, ratio.value());
        assert!(bounds.contains_rect(crop.outer_rect()));
    }

    #[test]
    fn centered_holds_ratio_for_many_inputs() {
        let bounds = Rect::from_min_size(pos2(13.0, 7.0), vec2(731.0, 419.0));
        for (w, h) in [(1, 1), (3, 2), (2, 3), (16, 9), (9, 16), (1, 7), (7, 1), (1024, 768)] {
            let ratio = TargetRatio::new(w, h).unwrap();
            let crop = CropBox::centered(&ratio, bounds);
            assert_ratio(&crop, ratio.value());
            assert!(bounds.contains_rect(crop.outer_rect()), "{w}:{h}");
            assert_eq!(crop, CropBox::centered(&ratio, bounds));
        }
    }

    #[test]
    fn hit_test_prefers_corners() {
        let crop = CropBox::centered(&square(), container());
        let content = crop.content_rect();

        assert_eq!(
            crop.hit_test(content.right_bottom() + vec2(3.0, 3.0)),
            Some(Hit::Handle(Handle::BottomRight))
        );
        assert_eq!(
            crop.hit_test(content.left_top()),
            Some(Hit::Handle(Handle::TopLeft))
        );
        assert_eq!(crop.hit_test(content.center()), Some(Hit::Body));
        assert_eq!(crop.hit_test(pos2(5.0, 5.0)), None);
    }

    #[test]
    fn translate_clamps_every_frame() {
        let bounds = container();
        let mut crop = CropBox::centered(&square(), bounds);
        let start = crop.position();

        for step in -40..=40 {
            let delta = vec2(step as f32 * 17.0, step as f32 * -11.0);
            crop.translate(start, delta, bounds);
            assert!(bounds.contains_rect(crop.outer_rect()), "step {step}");
            assert_eq!(crop.content_width, 540.0);
            assert_eq!(crop.content_height, 540.0);
        }

        crop.translate(start, vec2(10_000.0, 10_000.0), bounds);
        assert_eq!(crop.outer_rect().right_bottom(), bounds.right_bottom());
    }

    #[test]
    fn resize_bottom_right_clamps_to_room() {
        let bounds = container();
        let mut crop = CropBox::centered(&square(), bounds);
        let anchor = Handle::BottomRight.anchor(crop.content_rect());

        crop.resize(Handle::BottomRight, anchor, pos2(2000.0, 2000.0), bounds, 1.0)
            .unwrap();

        // Vertical room (600 - 2 - 30) binds before horizontal room.
        assert_eq!(crop.content_rect().min, anchor);
        assert_eq!(crop.content_height, 568.0);
        assert_eq!(crop.content_width, 568.0);
        assert!(bounds.contains_rect(crop.outer_rect()));
    }

    #[test]
    fn resize_past_right_edge_uses_remaining_room() {
        let bounds = container();
        let mut crop = CropBox {
            left: 600.0,
            top: 0.0,
            content_width: 20.0,
            content_height: 20.0,
        };
        let anchor = Handle::BottomRight.anchor(crop.content_rect());
        crop.resize(Handle::BottomRight, anchor, pos2(5000.0, 5000.0), bounds, 1.0)
            .unwrap();

        // Right edge of content = 800 - border.
        assert_eq!(crop.content_width, 800.0 - BORDER_WIDTH - anchor.x);
        assert_eq!(crop.content_rect().max.x, 800.0 - BORDER_WIDTH);
    }

    #[test]
    fn resize_follows_pointer_on_constraining_axis() {
        let bounds = container();
        let mut crop = CropBox::centered(&square(), bounds);
        let anchor = Handle::BottomRight.anchor(crop.content_rect());

        crop.resize(
            Handle::BottomRight,
            anchor,
            anchor + vec2(300.0, 100.0),
            bounds,
            1.0,
        )
        .unwrap();
        assert_eq!(crop.content_width, 100.0);
        assert_eq!(crop.content_height, 100.0);
    }

    #[test]
    fn resize_top_left_keeps_bottom_right_fixed() {
        let bounds = container();
        let mut crop = CropBox::centered(&square(), bounds);
        let anchor = Handle::TopLeft.anchor(crop.content_rect());

        crop.resize(Handle::TopLeft, anchor, anchor - vec2(200.0, 200.0), bounds, 1.0)
            .unwrap();

        assert_eq!(crop.content_rect().max, anchor);
        assert_eq!(crop.content_width, 200.0);
        assert_eq!(crop.left, anchor.x - 200.0 - BORDER_WIDTH);
    }

    #[test]
    fn resize_below_floor_is_rejected() {
        let bounds = container();
        let mut crop = CropBox::centered(&square(), bounds);
        let before = crop;
        let anchor = Handle::TopRight.anchor(crop.content_rect());

        let result = crop.resize(
            Handle::TopRight,
            anchor,
            anchor + vec2(15.0, -50.0),
            bounds,
            1.0,
        );

        assert_eq!(result, Err(CropError::ResizeRejected));
        assert_eq!(crop, before);
    }

    #[test]
    fn resize_sweep_keeps_invariants() {
        let bounds = Rect::from_min_size(pos2(20.0, 10.0), vec2(640.0, 480.0));
        let ratio = TargetRatio::new(3, 2).unwrap();

        for handle in Handle::ALL {
            let mut crop = CropBox::centered(&ratio, bounds);
            let anchor = handle.anchor(crop.content_rect());
            let mut previous = crop;

            for step in 0..60 {
                let t = step as f32 * 23.0 - 500.0;
                let pointer = pos2(anchor.x + t, anchor.y + t * 0.7);
                match crop.resize(handle, anchor, pointer, bounds, ratio.value()) {
                    Ok(()) => {
                        assert_ratio(&crop, ratio.value());
                        assert!(crop.content_width >= MIN_CONTENT_SIZE);
                        assert!(crop.content_height >= MIN_CONTENT_SIZE);
                        assert!(bounds.contains_rect(crop.content_rect()));
                        assert_eq!(handle.anchor(crop.content_rect()), anchor);
                    }
                    Err(err) => {
                        assert_eq!(err, CropError::ResizeRejected);
                        assert_eq!(crop, previous);
                    }
                }
                previous = crop;
            }
        }
    }

    #[test]
    fn centered_fits_tiny_container() {
        let bounds = Rect::from_min_size(pos2(0.0, 0.0), vec2(30.0, 30.0));
        let crop = CropBox::centered(&square(), bounds);

        assert_eq!((crop.content_width, crop.content_height), (26.0, 26.0));
        assert_eq!(crop.position(), pos2(0.0, 0.0));
        assert!(bounds.contains_rect(crop.outer_rect()));

        let wide = Rect::from_min_size(pos2(5.0, 5.0), vec2(300.0, 12.0));
        let crop = CropBox::centered(&TargetRatio::new(16, 9).unwrap(), wide);
        assert!(wide.contains_rect(crop.outer_rect()));
    }

    #[test]
    fn fitted_reproduces_centered_box() {
        let bounds = Rect::from_min_size(pos2(13.0, 7.0), vec2(731.0, 419.0));
        for (w, h) in [(1, 1), (3, 2), (2, 3), (16, 9), (9, 16), (1, 7), (7, 1), (1024, 768)] {
            let ratio = TargetRatio::new(w, h).unwrap();
            let crop = CropBox::centered(&ratio, bounds);

            // Sizes that went through a float round trip.
            let content = crop.content_rect();
            let blurred = Rect::from_min_size(
                content.min + vec2(0.0001, -0.0001),
                content.size() - vec2(0.0002, 0.0002),
            );
            assert_eq!(CropBox::fitted(blurred, ratio.value(), bounds), crop, "{w}:{h}");
        }
    }

    #[test]
    fn fitted_maps_onto_smaller_layout() {
        let to = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 300.0));
        let content = Rect::from_min_size(pos2(65.0, 15.0), vec2(270.0, 270.0));

        let crop = CropBox::fitted(content, 1.0, to);

        assert_eq!(crop.content_width, 270.0);
        assert_eq!(crop.content_rect().min, pos2(65.0, 15.0));
        assert!(to.contains_rect(crop.outer_rect()));
    }

    #[test]
    fn fitted_never_leaves_bounds() {
        let bounds = Rect::from_min_size(pos2(0.0, 0.0), vec2(200.0, 100.0));
        let content = Rect::from_min_size(pos2(150.0, -40.0), vec2(320.0, 180.0));
        let ratio = 16.0 / 9.0;

        let crop = CropBox::fitted(content, ratio, bounds);

        assert!(bounds.contains_rect(crop.outer_rect()));
        assert_ratio(&crop, ratio);
    }
}
