//! Display-space ↔ original-space mapping for the image on screen.
//!
//! The crop box lives in display space (screen points, the same space egui
//! paints in). Saving needs original pixels, so every conversion goes through
//! [`ViewportMapper`].

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::error::CropError;

/// The image as currently laid out on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayImage {
    pub natural_width: u32,
    pub natural_height: u32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub display_width: f32,
    pub display_height: f32,
}

impl DisplayImage {
    /// Fits an image of `natural` size into `available`, keeping its aspect
    /// ratio and centering it inside `padding` on every side. Offsets and
    /// sizes snap to whole points so the crop box can stay integral.
    pub fn fit(natural: [u32; 2], available: Rect, padding: f32) -> Self {
        let image_size = vec2(natural[0].max(1) as f32, natural[1].max(1) as f32);
        let max_size = (available.size() - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));

        let scale = (max_size.x / image_size.x).min(max_size.y / image_size.y);
        let display_size = (image_size * scale).floor().max(Vec2::splat(1.0));

        let offset = available.min + (available.size() - display_size) / 2.0;

        Self {
            natural_width: natural[0],
            natural_height: natural[1],
            offset_x: offset.x.round(),
            offset_y: offset.y.round(),
            display_width: display_size.x,
            display_height: display_size.y,
        }
    }

    pub fn origin(&self) -> Pos2 {
        pos2(self.offset_x, self.offset_y)
    }

    pub fn display_rect(&self) -> Rect {
        Rect::from_min_size(self.origin(), vec2(self.display_width, self.display_height))
    }
}

/// Crop rectangle in original image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropResult {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ViewportMapper {
    image: Option<DisplayImage>,
}

impl ViewportMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active image wholesale.
    pub fn set_image(&mut self, image: DisplayImage) {
        self.image = Some(image);
    }

    pub fn clear(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Result<&DisplayImage, CropError> {
        self.image.as_ref().ok_or(CropError::NoActiveImage)
    }

    /// Layout reflow: same image, new on-screen geometry. Natural size is
    /// kept from the loaded image.
    pub fn reflow(&mut self, layout: DisplayImage) -> Result<(), CropError> {
        let image = self.image.as_mut().ok_or(CropError::NoActiveImage)?;
        image.offset_x = layout.offset_x;
        image.offset_y = layout.offset_y;
        image.display_width = layout.display_width;
        image.display_height = layout.display_height;
        Ok(())
    }

    /// Original pixels per display point.
    pub fn scale_factor(&self) -> Result<f32, CropError> {
        let image = self.image()?;
        Ok(image.natural_width as f32 / image.display_width)
    }

    /// Converts a display-space rectangle to original pixels. The position is
    /// taken relative to the image origin; each component is scaled and
    /// rounded on its own.
    pub fn to_original_pixels(&self, display_rect: Rect) -> Result<CropResult, CropError> {
        let image = self.image()?;
        let scale = self.scale_factor()?;
        let relative = display_rect.min - image.origin();

        Ok(CropResult {
            x: (relative.x * scale).round().max(0.0) as u32,
            y: (relative.y * scale).round().max(0.0) as u32,
            width: (display_rect.width() * scale).round().max(0.0) as u32,
            height: (display_rect.height() * scale).round().max(0.0) as u32,
        })
    }

    /// Unrounded counterpart of [`Self::to_original_pixels`].
    pub fn to_original_rect(&self, display_rect: Rect) -> Result<Rect, CropError> {
        let origin = self.image()?.origin();
        let scale = self.scale_factor()?;
        Ok(Rect::from_min_size(
            Pos2::ZERO + (display_rect.min - origin) * scale,
            display_rect.size() * scale,
        ))
    }

    /// Places a rectangle given in original pixels on the current layout.
    pub fn to_display_rect(&self, original: Rect) -> Result<Rect, CropError> {
        let origin = self.image()?.origin();
        let scale = self.scale_factor()?;
        Ok(Rect::from_min_size(
            origin + original.min.to_vec2() / scale,
            original.size() / scale,
        ))
    }

    /// The image's display rectangle; the crop box is clamped to it.
    pub fn container_bounds(&self) -> Result<Rect, CropError> {
        Ok(self.image()?.display_rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_800x600_at(x: f32, y: f32) -> DisplayImage {
        DisplayImage {
            natural_width: 1600,
            natural_height: 1200,
            offset_x: x,
            offset_y: y,
            display_width: 800.0,
            display_height: 600.0,
        }
    }

    #[test]
    fn queries_fail_without_image() {
        let mapper = ViewportMapper::new();
        assert_eq!(mapper.scale_factor(), Err(CropError::NoActiveImage));
        assert_eq!(mapper.container_bounds(), Err(CropError::NoActiveImage));
        assert_eq!(
            mapper.to_original_pixels(Rect::from_min_size(Pos2::ZERO, vec2(10.0, 10.0))),
            Err(CropError::NoActiveImage)
        );
    }

    #[test]
    fn full_display_rect_maps_to_natural_size() {
        let mut mapper = ViewportMapper::new();
        mapper.set_image(image_800x600_at(40.0, 25.0));

        let bounds = mapper.container_bounds().unwrap();
        let result = mapper.to_original_pixels(bounds).unwrap();
        assert_eq!(
            result,
            CropResult {
                x: 0,
                y: 0,
                width: 1600,
                height: 1200
            }
        );
    }

    #[test]
    fn full_rect_round_trips_with_fractional_scale() {
        let mut mapper = ViewportMapper::new();
        mapper.set_image(DisplayImage {
            natural_width: 1000,
            natural_height: 750,
            offset_x: 0.0,
            offset_y: 0.0,
            display_width: 333.0,
            display_height: 250.0,
        });

        let result = mapper
            .to_original_pixels(mapper.container_bounds().unwrap())
            .unwrap();
        assert_eq!((result.x, result.y, result.width), (0, 0, 1000));
        assert!(result.height.abs_diff(750) <= 2);
    }

    #[test]
    fn offset_is_removed_before_scaling() {
        let mut mapper = ViewportMapper::new();
        mapper.set_image(image_800x600_at(100.0, 50.0));

        let rect = Rect::from_min_size(pos2(230.0, 80.0), vec2(540.0, 540.0));
        let result = mapper.to_original_pixels(rect).unwrap();
        assert_eq!(
            result,
            CropResult {
                x: 260,
                y: 60,
                width: 1080,
                height: 1080
            }
        );
    }

    #[test]
    fn conversions_do_not_accumulate_rounding() {
        let mut mapper = ViewportMapper::new();
        mapper.set_image(DisplayImage {
            natural_width: 1000,
            natural_height: 1000,
            offset_x: 0.0,
            offset_y: 0.0,
            display_width: 300.0,
            display_height: 300.0,
        });

        let rect = Rect::from_min_size(pos2(1.0, 1.0), vec2(1.0, 1.0));
        let first = mapper.to_original_pixels(rect).unwrap();
        for _ in 0..10 {
            assert_eq!(mapper.to_original_pixels(rect).unwrap(), first);
        }
        assert_eq!(first.x, 3);
    }

    #[test]
    fn fit_centers_and_preserves_aspect() {
        let available = Rect::from_min_size(pos2(0.0, 0.0), vec2(1000.0, 700.0));
        let image = DisplayImage::fit([1600, 1200], available, 20.0);

        assert_eq!(image.display_height, 660.0);
        assert_eq!(image.display_width, 880.0);
        assert_eq!(image.offset_x, 60.0);
        assert_eq!(image.offset_y, 20.0);
        assert!(available.contains_rect(image.display_rect()));
    }

    #[test]
    fn reflow_keeps_natural_size() {
        let mut mapper = ViewportMapper::new();
        assert_eq!(
            mapper.reflow(image_800x600_at(0.0, 0.0)),
            Err(CropError::NoActiveImage)
        );

        mapper.set_image(image_800x600_at(0.0, 0.0));
        let mut layout = image_800x600_at(10.0, 10.0);
        layout.natural_width = 1;
        layout.display_width = 400.0;
        layout.display_height = 300.0;
        mapper.reflow(layout).unwrap();

        assert_eq!(mapper.image().unwrap().natural_width, 1600);
        assert_eq!(mapper.scale_factor().unwrap(), 4.0);
    }

    #[test]
    fn original_rect_survives_layout_change() {
        let mut mapper = ViewportMapper::new();
        mapper.set_image(image_800x600_at(100.0, 50.0));
        let display = Rect::from_min_size(pos2(230.0, 80.0), vec2(540.0, 540.0));

        let original = mapper.to_original_rect(display).unwrap();
        assert_eq!(original, Rect::from_min_size(pos2(260.0, 60.0), vec2(1080.0, 1080.0)));

        let mut layout = image_800x600_at(40.0, 0.0);
        layout.display_width = 400.0;
        layout.display_height = 300.0;
        mapper.reflow(layout).unwrap();

        let moved = mapper.to_display_rect(original).unwrap();
        assert_eq!(moved, Rect::from_min_size(pos2(105.0, 15.0), vec2(270.0, 270.0)));
    }
}
