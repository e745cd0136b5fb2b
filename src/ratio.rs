//! Target aspect ratio parsed from the width/height inputs.

use crate::error::CropError;

/// Positive `width:height` target. Doubles as the resize target in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetRatio {
    width: u32,
    height: u32,
}

impl TargetRatio {
    /// Returns `None` unless both sides are positive.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Parses the two text inputs. Empty, zero, negative, and non-numeric
    /// values all leave the ratio undefined.
    pub fn parse(width: &str, height: &str) -> Result<Self, CropError> {
        let width = width.trim().parse::<u32>().ok();
        let height = height.trim().parse::<u32>().ok();
        match (width, height) {
            (Some(w), Some(h)) => Self::new(w, h).ok_or(CropError::UndefinedRatio),
            _ => Err(CropError::UndefinedRatio),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `width / height`.
    pub fn value(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl std::fmt::Display for TargetRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Common ratios offered as one-click presets. Portrait variants come from
/// swapping the width and height inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AspectPreset {
    Square,
    R3_2,
    R4_3,
    R16_9,
    R16_10,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 5] = [
        AspectPreset::Square,
        AspectPreset::R3_2,
        AspectPreset::R4_3,
        AspectPreset::R16_9,
        AspectPreset::R16_10,
    ];

    fn parts(self) -> (u32, u32) {
        match self {
            AspectPreset::Square => (1, 1),
            AspectPreset::R3_2 => (3, 2),
            AspectPreset::R4_3 => (4, 3),
            AspectPreset::R16_9 => (16, 9),
            AspectPreset::R16_10 => (16, 10),
        }
    }

    /// Keeps `width` and derives the height from the preset, so the result is
    /// still usable as a resize target. Height never drops below 1.
    pub fn with_width(self, width: u32) -> Option<TargetRatio> {
        let (w, h) = self.parts();
        let height = ((width as f32) * h as f32 / w as f32).round().max(1.0) as u32;
        TargetRatio::new(width, height)
    }
}

impl std::fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.parts();
        write!(f, "{}:{}", w, h)
    }
}
