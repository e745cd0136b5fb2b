//! Folder-at-a-time image cropping with an aspect-locked crop box.
//!
//! The geometry core ([`viewport`], [`crop_box`], [`interaction`], and
//! [`session`]) has no UI dependency beyond egui's math types; [`app`] wires
//! it to an eframe window and [`store`] writes the results.

pub mod app;
pub mod crop_box;
pub mod error;
pub mod i18n;
pub mod interaction;
pub mod ratio;
pub mod session;
pub mod settings;
pub mod store;
pub mod version;
pub mod viewport;

pub use app::CropperApp;
pub use error::{CropError, SettingsError, StoreError};
pub use session::{ImageSource, SaveRequest, Session};
pub use settings::Settings;
