#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use image_crop_studio::{CropperApp, Settings, version};

fn main() -> eframe::Result {
    let loaded = Settings::default_path()
        .as_deref()
        .map(Settings::load_from)
        .transpose();
    let settings = match &loaded {
        Ok(settings) => settings.clone().unwrap_or_default(),
        Err(_) => Settings::default(),
    };

    // RUST_LOG still wins over the saved level.
    env_logger::Builder::new()
        .filter_level(settings.log_level.to_level_filter())
        .parse_default_env()
        .init();
    log::info!("{}", version::banner());
    log::info!("Build: {}", version::BuildInfo::current());
    if let Err(e) = loaded {
        log::warn!("Failed to read settings, using defaults: {}", e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(version::banner()),
        ..Default::default()
    };
    eframe::run_native(
        "Image Crop Studio",
        options,
        Box::new(|cc| Ok(Box::new(CropperApp::new(cc, settings)))),
    )
}
