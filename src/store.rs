//! Filesystem side of cropping: listing a folder and writing results.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::StoreError;
use crate::session::SaveRequest;

/// Extensions offered in the image list (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Results go into this subfolder of the source folder.
pub const OUTPUT_DIR: &str = "resized";

/// What a successful save produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    /// Whether a `.txt` description was written next to the image.
    pub saved_text: bool,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Image file names directly inside `folder`, sorted by name.
pub fn list_images(folder: &Path) -> Result<Vec<String>, StoreError> {
    if !folder.is_dir() {
        return Err(StoreError::FolderNotFound {
            path: folder.to_path_buf(),
        });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();

    log::debug!("{} images in {:?}", names.len(), folder);
    Ok(names)
}

/// Full path of `name` inside `folder`; fails if it is not a file.
pub fn image_path(folder: &Path, name: &str) -> Result<PathBuf, StoreError> {
    let path = folder.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(StoreError::ImageNotFound { path })
    }
}

/// `<dir>/<stem>.png`, or the first free `<dir>/<stem>-NN.png`.
fn unique_png_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.png"));
    let mut counter = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{counter:02}.png"));
        counter += 1;
    }
    path
}

/// Crops the source image, optionally resizes it, and writes it as PNG into
/// the `resized` subfolder together with the description, if any.
pub fn crop_and_save(request: &SaveRequest) -> Result<SaveOutcome, StoreError> {
    let source = image_path(&request.folder_path, &request.image_name)?;
    let output_dir = request.folder_path.join(OUTPUT_DIR);
    fs::create_dir_all(&output_dir)?;

    let image = DynamicImage::ImageRgba8(image::open(&source)?.to_rgba8());
    let (w, h) = (image.width(), image.height());

    // The coordinates come from the UI; keep them inside the image anyway.
    let coords = request.coords;
    let x = coords.x.min(w.saturating_sub(1));
    let y = coords.y.min(h.saturating_sub(1));
    let width = coords.width.max(1).min(w - x);
    let height = coords.height.max(1).min(h - y);

    let mut cropped = image.crop_imm(x, y, width, height);

    if request.resize {
        if let (Some(tw), Some(th)) = (request.target_width, request.target_height) {
            cropped = cropped.resize_exact(tw, th, FilterType::Lanczos3);
        }
    }

    let stem = Path::new(&request.image_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let path = unique_png_path(&output_dir, stem);
    cropped.save_with_format(&path, ImageFormat::Png)?;

    let saved_text = !request.description.trim().is_empty();
    if saved_text {
        fs::write(path.with_extension("txt"), &request.description)?;
    }

    log::info!(
        "saved {:?} ({}x{} from {x},{y} {width}x{height})",
        path,
        cropped.width(),
        cropped.height()
    );
    Ok(SaveOutcome { path, saved_text })
}
