//! The egui front end: folder browser, target controls, and the crop canvas.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui;
use image::DynamicImage;

use crate::crop_box::{BORDER_WIDTH, Handle, Hit};
use crate::error::{CropError, StoreError};
use crate::i18n::{Language, Text};
use crate::interaction::{CaptureFlag, Interaction, PointerCapture};
use crate::ratio::AspectPreset;
use crate::session::{ImageSource, Session};
use crate::settings::Settings;
use crate::store::{self, SaveOutcome};
use crate::version;
use crate::viewport::DisplayImage;

const PADDING: f32 = 20.0;
const HANDLE_RADIUS: f32 = 6.0;

#[derive(Debug, PartialEq)]
enum Status {
    Info(String),
    Error(String),
    /// Set and cleared only by the target inputs.
    InvalidTarget,
}

impl Status {
    /// What is left once the target inputs hold a valid ratio again.
    fn after_valid_target(status: Option<Status>) -> Option<Status> {
        status.filter(|s| *s != Status::InvalidTarget)
    }
}

/// Escape cancels a running gesture, but not while a text field has focus.
fn escape_cancels(escape: bool, typing: bool, interaction: &Interaction) -> bool {
    escape && !typing && !interaction.is_idle()
}

pub struct CropperApp {
    settings: Settings,
    folder_input: String,
    folder: Option<PathBuf>,
    images: Vec<String>,
    selected: Option<String>,
    texture: Option<egui::TextureHandle>,
    /// Set when a new image is picked; the session takes it over once the
    /// canvas knows where the image will be laid out.
    pending_source: Option<ImageSource>,
    session: Session,
    capture: Rc<CaptureFlag>,
    width_input: String,
    height_input: String,
    resize: bool,
    description: String,
    status: Option<Status>,
    last_saved_text: Option<bool>,
    pending_save: Option<Receiver<Result<SaveOutcome, StoreError>>>,
}

impl CropperApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        install_cjk_fallback(&cc.egui_ctx);

        let capture = Rc::new(CaptureFlag::default());
        let shared: Rc<dyn PointerCapture> = capture.clone();
        let (w, h) = settings.default_target;

        let mut app = Self {
            folder_input: String::new(),
            folder: None,
            images: Vec::new(),
            selected: None,
            texture: None,
            pending_source: None,
            session: Session::new(shared),
            capture,
            width_input: w.to_string(),
            height_input: h.to_string(),
            resize: false,
            description: String::new(),
            status: None,
            last_saved_text: None,
            pending_save: None,
            settings,
        };
        app.apply_target();

        if let Some(dir) = app.settings.last_image_dir.clone() {
            app.folder_input = dir.display().to_string();
            app.open_folder(dir);
        }
        app
    }

    fn tr(&self, text: Text) -> &'static str {
        self.settings.language.text(text)
    }

    fn persist_settings(&self) {
        if let Err(e) = self.settings.save_to_default_path() {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    fn open_folder(&mut self, path: PathBuf) {
        match store::list_images(&path) {
            Ok(images) => {
                log::info!("Opened {:?} ({} images)", path, images.len());
                self.images = images;
                self.selected = None;
                self.texture = None;
                self.pending_source = None;
                self.session.close_image();
                self.folder_input = path.display().to_string();
                self.settings.last_image_dir = Some(path.clone());
                self.folder = Some(path);
                self.persist_settings();
                self.status = None;
            }
            Err(e) => {
                log::warn!("Cannot open folder: {}", e);
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    fn select_image(&mut self, ctx: &egui::Context, name: String) {
        let Some(folder) = self.folder.clone() else {
            return;
        };

        let loaded = store::image_path(&folder, &name)
            .and_then(|path| image::open(path).map_err(StoreError::from));
        match loaded {
            Ok(image) => {
                self.texture = Some(load_texture(ctx, &image));
                self.session.close_image();
                self.pending_source = Some(ImageSource {
                    folder,
                    name: name.clone(),
                });
                self.selected = Some(name);
                self.status = None;
            }
            Err(e) => {
                log::error!("Failed to load {:?}: {}", name, e);
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    /// Opens a dropped folder, or the folder of a dropped image with that
    /// image selected.
    fn open_dropped(&mut self, ctx: &egui::Context, path: &Path) {
        if path.is_dir() {
            self.open_folder(path.to_path_buf());
            return;
        }

        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let name = name.to_string_lossy().into_owned();
        self.open_folder(parent.to_path_buf());
        if self.images.contains(&name) {
            self.select_image(ctx, name);
        }
    }

    fn apply_target(&mut self) {
        match self.session.set_target(&self.width_input, &self.height_input) {
            Ok(ratio) => {
                log::debug!("target ratio {}", ratio);
                self.status = Status::after_valid_target(self.status.take());
            }
            Err(CropError::UndefinedRatio) => {
                self.status = Some(Status::InvalidTarget);
            }
            Err(e) => log::debug!("target not applied: {}", e),
        }
    }

    fn start_save(&mut self) {
        if self.pending_save.is_some() {
            return;
        }

        let request = match self.session.save_request(&self.description, self.resize) {
            Ok(request) => request,
            Err(e) => {
                log::info!("Save refused: {}", e);
                self.status = Some(Status::Error(self.tr(Text::NoSelection).to_string()));
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if tx.send(store::crop_and_save(&request)).is_err() {
                log::warn!("Save finished after the window closed");
            }
        });
        self.pending_save = Some(rx);
        self.status = Some(Status::Info(self.tr(Text::Saving).to_string()));
    }

    fn poll_save(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.pending_save else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(outcome)) => {
                self.status = Some(Status::Info(format!(
                    "{} {}",
                    self.tr(Text::SavedTo),
                    outcome.path.display()
                )));
                self.last_saved_text = Some(outcome.saved_text);
                self.pending_save = None;
            }
            Ok(Err(e)) => {
                log::error!("Save failed: {}", e);
                self.status = Some(Status::Error(e.to_string()));
                self.pending_save = None;
            }
            Err(TryRecvError::Empty) => ctx.request_repaint_after(Duration::from_millis(50)),
            Err(TryRecvError::Disconnected) => {
                log::error!("Save worker exited without a result");
                self.pending_save = None;
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.tr(Text::Folder));
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.folder_input).desired_width(360.0),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.button(self.tr(Text::Browse)).clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    self.open_folder(path);
                }
            }
            if ui.button(self.tr(Text::Open)).clicked() || submitted {
                let path = PathBuf::from(self.folder_input.trim());
                self.open_folder(path);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(version::banner());

                let mut language = self.settings.language;
                egui::ComboBox::from_id_salt("language")
                    .selected_text(language.name())
                    .show_ui(ui, |ui| {
                        for option in Language::ALL {
                            ui.selectable_value(&mut language, option, option.name());
                        }
                    });
                if language != self.settings.language {
                    self.settings.language = language;
                    self.persist_settings();
                }
                ui.label(self.tr(Text::Language));
            });
        });
    }

    fn image_list(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading(self.tr(Text::Images));
        ui.separator();

        if self.folder.is_some() && self.images.is_empty() {
            ui.label(self.tr(Text::NoImages));
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for name in &self.images {
                let selected = self.selected.as_ref() == Some(name);
                if ui.selectable_label(selected, name).clicked() && !selected {
                    clicked = Some(name.clone());
                }
            }
        });

        if let Some(name) = clicked {
            self.select_image(ctx, name);
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.tr(Text::TargetSize));
            let mut changed = false;
            changed |= ui
                .add(egui::TextEdit::singleline(&mut self.width_input).desired_width(60.0))
                .changed();
            ui.label("×");
            changed |= ui
                .add(egui::TextEdit::singleline(&mut self.height_input).desired_width(60.0))
                .changed();

            let current = self.session.target();
            egui::ComboBox::from_id_salt("aspect_preset")
                .selected_text(current.map_or_else(|| "–".to_string(), |t| t.to_string()))
                .show_ui(ui, |ui| {
                    for preset in AspectPreset::ALL {
                        if ui.selectable_label(false, preset.to_string()).clicked() {
                            let width = current.map_or(self.settings.default_target.0, |t| t.width());
                            if let Some(ratio) = preset.with_width(width) {
                                self.width_input = ratio.width().to_string();
                                self.height_input = ratio.height().to_string();
                                changed = true;
                            }
                        }
                    }
                });

            if ui
                .button("🔄")
                .on_hover_text(self.tr(Text::Swap))
                .clicked()
            {
                std::mem::swap(&mut self.width_input, &mut self.height_input);
                changed = true;
            }

            if changed {
                self.apply_target();
            }

            ui.separator();
            let resize_label = self.tr(Text::ResizeToTarget);
            ui.checkbox(&mut self.resize, resize_label);
            ui.separator();

            let saving = self.pending_save.is_some();
            if ui
                .add_enabled(!saving, egui::Button::new(self.tr(Text::Save)))
                .clicked()
            {
                self.start_save();
            }
        });

        ui.label(self.tr(Text::Description));
        ui.add(
            egui::TextEdit::multiline(&mut self.description)
                .desired_rows(2)
                .desired_width(f32::INFINITY),
        );
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let Some(texture) = &self.texture else {
            ui.centered_and_justified(|ui| ui.label(self.tr(Text::PickImage)));
            return;
        };

        let available = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(available, egui::Sense::click_and_drag());
        let painter = ui.painter_at(available);

        let size = texture.size();
        let layout = DisplayImage::fit([size[0] as u32, size[1] as u32], available, PADDING);
        if let Some(source) = self.pending_source.take() {
            self.session.load_image(source, layout);
        } else if let Err(e) = self.session.reflow(layout) {
            log::trace!("reflow skipped: {}", e);
        }

        let image_rect = layout.display_rect();
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // Handle Input
        if response.drag_started() {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(pos) = origin {
                if let Err(e) = self.session.pointer_down(pos) {
                    log::trace!("pointer down ignored: {}", e);
                }
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Err(e) = self.session.pointer_move(pos) {
                    log::trace!("pointer move ignored: {}", e);
                }
            }
        }
        if response.drag_stopped() {
            self.session.pointer_up();
        }
        let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
        if escape_cancels(escape, ui.ctx().wants_keyboard_input(), self.session.interaction()) {
            self.session.cancel_gesture();
        }

        let Some(crop) = self.session.crop_box().copied() else {
            return;
        };

        if self.capture.is_active() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if let Some(hover) = response.hover_pos() {
            let icon = match crop.hit_test(hover) {
                Some(Hit::Handle(Handle::TopLeft | Handle::BottomRight)) => {
                    Some(egui::CursorIcon::ResizeNwSe)
                }
                Some(Hit::Handle(Handle::TopRight | Handle::BottomLeft)) => {
                    Some(egui::CursorIcon::ResizeNeSw)
                }
                Some(Hit::Body) => Some(egui::CursorIcon::Grab),
                None => None,
            };
            if let Some(icon) = icon {
                ui.ctx().set_cursor_icon(icon);
            }
        }

        let content = crop.content_rect();

        // Dim everything outside the crop content.
        let overlay_color = egui::Color32::from_black_alpha(150);
        let dimmed = [
            egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, content.min.y)),
            egui::Rect::from_min_max(egui::pos2(image_rect.min.x, content.max.y), image_rect.max),
            egui::Rect::from_min_max(
                egui::pos2(image_rect.min.x, content.min.y),
                egui::pos2(content.min.x, content.max.y),
            ),
            egui::Rect::from_min_max(
                egui::pos2(content.max.x, content.min.y),
                egui::pos2(image_rect.max.x, content.max.y),
            ),
        ];
        for rect in dimmed {
            painter.rect_filled(rect, 0.0, overlay_color);
        }

        painter.rect_stroke(
            content.expand(BORDER_WIDTH / 2.0),
            0.0,
            egui::Stroke::new(BORDER_WIDTH, egui::Color32::WHITE),
        );

        let handle_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
        for handle in Handle::ALL {
            painter.circle(
                handle.corner(content),
                HANDLE_RADIUS,
                egui::Color32::WHITE,
                handle_stroke,
            );
        }
    }

    fn status_line(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match &self.status {
                Some(Status::Info(text)) => {
                    ui.label(text);
                }
                Some(Status::Error(text)) => {
                    ui.colored_label(ui.visuals().error_fg_color, text);
                }
                Some(Status::InvalidTarget) => {
                    ui.colored_label(ui.visuals().error_fg_color, self.tr(Text::InvalidTarget));
                }
                None => {}
            }

            if let Some(saved_text) = self.last_saved_text {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let text = if saved_text {
                        self.tr(Text::DescriptionAttached)
                    } else {
                        self.tr(Text::NoDescription)
                    };
                    ui.label(text);
                });
            }
        });
    }
}

impl eframe::App for CropperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle dropped files
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.open_dropped(ctx, &path);
        }

        self.poll_save(ctx);

        egui::TopBottomPanel::top("folder_bar").show(ctx, |ui| self.top_bar(ui));
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_line(ui));
        egui::SidePanel::left("image_list")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| self.image_list(ui, ctx));

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.selected.is_some() {
                self.controls(ui);
                ui.separator();
            }
            self.canvas(ui);
        });
    }
}

fn load_texture(ctx: &egui::Context, image: &DynamicImage) -> egui::TextureHandle {
    let size = [image.width() as _, image.height() as _];
    let image_buffer = image.to_rgba8();
    let pixels = image_buffer.as_flat_samples();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
    ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR)
}

/// egui's bundled fonts have no Hangul; borrow a system font when one of the
/// usual ones is installed.
fn install_cjk_fallback(ctx: &egui::Context) {
    const CANDIDATES: [&str; 4] = [
        "C:\\Windows\\Fonts\\malgun.ttf",
        "/System/Library/Fonts/AppleSDGothicNeo.ttc",
        "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    let Some(bytes) = CANDIDATES.iter().find_map(|path| std::fs::read(path).ok()) else {
        log::debug!("No CJK font found; Korean text may not render");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop_box::CropBox;
    use crate::interaction::CaptureGuard;

    #[test]
    fn valid_target_only_clears_its_own_message() {
        assert_eq!(Status::after_valid_target(Some(Status::InvalidTarget)), None);
        assert_eq!(
            Status::after_valid_target(Some(Status::Error("disk full".into()))),
            Some(Status::Error("disk full".into()))
        );
        assert_eq!(
            Status::after_valid_target(Some(Status::Info("saved".into()))),
            Some(Status::Info("saved".into()))
        );
        assert_eq!(Status::after_valid_target(None), None);
    }

    #[test]
    fn escape_needs_a_gesture_and_no_text_focus() {
        let capture: Rc<dyn PointerCapture> = Rc::new(CaptureFlag::default());
        let origin = CropBox {
            left: 0.0,
            top: 0.0,
            content_width: 100.0,
            content_height: 100.0,
        };
        let dragging = Interaction::Dragging {
            start_pointer: egui::pos2(50.0, 50.0),
            start_position: origin.position(),
            origin,
            _capture: CaptureGuard::acquire(&capture),
        };

        assert!(escape_cancels(true, false, &dragging));
        assert!(!escape_cancels(true, true, &dragging));
        assert!(!escape_cancels(false, false, &dragging));
        assert!(!escape_cancels(true, false, &Interaction::Idle));
    }
}
