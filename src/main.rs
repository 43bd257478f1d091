#![windows_subsystem = "windows"]
//! Photo Picker - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod constants;
mod library;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;

use app::App;
use constants::*;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use library::catalog::Catalog;
use tracing::{error, info};
use ui::components::{album_icon, thumbnail_placeholder};
use utils::{format_count, get_data_dir};

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "photo-picker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,photo_picker=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Photo Picker starting");

    let db_path = data_dir.join("library.db");
    let catalog = match Catalog::open(&db_path) {
        Ok(catalog) => {
            info!(path = %db_path.display(), "Catalog opened");
            catalog
        }
        Err(e) => {
            error!(error = %e, path = %db_path.display(), "Failed to open catalog");
            panic!("Failed to open catalog: {}", e);
        }
    };
    if let Ok(count) = catalog.asset_count() {
        info!(assets = count, "Catalog loaded");
    }
    let stored_root = catalog.library_root().ok().flatten();
    drop(catalog);

    // Load saved window position/size
    let settings = settings::Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(520.0, 680.0)))
        .with_min_inner_size([420.0, 480.0])
        .with_title("Photos");

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Photo Picker",
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, settings, stored_root, data_dir, db_path);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // First frame: the screen just appeared. Show whatever the catalog
        // already has, then freshen it from disk.
        if !self.first_frame_done {
            self.first_frame_done = true;
            self.start_load(ctx);
            self.start_scan(ctx);
        }

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        // Finished scans
        while let Ok(summary) = self.scan_rx.try_recv() {
            self.scanning = false;
            info!(
                imported = summary.imported,
                refreshed = summary.refreshed,
                trashed = summary.trashed,
                "Library scan complete"
            );
            if summary.imported > 0 || summary.trashed > 0 {
                self.show_toast(format!(
                    "Library updated: {} added, {} removed",
                    summary.imported, summary.trashed
                ));
            }
        }

        // The library changed: rebuild the whole list
        if self.change_subscription.drain() {
            self.start_load(ctx);
        }

        // Completed loads (stale generations are dropped inside)
        self.poll_load_results();

        self.render_top_bar(ctx);
        self.render_status_bar(ctx);
        self.render_album_list(ctx);
        self.render_toast(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.cancel_inflight_load();
        self.save_settings();
    }
}

impl App {
    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .exact_height(theme::TOP_BAR_HEIGHT)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(12, 0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("Photos")
                                .size(theme::FONT_TITLE)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        )
                        .selectable(false),
                    );
                    if self.loading || self.scanning {
                        ui.add(egui::Spinner::new().size(14.0).color(theme::ACCENT_MUTED));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        // Done stays disabled on this screen
                        ui.add_enabled(false, egui::Button::new("Done"));

                        if ui.add(egui::Button::new("Cancel")).clicked() {
                            self.cancel_inflight_load();
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }

                        ui.add_space(theme::SPACING_MD);

                        let rescan = ui.add_enabled(
                            !self.scanning && self.library_root.is_some(),
                            egui::Button::new(egui_phosphor::regular::ARROWS_CLOCKWISE),
                        );
                        if rescan.on_hover_text("Rescan library").clicked() {
                            self.start_scan(ctx);
                        }

                        let choose =
                            ui.add(egui::Button::new(egui_phosphor::regular::FOLDER_OPEN));
                        if choose.on_hover_text("Choose library folder").clicked() {
                            self.choose_library(ctx);
                        }
                    });
                });
            });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(12, 0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let status = if self.scanning {
                        "Scanning library…".to_owned()
                    } else if self.loading {
                        "Loading albums…".to_owned()
                    } else {
                        format_count(self.albums.len(), "album")
                    };
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(status)
                                .size(theme::FONT_CAPTION)
                                .color(theme::TEXT_MUTED),
                        )
                        .selectable(false),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if let Some(root) = &self.library_root {
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(root.display().to_string())
                                        .size(theme::FONT_CAPTION)
                                        .color(theme::TEXT_DIM),
                                )
                                .selectable(false)
                                .truncate(),
                            );
                        }
                    });
                });
            });
    }

    fn render_album_list(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(8, 8)),
            )
            .show(ctx, |ui| {
                if self.library_root.is_none() && !self.loading && self.albums.len() <= 1 {
                    self.render_empty_state(ctx, ui);
                    return;
                }

                // The list stays visible but inert while a load is running
                ui.add_enabled_ui(!self.loading, |ui| {
                    let mut clicked_row: Option<usize> = None;

                    TableBuilder::new(ui)
                        .striped(false)
                        .sense(egui::Sense::click())
                        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                        .column(Column::exact(THUMBNAIL_SLOT + 12.0))
                        .column(Column::remainder())
                        .column(Column::exact(24.0))
                        .body(|mut body| {
                            body.ui_mut().visuals_mut().selection.bg_fill =
                                theme::TABLE_ROW_SELECTED;

                            let count = self.albums.len();
                            body.rows(theme::ROW_HEIGHT, count, |mut row| {
                                let index = row.index();
                                let title = self.albums[index].title.text().to_owned();
                                let album_type = self.albums[index].title.album_type();
                                row.set_selected(self.selected_row == Some(index));

                                row.col(|ui| {
                                    ui.add_space(theme::SPACING_MD);
                                    let (rect, _) = ui.allocate_exact_size(
                                        egui::vec2(THUMBNAIL_SLOT, THUMBNAIL_SLOT),
                                        egui::Sense::hover(),
                                    );
                                    if let Some(texture) = self.thumbnail_texture(ctx, index) {
                                        egui::Image::new(egui::load::SizedTexture::new(
                                            texture.id(),
                                            rect.size(),
                                        ))
                                        .corner_radius(theme::RADIUS_DEFAULT)
                                        .paint_at(ui, rect);
                                    } else {
                                        thumbnail_placeholder(ui, rect, album_icon(album_type));
                                    }
                                });

                                row.col(|ui| {
                                    ui.add_space(theme::SPACING_SM);
                                    ui.add(
                                        egui::Label::new(
                                            egui::RichText::new(title)
                                                .size(theme::FONT_BODY)
                                                .color(theme::TEXT_PRIMARY),
                                        )
                                        .selectable(false)
                                        .truncate(),
                                    );
                                });

                                row.col(|ui| {
                                    ui.add(
                                        egui::Label::new(
                                            egui::RichText::new(
                                                egui_phosphor::regular::CARET_RIGHT,
                                            )
                                            .size(theme::FONT_LABEL)
                                            .color(theme::TEXT_DIM),
                                        )
                                        .selectable(false),
                                    );
                                });

                                if row.response().clicked() {
                                    clicked_row = Some(index);
                                }
                            });
                        });

                    if let Some(index) = clicked_row {
                        self.open_album(index);
                    }
                });

                if self.loading {
                    egui::Area::new(egui::Id::new("busy_overlay"))
                        .order(egui::Order::Foreground)
                        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                        .show(ctx, |ui| {
                            ui.add(egui::Spinner::new().size(28.0).color(theme::ACCENT));
                        });
                }
            });
    }

    fn render_empty_state(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            theme::section_frame().show(ui, |ui| {
                ui.set_width(280.0);
                ui.vertical_centered(|ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(egui_phosphor::regular::IMAGES)
                                .size(40.0)
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );
                    ui.add_space(theme::SPACING_MD);
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("No photo library selected")
                                .size(theme::FONT_BODY)
                                .color(theme::TEXT_SECONDARY),
                        )
                        .selectable(false),
                    );
                    ui.add_space(theme::SPACING_LG);
                    if ui.button("Choose Folder…").clicked() {
                        self.choose_library(ctx);
                    }
                });
            });
        });
    }

    fn render_toast(&mut self, ctx: &egui::Context) {
        let Some(message) = self.toast_message.clone() else {
            return;
        };
        let Some(start) = self.toast_start else {
            return;
        };
        if start.elapsed() > std::time::Duration::from_millis(2500) {
            self.toast_message = None;
            self.toast_start = None;
            return;
        }

        egui::Area::new(egui::Id::new("toast"))
            .order(egui::Order::Foreground)
            .anchor(
                egui::Align2::CENTER_BOTTOM,
                egui::vec2(0.0, -(theme::STATUS_BAR_HEIGHT + 12.0)),
            )
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(theme::BG_SURFACE)
                    .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_DEFAULT))
                    .corner_radius(theme::RADIUS_LARGE)
                    .inner_margin(egui::Margin::symmetric(12, 8))
                    .show(ui, |ui| {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(message)
                                    .size(theme::FONT_LABEL)
                                    .color(theme::TEXT_SECONDARY),
                            )
                            .selectable(false),
                        );
                    });
            });
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
