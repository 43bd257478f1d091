//! App module - contains the main application state and logic

mod loader;
mod thumbnails;

use crate::library::catalog::Catalog;
use crate::library::changes::{ChangeHub, ChangeSubscription, LibraryChange};
use crate::library::scanner::{self, ScanSummary};
use crate::settings::Settings;
use crate::theme;
use crate::types::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) db_path: PathBuf,
    pub(crate) data_dir: PathBuf,
    pub(crate) library_root: Option<PathBuf>,

    // The displayed list: always the result of the most recently completed
    // load (or the initial empty state), replaced wholesale, never merged
    pub(crate) albums: Vec<AlbumSummary>,
    pub(crate) thumb_textures: Vec<Option<egui::TextureHandle>>,
    pub(crate) selected_row: Option<usize>,
    pub(crate) last_navigation: Option<NavigationRequest>,

    // Load state
    pub(crate) loading: bool,
    pub(crate) load_generation: u64,
    pub(crate) load_tx: Sender<LoadResult>,
    pub(crate) load_rx: Receiver<LoadResult>,
    pub(crate) cancel_token: Option<CancellationToken>,

    // Scan state
    pub(crate) scanning: bool,
    pub(crate) scan_tx: Sender<ScanSummary>,
    pub(crate) scan_rx: Receiver<ScanSummary>,

    // Library-change notifications; the subscription drops with the screen
    pub(crate) change_hub: Arc<ChangeHub>,
    pub(crate) change_subscription: ChangeSubscription,

    pub(crate) runtime: tokio::runtime::Runtime,

    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,

    // Window state
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) first_frame_done: bool,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        stored_root: Option<PathBuf>,
        data_dir: PathBuf,
        db_path: PathBuf,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let library_root = settings.library_root_path().or(stored_root);

        let (load_tx, load_rx) = channel();
        let (scan_tx, scan_rx) = channel();
        let change_hub = ChangeHub::new();
        let change_subscription = change_hub.subscribe();

        Self {
            db_path,
            data_dir,
            library_root,
            albums: Vec::new(),
            thumb_textures: Vec::new(),
            selected_row: None,
            last_navigation: None,
            loading: false,
            load_generation: 0,
            load_tx,
            load_rx,
            cancel_token: None,
            scanning: false,
            scan_tx,
            scan_rx,
            change_hub,
            change_subscription,
            runtime: tokio::runtime::Runtime::new().unwrap(),
            toast_message: None,
            toast_start: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
            first_frame_done: false,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            library_root: self
                .library_root
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        };
        settings.save(&self.data_dir);
    }

    /// Abandon the in-flight load, if any. Its completion (if it still
    /// arrives) carries a superseded generation and is dropped.
    pub fn cancel_inflight_load(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }

    /// Rescan the configured library root in the background. Completion posts
    /// a library-change notification, which in turn triggers a reload.
    pub fn start_scan(&mut self, ctx: &egui::Context) {
        let Some(root) = self.library_root.clone() else {
            return;
        };
        if self.scanning {
            return;
        }
        self.scanning = true;

        let db_path = self.db_path.clone();
        let tx = self.scan_tx.clone();
        let hub = self.change_hub.clone();
        let ctx = ctx.clone();

        info!(root = %root.display(), "Starting library scan");
        self.runtime.spawn_blocking(move || {
            let summary = Catalog::open(&db_path)
                .and_then(|catalog| scanner::scan(&root, &catalog))
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Library scan failed");
                    ScanSummary::default()
                });
            tx.send(summary).ok();
            hub.post(LibraryChange::AssetsChanged);
            ctx.request_repaint();
        });
    }

    /// Pick a new library root, then rescan it.
    pub fn choose_library(&mut self, ctx: &egui::Context) {
        let start_dir = self
            .library_root
            .clone()
            .unwrap_or_else(crate::utils::default_library_root);
        if let Some(root) = rfd::FileDialog::new().set_directory(start_dir).pick_folder() {
            info!(root = %root.display(), "Library root selected");
            self.library_root = Some(root);
            self.start_scan(ctx);
        }
    }

    /// Row selection: surface the navigation request for the album's asset
    /// grid. The grid screen itself is not part of this picker.
    pub fn open_album(&mut self, index: usize) {
        let Some(album) = self.albums.get(index) else {
            return;
        };
        self.selected_row = Some(index);
        let request = NavigationRequest {
            title: album.title.text().to_owned(),
            scope: album.scope,
        };
        info!(album = %request.title, scope = ?request.scope, "Album detail requested");
        self.show_toast(format!("{}: asset grid not available yet", request.title));
        self.last_navigation = Some(request);
    }

    pub fn show_toast(&mut self, message: String) {
        self.toast_message = Some(message);
        self.toast_start = Some(std::time::Instant::now());
    }
}
