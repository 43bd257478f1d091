//! Album list loading
//!
//! One background task per load: enumerate the albums, resolve each one's
//! representative thumbnail (blocking reads are fine here), then hand the
//! finished list back to the UI thread in a single message.

use super::App;
use crate::constants::THUMBNAIL_EDGE;
use crate::library::catalog::Catalog;
use crate::library::{AssetScope, AssetSort, PhotoLibrary, SmartAlbumKind};
use crate::types::{AlbumSummary, AlbumTitle, AlbumType, LoadResult};
use image::RgbaImage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Build the album list, in display order: All Photos, then the Favorites and
/// Panoramas smart albums (other smart subtypes are skipped), then user
/// albums under their own names. Returns `None` if the token was cancelled;
/// a cancelled load must not publish anything.
pub fn load_albums(
    library: &dyn PhotoLibrary,
    token: &CancellationToken,
) -> Option<Vec<AlbumSummary>> {
    let mut albums = Vec::new();

    albums.push(AlbumSummary {
        title: AlbumTitle::Fixed(AlbumType::AllPhotos),
        scope: AssetScope::Library,
        thumbnail: representative_image(library, AssetScope::Library),
    });

    match library.smart_albums() {
        Ok(kinds) => {
            for kind in kinds {
                if token.is_cancelled() {
                    return None;
                }
                let album_type = match kind {
                    SmartAlbumKind::Favorites => AlbumType::Favorites,
                    SmartAlbumKind::Panoramas => AlbumType::Panoramas,
                    _ => continue,
                };
                albums.push(AlbumSummary {
                    title: AlbumTitle::Fixed(album_type),
                    scope: AssetScope::Smart(kind),
                    thumbnail: representative_image(library, AssetScope::Smart(kind)),
                });
            }
        }
        Err(e) => warn!(error = %e, "Smart album enumeration failed"),
    }

    match library.user_albums() {
        Ok(user_albums) => {
            for album in user_albums {
                if token.is_cancelled() {
                    return None;
                }
                let scope = AssetScope::User(album.id);
                albums.push(AlbumSummary {
                    title: AlbumTitle::UserNamed(album.title),
                    scope,
                    thumbnail: representative_image(library, scope),
                });
            }
        }
        Err(e) => warn!(error = %e, "User album enumeration failed"),
    }

    if token.is_cancelled() {
        return None;
    }
    debug!(count = albums.len(), "Album list assembled");
    Some(albums)
}

/// The album's most recently created image, decoded and downscaled.
/// Any failure along the way (no assets, missing bytes, undecodable data)
/// yields no image; the row is still shown with a blank thumbnail slot.
pub fn representative_image(library: &dyn PhotoLibrary, scope: AssetScope) -> Option<RgbaImage> {
    let assets = library
        .image_assets(scope, AssetSort::CreationAscending)
        .map_err(|e| warn!(error = %e, "Asset enumeration failed"))
        .ok()?;
    let newest = assets.last()?;
    let bytes = library.asset_data(newest).ok().flatten()?;
    let decoded = image::load_from_memory(&bytes).ok()?;
    Some(decoded.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).to_rgba8())
}

impl App {
    /// Kick off a background load. Supersedes (and cancels) any in-flight
    /// load: the generation counter guarantees a stale completion can never
    /// overwrite a newer list.
    pub fn start_load(&mut self, ctx: &egui::Context) {
        self.cancel_inflight_load();
        self.load_generation += 1;
        self.loading = true;

        let generation = self.load_generation;
        let token = CancellationToken::new();
        self.cancel_token = Some(token.clone());

        let db_path = self.db_path.clone();
        let tx = self.load_tx.clone();
        let ctx = ctx.clone();

        debug!(generation, "Starting album list load");
        self.runtime.spawn_blocking(move || {
            // rusqlite connections don't cross threads; the task opens its own
            let albums = match Catalog::open(&db_path) {
                Ok(catalog) => load_albums(&catalog, &token),
                Err(e) => {
                    warn!(error = %e, "Catalog unavailable for load");
                    Some(Vec::new())
                }
            };
            if let Some(albums) = albums {
                tx.send(LoadResult { generation, albums }).ok();
                ctx.request_repaint();
            }
        });
    }

    /// Drain completed loads, keeping only the current generation.
    pub fn poll_load_results(&mut self) {
        while let Ok(result) = self.load_rx.try_recv() {
            if result.generation != self.load_generation {
                debug!(
                    generation = result.generation,
                    current = self.load_generation,
                    "Dropping stale load result"
                );
                continue;
            }
            self.thumb_textures = result.albums.iter().map(|_| None).collect();
            self.albums = result.albums;
            self.selected_row = None;
            self.loading = false;
            self.cancel_token = None;
        }
    }
}
