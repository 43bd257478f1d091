//! Filesystem scan populating the catalog
//!
//! Top-level directories of the library root become user albums; files are
//! classified image/video by extension. Assets whose file has disappeared are
//! moved to the trashed state rather than deleted, which is what feeds the
//! Recently Deleted smart album.

use super::catalog::{AssetRecord, Catalog, MediaType};
use super::LibraryResult;
use crate::constants::{FAVORITES_SIDECAR, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub imported: usize,
    pub refreshed: usize,
    pub trashed: usize,
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn classify(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Video)
    } else {
        None
    }
}

/// Register top-level directories as user albums, ordered by name.
/// Returns directory name -> album id.
fn register_albums(root: &Path, catalog: &Catalog) -> LibraryResult<HashMap<String, i64>> {
    let mut names: Vec<String> = std::fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();

    let mut album_ids = HashMap::new();
    for (position, name) in names.iter().enumerate() {
        let id = catalog.upsert_album(name, position as i64)?;
        album_ids.insert(name.clone(), id);
    }
    Ok(album_ids)
}

/// Apply the favorites sidecar file, if present. The sidecar is the full
/// favorites state: flags not listed in it are cleared.
fn apply_favorites(root: &Path, catalog: &Catalog) -> LibraryResult<()> {
    catalog.clear_favorites()?;
    let sidecar = root.join(FAVORITES_SIDECAR);
    let Ok(contents) = std::fs::read_to_string(&sidecar) else {
        return Ok(());
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !catalog.set_favorite(&root.join(line), true)? {
            debug!(entry = line, "Favorites sidecar names an unknown asset");
        }
    }
    Ok(())
}

/// Walk the library root and reconcile the catalog with what is on disk.
pub fn scan(root: &Path, catalog: &Catalog) -> LibraryResult<ScanSummary> {
    let known: HashMap<PathBuf, (i64, bool)> = catalog
        .asset_paths()?
        .into_iter()
        .map(|(id, path, trashed)| (path, (id, trashed)))
        .collect();

    let album_ids = register_albums(root, catalog)?;
    let mut summary = ScanSummary::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(media_type) = classify(path) else {
            continue;
        };

        let album_id = path
            .strip_prefix(root)
            .ok()
            .filter(|rel| rel.components().count() >= 2)
            .and_then(|rel| rel.components().next())
            .and_then(|top| album_ids.get(&top.as_os_str().to_string_lossy().into_owned()))
            .copied();

        let (width, height) = match media_type {
            MediaType::Image => image::image_dimensions(path).unwrap_or((0, 0)),
            MediaType::Video => (0, 0),
        };

        let created_at = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(Utc::now);

        catalog.upsert_asset(&AssetRecord {
            path,
            album_id,
            media_type,
            width,
            height,
            created_at,
        })?;

        if known.contains_key(path) {
            summary.refreshed += 1;
        } else {
            summary.imported += 1;
        }
        seen.insert(path.to_path_buf());
    }

    // Files that vanished since the last scan go to the trash
    for (path, &(id, trashed)) in &known {
        if !trashed && !seen.contains(path) && path.starts_with(root) {
            catalog.set_trashed(id)?;
            summary.trashed += 1;
        }
    }

    apply_favorites(root, catalog)?;
    catalog.set_library_root(root)?;

    if summary.trashed > 0 {
        warn!(trashed = summary.trashed, "Scan found assets missing on disk");
    }
    debug!(
        imported = summary.imported,
        refreshed = summary.refreshed,
        root = %root.display(),
        "Scan finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{AssetScope, AssetSort, PhotoLibrary, SmartAlbumKind};

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "photo-picker-scan-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn scan_builds_albums_and_classifies_files() {
        let root = temp_root("classify");
        std::fs::create_dir_all(root.join("Trip/nested")).unwrap();
        std::fs::create_dir_all(root.join("Pets")).unwrap();
        std::fs::create_dir_all(root.join(".thumbs")).unwrap();
        std::fs::write(root.join("solo.jpg"), b"jpg").unwrap();
        std::fs::write(root.join("Trip/a.jpg"), b"jpg").unwrap();
        std::fs::write(root.join("Trip/nested/b.png"), b"png").unwrap();
        std::fs::write(root.join("Pets/c.mp4"), b"mp4").unwrap();
        std::fs::write(root.join("notes.txt"), b"text").unwrap();
        std::fs::write(root.join(".thumbs/x.jpg"), b"jpg").unwrap();

        let catalog = Catalog::open_in_memory().unwrap();
        let summary = scan(&root, &catalog).unwrap();

        assert_eq!(summary.imported, 4);
        assert_eq!(summary.refreshed, 0);
        assert_eq!(summary.trashed, 0);

        let albums = catalog.user_albums().unwrap();
        let titles: Vec<&str> = albums.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Pets", "Trip"]);

        // Nested files belong to their top-level album
        let trip = albums.iter().find(|a| a.title == "Trip").unwrap();
        let in_trip = catalog
            .image_assets(AssetScope::User(trip.id), AssetSort::CreationAscending)
            .unwrap();
        assert_eq!(in_trip.len(), 2);

        // Library-wide scope is images only
        let all = catalog
            .image_assets(AssetScope::Library, AssetSort::CreationAscending)
            .unwrap();
        assert_eq!(all.len(), 3);

        assert_eq!(catalog.library_root().unwrap(), Some(root.clone()));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn rescan_trashes_missing_files() {
        let root = temp_root("trash");
        std::fs::write(root.join("keep.jpg"), b"jpg").unwrap();
        std::fs::write(root.join("gone.jpg"), b"jpg").unwrap();

        let catalog = Catalog::open_in_memory().unwrap();
        scan(&root, &catalog).unwrap();

        std::fs::remove_file(root.join("gone.jpg")).unwrap();
        let summary = scan(&root, &catalog).unwrap();

        assert_eq!(summary.imported, 0);
        assert_eq!(summary.refreshed, 1);
        assert_eq!(summary.trashed, 1);

        let deleted = catalog
            .image_assets(
                AssetScope::Smart(SmartAlbumKind::RecentlyDeleted),
                AssetSort::CreationAscending,
            )
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].path, root.join("gone.jpg"));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn panorama_dimensions_are_probed_from_headers() {
        let root = temp_root("pano");
        write_png(&root.join("wide.png"), 300, 100);
        write_png(&root.join("tall.png"), 100, 300);

        let catalog = Catalog::open_in_memory().unwrap();
        scan(&root, &catalog).unwrap();

        let panoramas = catalog
            .image_assets(
                AssetScope::Smart(SmartAlbumKind::Panoramas),
                AssetSort::CreationAscending,
            )
            .unwrap();
        assert_eq!(panoramas.len(), 1);
        assert_eq!(panoramas[0].path, root.join("wide.png"));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn favorites_sidecar_is_authoritative() {
        let root = temp_root("favorites");
        std::fs::create_dir_all(root.join("Trip")).unwrap();
        std::fs::write(root.join("Trip/a.jpg"), b"jpg").unwrap();
        std::fs::write(root.join("Trip/b.jpg"), b"jpg").unwrap();
        std::fs::write(root.join(FAVORITES_SIDECAR), "Trip/a.jpg\n").unwrap();

        let catalog = Catalog::open_in_memory().unwrap();
        scan(&root, &catalog).unwrap();

        let favorites = catalog
            .image_assets(
                AssetScope::Smart(SmartAlbumKind::Favorites),
                AssetSort::CreationAscending,
            )
            .unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].path, root.join("Trip/a.jpg"));

        // Removing the entry clears the flag on the next scan
        std::fs::write(root.join(FAVORITES_SIDECAR), "").unwrap();
        scan(&root, &catalog).unwrap();
        let favorites = catalog
            .image_assets(
                AssetScope::Smart(SmartAlbumKind::Favorites),
                AssetSort::CreationAscending,
            )
            .unwrap();
        assert!(favorites.is_empty());
        std::fs::remove_dir_all(&root).ok();
    }
}
