//! SQLite catalog backing the photo library
//!
//! Assets and user albums live in a single database file in the app data
//! directory. Smart albums are not stored; their membership is derived from
//! asset columns (favorite flag, dimensions, media type, trashed state).

use super::{
    Asset, AssetScope, AssetSort, LibraryResult, PhotoLibrary, SmartAlbumKind, UserAlbum,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Media classification recorded at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// One asset as the scanner hands it to the catalog.
pub struct AssetRecord<'a> {
    pub path: &'a Path,
    pub album_id: Option<i64>,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
}

pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open or create the catalog at the given path.
    pub fn open(path: &Path) -> LibraryResult<Self> {
        let conn = Connection::open(path)?;
        let catalog = Self { conn };
        catalog.init_schema()?;
        debug!(path = %path.display(), "Catalog opened");
        Ok(catalog)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> LibraryResult<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = Self { conn };
        catalog.init_schema()?;
        Ok(catalog)
    }

    fn init_schema(&self) -> LibraryResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS albums (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                position INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS assets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL UNIQUE,
                album_id INTEGER REFERENCES albums(id),
                media_type TEXT NOT NULL DEFAULT 'image',
                width INTEGER NOT NULL DEFAULT 0,
                height INTEGER NOT NULL DEFAULT 0,
                favorite INTEGER NOT NULL DEFAULT 0,
                trashed INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_assets_album ON assets(album_id);
            CREATE INDEX IF NOT EXISTS idx_assets_created_at ON assets(created_at);
            CREATE INDEX IF NOT EXISTS idx_assets_trashed ON assets(trashed);

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// The pictures directory this catalog was last scanned from
    pub fn library_root(&self) -> LibraryResult<Option<PathBuf>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = 'library_root'")?;
        let mut rows = stmt.query([])?;

        if let Some(row) = rows.next()? {
            let root: String = row.get(0)?;
            Ok(Some(PathBuf::from(root)))
        } else {
            Ok(None)
        }
    }

    pub fn set_library_root(&self, root: &Path) -> LibraryResult<()> {
        self.conn.execute(
            "INSERT INTO metadata (key, value) VALUES ('library_root', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![root.to_string_lossy()],
        )?;
        Ok(())
    }

    /// Count of non-trashed assets
    pub fn asset_count(&self) -> LibraryResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM assets WHERE trashed = 0", [], |r| {
                    r.get(0)
                })?;
        Ok(count as usize)
    }

    /// Insert a user album or refresh its position, returning its id
    pub fn upsert_album(&self, title: &str, position: i64) -> LibraryResult<i64> {
        self.conn.execute(
            "INSERT INTO albums (title, position) VALUES (?1, ?2)
             ON CONFLICT(title) DO UPDATE SET position = excluded.position",
            params![title, position],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM albums WHERE title = ?1",
            params![title],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    /// Insert an asset or refresh its metadata. A previously trashed asset
    /// whose file reappeared comes back out of the trash.
    pub fn upsert_asset(&self, record: &AssetRecord) -> LibraryResult<i64> {
        self.conn.execute(
            "INSERT INTO assets (path, album_id, media_type, width, height, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(path) DO UPDATE SET
                album_id = excluded.album_id,
                media_type = excluded.media_type,
                width = excluded.width,
                height = excluded.height,
                created_at = excluded.created_at,
                trashed = 0",
            params![
                record.path.to_string_lossy(),
                record.album_id,
                record.media_type.as_str(),
                record.width,
                record.height,
                record.created_at.timestamp(),
            ],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM assets WHERE path = ?1",
            params![record.path.to_string_lossy()],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    /// Flag or unflag an asset as favorite. Returns false if the path is unknown.
    pub fn set_favorite(&self, path: &Path, favorite: bool) -> LibraryResult<bool> {
        let changed = self.conn.execute(
            "UPDATE assets SET favorite = ?1 WHERE path = ?2",
            params![favorite, path.to_string_lossy()],
        )?;
        Ok(changed > 0)
    }

    pub fn clear_favorites(&self) -> LibraryResult<()> {
        self.conn
            .execute("UPDATE assets SET favorite = 0 WHERE favorite = 1", [])?;
        Ok(())
    }

    /// Move an asset to the trash (its file disappeared from disk)
    pub fn set_trashed(&self, id: i64) -> LibraryResult<()> {
        self.conn
            .execute("UPDATE assets SET trashed = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Every known asset path with its trashed state, for scan reconciliation
    pub fn asset_paths(&self) -> LibraryResult<Vec<(i64, PathBuf, bool)>> {
        let mut stmt = self.conn.prepare("SELECT id, path, trashed FROM assets")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    PathBuf::from(row.get::<_, String>(1)?),
                    row.get::<_, bool>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn row_to_asset(row: &Row) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        path: PathBuf::from(row.get::<_, String>(1)?),
        created_at: DateTime::from_timestamp(row.get::<_, i64>(2)?, 0)
            .unwrap_or(DateTime::UNIX_EPOCH),
    })
}

impl PhotoLibrary for Catalog {
    fn smart_albums(&self) -> LibraryResult<Vec<SmartAlbumKind>> {
        // The derivable regular smart albums, in their fixed enumeration order.
        Ok(vec![
            SmartAlbumKind::Favorites,
            SmartAlbumKind::Panoramas,
            SmartAlbumKind::Videos,
            SmartAlbumKind::RecentlyDeleted,
        ])
    }

    fn user_albums(&self) -> LibraryResult<Vec<UserAlbum>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM albums ORDER BY position, id")?;
        let albums = stmt
            .query_map([], |row| {
                Ok(UserAlbum {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(albums)
    }

    fn image_assets(&self, scope: AssetScope, sort: AssetSort) -> LibraryResult<Vec<Asset>> {
        let filter = match scope {
            AssetScope::Library => "media_type = 'image' AND trashed = 0",
            AssetScope::Smart(SmartAlbumKind::Favorites) => "favorite = 1 AND trashed = 0",
            AssetScope::Smart(SmartAlbumKind::Panoramas) => {
                "media_type = 'image' AND width > 0 AND width >= height * 2 AND trashed = 0"
            }
            AssetScope::Smart(SmartAlbumKind::Videos) => "media_type = 'video' AND trashed = 0",
            AssetScope::Smart(SmartAlbumKind::RecentlyDeleted) => "trashed = 1",
            AssetScope::User(_) => "album_id = ?1 AND trashed = 0",
        };
        let order = match sort {
            AssetSort::CreationAscending => "ASC",
            AssetSort::CreationDescending => "DESC",
        };
        let sql = format!(
            "SELECT id, path, created_at FROM assets WHERE {filter}
             ORDER BY created_at {order}, id {order}"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let assets = match scope {
            AssetScope::User(album_id) => stmt
                .query_map(params![album_id], row_to_asset)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            _ => stmt
                .query_map([], row_to_asset)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(assets)
    }

    fn asset_data(&self, asset: &Asset) -> LibraryResult<Option<Vec<u8>>> {
        match std::fs::read(&asset.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + n * 86_400, 0).unwrap()
    }

    fn record(path: &Path, album_id: Option<i64>, media_type: MediaType) -> AssetRecord<'_> {
        AssetRecord {
            path,
            album_id,
            media_type,
            width: 400,
            height: 300,
            created_at: day(0),
        }
    }

    #[test]
    fn favorites_membership_follows_flag() {
        let catalog = Catalog::open_in_memory().unwrap();
        let a = PathBuf::from("/pics/a.jpg");
        let b = PathBuf::from("/pics/b.jpg");
        catalog.upsert_asset(&record(&a, None, MediaType::Image)).unwrap();
        catalog.upsert_asset(&record(&b, None, MediaType::Image)).unwrap();

        assert!(catalog.set_favorite(&b, true).unwrap());

        let favorites = catalog
            .image_assets(
                AssetScope::Smart(SmartAlbumKind::Favorites),
                AssetSort::CreationAscending,
            )
            .unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].path, b);
    }

    #[test]
    fn set_favorite_on_unknown_path_is_false() {
        let catalog = Catalog::open_in_memory().unwrap();
        assert!(!catalog
            .set_favorite(Path::new("/pics/nope.jpg"), true)
            .unwrap());
    }

    #[test]
    fn panoramas_require_twice_as_wide() {
        let catalog = Catalog::open_in_memory().unwrap();
        let wide = PathBuf::from("/pics/wide.jpg");
        let normal = PathBuf::from("/pics/normal.jpg");
        let mut r = record(&wide, None, MediaType::Image);
        r.width = 4000;
        r.height = 1200;
        catalog.upsert_asset(&r).unwrap();
        let mut r = record(&normal, None, MediaType::Image);
        r.width = 4000;
        r.height = 3000;
        catalog.upsert_asset(&r).unwrap();

        let panoramas = catalog
            .image_assets(
                AssetScope::Smart(SmartAlbumKind::Panoramas),
                AssetSort::CreationAscending,
            )
            .unwrap();
        assert_eq!(panoramas.len(), 1);
        assert_eq!(panoramas[0].path, wide);
    }

    #[test]
    fn library_scope_is_images_only_and_skips_trashed() {
        let catalog = Catalog::open_in_memory().unwrap();
        let photo = PathBuf::from("/pics/photo.jpg");
        let clip = PathBuf::from("/pics/clip.mp4");
        let gone = PathBuf::from("/pics/gone.jpg");
        catalog.upsert_asset(&record(&photo, None, MediaType::Image)).unwrap();
        catalog.upsert_asset(&record(&clip, None, MediaType::Video)).unwrap();
        let gone_id = catalog.upsert_asset(&record(&gone, None, MediaType::Image)).unwrap();
        catalog.set_trashed(gone_id).unwrap();

        let all = catalog
            .image_assets(AssetScope::Library, AssetSort::CreationAscending)
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].path, photo);

        let deleted = catalog
            .image_assets(
                AssetScope::Smart(SmartAlbumKind::RecentlyDeleted),
                AssetSort::CreationAscending,
            )
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].path, gone);
    }

    #[test]
    fn trashed_asset_reappearing_is_restored() {
        let catalog = Catalog::open_in_memory().unwrap();
        let path = PathBuf::from("/pics/back.jpg");
        let id = catalog.upsert_asset(&record(&path, None, MediaType::Image)).unwrap();
        catalog.set_trashed(id).unwrap();

        catalog.upsert_asset(&record(&path, None, MediaType::Image)).unwrap();

        let all = catalog
            .image_assets(AssetScope::Library, AssetSort::CreationAscending)
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn user_albums_keep_position_order() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.upsert_album("Pets", 1).unwrap();
        catalog.upsert_album("Trip", 0).unwrap();

        let albums = catalog.user_albums().unwrap();
        let titles: Vec<&str> = albums.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Trip", "Pets"]);
    }

    #[test]
    fn user_scope_only_returns_that_album() {
        let catalog = Catalog::open_in_memory().unwrap();
        let trip = catalog.upsert_album("Trip", 0).unwrap();
        let pets = catalog.upsert_album("Pets", 1).unwrap();
        let in_trip = PathBuf::from("/pics/Trip/one.jpg");
        let in_pets = PathBuf::from("/pics/Pets/two.jpg");
        catalog.upsert_asset(&record(&in_trip, Some(trip), MediaType::Image)).unwrap();
        catalog.upsert_asset(&record(&in_pets, Some(pets), MediaType::Image)).unwrap();

        let assets = catalog
            .image_assets(AssetScope::User(trip), AssetSort::CreationAscending)
            .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].path, in_trip);
    }

    #[test]
    fn assets_sort_by_creation_date() {
        let catalog = Catalog::open_in_memory().unwrap();
        for (name, n) in [("mid.jpg", 1), ("new.jpg", 2), ("old.jpg", 0)] {
            let path = PathBuf::from(format!("/pics/{name}"));
            let mut r = record(&path, None, MediaType::Image);
            r.created_at = day(n);
            catalog.upsert_asset(&r).unwrap();
        }

        let ascending = catalog
            .image_assets(AssetScope::Library, AssetSort::CreationAscending)
            .unwrap();
        let names: Vec<String> = ascending
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["old.jpg", "mid.jpg", "new.jpg"]);
        assert_eq!(ascending.last().unwrap().created_at, day(2));

        let descending = catalog
            .image_assets(AssetScope::Library, AssetSort::CreationDescending)
            .unwrap();
        assert_eq!(descending[0].created_at, day(2));
    }

    #[test]
    fn asset_data_reads_bytes_and_tolerates_missing_files() {
        let dir = std::env::temp_dir().join(format!("photo-picker-catalog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let on_disk = dir.join("real.jpg");
        std::fs::write(&on_disk, b"not really a jpeg").unwrap();

        let catalog = Catalog::open_in_memory().unwrap();
        let real = Asset {
            id: 1,
            path: on_disk.clone(),
            created_at: day(0),
        };
        let missing = Asset {
            id: 2,
            path: dir.join("missing.jpg"),
            created_at: day(0),
        };

        assert_eq!(
            catalog.asset_data(&real).unwrap(),
            Some(b"not really a jpeg".to_vec())
        );
        assert_eq!(catalog.asset_data(&missing).unwrap(), None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn library_root_roundtrip() {
        let catalog = Catalog::open_in_memory().unwrap();
        assert_eq!(catalog.library_root().unwrap(), None);

        catalog.set_library_root(Path::new("/pics")).unwrap();
        assert_eq!(catalog.library_root().unwrap(), Some(PathBuf::from("/pics")));

        catalog.set_library_root(Path::new("/other")).unwrap();
        assert_eq!(
            catalog.library_root().unwrap(),
            Some(PathBuf::from("/other"))
        );
    }
}
