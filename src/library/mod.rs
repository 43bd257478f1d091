//! Photo library access: catalog storage, filesystem scanning, change notifications

pub mod catalog;
pub mod changes;
pub mod scanner;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LibraryResult<T> = Result<T, LibraryError>;

/// System-curated album kinds the catalog can derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmartAlbumKind {
    Favorites,
    Panoramas,
    Videos,
    RecentlyDeleted,
}

/// A user-created album: a top-level folder of the library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAlbum {
    pub id: i64,
    pub title: String,
}

/// Which assets a fetch covers: the whole library, a derived smart album,
/// or a user album by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetScope {
    Library,
    Smart(SmartAlbumKind),
    User(i64),
}

/// Sort key for asset fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSort {
    CreationAscending,
    CreationDescending,
}

/// A single media item known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: i64,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// The capability the album list loader depends on. Implemented by the SQLite
/// catalog for the real application and by fakes in tests.
pub trait PhotoLibrary {
    /// Enumerate the regular smart albums the library can derive.
    fn smart_albums(&self) -> LibraryResult<Vec<SmartAlbumKind>>;

    /// Enumerate top-level user albums, in their stored order.
    fn user_albums(&self) -> LibraryResult<Vec<UserAlbum>>;

    /// Fetch the assets of a scope sorted by creation date. The library-wide
    /// scope yields images only; album scopes are not media-filtered.
    fn image_assets(&self, scope: AssetScope, sort: AssetSort) -> LibraryResult<Vec<Asset>>;

    /// Read an asset's raw bytes, blocking. Missing data is `Ok(None)`.
    fn asset_data(&self, asset: &Asset) -> LibraryResult<Option<Vec<u8>>>;
}
