//! Common types and data structures

use crate::library::AssetScope;
use image::RgbaImage;

/// The closed set of album kinds the picker can list.
/// Every kind except `UserAlbum` carries a fixed display title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumType {
    AllPhotos,
    Favorites,
    Panoramas,
    Videos,
    TimeLapse,
    RecentlyDeleted,
    UserAlbum,
}

impl AlbumType {
    /// Fixed display title. `UserAlbum` is the generic fallback; user albums
    /// are normally displayed under their own name via [`AlbumTitle::UserNamed`].
    pub fn title(self) -> &'static str {
        match self {
            AlbumType::AllPhotos => "All Photos",
            AlbumType::Favorites => "Favorites",
            AlbumType::Panoramas => "Panoramas",
            AlbumType::Videos => "Videos",
            AlbumType::TimeLapse => "Time Lapse",
            AlbumType::RecentlyDeleted => "Recently Deleted",
            AlbumType::UserAlbum => "User Album",
        }
    }
}

/// How an album row is titled: fixed system title, or the user's own album name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumTitle {
    Fixed(AlbumType),
    UserNamed(String),
}

impl AlbumTitle {
    pub fn text(&self) -> &str {
        match self {
            AlbumTitle::Fixed(album_type) => album_type.title(),
            AlbumTitle::UserNamed(name) => name,
        }
    }

    pub fn album_type(&self) -> AlbumType {
        match self {
            AlbumTitle::Fixed(album_type) => *album_type,
            AlbumTitle::UserNamed(_) => AlbumType::UserAlbum,
        }
    }
}

/// One row of the album list. Built fresh on every load and never mutated;
/// the whole list is replaced wholesale when the next load completes.
#[derive(Debug, Clone)]
pub struct AlbumSummary {
    pub title: AlbumTitle,
    pub scope: AssetScope,
    pub thumbnail: Option<RgbaImage>,
}

/// A completed background load, tagged with the generation that started it.
/// Results from a superseded generation are dropped on arrival.
pub struct LoadResult {
    pub generation: u64,
    pub albums: Vec<AlbumSummary>,
}

/// Request to present an album's asset grid (the grid itself is not part of
/// this screen; the request is surfaced to the host).
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub title: String,
    pub scope: AssetScope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_titles_are_stable() {
        assert_eq!(AlbumType::AllPhotos.title(), "All Photos");
        assert_eq!(AlbumType::Favorites.title(), "Favorites");
        assert_eq!(AlbumType::Panoramas.title(), "Panoramas");
        assert_eq!(AlbumType::RecentlyDeleted.title(), "Recently Deleted");
    }

    #[test]
    fn user_named_title_overrides_fixed() {
        let title = AlbumTitle::UserNamed("Trip".into());
        assert_eq!(title.text(), "Trip");
        assert_eq!(title.album_type(), AlbumType::UserAlbum);
    }

    #[test]
    fn fixed_title_reports_its_type() {
        let title = AlbumTitle::Fixed(AlbumType::Panoramas);
        assert_eq!(title.text(), "Panoramas");
        assert_eq!(title.album_type(), AlbumType::Panoramas);
    }
}
