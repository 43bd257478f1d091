//! Application constants and configuration

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest edge of decoded album thumbnails, in pixels
pub const THUMBNAIL_EDGE: u32 = 256;

/// Edge of the thumbnail slot in the album table, in points
pub const THUMBNAIL_SLOT: f32 = 48.0;

/// File extensions treated as image assets during a scan
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff",
];

/// File extensions treated as video assets during a scan
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "avi", "mkv", "webm"];

/// Sidecar file at the library root listing favorite assets (one relative path per line)
pub const FAVORITES_SIDECAR: &str = "favorites.txt";
