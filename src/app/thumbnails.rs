//! Thumbnail texture management
//!
//! Decoded thumbnails arrive with the load result; textures are created
//! lazily on the UI thread as rows come into view, and the cache is rebuilt
//! whenever the list is replaced.

use super::App;
use eframe::egui;

impl App {
    pub fn thumbnail_texture(
        &mut self,
        ctx: &egui::Context,
        index: usize,
    ) -> Option<egui::TextureHandle> {
        if let Some(Some(texture)) = self.thumb_textures.get(index) {
            return Some(texture.clone());
        }

        let rgba = self.albums.get(index)?.thumbnail.as_ref()?;
        let size = [rgba.width() as usize, rgba.height() as usize];
        let texture = ctx.load_texture(
            format!("album_thumb_{index}"),
            egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()),
            egui::TextureOptions::LINEAR,
        );

        if let Some(slot) = self.thumb_textures.get_mut(index) {
            *slot = Some(texture.clone());
        }
        Some(texture)
    }
}
