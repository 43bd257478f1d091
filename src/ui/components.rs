//! Reusable UI components

use crate::theme;
use crate::types::AlbumType;
use eframe::egui;

/// Icon shown in the thumbnail slot when an album has no representative image
pub fn album_icon(album_type: AlbumType) -> &'static str {
    match album_type {
        AlbumType::AllPhotos => egui_phosphor::regular::IMAGES,
        AlbumType::Favorites => egui_phosphor::regular::HEART,
        AlbumType::Panoramas => egui_phosphor::regular::MOUNTAINS,
        AlbumType::Videos => egui_phosphor::regular::VIDEO_CAMERA,
        AlbumType::TimeLapse => egui_phosphor::regular::TIMER,
        AlbumType::RecentlyDeleted => egui_phosphor::regular::TRASH,
        AlbumType::UserAlbum => egui_phosphor::regular::FOLDER,
    }
}

/// Blank thumbnail slot: dark tile with the album kind's icon
pub fn thumbnail_placeholder(ui: &egui::Ui, rect: egui::Rect, icon: &str) {
    let painter = ui.painter();
    painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_ELEVATED);
    painter.rect_stroke(
        rect,
        theme::RADIUS_DEFAULT,
        egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE),
        egui::StrokeKind::Inside,
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        theme::TEXT_DIM,
    );
}
