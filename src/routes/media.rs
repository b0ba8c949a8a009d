use axum::{extract::State, Json};

use crate::{
    models::{
        api::ApiResponse,
        media::{DriveImage, GalleryItem},
    },
    services::{contentful, drive, upstream},
    AppState,
};

/// GET /api/gallery
pub async fn get_gallery(State(state): State<AppState>) -> Json<ApiResponse<Vec<GalleryItem>>> {
    let result = state.contentful.try_photo_gallery().await;
    Json(upstream::envelope(contentful::PHOTO_GALLERY, result))
}

/// GET /api/drive-images
pub async fn list_drive_images(State(state): State<AppState>) -> Json<ApiResponse<Vec<DriveImage>>> {
    let result = state.drive.try_images().await;
    Json(upstream::envelope(drive::SERVICE, result))
}
