// routes/gallery.rs
// Showroom album under /api/gallery. Entries may link a car; deleting an
// entry pulls its photo references out of every car.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthUser, authorize_owner_or_admin};
use crate::error::AppError;
use crate::models::{GalleryItem, GalleryPatch};
use crate::normalize::{normalize_record, normalize_records};
use crate::state::AppState;
use crate::storage::ingest_photos;

use super::helpers::{optional_text, parse_object_id, with_warning};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryPayload {
    pub photos: Option<Vec<String>>,
    pub car_id: Option<String>,
    pub caption: Option<String>,
    pub testimonial: Option<String>,
}

async fn checked_car_id(
    state: &AppState,
    raw: Option<&str>,
) -> Result<Option<mongodb::bson::oid::ObjectId>, AppError> {
    let Some(raw) = raw else { return Ok(None) };
    let id = parse_object_id(raw, "car")?;
    state
        .store
        .cars
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("car"))?;
    Ok(Some(id))
}

pub async fn create_gallery_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<GalleryPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let photos_in = body.photos.unwrap_or_default();
    if photos_in.is_empty() {
        return Err(AppError::Validation("at least one photo is required".into()));
    }
    let car_id = checked_car_id(&state, body.car_id.as_deref()).await?;
    let (photos, warning) = ingest_photos(state.photos.as_ref(), photos_in, "gallery").await;

    let item = GalleryItem {
        id: None,
        photos,
        car_id,
        caption: optional_text(body.caption),
        testimonial: optional_text(body.testimonial),
        created_by: auth.id,
        created_at: None,
        updated_at: None,
    };
    let item = state.store.gallery.insert(item).await?;
    Ok((
        StatusCode::CREATED,
        Json(with_warning(normalize_record(&item), warning)),
    ))
}

pub async fn list_gallery(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let items = state.store.gallery.list(auth.scope()).await?;
    Ok(Json(normalize_records(&items)))
}

pub async fn get_gallery_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "gallery item")?;
    let item = state
        .store
        .gallery
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("gallery item"))?;
    authorize_owner_or_admin(&auth, &item.created_by)?;
    Ok(Json(normalize_record(&item)))
}

pub async fn update_gallery_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<GalleryPayload>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "gallery item")?;
    let existing = state
        .store
        .gallery
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("gallery item"))?;
    authorize_owner_or_admin(&auth, &existing.created_by)?;

    let (photos, warning) = match body.photos {
        Some(photos_in) => {
            if photos_in.is_empty() {
                return Err(AppError::Validation(
                    "a gallery entry needs at least one photo".into(),
                ));
            }
            let (photos, warning) =
                ingest_photos(state.photos.as_ref(), photos_in, "gallery").await;
            (Some(photos), warning)
        }
        None => (None, None),
    };
    let patch = GalleryPatch {
        photos,
        car_id: checked_car_id(&state, body.car_id.as_deref()).await?,
        caption: optional_text(body.caption),
        testimonial: optional_text(body.testimonial),
    };
    let item = state
        .store
        .gallery
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("gallery item"))?;
    Ok(Json(with_warning(normalize_record(&item), warning)))
}

pub async fn delete_gallery_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "gallery item")?;
    let item = state
        .store
        .gallery
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("gallery item"))?;
    authorize_owner_or_admin(&auth, &item.created_by)?;
    state.store.gallery.delete(&id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "message": "gallery item deleted" }),
    ))
}
