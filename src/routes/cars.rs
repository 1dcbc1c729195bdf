// routes/cars.rs
// Inventory CRUD under /api/cars. Photos may arrive as data URIs, which are
// pushed through the photo storage; failed uploads degrade to a `warning`
// field instead of failing the write.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthUser, authorize_owner_or_admin};
use crate::error::AppError;
use crate::models::{Car, CarPatch, CarStatus, SoldInfo};
use crate::normalize::{normalize_record, normalize_records};
use crate::state::AppState;
use crate::storage::ingest_photos;

use super::helpers::{
    join_warnings, nonnegative_amount, optional_text, parse_date, parse_object_id,
    required_amount, required_text, with_warning,
};

pub const MAX_CAR_PHOTOS: usize = 12;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CarPayload {
    pub make: Option<String>,
    pub model: Option<String>,
    pub variant: Option<String>,
    pub manufacture_year: Option<i32>,
    pub registration_year: Option<i32>,
    pub chassis_number: Option<String>,
    pub engine_number: Option<String>,
    pub buying_price: Option<f64>,
    pub quoting_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub status: Option<String>,
    pub photos: Option<Vec<String>>,
    pub sold: Option<SoldPayload>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SoldPayload {
    pub sold_date: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub testimonial: Option<String>,
    pub customer_photos: Option<Vec<String>>,
}

fn parse_status(value: Option<&str>) -> Result<Option<CarStatus>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => CarStatus::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("unknown car status {raw:?}"))),
    }
}

fn check_year(year: i32, what: &str) -> Result<i32, AppError> {
    if !(1900..=2100).contains(&year) {
        return Err(AppError::Validation(format!("{what} out of range")));
    }
    Ok(year)
}

async fn sold_from_payload(
    state: &AppState,
    payload: SoldPayload,
    hint: &str,
) -> Result<(SoldInfo, Option<String>), AppError> {
    let customer_name = required_text(payload.customer_name, "sold.customerName")?;
    let sold_date = payload
        .sold_date
        .as_deref()
        .map(|raw| parse_date(raw, "sold.soldDate"))
        .transpose()?;
    let (customer_photos, warning) = ingest_photos(
        state.photos.as_ref(),
        payload.customer_photos.unwrap_or_default(),
        hint,
    )
    .await;
    Ok((
        SoldInfo {
            sold_date,
            customer_name,
            customer_phone: optional_text(payload.customer_phone).unwrap_or_default(),
            testimonial: optional_text(payload.testimonial),
            customer_photos,
        },
        warning,
    ))
}

pub async fn create_car(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CarPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let make = required_text(body.make, "make")?;
    let model = required_text(body.model, "model")?;
    let manufacture_year = check_year(
        body.manufacture_year
            .ok_or_else(|| AppError::Validation("manufactureYear is required".into()))?,
        "manufactureYear",
    )?;
    let registration_year = body
        .registration_year
        .map(|year| check_year(year, "registrationYear"))
        .transpose()?;
    let chassis_number = required_text(body.chassis_number, "chassisNumber")?;
    let engine_number = required_text(body.engine_number, "engineNumber")?;
    let buying_price = required_amount(body.buying_price, "buyingPrice")?;
    let quoting_price = body
        .quoting_price
        .map(|price| nonnegative_amount(price, "quotingPrice"))
        .transpose()?;
    let selling_price = body
        .selling_price
        .map(|price| nonnegative_amount(price, "sellingPrice"))
        .transpose()?;
    let status = parse_status(body.status.as_deref())?.unwrap_or_default();

    let photos_in = body.photos.unwrap_or_default();
    if photos_in.is_empty() {
        return Err(AppError::Validation("at least one photo is required".into()));
    }
    if photos_in.len() > MAX_CAR_PHOTOS {
        return Err(AppError::Validation(format!(
            "a car can carry at most {MAX_CAR_PHOTOS} photos"
        )));
    }

    let hint = format!("{make} {model}");
    let (photos, photo_warning) = ingest_photos(state.photos.as_ref(), photos_in, &hint).await;
    let (sold, sold_warning) = match body.sold {
        Some(payload) => {
            let (info, warning) = sold_from_payload(&state, payload, &hint).await?;
            (Some(info), warning)
        }
        None => (None, None),
    };

    let car = Car {
        id: None,
        make,
        model,
        variant: optional_text(body.variant),
        manufacture_year,
        registration_year,
        chassis_number,
        engine_number,
        buying_price,
        quoting_price,
        selling_price,
        status,
        photos,
        sold,
        added_by: auth.id,
        created_at: None,
        updated_at: None,
    };
    let car = state.store.cars.insert(car).await?;
    let value = with_warning(
        normalize_record(&car),
        join_warnings([photo_warning, sold_warning]),
    );
    Ok((StatusCode::CREATED, Json(value)))
}

pub async fn list_cars(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let cars = state.store.cars.list(auth.scope()).await?;
    Ok(Json(normalize_records(&cars)))
}

pub async fn get_car(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "car")?;
    let car = state
        .store
        .cars
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("car"))?;
    authorize_owner_or_admin(&auth, &car.added_by)?;
    Ok(Json(normalize_record(&car)))
}

pub async fn update_car(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<CarPayload>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "car")?;
    let existing = state
        .store
        .cars
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("car"))?;
    authorize_owner_or_admin(&auth, &existing.added_by)?;

    let hint = format!("{} {}", existing.make, existing.model);
    let (photos, photo_warning) = match body.photos {
        Some(photos_in) => {
            if photos_in.len() > MAX_CAR_PHOTOS {
                return Err(AppError::Validation(format!(
                    "a car can carry at most {MAX_CAR_PHOTOS} photos"
                )));
            }
            let (photos, warning) = ingest_photos(state.photos.as_ref(), photos_in, &hint).await;
            (Some(photos), warning)
        }
        None => (None, None),
    };
    let (sold, sold_warning) = match body.sold {
        Some(payload) => {
            let (info, warning) = sold_from_payload(&state, payload, &hint).await?;
            (Some(info), warning)
        }
        None => (None, None),
    };

    let patch = CarPatch {
        make: optional_text(body.make),
        model: optional_text(body.model),
        variant: optional_text(body.variant),
        manufacture_year: body
            .manufacture_year
            .map(|year| check_year(year, "manufactureYear"))
            .transpose()?,
        registration_year: body
            .registration_year
            .map(|year| check_year(year, "registrationYear"))
            .transpose()?,
        chassis_number: optional_text(body.chassis_number),
        engine_number: optional_text(body.engine_number),
        buying_price: body
            .buying_price
            .map(|price| nonnegative_amount(price, "buyingPrice"))
            .transpose()?,
        quoting_price: body
            .quoting_price
            .map(|price| nonnegative_amount(price, "quotingPrice"))
            .transpose()?,
        selling_price: body
            .selling_price
            .map(|price| nonnegative_amount(price, "sellingPrice"))
            .transpose()?,
        status: parse_status(body.status.as_deref())?,
        photos,
        sold,
    };
    let car = state
        .store
        .cars
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("car"))?;
    let value = with_warning(
        normalize_record(&car),
        join_warnings([photo_warning, sold_warning]),
    );
    Ok(Json(value))
}

pub async fn delete_car(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "car")?;
    let car = state
        .store
        .cars
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("car"))?;
    authorize_owner_or_admin(&auth, &car.added_by)?;
    state.store.cars.delete(&id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "message": "car deleted" }),
    ))
}
