// routes/sell_letters.rs
// Sale records under /api/sell-letters. Creating a letter marks the car
// "Sold Out" and snapshots the buyer onto its sold subrecord.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthUser, authorize_owner_or_admin};
use crate::error::AppError;
use crate::models::{CarPatch, CarStatus, SellLetter, SellLetterPatch, SoldInfo};
use crate::normalize::{normalize_record, normalize_records};
use crate::state::AppState;

use super::helpers::{
    nonnegative_amount, optional_text, parse_date, parse_object_id, required_amount, required_text,
};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SellLetterPayload {
    pub car_id: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_parentage: Option<String>,
    pub buyer_address: Option<String>,
    pub buyer_phone: Option<String>,
    pub vehicle_name: Option<String>,
    pub vehicle_reg_no: Option<String>,
    pub sale_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub sale_date: Option<String>,
}

pub async fn create_sell_letter(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SellLetterPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let car_id = parse_object_id(&required_text(body.car_id, "carId")?, "car")?;
    let car = state
        .store
        .cars
        .find(&car_id)
        .await?
        .ok_or(AppError::NotFound("car"))?;
    if car.status == CarStatus::SoldOut {
        return Err(AppError::Conflict("car is already sold".into()));
    }

    let buyer_name = required_text(body.buyer_name, "buyerName")?;
    let buyer_phone = required_text(body.buyer_phone, "buyerPhone")?;
    let sale_amount = required_amount(body.sale_amount, "saleAmount")?;
    let payment_method = required_text(body.payment_method, "paymentMethod")?;
    let sale_date = parse_date(&required_text(body.sale_date, "saleDate")?, "saleDate")?;

    // Vehicle fields default to a snapshot of the car being sold.
    let vehicle_name = optional_text(body.vehicle_name)
        .unwrap_or_else(|| format!("{} {}", car.make, car.model));

    let letter = SellLetter {
        id: None,
        car_id,
        buyer_name: buyer_name.clone(),
        buyer_parentage: optional_text(body.buyer_parentage),
        buyer_address: optional_text(body.buyer_address),
        buyer_phone: buyer_phone.clone(),
        vehicle_name,
        vehicle_reg_no: optional_text(body.vehicle_reg_no),
        chassis_number: car.chassis_number.clone(),
        engine_number: car.engine_number.clone(),
        sale_amount,
        payment_method,
        sale_date,
        created_by: auth.id,
        created_at: None,
        updated_at: None,
    };
    let letter = state.store.sell_letters.insert(letter).await?;

    let sold = CarPatch {
        status: Some(CarStatus::SoldOut),
        sold: Some(SoldInfo {
            sold_date: Some(sale_date),
            customer_name: buyer_name,
            customer_phone: buyer_phone,
            testimonial: None,
            customer_photos: Vec::new(),
        }),
        ..Default::default()
    };
    state.store.cars.update(&car_id, sold).await?;

    Ok((StatusCode::CREATED, Json(normalize_record(&letter))))
}

pub async fn list_sell_letters(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let letters = state.store.sell_letters.list(auth.scope()).await?;
    Ok(Json(normalize_records(&letters)))
}

pub async fn get_sell_letter(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "sell letter")?;
    let letter = state
        .store
        .sell_letters
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("sell letter"))?;
    authorize_owner_or_admin(&auth, &letter.created_by)?;
    Ok(Json(normalize_record(&letter)))
}

pub async fn update_sell_letter(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<SellLetterPayload>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "sell letter")?;
    let existing = state
        .store
        .sell_letters
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("sell letter"))?;
    authorize_owner_or_admin(&auth, &existing.created_by)?;

    let patch = SellLetterPatch {
        buyer_name: optional_text(body.buyer_name),
        buyer_parentage: optional_text(body.buyer_parentage),
        buyer_address: optional_text(body.buyer_address),
        buyer_phone: optional_text(body.buyer_phone),
        vehicle_name: optional_text(body.vehicle_name),
        vehicle_reg_no: optional_text(body.vehicle_reg_no),
        sale_amount: body
            .sale_amount
            .map(|amount| nonnegative_amount(amount, "saleAmount"))
            .transpose()?,
        payment_method: optional_text(body.payment_method),
        sale_date: body
            .sale_date
            .as_deref()
            .map(|raw| parse_date(raw, "saleDate"))
            .transpose()?,
    };
    let letter = state
        .store
        .sell_letters
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("sell letter"))?;
    Ok(Json(normalize_record(&letter)))
}

pub async fn delete_sell_letter(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "sell letter")?;
    let letter = state
        .store
        .sell_letters
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("sell letter"))?;
    authorize_owner_or_admin(&auth, &letter.created_by)?;
    state.store.sell_letters.delete(&id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "message": "sell letter deleted" }),
    ))
}
