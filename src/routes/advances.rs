// routes/advances.rs
// Partial payments against sell letters under /api/advance-payments,
// filterable by letter.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthUser, authorize_owner_or_admin};
use crate::error::AppError;
use crate::models::{AdvancePayment, AdvancePaymentPatch};
use crate::normalize::{normalize_record, normalize_records};
use crate::state::AppState;

use super::helpers::{optional_text, parse_date, parse_object_id, required_text};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancePaymentPayload {
    pub sell_letter_id: Option<String>,
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_date: Option<String>,
    pub note: Option<String>,
}

fn positive_amount(value: f64, what: &str) -> Result<f64, AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::Validation(format!(
            "{what} must be a positive number"
        )));
    }
    Ok(value)
}

pub async fn create_advance_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AdvancePaymentPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let sell_letter_id =
        parse_object_id(&required_text(body.sell_letter_id, "sellLetterId")?, "sell letter")?;
    state
        .store
        .sell_letters
        .find(&sell_letter_id)
        .await?
        .ok_or(AppError::NotFound("sell letter"))?;

    let amount = positive_amount(
        body.amount
            .ok_or_else(|| AppError::Validation("amount is required".into()))?,
        "amount",
    )?;
    let payment_method = required_text(body.payment_method, "paymentMethod")?;
    // Receipts without an explicit date count as received now.
    let payment_date = match body.payment_date.as_deref() {
        Some(raw) => parse_date(raw, "paymentDate")?,
        None => mongodb::bson::DateTime::now(),
    };

    let payment = AdvancePayment {
        id: None,
        sell_letter_id,
        amount,
        payment_method,
        payment_date,
        note: optional_text(body.note),
        received_by: auth.id,
        created_at: None,
        updated_at: None,
    };
    let payment = state.store.advances.insert(payment).await?;
    Ok((StatusCode::CREATED, Json(normalize_record(&payment))))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancePaymentQuery {
    pub sell_letter_id: Option<String>,
}

pub async fn list_advance_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AdvancePaymentQuery>,
) -> Result<Json<Value>, AppError> {
    let mut rows = match query.sell_letter_id.as_deref() {
        Some(raw) => {
            let sell_letter_id = parse_object_id(raw, "sell letter")?;
            state
                .store
                .advances
                .list_for_sell_letter(&sell_letter_id)
                .await?
        }
        None => state.store.advances.list(auth.scope()).await?,
    };
    if !auth.role.is_admin() {
        rows.retain(|row| row.received_by == auth.id);
    }
    Ok(Json(normalize_records(&rows)))
}

pub async fn get_advance_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "advance payment")?;
    let payment = state
        .store
        .advances
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("advance payment"))?;
    authorize_owner_or_admin(&auth, &payment.received_by)?;
    Ok(Json(normalize_record(&payment)))
}

pub async fn update_advance_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<AdvancePaymentPayload>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "advance payment")?;
    let existing = state
        .store
        .advances
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("advance payment"))?;
    authorize_owner_or_admin(&auth, &existing.received_by)?;

    let patch = AdvancePaymentPatch {
        amount: body
            .amount
            .map(|value| positive_amount(value, "amount"))
            .transpose()?,
        payment_method: optional_text(body.payment_method),
        payment_date: body
            .payment_date
            .as_deref()
            .map(|raw| parse_date(raw, "paymentDate"))
            .transpose()?,
        note: optional_text(body.note),
    };
    let payment = state
        .store
        .advances
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("advance payment"))?;
    Ok(Json(normalize_record(&payment)))
}

pub async fn delete_advance_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "advance payment")?;
    let payment = state
        .store
        .advances
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("advance payment"))?;
    authorize_owner_or_admin(&auth, &payment.received_by)?;
    state.store.advances.delete(&id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "message": "advance payment deleted" }),
    ))
}
