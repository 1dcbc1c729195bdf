// routes/service_bills.rs
// Service invoices under /api/service-bills. Derived totals are recomputed
// server-side; when a PDF renderer is configured the bill is rendered after
// every write that changes billing fields, degrading to a `warning` when the
// renderer is down.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::{AuthUser, authorize_owner_or_admin};
use crate::error::AppError;
use crate::models::{ServiceBill, ServiceBillPatch, ServiceItem};
use crate::normalize::{normalize_record, normalize_records};
use crate::state::AppState;

use super::helpers::{
    nonnegative_amount, optional_text, parse_object_id, required_text, with_warning,
};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceBillPayload {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub vehicle_name: Option<String>,
    pub vehicle_reg_no: Option<String>,
    pub service_items: Option<Vec<ServiceItemPayload>>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub advance_paid: Option<f64>,
}

#[derive(Deserialize, Default)]
pub struct ServiceItemPayload {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub rate: Option<f64>,
}

fn parse_items(items: Vec<ServiceItemPayload>) -> Result<Vec<ServiceItem>, AppError> {
    if items.is_empty() {
        return Err(AppError::Validation(
            "at least one service item is required".into(),
        ));
    }
    items
        .into_iter()
        .map(|item| {
            let description = required_text(item.description, "serviceItems.description")?;
            let quantity = item.quantity.unwrap_or(1.0);
            if !quantity.is_finite() || quantity <= 0.0 {
                return Err(AppError::Validation(
                    "serviceItems.quantity must be positive".into(),
                ));
            }
            let rate = nonnegative_amount(item.rate.unwrap_or(0.0), "serviceItems.rate")?;
            Ok(ServiceItem {
                description,
                quantity,
                rate,
                amount: 0.0,
            })
        })
        .collect()
}

fn parse_tax_rate(value: f64) -> Result<f64, AppError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::Validation(
            "taxRate must be between 0 and 100".into(),
        ));
    }
    Ok(value)
}

/// Render and persist the bill PDF. Renderer failures leave the bill as
/// written and surface through the returned warning.
async fn attach_pdf(state: &AppState, bill: ServiceBill) -> (ServiceBill, Option<String>) {
    let Some(renderer) = state.renderer.as_ref() else {
        return (bill, None);
    };
    let Some(id) = bill.id else {
        return (bill, None);
    };
    match renderer.render(&bill).await {
        Ok(pdf) => {
            let patch = ServiceBillPatch {
                pdf_url: Some(pdf.url),
                pdf_public_id: Some(pdf.public_id),
                ..Default::default()
            };
            match state.store.service_bills.update(&id, patch).await {
                Ok(Some(updated)) => (updated, None),
                Ok(None) => (bill, None),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to persist rendered bill PDF");
                    (bill, Some("bill PDF could not be saved".to_string()))
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "bill PDF rendering failed");
            (
                bill,
                Some("bill PDF generation failed; the bill was saved without it".to_string()),
            )
        }
    }
}

pub async fn create_service_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ServiceBillPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let customer_name = required_text(body.customer_name, "customerName")?;
    let vehicle_name = required_text(body.vehicle_name, "vehicleName")?;
    let service_items = parse_items(
        body.service_items
            .ok_or_else(|| AppError::Validation("serviceItems is required".into()))?,
    )?;
    let tax_rate = parse_tax_rate(body.tax_rate.unwrap_or(0.0))?;
    let discount = nonnegative_amount(body.discount.unwrap_or(0.0), "discount")?;
    let advance_paid = nonnegative_amount(body.advance_paid.unwrap_or(0.0), "advancePaid")?;

    let mut bill = ServiceBill {
        id: None,
        customer_name,
        customer_phone: optional_text(body.customer_phone),
        vehicle_name,
        vehicle_reg_no: optional_text(body.vehicle_reg_no),
        service_items,
        total_amount: 0.0,
        tax_rate,
        tax_amount: 0.0,
        discount,
        grand_total: 0.0,
        advance_paid,
        balance_due: 0.0,
        payment_status: Default::default(),
        pdf_url: None,
        pdf_public_id: None,
        created_by: auth.id,
        created_at: None,
        updated_at: None,
    };
    bill.recompute_totals();

    let bill = state.store.service_bills.insert(bill).await?;
    let (bill, warning) = attach_pdf(&state, bill).await;
    Ok((
        StatusCode::CREATED,
        Json(with_warning(normalize_record(&bill), warning)),
    ))
}

pub async fn list_service_bills(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let bills = state.store.service_bills.list(auth.scope()).await?;
    Ok(Json(normalize_records(&bills)))
}

pub async fn get_service_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "service bill")?;
    let bill = state
        .store
        .service_bills
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("service bill"))?;
    authorize_owner_or_admin(&auth, &bill.created_by)?;
    Ok(Json(normalize_record(&bill)))
}

pub async fn update_service_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ServiceBillPayload>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "service bill")?;
    let existing = state
        .store
        .service_bills
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("service bill"))?;
    authorize_owner_or_admin(&auth, &existing.created_by)?;

    let billing_changed = body.service_items.is_some()
        || body.tax_rate.is_some()
        || body.discount.is_some()
        || body.advance_paid.is_some();
    let patch = ServiceBillPatch {
        customer_name: optional_text(body.customer_name),
        customer_phone: optional_text(body.customer_phone),
        vehicle_name: optional_text(body.vehicle_name),
        vehicle_reg_no: optional_text(body.vehicle_reg_no),
        service_items: body.service_items.map(parse_items).transpose()?,
        tax_rate: body.tax_rate.map(parse_tax_rate).transpose()?,
        discount: body
            .discount
            .map(|value| nonnegative_amount(value, "discount"))
            .transpose()?,
        advance_paid: body
            .advance_paid
            .map(|value| nonnegative_amount(value, "advancePaid"))
            .transpose()?,
        pdf_url: None,
        pdf_public_id: None,
    };
    let bill = state
        .store
        .service_bills
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("service bill"))?;

    // The stored PDF shows amounts, so it goes stale when billing changes.
    let (bill, warning) = if billing_changed {
        attach_pdf(&state, bill).await
    } else {
        (bill, None)
    };
    Ok(Json(with_warning(normalize_record(&bill), warning)))
}

pub async fn delete_service_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "service bill")?;
    let bill = state
        .store
        .service_bills
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("service bill"))?;
    authorize_owner_or_admin(&auth, &bill.created_by)?;
    state.store.service_bills.delete(&id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "message": "service bill deleted" }),
    ))
}
