// routes/rc.rs
// RC transfer records under /api/rc. Writes merge through the column/details
// rules in models::RcRecord; responses resolve every logical field so legacy
// details-only documents read the same as promoted ones.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::auth::{AuthUser, authorize_owner_or_admin};
use crate::error::AppError;
use crate::models::{RcPatch, RcRecord, RcStatusFlags, RcStatusPatch};
use crate::normalize::{normalize_record, resolve_rc_fields};
use crate::state::AppState;

use super::helpers::{optional_text, parse_object_id};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RcPayload {
    pub car_id: Option<String>,
    pub vehicle_reg_no: Option<String>,
    pub vehicle_name: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_phone: Option<String>,
    pub work: Option<String>,
    pub dealer_name: Option<String>,
    pub rto_agent_name: Option<String>,
    pub remarks: Option<String>,
    pub status: Option<RcStatusPayload>,
    pub details: Option<Map<String, Value>>,
    pub pdf_url: Option<String>,
    pub pdf_public_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RcStatusPayload {
    pub rto_fees_paid: Option<bool>,
    pub transferred: Option<bool>,
    pub returned_to_dealer: Option<bool>,
}

fn to_patch(payload: RcPayload) -> Result<RcPatch, AppError> {
    let car_id = payload
        .car_id
        .as_deref()
        .map(|raw| parse_object_id(raw, "car"))
        .transpose()?;
    Ok(RcPatch {
        car_id,
        vehicle_reg_no: optional_text(payload.vehicle_reg_no),
        vehicle_name: optional_text(payload.vehicle_name),
        owner_name: optional_text(payload.owner_name),
        owner_phone: optional_text(payload.owner_phone),
        applicant_name: optional_text(payload.applicant_name),
        applicant_phone: optional_text(payload.applicant_phone),
        work: optional_text(payload.work),
        dealer_name: optional_text(payload.dealer_name),
        rto_agent_name: optional_text(payload.rto_agent_name),
        remarks: optional_text(payload.remarks),
        status: payload.status.map(|status| RcStatusPatch {
            rto_fees_paid: status.rto_fees_paid,
            transferred: status.transferred,
            returned_to_dealer: status.returned_to_dealer,
        }),
        details: payload.details,
        pdf_url: optional_text(payload.pdf_url),
        pdf_public_id: optional_text(payload.pdf_public_id),
    })
}

fn rc_json(record: &RcRecord) -> Value {
    let mut value = normalize_record(record);
    resolve_rc_fields(&mut value);
    value
}

pub async fn create_rc(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RcPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patch = to_patch(body)?;

    let mut record = RcRecord {
        id: None,
        car_id: None,
        vehicle_reg_no: String::new(),
        vehicle_name: String::new(),
        owner_name: String::new(),
        owner_phone: String::new(),
        applicant_name: String::new(),
        applicant_phone: String::new(),
        work: String::new(),
        dealer_name: String::new(),
        rto_agent_name: String::new(),
        remarks: String::new(),
        status: RcStatusFlags::default(),
        details: Map::new(),
        pdf_url: None,
        pdf_public_id: None,
        created_by: auth.id,
        created_at: None,
        updated_at: None,
    };
    record.apply_patch(patch);
    // The merge may have promoted it out of `details`, so check afterwards.
    if record.vehicle_reg_no.trim().is_empty() {
        return Err(AppError::Validation("vehicleRegNo is required".into()));
    }

    let record = state.store.rcs.insert(record).await?;
    Ok((StatusCode::CREATED, Json(rc_json(&record))))
}

pub async fn list_rcs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let records = state.store.rcs.list(auth.scope()).await?;
    let rows = records.iter().map(rc_json).collect();
    Ok(Json(Value::Array(rows)))
}

pub async fn get_rc(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "rc record")?;
    let record = state
        .store
        .rcs
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("rc record"))?;
    authorize_owner_or_admin(&auth, &record.created_by)?;
    Ok(Json(rc_json(&record)))
}

pub async fn update_rc(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RcPayload>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "rc record")?;
    let existing = state
        .store
        .rcs
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("rc record"))?;
    authorize_owner_or_admin(&auth, &existing.created_by)?;

    let patch = to_patch(body)?;
    let record = state
        .store
        .rcs
        .update(&id, patch)
        .await?
        .ok_or(AppError::NotFound("rc record"))?;
    Ok(Json(rc_json(&record)))
}

pub async fn delete_rc(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id, "rc record")?;
    let record = state
        .store
        .rcs
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("rc record"))?;
    authorize_owner_or_admin(&auth, &record.created_by)?;
    state.store.rcs.delete(&id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "message": "rc record deleted" }),
    ))
}
