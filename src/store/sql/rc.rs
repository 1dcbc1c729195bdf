use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde_json::Value;

use super::entities::rc;
use super::{SqlStore, from_json, parse_oid, require_id, to_column_time, to_record_time};
use crate::error::StoreError;
use crate::models::{RcPatch, RcRecord, RcStatusFlags};
use crate::store::{RcStore, Scope, now};

fn from_row(row: rc::Model) -> Result<RcRecord, StoreError> {
    Ok(RcRecord {
        id: Some(parse_oid(&row.id, "rc record")?),
        car_id: row
            .car_id
            .as_deref()
            .map(|hex| parse_oid(hex, "rc carId"))
            .transpose()?,
        vehicle_reg_no: row.vehicle_reg_no,
        vehicle_name: row.vehicle_name,
        owner_name: row.owner_name,
        owner_phone: row.owner_phone,
        applicant_name: row.applicant_name,
        applicant_phone: row.applicant_phone,
        work: row.work,
        dealer_name: row.dealer_name,
        rto_agent_name: row.rto_agent_name,
        remarks: row.remarks,
        status: RcStatusFlags {
            rto_fees_paid: row.rto_fees_paid,
            transferred: row.transferred,
            returned_to_dealer: row.returned_to_dealer,
        },
        details: from_json(row.details, "rc details")?,
        pdf_url: row.pdf_url,
        pdf_public_id: row.pdf_public_id,
        created_by: parse_oid(&row.created_by, "rc createdBy")?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn to_row(record: &RcRecord) -> Result<rc::ActiveModel, StoreError> {
    Ok(rc::ActiveModel {
        id: Set(require_id(record.id, "rc record")?),
        car_id: Set(record.car_id.map(|id| id.to_hex())),
        vehicle_reg_no: Set(record.vehicle_reg_no.clone()),
        vehicle_name: Set(record.vehicle_name.clone()),
        owner_name: Set(record.owner_name.clone()),
        owner_phone: Set(record.owner_phone.clone()),
        applicant_name: Set(record.applicant_name.clone()),
        applicant_phone: Set(record.applicant_phone.clone()),
        work: Set(record.work.clone()),
        dealer_name: Set(record.dealer_name.clone()),
        rto_agent_name: Set(record.rto_agent_name.clone()),
        remarks: Set(record.remarks.clone()),
        rto_fees_paid: Set(record.status.rto_fees_paid),
        transferred: Set(record.status.transferred),
        returned_to_dealer: Set(record.status.returned_to_dealer),
        details: Set(Value::Object(record.details.clone())),
        pdf_url: Set(record.pdf_url.clone()),
        pdf_public_id: Set(record.pdf_public_id.clone()),
        created_by: Set(record.created_by.to_hex()),
        created_at: Set(to_column_time(record.created_at)),
        updated_at: Set(to_column_time(record.updated_at)),
    })
}

#[async_trait]
impl RcStore for SqlStore {
    async fn insert(&self, mut record: RcRecord) -> Result<RcRecord, StoreError> {
        if record.created_at.is_none() {
            record.created_at = Some(now());
        }
        record.id = Some(ObjectId::new());
        rc::Entity::insert(to_row(&record)?).exec(&self.db).await?;
        Ok(record)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<RcRecord>, StoreError> {
        let row = rc::Entity::find_by_id(id.to_hex()).one(&self.db).await?;
        row.map(from_row).transpose()
    }

    async fn list(&self, scope: Scope) -> Result<Vec<RcRecord>, StoreError> {
        let mut query = rc::Entity::find();
        if let Some(owner) = scope.owner() {
            query = query.filter(rc::Column::CreatedBy.eq(owner.to_hex()));
        }
        let rows = query
            .order_by_desc(rc::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(from_row).collect()
    }

    async fn update(&self, id: &ObjectId, patch: RcPatch) -> Result<Option<RcRecord>, StoreError> {
        let Some(row) = rc::Entity::find_by_id(id.to_hex()).one(&self.db).await? else {
            return Ok(None);
        };
        let mut record = from_row(row)?;
        record.apply_patch(patch);
        record.updated_at = Some(now());
        rc::Entity::update(to_row(&record)?).exec(&self.db).await?;
        Ok(Some(record))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = rc::Entity::delete_by_id(id.to_hex()).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
