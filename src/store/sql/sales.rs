use async_trait::async_trait;
use mongodb::bson::{DateTime, oid::ObjectId};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::entities::{advance_payment, sell_letter, service_bill};
use super::{SqlStore, from_json, parse_oid, require_id, to_column_time, to_json, to_record_time};
use crate::error::StoreError;
use crate::models::{
    AdvancePayment, AdvancePaymentPatch, PaymentStatus, SellLetter, SellLetterPatch, ServiceBill,
    ServiceBillPatch,
};
use crate::store::{AdvancePaymentStore, Scope, SellLetterStore, ServiceBillStore, now};

fn letter_from_row(row: sell_letter::Model) -> Result<SellLetter, StoreError> {
    Ok(SellLetter {
        id: Some(parse_oid(&row.id, "sell letter")?),
        car_id: parse_oid(&row.car_id, "sell letter carId")?,
        buyer_name: row.buyer_name,
        buyer_parentage: row.buyer_parentage,
        buyer_address: row.buyer_address,
        buyer_phone: row.buyer_phone,
        vehicle_name: row.vehicle_name,
        vehicle_reg_no: row.vehicle_reg_no,
        chassis_number: row.chassis_number,
        engine_number: row.engine_number,
        sale_amount: row.sale_amount,
        payment_method: row.payment_method,
        sale_date: DateTime::from_chrono(row.sale_date),
        created_by: parse_oid(&row.created_by, "sell letter createdBy")?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn letter_row(letter: &SellLetter) -> Result<sell_letter::ActiveModel, StoreError> {
    Ok(sell_letter::ActiveModel {
        id: Set(require_id(letter.id, "sell letter")?),
        car_id: Set(letter.car_id.to_hex()),
        buyer_name: Set(letter.buyer_name.clone()),
        buyer_parentage: Set(letter.buyer_parentage.clone()),
        buyer_address: Set(letter.buyer_address.clone()),
        buyer_phone: Set(letter.buyer_phone.clone()),
        vehicle_name: Set(letter.vehicle_name.clone()),
        vehicle_reg_no: Set(letter.vehicle_reg_no.clone()),
        chassis_number: Set(letter.chassis_number.clone()),
        engine_number: Set(letter.engine_number.clone()),
        sale_amount: Set(letter.sale_amount),
        payment_method: Set(letter.payment_method.clone()),
        sale_date: Set(letter.sale_date.to_chrono()),
        created_by: Set(letter.created_by.to_hex()),
        created_at: Set(to_column_time(letter.created_at)),
        updated_at: Set(to_column_time(letter.updated_at)),
    })
}

fn bill_from_row(row: service_bill::Model) -> Result<ServiceBill, StoreError> {
    Ok(ServiceBill {
        id: Some(parse_oid(&row.id, "service bill")?),
        customer_name: row.customer_name,
        customer_phone: row.customer_phone,
        vehicle_name: row.vehicle_name,
        vehicle_reg_no: row.vehicle_reg_no,
        service_items: from_json(row.service_items, "service bill items")?,
        total_amount: row.total_amount,
        tax_rate: row.tax_rate,
        tax_amount: row.tax_amount,
        discount: row.discount,
        grand_total: row.grand_total,
        advance_paid: row.advance_paid,
        balance_due: row.balance_due,
        payment_status: PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
            StoreError::Query(format!("unknown payment status {}", row.payment_status))
        })?,
        pdf_url: row.pdf_url,
        pdf_public_id: row.pdf_public_id,
        created_by: parse_oid(&row.created_by, "service bill createdBy")?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn bill_row(bill: &ServiceBill) -> Result<service_bill::ActiveModel, StoreError> {
    Ok(service_bill::ActiveModel {
        id: Set(require_id(bill.id, "service bill")?),
        customer_name: Set(bill.customer_name.clone()),
        customer_phone: Set(bill.customer_phone.clone()),
        vehicle_name: Set(bill.vehicle_name.clone()),
        vehicle_reg_no: Set(bill.vehicle_reg_no.clone()),
        service_items: Set(to_json(&bill.service_items, "service bill items")?),
        total_amount: Set(bill.total_amount),
        tax_rate: Set(bill.tax_rate),
        tax_amount: Set(bill.tax_amount),
        discount: Set(bill.discount),
        grand_total: Set(bill.grand_total),
        advance_paid: Set(bill.advance_paid),
        balance_due: Set(bill.balance_due),
        payment_status: Set(bill.payment_status.as_str().to_string()),
        pdf_url: Set(bill.pdf_url.clone()),
        pdf_public_id: Set(bill.pdf_public_id.clone()),
        created_by: Set(bill.created_by.to_hex()),
        created_at: Set(to_column_time(bill.created_at)),
        updated_at: Set(to_column_time(bill.updated_at)),
    })
}

fn advance_from_row(row: advance_payment::Model) -> Result<AdvancePayment, StoreError> {
    Ok(AdvancePayment {
        id: Some(parse_oid(&row.id, "advance payment")?),
        sell_letter_id: parse_oid(&row.sell_letter_id, "advance payment sellLetterId")?,
        amount: row.amount,
        payment_method: row.payment_method,
        payment_date: DateTime::from_chrono(row.payment_date),
        note: row.note,
        received_by: parse_oid(&row.received_by, "advance payment receivedBy")?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn advance_row(payment: &AdvancePayment) -> Result<advance_payment::ActiveModel, StoreError> {
    Ok(advance_payment::ActiveModel {
        id: Set(require_id(payment.id, "advance payment")?),
        sell_letter_id: Set(payment.sell_letter_id.to_hex()),
        amount: Set(payment.amount),
        payment_method: Set(payment.payment_method.clone()),
        payment_date: Set(payment.payment_date.to_chrono()),
        note: Set(payment.note.clone()),
        received_by: Set(payment.received_by.to_hex()),
        created_at: Set(to_column_time(payment.created_at)),
        updated_at: Set(to_column_time(payment.updated_at)),
    })
}

#[async_trait]
impl SellLetterStore for SqlStore {
    async fn insert(&self, mut letter: SellLetter) -> Result<SellLetter, StoreError> {
        if letter.created_at.is_none() {
            letter.created_at = Some(now());
        }
        letter.id = Some(ObjectId::new());
        sell_letter::Entity::insert(letter_row(&letter)?)
            .exec(&self.db)
            .await?;
        Ok(letter)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<SellLetter>, StoreError> {
        let row = sell_letter::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?;
        row.map(letter_from_row).transpose()
    }

    async fn list(&self, scope: Scope) -> Result<Vec<SellLetter>, StoreError> {
        let mut query = sell_letter::Entity::find();
        if let Some(owner) = scope.owner() {
            query = query.filter(sell_letter::Column::CreatedBy.eq(owner.to_hex()));
        }
        let rows = query
            .order_by_desc(sell_letter::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(letter_from_row).collect()
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: SellLetterPatch,
    ) -> Result<Option<SellLetter>, StoreError> {
        let Some(row) = sell_letter::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let mut letter = letter_from_row(row)?;
        patch.apply(&mut letter);
        letter.updated_at = Some(now());
        sell_letter::Entity::update(letter_row(&letter)?)
            .exec(&self.db)
            .await?;
        Ok(Some(letter))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = sell_letter::Entity::delete_by_id(id.to_hex())
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl ServiceBillStore for SqlStore {
    async fn insert(&self, mut bill: ServiceBill) -> Result<ServiceBill, StoreError> {
        if bill.created_at.is_none() {
            bill.created_at = Some(now());
        }
        bill.id = Some(ObjectId::new());
        service_bill::Entity::insert(bill_row(&bill)?)
            .exec(&self.db)
            .await?;
        Ok(bill)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<ServiceBill>, StoreError> {
        let row = service_bill::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?;
        row.map(bill_from_row).transpose()
    }

    async fn list(&self, scope: Scope) -> Result<Vec<ServiceBill>, StoreError> {
        let mut query = service_bill::Entity::find();
        if let Some(owner) = scope.owner() {
            query = query.filter(service_bill::Column::CreatedBy.eq(owner.to_hex()));
        }
        let rows = query
            .order_by_desc(service_bill::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(bill_from_row).collect()
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: ServiceBillPatch,
    ) -> Result<Option<ServiceBill>, StoreError> {
        let Some(row) = service_bill::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let mut bill = bill_from_row(row)?;
        patch.apply(&mut bill);
        bill.updated_at = Some(now());
        service_bill::Entity::update(bill_row(&bill)?)
            .exec(&self.db)
            .await?;
        Ok(Some(bill))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = service_bill::Entity::delete_by_id(id.to_hex())
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl AdvancePaymentStore for SqlStore {
    async fn insert(&self, mut payment: AdvancePayment) -> Result<AdvancePayment, StoreError> {
        if payment.created_at.is_none() {
            payment.created_at = Some(now());
        }
        payment.id = Some(ObjectId::new());
        advance_payment::Entity::insert(advance_row(&payment)?)
            .exec(&self.db)
            .await?;
        Ok(payment)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<AdvancePayment>, StoreError> {
        let row = advance_payment::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?;
        row.map(advance_from_row).transpose()
    }

    async fn list(&self, scope: Scope) -> Result<Vec<AdvancePayment>, StoreError> {
        let mut query = advance_payment::Entity::find();
        if let Some(owner) = scope.owner() {
            query = query.filter(advance_payment::Column::ReceivedBy.eq(owner.to_hex()));
        }
        let rows = query
            .order_by_desc(advance_payment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(advance_from_row).collect()
    }

    async fn list_for_sell_letter(
        &self,
        sell_letter_id: &ObjectId,
    ) -> Result<Vec<AdvancePayment>, StoreError> {
        let rows = advance_payment::Entity::find()
            .filter(advance_payment::Column::SellLetterId.eq(sell_letter_id.to_hex()))
            .order_by_desc(advance_payment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(advance_from_row).collect()
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: AdvancePaymentPatch,
    ) -> Result<Option<AdvancePayment>, StoreError> {
        let Some(row) = advance_payment::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let mut payment = advance_from_row(row)?;
        patch.apply(&mut payment);
        payment.updated_at = Some(now());
        advance_payment::Entity::update(advance_row(&payment)?)
            .exec(&self.db)
            .await?;
        Ok(Some(payment))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = advance_payment::Entity::delete_by_id(id.to_hex())
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
