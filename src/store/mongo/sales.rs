use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use super::{MongoStore, inserted_oid, now, scope_doc};
use crate::error::StoreError;
use crate::models::{
    AdvancePayment, AdvancePaymentPatch, SellLetter, SellLetterPatch, ServiceBill,
    ServiceBillPatch,
};
use crate::store::{AdvancePaymentStore, Scope, SellLetterStore, ServiceBillStore};

#[async_trait]
impl SellLetterStore for MongoStore {
    async fn insert(&self, mut letter: SellLetter) -> Result<SellLetter, StoreError> {
        if letter.created_at.is_none() {
            letter.created_at = Some(now());
        }
        let res = self.sell_letters.insert_one(&letter).await?;
        letter.id = Some(inserted_oid(res.inserted_id, "sell letter")?);
        Ok(letter)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<SellLetter>, StoreError> {
        self.sell_letters
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<SellLetter>, StoreError> {
        let mut cursor = self
            .sell_letters
            .find(scope_doc(&scope, "createdBy"))
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(letter) = cursor.try_next().await? {
            items.push(letter);
        }
        Ok(items)
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: SellLetterPatch,
    ) -> Result<Option<SellLetter>, StoreError> {
        let Some(mut letter) = self.sell_letters.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        patch.apply(&mut letter);
        letter.updated_at = Some(now());
        self.sell_letters
            .replace_one(doc! { "_id": id }, &letter)
            .await?;
        Ok(Some(letter))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = self.sell_letters.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}

#[async_trait]
impl ServiceBillStore for MongoStore {
    async fn insert(&self, mut bill: ServiceBill) -> Result<ServiceBill, StoreError> {
        if bill.created_at.is_none() {
            bill.created_at = Some(now());
        }
        let res = self.service_bills.insert_one(&bill).await?;
        bill.id = Some(inserted_oid(res.inserted_id, "service bill")?);
        Ok(bill)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<ServiceBill>, StoreError> {
        self.service_bills
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<ServiceBill>, StoreError> {
        let mut cursor = self
            .service_bills
            .find(scope_doc(&scope, "createdBy"))
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(bill) = cursor.try_next().await? {
            items.push(bill);
        }
        Ok(items)
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: ServiceBillPatch,
    ) -> Result<Option<ServiceBill>, StoreError> {
        let Some(mut bill) = self.service_bills.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        patch.apply(&mut bill);
        bill.updated_at = Some(now());
        self.service_bills
            .replace_one(doc! { "_id": id }, &bill)
            .await?;
        Ok(Some(bill))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = self.service_bills.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}

#[async_trait]
impl AdvancePaymentStore for MongoStore {
    async fn insert(&self, mut payment: AdvancePayment) -> Result<AdvancePayment, StoreError> {
        if payment.created_at.is_none() {
            payment.created_at = Some(now());
        }
        let res = self.advances.insert_one(&payment).await?;
        payment.id = Some(inserted_oid(res.inserted_id, "advance payment")?);
        Ok(payment)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<AdvancePayment>, StoreError> {
        self.advances
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<AdvancePayment>, StoreError> {
        let mut cursor = self
            .advances
            .find(scope_doc(&scope, "receivedBy"))
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(payment) = cursor.try_next().await? {
            items.push(payment);
        }
        Ok(items)
    }

    async fn list_for_sell_letter(
        &self,
        sell_letter_id: &ObjectId,
    ) -> Result<Vec<AdvancePayment>, StoreError> {
        let mut cursor = self
            .advances
            .find(doc! { "sellLetterId": sell_letter_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(payment) = cursor.try_next().await? {
            items.push(payment);
        }
        Ok(items)
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: AdvancePaymentPatch,
    ) -> Result<Option<AdvancePayment>, StoreError> {
        let Some(mut payment) = self.advances.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        patch.apply(&mut payment);
        payment.updated_at = Some(now());
        self.advances.replace_one(doc! { "_id": id }, &payment).await?;
        Ok(Some(payment))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = self.advances.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}
