use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use super::{MongoStore, inserted_oid, now, scope_doc};
use crate::error::StoreError;
use crate::models::{RcPatch, RcRecord};
use crate::store::{RcStore, Scope};

#[async_trait]
impl RcStore for MongoStore {
    async fn insert(&self, mut record: RcRecord) -> Result<RcRecord, StoreError> {
        if record.created_at.is_none() {
            record.created_at = Some(now());
        }
        let res = self.rcs.insert_one(&record).await?;
        record.id = Some(inserted_oid(res.inserted_id, "rc record")?);
        Ok(record)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<RcRecord>, StoreError> {
        self.rcs
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<RcRecord>, StoreError> {
        let mut cursor = self
            .rcs
            .find(scope_doc(&scope, "createdBy"))
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(record) = cursor.try_next().await? {
            items.push(record);
        }
        Ok(items)
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: RcPatch,
    ) -> Result<Option<RcRecord>, StoreError> {
        let Some(mut record) = self.rcs.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        record.apply_patch(patch);
        record.updated_at = Some(now());
        self.rcs.replace_one(doc! { "_id": id }, &record).await?;
        Ok(Some(record))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = self.rcs.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}
