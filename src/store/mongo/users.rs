use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use super::{MongoStore, inserted_oid, now};
use crate::error::StoreError;
use crate::models::{User, UserPatch};
use crate::store::UserStore;

#[async_trait]
impl UserStore for MongoStore {
    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        if user.created_at.is_none() {
            user.created_at = Some(now());
        }
        let res = self.users.insert_one(&user).await?;
        user.id = Some(inserted_oid(res.inserted_id, "user")?);
        Ok(user)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(Into::into)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut cursor = self
            .users
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(user) = cursor.try_next().await? {
            items.push(user);
        }
        Ok(items)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.users.count_documents(doc! {}).await.map_err(Into::into)
    }

    async fn update(&self, id: &ObjectId, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let Some(mut user) = self.users.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        if let Some(email) = &patch.email {
            if email != &user.email && self.find_by_email(email).await?.is_some() {
                return Err(StoreError::Conflict(format!("email {email}")));
            }
        }
        patch.apply(&mut user);
        user.updated_at = Some(now());
        self.users.replace_one(doc! { "_id": id }, &user).await?;
        Ok(Some(user))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = self.users.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}
