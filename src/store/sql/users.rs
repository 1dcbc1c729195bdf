use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use super::entities::user;
use super::{SqlStore, parse_oid, require_id, to_column_time, to_record_time};
use crate::error::StoreError;
use crate::models::{User, UserPatch, UserRole, UserStatus};
use crate::store::{UserStore, now};

fn from_row(row: user::Model) -> Result<User, StoreError> {
    Ok(User {
        id: Some(parse_oid(&row.id, "user")?),
        name: row.name,
        email: row.email,
        password_hash: row.password_hash,
        role: UserRole::parse(&row.role)
            .ok_or_else(|| StoreError::Query(format!("unknown user role {}", row.role)))?,
        status: UserStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Query(format!("unknown user status {}", row.status)))?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn to_row(user: &User) -> Result<user::ActiveModel, StoreError> {
    Ok(user::ActiveModel {
        id: Set(require_id(user.id, "user")?),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        role: Set(user.role.as_str().to_string()),
        status: Set(user.status.as_str().to_string()),
        created_at: Set(to_column_time(user.created_at)),
        updated_at: Set(to_column_time(user.updated_at)),
    })
}

#[async_trait]
impl UserStore for SqlStore {
    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        if user.created_at.is_none() {
            user.created_at = Some(now());
        }
        user.id = Some(ObjectId::new());
        user::Entity::insert(to_row(&user)?).exec(&self.db).await?;
        Ok(user)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        let row = user::Entity::find_by_id(id.to_hex()).one(&self.db).await?;
        row.map(from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        row.map(from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(from_row).collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        user::Entity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn update(&self, id: &ObjectId, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let Some(row) = user::Entity::find_by_id(id.to_hex()).one(&self.db).await? else {
            return Ok(None);
        };
        let mut user = from_row(row)?;
        if let Some(email) = &patch.email {
            if email != &user.email && self.find_by_email(email).await?.is_some() {
                return Err(StoreError::Conflict(format!("email {email}")));
            }
        }
        patch.apply(&mut user);
        user.updated_at = Some(now());
        user::Entity::update(to_row(&user)?).exec(&self.db).await?;
        Ok(Some(user))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = user::Entity::delete_by_id(id.to_hex())
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
