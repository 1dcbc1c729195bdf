use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::entities::{car, gallery_item, refurbishment};
use super::{SqlStore, from_json, parse_oid, require_id, to_column_time, to_json, to_record_time};
use crate::error::StoreError;
use crate::models::{
    Car, CarPatch, CarStatus, GalleryItem, GalleryPatch, Refurbishment, RefurbishmentPatch,
};
use crate::store::{CarStore, GalleryStore, RefurbishmentStore, Scope, now};

fn car_from_row(row: car::Model) -> Result<Car, StoreError> {
    Ok(Car {
        id: Some(parse_oid(&row.id, "car")?),
        make: row.make,
        model: row.model,
        variant: row.variant,
        manufacture_year: row.manufacture_year,
        registration_year: row.registration_year,
        chassis_number: row.chassis_number,
        engine_number: row.engine_number,
        buying_price: row.buying_price,
        quoting_price: row.quoting_price,
        selling_price: row.selling_price,
        status: CarStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Query(format!("unknown car status {}", row.status)))?,
        photos: from_json(row.photos, "car photos")?,
        sold: row
            .sold
            .map(|value| from_json(value, "car sold info"))
            .transpose()?,
        added_by: parse_oid(&row.added_by, "car addedBy")?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn car_row(car: &Car) -> Result<car::ActiveModel, StoreError> {
    Ok(car::ActiveModel {
        id: Set(require_id(car.id, "car")?),
        make: Set(car.make.clone()),
        model: Set(car.model.clone()),
        variant: Set(car.variant.clone()),
        manufacture_year: Set(car.manufacture_year),
        registration_year: Set(car.registration_year),
        chassis_number: Set(car.chassis_number.clone()),
        engine_number: Set(car.engine_number.clone()),
        buying_price: Set(car.buying_price),
        quoting_price: Set(car.quoting_price),
        selling_price: Set(car.selling_price),
        status: Set(car.status.as_str().to_string()),
        photos: Set(to_json(&car.photos, "car photos")?),
        sold: Set(car
            .sold
            .as_ref()
            .map(|sold| to_json(sold, "car sold info"))
            .transpose()?),
        added_by: Set(car.added_by.to_hex()),
        created_at: Set(to_column_time(car.created_at)),
        updated_at: Set(to_column_time(car.updated_at)),
    })
}

fn gallery_from_row(row: gallery_item::Model) -> Result<GalleryItem, StoreError> {
    Ok(GalleryItem {
        id: Some(parse_oid(&row.id, "gallery item")?),
        photos: from_json(row.photos, "gallery photos")?,
        car_id: row
            .car_id
            .as_deref()
            .map(|hex| parse_oid(hex, "gallery carId"))
            .transpose()?,
        caption: row.caption,
        testimonial: row.testimonial,
        created_by: parse_oid(&row.created_by, "gallery createdBy")?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn gallery_row(item: &GalleryItem) -> Result<gallery_item::ActiveModel, StoreError> {
    Ok(gallery_item::ActiveModel {
        id: Set(require_id(item.id, "gallery item")?),
        photos: Set(to_json(&item.photos, "gallery photos")?),
        car_id: Set(item.car_id.map(|id| id.to_hex())),
        caption: Set(item.caption.clone()),
        testimonial: Set(item.testimonial.clone()),
        created_by: Set(item.created_by.to_hex()),
        created_at: Set(to_column_time(item.created_at)),
        updated_at: Set(to_column_time(item.updated_at)),
    })
}

fn refurbishment_from_row(row: refurbishment::Model) -> Result<Refurbishment, StoreError> {
    Ok(Refurbishment {
        id: Some(parse_oid(&row.id, "refurbishment")?),
        car_id: parse_oid(&row.car_id, "refurbishment carId")?,
        work_items: from_json(row.work_items, "refurbishment work items")?,
        notes: row.notes,
        created_by: parse_oid(&row.created_by, "refurbishment createdBy")?,
        created_at: to_record_time(row.created_at),
        updated_at: to_record_time(row.updated_at),
    })
}

fn refurbishment_row(
    refurbishment: &Refurbishment,
) -> Result<refurbishment::ActiveModel, StoreError> {
    Ok(refurbishment::ActiveModel {
        id: Set(require_id(refurbishment.id, "refurbishment")?),
        car_id: Set(refurbishment.car_id.to_hex()),
        work_items: Set(to_json(&refurbishment.work_items, "refurbishment work items")?),
        notes: Set(refurbishment.notes.clone()),
        created_by: Set(refurbishment.created_by.to_hex()),
        created_at: Set(to_column_time(refurbishment.created_at)),
        updated_at: Set(to_column_time(refurbishment.updated_at)),
    })
}

#[async_trait]
impl CarStore for SqlStore {
    async fn insert(&self, mut car: Car) -> Result<Car, StoreError> {
        if self
            .find_by_identity(&car.chassis_number, &car.engine_number)
            .await?
            .is_some()
        {
            return Err(StoreError::Conflict(format!(
                "vehicle identity {}/{}",
                car.chassis_number, car.engine_number
            )));
        }
        if car.created_at.is_none() {
            car.created_at = Some(now());
        }
        car.id = Some(ObjectId::new());
        car::Entity::insert(car_row(&car)?).exec(&self.db).await?;
        Ok(car)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Car>, StoreError> {
        let row = car::Entity::find_by_id(id.to_hex()).one(&self.db).await?;
        row.map(car_from_row).transpose()
    }

    async fn find_by_identity(
        &self,
        chassis_number: &str,
        engine_number: &str,
    ) -> Result<Option<Car>, StoreError> {
        let row = car::Entity::find()
            .filter(car::Column::ChassisNumber.eq(chassis_number))
            .filter(car::Column::EngineNumber.eq(engine_number))
            .one(&self.db)
            .await?;
        row.map(car_from_row).transpose()
    }

    async fn list(&self, scope: Scope) -> Result<Vec<Car>, StoreError> {
        let mut query = car::Entity::find();
        if let Some(owner) = scope.owner() {
            query = query.filter(car::Column::AddedBy.eq(owner.to_hex()));
        }
        let rows = query
            .order_by_desc(car::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(car_from_row).collect()
    }

    async fn update(&self, id: &ObjectId, patch: CarPatch) -> Result<Option<Car>, StoreError> {
        let Some(row) = car::Entity::find_by_id(id.to_hex()).one(&self.db).await? else {
            return Ok(None);
        };
        let mut car = car_from_row(row)?;
        let chassis = patch
            .chassis_number
            .clone()
            .unwrap_or_else(|| car.chassis_number.clone());
        let engine = patch
            .engine_number
            .clone()
            .unwrap_or_else(|| car.engine_number.clone());
        if chassis != car.chassis_number || engine != car.engine_number {
            let clash = self.find_by_identity(&chassis, &engine).await?;
            if clash.is_some_and(|other| other.id != car.id) {
                return Err(StoreError::Conflict(format!(
                    "vehicle identity {chassis}/{engine}"
                )));
            }
        }
        patch.apply(&mut car);
        car.updated_at = Some(now());
        car::Entity::update(car_row(&car)?).exec(&self.db).await?;
        Ok(Some(car))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let Some(row) = car::Entity::find_by_id(id.to_hex()).one(&self.db).await? else {
            return Ok(false);
        };
        let car = car_from_row(row)?;
        let res = car::Entity::delete_by_id(id.to_hex()).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Ok(false);
        }

        let mut photos = car.photos;
        if let Some(sold) = car.sold {
            photos.extend(sold.customer_photos);
        }
        let rows = gallery_item::Entity::find().all(&self.db).await?;
        for row in rows {
            let mut item = gallery_from_row(row)?;
            let mut changed = false;
            if item.car_id.as_ref() == Some(id) {
                item.car_id = None;
                changed = true;
            }
            let kept = item.photos.len();
            item.photos.retain(|photo| !photos.contains(photo));
            changed |= item.photos.len() != kept;
            if changed {
                gallery_item::Entity::update(gallery_row(&item)?)
                    .exec(&self.db)
                    .await?;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl GalleryStore for SqlStore {
    async fn insert(&self, mut item: GalleryItem) -> Result<GalleryItem, StoreError> {
        if item.created_at.is_none() {
            item.created_at = Some(now());
        }
        item.id = Some(ObjectId::new());
        gallery_item::Entity::insert(gallery_row(&item)?)
            .exec(&self.db)
            .await?;
        Ok(item)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<GalleryItem>, StoreError> {
        let row = gallery_item::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?;
        row.map(gallery_from_row).transpose()
    }

    async fn list(&self, scope: Scope) -> Result<Vec<GalleryItem>, StoreError> {
        let mut query = gallery_item::Entity::find();
        if let Some(owner) = scope.owner() {
            query = query.filter(gallery_item::Column::CreatedBy.eq(owner.to_hex()));
        }
        let rows = query
            .order_by_desc(gallery_item::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(gallery_from_row).collect()
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: GalleryPatch,
    ) -> Result<Option<GalleryItem>, StoreError> {
        let Some(row) = gallery_item::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let mut item = gallery_from_row(row)?;
        patch.apply(&mut item);
        item.updated_at = Some(now());
        gallery_item::Entity::update(gallery_row(&item)?)
            .exec(&self.db)
            .await?;
        Ok(Some(item))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let Some(row) = gallery_item::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };
        let item = gallery_from_row(row)?;
        let res = gallery_item::Entity::delete_by_id(id.to_hex())
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Ok(false);
        }

        if !item.photos.is_empty() {
            let rows = car::Entity::find().all(&self.db).await?;
            for row in rows {
                let mut car = car_from_row(row)?;
                let mut changed = false;
                let kept = car.photos.len();
                car.photos.retain(|photo| !item.photos.contains(photo));
                changed |= car.photos.len() != kept;
                if let Some(sold) = car.sold.as_mut() {
                    let kept = sold.customer_photos.len();
                    sold.customer_photos
                        .retain(|photo| !item.photos.contains(photo));
                    changed |= sold.customer_photos.len() != kept;
                }
                if changed {
                    car::Entity::update(car_row(&car)?).exec(&self.db).await?;
                }
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl RefurbishmentStore for SqlStore {
    async fn insert(&self, mut refurbishment: Refurbishment) -> Result<Refurbishment, StoreError> {
        if refurbishment.created_at.is_none() {
            refurbishment.created_at = Some(now());
        }
        refurbishment.id = Some(ObjectId::new());
        refurbishment::Entity::insert(refurbishment_row(&refurbishment)?)
            .exec(&self.db)
            .await?;
        Ok(refurbishment)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Refurbishment>, StoreError> {
        let row = refurbishment::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?;
        row.map(refurbishment_from_row).transpose()
    }

    async fn list(&self, scope: Scope) -> Result<Vec<Refurbishment>, StoreError> {
        let mut query = refurbishment::Entity::find();
        if let Some(owner) = scope.owner() {
            query = query.filter(refurbishment::Column::CreatedBy.eq(owner.to_hex()));
        }
        let rows = query
            .order_by_desc(refurbishment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(refurbishment_from_row).collect()
    }

    async fn list_for_car(&self, car_id: &ObjectId) -> Result<Vec<Refurbishment>, StoreError> {
        let rows = refurbishment::Entity::find()
            .filter(refurbishment::Column::CarId.eq(car_id.to_hex()))
            .order_by_desc(refurbishment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        rows.into_iter().map(refurbishment_from_row).collect()
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: RefurbishmentPatch,
    ) -> Result<Option<Refurbishment>, StoreError> {
        let Some(row) = refurbishment::Entity::find_by_id(id.to_hex())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let mut refurbishment = refurbishment_from_row(row)?;
        patch.apply(&mut refurbishment);
        refurbishment.updated_at = Some(now());
        refurbishment::Entity::update(refurbishment_row(&refurbishment)?)
            .exec(&self.db)
            .await?;
        Ok(Some(refurbishment))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = refurbishment::Entity::delete_by_id(id.to_hex())
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
