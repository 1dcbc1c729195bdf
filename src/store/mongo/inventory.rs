use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use super::{MongoStore, inserted_oid, now, scope_doc};
use crate::error::StoreError;
use crate::models::{Car, CarPatch, GalleryItem, GalleryPatch, Refurbishment, RefurbishmentPatch};
use crate::store::{CarStore, GalleryStore, RefurbishmentStore, Scope};

#[async_trait]
impl CarStore for MongoStore {
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
        let res = self.cars.insert_one(&car).await?;
        car.id = Some(inserted_oid(res.inserted_id, "car")?);
        Ok(car)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Car>, StoreError> {
        self.cars
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn find_by_identity(
        &self,
        chassis_number: &str,
        engine_number: &str,
    ) -> Result<Option<Car>, StoreError> {
        self.cars
            .find_one(doc! { "chassisNumber": chassis_number, "engineNumber": engine_number })
            .await
            .map_err(Into::into)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<Car>, StoreError> {
        let mut cursor = self
            .cars
            .find(scope_doc(&scope, "addedBy"))
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(car) = cursor.try_next().await? {
            items.push(car);
        }
        Ok(items)
    }

    async fn update(&self, id: &ObjectId, patch: CarPatch) -> Result<Option<Car>, StoreError> {
        let Some(mut car) = self.cars.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
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
        self.cars.replace_one(doc! { "_id": id }, &car).await?;
        Ok(Some(car))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let Some(car) = self.cars.find_one(doc! { "_id": id }).await? else {
            return Ok(false);
        };
        let res = self.cars.delete_one(doc! { "_id": id }).await?;
        if res.deleted_count == 0 {
            return Ok(false);
        }

        // Album entries keep existing but lose the car link and any of the
        // car's photo references.
        let mut photos = car.photos;
        if let Some(sold) = car.sold {
            photos.extend(sold.customer_photos);
        }
        self.gallery
            .update_many(doc! { "carId": id }, doc! { "$unset": { "carId": "" } })
            .await?;
        if !photos.is_empty() {
            self.gallery
                .update_many(doc! {}, doc! { "$pull": { "photos": { "$in": photos } } })
                .await?;
        }
        Ok(true)
    }
}

#[async_trait]
impl GalleryStore for MongoStore {
    async fn insert(&self, mut item: GalleryItem) -> Result<GalleryItem, StoreError> {
        if item.created_at.is_none() {
            item.created_at = Some(now());
        }
        let res = self.gallery.insert_one(&item).await?;
        item.id = Some(inserted_oid(res.inserted_id, "gallery item")?);
        Ok(item)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<GalleryItem>, StoreError> {
        self.gallery
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<GalleryItem>, StoreError> {
        let mut cursor = self
            .gallery
            .find(scope_doc(&scope, "createdBy"))
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(item) = cursor.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: GalleryPatch,
    ) -> Result<Option<GalleryItem>, StoreError> {
        let Some(mut item) = self.gallery.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        patch.apply(&mut item);
        item.updated_at = Some(now());
        self.gallery.replace_one(doc! { "_id": id }, &item).await?;
        Ok(Some(item))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let Some(item) = self.gallery.find_one(doc! { "_id": id }).await? else {
            return Ok(false);
        };
        let res = self.gallery.delete_one(doc! { "_id": id }).await?;
        if res.deleted_count == 0 {
            return Ok(false);
        }

        // Cars referencing the deleted photos drop them, including the
        // sold-customer set.
        if !item.photos.is_empty() {
            self.cars
                .update_many(
                    doc! {},
                    doc! { "$pull": {
                        "photos": { "$in": item.photos.clone() },
                        "sold.customerPhotos": { "$in": item.photos },
                    } },
                )
                .await?;
        }
        Ok(true)
    }
}

#[async_trait]
impl RefurbishmentStore for MongoStore {
    async fn insert(&self, mut refurbishment: Refurbishment) -> Result<Refurbishment, StoreError> {
        if refurbishment.created_at.is_none() {
            refurbishment.created_at = Some(now());
        }
        let res = self.refurbishments.insert_one(&refurbishment).await?;
        refurbishment.id = Some(inserted_oid(res.inserted_id, "refurbishment")?);
        Ok(refurbishment)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Refurbishment>, StoreError> {
        self.refurbishments
            .find_one(doc! { "_id": id })
            .await
            .map_err(Into::into)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<Refurbishment>, StoreError> {
        let mut cursor = self
            .refurbishments
            .find(scope_doc(&scope, "createdBy"))
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(refurbishment) = cursor.try_next().await? {
            items.push(refurbishment);
        }
        Ok(items)
    }

    async fn list_for_car(&self, car_id: &ObjectId) -> Result<Vec<Refurbishment>, StoreError> {
        let mut cursor = self
            .refurbishments
            .find(doc! { "carId": car_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        let mut items = Vec::new();
        while let Some(refurbishment) = cursor.try_next().await? {
            items.push(refurbishment);
        }
        Ok(items)
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: RefurbishmentPatch,
    ) -> Result<Option<Refurbishment>, StoreError> {
        let Some(mut refurbishment) = self.refurbishments.find_one(doc! { "_id": id }).await?
        else {
            return Ok(None);
        };
        patch.apply(&mut refurbishment);
        refurbishment.updated_at = Some(now());
        self.refurbishments
            .replace_one(doc! { "_id": id }, &refurbishment)
            .await?;
        Ok(Some(refurbishment))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let res = self.refurbishments.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}
