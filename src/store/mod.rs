// store/mod.rs
// Record store facade. Both storage engines implement the same per-entity
// traits; the active one is chosen once at startup from configuration and
// handed to the rest of the app as trait objects.

pub mod mongo;
pub mod seed;
pub mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;
use crate::models::{
    AdvancePayment, AdvancePaymentPatch, Car, CarPatch, GalleryItem, GalleryPatch, RcPatch,
    RcRecord, Refurbishment, RefurbishmentPatch, SellLetter, SellLetterPatch, ServiceBill,
    ServiceBillPatch, User, UserPatch,
};

pub use mongo::MongoStore;
pub use sql::SqlStore;

pub(crate) fn now() -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_system_time(std::time::SystemTime::now())
}

/// Row visibility for list reads: everything, or one owner's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Owner(ObjectId),
}

impl Scope {
    pub fn owner(&self) -> Option<&ObjectId> {
        match self {
            Scope::All => None,
            Scope::Owner(id) => Some(id),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    async fn update(&self, id: &ObjectId, patch: UserPatch) -> Result<Option<User>, StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CarStore: Send + Sync {
    async fn insert(&self, car: Car) -> Result<Car, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<Car>, StoreError>;
    /// Lookup by the (chassis, engine) pair that identifies a physical
    /// vehicle, used for the duplicate check on intake.
    async fn find_by_identity(
        &self,
        chassis_number: &str,
        engine_number: &str,
    ) -> Result<Option<Car>, StoreError>;
    async fn list(&self, scope: Scope) -> Result<Vec<Car>, StoreError>;
    async fn update(&self, id: &ObjectId, patch: CarPatch) -> Result<Option<Car>, StoreError>;
    /// Deleting a car also detaches it from the gallery: album entries lose
    /// their `carId` link and any of the car's photo references.
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SellLetterStore: Send + Sync {
    async fn insert(&self, letter: SellLetter) -> Result<SellLetter, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<SellLetter>, StoreError>;
    async fn list(&self, scope: Scope) -> Result<Vec<SellLetter>, StoreError>;
    async fn update(
        &self,
        id: &ObjectId,
        patch: SellLetterPatch,
    ) -> Result<Option<SellLetter>, StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ServiceBillStore: Send + Sync {
    async fn insert(&self, bill: ServiceBill) -> Result<ServiceBill, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<ServiceBill>, StoreError>;
    async fn list(&self, scope: Scope) -> Result<Vec<ServiceBill>, StoreError>;
    async fn update(
        &self,
        id: &ObjectId,
        patch: ServiceBillPatch,
    ) -> Result<Option<ServiceBill>, StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait RcStore: Send + Sync {
    async fn insert(&self, record: RcRecord) -> Result<RcRecord, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<RcRecord>, StoreError>;
    async fn list(&self, scope: Scope) -> Result<Vec<RcRecord>, StoreError>;
    async fn update(&self, id: &ObjectId, patch: RcPatch)
    -> Result<Option<RcRecord>, StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait GalleryStore: Send + Sync {
    async fn insert(&self, item: GalleryItem) -> Result<GalleryItem, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<GalleryItem>, StoreError>;
    async fn list(&self, scope: Scope) -> Result<Vec<GalleryItem>, StoreError>;
    async fn update(
        &self,
        id: &ObjectId,
        patch: GalleryPatch,
    ) -> Result<Option<GalleryItem>, StoreError>;
    /// Deleting an album entry also removes its photo references from every
    /// car, including sold-customer photos.
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait RefurbishmentStore: Send + Sync {
    async fn insert(&self, refurbishment: Refurbishment) -> Result<Refurbishment, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<Refurbishment>, StoreError>;
    async fn list(&self, scope: Scope) -> Result<Vec<Refurbishment>, StoreError>;
    async fn list_for_car(&self, car_id: &ObjectId) -> Result<Vec<Refurbishment>, StoreError>;
    async fn update(
        &self,
        id: &ObjectId,
        patch: RefurbishmentPatch,
    ) -> Result<Option<Refurbishment>, StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AdvancePaymentStore: Send + Sync {
    async fn insert(&self, payment: AdvancePayment) -> Result<AdvancePayment, StoreError>;
    async fn find(&self, id: &ObjectId) -> Result<Option<AdvancePayment>, StoreError>;
    async fn list(&self, scope: Scope) -> Result<Vec<AdvancePayment>, StoreError>;
    async fn list_for_sell_letter(
        &self,
        sell_letter_id: &ObjectId,
    ) -> Result<Vec<AdvancePayment>, StoreError>;
    async fn update(
        &self,
        id: &ObjectId,
        patch: AdvancePaymentPatch,
    ) -> Result<Option<AdvancePayment>, StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}

/// One handle per entity, all backed by the engine picked at startup.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserStore>,
    pub cars: Arc<dyn CarStore>,
    pub sell_letters: Arc<dyn SellLetterStore>,
    pub service_bills: Arc<dyn ServiceBillStore>,
    pub rcs: Arc<dyn RcStore>,
    pub gallery: Arc<dyn GalleryStore>,
    pub refurbishments: Arc<dyn RefurbishmentStore>,
    pub advances: Arc<dyn AdvancePaymentStore>,
}

impl Store {
    /// Connect the configured backend and wire every entity handle to it.
    pub async fn connect(config: &StoreConfig) -> anyhow::Result<Store> {
        match config.backend {
            StoreBackend::Mongo => {
                let backend = Arc::new(MongoStore::connect(config).await?);
                Ok(Store::from_backend(backend))
            }
            StoreBackend::Sql => {
                let backend = Arc::new(SqlStore::connect(config).await?);
                Ok(Store::from_backend(backend))
            }
        }
    }

    fn from_backend<B>(backend: Arc<B>) -> Store
    where
        B: UserStore
            + CarStore
            + SellLetterStore
            + ServiceBillStore
            + RcStore
            + GalleryStore
            + RefurbishmentStore
            + AdvancePaymentStore
            + 'static,
    {
        Store {
            users: backend.clone(),
            cars: backend.clone(),
            sell_letters: backend.clone(),
            service_bills: backend.clone(),
            rcs: backend.clone(),
            gallery: backend.clone(),
            refurbishments: backend.clone(),
            advances: backend,
        }
    }
}
