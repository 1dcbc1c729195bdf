// store/mongo/mod.rs
// Document-backed engine: one typed collection per entity.

mod inventory;
mod rc;
mod sales;
mod users;

use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};

use super::Scope;
use crate::config::StoreConfig;
use crate::models::{
    AdvancePayment, Car, GalleryItem, RcRecord, Refurbishment, SellLetter, ServiceBill, User,
};

#[derive(Clone)]
pub struct MongoStore {
    pub(crate) users: Collection<User>,
    pub(crate) cars: Collection<Car>,
    pub(crate) sell_letters: Collection<SellLetter>,
    pub(crate) service_bills: Collection<ServiceBill>,
    pub(crate) rcs: Collection<RcRecord>,
    pub(crate) gallery: Collection<GalleryItem>,
    pub(crate) refurbishments: Collection<Refurbishment>,
    pub(crate) advances: Collection<AdvancePayment>,
}

impl MongoStore {
    pub async fn connect(config: &StoreConfig) -> anyhow::Result<MongoStore> {
        let mut options = ClientOptions::parse(&config.mongo_uri).await?;
        options.max_pool_size = Some(config.max_connections);
        options.min_pool_size = Some(config.min_connections);
        options.max_idle_time = Some(config.idle_timeout);
        options.server_selection_timeout = Some(config.acquire_timeout);
        options.connect_timeout = Some(config.acquire_timeout);

        let client = Client::with_options(options)?;
        let db = client.database(&config.mongo_db);

        let store = MongoStore {
            users: db.collection::<User>("users"),
            cars: db.collection::<Car>("cars"),
            sell_letters: db.collection::<SellLetter>("sell_letters"),
            service_bills: db.collection::<ServiceBill>("service_bills"),
            rcs: db.collection::<RcRecord>("rcs"),
            gallery: db.collection::<GalleryItem>("gallery_items"),
            refurbishments: db.collection::<Refurbishment>("refurbishments"),
            advances: db.collection::<AdvancePayment>("advance_payments"),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let unique = IndexOptions::builder().unique(true).build();
        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;
        self.cars
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "chassisNumber": 1, "engineNumber": 1 })
                    .options(unique)
                    .build(),
            )
            .await?;
        Ok(())
    }
}

pub(crate) fn scope_doc(scope: &Scope, field: &str) -> Document {
    match scope.owner() {
        Some(owner) => doc! { field: owner },
        None => Document::new(),
    }
}

pub(crate) use super::now;

pub(crate) fn inserted_oid(
    inserted_id: mongodb::bson::Bson,
    what: &str,
) -> Result<ObjectId, crate::error::StoreError> {
    inserted_id
        .as_object_id()
        .ok_or_else(|| crate::error::StoreError::Query(format!("{what} insert missing _id")))
}
