// store/sql/mod.rs
// Relational engine on sea-orm. Works against SQLite and Postgres; the
// schema is created from the entity definitions on connect so a fresh
// database is usable without a separate migration step.

pub mod entities;

mod inventory;
mod rc;
mod sales;
mod users;

use chrono::Utc;
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

use crate::config::StoreConfig;
use crate::error::StoreError;

#[derive(Clone)]
pub struct SqlStore {
    pub(crate) db: DatabaseConnection,
}

impl SqlStore {
    pub async fn connect(config: &StoreConfig) -> anyhow::Result<SqlStore> {
        let mut options = ConnectOptions::new(config.sql_url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .sqlx_logging(false);
        // An in-memory SQLite database exists per connection; more than one
        // would each see an empty schema.
        if config.sql_url.contains(":memory:") || config.sql_url.contains("mode=memory") {
            options.max_connections(1).min_connections(1);
        }

        let db = Database::connect(options).await?;
        init_schema(&db).await?;
        Ok(SqlStore { db })
    }
}

async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        schema.create_table_from_entity(entities::user::Entity),
        schema.create_table_from_entity(entities::car::Entity),
        schema.create_table_from_entity(entities::sell_letter::Entity),
        schema.create_table_from_entity(entities::service_bill::Entity),
        schema.create_table_from_entity(entities::rc::Entity),
        schema.create_table_from_entity(entities::gallery_item::Entity),
        schema.create_table_from_entity(entities::refurbishment::Entity),
        schema.create_table_from_entity(entities::advance_payment::Entity),
    ];
    for mut table in tables {
        table.if_not_exists();
        db.execute(backend.build(&table)).await?;
    }

    let identity = Index::create()
        .name("idx_cars_identity")
        .table(entities::car::Entity)
        .col(entities::car::Column::ChassisNumber)
        .col(entities::car::Column::EngineNumber)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&identity)).await?;

    Ok(())
}

pub(crate) fn parse_oid(hex: &str, what: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(hex)
        .map_err(|_| StoreError::Query(format!("corrupt {what} reference {hex}")))
}

pub(crate) fn require_id(id: Option<ObjectId>, what: &str) -> Result<String, StoreError> {
    id.map(|value| value.to_hex())
        .ok_or_else(|| StoreError::Query(format!("{what} missing id")))
}

pub(crate) fn to_json<T: serde::Serialize>(
    value: &T,
    what: &str,
) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|err| StoreError::Query(format!("{what} encode: {err}")))
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|err| StoreError::Query(format!("{what} decode: {err}")))
}

pub(crate) fn to_column_time(at: Option<bson::DateTime>) -> Option<chrono::DateTime<Utc>> {
    at.map(|value| value.to_chrono())
}

pub(crate) fn to_record_time(at: Option<chrono::DateTime<Utc>>) -> Option<bson::DateTime> {
    at.map(bson::DateTime::from_chrono)
}
