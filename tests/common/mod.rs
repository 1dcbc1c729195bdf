#![allow(dead_code)]

use std::{
    env,
    sync::{Mutex, MutexGuard, OnceLock},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use mongodb::Client;

use dealerdesk::config::{Config, StoreBackend, StoreConfig};
use dealerdesk::state::{AppState, init_state_with};
use dealerdesk::store::Store;

/// Global lock so integration tests that share the MongoDB server run
/// one-at-a-time.
static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct MongoContext {
    pub store: Store,
    pub db_name: String,
    _guard: MutexGuard<'static, ()>,
}

pub fn sqlite_store_config() -> StoreConfig {
    StoreConfig {
        backend: StoreBackend::Sql,
        mongo_uri: String::new(),
        mongo_db: String::new(),
        sql_url: "sqlite::memory:".to_string(),
        max_connections: 5,
        min_connections: 1,
        acquire_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(300),
    }
}

pub fn test_config(store: StoreConfig) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().expect("test listen addr"),
        store,
        jwt_secret: "integration-test-secret".to_string(),
        token_days: 1,
        upload_dir: env::temp_dir().join("dealerdesk-test-uploads"),
        storage_url: None,
        renderer_url: None,
        admin_name: "Seed Admin".to_string(),
        admin_email: "admin@dealerdesk.test".to_string(),
        admin_password: "seed-admin-pass".to_string(),
    }
}

/// Full application state over an in-memory SQLite database, including the
/// seeded admin account. Runs everywhere; no external services.
pub async fn sqlite_state() -> AppState {
    init_state_with(test_config(sqlite_store_config()))
        .await
        .expect("failed to build sqlite-backed state")
}

/// Bare store over an in-memory SQLite database, with no seeding.
pub async fn sqlite_store() -> Store {
    Store::connect(&sqlite_store_config())
        .await
        .expect("failed to connect sqlite store")
}

fn mongo_uri() -> String {
    env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

/// Bare store over a throwaway MongoDB database, or `None` when no server is
/// reachable.
pub async fn setup_mongo() -> Option<MongoContext> {
    let guard = TEST_DB_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("failed to lock test db mutex");

    let uri = mongo_uri();
    let db_name = format!(
        "dealerdesk_test_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock")
            .as_millis()
    );

    let client = match Client::with_uri_str(&uri).await {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Skipping test; cannot connect to MongoDB: {err:?}");
            drop(guard);
            return None;
        }
    };
    if let Err(err) = client.database(&db_name).drop().await {
        eprintln!("Skipping test; cannot drop test DB: {err:?}");
        drop(guard);
        return None;
    }

    let config = StoreConfig {
        backend: StoreBackend::Mongo,
        mongo_uri: uri,
        mongo_db: db_name.clone(),
        sql_url: String::new(),
        max_connections: 5,
        min_connections: 1,
        acquire_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(300),
    };
    match Store::connect(&config).await {
        Ok(store) => Some(MongoContext {
            store,
            db_name,
            _guard: guard,
        }),
        Err(err) => {
            eprintln!("Skipping test; cannot connect mongo store: {err:?}");
            drop(guard);
            None
        }
    }
}

pub async fn teardown(ctx: Option<MongoContext>) {
    if let Some(ctx) = ctx {
        if let Ok(client) = Client::with_uri_str(&mongo_uri()).await {
            let _ = client.database(&ctx.db_name).drop().await;
        }
        drop(ctx);
    }
}
