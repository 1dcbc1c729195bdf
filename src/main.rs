// main.rs
// Axum server wiring: loads config, connects the record store, seeds the
// first admin account, and serves the dealership API on LISTEN_ADDR.
//
// Endpoints:
// - GET  /api/health                  -> liveness probe
// - POST /api/auth/register           -> staff self-registration, returns a token
// - POST /api/auth/login              -> credential login, returns a token
// - /api/{cars,sell-letters,service-bills,rc,gallery,refurbishments,
//         advance-payments,users,dashboard}  -> bearer-protected JSON API

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use dealerdesk::{routes, state};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let state = state::init_state()
        .await
        .expect("failed to initialize application state");

    let addr = state.config.listen_addr;
    let app = routes::build_router(state);

    tracing::info!("listening on http://{addr}");
    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
