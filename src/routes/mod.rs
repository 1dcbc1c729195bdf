// routes/mod.rs
// Router assembly. Everything under /api except health and the two auth
// entry points sits behind the bearer-token middleware.

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::state::AppState;

pub mod advances;
pub mod auth;
pub mod cars;
pub mod dashboard;
pub mod gallery;
pub mod helpers;
pub mod rc;
pub mod refurbishments;
pub mod sell_letters;
pub mod service_bills;
pub mod users;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/cars", get(cars::list_cars).post(cars::create_car))
        .route(
            "/api/cars/{id}",
            get(cars::get_car)
                .put(cars::update_car)
                .delete(cars::delete_car),
        )
        .route(
            "/api/sell-letters",
            get(sell_letters::list_sell_letters).post(sell_letters::create_sell_letter),
        )
        .route(
            "/api/sell-letters/{id}",
            get(sell_letters::get_sell_letter)
                .put(sell_letters::update_sell_letter)
                .delete(sell_letters::delete_sell_letter),
        )
        .route(
            "/api/service-bills",
            get(service_bills::list_service_bills).post(service_bills::create_service_bill),
        )
        .route(
            "/api/service-bills/{id}",
            get(service_bills::get_service_bill)
                .put(service_bills::update_service_bill)
                .delete(service_bills::delete_service_bill),
        )
        .route("/api/rc", get(rc::list_rcs).post(rc::create_rc))
        .route(
            "/api/rc/{id}",
            get(rc::get_rc).put(rc::update_rc).delete(rc::delete_rc),
        )
        .route(
            "/api/gallery",
            get(gallery::list_gallery).post(gallery::create_gallery_item),
        )
        .route(
            "/api/gallery/{id}",
            get(gallery::get_gallery_item)
                .put(gallery::update_gallery_item)
                .delete(gallery::delete_gallery_item),
        )
        .route(
            "/api/refurbishments",
            get(refurbishments::list_refurbishments).post(refurbishments::create_refurbishment),
        )
        .route(
            "/api/refurbishments/{id}",
            get(refurbishments::get_refurbishment)
                .put(refurbishments::update_refurbishment)
                .delete(refurbishments::delete_refurbishment),
        )
        .route(
            "/api/advance-payments",
            get(advances::list_advance_payments).post(advances::create_advance_payment),
        )
        .route(
            "/api/advance-payments/{id}",
            get(advances::get_advance_payment)
                .put(advances::update_advance_payment)
                .delete(advances::delete_advance_payment),
        )
        .route("/api/dashboard", get(dashboard::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::authenticate,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}
