// lib.rs

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod state;
pub mod storage;
pub mod store;
