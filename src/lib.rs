// src/lib.rs

pub mod ai;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod store;
pub mod utils;

pub use routes::create_router;
