pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repositories;
pub mod routes;
pub mod utils;
