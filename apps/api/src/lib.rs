pub mod admin;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod extraction;
pub mod llm_client;
pub mod models;
pub mod portfolio;
pub mod resume;
pub mod routes;
pub mod state;
pub mod store;
pub mod structuring;
