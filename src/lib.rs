pub mod app_state;
pub mod client;
pub mod config;
pub mod models;
pub mod routes;
pub mod task;
pub mod task_db;
