pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod persister;
pub mod session;
pub mod store;
pub mod trainer;
pub mod types;
pub mod utils;
