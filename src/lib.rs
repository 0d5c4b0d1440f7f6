pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod services;
