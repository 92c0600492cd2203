// Library modules, shared by the binary and integration tests
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod services;
pub mod sink;
pub mod text_processing;
pub mod utils;
