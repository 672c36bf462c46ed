pub mod api_client;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;
pub mod stub;
pub mod terminal;
pub mod wizard;
