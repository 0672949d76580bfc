pub mod database;
pub mod models;
pub mod config;
pub mod auth;
pub mod entity;
pub mod payout;
pub mod metaapi;
pub mod telegram;

pub use database::get_db_connection;
pub use config::Config;
pub use models::*;
pub use payout::{bybit::BybitClient, cryptomus::CryptomusClient};
pub use metaapi::MetaApiClient;
pub use telegram::TelegramNotifier;
