pub mod account;
pub mod admin;
pub mod auth;
pub mod contracts;
pub mod runs;
pub mod trading;
pub mod wallets;
pub mod withdrawals;
