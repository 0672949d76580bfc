pub mod users;
pub mod contracts;
pub mod contract_plans;
pub mod withdrawals;
pub mod trusted_wallets;
pub mod run_sessions;
pub mod run_earnings;
pub mod permission_codes;
pub mod pin_reset_codes;
pub mod telegram_link_tokens;
pub mod account_management_payments;
pub mod trading_accounts;
