pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_contract_plans;
mod m20260301_000003_create_contracts;
mod m20260301_000004_create_withdrawals;
mod m20260301_000005_create_trusted_wallets;
mod m20260302_000001_create_run_sessions_and_earnings;
mod m20260302_000002_create_permission_codes;
mod m20260315_000001_create_pin_reset_codes;
mod m20260320_000001_create_telegram_link_tokens;
mod m20260402_000001_create_account_management_payments;
mod m20260410_000001_create_trading_accounts;
mod m20260501_000001_add_provider_to_withdrawals;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_contract_plans::Migration),
            Box::new(m20260301_000003_create_contracts::Migration),
            Box::new(m20260301_000004_create_withdrawals::Migration),
            Box::new(m20260301_000005_create_trusted_wallets::Migration),
            Box::new(m20260302_000001_create_run_sessions_and_earnings::Migration),
            Box::new(m20260302_000002_create_permission_codes::Migration),
            Box::new(m20260315_000001_create_pin_reset_codes::Migration),
            Box::new(m20260320_000001_create_telegram_link_tokens::Migration),
            Box::new(m20260402_000001_create_account_management_payments::Migration),
            Box::new(m20260410_000001_create_trading_accounts::Migration),
            Box::new(m20260501_000001_add_provider_to_withdrawals::Migration),
        ]
    }
}
