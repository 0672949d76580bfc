pub mod refunds;
pub mod runs;
pub mod withdrawals;
