use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub pin: String,
    pub permission_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPinRequest {
    pub email: String,
    pub code: String,
    pub new_pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInfo {
    pub id: u64,
    pub amount: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractOptionsResponse {
    pub plans: Vec<PlanInfo>,
    pub payment_address_erc20: String,
    pub duration_options_days: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyContractRequest {
    pub plan_id: u64,
    pub duration_days: Option<i32>,
    pub payment_wallet: String,
    pub payment_tx_id: String,
    pub payout_wallet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyContractResponse {
    pub message: String,
    pub contract_id: u64,
    pub amount: Decimal,
    pub payment_wallet: String,
    pub payment_tx_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInfo {
    pub id: u64,
    pub amount: Decimal,
    pub status: String,
    pub duration_days: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopContractRequest {
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub contracts: usize,
    pub contract_list: Vec<ContractInfo>,
    pub total_principal: Decimal,
    pub available_for_withdraw: Decimal,
    pub total_withdrawn: Decimal,
    pub account_management_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    pub id: u64,
    pub wallet: String,
    pub label: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddWalletRequest {
    pub wallet: String,
    pub label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDefaultWalletRequest {
    pub wallet_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub amount: Decimal,
    pub wallet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub message: String,
    pub withdrawal_id: u64,
    pub status: String,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalInfo {
    pub id: u64,
    pub amount: Decimal,
    pub wallet: String,
    pub status: String,
    pub provider: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStartRequest {
    pub contract_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStartResponse {
    pub run_id: u64,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHeartbeatRequest {
    pub run_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatusResponse {
    pub run_id: u64,
    pub active: bool,
    pub ended: bool,
    pub earnings_so_far: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStopRequest {
    pub run_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStopResponse {
    pub message: String,
    pub earnings_added: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountManagementRequest {
    pub amount: Decimal,
    pub wallet: String,
    pub tx_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingAccountRequest {
    pub login: String,
    pub password: String,
    pub server: String,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingAccountInfo {
    pub id: u64,
    pub metaapi_account_id: String,
    pub login: String,
    pub server: String,
    pub platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramLinkResponse {
    pub token: String,
    pub bot_name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePinResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePinResetResponse {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermissionCodesRequest {
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermissionCodesResponse {
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundIpResponse {
    pub ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRefundsResponse {
    pub refunded_contracts: usize,
}
