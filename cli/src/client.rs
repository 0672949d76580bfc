//! Thin HTTP client for the ContractDesk API. Server errors always carry a
//! JSON `{"detail": ...}` body, which becomes the error message here.

use anyhow::{anyhow, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::models::*;

pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Quick reachability probe against /health.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        self.http
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, &url)
            .timeout(std::time::Duration::from_secs(60));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await?;
        let status = response.status();
        let raw: Value = response
            .json()
            .await
            .map_err(|_| anyhow!("Server returned an unreadable response ({status})"))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(anyhow!(
                "{} (your session may have expired; log in again)",
                detail_of(&raw)
            ));
        }
        if !status.is_success() {
            return Err(anyhow!(detail_of(&raw)));
        }
        serde_json::from_value(raw).map_err(|e| anyhow!("Unexpected response shape: {e}"))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(&body)).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<TokenResponse> {
        self.post("/register", req).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<TokenResponse> {
        self.post("/login", req).await
    }

    pub async fn reset_pin(&self, req: &ResetPinRequest) -> Result<TokenResponse> {
        self.post("/reset-pin", req).await
    }

    pub async fn contract_options(&self) -> Result<ContractOptionsResponse> {
        self.get("/contracts/options").await
    }

    pub async fn buy(&self, req: &BuyContractRequest) -> Result<BuyContractResponse> {
        self.post("/buy", req).await
    }

    pub async fn contracts(&self) -> Result<Vec<ContractInfo>> {
        self.get("/contracts").await
    }

    pub async fn stop_contract(&self, id: u64, pin: &str) -> Result<ContractInfo> {
        self.post(
            &format!("/contracts/{id}/stop"),
            &StopContractRequest {
                pin: pin.to_string(),
            },
        )
        .await
    }

    pub async fn dashboard(&self) -> Result<DashboardResponse> {
        self.get("/dashboard").await
    }

    pub async fn wallets(&self) -> Result<Vec<WalletInfo>> {
        self.get("/wallets").await
    }

    pub async fn add_wallet(&self, req: &AddWalletRequest) -> Result<WalletInfo> {
        self.post("/wallets", req).await
    }

    pub async fn set_default_wallet(&self, wallet_id: u64) -> Result<WalletInfo> {
        let body = serde_json::to_value(SetDefaultWalletRequest { wallet_id })?;
        self.request(Method::PUT, "/wallets/default", Some(&body))
            .await
    }

    pub async fn remove_wallet(&self, wallet_id: u64) -> Result<MessageResponse> {
        self.request(Method::DELETE, &format!("/wallets/{wallet_id}"), None)
            .await
    }

    pub async fn withdraw(&self, req: &WithdrawRequest) -> Result<WithdrawResponse> {
        self.post("/withdraw", req).await
    }

    pub async fn withdrawal_history(&self) -> Result<Vec<WithdrawalInfo>> {
        self.get("/withdrawals/history").await
    }

    pub async fn run_start(&self, contract_id: u64) -> Result<RunStartResponse> {
        self.post("/run/start", &RunStartRequest { contract_id })
            .await
    }

    pub async fn run_heartbeat(&self, run_id: u64) -> Result<RunStatusResponse> {
        self.post("/run/heartbeat", &RunHeartbeatRequest { run_id })
            .await
    }

    pub async fn run_stop(&self, run_id: u64) -> Result<RunStopResponse> {
        self.post("/run/stop", &RunStopRequest { run_id }).await
    }

    pub async fn account_management(&self, req: &AccountManagementRequest) -> Result<MessageResponse> {
        self.post("/account/management", req).await
    }

    pub async fn telegram_link(&self) -> Result<TelegramLinkResponse> {
        self.request(Method::POST, "/telegram/link", Some(&Value::Object(Default::default())))
            .await
    }

    pub async fn create_trading_account(
        &self,
        req: &TradingAccountRequest,
    ) -> Result<TradingAccountInfo> {
        self.post("/trading-accounts", req).await
    }

    pub async fn trading_accounts(&self) -> Result<Vec<TradingAccountInfo>> {
        self.get("/trading-accounts").await
    }

    pub async fn trading_account_balance(&self, id: u64) -> Result<Value> {
        self.get(&format!("/trading-accounts/{id}/balance")).await
    }
}

fn detail_of(raw: &Value) -> String {
    raw.get("detail")
        .and_then(Value::as_str)
        .unwrap_or("Request failed")
        .to_string()
}
