//! MetaApi client: provision MT4/MT5 accounts and read account information.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MetaApiConfig;

#[derive(Clone)]
pub struct MetaApiClient {
    config: MetaApiConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CreatedAccount {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInformation {
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub equity: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub broker: Option<String>,
    #[serde(default)]
    pub leverage: Option<i64>,
}

impl MetaApiClient {
    pub fn new(config: MetaApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Add a trading account; returns the MetaApi account id.
    pub async fn add_account(
        &self,
        login: &str,
        password: &str,
        server: &str,
        name: &str,
        platform: &str,
    ) -> Result<String> {
        if !self.is_configured() {
            return Err(anyhow!("METAAPI_TOKEN not set"));
        }
        let platform = if platform.trim().eq_ignore_ascii_case("mt5") {
            "mt5"
        } else {
            "mt4"
        };
        let name: String = name.trim().chars().take(128).collect();
        let url = format!("{}/users/current/accounts", self.config.provisioning_url);
        let response = self
            .client
            .post(&url)
            .header("auth-token", &self.config.token)
            .header("transaction-id", Uuid::new_v4().simple().to_string())
            .json(&serde_json::json!({
                "login": login.trim(),
                "password": password,
                "server": server.trim(),
                "name": name,
                "platform": platform,
                "magic": 0,
                "manualTrades": true,
            }))
            .timeout(std::time::Duration::from_secs(60))
            .send()
            .await?;

        match response.status().as_u16() {
            201 => {
                let created: CreatedAccount = response.json().await?;
                Ok(created.id)
            }
            202 => Err(anyhow!("Account is being created. Try again in a minute.")),
            status => {
                let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                    message: None,
                    error: None,
                });
                let msg = body
                    .message
                    .or(body.error)
                    .unwrap_or_else(|| status.to_string());
                Err(anyhow!(msg))
            }
        }
    }

    /// Account information (balance, equity, etc.) for a provisioned account.
    pub async fn get_account_information(&self, account_id: &str) -> Result<AccountInformation> {
        if !self.is_configured() {
            return Err(anyhow!("METAAPI_TOKEN not set"));
        }
        let url = format!(
            "{}/users/current/accounts/{}/account-information",
            self.config.client_url, account_id
        );
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("auth-token", &self.config.token)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await?;

        if response.status().is_success() {
            let info: AccountInformation = response.json().await?;
            return Ok(info);
        }
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
            message: None,
            error: None,
        });
        let msg = body
            .message
            .or(body.error)
            .unwrap_or_else(|| status.to_string());
        Err(anyhow!(msg))
    }
}
