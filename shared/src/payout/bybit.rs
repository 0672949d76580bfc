//! Bybit V5 client for on-chain withdrawals.
//! The destination address must already be whitelisted in the Bybit
//! address book; the API key may additionally be IP-restricted.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::config::BybitConfig;
use crate::payout::{server_outbound_ip, PayoutError};

const RECV_WINDOW: &str = "5000";
const IP_RESTRICTION_RET_CODE: i64 = 10010;

#[derive(Clone)]
pub struct BybitClient {
    config: BybitConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: Option<WithdrawResult>,
}

#[derive(Debug, Deserialize)]
struct WithdrawResult {
    #[serde(default)]
    id: Option<String>,
}

/// `sign = hmac_sha256(secret, timestamp + api_key + recv_window + body)`
pub fn sign_request(secret: &str, timestamp: &str, api_key: &str, body: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.as_bytes());
    mac.update(api_key.as_bytes());
    mac.update(RECV_WINDOW.as_bytes());
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn classify_error(ret_code: i64, message: &str) -> Option<PayoutError> {
    let lower = message.to_lowercase();
    if lower.contains("whitelist") || (lower.contains("address") && lower.contains("book")) {
        return Some(PayoutError::AddressNotWhitelisted);
    }
    if ret_code == IP_RESTRICTION_RET_CODE
        || lower.contains("unmatched ip")
        || lower.contains(" ip ")
    {
        return None; // caller attaches the outbound IP
    }
    Some(PayoutError::Provider(message.to_string()))
}

impl BybitClient {
    pub fn new(config: BybitConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Submit an on-chain withdrawal from the FUND account.
    /// Returns the Bybit withdrawal id.
    pub async fn create_withdraw(
        &self,
        address: &str,
        amount: &str,
        request_id: Option<&str>,
    ) -> Result<String, PayoutError> {
        if !self.config.is_configured() {
            return Err(PayoutError::NotConfigured);
        }
        let timestamp = Utc::now().timestamp_millis().to_string();
        let mut body = serde_json::json!({
            "coin": self.config.withdraw_coin,
            "chain": self.config.withdraw_chain,
            "address": address.trim(),
            "amount": amount,
            "timestamp": timestamp.parse::<i64>().unwrap_or_default(),
            "forceChain": 1,
            "accountType": "FUND",
        });
        if let Some(request_id) = request_id {
            // Bybit caps the idempotency key at 32 chars.
            let truncated: String = request_id.chars().take(32).collect();
            body["requestId"] = serde_json::Value::String(truncated);
        }
        let body_str = serde_json::to_string(&body)
            .map_err(|e| PayoutError::Provider(format!("request encode failed: {e}")))?;
        let signature = sign_request(
            &self.config.api_secret,
            &timestamp,
            &self.config.api_key,
            &body_str,
        );

        let url = format!("{}/v5/asset/withdraw/create", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("X-BAPI-API-KEY", &self.config.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-SIGN", signature)
            .header("X-BAPI-RECV-WINDOW", RECV_WINDOW)
            .header("Content-Type", "application/json")
            .body(body_str)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(env) => env,
            Err(_) => {
                // Non-JSON usually means the key is IP-restricted to another host.
                let server_ip = server_outbound_ip().await;
                let snippet: String = raw.chars().take(120).collect();
                return Err(PayoutError::IpRestricted {
                    message: format!("Bybit returned non-JSON (status {status}): {snippet}"),
                    server_ip,
                });
            }
        };

        if envelope.ret_code == 0 {
            return envelope
                .result
                .and_then(|r| r.id)
                .ok_or_else(|| PayoutError::Provider("Bybit returned no withdrawal id".into()));
        }

        match classify_error(envelope.ret_code, &envelope.ret_msg) {
            Some(err) => Err(err),
            None => {
                let server_ip = server_outbound_ip().await;
                Err(PayoutError::IpRestricted {
                    message: envelope.ret_msg,
                    server_ip,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic_over_payload_parts() {
        let a = sign_request("secret", "1700000000000", "key", "{\"coin\":\"USDT\"}");
        let b = sign_request("secret", "1700000000000", "key", "{\"coin\":\"USDT\"}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // hex sha256

        let other_body = sign_request("secret", "1700000000000", "key", "{\"coin\":\"BTC\"}");
        assert_ne!(a, other_body);
        let other_ts = sign_request("secret", "1700000000001", "key", "{\"coin\":\"USDT\"}");
        assert_ne!(a, other_ts);
    }

    #[test]
    fn whitelist_errors_are_detected() {
        let err = classify_error(131086, "address not in address book").unwrap();
        assert!(matches!(err, PayoutError::AddressNotWhitelisted));
        let err = classify_error(131086, "Withdraw address is not whitelisted").unwrap();
        assert!(matches!(err, PayoutError::AddressNotWhitelisted));
    }

    #[test]
    fn ip_errors_defer_to_caller() {
        assert!(classify_error(10010, "unmatched IP").is_none());
        assert!(classify_error(0, "request from unmatched ip").is_none());
    }

    #[test]
    fn other_errors_pass_through() {
        let err = classify_error(131001, "insufficient balance").unwrap();
        assert!(matches!(err, PayoutError::Provider(msg) if msg.contains("insufficient")));
    }
}
