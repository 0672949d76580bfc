pub mod bybit;
pub mod cryptomus;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("payout provider not configured")]
    NotConfigured,
    #[error("address not in the Bybit address book; add it at https://www.bybit.com/user/assets/money-address")]
    AddressNotWhitelisted,
    #[error("{message}; add this IP in the Bybit API key IP restriction: {server_ip}")]
    IpRestricted { message: String, server_ip: String },
    #[error("provider error: {0}")]
    Provider(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Which provider a withdrawal goes to. Cryptomus wins when both are
/// configured; neither configured leaves the request for manual handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutRoute {
    Cryptomus,
    Bybit,
    Manual,
}

pub fn select_route(cryptomus_payout_configured: bool, bybit_configured: bool) -> PayoutRoute {
    if cryptomus_payout_configured {
        PayoutRoute::Cryptomus
    } else if bybit_configured {
        PayoutRoute::Bybit
    } else {
        PayoutRoute::Manual
    }
}

#[derive(Debug, Deserialize)]
struct IpifyResponse {
    ip: String,
}

/// Outbound IP as seen by third parties, so the operator can whitelist it.
pub async fn server_outbound_ip() -> String {
    let fetch = async {
        let resp = reqwest::Client::new()
            .get("https://api.ipify.org?format=json")
            .timeout(std::time::Duration::from_secs(3))
            .send()
            .await?
            .json::<IpifyResponse>()
            .await?;
        Ok::<_, reqwest::Error>(resp.ip)
    };
    fetch.await.unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cryptomus_takes_precedence() {
        assert_eq!(select_route(true, true), PayoutRoute::Cryptomus);
        assert_eq!(select_route(true, false), PayoutRoute::Cryptomus);
    }

    #[test]
    fn bybit_is_the_fallback() {
        assert_eq!(select_route(false, true), PayoutRoute::Bybit);
    }

    #[test]
    fn unconfigured_stays_manual() {
        assert_eq!(select_route(false, false), PayoutRoute::Manual);
    }
}
