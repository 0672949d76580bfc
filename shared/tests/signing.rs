//! End-to-end checks over the auth and provider-signing primitives.

use serde_json::{json, Value};
use shared::auth::{create_token, decode_token, hash_pin, normalize_pin, verify_pin};
use shared::payout::bybit::sign_request;
use shared::payout::cryptomus::{sign_body, verify_webhook_signature};
use shared::payout::{select_route, PayoutRoute};

#[test]
fn pin_flow_end_to_end() {
    let pin = normalize_pin(" 42 13 37 ").unwrap();
    assert_eq!(pin, "421337");
    let stored = hash_pin(&pin);
    assert!(verify_pin("421337", &stored));
    assert!(!verify_pin("421338", &stored));
}

#[test]
fn token_encodes_the_user_id() {
    let token = create_token(7, "s3cret").unwrap();
    let claims = decode_token(&token, "s3cret").unwrap();
    assert_eq!(claims.user_id, 7);
    assert!(claims.exp > claims.iat);
    assert!(decode_token(&token, "different").is_err());
}

#[test]
fn cryptomus_webhook_accepts_only_its_own_signature() {
    let api_key = "payout-key";
    let mut payload = json!({
        "order_id": "wd-11",
        "status": "paid",
        "is_final": true,
    });
    let sign = sign_body(&serde_json::to_string(&payload).unwrap(), api_key);
    payload["sign"] = Value::String(sign);

    assert!(verify_webhook_signature(&payload, api_key));
    assert!(!verify_webhook_signature(&payload, "other-key"));

    // Tampering after signing must invalidate it.
    payload["order_id"] = Value::String("wd-12".to_string());
    assert!(!verify_webhook_signature(&payload, api_key));
}

#[test]
fn bybit_sign_covers_every_input() {
    let base = sign_request("secret", "1700000000000", "key", "{}");
    assert_ne!(base, sign_request("other", "1700000000000", "key", "{}"));
    assert_ne!(base, sign_request("secret", "1700000000001", "key", "{}"));
    assert_ne!(base, sign_request("secret", "1700000000000", "key2", "{}"));
    assert_ne!(base, sign_request("secret", "1700000000000", "key", "{\"a\":1}"));
}

#[test]
fn payout_route_precedence() {
    assert_eq!(select_route(true, true), PayoutRoute::Cryptomus);
    assert_eq!(select_route(false, true), PayoutRoute::Bybit);
    assert_eq!(select_route(false, false), PayoutRoute::Manual);
}
