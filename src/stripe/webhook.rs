//! Stripe webhook signature verification and event parsing.
//!
//! Stripe signs deliveries with HMAC-SHA256 over `"{timestamp}.{body}"` and
//! sends the result in the `Stripe-Signature` header as `t=...,v1=...`.
//! Verification rejects stale timestamps to bound replay of captured
//! deliveries. Event kinds are a closed set; anything else parses as
//! `Unrecognized` and is acknowledged without side effects.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("malformed signature header")]
    BadHeader,

    #[error("signature mismatch")]
    BadSignature,

    #[error("signature timestamp outside tolerance")]
    Expired,

    #[error("malformed event payload: {0}")]
    BadPayload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CheckoutSessionCompleted,
    InvoiceFinalized,
    InvoicePaymentSucceeded,
    Unrecognized,
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => EventKind::CheckoutSessionCompleted,
            "invoice.finalized" => EventKind::InvoiceFinalized,
            "invoice.payment_succeeded" => EventKind::InvoicePaymentSucceeded,
            _ => EventKind::Unrecognized,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

#[derive(Debug)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub kind: EventKind,
    /// The `data.object` payload; decoded per kind by the handler.
    pub object: serde_json::Value,
}

/// Verify the signature header and parse the event body.
pub fn construct_event(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<WebhookEvent, WebhookError> {
    verify_signature_at(payload, sig_header, secret, Utc::now().timestamp())?;
    parse_event(payload)
}

pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let envelope: EventEnvelope = serde_json::from_slice(payload)?;
    let kind = EventKind::from_type(&envelope.event_type);
    Ok(WebhookEvent {
        id: envelope.id,
        event_type: envelope.event_type,
        kind,
        object: envelope.data.object,
    })
}

pub fn verify_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), WebhookError> {
    verify_signature_at(payload, sig_header, secret, Utc::now().timestamp())
}

fn verify_signature_at(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in sig_header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => {
                if let Ok(sig) = hex::decode(value) {
                    candidates.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::BadHeader)?;
    if candidates.is_empty() {
        return Err(WebhookError::BadHeader);
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::Expired);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::BadHeader)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    // verify_slice is constant-time; accept any matching v1 entry.
    for candidate in &candidates {
        if mac.clone().verify_slice(candidate).is_ok() {
            return Ok(());
        }
    }
    Err(WebhookError::BadSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_valid_signature() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let now = Utc::now().timestamp();
        let header = sign(payload, SECRET, now);
        assert!(verify_signature_at(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let now = Utc::now().timestamp();
        let header = sign(payload, "whsec_other", now);
        assert!(matches!(
            verify_signature_at(payload, &header, SECRET, now),
            Err(WebhookError::BadSignature)
        ));
    }

    #[test]
    fn rejects_modified_payload() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let now = Utc::now().timestamp();
        let header = sign(payload, SECRET, now);
        let tampered = br#"{"type":"checkout.session.completed","amount":0}"#;
        assert!(matches!(
            verify_signature_at(tampered, &header, SECRET, now),
            Err(WebhookError::BadSignature)
        ));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let payload = b"{}";
        let now = Utc::now().timestamp();
        let header = sign(payload, SECRET, now - 600);
        assert!(matches!(
            verify_signature_at(payload, &header, SECRET, now),
            Err(WebhookError::Expired)
        ));
    }

    #[test]
    fn rejects_header_without_signature() {
        let payload = b"{}";
        let now = Utc::now().timestamp();
        assert!(matches!(
            verify_signature_at(payload, "t=123", SECRET, now),
            Err(WebhookError::BadHeader)
        ));
        assert!(matches!(
            verify_signature_at(payload, "garbage", SECRET, now),
            Err(WebhookError::BadHeader)
        ));
    }

    #[test]
    fn event_kinds_are_a_closed_set() {
        assert_eq!(
            EventKind::from_type("checkout.session.completed"),
            EventKind::CheckoutSessionCompleted
        );
        assert_eq!(
            EventKind::from_type("invoice.finalized"),
            EventKind::InvoiceFinalized
        );
        assert_eq!(
            EventKind::from_type("invoice.payment_succeeded"),
            EventKind::InvoicePaymentSucceeded
        );
        assert_eq!(
            EventKind::from_type("customer.subscription.deleted"),
            EventKind::Unrecognized
        );
    }

    #[test]
    fn parses_event_envelope() {
        let payload = br#"{
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_123" } }
        }"#;
        let event = parse_event(payload).unwrap();
        assert_eq!(event.id, "evt_123");
        assert_eq!(event.kind, EventKind::CheckoutSessionCompleted);
        assert_eq!(event.object["id"], "cs_123");
    }

    #[test]
    fn rejects_malformed_body() {
        assert!(matches!(
            parse_event(b"not json"),
            Err(WebhookError::BadPayload(_))
        ));
    }
}
