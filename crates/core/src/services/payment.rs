//! Stripe webhook verification and event dispatch.

use admarket_common::{AppError, AppResult, Config, IdGenerator};
use admarket_db::{
    entities::notification::{self, NotificationType},
    repositories::BookingRepository,
};
use hmac::{Hmac, Mac};
use sea_orm::Set;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Payment webhook service.
#[derive(Clone)]
pub struct PaymentService {
    booking_repo: BookingRepository,
    webhook_secret: String,
    tolerance_secs: i64,
    id_gen: IdGenerator,
}

impl PaymentService {
    /// Create a new payment service.
    #[must_use]
    pub fn new(booking_repo: BookingRepository, config: &Config) -> Self {
        Self {
            booking_repo,
            webhook_secret: config.stripe.webhook_secret.clone(),
            tolerance_secs: config.stripe.webhook_tolerance_secs,
            id_gen: IdGenerator::new(),
        }
    }

    /// Verify a `Stripe-Signature` header against the raw request body.
    ///
    /// Header format: `t=<unix>,v1=<hex hmac>[,v1=...]`. The signed
    /// payload is `"{t}.{body}"`. The timestamp must be within the
    /// configured tolerance of `now`, and at least one `v1` entry must
    /// match under a constant-time comparison.
    pub fn verify_signature(&self, header: &str, body: &[u8], now: i64) -> AppResult<()> {
        let mut timestamp: Option<i64> = None;
        let mut candidates: Vec<Vec<u8>> = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = value.parse().ok();
                }
                Some(("v1", value)) => {
                    if let Ok(bytes) = hex::decode(value) {
                        candidates.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(AppError::InvalidSignature)?;
        if candidates.is_empty() {
            return Err(AppError::InvalidSignature);
        }

        if (now - timestamp).abs() > self.tolerance_secs {
            return Err(AppError::InvalidSignature);
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid webhook secret: {e}")))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        let expected = mac.finalize().into_bytes();

        let matched = candidates
            .iter()
            .any(|candidate| candidate.ct_eq(expected.as_slice()).into());

        if matched {
            Ok(())
        } else {
            Err(AppError::InvalidSignature)
        }
    }

    /// Dispatch a verified webhook event.
    ///
    /// Unknown event types and unknown session/booking ids are logged
    /// and swallowed: returning an error here would only make the
    /// provider retry a payload we can never process.
    pub async fn handle_event(&self, payload: &serde_json::Value) -> AppResult<()> {
        let event_type = payload
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| AppError::BadRequest("Missing event type".to_string()))?;

        match event_type {
            "checkout.session.completed" => self.handle_checkout_completed(payload).await,
            "payment_intent.payment_failed" => self.handle_payment_failed(payload).await,
            other => {
                tracing::debug!(event_type = other, "Ignoring unhandled webhook event");
                Ok(())
            }
        }
    }

    async fn handle_checkout_completed(&self, payload: &serde_json::Value) -> AppResult<()> {
        let session_id = object_field(payload, "id")
            .ok_or_else(|| AppError::BadRequest("Missing checkout session id".to_string()))?;

        let Some(booking) = self
            .booking_repo
            .find_by_checkout_session(session_id)
            .await?
        else {
            tracing::warn!(
                session_id = session_id,
                "Checkout completed for unknown session"
            );
            return Ok(());
        };

        let body = format!("Booking for \"{}\" is confirmed", booking.placement);
        let notifications = vec![
            self.booking_notification(
                &booking.advertiser_id,
                &booking.id,
                NotificationType::BookingConfirmed,
                &body,
            ),
            self.booking_notification(
                &booking.publisher_id,
                &booking.id,
                NotificationType::BookingConfirmed,
                &body,
            ),
        ];

        let updated = self
            .booking_repo
            .apply_checkout_completed(booking, notifications)
            .await?;

        tracing::info!(booking_id = %updated.id, "Booking confirmed and paid");

        Ok(())
    }

    async fn handle_payment_failed(&self, payload: &serde_json::Value) -> AppResult<()> {
        // Payment intents don't carry the checkout session id; the
        // booking id travels in the intent metadata set at checkout.
        let booking_id = payload
            .get("data")
            .and_then(|d| d.get("object"))
            .and_then(|o| o.get("metadata"))
            .and_then(|m| m.get("bookingId"))
            .and_then(|b| b.as_str())
            .ok_or_else(|| AppError::BadRequest("Missing booking metadata".to_string()))?;

        let Some(booking) = self.booking_repo.find_by_id(booking_id).await? else {
            tracing::warn!(booking_id = booking_id, "Payment failed for unknown booking");
            return Ok(());
        };

        let body = format!("Payment for \"{}\" failed", booking.placement);
        let notification = self.booking_notification(
            &booking.advertiser_id,
            &booking.id,
            NotificationType::PaymentFailed,
            &body,
        );

        let updated = self
            .booking_repo
            .apply_payment_failed(booking, notification)
            .await?;

        tracing::info!(booking_id = %updated.id, "Booking payment marked failed");

        Ok(())
    }

    fn booking_notification(
        &self,
        user_id: &str,
        booking_id: &str,
        notification_type: NotificationType,
        body: &str,
    ) -> notification::ActiveModel {
        notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            notification_type: Set(notification_type),
            body: Set(body.to_string()),
            reference_id: Set(Some(booking_id.to_string())),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}

fn object_field<'a>(payload: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    payload
        .get("data")
        .and_then(|d| d.get("object"))
        .and_then(|o| o.get(field))
        .and_then(|v| v.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use admarket_common::config::{
        AuthConfig, DatabaseConfig, ServerConfig, StripeConfig,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    const SECRET: &str = "whsec_test_secret";

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "jwt".to_string(),
                session_days: 7,
                secure_cookies: false,
            },
            stripe: StripeConfig {
                webhook_secret: SECRET.to_string(),
                webhook_tolerance_secs: 300,
            },
        }
    }

    fn service() -> PaymentService {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        PaymentService::new(BookingRepository::new(db), &test_config())
    }

    fn sign(body: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let service = service();
        let body = br#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;

        let header = sign(body, now);
        assert!(service.verify_signature(&header, body, now).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = service();
        let body = b"payload";
        let now = 1_700_000_000;

        let mut mac = HmacSha256::new_from_slice(b"other-secret").unwrap();
        mac.update(now.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        let header = format!("t={now},v1={}", hex::encode(mac.finalize().into_bytes()));

        let result = service.verify_signature(&header, body, now);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let service = service();
        let now = 1_700_000_000;
        let header = sign(b"original", now);

        let result = service.verify_signature(&header, b"tampered", now);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let service = service();
        let body = b"payload";
        let signed_at = 1_700_000_000;
        let header = sign(body, signed_at);

        let result = service.verify_signature(&header, body, signed_at + 301);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn test_malformed_header_rejected() {
        let service = service();

        for header in ["", "t=abc,v1=zz", "v1=deadbeef", "t=123"] {
            let result = service.verify_signature(header, b"x", 123);
            assert!(
                matches!(result, Err(AppError::InvalidSignature)),
                "header {header:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_event_type_ignored() {
        let service = service();

        let payload = json!({"type": "invoice.created", "data": {"object": {}}});
        assert!(service.handle_event(&payload).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_event_type_rejected() {
        let service = service();

        let payload = json!({"data": {"object": {}}});
        let result = service.handle_event(&payload).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unknown_session_swallowed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<admarket_db::entities::booking::Model>::new()])
                .into_connection(),
        );
        let service = PaymentService::new(BookingRepository::new(db), &test_config());

        let payload = json!({
            "type": "checkout.session.completed",
            "data": {"object": {"id": "cs_unknown"}}
        });

        assert!(service.handle_event(&payload).await.is_ok());
    }
}
