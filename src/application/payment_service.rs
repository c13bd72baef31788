//! Payment provider notifications.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderRef;
use crate::domain::ports::OrderRepository;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed Stripe event.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: StripeCheckoutSession,
}

#[derive(Debug, Default, Deserialize)]
struct StripeCheckoutSession {
    #[serde(default)]
    metadata: StripeMetadata,
    payment_intent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StripeMetadata {
    /// Our order number.
    order_id: Option<String>,
}

/// Form fields posted by TrustPay.
#[derive(Debug, Clone, Deserialize)]
pub struct TrustPayNotification {
    #[serde(rename = "RES")]
    pub result: String,
    #[serde(rename = "REF")]
    pub reference: String,
    #[serde(rename = "PID")]
    pub payment_id: Option<String>,
}

/// Verifies a `Stripe-Signature` header (`t=<ts>,v1=<hex>[,v1=<hex>...]`)
/// against the raw request body.
pub fn verify_stripe_signature(
    secret: &str,
    header: &str,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", t)) => timestamp = t.parse().ok(),
            Some(("v1", sig)) => signatures.push(sig),
            _ => {}
        }
    }
    let invalid = || DomainError::invalid("Invalid webhook signature");
    let timestamp = timestamp.ok_or_else(invalid)?;
    if (now.timestamp() - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(invalid());
    }

    let mut signed = timestamp.to_string().into_bytes();
    signed.push(b'.');
    signed.extend_from_slice(body);

    let matches = signatures.iter().any(|sig| {
        let Ok(expected) = hex::decode(sig) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(&signed);
        mac.verify_slice(&expected).is_ok()
    });
    if matches {
        Ok(())
    } else {
        Err(invalid())
    }
}

pub struct PaymentService<O> {
    orders: O,
    stripe_secret: Option<String>,
}

impl<O: OrderRepository> PaymentService<O> {
    pub fn new(orders: O, stripe_secret: Option<String>) -> Self {
        Self {
            orders,
            stripe_secret,
        }
    }

    /// Handles a Stripe event. Only completed checkout sessions change state;
    /// everything else is acknowledged.
    pub fn stripe_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if let Some(secret) = &self.stripe_secret {
            let header = signature.ok_or_else(|| DomainError::invalid("Missing Stripe-Signature header"))?;
            verify_stripe_signature(secret, header, body, now).inspect_err(|_| {
                log::warn!("Rejected Stripe webhook with an invalid signature");
            })?;
        }
        let event: StripeEvent = serde_json::from_slice(body)
            .map_err(|e| DomainError::invalid(format!("Invalid Stripe event: {e}")))?;
        if event.event_type != CHECKOUT_COMPLETED {
            log::debug!("Ignoring Stripe event {}", event.event_type);
            return Ok(());
        }
        let session = event.data.object;
        let Some(order_number) = session.metadata.order_id else {
            log::warn!("Stripe checkout session without an order reference");
            return Ok(());
        };
        self.orders
            .mark_paid(&OrderRef::Number(order_number), session.payment_intent, now)?;
        Ok(())
    }

    /// `RES=0` means the payment succeeded.
    pub fn trustpay_webhook(&self, notification: TrustPayNotification, now: DateTime<Utc>) -> Result<(), DomainError> {
        if notification.result.trim() != "0" {
            log::info!(
                "TrustPay reported result {} for order {}",
                notification.result,
                notification.reference
            );
            return Ok(());
        }
        self.orders.mark_paid(
            &OrderRef::Number(notification.reference.trim().to_string()),
            notification.payment_id,
            now,
        )?;
        Ok(())
    }
}
