use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::discount::NewsletterCoupon;
use super::errors::DomainError;

pub const COUPON_PREFIX: &str = "NEWS-";
const COUPON_SUFFIX_LEN: usize = 8;

/// How long a freshly issued coupon stays redeemable.
pub fn coupon_ttl() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub language: String,
    pub discount_code: Option<String>,
    pub discount_expires_at: Option<DateTime<Utc>>,
    pub discount_used: bool,
    pub gdpr_consent: bool,
    pub gdpr_consent_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    pub fn coupon(&self) -> Option<NewsletterCoupon> {
        self.discount_code.as_ref().map(|code| NewsletterCoupon {
            subscriber_id: self.id,
            code: code.clone(),
            is_active: self.is_active,
            discount_used: self.discount_used,
            expires_at: self.discount_expires_at,
        })
    }

    /// The code, when it can still be redeemed.
    pub fn redeemable_code(&self, now: DateTime<Utc>) -> Option<&str> {
        if !self.is_active || self.discount_used {
            return None;
        }
        match (&self.discount_code, self.discount_expires_at) {
            (Some(code), Some(expires)) if expires > now => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub gdpr_consent: bool,
}

fn default_language() -> String {
    "sk".to_string()
}

/// A validated subscription with a freshly minted coupon.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub email: String,
    pub language: String,
    pub discount_code: String,
    pub expires_at: DateTime<Utc>,
    pub consented_at: DateTime<Utc>,
}

impl SubscribeRequest {
    pub fn into_subscription(self, now: DateTime<Utc>) -> Result<Subscription, DomainError> {
        if !self.gdpr_consent {
            return Err(DomainError::invalid("GDPR consent is required"));
        }
        let language = match self.language.trim() {
            "" => default_language(),
            l => l.to_lowercase(),
        };
        Ok(Subscription {
            email: normalize_email(&self.email)?,
            language,
            discount_code: generate_code(),
            expires_at: now + coupon_ttl(),
            consented_at: now,
        })
    }
}

/// Trims and lower-cases an address; rejects anything without an `@`.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::invalid("A valid email address is required")),
    }
}

/// `NEWS-` followed by eight uppercase alphanumerics.
pub fn generate_code() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(COUPON_SUFFIX_LEN)
        .collect();
    format!("{COUPON_PREFIX}{}", suffix.to_uppercase())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscribeResult {
    pub discount_code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionStatus {
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
}

impl SubscriptionStatus {
    pub fn of(subscriber: Option<&Subscriber>, now: DateTime<Utc>) -> Self {
        match subscriber {
            Some(s) if s.is_active => SubscriptionStatus {
                subscribed: true,
                discount_code: s.redeemable_code(now).map(str::to_string),
            },
            _ => SubscriptionStatus {
                subscribed: false,
                discount_code: None,
            },
        }
    }
}
