//! Discount codes and newsletter coupons.
//!
//! A code is looked up among merchant discounts first and among newsletter
//! coupons second. Both paths end in the same amount computation:
//! percentage of the eligible base, or a fixed amount capped at the base,
//! rounded half-up to cents.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::{DiscountRejection, DomainError};
use super::money::{percent_of, round2, sum};

/// Rate granted by every newsletter coupon.
pub const NEWSLETTER_PERCENT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl DiscountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed" => Ok(DiscountKind::Fixed),
            other => Err(DomainError::Internal(format!("unknown discount type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Discount {
    pub id: Uuid,
    pub code: String,
    pub description_sk: Option<String>,
    pub discount_type: DiscountKind,
    #[schema(value_type = String)]
    pub value: BigDecimal,
    #[schema(value_type = Option<String>)]
    pub min_order_value: Option<BigDecimal>,
    #[schema(value_type = Option<String>)]
    pub max_discount_amount: Option<BigDecimal>,
    pub max_uses: Option<i32>,
    pub max_uses_per_customer: i32,
    pub current_uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub applies_to_categories: Vec<Uuid>,
    pub applies_to_products: Vec<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Discount {
    pub fn is_scoped(&self) -> bool {
        !self.applies_to_categories.is_empty() || !self.applies_to_products.is_empty()
    }

    fn covers(&self, line: &DiscountLine) -> bool {
        self.applies_to_products.contains(&line.product_id)
            || line
                .category_id
                .is_some_and(|c| self.applies_to_categories.contains(&c))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| until < now)
    }
}

/// The coupon stored on a newsletter subscriber row.
#[derive(Debug, Clone)]
pub struct NewsletterCoupon {
    pub subscriber_id: Uuid,
    pub code: String,
    pub is_active: bool,
    pub discount_used: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub enum CouponSource {
    Merchant(Discount),
    Newsletter(NewsletterCoupon),
}

/// One cart or order line as seen by the discount rules.
#[derive(Debug, Clone)]
pub struct DiscountLine {
    pub product_id: Uuid,
    pub category_id: Option<Uuid>,
    /// Gross line total (price with VAT times quantity).
    pub line_total: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Redemption {
    Merchant { discount_id: Uuid },
    Newsletter { subscriber_id: Uuid },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppliedDiscount {
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountKind,
    #[schema(value_type = String)]
    pub value: BigDecimal,
    #[schema(value_type = String)]
    pub amount: BigDecimal,
    pub description: Option<String>,
    #[serde(skip)]
    pub redemption: Redemption,
}

/// Trims and upper-cases a code as entered by a shopper.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl CouponSource {
    /// Validates the coupon against the cart and computes its amount.
    ///
    /// `customer_uses` is the number of earlier orders by the current
    /// customer that carried this discount, or `None` for guests.
    pub fn evaluate(
        &self,
        lines: &[DiscountLine],
        customer_uses: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<AppliedDiscount, DiscountRejection> {
        let cart_total = sum(lines.iter().map(|l| &l.line_total));
        match self {
            CouponSource::Merchant(d) => evaluate_merchant(d, lines, &cart_total, customer_uses, now),
            CouponSource::Newsletter(c) => evaluate_newsletter(c, &cart_total, now),
        }
    }
}

fn evaluate_merchant(
    d: &Discount,
    lines: &[DiscountLine],
    cart_total: &BigDecimal,
    customer_uses: Option<i64>,
    now: DateTime<Utc>,
) -> Result<AppliedDiscount, DiscountRejection> {
    if !d.is_active {
        return Err(DiscountRejection::Inactive);
    }
    if d.valid_from > now {
        return Err(DiscountRejection::NotYetValid);
    }
    if d.is_expired(now) {
        return Err(DiscountRejection::Expired);
    }
    if d.max_uses.is_some_and(|max| d.current_uses >= max) {
        return Err(DiscountRejection::UsageLimitReached);
    }
    if let Some(minimum) = &d.min_order_value {
        if cart_total < minimum {
            return Err(DiscountRejection::MinimumOrderNotMet {
                minimum: round2(minimum),
            });
        }
    }
    let base = if d.is_scoped() {
        sum(lines.iter().filter(|l| d.covers(l)).map(|l| &l.line_total))
    } else {
        cart_total.clone()
    };
    if base <= BigDecimal::zero() {
        return Err(DiscountRejection::NotApplicable);
    }
    if customer_uses.is_some_and(|uses| uses >= i64::from(d.max_uses_per_customer)) {
        return Err(DiscountRejection::CustomerLimitReached);
    }

    let mut amount = discount_amount(d.discount_type, &d.value, &base);
    if let (DiscountKind::Percentage, Some(cap)) = (d.discount_type, &d.max_discount_amount) {
        if &amount > cap {
            amount = round2(cap);
        }
    }
    Ok(AppliedDiscount {
        code: d.code.clone(),
        discount_type: d.discount_type,
        value: d.value.clone(),
        amount,
        description: d.description_sk.clone(),
        redemption: Redemption::Merchant { discount_id: d.id },
    })
}

fn evaluate_newsletter(
    c: &NewsletterCoupon,
    cart_total: &BigDecimal,
    now: DateTime<Utc>,
) -> Result<AppliedDiscount, DiscountRejection> {
    if !c.is_active {
        return Err(DiscountRejection::Inactive);
    }
    // A redeemed coupon stays redeemed even if it would also be expired.
    if c.discount_used {
        return Err(DiscountRejection::AlreadyUsed);
    }
    if c.expires_at.map_or(true, |expires| expires <= now) {
        return Err(DiscountRejection::Expired);
    }
    if *cart_total <= BigDecimal::zero() {
        return Err(DiscountRejection::NotApplicable);
    }
    let value = BigDecimal::from(NEWSLETTER_PERCENT);
    Ok(AppliedDiscount {
        code: c.code.clone(),
        discount_type: DiscountKind::Percentage,
        amount: discount_amount(DiscountKind::Percentage, &value, cart_total),
        value,
        description: None,
        redemption: Redemption::Newsletter {
            subscriber_id: c.subscriber_id,
        },
    })
}

/// `base * value / 100` for percentages, `min(value, base)` for fixed
/// amounts, rounded to cents.
pub fn discount_amount(kind: DiscountKind, value: &BigDecimal, base: &BigDecimal) -> BigDecimal {
    match kind {
        DiscountKind::Percentage => round2(&percent_of(base, value)),
        DiscountKind::Fixed => round2(if value < base { value } else { base }),
    }
}

/// Admin input for creating or replacing a discount.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DiscountInput {
    pub code: String,
    pub description_sk: Option<String>,
    pub discount_type: DiscountKind,
    #[schema(value_type = String)]
    pub value: BigDecimal,
    #[schema(value_type = Option<String>)]
    pub min_order_value: Option<BigDecimal>,
    #[schema(value_type = Option<String>)]
    pub max_discount_amount: Option<BigDecimal>,
    pub max_uses: Option<i32>,
    #[serde(default = "default_per_customer")]
    pub max_uses_per_customer: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applies_to_categories: Vec<Uuid>,
    #[serde(default)]
    pub applies_to_products: Vec<Uuid>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_per_customer() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

impl DiscountInput {
    /// Normalises the code and checks value ranges.
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.code = normalize_code(&self.code);
        if self.code.is_empty() {
            return Err(DomainError::invalid("Discount code is required"));
        }
        if self.value <= BigDecimal::zero() {
            return Err(DomainError::invalid("Discount value must be positive"));
        }
        if self.discount_type == DiscountKind::Percentage && self.value > BigDecimal::from(100) {
            return Err(DomainError::invalid("Percentage discount cannot exceed 100"));
        }
        if self.max_uses_per_customer < 1 {
            return Err(DomainError::invalid("max_uses_per_customer must be at least 1"));
        }
        if self.max_uses.is_some_and(|m| m < 1) {
            return Err(DomainError::invalid("max_uses must be at least 1"));
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if until < from {
                return Err(DomainError::invalid("valid_until must not precede valid_from"));
            }
        }
        Ok(self)
    }
}

/// Public view of a running promotion.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActiveDiscount {
    pub code: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountKind,
    #[schema(value_type = String)]
    pub value: BigDecimal,
    #[schema(value_type = Option<String>)]
    pub min_order_value: Option<BigDecimal>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl Discount {
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= now
            && !self.is_expired(now)
            && self.max_uses.map_or(true, |max| self.current_uses < max)
    }

    pub fn public_view(&self) -> ActiveDiscount {
        ActiveDiscount {
            code: self.code.clone(),
            description: self.description_sk.clone(),
            discount_type: self.discount_type,
            value: self.value.clone(),
            min_order_value: self.min_order_value.clone(),
            valid_until: self.valid_until,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DiscountStats {
    pub total: i64,
    pub active: i64,
    pub expired: i64,
    pub total_used: i64,
}

impl DiscountStats {
    pub fn of(discounts: &[Discount], now: DateTime<Utc>) -> Self {
        DiscountStats {
            total: discounts.len() as i64,
            active: discounts
                .iter()
                .filter(|d| d.is_active && !d.is_expired(now))
                .count() as i64,
            expired: discounts.iter().filter(|d| d.is_expired(now)).count() as i64,
            total_used: discounts.iter().map(|d| i64::from(d.current_uses)).sum(),
        }
    }
}
