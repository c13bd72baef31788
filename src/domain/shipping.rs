//! Shipping and payment methods and the charges they add to an order.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::money::{percent_of, round2, zero};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShippingMethod {
    pub id: Uuid,
    pub code: String,
    pub name_sk: String,
    pub description_sk: Option<String>,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    #[schema(value_type = String)]
    pub vat_rate: BigDecimal,
    #[schema(value_type = Option<String>)]
    pub free_shipping_threshold: Option<BigDecimal>,
    pub estimated_days: Option<i32>,
    pub tracking_url_template: Option<String>,
    pub available_countries: Vec<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl ShippingMethod {
    /// Method price, or zero once `items_total` reaches the free-shipping
    /// threshold.
    pub fn cost_for(&self, items_total: &BigDecimal) -> BigDecimal {
        match &self.free_shipping_threshold {
            Some(threshold) if items_total >= threshold => round2(&zero()),
            _ => round2(&self.price),
        }
    }

    pub fn ships_to(&self, country: &str) -> bool {
        self.available_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country.trim()))
    }

    /// Carrier tracking link with `{tracking_number}` substituted.
    pub fn tracking_url(&self, tracking_number: &str) -> Option<String> {
        self.tracking_url_template
            .as_ref()
            .map(|t| t.replace("{tracking_number}", tracking_number))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    None,
    Fixed,
    Percentage,
}

impl FeeType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeeType::None => "none",
            FeeType::Fixed => "fixed",
            FeeType::Percentage => "percentage",
        }
    }
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(FeeType::None),
            "fixed" => Ok(FeeType::Fixed),
            "percentage" => Ok(FeeType::Percentage),
            other => Err(DomainError::Internal(format!("unknown fee type '{other}'"))),
        }
    }
}

/// Payment method codes with special handling at checkout.
pub const BANK_TRANSFER: &str = "bank_transfer";
pub const CASH_ON_DELIVERY: &str = "cod";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub code: String,
    pub name_sk: String,
    pub description_sk: Option<String>,
    pub fee_type: FeeType,
    #[schema(value_type = String)]
    pub fee_fixed: BigDecimal,
    #[schema(value_type = String)]
    pub fee_percentage: BigDecimal,
    pub is_active: bool,
    pub sort_order: i32,
}

impl PaymentMethod {
    /// Surcharge for paying `base` with this method.
    pub fn fee_for(&self, base: &BigDecimal) -> BigDecimal {
        match self.fee_type {
            FeeType::None => round2(&zero()),
            FeeType::Fixed => round2(&self.fee_fixed),
            FeeType::Percentage => round2(&percent_of(base, &self.fee_percentage)),
        }
    }

    pub fn is_bank_transfer(&self) -> bool {
        self.code == BANK_TRANSFER
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShippingQuote {
    pub method: String,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub estimated_days: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub free_shipping_threshold: Option<BigDecimal>,
}

impl ShippingQuote {
    pub fn of(method: &ShippingMethod, order_total: &BigDecimal) -> Self {
        ShippingQuote {
            method: method.name_sk.clone(),
            price: method.cost_for(order_total),
            estimated_days: method.estimated_days,
            free_shipping_threshold: method.free_shipping_threshold.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentFeeQuote {
    pub method: String,
    pub fee_type: FeeType,
    #[schema(value_type = String)]
    pub fee: BigDecimal,
    #[schema(value_type = String)]
    pub total: BigDecimal,
}

impl PaymentFeeQuote {
    pub fn of(method: &PaymentMethod, amount: &BigDecimal) -> Self {
        let fee = method.fee_for(amount);
        PaymentFeeQuote {
            method: method.name_sk.clone(),
            fee_type: method.fee_type,
            total: round2(&(amount + &fee)),
            fee,
        }
    }
}
