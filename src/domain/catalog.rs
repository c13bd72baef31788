use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::money::{percent_of, round2};

/// How VAT is charged on a product. Second-hand ("bazaar") goods are sold
/// under the margin scheme, where VAT is not itemised on the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VatMode {
    Standard,
    Margin,
}

impl VatMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VatMode::Standard => "standard",
            VatMode::Margin => "margin",
        }
    }
}

impl fmt::Display for VatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VatMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(VatMode::Standard),
            "margin" => Ok(VatMode::Margin),
            other => Err(DomainError::Internal(format!("unknown vat mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub slug: String,
    pub name_sk: String,
    pub name_cs: Option<String>,
    pub description_sk: Option<String>,
    pub description_cs: Option<String>,
    pub category_id: Option<Uuid>,
    pub manufacturer: Option<String>,
    #[schema(value_type = String)]
    pub price_without_vat: BigDecimal,
    #[schema(value_type = String)]
    pub price_with_vat: BigDecimal,
    #[schema(value_type = Option<String>)]
    pub original_price: Option<BigDecimal>,
    #[serde(skip)]
    pub purchase_price: Option<BigDecimal>,
    #[schema(value_type = String)]
    pub vat_rate: BigDecimal,
    pub vat_mode: VatMode,
    pub stock_quantity: i32,
    pub track_stock: bool,
    pub low_stock_threshold: i32,
    pub main_image_url: Option<String>,
    pub gallery_images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_sale: bool,
    pub is_bazaar: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        !self.track_stock || self.stock_quantity > 0
    }

    /// Whether `quantity` units can be sold right now.
    pub fn can_supply(&self, quantity: i32) -> bool {
        !self.track_stock || self.stock_quantity >= quantity
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub slug: String,
    pub name_sk: String,
    pub name_cs: Option<String>,
    pub description_sk: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub is_bazaar: Option<bool>,
    pub is_new: Option<bool>,
    pub is_sale: Option<bool>,
    pub is_featured: Option<bool>,
    pub sort: ProductSort,
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
}

/// Admin input for creating or replacing a product.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProductInput {
    pub sku: String,
    pub slug: String,
    pub name_sk: String,
    pub name_cs: Option<String>,
    pub description_sk: Option<String>,
    pub description_cs: Option<String>,
    pub category_id: Option<Uuid>,
    pub manufacturer: Option<String>,
    #[schema(value_type = String)]
    pub price_without_vat: BigDecimal,
    /// Derived from `price_without_vat` and `vat_rate` when omitted.
    #[schema(value_type = Option<String>)]
    pub price_with_vat: Option<BigDecimal>,
    #[schema(value_type = Option<String>)]
    pub original_price: Option<BigDecimal>,
    #[schema(value_type = Option<String>)]
    pub purchase_price: Option<BigDecimal>,
    #[schema(value_type = String)]
    #[serde(default = "default_vat_rate")]
    pub vat_rate: BigDecimal,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_true")]
    pub track_stock: bool,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default)]
    pub is_bazaar: bool,
}

fn default_vat_rate() -> BigDecimal {
    BigDecimal::from(20)
}

fn default_true() -> bool {
    true
}

fn default_low_stock_threshold() -> i32 {
    5
}

/// Validated product values ready to persist.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub input: ProductInput,
    pub price_with_vat: BigDecimal,
    pub vat_mode: VatMode,
}

impl ProductInput {
    pub fn validate(self) -> Result<ProductDraft, DomainError> {
        if self.sku.trim().is_empty() || self.slug.trim().is_empty() || self.name_sk.trim().is_empty() {
            return Err(DomainError::invalid("sku, slug and name_sk are required"));
        }
        if self.price_without_vat < BigDecimal::zero() {
            return Err(DomainError::invalid("price_without_vat must not be negative"));
        }
        if self.vat_rate < BigDecimal::zero() || self.vat_rate > BigDecimal::from(100) {
            return Err(DomainError::invalid("vat_rate must be between 0 and 100"));
        }
        if self.stock_quantity < 0 {
            return Err(DomainError::invalid("stock_quantity must not be negative"));
        }
        let price_with_vat = match &self.price_with_vat {
            Some(p) if *p < self.price_without_vat => {
                return Err(DomainError::invalid(
                    "price_with_vat must not be lower than price_without_vat",
                ))
            }
            Some(p) => round2(p),
            None => gross_price(&self.price_without_vat, &self.vat_rate),
        };
        let vat_mode = if self.is_bazaar {
            VatMode::Margin
        } else {
            VatMode::Standard
        };
        Ok(ProductDraft {
            input: self,
            price_with_vat,
            vat_mode,
        })
    }
}

/// Net price plus VAT, rounded to cents.
pub fn gross_price(net: &BigDecimal, vat_rate: &BigDecimal) -> BigDecimal {
    round2(&(net + percent_of(net, vat_rate)))
}
