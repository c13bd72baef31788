use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::Product;
use super::errors::DomainError;
use super::money::{round2, sum};

/// Who a cart belongs to. Logged-in customers own one cart each; anonymous
/// visitors are tracked by a client-generated session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    Customer(Uuid),
    Session(String),
}

impl CartOwner {
    /// Customer id wins over session id when both are known.
    pub fn resolve(customer_id: Option<Uuid>, session_id: Option<String>) -> Result<Self, DomainError> {
        match (customer_id, session_id) {
            (Some(id), _) => Ok(CartOwner::Customer(id)),
            (None, Some(s)) if !s.trim().is_empty() => Ok(CartOwner::Session(s)),
            _ => Err(DomainError::invalid("Either customer id or session id is required")),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub quantity: i32,
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartTotals {
    /// Sum of net line prices.
    #[schema(value_type = String)]
    pub subtotal: BigDecimal,
    #[schema(value_type = String)]
    pub vat_total: BigDecimal,
    /// Sum of gross line prices.
    #[schema(value_type = String)]
    pub total: BigDecimal,
    pub item_count: i64,
}

impl CartTotals {
    pub fn of(lines: &[CartLine]) -> Self {
        let gross: Vec<BigDecimal> = lines
            .iter()
            .map(|l| &l.product.price_with_vat * BigDecimal::from(l.quantity))
            .collect();
        let net: Vec<BigDecimal> = lines
            .iter()
            .map(|l| &l.product.price_without_vat * BigDecimal::from(l.quantity))
            .collect();
        let total = sum(&gross);
        let subtotal = sum(&net);
        CartTotals {
            vat_total: round2(&(&total - &subtotal)),
            subtotal: round2(&subtotal),
            total: round2(&total),
            item_count: lines.iter().map(|l| i64::from(l.quantity)).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartView {
    pub cart_id: Uuid,
    pub items: Vec<CartLine>,
    pub accessories: Vec<Product>,
    #[serde(flatten)]
    pub totals: CartTotals,
}

/// Picks up to `limit` accessory suggestions, skipping duplicates and
/// products already in the cart. `candidates` keeps its input order.
pub fn pick_accessories(candidates: Vec<Product>, in_cart: &[Uuid], limit: usize) -> Vec<Product> {
    let mut picked: Vec<Product> = Vec::with_capacity(limit);
    for candidate in candidates {
        if picked.len() == limit {
            break;
        }
        if in_cart.contains(&candidate.id) || picked.iter().any(|p| p.id == candidate.id) {
            continue;
        }
        picked.push(candidate);
    }
    picked
}
