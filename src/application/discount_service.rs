use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cart::CartOwner;
use crate::domain::discount::{
    normalize_code, ActiveDiscount, AppliedDiscount, CouponSource, Discount, DiscountInput,
    DiscountLine, DiscountStats,
};
use crate::domain::errors::{DiscountRejection, DomainError};
use crate::domain::ports::{CartRepository, DiscountRepository};

pub struct DiscountService<D, C> {
    discounts: D,
    carts: C,
}

impl<D: DiscountRepository, C: CartRepository> DiscountService<D, C> {
    pub fn new(discounts: D, carts: C) -> Self {
        Self { discounts, carts }
    }

    /// Checks a code without redeeming it. An explicit `cart_total` is
    /// treated as one unscoped line; otherwise the caller's cart is used.
    pub fn validate(
        &self,
        code: &str,
        cart_total: Option<BigDecimal>,
        owner: Option<&CartOwner>,
        now: DateTime<Utc>,
    ) -> Result<AppliedDiscount, DomainError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(DomainError::invalid("Discount code is required"));
        }
        let lines = match (cart_total, owner) {
            (Some(total), _) => {
                if total < BigDecimal::zero() {
                    return Err(DomainError::invalid("cart_total must not be negative"));
                }
                vec![DiscountLine {
                    product_id: Uuid::nil(),
                    category_id: None,
                    line_total: total,
                }]
            }
            (None, Some(owner)) => self.cart_discount_lines(owner)?,
            (None, None) => {
                return Err(DomainError::invalid("cart_total or a cart is required"))
            }
        };
        let customer_id = match owner {
            Some(CartOwner::Customer(id)) => Some(*id),
            _ => None,
        };
        let source = self
            .discounts
            .find_coupon(&code)?
            .ok_or(DiscountRejection::NotFound)?;
        let customer_uses = match (&source, customer_id) {
            (CouponSource::Merchant(d), Some(customer)) => Some(self.discounts.customer_uses(d.id, customer)?),
            _ => None,
        };
        Ok(source.evaluate(&lines, customer_uses, now)?)
    }

    fn cart_discount_lines(&self, owner: &CartOwner) -> Result<Vec<DiscountLine>, DomainError> {
        let Some(cart) = self.carts.find_cart(owner)? else {
            return Ok(vec![]);
        };
        Ok(self
            .carts
            .cart_lines(cart.id)?
            .into_iter()
            .map(|l| DiscountLine {
                product_id: l.product.id,
                category_id: l.product.category_id,
                line_total: &l.product.price_with_vat * BigDecimal::from(l.quantity),
            })
            .collect())
    }

    pub fn active(&self, now: DateTime<Utc>) -> Result<Vec<ActiveDiscount>, DomainError> {
        Ok(self
            .discounts
            .discounts()?
            .iter()
            .filter(|d| d.is_running(now))
            .map(Discount::public_view)
            .collect())
    }

    // ── Back office ──────────────────────────────────────────────────────────

    pub fn list(&self) -> Result<Vec<Discount>, DomainError> {
        self.discounts.discounts()
    }

    pub fn create(&self, input: DiscountInput) -> Result<Discount, DomainError> {
        let discount = self.discounts.create_discount(input.validate()?)?;
        log::info!("Discount {} created", discount.code);
        Ok(discount)
    }

    pub fn update(&self, id: Uuid, input: DiscountInput) -> Result<Discount, DomainError> {
        self.discounts
            .update_discount(id, input.validate()?)?
            .ok_or(DomainError::NotFound("Discount"))
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.discounts.delete_discount(id)? {
            return Err(DomainError::NotFound("Discount"));
        }
        Ok(())
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<DiscountStats, DomainError> {
        Ok(DiscountStats::of(&self.discounts.discounts()?, now))
    }
}
