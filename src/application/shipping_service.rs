use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ShippingRepository;
use crate::domain::shipping::{PaymentFeeQuote, PaymentMethod, ShippingMethod, ShippingQuote};

pub struct ShippingService<S> {
    repo: S,
}

impl<S: ShippingRepository> ShippingService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Active methods in sort order, optionally only those serving `country`.
    pub fn shipping_methods(&self, country: Option<&str>) -> Result<Vec<ShippingMethod>, DomainError> {
        let mut methods: Vec<ShippingMethod> = self
            .repo
            .shipping_methods()?
            .into_iter()
            .filter(|m| m.is_active)
            .filter(|m| country.map_or(true, |c| m.ships_to(c)))
            .collect();
        methods.sort_by_key(|m| m.sort_order);
        Ok(methods)
    }

    pub fn shipping_method(&self, id: Uuid) -> Result<ShippingMethod, DomainError> {
        self.repo
            .shipping_method(id)?
            .filter(|m| m.is_active)
            .ok_or(DomainError::NotFound("Shipping method"))
    }

    pub fn shipping_quote(&self, id: Uuid, order_total: Option<BigDecimal>) -> Result<ShippingQuote, DomainError> {
        let method = self.shipping_method(id)?;
        Ok(ShippingQuote::of(&method, &order_total.unwrap_or_else(BigDecimal::zero)))
    }

    pub fn payment_methods(&self) -> Result<Vec<PaymentMethod>, DomainError> {
        let mut methods: Vec<PaymentMethod> = self
            .repo
            .payment_methods()?
            .into_iter()
            .filter(|m| m.is_active)
            .collect();
        methods.sort_by_key(|m| m.sort_order);
        Ok(methods)
    }

    pub fn payment_method(&self, id: Uuid) -> Result<PaymentMethod, DomainError> {
        self.repo
            .payment_method(id)?
            .filter(|m| m.is_active)
            .ok_or(DomainError::NotFound("Payment method"))
    }

    pub fn fee_quote(&self, id: Uuid, amount: Option<BigDecimal>) -> Result<PaymentFeeQuote, DomainError> {
        let amount = amount.unwrap_or_else(BigDecimal::zero);
        if amount < BigDecimal::zero() {
            return Err(DomainError::invalid("amount must not be negative"));
        }
        Ok(PaymentFeeQuote::of(&self.payment_method(id)?, &amount))
    }
}
