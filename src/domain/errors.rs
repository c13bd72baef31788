use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Discount(#[from] DiscountRejection),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DomainError::InvalidInput(msg.into())
    }
}

/// Reasons a discount code or newsletter coupon cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountRejection {
    #[error("Discount code not found")]
    NotFound,
    #[error("Discount code is not active")]
    Inactive,
    #[error("Discount code is not yet valid")]
    NotYetValid,
    #[error("Discount code has expired")]
    Expired,
    #[error("Discount code usage limit reached")]
    UsageLimitReached,
    #[error("You have already used this discount code")]
    CustomerLimitReached,
    #[error("Minimum order amount is {minimum} EUR")]
    MinimumOrderNotMet { minimum: BigDecimal },
    #[error("Discount code does not apply to any item in the cart")]
    NotApplicable,
    #[error("Discount code has already been used")]
    AlreadyUsed,
}
