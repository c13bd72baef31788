use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::Product;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WishlistEntry {
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct WishlistToggle {
    pub in_wishlist: bool,
}
