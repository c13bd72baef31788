use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::{Cart, CartLine, CartOwner};
use super::catalog::{Category, Product, ProductDraft, ProductFilter, ProductPage};
use super::cms::{Banner, BannerInput, ContentBlock, ContentBlockInput, HomepageSection, SectionInput};
use super::dashboard::{CustomerSummary, DashboardData};
use super::discount::{CouponSource, Discount, DiscountInput};
use super::errors::DomainError;
use super::feed::FeedEntry;
use super::newsletter::{Subscriber, Subscription};
use super::order::{
    CheckoutDraft, Order, OrderFilter, OrderPage, OrderRef, PaymentStatus, PlacedOrder, StatusChange,
};
use super::review::{Review, ReviewInput};
use super::shipping::{PaymentMethod, ShippingMethod};
use super::wishlist::WishlistEntry;

/// 1-based page number and page size, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub limit: i64,
}

impl Paging {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Paging {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for Paging {
    fn default() -> Self {
        Paging::new(None, None)
    }
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_products(&self, filter: &ProductFilter, paging: Paging) -> Result<ProductPage, DomainError>;
    fn featured_products(&self, limit: i64) -> Result<Vec<Product>, DomainError>;
    fn new_products(&self, limit: i64) -> Result<Vec<Product>, DomainError>;
    /// Returns inactive products too; callers decide visibility.
    fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError>;
    fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    /// Active accessories of the given products in `sort_order`.
    fn accessories_of(&self, product_ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    fn categories(&self) -> Result<Vec<Category>, DomainError>;
    fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError>;
    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    fn child_categories(&self, parent_id: Uuid) -> Result<Vec<Category>, DomainError>;
    fn products_in_category(&self, category_id: Uuid, limit: i64) -> Result<Vec<Product>, DomainError>;
    fn create_product(&self, draft: ProductDraft) -> Result<Product, DomainError>;
    fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Option<Product>, DomainError>;
    fn deactivate_product(&self, id: Uuid) -> Result<bool, DomainError>;
    fn set_stock(&self, id: Uuid, quantity: i32) -> Result<Option<Product>, DomainError>;
    /// Active products with their category names, for the product feed.
    fn feed_entries(&self) -> Result<Vec<FeedEntry>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn find_cart(&self, owner: &CartOwner) -> Result<Option<Cart>, DomainError>;
    fn find_or_create_cart(&self, owner: &CartOwner) -> Result<Cart, DomainError>;
    fn cart_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
    fn line_for_product(&self, cart_id: Uuid, product_id: Uuid) -> Result<Option<CartLine>, DomainError>;
    fn line(&self, cart_id: Uuid, item_id: Uuid) -> Result<Option<CartLine>, DomainError>;
    /// Inserts the line or overwrites the quantity of the existing one.
    fn put_line(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> Result<(), DomainError>;
    fn remove_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError>;
    fn clear_cart(&self, cart_id: Uuid) -> Result<(), DomainError>;
    /// Moves the session cart's lines into the customer's cart, summing
    /// quantities, and deletes the session cart.
    fn merge_carts(&self, session_id: &str, customer_id: Uuid) -> Result<Cart, DomainError>;
}

pub trait WishlistRepository: Send + Sync + 'static {
    fn wishlist(&self, customer_id: Uuid) -> Result<Vec<WishlistEntry>, DomainError>;
    /// `true` when the product was not yet on the list.
    fn add_to_wishlist(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError>;
    fn remove_from_wishlist(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError>;
}

pub trait DiscountRepository: Send + Sync + 'static {
    /// Merchant discounts first, newsletter coupons second.
    fn find_coupon(&self, code: &str) -> Result<Option<CouponSource>, DomainError>;
    /// Non-cancelled orders of `customer_id` that carried `discount_id`.
    fn customer_uses(&self, discount_id: Uuid, customer_id: Uuid) -> Result<i64, DomainError>;
    fn discounts(&self) -> Result<Vec<Discount>, DomainError>;
    fn create_discount(&self, input: DiscountInput) -> Result<Discount, DomainError>;
    fn update_discount(&self, id: Uuid, input: DiscountInput) -> Result<Option<Discount>, DomainError>;
    fn delete_discount(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait NewsletterRepository: Send + Sync + 'static {
    fn subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError>;
    fn insert_subscriber(&self, subscription: &Subscription) -> Result<Subscriber, DomainError>;
    /// Reactivates a former subscriber with a fresh, unused coupon.
    fn reactivate_subscriber(&self, id: Uuid, subscription: &Subscription) -> Result<Subscriber, DomainError>;
    fn unsubscribe(&self, email: &str, now: DateTime<Utc>) -> Result<bool, DomainError>;
    fn subscribers(&self, paging: Paging) -> Result<(Vec<Subscriber>, i64), DomainError>;
}

pub trait ShippingRepository: Send + Sync + 'static {
    fn shipping_methods(&self) -> Result<Vec<ShippingMethod>, DomainError>;
    fn shipping_method(&self, id: Uuid) -> Result<Option<ShippingMethod>, DomainError>;
    fn payment_methods(&self) -> Result<Vec<PaymentMethod>, DomainError>;
    fn payment_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Redeems the coupon, writes the order and its snapshot lines, takes
    /// stock, drops the source cart and records `OrderPlaced`, all in one
    /// transaction.
    fn place_order(&self, draft: &CheckoutDraft, now: DateTime<Utc>) -> Result<PlacedOrder, DomainError>;
    fn find_order(&self, order: &OrderRef) -> Result<Option<Order>, DomainError>;
    fn list_orders(&self, filter: &OrderFilter, paging: Paging) -> Result<OrderPage, DomainError>;
    fn apply_status_change(&self, order_id: Uuid, change: &StatusChange) -> Result<(), DomainError>;
    /// `Ok(false)` when the order had already been paid.
    fn mark_paid(&self, order: &OrderRef, reference: Option<String>, now: DateTime<Utc>) -> Result<bool, DomainError>;
    /// Moves the payment status from `expected` to `status`; `Conflict` when
    /// the stored status is no longer `expected`.
    fn swap_payment_status(&self, order_id: Uuid, expected: PaymentStatus, status: PaymentStatus) -> Result<(), DomainError>;
}

pub trait ReviewRepository: Send + Sync + 'static {
    fn approved_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError>;
    fn approved_ratings(&self, product_id: Uuid) -> Result<Vec<i32>, DomainError>;
    fn review(&self, id: Uuid) -> Result<Option<Review>, DomainError>;
    fn has_delivered_purchase(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError>;
    fn create_review(
        &self,
        product_id: Uuid,
        customer_id: Uuid,
        input: &ReviewInput,
        verified: bool,
    ) -> Result<Review, DomainError>;
    fn update_review(&self, id: Uuid, input: &ReviewInput) -> Result<Review, DomainError>;
    fn delete_review(&self, id: Uuid) -> Result<bool, DomainError>;
    fn reviews(&self, approved: Option<bool>, paging: Paging) -> Result<(Vec<Review>, i64), DomainError>;
    fn approve_review(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait CmsRepository: Send + Sync + 'static {
    fn sections(&self) -> Result<Vec<HomepageSection>, DomainError>;
    fn create_section(&self, input: SectionInput) -> Result<HomepageSection, DomainError>;
    fn update_section(&self, id: Uuid, input: SectionInput) -> Result<Option<HomepageSection>, DomainError>;
    fn delete_section(&self, id: Uuid) -> Result<bool, DomainError>;
    fn banners(&self, placement: Option<&str>) -> Result<Vec<Banner>, DomainError>;
    fn create_banner(&self, input: BannerInput) -> Result<Banner, DomainError>;
    fn update_banner(&self, id: Uuid, input: BannerInput) -> Result<Option<Banner>, DomainError>;
    fn delete_banner(&self, id: Uuid) -> Result<bool, DomainError>;
    fn content_blocks(&self) -> Result<Vec<ContentBlock>, DomainError>;
    fn upsert_content_block(&self, key: &str, input: ContentBlockInput) -> Result<ContentBlock, DomainError>;
    fn delete_content_block(&self, key: &str) -> Result<bool, DomainError>;
}

pub trait DashboardRepository: Send + Sync + 'static {
    /// Loads every fact the dashboard needs from one consistent snapshot.
    fn snapshot(&self, now: DateTime<Utc>) -> Result<DashboardData, DomainError>;
    fn customers(&self, search: Option<&str>, paging: Paging) -> Result<(Vec<CustomerSummary>, i64), DomainError>;
}
