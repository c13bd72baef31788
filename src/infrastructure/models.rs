//! Diesel row types and their mapping to domain values.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::catalog::{Category, Product, ProductDraft};
use crate::domain::cms::{Banner, BannerInput, ContentBlock, HomepageSection, SectionInput};
use crate::domain::discount::{Discount, DiscountInput};
use crate::domain::errors::DomainError;
use crate::domain::money::CURRENCY;
use crate::domain::newsletter::Subscriber;
use crate::domain::order::{
    BillingAddress, NewOrder, NewOrderItem, Order, OrderEvent, OrderItem, OrderTotals, ShippingAddress,
    AGGREGATE_TYPE,
};
use crate::domain::review::{Review, ReviewInput};
use crate::domain::shipping::{PaymentMethod, ShippingMethod};
use crate::schema::{
    banners, cart_items, carts, categories, content_blocks, customers, discounts, homepage_sections,
    newsletter_subscribers, order_items, order_outbox, orders, payment_methods, product_reviews, products,
    shipping_methods, wishlist_items,
};

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub sku: String,
    pub slug: String,
    pub name_sk: String,
    pub name_cs: Option<String>,
    pub description_sk: Option<String>,
    pub description_cs: Option<String>,
    pub category_id: Option<Uuid>,
    pub manufacturer: Option<String>,
    pub price_without_vat: BigDecimal,
    pub price_with_vat: BigDecimal,
    pub original_price: Option<BigDecimal>,
    pub purchase_price: Option<BigDecimal>,
    pub vat_rate: BigDecimal,
    pub vat_mode: String,
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

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: r.id,
            sku: r.sku,
            slug: r.slug,
            name_sk: r.name_sk,
            name_cs: r.name_cs,
            description_sk: r.description_sk,
            description_cs: r.description_cs,
            category_id: r.category_id,
            manufacturer: r.manufacturer,
            price_without_vat: r.price_without_vat,
            price_with_vat: r.price_with_vat,
            original_price: r.original_price,
            purchase_price: r.purchase_price,
            vat_rate: r.vat_rate,
            vat_mode: r.vat_mode.parse()?,
            stock_quantity: r.stock_quantity,
            track_stock: r.track_stock,
            low_stock_threshold: r.low_stock_threshold,
            main_image_url: r.main_image_url,
            gallery_images: r.gallery_images,
            is_active: r.is_active,
            is_featured: r.is_featured,
            is_new: r.is_new,
            is_sale: r.is_sale,
            is_bazaar: r.is_bazaar,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub fn products_from(rows: Vec<ProductRow>) -> Result<Vec<Product>, DomainError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Insert values for a new product and the full changeset for a replace.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductValues {
    pub sku: String,
    pub slug: String,
    pub name_sk: String,
    pub name_cs: Option<String>,
    pub description_sk: Option<String>,
    pub description_cs: Option<String>,
    pub category_id: Option<Uuid>,
    pub manufacturer: Option<String>,
    pub price_without_vat: BigDecimal,
    pub price_with_vat: BigDecimal,
    pub original_price: Option<BigDecimal>,
    pub purchase_price: Option<BigDecimal>,
    pub vat_rate: BigDecimal,
    pub vat_mode: String,
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
    pub updated_at: DateTime<Utc>,
}

impl ProductValues {
    pub fn from_draft(draft: ProductDraft, now: DateTime<Utc>) -> Self {
        let i = draft.input;
        ProductValues {
            sku: i.sku.trim().to_string(),
            slug: i.slug.trim().to_string(),
            name_sk: i.name_sk.trim().to_string(),
            name_cs: i.name_cs,
            description_sk: i.description_sk,
            description_cs: i.description_cs,
            category_id: i.category_id,
            manufacturer: i.manufacturer,
            price_without_vat: i.price_without_vat,
            price_with_vat: draft.price_with_vat,
            original_price: i.original_price,
            purchase_price: i.purchase_price,
            vat_rate: i.vat_rate,
            vat_mode: draft.vat_mode.as_str().to_string(),
            stock_quantity: i.stock_quantity,
            track_stock: i.track_stock,
            low_stock_threshold: i.low_stock_threshold,
            main_image_url: i.main_image_url,
            gallery_images: i.gallery_images,
            is_active: i.is_active,
            is_featured: i.is_featured,
            is_new: i.is_new,
            is_sale: i.is_sale,
            is_bazaar: i.is_bazaar,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
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

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            parent_id: r.parent_id,
            slug: r.slug,
            name_sk: r.name_sk,
            name_cs: r.name_cs,
            description_sk: r.description_sk,
            image_url: r.image_url,
            sort_order: r.sort_order,
            is_active: r.is_active,
        }
    }
}

// ── Cart and wishlist ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(r: CartRow) -> Self {
        Cart {
            id: r.id,
            customer_id: r.customer_id,
            session_id: r.session_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = cart_items)]
#[diesel(belongs_to(CartRow, foreign_key = cart_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = wishlist_items)]
pub struct NewWishlistItemRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
}

// ── Discounts and newsletter ─────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = discounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiscountRow {
    pub id: Uuid,
    pub code: String,
    pub description_sk: Option<String>,
    pub discount_type: String,
    pub value: BigDecimal,
    pub min_order_value: Option<BigDecimal>,
    pub max_discount_amount: Option<BigDecimal>,
    pub max_uses: Option<i32>,
    pub max_uses_per_customer: i32,
    pub current_uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub applies_to_categories: Option<Vec<Uuid>>,
    pub applies_to_products: Option<Vec<Uuid>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DiscountRow> for Discount {
    type Error = DomainError;

    fn try_from(r: DiscountRow) -> Result<Self, Self::Error> {
        Ok(Discount {
            id: r.id,
            code: r.code,
            description_sk: r.description_sk,
            discount_type: r.discount_type.parse()?,
            value: r.value,
            min_order_value: r.min_order_value,
            max_discount_amount: r.max_discount_amount,
            max_uses: r.max_uses,
            max_uses_per_customer: r.max_uses_per_customer,
            current_uses: r.current_uses,
            valid_from: r.valid_from,
            valid_until: r.valid_until,
            applies_to_categories: r.applies_to_categories.unwrap_or_default(),
            applies_to_products: r.applies_to_products.unwrap_or_default(),
            is_active: r.is_active,
            created_at: r.created_at,
        })
    }
}

/// Admin-editable discount columns. Usage counters are never written here.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = discounts)]
#[diesel(treat_none_as_null = true)]
pub struct DiscountValues {
    pub code: String,
    pub description_sk: Option<String>,
    pub discount_type: String,
    pub value: BigDecimal,
    pub min_order_value: Option<BigDecimal>,
    pub max_discount_amount: Option<BigDecimal>,
    pub max_uses: Option<i32>,
    pub max_uses_per_customer: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub applies_to_categories: Option<Vec<Uuid>>,
    pub applies_to_products: Option<Vec<Uuid>>,
    pub is_active: bool,
}

impl DiscountValues {
    pub fn from_input(input: DiscountInput, now: DateTime<Utc>) -> Self {
        let non_empty = |ids: Vec<Uuid>| if ids.is_empty() { None } else { Some(ids) };
        DiscountValues {
            code: input.code,
            description_sk: input.description_sk,
            discount_type: input.discount_type.as_str().to_string(),
            value: input.value,
            min_order_value: input.min_order_value,
            max_discount_amount: input.max_discount_amount,
            max_uses: input.max_uses,
            max_uses_per_customer: input.max_uses_per_customer,
            valid_from: input.valid_from.unwrap_or(now),
            valid_until: input.valid_until,
            applies_to_categories: non_empty(input.applies_to_categories),
            applies_to_products: non_empty(input.applies_to_products),
            is_active: input.is_active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = newsletter_subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriberRow {
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

impl From<SubscriberRow> for Subscriber {
    fn from(r: SubscriberRow) -> Self {
        Subscriber {
            id: r.id,
            email: r.email,
            language: r.language,
            discount_code: r.discount_code,
            discount_expires_at: r.discount_expires_at,
            discount_used: r.discount_used,
            gdpr_consent: r.gdpr_consent,
            gdpr_consent_at: r.gdpr_consent_at,
            is_active: r.is_active,
            subscribed_at: r.subscribed_at,
            unsubscribed_at: r.unsubscribed_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = newsletter_subscribers)]
pub struct NewSubscriberRow {
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
}

// ── Shipping and payment ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = shipping_methods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShippingMethodRow {
    pub id: Uuid,
    pub code: String,
    pub name_sk: String,
    pub description_sk: Option<String>,
    pub price: BigDecimal,
    pub vat_rate: BigDecimal,
    pub free_shipping_threshold: Option<BigDecimal>,
    pub estimated_days: Option<i32>,
    pub tracking_url_template: Option<String>,
    pub available_countries: Vec<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl From<ShippingMethodRow> for ShippingMethod {
    fn from(r: ShippingMethodRow) -> Self {
        ShippingMethod {
            id: r.id,
            code: r.code,
            name_sk: r.name_sk,
            description_sk: r.description_sk,
            price: r.price,
            vat_rate: r.vat_rate,
            free_shipping_threshold: r.free_shipping_threshold,
            estimated_days: r.estimated_days,
            tracking_url_template: r.tracking_url_template,
            available_countries: r.available_countries,
            is_active: r.is_active,
            sort_order: r.sort_order,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = payment_methods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentMethodRow {
    pub id: Uuid,
    pub code: String,
    pub name_sk: String,
    pub description_sk: Option<String>,
    pub fee_type: String,
    pub fee_fixed: BigDecimal,
    pub fee_percentage: BigDecimal,
    pub is_active: bool,
    pub sort_order: i32,
}

impl TryFrom<PaymentMethodRow> for PaymentMethod {
    type Error = DomainError;

    fn try_from(r: PaymentMethodRow) -> Result<Self, Self::Error> {
        Ok(PaymentMethod {
            id: r.id,
            code: r.code,
            name_sk: r.name_sk,
            description_sk: r.description_sk,
            fee_type: r.fee_type.parse()?,
            fee_fixed: r.fee_fixed,
            fee_percentage: r.fee_percentage,
            is_active: r.is_active,
            sort_order: r.sort_order,
        })
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub customer_type: String,
    pub company_name: Option<String>,
    pub ico: Option<String>,
    pub dic: Option<String>,
    pub ic_dph: Option<String>,
    pub country: String,
}

impl NewCustomerRow {
    /// Customer record created on the first checkout of a customer.
    pub fn from_billing(id: Uuid, billing: &BillingAddress, is_company: bool) -> Self {
        NewCustomerRow {
            id,
            email: billing.email.clone(),
            first_name: billing.first_name.clone(),
            last_name: billing.last_name.clone(),
            phone: billing.phone.clone(),
            customer_type: if is_company { "company" } else { "individual" }.to_string(),
            company_name: billing.company_name.clone(),
            ico: billing.ico.clone(),
            dic: billing.dic.clone(),
            ic_dph: billing.ic_dph.clone(),
            country: billing.country.clone(),
        }
    }
}

/// Columns of `customers` shown in the back-office customer list.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub customer_type: String,
    pub company_name: Option<String>,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub status: String,
    pub payment_status: String,
    pub subtotal: BigDecimal,
    pub vat_total: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub payment_fee: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total: BigDecimal,
    pub currency: String,
    pub discount_id: Option<Uuid>,
    pub discount_code: Option<String>,
    pub newsletter_subscriber_id: Option<Uuid>,
    pub shipping_method_id: Option<Uuid>,
    pub shipping_method_name: Option<String>,
    pub payment_method_id: Option<Uuid>,
    pub payment_method_code: Option<String>,
    pub payment_method_name: Option<String>,
    pub billing_first_name: String,
    pub billing_last_name: String,
    pub billing_email: String,
    pub billing_phone: Option<String>,
    pub billing_street: String,
    pub billing_city: String,
    pub billing_zip: String,
    pub billing_country: String,
    pub billing_company_name: Option<String>,
    pub billing_ico: Option<String>,
    pub billing_dic: Option<String>,
    pub billing_ic_dph: Option<String>,
    pub shipping_first_name: String,
    pub shipping_last_name: String,
    pub shipping_street: String,
    pub shipping_city: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub shipping_phone: Option<String>,
    pub customer_note: Option<String>,
    pub tracking_number: Option<String>,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, items: Vec<OrderItem>) -> Result<Order, DomainError> {
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            status: self.status.parse()?,
            payment_status: self.payment_status.parse()?,
            totals: OrderTotals {
                subtotal: self.subtotal,
                vat_total: self.vat_total,
                shipping_cost: self.shipping_cost,
                payment_fee: self.payment_fee,
                discount_amount: self.discount_amount,
                total: self.total,
            },
            currency: self.currency,
            discount_id: self.discount_id,
            discount_code: self.discount_code,
            shipping_method_id: self.shipping_method_id,
            shipping_method_name: self.shipping_method_name,
            payment_method_id: self.payment_method_id,
            payment_method_code: self.payment_method_code,
            payment_method_name: self.payment_method_name,
            billing: BillingAddress {
                first_name: self.billing_first_name,
                last_name: self.billing_last_name,
                email: self.billing_email,
                phone: self.billing_phone,
                street: self.billing_street,
                city: self.billing_city,
                zip: self.billing_zip,
                country: self.billing_country,
                company_name: self.billing_company_name,
                ico: self.billing_ico,
                dic: self.billing_dic,
                ic_dph: self.billing_ic_dph,
            },
            shipping: ShippingAddress {
                first_name: self.shipping_first_name,
                last_name: self.shipping_last_name,
                street: self.shipping_street,
                city: self.shipping_city,
                zip: self.shipping_zip,
                country: self.shipping_country,
                phone: self.shipping_phone,
            },
            customer_note: self.customer_note,
            tracking_number: self.tracking_number,
            payment_reference: self.payment_reference,
            paid_at: self.paid_at,
            shipped_at: self.shipped_at,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub status: String,
    pub payment_status: String,
    pub subtotal: BigDecimal,
    pub vat_total: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub payment_fee: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total: BigDecimal,
    pub currency: String,
    pub discount_id: Option<Uuid>,
    pub discount_code: Option<String>,
    pub newsletter_subscriber_id: Option<Uuid>,
    pub shipping_method_id: Option<Uuid>,
    pub shipping_method_name: Option<String>,
    pub payment_method_id: Option<Uuid>,
    pub payment_method_code: Option<String>,
    pub payment_method_name: Option<String>,
    pub billing_first_name: String,
    pub billing_last_name: String,
    pub billing_email: String,
    pub billing_phone: Option<String>,
    pub billing_street: String,
    pub billing_city: String,
    pub billing_zip: String,
    pub billing_country: String,
    pub billing_company_name: Option<String>,
    pub billing_ico: Option<String>,
    pub billing_dic: Option<String>,
    pub billing_ic_dph: Option<String>,
    pub shipping_first_name: String,
    pub shipping_last_name: String,
    pub shipping_street: String,
    pub shipping_city: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub shipping_phone: Option<String>,
    pub customer_note: Option<String>,
}

impl NewOrderRow {
    pub fn new(order: &NewOrder, order_number: &str) -> Self {
        let (b, s, t) = (&order.billing, &order.shipping, &order.totals);
        NewOrderRow {
            id: order.id,
            order_number: order_number.to_string(),
            customer_id: Some(order.customer_id),
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            subtotal: t.subtotal.clone(),
            vat_total: t.vat_total.clone(),
            shipping_cost: t.shipping_cost.clone(),
            payment_fee: t.payment_fee.clone(),
            discount_amount: t.discount_amount.clone(),
            total: t.total.clone(),
            currency: CURRENCY.to_string(),
            discount_id: order.discount_id(),
            discount_code: order.discount.as_ref().map(|d| d.code.clone()),
            newsletter_subscriber_id: order.newsletter_subscriber_id(),
            shipping_method_id: Some(order.shipping_method_id),
            shipping_method_name: Some(order.shipping_method_name.clone()),
            payment_method_id: Some(order.payment_method_id),
            payment_method_code: Some(order.payment_method_code.clone()),
            payment_method_name: Some(order.payment_method_name.clone()),
            billing_first_name: b.first_name.clone(),
            billing_last_name: b.last_name.clone(),
            billing_email: b.email.clone(),
            billing_phone: b.phone.clone(),
            billing_street: b.street.clone(),
            billing_city: b.city.clone(),
            billing_zip: b.zip.clone(),
            billing_country: b.country.clone(),
            billing_company_name: b.company_name.clone(),
            billing_ico: b.ico.clone(),
            billing_dic: b.dic.clone(),
            billing_ic_dph: b.ic_dph.clone(),
            shipping_first_name: s.first_name.clone(),
            shipping_last_name: s.last_name.clone(),
            shipping_street: s.street.clone(),
            shipping_city: s.city.clone(),
            shipping_zip: s.zip.clone(),
            shipping_country: s.country.clone(),
            shipping_phone: s.phone.clone(),
            customer_note: order.note.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_sku: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub price_without_vat: BigDecimal,
    pub price_with_vat: BigDecimal,
    pub vat_rate: BigDecimal,
    pub vat_mode: String,
    pub line_total: BigDecimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = DomainError;

    fn try_from(r: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(OrderItem {
            id: r.id,
            product_id: r.product_id,
            product_sku: r.product_sku,
            product_name: r.product_name,
            product_image_url: r.product_image_url,
            quantity: r.quantity,
            price_without_vat: r.price_without_vat,
            price_with_vat: r.price_with_vat,
            vat_rate: r.vat_rate,
            vat_mode: r.vat_mode.parse()?,
            line_total: r.line_total,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_sku: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub price_without_vat: BigDecimal,
    pub price_with_vat: BigDecimal,
    pub vat_rate: BigDecimal,
    pub vat_mode: String,
    pub line_total: BigDecimal,
    pub purchase_price: Option<BigDecimal>,
}

impl From<&NewOrderItem> for NewOrderItemRow {
    fn from(i: &NewOrderItem) -> Self {
        NewOrderItemRow {
            id: i.id,
            order_id: i.order_id,
            product_id: Some(i.product_id),
            product_sku: i.product_sku.clone(),
            product_name: i.product_name.clone(),
            product_image_url: i.product_image_url.clone(),
            quantity: i.quantity,
            price_without_vat: i.price_without_vat.clone(),
            price_with_vat: i.price_with_vat.clone(),
            vat_rate: i.vat_rate.clone(),
            vat_mode: i.vat_mode.as_str().to_string(),
            line_total: i.line_total.clone(),
            purchase_price: i.purchase_price.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

impl From<&OrderEvent> for NewOutboxEventRow {
    fn from(event: &OrderEvent) -> Self {
        NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: AGGREGATE_TYPE.to_string(),
            aggregate_id: event.aggregate_id().to_string(),
            event_type: event.event_type().to_string(),
            payload: event.payload(),
        }
    }
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = product_reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub is_verified_purchase: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Review {
            id: r.id,
            product_id: r.product_id,
            customer_id: r.customer_id,
            rating: r.rating,
            title: r.title,
            content: r.content,
            is_verified_purchase: r.is_verified_purchase,
            is_approved: r.is_approved,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_reviews)]
pub struct NewReviewRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub is_verified_purchase: bool,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = product_reviews)]
#[diesel(treat_none_as_null = true)]
pub struct ReviewChanges {
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl ReviewChanges {
    pub fn new(input: &ReviewInput, now: DateTime<Utc>) -> Self {
        ReviewChanges {
            rating: input.rating,
            title: input.title.clone(),
            content: input.content.clone(),
            updated_at: now,
        }
    }
}

// ── CMS ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = homepage_sections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SectionRow {
    pub id: Uuid,
    pub section_key: String,
    pub section_type: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub description_sk: Option<String>,
    pub badge_text: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub content: Value,
    pub is_active: bool,
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<SectionRow> for HomepageSection {
    fn from(r: SectionRow) -> Self {
        HomepageSection {
            id: r.id,
            section_key: r.section_key,
            section_type: r.section_type,
            title_sk: r.title_sk,
            subtitle_sk: r.subtitle_sk,
            description_sk: r.description_sk,
            badge_text: r.badge_text,
            image_url: r.image_url,
            link_url: r.link_url,
            link_text: r.link_text,
            content: r.content,
            is_active: r.is_active,
            sort_order: r.sort_order,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = homepage_sections)]
#[diesel(treat_none_as_null = true)]
pub struct SectionValues {
    pub section_key: String,
    pub section_type: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub description_sk: Option<String>,
    pub badge_text: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub content: Value,
    pub is_active: bool,
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
}

impl SectionValues {
    pub fn new(i: SectionInput, now: DateTime<Utc>) -> Self {
        SectionValues {
            section_key: i.section_key,
            section_type: i.section_type,
            title_sk: i.title_sk,
            subtitle_sk: i.subtitle_sk,
            description_sk: i.description_sk,
            badge_text: i.badge_text,
            image_url: i.image_url,
            link_url: i.link_url,
            link_text: i.link_text,
            content: i.content,
            is_active: i.is_active,
            sort_order: i.sort_order,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = banners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BannerRow {
    pub id: Uuid,
    pub name: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub placement: String,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort_order: i32,
}

impl From<BannerRow> for Banner {
    fn from(r: BannerRow) -> Self {
        Banner {
            id: r.id,
            name: r.name,
            title_sk: r.title_sk,
            subtitle_sk: r.subtitle_sk,
            image_url: r.image_url,
            link_url: r.link_url,
            placement: r.placement,
            is_active: r.is_active,
            start_date: r.start_date,
            end_date: r.end_date,
            sort_order: r.sort_order,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = banners)]
#[diesel(treat_none_as_null = true)]
pub struct BannerValues {
    pub name: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub placement: String,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort_order: i32,
}

impl From<BannerInput> for BannerValues {
    fn from(i: BannerInput) -> Self {
        BannerValues {
            name: i.name,
            title_sk: i.title_sk,
            subtitle_sk: i.subtitle_sk,
            image_url: i.image_url,
            link_url: i.link_url,
            placement: i.placement,
            is_active: i.is_active,
            start_date: i.start_date,
            end_date: i.end_date,
            sort_order: i.sort_order,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = content_blocks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContentBlockRow {
    pub id: Uuid,
    pub block_key: String,
    pub block_type: String,
    pub title_sk: Option<String>,
    pub content: Value,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentBlockRow> for ContentBlock {
    fn from(r: ContentBlockRow) -> Self {
        ContentBlock {
            id: r.id,
            block_key: r.block_key,
            block_type: r.block_type,
            title_sk: r.title_sk,
            content: r.content,
            is_active: r.is_active,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_blocks)]
pub struct NewContentBlockRow {
    pub id: Uuid,
    pub block_key: String,
    pub block_type: String,
    pub title_sk: Option<String>,
    pub content: Value,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}
