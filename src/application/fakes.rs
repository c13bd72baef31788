//! In-memory implementation of every repository port for service tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cart::{Cart, CartLine, CartOwner};
use crate::domain::catalog::{Category, Product, ProductDraft, ProductFilter, ProductPage, ProductSort};
use crate::domain::cms::{Banner, BannerInput, ContentBlock, ContentBlockInput, HomepageSection, SectionInput};
use crate::domain::dashboard::{
    CustomerSummary, DashboardData, ItemFact, OrderFact, ReviewFact, StockFact, SubscriberFact,
};
use crate::domain::discount::{normalize_code, CouponSource, Discount, DiscountInput, Redemption};
use crate::domain::errors::{DiscountRejection, DomainError};
use crate::domain::feed::FeedEntry;
use crate::domain::money::{sum, CURRENCY};
use crate::domain::newsletter::{Subscriber, Subscription};
use crate::domain::order::{
    format_order_number, CheckoutDraft, NewOrder, Order, OrderEvent, OrderFilter, OrderItem, OrderPage,
    OrderRef, OrderStatus, PaymentStatus, PlacedOrder, StatusChange,
};
use crate::domain::ports::*;
use crate::domain::review::{Review, ReviewInput};
use crate::domain::shipping::{PaymentMethod, ShippingMethod};
use crate::domain::wishlist::WishlistEntry;

struct StoredLine {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

#[derive(Default)]
struct State {
    products: Vec<Product>,
    categories: Vec<Category>,
    accessories: Vec<(Uuid, Uuid, i32)>,
    carts: Vec<Cart>,
    lines: Vec<StoredLine>,
    wishlist: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    discounts: Vec<Discount>,
    extra_uses: HashMap<(Uuid, Uuid), i64>,
    subscribers: Vec<Subscriber>,
    shipping: Vec<ShippingMethod>,
    payments: Vec<PaymentMethod>,
    orders: Vec<Order>,
    order_seq: i64,
    events: Vec<OrderEvent>,
    reviews: Vec<Review>,
    sections: Vec<HomepageSection>,
    banners: Vec<Banner>,
    blocks: Vec<ContentBlock>,
}

impl State {
    fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn cart_for(&self, owner: &CartOwner) -> Option<&Cart> {
        self.carts.iter().find(|c| match owner {
            CartOwner::Customer(id) => c.customer_id == Some(*id),
            CartOwner::Session(s) => c.customer_id.is_none() && c.session_id.as_deref() == Some(s),
        })
    }

    fn lines_of(&self, cart_id: Uuid) -> Vec<CartLine> {
        self.lines
            .iter()
            .filter(|l| l.cart_id == cart_id)
            .filter_map(|l| {
                self.product(l.product_id).map(|p| CartLine {
                    id: l.id,
                    quantity: l.quantity,
                    product: p.clone(),
                })
            })
            .collect()
    }

    fn new_cart(&mut self, customer_id: Option<Uuid>, session_id: Option<String>) -> Cart {
        let now = Utc::now();
        let cart = Cart {
            id: Uuid::new_v4(),
            customer_id,
            session_id,
            created_at: now,
            updated_at: now,
        };
        self.carts.push(cart.clone());
        cart
    }

    fn delete_cart(&mut self, cart_id: Uuid) {
        self.carts.retain(|c| c.id != cart_id);
        self.lines.retain(|l| l.cart_id != cart_id);
    }

    fn coupon(&self, code: &str) -> Option<CouponSource> {
        if let Some(d) = self.discounts.iter().find(|d| d.code == code) {
            return Some(CouponSource::Merchant(d.clone()));
        }
        self.subscribers
            .iter()
            .find(|s| s.discount_code.as_deref() == Some(code))
            .and_then(Subscriber::coupon)
            .map(CouponSource::Newsletter)
    }

    fn customer_uses(&self, discount_id: Uuid, customer_id: Uuid) -> i64 {
        let from_orders = self
            .orders
            .iter()
            .filter(|o| o.discount_id == Some(discount_id) && o.customer_id == Some(customer_id))
            .filter(|o| o.status != OrderStatus::Cancelled)
            .count() as i64;
        from_orders + self.extra_uses.get(&(discount_id, customer_id)).copied().unwrap_or(0)
    }

    fn find_order_mut(&mut self, order: &OrderRef) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| match order {
            OrderRef::Id(id) => o.id == *id,
            OrderRef::Number(n) => o.order_number == *n,
        })
    }
}

fn page<T: Clone>(items: &[T], paging: Paging) -> Vec<T> {
    items
        .iter()
        .skip(paging.offset() as usize)
        .take(paging.limit as usize)
        .cloned()
        .collect()
}

fn product_from(id: Uuid, draft: ProductDraft, created_at: DateTime<Utc>) -> Product {
    let input = draft.input;
    Product {
        id,
        sku: input.sku,
        slug: input.slug,
        name_sk: input.name_sk,
        name_cs: input.name_cs,
        description_sk: input.description_sk,
        description_cs: input.description_cs,
        category_id: input.category_id,
        manufacturer: input.manufacturer,
        price_without_vat: input.price_without_vat,
        price_with_vat: draft.price_with_vat,
        original_price: input.original_price,
        purchase_price: input.purchase_price,
        vat_rate: input.vat_rate,
        vat_mode: draft.vat_mode,
        stock_quantity: input.stock_quantity,
        track_stock: input.track_stock,
        low_stock_threshold: input.low_stock_threshold,
        main_image_url: input.main_image_url,
        gallery_images: input.gallery_images,
        is_active: input.is_active,
        is_featured: input.is_featured,
        is_new: input.is_new,
        is_sale: input.is_sale,
        is_bazaar: input.is_bazaar,
        created_at,
        updated_at: Utc::now(),
    }
}

fn discount_from(id: Uuid, input: DiscountInput, current_uses: i32, now: DateTime<Utc>) -> Discount {
    Discount {
        id,
        code: input.code,
        description_sk: input.description_sk,
        discount_type: input.discount_type,
        value: input.value,
        min_order_value: input.min_order_value,
        max_discount_amount: input.max_discount_amount,
        max_uses: input.max_uses,
        max_uses_per_customer: input.max_uses_per_customer,
        current_uses,
        valid_from: input.valid_from.unwrap_or(now),
        valid_until: input.valid_until,
        applies_to_categories: input.applies_to_categories,
        applies_to_products: input.applies_to_products,
        is_active: input.is_active,
        created_at: now,
    }
}

fn order_from(new: NewOrder, order_number: String, now: DateTime<Utc>) -> Order {
    let discount_id = new.discount_id();
    Order {
        id: new.id,
        order_number,
        customer_id: Some(new.customer_id),
        status: new.status,
        payment_status: new.payment_status,
        totals: new.totals,
        currency: CURRENCY.into(),
        discount_id,
        discount_code: new.discount.map(|d| d.code),
        shipping_method_id: Some(new.shipping_method_id),
        shipping_method_name: Some(new.shipping_method_name),
        payment_method_id: Some(new.payment_method_id),
        payment_method_code: Some(new.payment_method_code),
        payment_method_name: Some(new.payment_method_name),
        billing: new.billing,
        shipping: new.shipping,
        customer_note: new.note,
        tracking_number: None,
        payment_reference: None,
        paid_at: None,
        shipped_at: None,
        delivered_at: None,
        created_at: now,
        updated_at: now,
        items: new
            .items
            .into_iter()
            .map(|i| OrderItem {
                id: i.id,
                product_id: Some(i.product_id),
                product_sku: i.product_sku,
                product_name: i.product_name,
                product_image_url: i.product_image_url,
                quantity: i.quantity,
                price_without_vat: i.price_without_vat,
                price_with_vat: i.price_with_vat,
                vat_rate: i.vat_rate,
                vat_mode: i.vat_mode,
                line_total: i.line_total,
            })
            .collect(),
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store lock poisoned")
    }

    pub fn add_product(&self, product: Product) {
        self.lock().products.push(product);
    }

    pub fn product(&self, id: Uuid) -> Product {
        self.lock().product(id).cloned().expect("product exists")
    }

    pub fn add_accessory(&self, product_id: Uuid, accessory_id: Uuid) {
        let mut s = self.lock();
        let sort_order = s.accessories.iter().filter(|(p, _, _)| *p == product_id).count() as i32;
        s.accessories.push((product_id, accessory_id, sort_order));
    }

    /// Adds an active newsletter subscriber holding `code`.
    pub fn add_subscriber(&self, code: &str, used: bool, expires_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.lock().subscribers.push(Subscriber {
            id,
            email: format!("{}@example.sk", id.simple()),
            language: "sk".into(),
            discount_code: Some(code.into()),
            discount_expires_at: Some(expires_at),
            discount_used: used,
            gdpr_consent: true,
            gdpr_consent_at: Some(now),
            is_active: true,
            subscribed_at: now,
            unsubscribed_at: None,
        });
        id
    }

    /// Counts an earlier order by `customer_id` that carried the discount.
    pub fn record_discount_use(&self, discount_id: Uuid, customer_id: Uuid) {
        *self
            .lock()
            .extra_uses
            .entry((discount_id, customer_id))
            .or_default() += 1;
    }

    pub fn add_shipping_method(&self, method: ShippingMethod) {
        self.lock().shipping.push(method);
    }

    pub fn add_payment_method(&self, method: PaymentMethod) {
        self.lock().payments.push(method);
    }

    pub fn deactivate_shipping_methods(&self) {
        for m in self.lock().shipping.iter_mut() {
            m.is_active = false;
        }
    }

    pub fn add_order(&self, order: Order) {
        self.lock().orders.push(order);
    }

    pub fn order(&self, id: Uuid) -> Order {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .expect("order exists")
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    /// Outbox event types in insertion order.
    pub fn events(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .map(|e| e.event_type().to_string())
            .collect()
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

impl CatalogRepository for InMemoryStore {
    fn list_products(&self, filter: &ProductFilter, paging: Paging) -> Result<ProductPage, DomainError> {
        let s = self.lock();
        let needle = filter.search.as_ref().map(|q| q.to_lowercase());
        let flag = |want: Option<bool>, have: bool| want.map_or(true, |w| w == have);
        let mut products: Vec<Product> = s
            .products
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| filter.category_id.map_or(true, |c| p.category_id == Some(c)))
            .filter(|p| flag(filter.is_bazaar, p.is_bazaar))
            .filter(|p| flag(filter.is_new, p.is_new))
            .filter(|p| flag(filter.is_sale, p.is_sale))
            .filter(|p| flag(filter.is_featured, p.is_featured))
            .filter(|p| {
                needle.as_ref().map_or(true, |q| {
                    p.name_sk.to_lowercase().contains(q)
                        || p.sku.to_lowercase().contains(q)
                        || p
                            .description_sk
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(q))
                })
            })
            .cloned()
            .collect();
        match filter.sort {
            ProductSort::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProductSort::PriceAsc => products.sort_by(|a, b| a.price_with_vat.cmp(&b.price_with_vat)),
            ProductSort::PriceDesc => products.sort_by(|a, b| b.price_with_vat.cmp(&a.price_with_vat)),
            ProductSort::Name => products.sort_by(|a, b| a.name_sk.cmp(&b.name_sk)),
        }
        Ok(ProductPage {
            total: products.len() as i64,
            products: page(&products, paging),
        })
    }

    fn featured_products(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        let s = self.lock();
        Ok(s.products
            .iter()
            .filter(|p| p.is_active && p.is_featured)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn new_products(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        let s = self.lock();
        Ok(s.products
            .iter()
            .filter(|p| p.is_active && p.is_new)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock().product(id).cloned())
    }

    fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.lock().products.iter().find(|p| p.slug == slug).cloned())
    }

    fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let s = self.lock();
        Ok(s.products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    fn accessories_of(&self, product_ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let s = self.lock();
        let mut links: Vec<&(Uuid, Uuid, i32)> = s
            .accessories
            .iter()
            .filter(|(p, _, _)| product_ids.contains(p))
            .collect();
        links.sort_by_key(|(_, _, order)| *order);
        Ok(links
            .into_iter()
            .filter_map(|(_, a, _)| s.product(*a))
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    fn categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.lock().categories.clone())
    }

    fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self.lock().categories.iter().find(|c| c.slug == slug).cloned())
    }

    fn child_categories(&self, parent_id: Uuid) -> Result<Vec<Category>, DomainError> {
        let s = self.lock();
        Ok(s.categories
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    fn products_in_category(&self, category_id: Uuid, limit: i64) -> Result<Vec<Product>, DomainError> {
        let s = self.lock();
        Ok(s.products
            .iter()
            .filter(|p| p.is_active && p.category_id == Some(category_id))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn create_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let mut s = self.lock();
        if s.products.iter().any(|p| p.sku == draft.input.sku || p.slug == draft.input.slug) {
            return Err(DomainError::Conflict("Product with this SKU or slug already exists".into()));
        }
        let product = product_from(Uuid::new_v4(), draft, Utc::now());
        s.products.push(product.clone());
        Ok(product)
    }

    fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Option<Product>, DomainError> {
        let mut s = self.lock();
        let Some(existing) = s.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        *existing = product_from(id, draft, existing.created_at);
        Ok(Some(existing.clone()))
    }

    fn deactivate_product(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        match s.products.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_stock(&self, id: Uuid, quantity: i32) -> Result<Option<Product>, DomainError> {
        let mut s = self.lock();
        Ok(s.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.stock_quantity = quantity;
            p.clone()
        }))
    }

    fn feed_entries(&self) -> Result<Vec<FeedEntry>, DomainError> {
        let s = self.lock();
        Ok(s.products
            .iter()
            .filter(|p| p.is_active)
            .map(|p| FeedEntry {
                product: p.clone(),
                category_name: p
                    .category_id
                    .and_then(|c| s.categories.iter().find(|cat| cat.id == c))
                    .map(|c| c.name_sk.clone()),
            })
            .collect())
    }
}

// ── Cart and wishlist ────────────────────────────────────────────────────────

impl CartRepository for InMemoryStore {
    fn find_cart(&self, owner: &CartOwner) -> Result<Option<Cart>, DomainError> {
        Ok(self.lock().cart_for(owner).cloned())
    }

    fn find_or_create_cart(&self, owner: &CartOwner) -> Result<Cart, DomainError> {
        let mut s = self.lock();
        if let Some(cart) = s.cart_for(owner) {
            return Ok(cart.clone());
        }
        Ok(match owner {
            CartOwner::Customer(id) => s.new_cart(Some(*id), None),
            CartOwner::Session(session) => s.new_cart(None, Some(session.clone())),
        })
    }

    fn cart_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        Ok(self.lock().lines_of(cart_id))
    }

    fn line_for_product(&self, cart_id: Uuid, product_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        Ok(self
            .lock()
            .lines_of(cart_id)
            .into_iter()
            .find(|l| l.product.id == product_id))
    }

    fn line(&self, cart_id: Uuid, item_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        Ok(self.lock().lines_of(cart_id).into_iter().find(|l| l.id == item_id))
    }

    fn put_line(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut s = self.lock();
        match s
            .lines
            .iter_mut()
            .find(|l| l.cart_id == cart_id && l.product_id == product_id)
        {
            Some(line) => line.quantity = quantity,
            None => s.lines.push(StoredLine {
                id: Uuid::new_v4(),
                cart_id,
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    fn remove_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let before = s.lines.len();
        s.lines.retain(|l| !(l.cart_id == cart_id && l.id == item_id));
        Ok(s.lines.len() != before)
    }

    fn clear_cart(&self, cart_id: Uuid) -> Result<(), DomainError> {
        self.lock().lines.retain(|l| l.cart_id != cart_id);
        Ok(())
    }

    fn merge_carts(&self, session_id: &str, customer_id: Uuid) -> Result<Cart, DomainError> {
        let mut s = self.lock();
        let target = match s.cart_for(&CartOwner::Customer(customer_id)) {
            Some(cart) => cart.clone(),
            None => s.new_cart(Some(customer_id), None),
        };
        let Some(source) = s.cart_for(&CartOwner::Session(session_id.to_string())).map(|c| c.id) else {
            return Ok(target);
        };
        let moved: Vec<(Uuid, i32)> = s
            .lines
            .iter()
            .filter(|l| l.cart_id == source)
            .map(|l| (l.product_id, l.quantity))
            .collect();
        for (product_id, quantity) in moved {
            match s
                .lines
                .iter_mut()
                .find(|l| l.cart_id == target.id && l.product_id == product_id)
            {
                Some(line) => line.quantity += quantity,
                None => s.lines.push(StoredLine {
                    id: Uuid::new_v4(),
                    cart_id: target.id,
                    product_id,
                    quantity,
                }),
            }
        }
        s.delete_cart(source);
        Ok(target)
    }
}

impl WishlistRepository for InMemoryStore {
    fn wishlist(&self, customer_id: Uuid) -> Result<Vec<WishlistEntry>, DomainError> {
        let s = self.lock();
        Ok(s.wishlist
            .iter()
            .filter(|(c, _, _)| *c == customer_id)
            .filter_map(|(_, p, added_at)| {
                s.product(*p).map(|product| WishlistEntry {
                    product: product.clone(),
                    added_at: *added_at,
                })
            })
            .collect())
    }

    fn add_to_wishlist(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        if s.wishlist.iter().any(|(c, p, _)| *c == customer_id && *p == product_id) {
            return Ok(false);
        }
        s.wishlist.push((customer_id, product_id, Utc::now()));
        Ok(true)
    }

    fn remove_from_wishlist(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let before = s.wishlist.len();
        s.wishlist.retain(|(c, p, _)| !(*c == customer_id && *p == product_id));
        Ok(s.wishlist.len() != before)
    }
}

// ── Discounts and newsletter ─────────────────────────────────────────────────

impl DiscountRepository for InMemoryStore {
    fn find_coupon(&self, code: &str) -> Result<Option<CouponSource>, DomainError> {
        Ok(self.lock().coupon(code))
    }

    fn customer_uses(&self, discount_id: Uuid, customer_id: Uuid) -> Result<i64, DomainError> {
        Ok(self.lock().customer_uses(discount_id, customer_id))
    }

    fn discounts(&self) -> Result<Vec<Discount>, DomainError> {
        Ok(self.lock().discounts.clone())
    }

    fn create_discount(&self, input: DiscountInput) -> Result<Discount, DomainError> {
        let mut s = self.lock();
        if s.discounts.iter().any(|d| d.code == input.code) {
            return Err(DomainError::Conflict("Discount code already exists".into()));
        }
        let discount = discount_from(Uuid::new_v4(), input, 0, Utc::now());
        s.discounts.push(discount.clone());
        Ok(discount)
    }

    fn update_discount(&self, id: Uuid, input: DiscountInput) -> Result<Option<Discount>, DomainError> {
        let mut s = self.lock();
        let Some(existing) = s.discounts.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        *existing = discount_from(id, input, existing.current_uses, existing.created_at);
        Ok(Some(existing.clone()))
    }

    fn delete_discount(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let before = s.discounts.len();
        s.discounts.retain(|d| d.id != id);
        Ok(s.discounts.len() != before)
    }
}

impl NewsletterRepository for InMemoryStore {
    fn subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError> {
        Ok(self.lock().subscribers.iter().find(|s| s.email == email).cloned())
    }

    fn insert_subscriber(&self, subscription: &Subscription) -> Result<Subscriber, DomainError> {
        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email: subscription.email.clone(),
            language: subscription.language.clone(),
            discount_code: Some(subscription.discount_code.clone()),
            discount_expires_at: Some(subscription.expires_at),
            discount_used: false,
            gdpr_consent: true,
            gdpr_consent_at: Some(subscription.consented_at),
            is_active: true,
            subscribed_at: subscription.consented_at,
            unsubscribed_at: None,
        };
        self.lock().subscribers.push(subscriber.clone());
        Ok(subscriber)
    }

    fn reactivate_subscriber(&self, id: Uuid, subscription: &Subscription) -> Result<Subscriber, DomainError> {
        let mut s = self.lock();
        let subscriber = s
            .subscribers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DomainError::NotFound("Subscriber"))?;
        subscriber.language = subscription.language.clone();
        subscriber.discount_code = Some(subscription.discount_code.clone());
        subscriber.discount_expires_at = Some(subscription.expires_at);
        subscriber.discount_used = false;
        subscriber.gdpr_consent = true;
        subscriber.gdpr_consent_at = Some(subscription.consented_at);
        subscriber.is_active = true;
        subscriber.subscribed_at = subscription.consented_at;
        subscriber.unsubscribed_at = None;
        Ok(subscriber.clone())
    }

    fn unsubscribe(&self, email: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut s = self.lock();
        match s.subscribers.iter_mut().find(|s| s.email == email) {
            Some(subscriber) => {
                subscriber.is_active = false;
                subscriber.unsubscribed_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn subscribers(&self, paging: Paging) -> Result<(Vec<Subscriber>, i64), DomainError> {
        let s = self.lock();
        Ok((page(&s.subscribers, paging), s.subscribers.len() as i64))
    }
}

// ── Shipping and orders ──────────────────────────────────────────────────────

impl ShippingRepository for InMemoryStore {
    fn shipping_methods(&self) -> Result<Vec<ShippingMethod>, DomainError> {
        Ok(self.lock().shipping.clone())
    }

    fn shipping_method(&self, id: Uuid) -> Result<Option<ShippingMethod>, DomainError> {
        Ok(self.lock().shipping.iter().find(|m| m.id == id).cloned())
    }

    fn payment_methods(&self) -> Result<Vec<PaymentMethod>, DomainError> {
        Ok(self.lock().payments.clone())
    }

    fn payment_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, DomainError> {
        Ok(self.lock().payments.iter().find(|m| m.id == id).cloned())
    }
}

impl OrderRepository for InMemoryStore {
    /// Checks everything before touching state, so a failure leaves the
    /// store as it was.
    fn place_order(&self, draft: &CheckoutDraft, now: DateTime<Utc>) -> Result<PlacedOrder, DomainError> {
        let mut s = self.lock();
        let discount = match &draft.checkout.discount_code {
            Some(code) => {
                let source = s
                    .coupon(&normalize_code(code))
                    .ok_or(DiscountRejection::NotFound)?;
                let uses = match (&source, draft.customer_id) {
                    (CouponSource::Merchant(d), Some(customer)) => Some(s.customer_uses(d.id, customer)),
                    _ => None,
                };
                Some(source.evaluate(&draft.discount_lines(), uses, now)?)
            }
            None => None,
        };
        for line in draft.lines.iter().filter(|l| l.product.track_stock) {
            let available = s.product(line.product.id).map_or(0, |p| p.stock_quantity);
            if available < line.quantity {
                return Err(DomainError::invalid(format!(
                    "Insufficient stock for {}",
                    line.product.name_sk
                )));
            }
        }

        match discount.as_ref().map(|d| d.redemption) {
            Some(Redemption::Merchant { discount_id }) => {
                if let Some(d) = s.discounts.iter_mut().find(|d| d.id == discount_id) {
                    d.current_uses += 1;
                }
            }
            Some(Redemption::Newsletter { subscriber_id }) => {
                if let Some(sub) = s.subscribers.iter_mut().find(|sub| sub.id == subscriber_id) {
                    sub.discount_used = true;
                }
            }
            None => {}
        }
        s.order_seq += 1;
        let order_number = format_order_number(s.order_seq);
        let new_order = draft.finalize(draft.customer_id.unwrap_or_else(Uuid::new_v4), discount);
        for item in new_order.items.iter().filter(|i| i.track_stock) {
            if let Some(p) = s.products.iter_mut().find(|p| p.id == item.product_id) {
                p.stock_quantity -= item.quantity;
            }
        }
        if let Some(cart_id) = draft.cart_id {
            s.delete_cart(cart_id);
        }
        s.events.push(OrderEvent::placed(&new_order, &order_number));
        let placed = PlacedOrder {
            order_id: new_order.id,
            order_number: order_number.clone(),
            total: new_order.totals.total.clone(),
            payment_method: new_order.payment_method_code.clone(),
            bank_details: None,
        };
        s.orders.push(order_from(new_order, order_number, now));
        Ok(placed)
    }

    fn find_order(&self, order: &OrderRef) -> Result<Option<Order>, DomainError> {
        Ok(self.lock().find_order_mut(order).map(|o| o.clone()))
    }

    fn list_orders(&self, filter: &OrderFilter, paging: Paging) -> Result<OrderPage, DomainError> {
        let s = self.lock();
        let mut orders: Vec<Order> = s
            .orders
            .iter()
            .filter(|o| filter.customer_id.map_or(true, |c| o.customer_id == Some(c)))
            .filter(|o| filter.status.map_or(true, |st| o.status == st))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(OrderPage {
            total: orders.len() as i64,
            orders: page(&orders, paging),
        })
    }

    fn apply_status_change(&self, order_id: Uuid, change: &StatusChange) -> Result<(), DomainError> {
        let mut s = self.lock();
        let order = s
            .find_order_mut(&OrderRef::Id(order_id))
            .ok_or(DomainError::NotFound("Order"))?;
        order.status = change.to;
        order.tracking_number = change.tracking_number.clone();
        order.shipped_at = change.shipped_at;
        order.delivered_at = change.delivered_at;
        s.events.push(OrderEvent::StatusChanged {
            order_id,
            from: change.from,
            to: change.to,
            tracking_number: change.tracking_number.clone(),
        });
        Ok(())
    }

    fn mark_paid(&self, order: &OrderRef, reference: Option<String>, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let order = s.find_order_mut(order).ok_or(DomainError::NotFound("Order"))?;
        if !order.payment_status.accepts_payment()? {
            return Ok(false);
        }
        order.payment_status = PaymentStatus::Paid;
        order.payment_reference = reference.clone();
        order.paid_at = Some(now);
        let order_id = order.id;
        s.events.push(OrderEvent::PaymentReceived {
            order_id,
            reference,
            payment_status: PaymentStatus::Paid,
        });
        Ok(true)
    }

    fn swap_payment_status(&self, order_id: Uuid, expected: PaymentStatus, status: PaymentStatus) -> Result<(), DomainError> {
        let mut s = self.lock();
        let order = s
            .find_order_mut(&OrderRef::Id(order_id))
            .ok_or(DomainError::NotFound("Order"))?;
        if order.payment_status != expected {
            return Err(DomainError::Conflict("Payment status changed concurrently".into()));
        }
        order.payment_status = status;
        Ok(())
    }
}

// ── Reviews and CMS ──────────────────────────────────────────────────────────

impl ReviewRepository for InMemoryStore {
    fn approved_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let s = self.lock();
        let mut reviews: Vec<Review> = s
            .reviews
            .iter()
            .filter(|r| r.product_id == product_id && r.is_approved)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    fn approved_ratings(&self, product_id: Uuid) -> Result<Vec<i32>, DomainError> {
        Ok(self
            .approved_reviews(product_id)?
            .into_iter()
            .map(|r| r.rating)
            .collect())
    }

    fn review(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        Ok(self.lock().reviews.iter().find(|r| r.id == id).cloned())
    }

    fn has_delivered_purchase(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.lock().orders.iter().any(|o| {
            o.customer_id == Some(customer_id)
                && o.status == OrderStatus::Delivered
                && o.items.iter().any(|i| i.product_id == Some(product_id))
        }))
    }

    fn create_review(
        &self,
        product_id: Uuid,
        customer_id: Uuid,
        input: &ReviewInput,
        verified: bool,
    ) -> Result<Review, DomainError> {
        let mut s = self.lock();
        if s
            .reviews
            .iter()
            .any(|r| r.product_id == product_id && r.customer_id == customer_id)
        {
            return Err(DomainError::Conflict("You have already reviewed this product".into()));
        }
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            product_id,
            customer_id,
            rating: input.rating,
            title: input.title.clone(),
            content: input.content.clone(),
            is_verified_purchase: verified,
            is_approved: false,
            created_at: now,
            updated_at: now,
        };
        s.reviews.push(review.clone());
        Ok(review)
    }

    fn update_review(&self, id: Uuid, input: &ReviewInput) -> Result<Review, DomainError> {
        let mut s = self.lock();
        let review = s
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(DomainError::NotFound("Review"))?;
        review.rating = input.rating;
        review.title = input.title.clone();
        review.content = input.content.clone();
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    fn delete_review(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let before = s.reviews.len();
        s.reviews.retain(|r| r.id != id);
        Ok(s.reviews.len() != before)
    }

    fn reviews(&self, approved: Option<bool>, paging: Paging) -> Result<(Vec<Review>, i64), DomainError> {
        let s = self.lock();
        let reviews: Vec<Review> = s
            .reviews
            .iter()
            .filter(|r| approved.map_or(true, |a| r.is_approved == a))
            .cloned()
            .collect();
        Ok((page(&reviews, paging), reviews.len() as i64))
    }

    fn approve_review(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        match s.reviews.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.is_approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn section_from(id: Uuid, input: SectionInput) -> HomepageSection {
    HomepageSection {
        id,
        section_key: input.section_key,
        section_type: input.section_type,
        title_sk: input.title_sk,
        subtitle_sk: input.subtitle_sk,
        description_sk: input.description_sk,
        badge_text: input.badge_text,
        image_url: input.image_url,
        link_url: input.link_url,
        link_text: input.link_text,
        content: input.content,
        is_active: input.is_active,
        sort_order: input.sort_order,
        updated_at: Utc::now(),
    }
}

fn banner_from(id: Uuid, input: BannerInput) -> Banner {
    Banner {
        id,
        name: input.name,
        title_sk: input.title_sk,
        subtitle_sk: input.subtitle_sk,
        image_url: input.image_url,
        link_url: input.link_url,
        placement: input.placement,
        is_active: input.is_active,
        start_date: input.start_date,
        end_date: input.end_date,
        sort_order: input.sort_order,
    }
}

impl CmsRepository for InMemoryStore {
    fn sections(&self) -> Result<Vec<HomepageSection>, DomainError> {
        Ok(self.lock().sections.clone())
    }

    fn create_section(&self, input: SectionInput) -> Result<HomepageSection, DomainError> {
        let section = section_from(Uuid::new_v4(), input);
        self.lock().sections.push(section.clone());
        Ok(section)
    }

    fn update_section(&self, id: Uuid, input: SectionInput) -> Result<Option<HomepageSection>, DomainError> {
        let mut s = self.lock();
        Ok(s.sections.iter_mut().find(|x| x.id == id).map(|x| {
            *x = section_from(id, input);
            x.clone()
        }))
    }

    fn delete_section(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let before = s.sections.len();
        s.sections.retain(|x| x.id != id);
        Ok(s.sections.len() != before)
    }

    fn banners(&self, placement: Option<&str>) -> Result<Vec<Banner>, DomainError> {
        let s = self.lock();
        Ok(s.banners
            .iter()
            .filter(|b| placement.map_or(true, |p| b.placement == p))
            .cloned()
            .collect())
    }

    fn create_banner(&self, input: BannerInput) -> Result<Banner, DomainError> {
        let banner = banner_from(Uuid::new_v4(), input);
        self.lock().banners.push(banner.clone());
        Ok(banner)
    }

    fn update_banner(&self, id: Uuid, input: BannerInput) -> Result<Option<Banner>, DomainError> {
        let mut s = self.lock();
        Ok(s.banners.iter_mut().find(|b| b.id == id).map(|b| {
            *b = banner_from(id, input);
            b.clone()
        }))
    }

    fn delete_banner(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let before = s.banners.len();
        s.banners.retain(|b| b.id != id);
        Ok(s.banners.len() != before)
    }

    fn content_blocks(&self) -> Result<Vec<ContentBlock>, DomainError> {
        Ok(self.lock().blocks.clone())
    }

    fn upsert_content_block(&self, key: &str, input: ContentBlockInput) -> Result<ContentBlock, DomainError> {
        let mut s = self.lock();
        let id = s
            .blocks
            .iter()
            .find(|b| b.block_key == key)
            .map_or_else(Uuid::new_v4, |b| b.id);
        let block = ContentBlock {
            id,
            block_key: key.to_string(),
            block_type: input.block_type,
            title_sk: input.title_sk,
            content: input.content,
            is_active: input.is_active,
            updated_at: Utc::now(),
        };
        s.blocks.retain(|b| b.block_key != key);
        s.blocks.push(block.clone());
        Ok(block)
    }

    fn delete_content_block(&self, key: &str) -> Result<bool, DomainError> {
        let mut s = self.lock();
        let before = s.blocks.len();
        s.blocks.retain(|b| b.block_key != key);
        Ok(s.blocks.len() != before)
    }
}

// ── Dashboard ────────────────────────────────────────────────────────────────

impl DashboardRepository for InMemoryStore {
    fn snapshot(&self, now: DateTime<Utc>) -> Result<DashboardData, DomainError> {
        let s = self.lock();
        let orders = s
            .orders
            .iter()
            .map(|o| OrderFact {
                id: o.id,
                order_number: o.order_number.clone(),
                status: o.status,
                payment_status: o.payment_status,
                total: o.totals.total.clone(),
                customer_name: format!("{} {}", o.billing.first_name, o.billing.last_name),
                country: o.billing.country.clone(),
                payment_method: o.payment_method_name.clone().or_else(|| o.payment_method_code.clone()),
                shipping_method: o.shipping_method_name.clone(),
                item_count: o.items.iter().map(|i| i64::from(i.quantity)).sum(),
                created_at: o.created_at,
            })
            .collect();
        let items = s
            .orders
            .iter()
            .filter(|o| !matches!(o.status, OrderStatus::Cancelled | OrderStatus::Returned))
            .flat_map(|o| o.items.iter())
            .map(|i| ItemFact {
                product_id: i.product_id,
                product_name: i.product_name.clone(),
                category: None,
                quantity: i.quantity,
                line_total: i.line_total.clone(),
            })
            .collect();
        let customers: HashSet<Uuid> = s.orders.iter().filter_map(|o| o.customer_id).collect();
        Ok(DashboardData {
            now,
            orders,
            items,
            customers: customers.len() as i64,
            stock: s
                .products
                .iter()
                .filter(|p| p.is_active && p.track_stock)
                .map(|p| StockFact {
                    id: p.id,
                    sku: p.sku.clone(),
                    name: p.name_sk.clone(),
                    stock_quantity: p.stock_quantity,
                    low_stock_threshold: p.low_stock_threshold,
                })
                .collect(),
            subscribers: s
                .subscribers
                .iter()
                .map(|sub| SubscriberFact {
                    is_active: sub.is_active,
                    discount_used: sub.discount_used,
                    subscribed_at: sub.subscribed_at,
                })
                .collect(),
            reviews: s
                .reviews
                .iter()
                .map(|r| ReviewFact {
                    rating: r.rating,
                    is_approved: r.is_approved,
                })
                .collect(),
            discounts: s.discounts.clone(),
        })
    }

    fn customers(&self, search: Option<&str>, paging: Paging) -> Result<(Vec<CustomerSummary>, i64), DomainError> {
        let s = self.lock();
        let needle = search.map(str::to_lowercase);
        let mut summaries: Vec<CustomerSummary> = Vec::new();
        for order in &s.orders {
            let Some(customer_id) = order.customer_id else {
                continue;
            };
            let spent = if order.status == OrderStatus::Cancelled {
                BigDecimal::from(0)
            } else {
                order.totals.total.clone()
            };
            match summaries.iter_mut().find(|c| c.id == customer_id) {
                Some(summary) => {
                    summary.order_count += 1;
                    summary.total_spent = sum([&summary.total_spent, &spent]);
                }
                None => summaries.push(CustomerSummary {
                    id: customer_id,
                    email: order.billing.email.clone(),
                    first_name: order.billing.first_name.clone(),
                    last_name: order.billing.last_name.clone(),
                    phone: order.billing.phone.clone(),
                    customer_type: "guest".into(),
                    company_name: order.billing.company_name.clone(),
                    country: order.billing.country.clone(),
                    order_count: 1,
                    total_spent: spent,
                    created_at: order.created_at,
                }),
            }
        }
        let matching: Vec<CustomerSummary> = summaries
            .into_iter()
            .filter(|c| {
                needle.as_ref().map_or(true, |q| {
                    c.email.to_lowercase().contains(q)
                        || c.first_name.to_lowercase().contains(q)
                        || c.last_name.to_lowercase().contains(q)
                })
            })
            .collect();
        Ok((page(&matching, paging), matching.len() as i64))
    }
}
