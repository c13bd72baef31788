//! Orders: checkout input, price composition, the persisted snapshot and the
//! status/payment lifecycle.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::{Product, VatMode};
use super::discount::{AppliedDiscount, DiscountLine, Redemption};
use super::errors::DomainError;
use super::money::{round2, sum, CURRENCY};
use super::shipping::{PaymentMethod, ShippingMethod, CASH_ON_DELIVERY};

pub const ORDER_NUMBER_PREFIX: &str = "OBJ";

// ── Status enums ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::invalid(format!("Unknown order status '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Awaiting,
    Paid,
    Cod,
    Refunded,
    PartiallyRefunded,
    Failed,
}

impl PaymentStatus {
    const ALL: [PaymentStatus; 7] = [
        PaymentStatus::Pending,
        PaymentStatus::Awaiting,
        PaymentStatus::Paid,
        PaymentStatus::Cod,
        PaymentStatus::Refunded,
        PaymentStatus::PartiallyRefunded,
        PaymentStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Awaiting => "awaiting",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cod => "cod",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Status a new order starts with for the given payment method code.
    pub fn initial_for(payment_method_code: &str) -> Self {
        match payment_method_code {
            super::shipping::BANK_TRANSFER => PaymentStatus::Pending,
            CASH_ON_DELIVERY => PaymentStatus::Cod,
            _ => PaymentStatus::Awaiting,
        }
    }

    /// `Ok(true)` when a payment should be recorded, `Ok(false)` when it
    /// already has been.
    pub fn accepts_payment(self) -> Result<bool, DomainError> {
        match self {
            PaymentStatus::Paid => Ok(false),
            PaymentStatus::Refunded | PaymentStatus::PartiallyRefunded => {
                Err(DomainError::Conflict("Order has already been refunded".into()))
            }
            _ => Ok(true),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Internal(format!("unknown payment status '{s}'")))
    }
}

// ── Addresses ────────────────────────────────────────────────────────────────

fn default_country() -> String {
    "SK".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
    pub zip: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub company_name: Option<String>,
    pub ico: Option<String>,
    pub dic: Option<String>,
    pub ic_dph: Option<String>,
}

impl BillingAddress {
    fn validate(&mut self) -> Result<(), DomainError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("street", &self.street),
            ("city", &self.city),
            ("zip", &self.zip),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(DomainError::invalid(format!("Billing {field} is required")));
        }
        if !self.email.contains('@') {
            return Err(DomainError::invalid("Billing email is invalid"));
        }
        self.email = self.email.trim().to_lowercase();
        self.country = self.country.trim().to_uppercase();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub zip: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub phone: Option<String>,
}

impl From<&BillingAddress> for ShippingAddress {
    fn from(b: &BillingAddress) -> Self {
        ShippingAddress {
            first_name: b.first_name.clone(),
            last_name: b.last_name.clone(),
            street: b.street.clone(),
            city: b.city.clone(),
            zip: b.zip.clone(),
            country: b.country.clone(),
            phone: b.phone.clone(),
        }
    }
}

// ── Checkout input ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub cart_id: Option<Uuid>,
    pub items: Option<Vec<CheckoutItem>>,
    pub billing: BillingAddress,
    pub shipping: Option<ShippingAddress>,
    pub shipping_method_id: Uuid,
    pub payment_method_id: Uuid,
    pub discount_code: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub is_company: bool,
}

/// Where the checkout lines come from.
#[derive(Debug, Clone)]
pub enum LineSource {
    Cart(Uuid),
    Items(Vec<CheckoutItem>),
}

impl CheckoutRequest {
    /// Checks the addresses and decides the line source. Explicit items win
    /// over a cart id.
    pub fn validate(mut self) -> Result<(ValidCheckout, LineSource), DomainError> {
        self.billing.validate()?;
        let source = match (self.items, self.cart_id) {
            (Some(items), _) if !items.is_empty() => LineSource::Items(items),
            (_, Some(cart_id)) => LineSource::Cart(cart_id),
            _ => return Err(DomainError::invalid("Cart is empty")),
        };
        let shipping = self
            .shipping
            .unwrap_or_else(|| ShippingAddress::from(&self.billing));
        Ok((
            ValidCheckout {
                billing: self.billing,
                shipping,
                shipping_method_id: self.shipping_method_id,
                payment_method_id: self.payment_method_id,
                discount_code: self
                    .discount_code
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
                note: self.note.filter(|n| !n.trim().is_empty()),
                is_company: self.is_company,
            },
            source,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct ValidCheckout {
    pub billing: BillingAddress,
    pub shipping: ShippingAddress,
    pub shipping_method_id: Uuid,
    pub payment_method_id: Uuid,
    pub discount_code: Option<String>,
    pub note: Option<String>,
    pub is_company: bool,
}

// ── Pricing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product: Product,
    pub quantity: i32,
}

impl PricedLine {
    pub fn net_total(&self) -> BigDecimal {
        &self.product.price_without_vat * BigDecimal::from(self.quantity)
    }

    pub fn gross_total(&self) -> BigDecimal {
        &self.product.price_with_vat * BigDecimal::from(self.quantity)
    }
}

/// Checks that every line can be sold: non-empty, positive quantities,
/// active products and enough stock where stock is tracked.
pub fn price_lines(lines: Vec<(Product, i32)>) -> Result<Vec<PricedLine>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::invalid("Cart is empty"));
    }
    lines
        .into_iter()
        .map(|(product, quantity)| {
            if quantity < 1 {
                return Err(DomainError::invalid("Quantity must be at least 1"));
            }
            if !product.is_active {
                return Err(DomainError::invalid(format!(
                    "Product {} is not available",
                    product.name_sk
                )));
            }
            if !product.can_supply(quantity) {
                return Err(DomainError::invalid(format!(
                    "Insufficient stock for {}",
                    product.name_sk
                )));
            }
            Ok(PricedLine { product, quantity })
        })
        .collect()
}

pub fn discount_lines(lines: &[PricedLine]) -> Vec<DiscountLine> {
    lines
        .iter()
        .map(|l| DiscountLine {
            product_id: l.product.id,
            category_id: l.product.category_id,
            line_total: l.gross_total(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderTotals {
    #[schema(value_type = String)]
    pub subtotal: BigDecimal,
    #[schema(value_type = String)]
    pub vat_total: BigDecimal,
    #[schema(value_type = String)]
    pub shipping_cost: BigDecimal,
    #[schema(value_type = String)]
    pub payment_fee: BigDecimal,
    #[schema(value_type = String)]
    pub discount_amount: BigDecimal,
    #[schema(value_type = String)]
    pub total: BigDecimal,
}

impl OrderTotals {
    /// Every component is rounded first; the total is the exact sum of the
    /// rounded components.
    pub fn compute(
        lines: &[PricedLine],
        shipping: &ShippingMethod,
        payment: &PaymentMethod,
        discount: Option<&AppliedDiscount>,
    ) -> Self {
        let subtotal = round2(&sum(&lines.iter().map(PricedLine::net_total).collect::<Vec<_>>()));
        let items_total = round2(&sum(&lines.iter().map(PricedLine::gross_total).collect::<Vec<_>>()));
        let vat_total = &items_total - &subtotal;
        let shipping_cost = shipping.cost_for(&items_total);
        let discount_amount = round2(&discount.map_or_else(BigDecimal::zero, |d| d.amount.clone()));
        let payment_fee = payment.fee_for(&(&items_total + &shipping_cost - &discount_amount));
        let total = &subtotal + &vat_total + &shipping_cost + &payment_fee - &discount_amount;
        OrderTotals {
            subtotal,
            vat_total,
            shipping_cost,
            payment_fee,
            discount_amount,
            total,
        }
    }
}

// ── New order ────────────────────────────────────────────────────────────────

/// Everything checkout knows before the discount is locked and redeemed.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub customer_id: Option<Uuid>,
    pub cart_id: Option<Uuid>,
    pub checkout: ValidCheckout,
    pub lines: Vec<PricedLine>,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
}

impl CheckoutDraft {
    pub fn discount_lines(&self) -> Vec<DiscountLine> {
        discount_lines(&self.lines)
    }

    /// Fixes totals and statuses for the order about to be written.
    pub fn finalize(&self, customer_id: Uuid, discount: Option<AppliedDiscount>) -> NewOrder {
        let totals = OrderTotals::compute(
            &self.lines,
            &self.shipping_method,
            &self.payment_method,
            discount.as_ref(),
        );
        let id = Uuid::new_v4();
        NewOrder {
            id,
            customer_id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::initial_for(&self.payment_method.code),
            totals,
            discount,
            shipping_method_id: self.shipping_method.id,
            shipping_method_name: self.shipping_method.name_sk.clone(),
            payment_method_id: self.payment_method.id,
            payment_method_code: self.payment_method.code.clone(),
            payment_method_name: self.payment_method.name_sk.clone(),
            billing: self.checkout.billing.clone(),
            shipping: self.checkout.shipping.clone(),
            note: self.checkout.note.clone(),
            items: self.lines.iter().map(|l| NewOrderItem::snapshot(id, l)).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub totals: OrderTotals,
    pub discount: Option<AppliedDiscount>,
    pub shipping_method_id: Uuid,
    pub shipping_method_name: String,
    pub payment_method_id: Uuid,
    pub payment_method_code: String,
    pub payment_method_name: String,
    pub billing: BillingAddress,
    pub shipping: ShippingAddress,
    pub note: Option<String>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn discount_id(&self) -> Option<Uuid> {
        match self.discount.as_ref().map(|d| d.redemption) {
            Some(Redemption::Merchant { discount_id }) => Some(discount_id),
            _ => None,
        }
    }

    pub fn newsletter_subscriber_id(&self) -> Option<Uuid> {
        match self.discount.as_ref().map(|d| d.redemption) {
            Some(Redemption::Newsletter { subscriber_id }) => Some(subscriber_id),
            _ => None,
        }
    }
}

/// Order line frozen at checkout time.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_sku: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub price_without_vat: BigDecimal,
    pub price_with_vat: BigDecimal,
    pub vat_rate: BigDecimal,
    pub vat_mode: VatMode,
    pub line_total: BigDecimal,
    pub purchase_price: Option<BigDecimal>,
    pub track_stock: bool,
}

impl NewOrderItem {
    fn snapshot(order_id: Uuid, line: &PricedLine) -> Self {
        let p = &line.product;
        NewOrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: p.id,
            product_sku: p.sku.clone(),
            product_name: p.name_sk.clone(),
            product_image_url: p.main_image_url.clone(),
            quantity: line.quantity,
            price_without_vat: p.price_without_vat.clone(),
            price_with_vat: p.price_with_vat.clone(),
            vat_rate: p.vat_rate.clone(),
            vat_mode: p.vat_mode,
            line_total: round2(&line.gross_total()),
            // Margin-scheme VAT is computed from the purchase price later.
            purchase_price: if p.is_bazaar { p.purchase_price.clone() } else { None },
            track_stock: p.track_stock,
        }
    }
}

/// `OBJ` followed by the sequence value padded to six digits.
pub fn format_order_number(seq: i64) -> String {
    format!("{ORDER_NUMBER_PREFIX}{seq:06}")
}

/// Digits of the order number, used as the bank-transfer variable symbol.
pub fn variable_symbol(order_number: &str) -> String {
    order_number.chars().filter(char::is_ascii_digit).collect()
}

#[derive(Debug, Clone)]
pub struct BankAccount {
    pub iban: String,
    pub bic: String,
    pub account_holder: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BankDetails {
    pub iban: String,
    pub bic: String,
    pub account_holder: String,
    pub variable_symbol: String,
    #[schema(value_type = String)]
    pub amount: BigDecimal,
    pub currency: &'static str,
}

impl BankDetails {
    pub fn for_order(account: &BankAccount, order_number: &str, amount: &BigDecimal) -> Self {
        BankDetails {
            iban: account.iban.clone(),
            bic: account.bic.clone(),
            account_holder: account.account_holder.clone(),
            variable_symbol: variable_symbol(order_number),
            amount: round2(amount),
            currency: CURRENCY,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub order_number: String,
    #[schema(value_type = String)]
    pub total: BigDecimal,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
}

// ── Persisted order ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_sku: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price_without_vat: BigDecimal,
    #[schema(value_type = String)]
    pub price_with_vat: BigDecimal,
    #[schema(value_type = String)]
    pub vat_rate: BigDecimal,
    pub vat_mode: VatMode,
    #[schema(value_type = String)]
    pub line_total: BigDecimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub currency: String,
    #[serde(skip)]
    pub discount_id: Option<Uuid>,
    pub discount_code: Option<String>,
    pub shipping_method_id: Option<Uuid>,
    pub shipping_method_name: Option<String>,
    pub payment_method_id: Option<Uuid>,
    pub payment_method_code: Option<String>,
    pub payment_method_name: Option<String>,
    pub billing: BillingAddress,
    pub shipping: ShippingAddress,
    pub customer_note: Option<String>,
    pub tracking_number: Option<String>,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// How an order is addressed: by id from the back office, by number from
/// payment providers and tracking links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    Id(Uuid),
    Number(String),
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Any status may follow any other; shipping needs a tracking number.
    pub fn change_status(
        &self,
        to: OrderStatus,
        tracking_number: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, DomainError> {
        let tracking_number = tracking_number
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| self.tracking_number.clone());
        if to == OrderStatus::Shipped && tracking_number.is_none() {
            return Err(DomainError::invalid(
                "Tracking number is required for shipped orders",
            ));
        }
        let stamp = |status: OrderStatus, current: Option<DateTime<Utc>>| {
            if to == status {
                current.or(Some(now))
            } else {
                current
            }
        };
        Ok(StatusChange {
            from: self.status,
            to,
            tracking_number,
            shipped_at: stamp(OrderStatus::Shipped, self.shipped_at),
            delivered_at: stamp(OrderStatus::Delivered, self.delivered_at),
        })
    }

    /// Payment status after refunding `amount` (the whole total when absent).
    pub fn refund(&self, amount: Option<&BigDecimal>) -> Result<PaymentStatus, DomainError> {
        if !matches!(
            self.payment_status,
            PaymentStatus::Paid | PaymentStatus::PartiallyRefunded
        ) {
            return Err(DomainError::invalid("Only paid orders can be refunded"));
        }
        match amount {
            Some(a) if *a <= BigDecimal::zero() => {
                Err(DomainError::invalid("Refund amount must be positive"))
            }
            Some(a) if *a < self.totals.total => Ok(PaymentStatus::PartiallyRefunded),
            _ => Ok(PaymentStatus::Refunded),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackingInfo {
    pub order_number: String,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub shipping_method: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl TrackingInfo {
    pub fn of(order: &Order, method: Option<&ShippingMethod>) -> Self {
        TrackingInfo {
            order_number: order.order_number.clone(),
            status: order.status,
            tracking_url: match (method, &order.tracking_number) {
                (Some(m), Some(number)) => m.tracking_url(number),
                _ => None,
            },
            tracking_number: order.tracking_number.clone(),
            shipping_method: order
                .shipping_method_name
                .clone()
                .or_else(|| method.map(|m| m.name_sk.clone())),
            shipped_at: order.shipped_at,
            delivered_at: order.delivered_at,
        }
    }
}

// ── Outbox events ────────────────────────────────────────────────────────────

pub const AGGREGATE_TYPE: &str = "Order";

#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Placed {
        order_id: Uuid,
        order_number: String,
        payload: serde_json::Value,
    },
    StatusChanged {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        tracking_number: Option<String>,
    },
    PaymentReceived {
        order_id: Uuid,
        reference: Option<String>,
        payment_status: PaymentStatus,
    },
}

impl OrderEvent {
    pub fn placed(order: &NewOrder, order_number: &str) -> Self {
        let items: Vec<serde_json::Value> = order
            .items
            .iter()
            .map(|i| {
                json!({
                    "product_id": i.product_id,
                    "sku": i.product_sku,
                    "quantity": i.quantity,
                    "price_with_vat": i.price_with_vat.to_string(),
                })
            })
            .collect();
        OrderEvent::Placed {
            order_id: order.id,
            order_number: order_number.to_string(),
            payload: json!({
                "order_id": order.id,
                "order_number": order_number,
                "customer_id": order.customer_id,
                "email": order.billing.email,
                "status": order.status,
                "payment_status": order.payment_status,
                "payment_method": order.payment_method_code,
                "discount_code": order.discount.as_ref().map(|d| &d.code),
                "total": order.totals.total.to_string(),
                "items": items,
            }),
        }
    }

    pub fn aggregate_id(&self) -> Uuid {
        match self {
            OrderEvent::Placed { order_id, .. }
            | OrderEvent::StatusChanged { order_id, .. }
            | OrderEvent::PaymentReceived { order_id, .. } => *order_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed { .. } => "OrderPlaced",
            OrderEvent::StatusChanged { .. } => "OrderStatusChanged",
            OrderEvent::PaymentReceived { .. } => "PaymentReceived",
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        match self {
            OrderEvent::Placed { payload, .. } => payload.clone(),
            OrderEvent::StatusChanged {
                order_id,
                from,
                to,
                tracking_number,
            } => json!({
                "order_id": order_id,
                "from": from,
                "to": to,
                "tracking_number": tracking_number,
            }),
            OrderEvent::PaymentReceived {
                order_id,
                reference,
                payment_status,
            } => json!({
                "order_id": order_id,
                "reference": reference,
                "payment_status": payment_status,
            }),
        }
    }
}
