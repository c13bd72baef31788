use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    price_lines, BankAccount, BankDetails, CheckoutDraft, CheckoutItem, CheckoutRequest, LineSource,
    PlacedOrder,
};
use crate::domain::ports::{CartRepository, CatalogRepository, OrderRepository, ShippingRepository};

pub struct CheckoutService<O, C, K, S> {
    orders: O,
    carts: C,
    catalog: K,
    shipping: S,
    bank: BankAccount,
}

impl<O, C, K, S> CheckoutService<O, C, K, S>
where
    O: OrderRepository,
    C: CartRepository,
    K: CatalogRepository,
    S: ShippingRepository,
{
    pub fn new(orders: O, carts: C, catalog: K, shipping: S, bank: BankAccount) -> Self {
        Self {
            orders,
            carts,
            catalog,
            shipping,
            bank,
        }
    }

    /// Validates the request, prices it against current catalog data and
    /// hands it to the repository, which redeems the discount and writes
    /// the order atomically.
    pub fn place_order(
        &self,
        request: CheckoutRequest,
        customer_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<PlacedOrder, DomainError> {
        let (checkout, source) = request.validate()?;
        let (cart_id, raw_lines) = match source {
            LineSource::Items(items) => (None, self.item_lines(items)?),
            LineSource::Cart(cart_id) => (
                Some(cart_id),
                self.carts
                    .cart_lines(cart_id)?
                    .into_iter()
                    .map(|l| (l.product, l.quantity))
                    .collect(),
            ),
        };
        let lines = price_lines(raw_lines)?;

        let shipping_method = self
            .shipping
            .shipping_method(checkout.shipping_method_id)?
            .filter(|m| m.is_active)
            .ok_or_else(|| DomainError::invalid("Shipping method is not available"))?;
        let payment_method = self
            .shipping
            .payment_method(checkout.payment_method_id)?
            .filter(|m| m.is_active)
            .ok_or_else(|| DomainError::invalid("Payment method is not available"))?;

        let draft = CheckoutDraft {
            customer_id,
            cart_id,
            checkout,
            lines,
            shipping_method,
            payment_method,
        };
        let mut placed = self.orders.place_order(&draft, now).inspect_err(|e| {
            if let DomainError::Discount(rejection) = e {
                log::warn!("Discount rejected at checkout: {rejection}");
            }
        })?;
        if draft.payment_method.is_bank_transfer() {
            placed.bank_details = Some(BankDetails::for_order(
                &self.bank,
                &placed.order_number,
                &placed.total,
            ));
        }
        log::info!("Order {} placed, total {} EUR", placed.order_number, placed.total);
        Ok(placed)
    }

    /// Resolves explicit items against the catalog; repeated products are
    /// folded into one line.
    fn item_lines(&self, items: Vec<CheckoutItem>) -> Result<Vec<(Product, i32)>, DomainError> {
        let mut quantities: Vec<(Uuid, i32)> = Vec::with_capacity(items.len());
        for item in items {
            match quantities.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, q)) => {
                    *q = q
                        .checked_add(item.quantity)
                        .ok_or_else(|| DomainError::invalid("Quantity is too large"))?;
                }
                None => quantities.push((item.product_id, item.quantity)),
            }
        }
        let ids: Vec<Uuid> = quantities.iter().map(|(id, _)| *id).collect();
        let mut products: HashMap<Uuid, Product> = self
            .catalog
            .products_by_ids(&ids)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        quantities
            .into_iter()
            .map(|(id, quantity)| {
                products
                    .remove(&id)
                    .map(|p| (p, quantity))
                    .ok_or(DomainError::NotFound("Product"))
            })
            .collect()
    }
}
