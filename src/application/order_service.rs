use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderFilter, OrderPage, OrderRef, OrderStatus, PaymentStatus, TrackingInfo};
use crate::domain::ports::{OrderRepository, Paging, ShippingRepository};

pub struct OrderService<R, S> {
    repo: R,
    shipping: S,
}

impl<R: OrderRepository, S: ShippingRepository> OrderService<R, S> {
    pub fn new(repo: R, shipping: S) -> Self {
        Self { repo, shipping }
    }

    pub fn customer_orders(&self, customer_id: Uuid, paging: Paging) -> Result<OrderPage, DomainError> {
        let filter = OrderFilter {
            customer_id: Some(customer_id),
            status: None,
        };
        self.repo.list_orders(&filter, paging)
    }

    /// A caller identified as a customer may only read their own orders.
    pub fn get_order(&self, id: Uuid, customer_id: Option<Uuid>) -> Result<Order, DomainError> {
        let order = self.load(id)?;
        match (customer_id, order.customer_id) {
            (Some(caller), Some(owner)) if caller != owner => {
                Err(DomainError::Forbidden("Access to this order is not allowed".into()))
            }
            _ => Ok(order),
        }
    }

    pub fn tracking(&self, order_number: &str) -> Result<TrackingInfo, DomainError> {
        let order = self
            .repo
            .find_order(&OrderRef::Number(order_number.trim().to_uppercase()))?
            .ok_or(DomainError::NotFound("Order"))?;
        let method = match order.shipping_method_id {
            Some(id) => self.shipping.shipping_method(id)?,
            None => None,
        };
        Ok(TrackingInfo::of(&order, method.as_ref()))
    }

    fn load(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo
            .find_order(&OrderRef::Id(id))?
            .ok_or(DomainError::NotFound("Order"))
    }

    // ── Back office ──────────────────────────────────────────────────────────

    pub fn list_orders(&self, status: Option<OrderStatus>, paging: Paging) -> Result<OrderPage, DomainError> {
        let filter = OrderFilter {
            customer_id: None,
            status,
        };
        self.repo.list_orders(&filter, paging)
    }

    pub fn admin_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.load(id)
    }

    pub fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        tracking_number: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let order = self.load(id)?;
        let change = order.change_status(status, tracking_number, now)?;
        self.repo.apply_status_change(id, &change)?;
        log::info!(
            "Order {} status changed from {} to {}",
            order.order_number,
            change.from,
            change.to
        );
        self.load(id)
    }

    /// Records a payment. Returns `false` when the order was already paid.
    pub fn mark_paid(&self, order: &OrderRef, reference: Option<String>, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let recorded = self.repo.mark_paid(order, reference, now)?;
        if recorded {
            log::info!("Payment recorded for order {order:?}");
        }
        Ok(recorded)
    }

    pub fn refund(&self, id: Uuid, amount: Option<BigDecimal>) -> Result<PaymentStatus, DomainError> {
        let order = self.load(id)?;
        let status = order.refund(amount.as_ref())?;
        self.repo.swap_payment_status(id, order.payment_status, status)?;
        log::info!("Order {} refunded ({status})", order.order_number);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::InMemoryStore;
    use crate::domain::fixtures::dec;
    use crate::domain::order::tests::stored_order;
    use crate::domain::shipping::tests::courier;

    fn setup(order: Order) -> (InMemoryStore, OrderService<InMemoryStore, InMemoryStore>) {
        let store = InMemoryStore::default();
        store.add_order(order);
        (store.clone(), OrderService::new(store.clone(), store))
    }

    #[test]
    fn other_customers_cannot_read_an_order() {
        let order = stored_order(OrderStatus::Pending, PaymentStatus::Awaiting);
        let (id, owner) = (order.id, order.customer_id);
        let (_, service) = setup(order);

        assert!(service.get_order(id, owner).is_ok());
        assert!(service.get_order(id, None).is_ok());
        assert!(matches!(
            service.get_order(id, Some(Uuid::new_v4())),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn shipping_an_order_records_tracking_and_event() {
        let order = stored_order(OrderStatus::Processing, PaymentStatus::Paid);
        let id = order.id;
        let (store, service) = setup(order);

        assert!(service
            .update_status(id, OrderStatus::Shipped, None, Utc::now())
            .is_err());
        let updated = service
            .update_status(id, OrderStatus::Shipped, Some("Z123".into()), Utc::now())
            .expect("updated");
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.tracking_number.as_deref(), Some("Z123"));
        assert!(updated.shipped_at.is_some());
        assert_eq!(store.events(), vec!["OrderStatusChanged".to_string()]);
    }

    #[test]
    fn mark_paid_is_idempotent() {
        let order = stored_order(OrderStatus::Pending, PaymentStatus::Awaiting);
        let number = OrderRef::Number(order.order_number.clone());
        let (store, service) = setup(order);

        assert!(service
            .mark_paid(&number, Some("pi_1".into()), Utc::now())
            .expect("paid"));
        assert!(!service
            .mark_paid(&number, Some("pi_1".into()), Utc::now())
            .expect("paid"));
        assert_eq!(store.events(), vec!["PaymentReceived".to_string()]);
    }

    #[test]
    fn partial_refund_of_paid_order() {
        let order = stored_order(OrderStatus::Delivered, PaymentStatus::Paid);
        let id = order.id;
        let (_, service) = setup(order);

        assert_eq!(
            service.refund(id, Some(dec("20"))).expect("refunded"),
            PaymentStatus::PartiallyRefunded
        );
        assert_eq!(service.refund(id, None).expect("refunded"), PaymentStatus::Refunded);
        assert!(service.refund(id, None).is_err());
    }

    #[test]
    fn tracking_uses_carrier_template() {
        let mut order = stored_order(OrderStatus::Shipped, PaymentStatus::Paid);
        let method = courier();
        order.shipping_method_id = Some(method.id);
        order.tracking_number = Some("Z9".into());
        let (store, service) = setup(order);
        store.add_shipping_method(method);

        let info = service.tracking("obj000001").expect("found");
        assert_eq!(info.tracking_url.as_deref(), Some("https://track.example/Z9"));
        assert!(matches!(service.tracking("OBJ999999"), Err(DomainError::NotFound("Order"))));
    }
}
