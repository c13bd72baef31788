use uuid::Uuid;

use crate::domain::cart::{pick_accessories, CartOwner, CartTotals, CartView};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, CatalogRepository};

const ACCESSORY_LIMIT: usize = 4;

pub struct CartService<C, K> {
    carts: C,
    catalog: K,
}

impl<C: CartRepository, K: CatalogRepository> CartService<C, K> {
    pub fn new(carts: C, catalog: K) -> Self {
        Self { carts, catalog }
    }

    /// Get-or-create; totals are always recomputed from current prices.
    pub fn view(&self, owner: &CartOwner) -> Result<CartView, DomainError> {
        let cart = self.carts.find_or_create_cart(owner)?;
        let items = self.carts.cart_lines(cart.id)?;
        let in_cart: Vec<Uuid> = items.iter().map(|l| l.product.id).collect();
        let accessories = if in_cart.is_empty() {
            vec![]
        } else {
            pick_accessories(self.catalog.accessories_of(&in_cart)?, &in_cart, ACCESSORY_LIMIT)
        };
        Ok(CartView {
            cart_id: cart.id,
            totals: CartTotals::of(&items),
            items,
            accessories,
        })
    }

    pub fn add_item(&self, owner: &CartOwner, product_id: Uuid, quantity: i32) -> Result<CartView, DomainError> {
        if quantity < 1 {
            return Err(DomainError::invalid("Quantity must be at least 1"));
        }
        let product = self
            .catalog
            .product_by_id(product_id)?
            .filter(|p| p.is_active)
            .ok_or(DomainError::NotFound("Product"))?;
        let cart = self.carts.find_or_create_cart(owner)?;
        let existing = self
            .carts
            .line_for_product(cart.id, product_id)?
            .map_or(0, |l| l.quantity);
        let wanted = existing
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invalid("Quantity is too large"))?;
        if !product.can_supply(wanted) {
            return Err(DomainError::invalid(format!(
                "Only {} pieces of {} are in stock",
                product.stock_quantity.max(0),
                product.name_sk
            )));
        }
        self.carts.put_line(cart.id, product_id, wanted)?;
        self.view(owner)
    }

    /// A quantity of zero or less removes the line.
    pub fn update_item(&self, owner: &CartOwner, item_id: Uuid, quantity: i32) -> Result<CartView, DomainError> {
        let cart = self
            .carts
            .find_cart(owner)?
            .ok_or(DomainError::NotFound("Cart"))?;
        let line = self
            .carts
            .line(cart.id, item_id)?
            .ok_or(DomainError::NotFound("Cart item"))?;
        if quantity <= 0 {
            self.carts.remove_line(cart.id, item_id)?;
        } else {
            if !line.product.can_supply(quantity) {
                return Err(DomainError::invalid(format!(
                    "Only {} pieces of {} are in stock",
                    line.product.stock_quantity.max(0),
                    line.product.name_sk
                )));
            }
            self.carts.put_line(cart.id, line.product.id, quantity)?;
        }
        self.view(owner)
    }

    pub fn remove_item(&self, owner: &CartOwner, item_id: Uuid) -> Result<CartView, DomainError> {
        let cart = self
            .carts
            .find_cart(owner)?
            .ok_or(DomainError::NotFound("Cart"))?;
        if !self.carts.remove_line(cart.id, item_id)? {
            return Err(DomainError::NotFound("Cart item"));
        }
        self.view(owner)
    }

    pub fn clear(&self, owner: &CartOwner) -> Result<CartView, DomainError> {
        if let Some(cart) = self.carts.find_cart(owner)? {
            self.carts.clear_cart(cart.id)?;
        }
        self.view(owner)
    }

    /// Folds the anonymous session cart into the customer's cart after login.
    pub fn merge(&self, session_id: &str, customer_id: Uuid) -> Result<CartView, DomainError> {
        if session_id.trim().is_empty() {
            return Err(DomainError::invalid("Session id is required"));
        }
        self.carts.merge_carts(session_id, customer_id)?;
        self.view(&CartOwner::Customer(customer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::InMemoryStore;
    use crate::domain::fixtures::{dec, product};

    fn service(store: &InMemoryStore) -> CartService<InMemoryStore, InMemoryStore> {
        CartService::new(store.clone(), store.clone())
    }

    fn session() -> CartOwner {
        CartOwner::Session("sess-1".into())
    }

    #[test]
    fn adding_twice_increments_the_line() {
        let store = InMemoryStore::default();
        let p = product("10.00", "12.00");
        let id = p.id;
        store.add_product(p);
        let carts = service(&store);

        carts.add_item(&session(), id, 1).expect("added");
        let view = carts.add_item(&session(), id, 2).expect("added");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 3);
        assert_eq!(view.totals.total, dec("36.00"));
        assert_eq!(view.totals.item_count, 3);
    }

    #[test]
    fn stock_limits_the_resulting_quantity() {
        let store = InMemoryStore::default();
        let mut p = product("10.00", "12.00");
        p.stock_quantity = 2;
        let id = p.id;
        store.add_product(p);
        let carts = service(&store);

        carts.add_item(&session(), id, 2).expect("added");
        assert!(matches!(
            carts.add_item(&session(), id, 1),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn quantity_overflow_is_rejected() {
        let store = InMemoryStore::default();
        let mut p = product("10.00", "12.00");
        p.track_stock = false;
        let id = p.id;
        store.add_product(p);
        let carts = service(&store);

        carts.add_item(&session(), id, 1).expect("added");
        let err = carts.add_item(&session(), id, i32::MAX).unwrap_err();
        assert_eq!(err.to_string(), "Quantity is too large");
        let view = carts.view(&session()).expect("view");
        assert_eq!(view.items[0].quantity, 1);
    }

    #[test]
    fn inactive_products_cannot_be_added() {
        let store = InMemoryStore::default();
        let mut p = product("10.00", "12.00");
        p.is_active = false;
        let id = p.id;
        store.add_product(p);
        assert!(matches!(
            service(&store).add_item(&session(), id, 1),
            Err(DomainError::NotFound("Product"))
        ));
    }

    #[test]
    fn zero_quantity_update_removes_line() {
        let store = InMemoryStore::default();
        let p = product("10.00", "12.00");
        let id = p.id;
        store.add_product(p);
        let carts = service(&store);

        let view = carts.add_item(&session(), id, 1).expect("added");
        let item_id = view.items[0].id;
        let view = carts.update_item(&session(), item_id, 0).expect("updated");
        assert!(view.items.is_empty());
        assert_eq!(view.totals.total, dec("0"));
    }

    #[test]
    fn accessories_exclude_cart_products() {
        let store = InMemoryStore::default();
        let phone = product("500", "600");
        let case = product("10", "12");
        let charger = product("20", "24");
        store.add_accessory(phone.id, case.id);
        store.add_accessory(phone.id, charger.id);
        store.add_accessory(case.id, phone.id);
        let (phone_id, case_id, charger_id) = (phone.id, case.id, charger.id);
        for p in [phone, case, charger] {
            store.add_product(p);
        }
        let carts = service(&store);

        carts.add_item(&session(), phone_id, 1).expect("added");
        let view = carts.add_item(&session(), case_id, 1).expect("added");
        let suggested: Vec<Uuid> = view.accessories.iter().map(|p| p.id).collect();
        assert_eq!(suggested, vec![charger_id]);
    }

    #[test]
    fn merge_moves_session_lines_to_customer() {
        let store = InMemoryStore::default();
        let p = product("10.00", "12.00");
        let id = p.id;
        store.add_product(p);
        let carts = service(&store);
        let customer = Uuid::new_v4();

        carts.add_item(&session(), id, 2).expect("added");
        carts.add_item(&CartOwner::Customer(customer), id, 1).expect("added");
        let view = carts.merge("sess-1", customer).expect("merged");
        assert_eq!(view.items[0].quantity, 3);
        assert!(store.find_cart(&session()).expect("query").is_none());
    }
}
