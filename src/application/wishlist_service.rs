use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogRepository, WishlistRepository};
use crate::domain::wishlist::{WishlistEntry, WishlistToggle};

pub struct WishlistService<W, K> {
    wishlist: W,
    catalog: K,
}

impl<W: WishlistRepository, K: CatalogRepository> WishlistService<W, K> {
    pub fn new(wishlist: W, catalog: K) -> Self {
        Self { wishlist, catalog }
    }

    /// Only active products are listed.
    pub fn list(&self, customer_id: Uuid) -> Result<Vec<WishlistEntry>, DomainError> {
        Ok(self
            .wishlist
            .wishlist(customer_id)?
            .into_iter()
            .filter(|e| e.product.is_active)
            .collect())
    }

    /// Adding a product that is already listed is a no-op.
    pub fn add(&self, customer_id: Uuid, product_id: Uuid) -> Result<(), DomainError> {
        self.catalog
            .product_by_id(product_id)?
            .filter(|p| p.is_active)
            .ok_or(DomainError::NotFound("Product"))?;
        self.wishlist.add_to_wishlist(customer_id, product_id)?;
        Ok(())
    }

    pub fn remove(&self, customer_id: Uuid, product_id: Uuid) -> Result<(), DomainError> {
        if !self.wishlist.remove_from_wishlist(customer_id, product_id)? {
            return Err(DomainError::NotFound("Wishlist item"));
        }
        Ok(())
    }

    pub fn toggle(&self, customer_id: Uuid, product_id: Uuid) -> Result<WishlistToggle, DomainError> {
        if self.wishlist.remove_from_wishlist(customer_id, product_id)? {
            return Ok(WishlistToggle { in_wishlist: false });
        }
        self.add(customer_id, product_id)?;
        Ok(WishlistToggle { in_wishlist: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::InMemoryStore;
    use crate::domain::fixtures::product;

    #[test]
    fn toggle_flips_membership() {
        let store = InMemoryStore::default();
        let p = product("1", "1.2");
        let id = p.id;
        store.add_product(p);
        let service = WishlistService::new(store.clone(), store);
        let customer = Uuid::new_v4();

        assert!(service.toggle(customer, id).expect("toggled").in_wishlist);
        assert_eq!(service.list(customer).expect("listed").len(), 1);
        assert!(!service.toggle(customer, id).expect("toggled").in_wishlist);
        assert!(service.list(customer).expect("listed").is_empty());
    }

    #[test]
    fn adding_twice_is_a_no_op() {
        let store = InMemoryStore::default();
        let p = product("1", "1.2");
        let id = p.id;
        store.add_product(p);
        let service = WishlistService::new(store.clone(), store);
        let customer = Uuid::new_v4();

        service.add(customer, id).expect("added");
        service.add(customer, id).expect("added again");
        assert_eq!(service.list(customer).expect("listed").len(), 1);
    }

    #[test]
    fn unknown_product_is_rejected() {
        let store = InMemoryStore::default();
        let service = WishlistService::new(store.clone(), store);
        assert!(matches!(
            service.add(Uuid::new_v4(), Uuid::new_v4()),
            Err(DomainError::NotFound("Product"))
        ));
    }
}
