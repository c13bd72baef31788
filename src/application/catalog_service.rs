use uuid::Uuid;

use crate::domain::catalog::{Category, Product, ProductFilter, ProductInput, ProductPage};
use crate::domain::errors::DomainError;
use crate::domain::feed::render_heureka;
use crate::domain::ports::{CatalogRepository, Paging};

/// Bounds for the short product rails (featured, new, category teasers).
fn rail_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(8).clamp(1, 50)
}

pub struct CatalogService<R> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_products(&self, filter: &ProductFilter, paging: Paging) -> Result<ProductPage, DomainError> {
        self.repo.list_products(filter, paging)
    }

    pub fn featured_products(&self, limit: Option<i64>) -> Result<Vec<Product>, DomainError> {
        self.repo.featured_products(rail_limit(limit))
    }

    pub fn new_products(&self, limit: Option<i64>) -> Result<Vec<Product>, DomainError> {
        self.repo.new_products(rail_limit(limit))
    }

    /// Storefront lookup: inactive products are hidden.
    pub fn product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.repo
            .product_by_id(id)?
            .filter(|p| p.is_active)
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn product_by_slug(&self, slug: &str) -> Result<Product, DomainError> {
        self.repo
            .product_by_slug(slug)?
            .filter(|p| p.is_active)
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn accessories(&self, id: Uuid) -> Result<Vec<Product>, DomainError> {
        let product = self.product(id)?;
        self.repo.accessories_of(&[product.id])
    }

    pub fn categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.categories()
    }

    pub fn category(&self, id: Uuid) -> Result<Category, DomainError> {
        self.repo.category_by_id(id)?.ok_or(DomainError::NotFound("Category"))
    }

    pub fn category_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        self.repo
            .category_by_slug(slug)?
            .ok_or(DomainError::NotFound("Category"))
    }

    pub fn child_categories(&self, id: Uuid) -> Result<Vec<Category>, DomainError> {
        let parent = self.category(id)?;
        self.repo.child_categories(parent.id)
    }

    pub fn category_products(&self, slug: &str, limit: Option<i64>) -> Result<Vec<Product>, DomainError> {
        let category = self.category_by_slug(slug)?;
        self.repo
            .products_in_category(category.id, limit.unwrap_or(20).clamp(1, 100))
    }

    // ── Back office ──────────────────────────────────────────────────────────

    pub fn product_for_admin(&self, id: Uuid) -> Result<Product, DomainError> {
        self.repo.product_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let product = self.repo.create_product(input.validate()?)?;
        log::info!("Product {} ({}) created", product.sku, product.id);
        Ok(product)
    }

    pub fn update_product(&self, id: Uuid, input: ProductInput) -> Result<Product, DomainError> {
        self.repo
            .update_product(id, input.validate()?)?
            .ok_or(DomainError::NotFound("Product"))
    }

    /// Soft delete: the product disappears from the storefront but order
    /// history keeps pointing at it.
    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.deactivate_product(id)? {
            return Err(DomainError::NotFound("Product"));
        }
        log::info!("Product {id} deactivated");
        Ok(())
    }

    pub fn set_stock(&self, id: Uuid, quantity: i32) -> Result<Product, DomainError> {
        if quantity < 0 {
            return Err(DomainError::invalid("stock_quantity must not be negative"));
        }
        self.repo
            .set_stock(id, quantity)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn heureka_feed(&self, store_url: &str) -> Result<String, DomainError> {
        Ok(render_heureka(store_url, &self.repo.feed_entries()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::InMemoryStore;
    use crate::domain::fixtures::product;

    #[test]
    fn inactive_products_are_hidden_from_storefront() {
        let store = InMemoryStore::default();
        let mut p = product("10", "12");
        p.is_active = false;
        let id = p.id;
        store.add_product(p);
        let service = CatalogService::new(store);

        assert!(matches!(service.product(id), Err(DomainError::NotFound("Product"))));
        assert_eq!(service.product_for_admin(id).expect("visible to admin").id, id);
    }

    #[test]
    fn delete_deactivates_and_reports_missing() {
        let store = InMemoryStore::default();
        let p = product("10", "12");
        let id = p.id;
        store.add_product(p);
        let service = CatalogService::new(store.clone());

        service.delete_product(id).expect("deleted");
        assert!(!store.product(id).is_active);
        assert!(matches!(
            service.delete_product(Uuid::new_v4()),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let service = CatalogService::new(InMemoryStore::default());
        assert!(matches!(
            service.set_stock(Uuid::new_v4(), -1),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn rail_limits_are_bounded() {
        assert_eq!(rail_limit(None), 8);
        assert_eq!(rail_limit(Some(0)), 1);
        assert_eq!(rail_limit(Some(500)), 50);
    }
}
