use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{Category, Product, ProductDraft, ProductFilter, ProductPage, ProductSort};
use crate::domain::errors::DomainError;
use crate::domain::feed::FeedEntry;
use crate::domain::ports::{CatalogRepository, Paging};
use crate::schema::{categories, product_accessories, products};

use super::{conflict_as, like_pattern};
use super::models::{products_from, CategoryRow, ProductRow, ProductValues};

const DUPLICATE_PRODUCT: &str = "Product with this SKU or slug already exists";

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Active products matching `filter`, without ordering or paging.
fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.filter(products::is_active.eq(true)).into_boxed();
    if let Some(category_id) = filter.category_id {
        query = query.filter(products::category_id.eq(category_id));
    }
    if let Some(flag) = filter.is_bazaar {
        query = query.filter(products::is_bazaar.eq(flag));
    }
    if let Some(flag) = filter.is_new {
        query = query.filter(products::is_new.eq(flag));
    }
    if let Some(flag) = filter.is_sale {
        query = query.filter(products::is_sale.eq(flag));
    }
    if let Some(flag) = filter.is_featured {
        query = query.filter(products::is_featured.eq(flag));
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query = query.filter(
            products::name_sk
                .ilike(pattern.clone())
                .or(products::sku.ilike(pattern.clone()))
                .or(products::description_sk.ilike(pattern).assume_not_null()),
        );
    }
    query
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_products(&self, filter: &ProductFilter, paging: Paging) -> Result<ProductPage, DomainError> {
        let mut conn = self.pool.get()?;

        let total: i64 = filtered(filter).count().get_result(&mut conn)?;
        let query = filtered(filter).select(ProductRow::as_select());
        let query = match filter.sort {
            ProductSort::Newest => query.order(products::created_at.desc()),
            ProductSort::PriceAsc => query.order(products::price_with_vat.asc()),
            ProductSort::PriceDesc => query.order(products::price_with_vat.desc()),
            ProductSort::Name => query.order(products::name_sk.asc()),
        };
        let rows = query
            .then_order_by(products::id)
            .limit(paging.limit)
            .offset(paging.offset())
            .load(&mut conn)?;

        Ok(ProductPage {
            products: products_from(rows)?,
            total,
        })
    }

    fn featured_products(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::is_active.eq(true).and(products::is_featured.eq(true)))
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .limit(limit)
            .load(&mut conn)?;
        products_from(rows)
    }

    fn new_products(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::is_active.eq(true).and(products::is_new.eq(true)))
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .limit(limit)
            .load(&mut conn)?;
        products_from(rows)
    }

    fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .filter(products::slug.eq(slug))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        products_from(rows)
    }

    fn accessories_of(&self, product_ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.pool.get()?;

        // Two foreign keys point at `products`, so the link table is read
        // first and the accessories are put back in link order.
        let links: Vec<Uuid> = product_accessories::table
            .filter(product_accessories::product_id.eq_any(product_ids))
            .select(product_accessories::accessory_id)
            .order((product_accessories::sort_order.asc(), product_accessories::accessory_id))
            .load(&mut conn)?;
        if links.is_empty() {
            return Ok(vec![]);
        }
        let found = products_from(
            products::table
                .filter(products::id.eq_any(&links))
                .filter(products::is_active.eq(true))
                .select(ProductRow::as_select())
                .load(&mut conn)?,
        )?;

        Ok(links
            .iter()
            .filter_map(|id| found.iter().find(|p| p.id == *id))
            .cloned()
            .collect())
    }

    fn categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .select(CategoryRow::as_select())
            .order((categories::sort_order.asc(), categories::name_sk.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Category::from))
    }

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = categories::table
            .filter(categories::slug.eq(slug))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Category::from))
    }

    fn child_categories(&self, parent_id: Uuid) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .filter(categories::parent_id.eq(parent_id))
            .select(CategoryRow::as_select())
            .order((categories::sort_order.asc(), categories::name_sk.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn products_in_category(&self, category_id: Uuid, limit: i64) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::category_id.eq(category_id))
            .filter(products::is_active.eq(true))
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .limit(limit)
            .load(&mut conn)?;
        products_from(rows)
    }

    fn create_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let values = ProductValues::from_draft(draft, Utc::now());
        let row = diesel::insert_into(products::table)
            .values((products::id.eq(Uuid::new_v4()), &values))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .map_err(conflict_as(DUPLICATE_PRODUCT))?;
        Product::try_from(row)
    }

    fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let values = ProductValues::from_draft(draft, Utc::now());
        diesel::update(products::table.find(id))
            .set(&values)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(conflict_as(DUPLICATE_PRODUCT))?
            .map(Product::try_from)
            .transpose()
    }

    fn deactivate_product(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(products::table.find(id))
            .set((products::is_active.eq(false), products::updated_at.eq(Utc::now())))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn set_stock(&self, id: Uuid, quantity: i32) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(products::table.find(id))
            .set((products::stock_quantity.eq(quantity), products::updated_at.eq(Utc::now())))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn feed_entries(&self) -> Result<Vec<FeedEntry>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<(ProductRow, Option<String>)> = products::table
            .left_join(categories::table)
            .filter(products::is_active.eq(true))
            .select((ProductRow::as_select(), categories::name_sk.nullable()))
            .order(products::created_at.desc())
            .load(&mut conn)?;
        rows.into_iter()
            .map(|(row, category_name)| {
                Ok(FeedEntry {
                    product: Product::try_from(row)?,
                    category_name,
                })
            })
            .collect()
    }
}
