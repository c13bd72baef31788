use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::catalog::{Category, Product, ProductFilter, ProductInput, ProductSort};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, ok, Page, PageParams};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub is_bazaar: Option<bool>,
    pub is_new: Option<bool>,
    pub is_sale: Option<bool>,
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQuery {
    fn filter(self) -> ProductFilter {
        ProductFilter {
            category_id: self.category_id,
            search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            is_bazaar: self.is_bazaar,
            is_new: self.is_new,
            is_sale: self.is_sale,
            is_featured: self.is_featured,
            sort: self.sort,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockUpdate {
    pub quantity: i32,
}

// ── Products ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Active products, filtered and sorted, one page at a time.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("category_id" = Option<Uuid>, Query, description = "Only products of this category"),
        ("search" = Option<String>, Query, description = "Matches name, SKU or description"),
        ("is_bazaar" = Option<bool>, Query, description = "Second-hand products"),
        ("is_new" = Option<bool>, Query, description = "New arrivals"),
        ("is_sale" = Option<bool>, Query, description = "Discounted products"),
        ("is_featured" = Option<bool>, Query, description = "Featured products"),
        ("sort" = Option<ProductSort>, Query, description = "newest, price_asc, price_desc or name"),
    ),
    responses(
        (status = 200, description = "Page of products", body = [Product]),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let paging = PageParams {
        page: query.page,
        limit: query.limit,
    }
    .paging();
    let filter = query.filter();

    let page = blocking(&state, move |s| s.catalog.list_products(&filter, paging)).await?;
    Ok(ok(Page::new(page.products, page.total, paging)))
}

#[utoipa::path(
    get,
    path = "/products/featured",
    params(("limit" = Option<i64>, Query, description = "Maximum number of products")),
    responses((status = 200, description = "Featured products", body = [Product])),
    tag = "catalog"
)]
pub async fn featured_products(
    state: web::Data<AppState>,
    query: web::Query<LimitParams>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit;
    let products = blocking(&state, move |s| s.catalog.featured_products(limit)).await?;
    Ok(ok(products))
}

#[utoipa::path(
    get,
    path = "/products/new",
    params(("limit" = Option<i64>, Query, description = "Maximum number of products")),
    responses((status = 200, description = "Newest products", body = [Product])),
    tag = "catalog"
)]
pub async fn new_products(
    state: web::Data<AppState>,
    query: web::Query<LimitParams>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit;
    let products = blocking(&state, move |s| s.catalog.new_products(limit)).await?;
    Ok(ok(products))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = blocking(&state, move |s| s.catalog.product(id)).await?;
    Ok(ok(product))
}

#[utoipa::path(
    get,
    path = "/products/slug/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let product = blocking(&state, move |s| s.catalog.product_by_slug(&slug)).await?;
    Ok(ok(product))
}

/// GET /products/{id}/accessories
///
/// Cross-sell products in their configured order.
#[utoipa::path(
    get,
    path = "/products/{id}/accessories",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses((status = 200, description = "Accessories", body = [Product])),
    tag = "catalog"
)]
pub async fn product_accessories(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let products = blocking(&state, move |s| s.catalog.accessories(id)).await?;
    Ok(ok(products))
}

// ── Categories ───────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Active categories", body = [Category])),
    tag = "catalog"
)]
pub async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = blocking(&state, |s| s.catalog.categories()).await?;
    Ok(ok(categories))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found"),
    ),
    tag = "catalog"
)]
pub async fn get_category(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let category = blocking(&state, move |s| s.catalog.category(id)).await?;
    Ok(ok(category))
}

#[utoipa::path(
    get,
    path = "/categories/slug/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found"),
    ),
    tag = "catalog"
)]
pub async fn get_category_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let category = blocking(&state, move |s| s.catalog.category_by_slug(&slug)).await?;
    Ok(ok(category))
}

#[utoipa::path(
    get,
    path = "/categories/{id}/children",
    params(("id" = Uuid, Path, description = "Parent category UUID")),
    responses((status = 200, description = "Child categories", body = [Category])),
    tag = "catalog"
)]
pub async fn child_categories(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let categories = blocking(&state, move |s| s.catalog.child_categories(id)).await?;
    Ok(ok(categories))
}

#[utoipa::path(
    get,
    path = "/categories/slug/{slug}/products",
    params(
        ("slug" = String, Path, description = "Category slug"),
        ("limit" = Option<i64>, Query, description = "Maximum number of products"),
    ),
    responses(
        (status = 200, description = "Products of the category", body = [Product]),
        (status = 404, description = "Category not found"),
    ),
    tag = "catalog"
)]
pub async fn category_products(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LimitParams>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let limit = query.limit;
    let products = blocking(&state, move |s| s.catalog.category_products(&slug, limit)).await?;
    Ok(ok(products))
}

// ── Back office ──────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product, active or not", body = Product),
        (status = 404, description = "Product not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn admin_get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = blocking(&state, move |s| s.catalog.product_for_admin(id)).await?;
    Ok(ok(product))
}

/// POST /admin/products
///
/// The gross price is derived from the net price and VAT rate when omitted.
#[utoipa::path(
    post,
    path = "/admin/products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product"),
        (status = 409, description = "SKU or slug already taken"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    body: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let product = blocking(&state, move |s| s.catalog.create_product(input)).await?;
    Ok(super::created(product))
}

#[utoipa::path(
    put,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product replaced", body = Product),
        (status = 404, description = "Product not found"),
        (status = 409, description = "SKU or slug already taken"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = body.into_inner();
    let product = blocking(&state, move |s| s.catalog.update_product(id, input)).await?;
    Ok(ok(product))
}

/// DELETE /admin/products/{id}
///
/// Hides the product; order history keeps referring to it.
#[utoipa::path(
    delete,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product deactivated"),
        (status = 404, description = "Product not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn delete_product(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(&state, move |s| s.catalog.delete_product(id)).await?;
    Ok(super::done("Product deactivated"))
}

#[utoipa::path(
    put,
    path = "/admin/products/{id}/stock",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = StockUpdate,
    responses(
        (status = 200, description = "Stock updated", body = Product),
        (status = 400, description = "Negative quantity"),
        (status = 404, description = "Product not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn set_stock(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StockUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let quantity = body.quantity;
    let product = blocking(&state, move |s| s.catalog.set_stock(id, quantity)).await?;
    Ok(ok(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_dropped() {
        let query: ProductQuery =
            serde_json::from_value(serde_json::json!({ "search": "   ", "sort": "price_desc" })).expect("query");
        let filter = query.filter();
        assert!(filter.search.is_none());
        assert_eq!(filter.sort, ProductSort::PriceDesc);
    }

    #[test]
    fn sort_defaults_to_newest() {
        let query: ProductQuery = serde_json::from_value(serde_json::json!({})).expect("query");
        assert_eq!(query.filter().sort, ProductSort::Newest);
    }
}
