//! HTTP adapters. Handlers translate requests into service calls, run them on
//! the blocking pool and wrap the result in the `{success, data}` envelope.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod cms;
pub mod discounts;
pub mod feed;
pub mod newsletter;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod shipping;
pub mod wishlist;

use actix_web::middleware::from_fn;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::CartOwner;
use crate::domain::errors::DomainError;
use crate::domain::ports::Paging;
use crate::errors::AppError;
use crate::state::AppState;

pub const CUSTOMER_HEADER: &str = "X-Customer-Id";
pub const SESSION_HEADER: &str = "X-Session-Id";

// ── Envelope ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse { success: true, data })
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse { success: true, data })
}

pub fn done(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": message }))
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn paging(&self) -> Paging {
        Paging::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, paging: Paging) -> Self {
        Page {
            items,
            pagination: Pagination {
                page: paging.page,
                limit: paging.limit,
                total,
                total_pages: (total + paging.limit - 1) / paging.limit,
            },
        }
    }
}

// ── Blocking bridge ──────────────────────────────────────────────────────────

/// Runs a synchronous service call on actix's blocking pool.
pub(crate) async fn blocking<T, F>(state: &web::Data<AppState>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&AppState) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = web::block(move || f(&state))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(result)
}

// ── Routes ───────────────────────────────────────────────────────────────────

/// Registers every route. Literal segments are registered before the
/// `{id}` patterns they would otherwise collide with.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/products", web::get().to(catalog::list_products))
        .route("/products/featured", web::get().to(catalog::featured_products))
        .route("/products/new", web::get().to(catalog::new_products))
        .route("/products/slug/{slug}", web::get().to(catalog::get_product_by_slug))
        .route("/products/{id}", web::get().to(catalog::get_product))
        .route("/products/{id}/accessories", web::get().to(catalog::product_accessories))
        .route("/products/{id}/reviews/stats", web::get().to(reviews::review_stats))
        .service(
            web::resource("/products/{id}/reviews")
                .route(web::get().to(reviews::product_reviews))
                .route(web::post().to(reviews::create_review)),
        )
        .route("/categories", web::get().to(catalog::list_categories))
        .route("/categories/slug/{slug}", web::get().to(catalog::get_category_by_slug))
        .route("/categories/slug/{slug}/products", web::get().to(catalog::category_products))
        .route("/categories/{id}", web::get().to(catalog::get_category))
        .route("/categories/{id}/children", web::get().to(catalog::child_categories))
        .service(
            web::resource("/cart")
                .route(web::get().to(cart::get_cart))
                .route(web::delete().to(cart::clear_cart)),
        )
        .route("/cart/items", web::post().to(cart::add_item))
        .route("/cart/merge", web::post().to(cart::merge_cart))
        .service(
            web::resource("/cart/items/{item_id}")
                .route(web::put().to(cart::update_item))
                .route(web::delete().to(cart::remove_item)),
        )
        .service(
            web::resource("/wishlist")
                .route(web::get().to(wishlist::list_wishlist))
                .route(web::post().to(wishlist::add_to_wishlist)),
        )
        .route("/wishlist/toggle", web::post().to(wishlist::toggle_wishlist))
        .route("/wishlist/{product_id}", web::delete().to(wishlist::remove_from_wishlist))
        .route("/discounts/validate", web::post().to(discounts::validate_code))
        .route("/discounts/active", web::get().to(discounts::active_discounts))
        .route("/newsletter/subscribe", web::post().to(newsletter::subscribe))
        .route("/newsletter/status", web::get().to(newsletter::subscription_status))
        .route("/newsletter/unsubscribe", web::post().to(newsletter::unsubscribe))
        .service(
            web::resource("/orders")
                .route(web::get().to(orders::list_orders))
                .route(web::post().to(orders::create_order)),
        )
        .route("/orders/tracking/{order_number}", web::get().to(orders::track_order))
        .route("/orders/{id}", web::get().to(orders::get_order))
        .route("/shipping/methods", web::get().to(shipping::list_shipping_methods))
        .route("/shipping/methods/{id}", web::get().to(shipping::get_shipping_method))
        .route("/shipping/methods/{id}/cost", web::get().to(shipping::shipping_cost))
        .route("/payments/methods", web::get().to(shipping::list_payment_methods))
        .route("/payments/methods/{id}", web::get().to(shipping::get_payment_method))
        .route("/payments/methods/{id}/fee", web::get().to(shipping::payment_fee))
        .route("/payments/webhooks/stripe", web::post().to(payments::stripe_webhook))
        .route("/payments/webhooks/trustpay", web::post().to(payments::trustpay_webhook))
        .service(
            web::resource("/reviews/{id}")
                .route(web::put().to(reviews::update_review))
                .route(web::delete().to(reviews::delete_review)),
        )
        .route("/cms/homepage", web::get().to(cms::homepage))
        .route("/cms/banners", web::get().to(cms::live_banners))
        .route("/feeds/heureka.xml", web::get().to(feed::heureka))
        .service(
            web::scope("/admin")
                .wrap(from_fn(admin::require_admin))
                .route("/dashboard", web::get().to(admin::dashboard))
                .route("/customers", web::get().to(admin::customers))
                .route("/products", web::post().to(catalog::create_product))
                .service(
                    web::resource("/products/{id}")
                        .route(web::get().to(catalog::admin_get_product))
                        .route(web::put().to(catalog::update_product))
                        .route(web::delete().to(catalog::delete_product)),
                )
                .route("/products/{id}/stock", web::put().to(catalog::set_stock))
                .route("/orders", web::get().to(orders::admin_list_orders))
                .route("/orders/{id}", web::get().to(orders::admin_get_order))
                .route("/orders/{id}/status", web::put().to(orders::update_status))
                .route("/orders/{id}/mark-paid", web::post().to(orders::mark_paid))
                .route("/orders/{id}/refund", web::post().to(orders::refund))
                .service(
                    web::resource("/discounts")
                        .route(web::get().to(discounts::list_discounts))
                        .route(web::post().to(discounts::create_discount)),
                )
                .route("/discounts/stats", web::get().to(discounts::discount_stats))
                .service(
                    web::resource("/discounts/{id}")
                        .route(web::put().to(discounts::update_discount))
                        .route(web::delete().to(discounts::delete_discount)),
                )
                .route("/newsletter/subscribers", web::get().to(newsletter::list_subscribers))
                .route("/reviews", web::get().to(reviews::admin_list_reviews))
                .route("/reviews/{id}/approve", web::post().to(reviews::approve_review))
                .route("/reviews/{id}", web::delete().to(reviews::reject_review))
                .service(
                    web::resource("/cms/sections")
                        .route(web::get().to(cms::list_sections))
                        .route(web::post().to(cms::create_section)),
                )
                .service(
                    web::resource("/cms/sections/{id}")
                        .route(web::put().to(cms::update_section))
                        .route(web::delete().to(cms::delete_section)),
                )
                .service(
                    web::resource("/cms/banners")
                        .route(web::get().to(cms::list_banners))
                        .route(web::post().to(cms::create_banner)),
                )
                .service(
                    web::resource("/cms/banners/{id}")
                        .route(web::put().to(cms::update_banner))
                        .route(web::delete().to(cms::delete_banner)),
                )
                .route("/cms/blocks", web::get().to(cms::list_blocks))
                .service(
                    web::resource("/cms/blocks/{key}")
                        .route(web::put().to(cms::upsert_block))
                        .route(web::delete().to(cms::delete_block)),
                ),
        );
}

/// Extractor failures use the same `{success, error}` body as handler errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _| AppError::BadRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _| AppError::BadRequest(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _| AppError::BadRequest(err.to_string()).into())
}

// ── Caller identity ──────────────────────────────────────────────────────────

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Customer id forwarded by the gateway, if any.
pub(crate) fn customer_id(req: &HttpRequest) -> Result<Option<Uuid>, AppError> {
    header(req, CUSTOMER_HEADER)
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {CUSTOMER_HEADER} header")))
        })
        .transpose()
}

pub(crate) fn require_customer(req: &HttpRequest) -> Result<Uuid, AppError> {
    customer_id(req)?.ok_or_else(|| AppError::BadRequest("Login required".into()))
}

pub(crate) fn session_id(req: &HttpRequest) -> Option<String> {
    header(req, SESSION_HEADER).map(str::to_string)
}

pub(crate) fn cart_owner(req: &HttpRequest) -> Result<CartOwner, AppError> {
    Ok(CartOwner::resolve(customer_id(req)?, session_id(req))?)
}
