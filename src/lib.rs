pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use config::AppConfig;
pub use db::{create_pool, DbPool};

use handlers::{admin, cart, catalog, cms, discounts, feed, newsletter, orders, payments, reviews, shipping, wishlist};
use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), BoxError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}

struct AdminTokenAddon;

impl Modify for AdminTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("admin_token", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "HDmobil store API"),
    paths(
        catalog::list_products,
        catalog::featured_products,
        catalog::new_products,
        catalog::get_product,
        catalog::get_product_by_slug,
        catalog::product_accessories,
        catalog::list_categories,
        catalog::get_category,
        catalog::get_category_by_slug,
        catalog::child_categories,
        catalog::category_products,
        catalog::admin_get_product,
        catalog::create_product,
        catalog::update_product,
        catalog::delete_product,
        catalog::set_stock,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        cart::merge_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::toggle_wishlist,
        discounts::validate_code,
        discounts::active_discounts,
        discounts::list_discounts,
        discounts::create_discount,
        discounts::update_discount,
        discounts::delete_discount,
        discounts::discount_stats,
        newsletter::subscribe,
        newsletter::subscription_status,
        newsletter::unsubscribe,
        newsletter::list_subscribers,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::track_order,
        orders::admin_list_orders,
        orders::admin_get_order,
        orders::update_status,
        orders::mark_paid,
        orders::refund,
        shipping::list_shipping_methods,
        shipping::get_shipping_method,
        shipping::shipping_cost,
        shipping::list_payment_methods,
        shipping::get_payment_method,
        shipping::payment_fee,
        payments::stripe_webhook,
        payments::trustpay_webhook,
        reviews::product_reviews,
        reviews::review_stats,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::admin_list_reviews,
        reviews::approve_review,
        reviews::reject_review,
        cms::homepage,
        cms::live_banners,
        cms::list_sections,
        cms::create_section,
        cms::update_section,
        cms::delete_section,
        cms::list_banners,
        cms::create_banner,
        cms::update_banner,
        cms::delete_banner,
        cms::list_blocks,
        cms::upsert_block,
        cms::delete_block,
        admin::dashboard,
        admin::customers,
        feed::heureka,
    ),
    components(schemas(handlers::Pagination)),
    modifiers(&AdminTokenAddon),
    tags(
        (name = "catalog", description = "Products and categories"),
        (name = "cart", description = "Shopping cart"),
        (name = "orders", description = "Checkout and order history"),
        (name = "admin", description = "Back office, bearer token required"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to the configured address.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: &AppConfig) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(AppState::new(pool, config));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(handlers::path_config())
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(handlers::configure)
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
