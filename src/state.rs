//! Services wired to their Diesel repositories, shared by every worker.

use crate::application::cart_service::CartService;
use crate::application::catalog_service::CatalogService;
use crate::application::checkout_service::CheckoutService;
use crate::application::cms_service::CmsService;
use crate::application::dashboard_service::DashboardService;
use crate::application::discount_service::DiscountService;
use crate::application::newsletter_service::NewsletterService;
use crate::application::order_service::OrderService;
use crate::application::payment_service::PaymentService;
use crate::application::review_service::ReviewService;
use crate::application::shipping_service::ShippingService;
use crate::application::wishlist_service::WishlistService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::cms_repo::DieselCmsRepository;
use crate::infrastructure::dashboard_repo::DieselDashboardRepository;
use crate::infrastructure::discount_repo::DieselDiscountRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::review_repo::DieselReviewRepository;
use crate::infrastructure::shipping_repo::DieselShippingRepository;

pub struct AppState {
    pub catalog: CatalogService<DieselCatalogRepository>,
    pub carts: CartService<DieselCartRepository, DieselCatalogRepository>,
    pub wishlist: WishlistService<DieselCartRepository, DieselCatalogRepository>,
    pub discounts: DiscountService<DieselDiscountRepository, DieselCartRepository>,
    pub newsletter: NewsletterService<DieselDiscountRepository>,
    pub checkout: CheckoutService<
        DieselOrderRepository,
        DieselCartRepository,
        DieselCatalogRepository,
        DieselShippingRepository,
    >,
    pub orders: OrderService<DieselOrderRepository, DieselShippingRepository>,
    pub shipping: ShippingService<DieselShippingRepository>,
    pub payments: PaymentService<DieselOrderRepository>,
    pub reviews: ReviewService<DieselReviewRepository, DieselCatalogRepository>,
    pub cms: CmsService<DieselCmsRepository>,
    pub dashboard: DashboardService<DieselDashboardRepository>,
    pub admin_token: String,
    pub store_url: String,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        let catalog = || DieselCatalogRepository::new(pool.clone());
        let carts = || DieselCartRepository::new(pool.clone());
        let orders = || DieselOrderRepository::new(pool.clone());
        let shipping = || DieselShippingRepository::new(pool.clone());
        let discounts = || DieselDiscountRepository::new(pool.clone());

        AppState {
            catalog: CatalogService::new(catalog()),
            carts: CartService::new(carts(), catalog()),
            wishlist: WishlistService::new(carts(), catalog()),
            discounts: DiscountService::new(discounts(), carts()),
            newsletter: NewsletterService::new(discounts()),
            checkout: CheckoutService::new(orders(), carts(), catalog(), shipping(), config.bank.clone()),
            orders: OrderService::new(orders(), shipping()),
            shipping: ShippingService::new(shipping()),
            payments: PaymentService::new(orders(), config.stripe_webhook_secret.clone()),
            reviews: ReviewService::new(DieselReviewRepository::new(pool.clone()), catalog()),
            cms: CmsService::new(DieselCmsRepository::new(pool.clone())),
            dashboard: DashboardService::new(DieselDashboardRepository::new(pool.clone())),
            admin_token: config.admin_token.clone(),
            store_url: config.store_url.clone(),
        }
    }
}
