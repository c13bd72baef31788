pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod cms_service;
pub mod dashboard_service;
pub mod discount_service;
pub mod newsletter_service;
pub mod order_service;
pub mod payment_service;
pub mod review_service;
pub mod shipping_service;
pub mod wishlist_service;

#[cfg(test)]
pub(crate) mod fakes;
