pub mod cart;
pub mod catalog;
pub mod cms;
pub mod dashboard;
pub mod discount;
pub mod errors;
pub mod feed;
pub mod money;
pub mod newsletter;
pub mod order;
pub mod ports;
pub mod review;
pub mod shipping;
pub mod wishlist;

#[cfg(test)]
pub(crate) mod fixtures;
