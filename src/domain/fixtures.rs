//! Builders shared by unit tests.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use super::catalog::{Product, VatMode};

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal")
}

pub fn product(net: &str, gross: &str) -> Product {
    let now = Utc::now();
    let id = Uuid::new_v4();
    Product {
        id,
        sku: format!("SKU-{}", &id.simple().to_string()[..6]),
        slug: format!("product-{id}"),
        name_sk: "Test product".into(),
        name_cs: None,
        description_sk: None,
        description_cs: None,
        category_id: None,
        manufacturer: None,
        price_without_vat: dec(net),
        price_with_vat: dec(gross),
        original_price: None,
        purchase_price: None,
        vat_rate: dec("20"),
        vat_mode: VatMode::Standard,
        stock_quantity: 100,
        track_stock: true,
        low_stock_threshold: 5,
        main_image_url: None,
        gallery_images: vec![],
        is_active: true,
        is_featured: false,
        is_new: false,
        is_sale: false,
        is_bazaar: false,
        created_at: now,
        updated_at: now,
    }
}
