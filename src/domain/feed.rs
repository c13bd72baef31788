//! Heureka product feed (`<SHOP>` of `<SHOPITEM>`).

use std::fmt::Write;

use super::catalog::Product;
use super::money::{round2, to_f64};

const DESCRIPTION_LIMIT: usize = 500;
const MAX_ALTERNATIVE_IMAGES: usize = 3;
const CATEGORY_ROOT: &str = "Elektronika";

/// A product together with the name of its category, if any.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub product: Product,
    pub category_name: Option<String>,
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Drops markup, collapses whitespace and cuts to the feed limit.
pub fn plain_description(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(DESCRIPTION_LIMIT).collect()
}

fn element(out: &mut String, name: &str, value: &str) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "    <{name}>{}</{name}>", escape_xml(value));
}

/// Renders the feed. Callers pass active products; items without stock are
/// skipped here.
pub fn render_heureka(store_url: &str, entries: &[FeedEntry]) -> String {
    let base = store_url.trim_end_matches('/');
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<SHOP>\n");
    for entry in entries {
        let p = &entry.product;
        if !p.is_active || p.stock_quantity <= 0 {
            continue;
        }
        out.push_str("  <SHOPITEM>\n");
        element(&mut out, "ITEM_ID", &p.id.to_string());
        element(&mut out, "PRODUCTNAME", &p.name_sk);
        element(&mut out, "PRODUCT", &p.name_sk);
        element(
            &mut out,
            "DESCRIPTION",
            &plain_description(p.description_sk.as_deref().unwrap_or_default()),
        );
        element(&mut out, "URL", &format!("{base}/product/{}", p.id));
        if let Some(image) = &p.main_image_url {
            element(&mut out, "IMGURL", image);
        }
        for image in p.gallery_images.iter().take(MAX_ALTERNATIVE_IMAGES) {
            element(&mut out, "IMGURL_ALTERNATIVE", image);
        }
        element(&mut out, "PRICE_VAT", &round2(&p.price_with_vat).to_string());
        element(&mut out, "VAT", &format!("{}%", to_f64(&p.vat_rate)));
        let category = match &entry.category_name {
            Some(name) => format!("{CATEGORY_ROOT} | {name}"),
            None => CATEGORY_ROOT.to_string(),
        };
        element(&mut out, "CATEGORYTEXT", &category);
        if let Some(manufacturer) = &p.manufacturer {
            element(&mut out, "MANUFACTURER", manufacturer);
        }
        element(&mut out, "DELIVERY_DATE", "0");
        out.push_str("  </SHOPITEM>\n");
    }
    out.push_str("</SHOP>\n");
    out
}
