//! Listing response normalization
//!
//! Turns a parsed listing payload into flat [`ProductRecord`]s. Every lookup
//! into the payload is optional at every level: a missing or mistyped key
//! yields a null field, never an error.

use crate::input::Category;
use crate::record::ProductRecord;
use chrono::NaiveDate;
use serde_json::Value;

/// Path to the listing items array
const ITEMS_PATH: &[&str] = &["response", "snippets"];

/// Path from a listing item to its cart entry
const CART_PATH: &[&str] = &["data", "atc_action", "add_to_cart", "cart_item"];

/// Path from a listing item to its tracking badge
const BADGE_PATH: &[&str] = &["data", "tracking", "common_attributes", "badge"];

/// Badge marking a sponsored listing
const SPONSORED_BADGE: &str = "AD";

/// Result of normalizing one payload
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Records(Vec<ProductRecord>),

    /// The payload held no listing items
    NoData,
}

/// Maps listing payloads onto product records for one run
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    capture_date: NaiveDate,
}

impl ResponseNormalizer {
    /// `capture_date` is stamped on every record this normalizer produces
    pub fn new(capture_date: NaiveDate) -> Self {
        Self { capture_date }
    }

    pub fn capture_date(&self) -> NaiveDate {
        self.capture_date
    }

    pub fn normalize(&self, payload: &Value, category: &Category) -> Normalized {
        let items = listing_items(payload);
        if items.is_empty() {
            return Normalized::NoData;
        }

        Normalized::Records(
            items
                .iter()
                .map(|item| self.normalize_item(item, category))
                .collect(),
        )
    }

    fn normalize_item(&self, item: &Value, category: &Category) -> ProductRecord {
        let cart = lookup(item, CART_PATH);
        let cart_field = |key: &str| {
            cart.and_then(|cart| cart.get(key))
                .cloned()
                .unwrap_or(Value::Null)
        };

        ProductRecord {
            date: self.capture_date,
            l1_category: category.l1_name.clone(),
            l1_category_id: category.l1_id.clone(),
            l2_category: category.l2_name.clone(),
            l2_category_id: category.l2_id.clone(),
            store_id: cart_field("merchant_id"),
            variant_id: cart_field("product_id"),
            variant_name: cart_field("display_name"),
            group_id: cart_field("group_id"),
            selling_price: cart_field("price"),
            mrp: cart_field("mrp"),
            in_stock: !is_sold_out(item),
            inventory: cart_field("inventory"),
            is_sponsored: lookup(item, BADGE_PATH).and_then(Value::as_str) == Some(SPONSORED_BADGE),
            image_url: cart_field("image_url"),
            brand: cart_field("brand"),
            brand_id: Value::Null,
        }
    }
}

/// Listing items in the payload, or an empty slice if the path is missing
pub fn listing_items(payload: &Value) -> &[Value] {
    lookup(payload, ITEMS_PATH)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The item's sold-out flag read for truthiness; an absent flag counts as
/// sold out
fn is_sold_out(item: &Value) -> bool {
    lookup(item, &["data", "is_sold_out"]).map_or(true, is_truthy)
}

/// Null, false, zero and empty strings, arrays or objects are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}
