//! Product records extracted from listing items
//!
//! Every record carries the full canonical field set regardless of which
//! columns the output schema asks for. Reconciliation against the schema
//! happens only at projection time (see [`crate::output::project`]).

use chrono::NaiveDate;
use serde_json::Value;

/// Canonical field names in their natural order
pub const CANONICAL_FIELDS: [&str; 17] = [
    "date",
    "l1_category",
    "l1_category_id",
    "l2_category",
    "l2_category_id",
    "store_id",
    "variant_id",
    "variant_name",
    "group_id",
    "selling_price",
    "mrp",
    "in_stock",
    "inventory",
    "is_sponsored",
    "image_url",
    "brand",
    "brand_id",
];

/// One normalized product listing
///
/// Fields copied from the upstream cart item keep their JSON type and are
/// `Value::Null` when the source omitted them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// Capture date of the run (UTC), identical for every record in a run
    pub date: NaiveDate,

    pub l1_category: String,
    pub l1_category_id: String,
    pub l2_category: String,
    pub l2_category_id: String,

    pub store_id: Value,
    pub variant_id: Value,
    pub variant_name: Value,
    pub group_id: Value,
    pub selling_price: Value,
    pub mrp: Value,

    /// Negation of the listing's sold-out flag
    pub in_stock: bool,

    pub inventory: Value,

    /// True when the listing carries the "AD" tracking badge
    pub is_sponsored: bool,

    pub image_url: Value,
    pub brand: Value,

    /// No upstream source; always null
    pub brand_id: Value,
}

impl ProductRecord {
    /// Looks up a field by its canonical name
    ///
    /// Returns `None` for names outside [`CANONICAL_FIELDS`].
    pub fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "date" => Value::String(self.date.format("%Y-%m-%d").to_string()),
            "l1_category" => Value::String(self.l1_category.clone()),
            "l1_category_id" => Value::String(self.l1_category_id.clone()),
            "l2_category" => Value::String(self.l2_category.clone()),
            "l2_category_id" => Value::String(self.l2_category_id.clone()),
            "store_id" => self.store_id.clone(),
            "variant_id" => self.variant_id.clone(),
            "variant_name" => self.variant_name.clone(),
            "group_id" => self.group_id.clone(),
            "selling_price" => self.selling_price.clone(),
            "mrp" => self.mrp.clone(),
            "in_stock" => Value::Bool(self.in_stock),
            "inventory" => self.inventory.clone(),
            "is_sponsored" => Value::Bool(self.is_sponsored),
            "image_url" => self.image_url.clone(),
            "brand" => self.brand.clone(),
            "brand_id" => self.brand_id.clone(),
            _ => return None,
        };
        Some(value)
    }
}
