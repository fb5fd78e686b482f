//! Product model and request shapes
//!
//! Category references are addressed by name throughout the write API; the
//! resolved categories are materialized on the product only at read time.
//! Prices are fixed-point decimals end to end, never binary floats.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Category;

/// Product with its materialized category set (sorted by category id).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<Category>,
}

/// Create product request. `categories` holds category names.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Partial-field product patch.
///
/// Field absence and field emptiness are distinct for `categories`:
/// `None` leaves the existing association set untouched, `Some(vec![])`
/// clears it (full replacement with the empty set).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl ProductPatch {
    /// True when no field is present at all. A categories-only patch is a
    /// valid update.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.categories.is_none()
    }

    /// True when any of the scalar columns needs an UPDATE statement.
    pub fn has_scalar_fields(&self) -> bool {
        self.name.is_some() || self.description.is_some() || self.price.is_some()
    }
}
