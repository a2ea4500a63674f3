use serde::{Deserialize, Serialize};

use crate::fold;

// ---------------------------------------------------------------------------
// Key set
// ---------------------------------------------------------------------------

/// A cluster of product labels and license keys treated as one entity.
///
/// Serialized with `Products` / `Keys` field names, which is the layout of
/// previously exported key files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySet {
    pub products: Vec<String>,
    pub keys: Vec<String>,
}

impl KeySet {
    pub fn new(product: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            products: vec![product.into()],
            keys: vec![key.into()],
        }
    }

    pub fn has_product(&self, product: &str) -> bool {
        fold::contains(&self.products, product)
    }

    pub fn has_key(&self, key: &str) -> bool {
        fold::contains(&self.keys, key)
    }

    /// Shares at least one key or one product with `other`.
    pub fn overlaps(&self, other: &KeySet) -> bool {
        fold::overlaps(&self.keys, &other.keys) || fold::overlaps(&self.products, &other.products)
    }

    /// Deduplicate both lists and sort products ordinally.
    pub fn normalize(&mut self) {
        fold::dedup(&mut self.keys);
        fold::dedup(&mut self.products);
        self.products.sort();
    }

    /// Append every key and product of `other` not already present.
    pub fn absorb(&mut self, other: KeySet) {
        for key in other.keys {
            fold::push_unique(&mut self.keys, &key);
        }
        for product in other.products {
            fold::push_unique(&mut self.products, &product);
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts handed to reporting once consolidation is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_keys: usize,
    pub total_products: usize,
    pub new_keys: usize,
    pub new_products: usize,
    pub key_sets: usize,
}
