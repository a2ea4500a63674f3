use std::collections::HashSet;

use serde::Serialize;

use crate::store::KeyStore;

/// Distinct key and product counts across a store.
///
/// Counting is case-sensitive on the stored strings, which is what the final
/// report shows; it is not the folded identity used for merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Snapshot {
    pub keys: usize,
    pub products: usize,
}

/// Growth between a baseline snapshot and a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Delta {
    pub new_keys: usize,
    pub new_products: usize,
}

impl Snapshot {
    pub fn of(store: &KeyStore) -> Self {
        let sets = store.sets();
        let keys: HashSet<&str> = sets
            .iter()
            .flat_map(|s| s.keys.iter().map(String::as_str))
            .collect();
        let products: HashSet<&str> = sets
            .iter()
            .flat_map(|s| s.products.iter().map(String::as_str))
            .collect();
        Self {
            keys: keys.len(),
            products: products.len(),
        }
    }

    pub fn delta_since(&self, baseline: &Snapshot) -> Delta {
        Delta {
            new_keys: self.keys.saturating_sub(baseline.keys),
            new_products: self.products.saturating_sub(baseline.products),
        }
    }
}
