//! Favorites

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::products::ProductId;

/// Set of favourite product ids.
///
/// Membership is O(1); iteration follows insertion order so lists render stably. Serialises as
/// a plain JSON array of ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct FavoriteSet {
    order: Vec<ProductId>,
    index: FxHashSet<ProductId>,
}

impl FavoriteSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check membership.
    pub fn contains(&self, product: ProductId) -> bool {
        self.index.contains(&product)
    }

    /// Add a product. Returns `false` if it was already present.
    pub fn insert(&mut self, product: ProductId) -> bool {
        if !self.index.insert(product) {
            return false;
        }

        self.order.push(product);

        true
    }

    /// Remove a product. Returns `false` if it was not present.
    pub fn remove(&mut self, product: ProductId) -> bool {
        if !self.index.remove(&product) {
            return false;
        }

        self.order.retain(|id| *id != product);

        true
    }

    /// Flip membership and return the new state.
    pub fn toggle(&mut self, product: ProductId) -> bool {
        if self.remove(product) {
            false
        } else {
            self.insert(product)
        }
    }

    /// Ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ProductId> {
        self.order.iter().copied()
    }

    /// Number of favourites.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no favourites.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl From<Vec<ProductId>> for FavoriteSet {
    fn from(ids: Vec<ProductId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<FavoriteSet> for Vec<ProductId> {
    fn from(set: FavoriteSet) -> Self {
        set.order
    }
}

impl FromIterator<ProductId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        let mut set = FavoriteSet::new();

        for id in iter {
            set.insert(id);
        }

        set
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn ids(values: &[u64]) -> Vec<ProductId> {
        values.iter().copied().map(ProductId::new).collect()
    }

    #[test]
    fn double_toggle_restores_membership() {
        let mut set = FavoriteSet::from(ids(&[1, 2]));

        assert!(!set.toggle(ProductId::new(2)));
        assert!(set.toggle(ProductId::new(2)));
        assert!(set.contains(ProductId::new(2)));

        assert!(set.toggle(ProductId::new(3)));
        assert!(!set.toggle(ProductId::new(3)));
        assert!(!set.contains(ProductId::new(3)));
    }

    #[test]
    fn duplicates_collapse_and_order_is_kept() {
        let set = FavoriteSet::from(ids(&[4, 1, 4, 2]));

        assert_eq!(set.iter().collect::<Vec<_>>(), ids(&[4, 1, 2]));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn serialises_as_json_array() -> TestResult {
        let set = FavoriteSet::from(ids(&[3, 1]));

        assert_eq!(serde_json::to_string(&set)?, "[3,1]");
        assert_eq!(serde_json::from_str::<FavoriteSet>("[1,1,5]")?, FavoriteSet::from(ids(&[1, 5])));

        Ok(())
    }
}
