//! Products

use std::collections::BTreeMap;

use crate::{ids::TypedId, prices::Price};

/// Product Id
pub type ProductId = TypedId<Product>;

/// Catalog product snapshot.
///
/// Owned by the remote catalog; cart lines keep a copy taken when the product was added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price
    pub price: Price,

    /// Units in stock across all sizes
    pub stock: u32,

    /// Free-text description
    pub description: Option<String>,

    /// Legacy flat category
    pub category: Option<String>,

    /// Top-level category (e.g. "Calçados")
    pub main_category: Option<String>,

    /// Sub-category within the main category
    pub sub_category: Option<String>,

    /// Stock per size, for size-variant products
    pub size_stock: BTreeMap<String, u32>,

    /// Colours available per size
    pub size_colors: BTreeMap<String, Vec<String>>,
}

impl Product {
    /// Create a product with just the fields pricing needs.
    pub fn new(id: u64, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    /// Whether the product is sold in sizes (footwear, apparel).
    pub fn is_size_variant(&self) -> bool {
        !self.size_stock.is_empty() || !self.size_colors.is_empty()
    }

    /// Sizes offered, in sorted order.
    pub fn sizes(&self) -> impl Iterator<Item = &str> {
        let mut sizes: Vec<&str> = self
            .size_stock
            .keys()
            .chain(self.size_colors.keys())
            .map(String::as_str)
            .collect();

        sizes.sort_unstable();
        sizes.dedup();

        sizes.into_iter()
    }

    /// Colours offered for a size; empty when the size is unknown.
    pub fn colors_for(&self, size: &str) -> &[String] {
        self.size_colors.get(size).map_or(&[], Vec::as_slice)
    }

    /// Stock for a size, falling back to the overall stock for products without sizes.
    pub fn stock_for(&self, size: Option<&str>) -> u32 {
        match size {
            Some(size) if self.is_size_variant() => {
                self.size_stock.get(size).copied().unwrap_or_default()
            }
            _ => self.stock,
        }
    }
}
