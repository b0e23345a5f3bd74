//! Cart Lines

use crate::{
    prices::Price,
    products::{Product, ProductId},
};

/// One (product, size) entry in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Product snapshot taken when the line was created
    pub product: Product,

    /// Units of the product
    pub quantity: u32,

    /// Size chosen for size-variant products
    pub selected_size: Option<String>,

    /// Colour chosen; informational only
    pub selected_color: Option<String>,
}

impl CartLine {
    /// Create a new line.
    pub fn new(
        product: Product,
        quantity: u32,
        selected_size: Option<String>,
        selected_color: Option<String>,
    ) -> Self {
        Self {
            product,
            quantity,
            selected_size,
            selected_color,
        }
    }

    /// Product id of the line.
    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// Whether this line is the one keyed by `(product_id, size)`.
    pub(crate) fn is_keyed_by(&self, product_id: ProductId, size: Option<&str>) -> bool {
        self.product.id == product_id && self.selected_size.as_deref() == size
    }

    /// Whether this line matches a removal or update filter.
    ///
    /// A missing size matches every size of the product.
    pub(crate) fn matches(&self, product_id: ProductId, size: Option<&str>) -> bool {
        self.product.id == product_id
            && size.is_none_or(|size| self.selected_size.as_deref() == Some(size))
    }
}
