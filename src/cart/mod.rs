//! Cart
//!
//! Session-scoped, in-memory cart. Lines are grouped by `(product id, size)` and the subtotal is
//! derived from the current lines on every read.

use rusty_money::{Money, iso::Currency};

use crate::{
    prices::{Price, to_money},
    products::{Product, ProductId},
};

mod line;

pub use line::CartLine;

/// Smallest quantity the cart screens allow a user to pick.
pub const MIN_QUANTITY: u32 = 1;

/// Clamp a user-entered quantity to the minimum the screens allow.
///
/// [`CartStore::set_quantity`] does not clamp; callers are expected to do it first.
pub fn clamp_quantity(quantity: u32) -> u32 {
    quantity.max(MIN_QUANTITY)
}

/// Cart store
#[derive(Debug, Clone)]
pub struct CartStore {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl CartStore {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        CartStore {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line with the same product and size has its quantity increased; otherwise a new
    /// line is appended. Stock is not checked here, the order endpoint validates it.
    pub fn add_to_cart(
        &mut self,
        product: Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.is_keyed_by(product.id, size))
        {
            line.quantity = line.quantity.saturating_add(quantity);

            return;
        }

        self.lines.push(CartLine::new(
            product,
            quantity,
            size.map(str::to_string),
            color.map(str::to_string),
        ));
    }

    /// Remove lines for a product.
    ///
    /// With a size only that line goes; without one every size of the product is removed.
    pub fn remove_from_cart(&mut self, product_id: ProductId, size: Option<&str>) {
        self.lines.retain(|line| !line.matches(product_id, size));
    }

    /// Set the quantity of the matching line(s), using the same size rule as removal.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32, size: Option<&str>) {
        self.lines
            .iter_mut()
            .filter(|line| line.matches(product_id, size))
            .for_each(|line| line.quantity = quantity);
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals, computed from the current lines.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        let minor = self
            .lines
            .iter()
            .map(CartLine::line_total)
            .fold(Price::ZERO, |acc, total| {
                Price::new(acc.saturating_add(*total))
            });

        to_money(*minor, self.currency)
    }

    /// Cart lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Find the line keyed by `(product_id, size)`.
    pub fn line(&self, product_id: ProductId, size: Option<&str>) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.is_keyed_by(product_id, size))
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};

    use super::*;

    fn sneaker() -> Product {
        Product::new(5, "Sneaker", Price::new(120_00))
    }

    fn cap() -> Product {
        Product::new(9, "Cap", Price::new(35_50))
    }

    #[test]
    fn adding_same_product_and_size_merges_quantities() {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(sneaker(), 1, Some("42"), Some("azul"));
        cart.add_to_cart(sneaker(), 2, Some("42"), Some("preto"));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines().first().map(|line| line.quantity), Some(3));
        // the first colour chosen is kept
        assert_eq!(
            cart.line(ProductId::new(5), Some("42"))
                .and_then(|line| line.selected_color.as_deref()),
            Some("azul")
        );
    }

    #[test]
    fn different_sizes_are_distinct_lines() {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(sneaker(), 1, Some("42"), None);
        cart.add_to_cart(sneaker(), 1, Some("43"), None);
        cart.add_to_cart(sneaker(), 1, None, None);

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn remove_without_size_removes_every_size() {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(sneaker(), 1, Some("M"), None);
        cart.add_to_cart(sneaker(), 1, Some("G"), None);
        cart.add_to_cart(cap(), 1, None, None);

        cart.remove_from_cart(ProductId::new(5), None);

        assert_eq!(cart.len(), 1);
        assert!(cart.line(ProductId::new(9), None).is_some());
    }

    #[test]
    fn remove_with_size_removes_only_that_line() {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(sneaker(), 1, Some("M"), None);
        cart.add_to_cart(sneaker(), 1, Some("G"), None);

        cart.remove_from_cart(ProductId::new(5), Some("M"));

        assert_eq!(cart.len(), 1);
        assert!(cart.line(ProductId::new(5), Some("G")).is_some());
    }

    #[test]
    fn set_quantity_is_not_clamped() {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(cap(), 4, None, None);
        cart.set_quantity(ProductId::new(9), 0, None);

        assert_eq!(cart.lines().first().map(|line| line.quantity), Some(0));
        assert_eq!(cart.subtotal(), Money::from_minor(0, iso::MZN));
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(6), 6);
    }

    #[test]
    fn set_quantity_with_size_targets_one_line() {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(sneaker(), 1, Some("42"), None);
        cart.add_to_cart(sneaker(), 1, Some("43"), None);

        cart.set_quantity(ProductId::new(5), 4, Some("43"));

        assert_eq!(
            cart.line(ProductId::new(5), Some("42")).map(|l| l.quantity),
            Some(1)
        );
        assert_eq!(
            cart.line(ProductId::new(5), Some("43")).map(|l| l.quantity),
            Some(4)
        );
    }

    #[test]
    fn subtotal_tracks_every_mutation() {
        let mut cart = CartStore::new(iso::MZN);

        assert_eq!(cart.subtotal(), Money::from_minor(0, iso::MZN));

        cart.add_to_cart(sneaker(), 2, Some("42"), None);
        cart.add_to_cart(cap(), 1, None, None);
        assert_eq!(cart.subtotal(), Money::from_minor(275_50, iso::MZN));

        cart.set_quantity(ProductId::new(9), 3, None);
        assert_eq!(cart.subtotal(), Money::from_minor(346_50, iso::MZN));

        cart.remove_from_cart(ProductId::new(5), None);
        assert_eq!(cart.subtotal(), Money::from_minor(106_50, iso::MZN));

        cart.clear_cart();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::from_minor(0, iso::MZN));
    }
}
