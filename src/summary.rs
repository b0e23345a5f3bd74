//! Cart Summary
//!
//! Text rendering of a cart and its pricing, the way the cart screen lays it out.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{cart::CartStore, pricing::PricingSnapshot};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Writing to the output failed.
    #[error("failed to write cart summary")]
    Io(#[from] io::Error),
}

/// A cart paired with the pricing computed for it.
#[derive(Debug)]
pub struct CartSummary<'a> {
    cart: &'a CartStore,
    pricing: &'a PricingSnapshot<'a>,
}

impl<'a> CartSummary<'a> {
    /// Pair a cart with its pricing.
    pub fn new(cart: &'a CartStore, pricing: &'a PricingSnapshot<'a>) -> Self {
        Self { cart, pricing }
    }

    /// Render the line table.
    pub fn lines_table(&self) -> String {
        let mut builder = Builder::default();
        let currency = self.cart.currency();

        builder.push_record(["Product", "Size", "Colour", "Qty", "Unit", "Total"]);

        for line in self.cart.lines() {
            builder.push_record([
                line.product.name.clone(),
                line.selected_size.clone().unwrap_or_default(),
                line.selected_color.clone().unwrap_or_default(),
                line.quantity.to_string(),
                format!("{}", line.product.price.to_money(currency)),
                format!("{}", line.line_total().to_money(currency)),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(3..6), Alignment::right());

        table.to_string()
    }

    /// Summary rows as `(label, value)` pairs.
    ///
    /// Shipping reads "Free" when nothing is charged; the discount row only appears when a
    /// discount applies.
    pub fn totals(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![("Subtotal", format!("{}", self.pricing.subtotal))];

        rows.push((
            "Shipping",
            if self.pricing.has_free_shipping() {
                "Free".to_string()
            } else {
                format!("{}", self.pricing.shipping_fee)
            },
        ));

        if is_positive(&self.pricing.discount) {
            rows.push(("Discount", format!("- {}", self.pricing.discount)));
        }

        rows.push(("Total", format!("{}", self.pricing.total)));

        rows
    }

    /// Write the table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if the output cannot be written.
    pub fn write_to(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        writeln!(out, "{}", self.lines_table())?;

        let totals = self.totals();
        let label_width = totals.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

        for (label, value) in totals {
            writeln!(out, " {label:<label_width$}  {value:>14}")?;
        }

        Ok(())
    }
}

fn is_positive(money: &Money<'_, Currency>) -> bool {
    money.to_minor_units() > 0
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;
    use crate::{pricing::PricingCalculator, prices::Price, products::Product};

    fn cart() -> CartStore {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(Product::new(1, "Sneaker", Price::new(60_00)), 2, Some("42"), Some("azul"));

        cart
    }

    #[test]
    fn totals_hide_discount_when_none() {
        let cart = cart();
        let pricing = PricingCalculator::with_defaults(iso::MZN).quote_cart(&cart, None);
        let summary = CartSummary::new(&cart, &pricing);

        let labels: Vec<_> = summary.totals().into_iter().map(|(label, _)| label).collect();

        assert_eq!(labels, ["Subtotal", "Shipping", "Total"]);
    }

    #[test]
    fn totals_show_discount_and_free_shipping() {
        let mut cart = cart();
        cart.add_to_cart(Product::new(2, "Cap", Price::new(100_00)), 1, None, None);

        let pricing = PricingCalculator::with_defaults(iso::MZN).quote_cart(&cart, Some("SWIFT10"));
        let summary = CartSummary::new(&cart, &pricing);
        let totals = summary.totals();

        assert_eq!(totals.len(), 4);
        assert!(totals.contains(&("Shipping", "Free".to_string())));
    }

    #[test]
    fn write_to_includes_every_line() -> TestResult {
        let cart = cart();
        let pricing = PricingCalculator::with_defaults(iso::MZN).quote_cart(&cart, None);
        let mut out = Vec::new();

        CartSummary::new(&cart, &pricing).write_to(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Sneaker"), "missing product row: {text}");
        assert!(text.contains("azul"), "missing colour: {text}");
        assert!(text.contains("Total"), "missing total: {text}");

        Ok(())
    }
}
