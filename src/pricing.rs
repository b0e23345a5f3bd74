//! Pricing
//!
//! Shipping, coupon discount and grand total derived from a cart subtotal. Everything here is
//! pure; the only inputs are the subtotal, the number of lines and the coupon code entered.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::CartStore,
    coupons::{Coupon, CouponTable},
    prices::{Price, minor_units, to_money},
};

/// Subtotal at or above which shipping is free (200.00).
pub const FREE_SHIPPING_THRESHOLD: Price = Price::new(200_00);

/// Flat shipping fee for non-empty carts under the threshold (19.90).
pub const FLAT_SHIPPING_FEE: Price = Price::new(19_90);

/// Store pricing rules.
#[derive(Debug, Clone, Copy)]
pub struct PricingRules {
    currency: &'static Currency,
    free_shipping_threshold: Price,
    flat_shipping_fee: Price,
}

impl PricingRules {
    /// Default rules in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            free_shipping_threshold: FREE_SHIPPING_THRESHOLD,
            flat_shipping_fee: FLAT_SHIPPING_FEE,
        }
    }

    /// Override the free-shipping threshold.
    #[must_use]
    pub fn with_free_shipping_threshold(mut self, threshold: Price) -> Self {
        self.free_shipping_threshold = threshold;
        self
    }

    /// Override the flat shipping fee.
    #[must_use]
    pub fn with_flat_shipping_fee(mut self, fee: Price) -> Self {
        self.flat_shipping_fee = fee;
        self
    }

    /// Currency all amounts are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Free-shipping threshold.
    pub fn free_shipping_threshold(&self) -> Price {
        self.free_shipping_threshold
    }

    /// Flat shipping fee.
    pub fn flat_shipping_fee(&self) -> Price {
        self.flat_shipping_fee
    }
}

/// Derived totals for a cart. Never stored; recompute whenever the cart or coupon changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingSnapshot<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Shipping charged
    pub shipping_fee: Money<'a, Currency>,

    /// Coupon discount
    pub discount: Money<'a, Currency>,

    /// `max(0, subtotal + shipping - discount)`
    pub total: Money<'a, Currency>,

    /// The recognised coupon that produced the discount, if any
    pub coupon: Option<Coupon>,
}

impl PricingSnapshot<'_> {
    /// Whether shipping is free for this snapshot.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping_fee.to_minor_units() == 0
    }
}

/// Pricing calculator
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    rules: PricingRules,
    coupons: CouponTable,
}

impl PricingCalculator {
    /// Create a calculator with explicit rules and coupons.
    pub fn new(rules: PricingRules, coupons: CouponTable) -> Self {
        Self { rules, coupons }
    }

    /// Calculator with the default rules and coupon table.
    pub fn with_defaults(currency: &'static Currency) -> Self {
        Self::new(PricingRules::new(currency), CouponTable::default())
    }

    /// Pricing rules in use.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Coupon table in use.
    pub fn coupons(&self) -> &CouponTable {
        &self.coupons
    }

    /// Shipping fee for a subtotal.
    ///
    /// Free at or above the threshold, the flat fee for a non-empty cart below it, and nothing
    /// for an empty cart.
    pub fn shipping_fee(&self, subtotal: Price, line_count: usize) -> Price {
        if subtotal >= self.rules.free_shipping_threshold || line_count == 0 {
            Price::ZERO
        } else {
            self.rules.flat_shipping_fee
        }
    }

    /// Discount for a coupon code, capped at subtotal plus shipping. Unknown or missing codes
    /// give no discount.
    pub fn discount(&self, subtotal: Price, shipping_fee: Price, coupon_code: Option<&str>) -> Price {
        coupon_code
            .and_then(|code| self.coupons.lookup(code))
            .map_or(Price::ZERO, |coupon| {
                coupon_discount(coupon, subtotal, shipping_fee)
            })
    }

    /// Derive the full pricing snapshot.
    pub fn quote(
        &self,
        subtotal: Price,
        line_count: usize,
        coupon_code: Option<&str>,
    ) -> PricingSnapshot<'static> {
        let currency = self.rules.currency;
        let coupon = coupon_code.and_then(|code| self.coupons.lookup(code));
        let shipping_fee = self.shipping_fee(subtotal, line_count);

        let discount = coupon.map_or(Price::ZERO, |coupon| {
            coupon_discount(coupon, subtotal, shipping_fee)
        });
        let total = subtotal
            .saturating_add(*shipping_fee)
            .saturating_sub(*discount);

        PricingSnapshot {
            subtotal: subtotal.to_money(currency),
            shipping_fee: shipping_fee.to_money(currency),
            discount: discount.to_money(currency),
            total: to_money(total, currency),
            coupon,
        }
    }

    /// Quote the current contents of a cart.
    pub fn quote_cart(&self, cart: &CartStore, coupon_code: Option<&str>) -> PricingSnapshot<'static> {
        self.quote(
            Price::new(minor_units(&cart.subtotal())),
            cart.len(),
            coupon_code,
        )
    }
}

fn coupon_discount(coupon: Coupon, subtotal: Price, shipping_fee: Price) -> Price {
    let gross = Price::new(subtotal.saturating_add(*shipping_fee));

    let discount = match coupon {
        Coupon::PercentOffSubtotal(percent) => Price::new(percent_of_minor(&percent, *subtotal)),
        Coupon::FreeShipping => shipping_fee,
    };

    discount.min(gross)
}

/// Percentage of a minor-unit amount, rounded half away from zero.
///
/// Amounts that cannot be represented saturate rather than fail, so a quote is always produced.
pub fn percent_of_minor(percent: &Percentage, minor: u64) -> u64 {
    let Some(minor) = Decimal::from_u64(minor) else {
        return 0;
    };

    // decimal_percentage doesn't expose the underlying Decimal
    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .map(|applied| applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| {
            if rounded.is_sign_negative() {
                Some(0)
            } else {
                rounded.to_u64()
            }
        })
        .unwrap_or(u64::MAX)
}
