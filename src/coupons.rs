//! Coupons
//!
//! A fixed table of user-enterable codes. Codes that are not in the table are ineffective rather
//! than rejected.

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;

/// Ten percent off the subtotal.
pub const SWIFT10: &str = "SWIFT10";

/// Free shipping.
pub const FRETEGRATIS: &str = "FRETEGRATIS";

/// English alias of [`FRETEGRATIS`].
pub const FREESHIP: &str = "FREESHIP";

/// The rule a recognised coupon applies.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Coupon {
    /// Take a percentage off the subtotal (e.g. "10% off").
    PercentOffSubtotal(Percentage),

    /// Offset the whole shipping fee.
    FreeShipping,
}

/// Normalise a user-entered code the way the lookup table stores it.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Coupon lookup table.
#[derive(Debug, Clone)]
pub struct CouponTable {
    coupons: FxHashMap<String, Coupon>,
}

impl CouponTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            coupons: FxHashMap::default(),
        }
    }

    /// Register a code, replacing any rule it already had.
    #[must_use]
    pub fn with(mut self, code: &str, coupon: Coupon) -> Self {
        self.coupons.insert(normalize_code(code), coupon);

        self
    }

    /// Look up a user-entered code.
    pub fn lookup(&self, code: &str) -> Option<Coupon> {
        self.coupons.get(&normalize_code(code)).copied()
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the table has no codes.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl Default for CouponTable {
    fn default() -> Self {
        CouponTable::empty()
            .with(SWIFT10, Coupon::PercentOffSubtotal(Percentage::from(0.10)))
            .with(FRETEGRATIS, Coupon::FreeShipping)
            .with(FREESHIP, Coupon::FreeShipping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let table = CouponTable::default();

        assert_eq!(
            table.lookup("  swift10 "),
            Some(Coupon::PercentOffSubtotal(Percentage::from(0.10)))
        );
        assert_eq!(table.lookup("FreteGratis"), Some(Coupon::FreeShipping));
        assert_eq!(table.lookup("freeship"), Some(Coupon::FreeShipping));
    }

    #[test]
    fn unknown_codes_are_not_found() {
        let table = CouponTable::default();

        assert_eq!(table.lookup("FOO"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn with_overrides_existing_rule() {
        let table = CouponTable::empty()
            .with("vip", Coupon::FreeShipping)
            .with("VIP", Coupon::PercentOffSubtotal(Percentage::from(0.5)));

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup("vip"),
            Some(Coupon::PercentOffSubtotal(Percentage::from(0.5)))
        );
    }
}
