//! SwiftShop prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartLine, CartStore, MIN_QUANTITY, clamp_quantity},
    coupons::{Coupon, CouponTable},
    favorites::FavoriteSet,
    ids::TypedId,
    prices::{Price, PriceError},
    pricing::{PricingCalculator, PricingRules, PricingSnapshot},
    products::{Product, ProductId},
    summary::{CartSummary, SummaryError},
};
