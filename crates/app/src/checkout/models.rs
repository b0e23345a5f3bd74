//! Checkout Models

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use swiftshop::pricing::PricingSnapshot;
use thiserror::Error;

use crate::orders::Order;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Mpesa,
    Emola,
    Paypal,
    Qr,
    Face,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Card,
        PaymentMethod::Mpesa,
        PaymentMethod::Emola,
        PaymentMethod::Paypal,
        PaymentMethod::Qr,
        PaymentMethod::Face,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Emola => "emola",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Qr => "qr",
            PaymentMethod::Face => "face",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method `{0}`")]
pub struct UnknownPaymentMethod(String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();

        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownPaymentMethod(raw.to_string()))
    }
}

/// A confirmed order together with the client-side quote shown at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// Order as the server recorded it
    pub order: Order,

    /// Client-side totals; the server's prices on `order` are authoritative
    pub quote: PricingSnapshot<'static>,

    /// Payment method chosen
    pub method: PaymentMethod,
}

/// Link returned by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaypalLink {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// Payment created with the provider, awaiting customer approval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaypalOrder {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub links: Vec<PaypalLink>,
}

/// Outcome of capturing an approved payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaypalCapture {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A payment waiting for the customer to approve it in the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct PaypalApproval {
    /// Provider order id, needed to capture after approval
    pub paypal_order_id: String,

    /// Where to send the customer
    pub approval_url: Url,

    /// Amount charged, in US dollars
    pub usd_amount: Decimal,

    /// Totals the amount was derived from
    pub quote: PricingSnapshot<'static>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn payment_methods_parse_case_insensitively() -> TestResult {
        assert_eq!("MPESA".parse::<PaymentMethod>()?, PaymentMethod::Mpesa);
        assert_eq!(" paypal ".parse::<PaymentMethod>()?, PaymentMethod::Paypal);
        assert_eq!(
            "cash".parse::<PaymentMethod>(),
            Err(UnknownPaymentMethod("cash".to_string()))
        );

        Ok(())
    }

    #[test]
    fn paypal_order_tolerates_missing_links() -> TestResult {
        let order: PaypalOrder = serde_json::from_str(r#"{"id": "5O190127TN364715T"}"#)?;

        assert!(order.links.is_empty());

        Ok(())
    }
}
