//! Payments
//!
//! PayPal charges in US dollars; store totals are converted at a configured rate.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Method, Url};
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use tracing::info;

use crate::{
    api::{ApiClient, ApiError},
    checkout::{
        PaymentError,
        models::{PaypalCapture, PaypalLink, PaypalOrder},
    },
};

/// Default meticais per US dollar.
pub const DEFAULT_USD_RATE: Decimal = Decimal::from_parts(63, 0, 0, false, 0);

/// Smallest amount PayPal is asked to charge.
pub const MIN_USD_AMOUNT: Decimal = Decimal::ONE;

/// Deep link the provider redirects to after approval.
pub const PAYPAL_RETURN_URL: &str = "swiftshop://paypal-return";

/// Convert a store total into the dollar amount to charge: `max(1.00, round2(total / rate))`.
///
/// # Errors
///
/// Returns an error when the rate is zero or negative.
pub fn usd_amount(total: &Money<'_, Currency>, rate: Decimal) -> Result<Decimal, PaymentError> {
    if rate <= Decimal::ZERO {
        return Err(PaymentError::InvalidRate(rate));
    }

    let usd = (*total.amount() / rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(usd.max(MIN_USD_AMOUNT))
}

/// Pick the `approve` link and make sure it carries a `return_url`.
///
/// # Errors
///
/// Returns an error when there is no approve link or it is not a valid URL.
pub fn approval_url(links: &[PaypalLink], return_url: &str) -> Result<Url, PaymentError> {
    let href = links
        .iter()
        .find(|link| link.rel == "approve")
        .map(|link| link.href.as_str())
        .ok_or(PaymentError::MissingApprovalLink)?;

    let mut url =
        Url::parse(href).map_err(|error| PaymentError::InvalidApprovalLink(error.to_string()))?;

    if !url.query_pairs().any(|(key, _)| key == "return_url") {
        url.query_pairs_mut().append_pair("return_url", return_url);
    }

    Ok(url)
}

#[derive(Debug, Clone)]
pub struct HttpPaymentsService {
    api: ApiClient,
}

impl HttpPaymentsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PaymentsService for HttpPaymentsService {
    async fn create_paypal_order(&self, total_usd: Decimal) -> Result<PaypalOrder, ApiError> {
        let builder = self
            .api
            .request(Method::POST, "/payments/paypal/create")?
            .query(&[("total_value", total_usd.to_string())]);

        let order: PaypalOrder = self.api.execute(builder).await?;

        info!(paypal_order_id = %order.id, %total_usd, "paypal payment created");

        Ok(order)
    }

    async fn capture_paypal_order(&self, paypal_order_id: &str) -> Result<PaypalCapture, ApiError> {
        let builder = self
            .api
            .request(Method::POST, &format!("/payments/paypal/capture/{paypal_order_id}"))?;

        self.api.execute(builder).await
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Create a PayPal payment for a dollar amount.
    async fn create_paypal_order(&self, total_usd: Decimal) -> Result<PaypalOrder, ApiError>;

    /// Capture a payment the customer approved.
    async fn capture_paypal_order(&self, paypal_order_id: &str) -> Result<PaypalCapture, ApiError>;
}
