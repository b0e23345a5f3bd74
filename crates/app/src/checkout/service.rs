//! Checkout service.
//!
//! Turns the local cart into a server order. The cart is cleared only once the server has
//! accepted the order.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use swiftshop::{cart::CartStore, pricing::PricingCalculator};
use tracing::{info, warn};

use crate::{
    checkout::{
        CheckoutError, PaymentsService,
        models::{PaymentMethod, PaypalApproval, PlacedOrder},
        payments::{DEFAULT_USD_RATE, PAYPAL_RETURN_URL, approval_url, usd_amount},
    },
    orders::{OrderRequest, OrdersService},
};

pub struct Checkout {
    pricing: PricingCalculator,
    orders: Arc<dyn OrdersService>,
    payments: Arc<dyn PaymentsService>,
    usd_rate: Decimal,
    return_url: String,
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout")
            .field("pricing", &self.pricing)
            .field("usd_rate", &self.usd_rate)
            .field("return_url", &self.return_url)
            .finish_non_exhaustive()
    }
}

impl Checkout {
    #[must_use]
    pub fn new(
        pricing: PricingCalculator,
        orders: Arc<dyn OrdersService>,
        payments: Arc<dyn PaymentsService>,
    ) -> Self {
        Self {
            pricing,
            orders,
            payments,
            usd_rate: DEFAULT_USD_RATE,
            return_url: PAYPAL_RETURN_URL.to_string(),
        }
    }

    /// Meticais per US dollar used for PayPal.
    #[must_use]
    pub fn with_usd_rate(mut self, usd_rate: Decimal) -> Self {
        self.usd_rate = usd_rate;
        self
    }

    /// Deep link PayPal returns to after approval.
    #[must_use]
    pub fn with_return_url(mut self, return_url: impl Into<String>) -> Self {
        self.return_url = return_url.into();
        self
    }

    #[must_use]
    pub fn pricing(&self) -> &PricingCalculator {
        &self.pricing
    }

    /// Place an order paid outside PayPal.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart,
    /// [`CheckoutError::ApprovalRequired`] for PayPal, or the server's error. The cart is left
    /// untouched on any error.
    pub async fn place_order(
        &self,
        cart: &mut CartStore,
        method: PaymentMethod,
        coupon: Option<&str>,
    ) -> Result<PlacedOrder, CheckoutError> {
        if method == PaymentMethod::Paypal {
            return Err(CheckoutError::ApprovalRequired);
        }

        self.submit(cart, method, coupon).await
    }

    /// Create a PayPal payment for the cart and return where the customer approves it.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty cart, a bad exchange rate, or a provider failure.
    pub async fn begin_paypal(
        &self,
        cart: &CartStore,
        coupon: Option<&str>,
    ) -> Result<PaypalApproval, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let quote = self.pricing.quote_cart(cart, coupon);
        let usd_amount = usd_amount(&quote.total, self.usd_rate)?;

        let paypal_order = self
            .payments
            .create_paypal_order(usd_amount)
            .await
            .map_err(|error| CheckoutError::Payment(error.into()))?;

        let approval_url = approval_url(&paypal_order.links, &self.return_url)?;

        Ok(PaypalApproval {
            paypal_order_id: paypal_order.id,
            approval_url,
            usd_amount,
            quote,
        })
    }

    /// Capture an approved PayPal payment, then place the order.
    ///
    /// # Errors
    ///
    /// Returns an error when the capture or the order fails. The cart is only cleared once the
    /// order is created.
    pub async fn complete_paypal(
        &self,
        cart: &mut CartStore,
        paypal_order_id: &str,
        coupon: Option<&str>,
    ) -> Result<PlacedOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let capture = self
            .payments
            .capture_paypal_order(paypal_order_id)
            .await
            .map_err(|error| CheckoutError::Payment(error.into()))?;

        info!(
            paypal_order_id,
            status = capture.status.as_deref().unwrap_or("unknown"),
            "paypal payment captured"
        );

        self.submit(cart, PaymentMethod::Paypal, coupon).await
    }

    async fn submit(
        &self,
        cart: &mut CartStore,
        method: PaymentMethod,
        coupon: Option<&str>,
    ) -> Result<PlacedOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let quote = self.pricing.quote_cart(cart, coupon);

        let order = self
            .orders
            .create_order(OrderRequest::from_cart(cart))
            .await
            .inspect_err(|error| warn!(%method, "order rejected: {error}"))
            .map_err(CheckoutError::Order)?;

        cart.clear_cart();

        info!(order_id = %order.id, %method, total = %quote.total, "order placed");

        Ok(PlacedOrder {
            order,
            quote,
            method,
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use swiftshop::{prices::Price, products::Product};
    use testresult::TestResult;

    use super::*;
    use crate::{
        checkout::{
            MockPaymentsService,
            models::{PaypalCapture, PaypalLink, PaypalOrder},
        },
        orders::{MockOrdersService, OrderId},
        test::fixtures,
    };

    fn cart() -> CartStore {
        let mut cart = CartStore::new(iso::MZN);

        cart.add_to_cart(Product::new(1, "Camisa", Price::new(80_00)), 2, Some("M"), None);

        cart
    }

    fn checkout(orders: MockOrdersService, payments: MockPaymentsService) -> Checkout {
        Checkout::new(
            PricingCalculator::with_defaults(iso::MZN),
            Arc::new(orders),
            Arc::new(payments),
        )
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_without_calling_server() {
        let mut orders = MockOrdersService::new();
        orders.expect_create_order().never();

        let checkout = checkout(orders, MockPaymentsService::new());
        let mut cart = CartStore::new(iso::MZN);

        let result = checkout.place_order(&mut cart, PaymentMethod::Card, None).await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn successful_order_clears_cart() -> TestResult {
        let mut orders = MockOrdersService::new();
        orders.expect_create_order().times(1).returning(|request| {
            assert_eq!(request.items.len(), 1);
            assert_eq!(request.items[0].quantity, 2);

            Ok(fixtures::order(40))
        });

        let checkout = checkout(orders, MockPaymentsService::new());
        let mut cart = cart();

        let placed = checkout
            .place_order(&mut cart, PaymentMethod::Mpesa, Some("swift10"))
            .await?;

        assert!(cart.is_empty());
        assert_eq!(placed.order.id, OrderId::new(40));
        assert_eq!(placed.method, PaymentMethod::Mpesa);
        assert_eq!(placed.quote.discount.to_minor_units(), 16_00);
        assert_eq!(placed.quote.total.to_minor_units(), 160_00 + 19_90 - 16_00);

        Ok(())
    }

    #[tokio::test]
    async fn failed_order_keeps_cart() {
        let mut orders = MockOrdersService::new();
        orders
            .expect_create_order()
            .returning(|_| Err(fixtures::status_error(400)));

        let checkout = checkout(orders, MockPaymentsService::new());
        let mut cart = cart();

        let result = checkout.place_order(&mut cart, PaymentMethod::Card, None).await;

        assert!(matches!(result, Err(CheckoutError::Order(_))));
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn paypal_goes_through_approval() {
        let checkout = checkout(MockOrdersService::new(), MockPaymentsService::new());
        let mut cart = cart();

        let result = checkout.place_order(&mut cart, PaymentMethod::Paypal, None).await;

        assert!(matches!(result, Err(CheckoutError::ApprovalRequired)));
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn paypal_flow_converts_captures_and_places() -> TestResult {
        let mut payments = MockPaymentsService::new();
        payments
            .expect_create_paypal_order()
            .withf(|usd| *usd == Decimal::new(2_86, 2))
            .times(1)
            .returning(|_| {
                Ok(PaypalOrder {
                    id: "PAY-1".to_string(),
                    status: Some("CREATED".to_string()),
                    links: vec![PaypalLink {
                        href: "https://www.sandbox.paypal.com/checkoutnow?token=PAY-1".to_string(),
                        rel: "approve".to_string(),
                        method: Some("GET".to_string()),
                    }],
                })
            });
        payments
            .expect_capture_paypal_order()
            .withf(|id| id == "PAY-1")
            .times(1)
            .returning(|_| {
                Ok(PaypalCapture {
                    id: Some("PAY-1".to_string()),
                    status: Some("COMPLETED".to_string()),
                })
            });

        let mut orders = MockOrdersService::new();
        orders
            .expect_create_order()
            .times(1)
            .returning(|_| Ok(fixtures::order(41)));

        let checkout = checkout(orders, payments);
        let mut cart = cart();

        let approval = checkout.begin_paypal(&cart, None).await?;

        assert_eq!(approval.paypal_order_id, "PAY-1");
        assert!(approval.approval_url.as_str().contains("return_url=swiftshop"));
        assert_eq!(cart.len(), 1);

        let placed = checkout
            .complete_paypal(&mut cart, &approval.paypal_order_id, None)
            .await?;

        assert_eq!(placed.method, PaymentMethod::Paypal);
        assert!(cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn failed_capture_keeps_cart() {
        let mut payments = MockPaymentsService::new();
        payments
            .expect_capture_paypal_order()
            .returning(|_| Err(fixtures::status_error(422)));

        let mut orders = MockOrdersService::new();
        orders.expect_create_order().never();

        let checkout = checkout(orders, payments);
        let mut cart = cart();

        let result = checkout.complete_paypal(&mut cart, "PAY-2", None).await;

        assert!(matches!(result, Err(CheckoutError::Payment(_))));
        assert_eq!(cart.len(), 1);
    }
}
