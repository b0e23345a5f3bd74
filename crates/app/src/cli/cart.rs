use std::{io, str::FromStr};

use clap::Args;
use rusty_money::iso;
use swiftshop::{cart::CartStore, pricing::PricingSnapshot, products::ProductId, summary::CartSummary};
use swiftshop_app::{checkout::PaymentMethod, context::AppContext};
use thiserror::Error;

/// Cart line given on the command line as `ID[:QTY[:SIZE]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemSpec {
    product_id: ProductId,
    quantity: u32,
    size: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ItemSpecError {
    #[error("invalid product id `{0}`")]
    ProductId(String),

    #[error("invalid quantity `{0}`")]
    Quantity(String),

    #[error("expected ID[:QTY[:SIZE]], got `{0}`")]
    Format(String),
}

impl FromStr for ItemSpec {
    type Err = ItemSpecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(3, ':');

        let id = parts.next().unwrap_or_default().trim();
        let product_id = id
            .parse::<u64>()
            .map(ProductId::new)
            .map_err(|_parse| ItemSpecError::ProductId(id.to_string()))?;

        let quantity = match parts.next().map(str::trim) {
            None => 1,
            Some(quantity) => quantity
                .parse::<u32>()
                .ok()
                .filter(|quantity| *quantity > 0)
                .ok_or_else(|| ItemSpecError::Quantity(quantity.to_string()))?,
        };

        let size = match parts.next().map(str::trim) {
            None => None,
            Some("") => return Err(ItemSpecError::Format(value.to_string())),
            Some(size) => Some(size.to_string()),
        };

        Ok(Self {
            product_id,
            quantity,
            size,
        })
    }
}

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Cart line as ID[:QTY[:SIZE]]; repeat for more lines
    #[arg(long = "item", required = true)]
    items: Vec<ItemSpec>,

    /// Coupon code
    #[arg(long)]
    coupon: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    #[command(flatten)]
    cart: QuoteArgs,

    /// Payment method
    #[arg(long, default_value_t = PaymentMethod::Card)]
    method: PaymentMethod,

    /// Approved PayPal order to capture
    #[arg(long)]
    paypal_order: Option<String>,
}

pub(crate) async fn quote(context: &AppContext, args: QuoteArgs) -> Result<(), String> {
    let cart = build_cart(context, &args.items).await?;
    let pricing = context
        .checkout()
        .pricing()
        .quote_cart(&cart, args.coupon.as_deref());

    print_summary(&cart, &pricing)
}

pub(crate) async fn checkout(context: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    super::signed_in(context).await?;

    let mut cart = build_cart(context, &args.cart.items).await?;
    let coupon = args.cart.coupon.as_deref();
    let checkout = context.checkout();

    let placed = match (args.method, args.paypal_order) {
        (PaymentMethod::Paypal, None) => {
            let approval = checkout
                .begin_paypal(&cart, coupon)
                .await
                .map_err(|error| error.user_message())?;

            print_summary(&cart, &approval.quote)?;

            println!("paypal_order: {}", approval.paypal_order_id);
            println!("amount: {} USD", approval.usd_amount);
            println!("approve at: {}", approval.approval_url);
            println!("then re-run with --paypal-order {}", approval.paypal_order_id);

            return Ok(());
        }
        (PaymentMethod::Paypal, Some(paypal_order)) => checkout
            .complete_paypal(&mut cart, &paypal_order, coupon)
            .await
            .map_err(|error| error.user_message())?,
        (_, Some(_)) => return Err("--paypal-order needs --method paypal".to_string()),
        (method, None) => checkout
            .place_order(&mut cart, method, coupon)
            .await
            .map_err(|error| error.user_message())?,
    };

    println!("order: {}", placed.order.id);
    println!("status: {}", placed.order.status);
    println!("method: {}", placed.method);
    println!("total: {}", placed.quote.total);

    Ok(())
}

async fn build_cart(context: &AppContext, items: &[ItemSpec]) -> Result<CartStore, String> {
    let mut cart = CartStore::new(iso::MZN);

    for item in items {
        let product = context
            .products
            .get_product(item.product_id)
            .await
            .map_err(|error| format!("failed to load product {}: {error}", item.product_id))?;

        if let Some(size) = &item.size
            && !product.sizes().any(|offered| offered == size.as_str())
        {
            return Err(format!("{} is not sold in size {size}", product.name));
        }

        cart.add_to_cart(product, item.quantity, item.size.as_deref(), None);
    }

    Ok(cart)
}

fn print_summary(cart: &CartStore, pricing: &PricingSnapshot<'_>) -> Result<(), String> {
    CartSummary::new(cart, pricing)
        .write_to(&mut io::stdout().lock())
        .map_err(|error| format!("failed to print cart: {error}"))
}
