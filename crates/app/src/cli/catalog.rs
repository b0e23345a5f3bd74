use clap::Args;
use swiftshop::prices::to_money;
use swiftshop_app::{context::AppContext, products::models::ProductFilters};

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Free-text search
    #[arg(long)]
    query: Option<String>,

    /// Top-level category, e.g. "Vestuário"
    #[arg(long)]
    main_category: Option<String>,

    /// Sub-category, e.g. "Sapato"
    #[arg(long)]
    sub_category: Option<String>,
}

pub(crate) async fn run(context: &AppContext, args: ProductsArgs) -> Result<(), String> {
    let filters = ProductFilters {
        main_category: args.main_category,
        sub_category: args.sub_category,
        ..ProductFilters::search(args.query.unwrap_or_default())
    };

    let products = context
        .products
        .list_products(filters)
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    for product in products {
        let sizes: Vec<&str> = product.sizes().collect();

        println!(
            "{:>5}  {:<32} {:>12}  stock {}{}",
            product.id,
            product.name,
            to_money(*product.price, rusty_money::iso::MZN).to_string(),
            product.stock,
            if sizes.is_empty() {
                String::new()
            } else {
                format!("  sizes {}", sizes.join(","))
            }
        );
    }

    Ok(())
}
