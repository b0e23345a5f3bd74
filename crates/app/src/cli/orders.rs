use rusty_money::iso;
use swiftshop_app::context::AppContext;

pub(crate) async fn run(context: &AppContext) -> Result<(), String> {
    super::signed_in(context).await?;

    let orders = context
        .orders
        .list_orders()
        .await
        .map_err(|error| format!("failed to list orders: {}", error.user_message()))?;

    if orders.is_empty() {
        println!("no orders yet");
        return Ok(());
    }

    for order in orders {
        let total = order
            .items_total()
            .map(|total| total.to_money(iso::MZN).to_string())
            .unwrap_or_else(|_error| "?".to_string());

        println!(
            "#{:<6} {:<11} {}  {} item(s)  {}",
            order.id,
            order.status,
            order.created_at.strftime("%Y-%m-%d %H:%M"),
            order.item_count(),
            total
        );
    }

    Ok(())
}
