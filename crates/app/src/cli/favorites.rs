use clap::{Args, Subcommand};
use swiftshop::products::ProductId;
use swiftshop_app::context::AppContext;
use tracing::warn;

#[derive(Debug, Args)]
pub(crate) struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Debug, Subcommand)]
enum FavoritesSubcommand {
    /// List favourite product ids
    List,

    /// Add or remove a product
    Toggle {
        /// Product id
        product_id: u64,
    },
}

pub(crate) async fn run(context: &AppContext, command: FavoritesCommand) -> Result<(), String> {
    let mut sessions = context.session_store();
    let session = sessions.restore().await;

    let mut store = context.favorites_store();

    if let Err(error) = store.hydrate(session).await {
        warn!("showing locally saved favourites: {error}");
    }

    match command.command {
        FavoritesSubcommand::List => {
            if store.favorites().is_empty() {
                println!("no favourites yet");
            }

            for id in store.favorites().iter() {
                println!("{id}");
            }
        }
        FavoritesSubcommand::Toggle { product_id } => {
            let id = ProductId::new(product_id);
            let toggle = store.toggle_favorite(id);

            if let Some(sync) = toggle.sync {
                sync.outcome()
                    .await
                    .map_err(|error| format!("saved locally, server sync failed: {error}"))?;
            }

            if toggle.is_favorite {
                println!("{id} added to favourites");
            } else {
                println!("{id} removed from favourites");
            }
        }
    }

    Ok(())
}
