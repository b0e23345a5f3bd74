use clap::{Parser, Subcommand};
use swiftshop_app::{config::ClientConfig, context::AppContext};

mod account;
mod cart;
mod catalog;
mod favorites;
mod orders;
mod support;

#[derive(Debug, Parser)]
#[command(name = "swiftshop", about = "SwiftShop storefront client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login(account::LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Browse the catalog
    Products(catalog::ProductsArgs),

    /// Price a cart without ordering
    Quote(cart::QuoteArgs),

    /// Order a cart
    Checkout(cart::CheckoutArgs),

    /// List or toggle favourites
    Favorites(favorites::FavoritesCommand),

    /// List your orders
    Orders,

    /// Support conversation
    Support(support::SupportCommand),
}

impl Cli {
    /// Load configuration and arguments, reading `.env` first.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let context = AppContext::from_config(self.config)
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Login(args) => account::login(&context, args).await,
            Commands::Logout => account::logout(&context),
            Commands::Whoami => account::whoami(&context).await,
            Commands::Products(args) => catalog::run(&context, args).await,
            Commands::Quote(args) => cart::quote(&context, args).await,
            Commands::Checkout(args) => cart::checkout(&context, args).await,
            Commands::Favorites(command) => favorites::run(&context, command).await,
            Commands::Orders => orders::run(&context).await,
            Commands::Support(command) => support::run(&context, command).await,
        }
    }
}

/// Restore the stored session, failing when nobody is signed in.
async fn signed_in(context: &AppContext) -> Result<swiftshop_app::auth::SessionStore, String> {
    let mut sessions = context.session_store();

    if !sessions.restore().await.is_authenticated() {
        return Err("not signed in; run `swiftshop login` first".to_string());
    }

    Ok(sessions)
}
