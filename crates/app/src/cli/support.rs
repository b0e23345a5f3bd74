use clap::{Args, Subcommand};
use rustc_hash::FxHashSet;
use swiftshop_app::{
    auth::UserId,
    context::AppContext,
    orders::OrderId,
    support::{Author, DeliveryState, MessageQuery, ThreadEntry},
};
use tokio::signal;

#[derive(Debug, Args)]
pub(crate) struct SupportCommand {
    /// Conversation about this order
    #[arg(long, global = true)]
    order_id: Option<u64>,

    /// Customer to talk to (admins only)
    #[arg(long, global = true)]
    user_id: Option<u64>,

    #[command(subcommand)]
    command: SupportSubcommand,
}

#[derive(Debug, Subcommand)]
enum SupportSubcommand {
    /// Follow the conversation until interrupted
    Tail,

    /// Send one message
    Send {
        /// Message text
        text: String,
    },
}

pub(crate) async fn run(context: &AppContext, command: SupportCommand) -> Result<(), String> {
    super::signed_in(context).await?;

    let conversation = MessageQuery::conversation(
        command.order_id.map(OrderId::new),
        command.user_id.map(UserId::new),
    );

    match command.command {
        SupportSubcommand::Tail => tail(context, conversation).await,
        SupportSubcommand::Send { text } => {
            let mut thread = context.message_thread(conversation);

            match thread.send(&text, None).await {
                None => Err("message is empty".to_string()),
                Some(Err(error)) => Err(format!("message not sent: {}", error.user_message())),
                Some(Ok(_key)) => {
                    println!("sent");
                    Ok(())
                }
            }
        }
    }
}

async fn tail(context: &AppContext, conversation: MessageQuery) -> Result<(), String> {
    let mut thread = context.message_thread(conversation);
    let (poller, mut events) = context.message_poller(conversation);
    let mut shown = FxHashSet::default();

    let interrupted = signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => break,
            event = events.recv() => {
                let Some(event) = event else { break };

                thread.apply(event);

                for entry in thread.entries() {
                    if shown.insert(entry.key) {
                        print_entry(entry);
                    }
                }
            }
        }
    }

    poller.shutdown().await;

    Ok(())
}

fn print_entry(entry: &ThreadEntry) {
    let who = match entry.author {
        Author::Me => "me",
        Author::Agent => "support",
    };

    let when = entry
        .at
        .map(|at| at.strftime("%H:%M").to_string())
        .unwrap_or_default();

    let state = match entry.state {
        DeliveryState::Delivered => "",
        DeliveryState::Sending => " (sending)",
        DeliveryState::Failed => " (failed)",
    };

    println!("[{when:>5}] {who}: {}{state}", entry.text);
}
