use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

mod commands;
mod state;

use crate::commands::{
    handle_balance, handle_contracts, handle_help, handle_invalid, handle_start, Command,
};
use crate::state::AppState;

fn schema() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(token)].endpoint(handle_start))
        .branch(case![Command::Balance].endpoint(handle_balance))
        .branch(case![Command::Contracts].endpoint(handle_contracts))
        .branch(case![Command::Help].endpoint(handle_help));

    Update::filter_message()
        .branch(command_handler)
        .branch(dptree::endpoint(handle_invalid))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting ContractDesk bot...");

    let app_state = Arc::new(AppState::new().await?);

    let bot = Bot::new(&app_state.config.telegram.bot_token);

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![app_state.clone()])
        .enable_ctrlc_handler()
        .build();

    tracing::info!("Bot is running and waiting for updates...");
    dispatcher.dispatch().await;

    Ok(())
}
