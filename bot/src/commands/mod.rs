use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::state::AppState;

pub mod account;
pub mod start;

pub use account::{handle_balance, handle_contracts};
pub use start::handle_start;

/// ContractDesk notifications and account lookups.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Link your account: /start <token from the CLI>
    Start(String),
    /// Show your withdrawable balance
    Balance,
    /// List your contracts
    Contracts,
    /// Show this help
    Help,
}

pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

pub async fn handle_invalid(bot: Bot, msg: Message, _state: Arc<AppState>) -> Result<()> {
    bot.send_message(
        msg.chat.id,
        "Unknown command. Send /help to see what I can do.",
    )
    .await?;
    Ok(())
}
