use std::sync::Arc;

use anyhow::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use shared::entity::{contracts, users};
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::state::AppState;

async fn linked_user(
    state: &AppState,
    chat_id: i64,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::TelegramChatId.eq(chat_id))
        .one(state.db.as_ref())
        .await
}

const NOT_LINKED: &str =
    "This chat is not linked yet. Request a token in the CLI and send /start <token>.";

pub async fn handle_balance(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(user) = linked_user(&state, msg.chat.id.0).await? else {
        bot.send_message(msg.chat.id, NOT_LINKED).await?;
        return Ok(());
    };

    bot.send_message(
        msg.chat.id,
        format!(
            "Available for withdrawal: <b>{} USDT</b>",
            user.available_for_withdraw
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

pub async fn handle_contracts(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(user) = linked_user(&state, msg.chat.id.0).await? else {
        bot.send_message(msg.chat.id, NOT_LINKED).await?;
        return Ok(());
    };

    let contracts = contracts::Entity::find()
        .filter(contracts::Column::UserId.eq(user.id))
        .order_by_desc(contracts::Column::Id)
        .all(state.db.as_ref())
        .await?;
    if contracts.is_empty() {
        bot.send_message(msg.chat.id, "You have no contracts yet.")
            .await?;
        return Ok(());
    }

    let mut text = String::from("<b>Your contracts</b>\n");
    for c in contracts {
        text.push_str(&format!(
            "\n#{} - {} USDT, {} days, {}",
            c.id, c.amount, c.duration_days, c.status
        ));
    }
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
