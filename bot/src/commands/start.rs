use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use shared::auth::code_redeemable;
use shared::entity::{telegram_link_tokens, users};
use teloxide::prelude::*;
use tracing::info;

use crate::state::AppState;

/// /start, optionally with a one-time link token from the CLI. Redeeming a
/// token binds this chat to the account so it receives notifications.
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
    token: String,
) -> Result<()> {
    let chat_id = msg.chat.id.0;
    let token = token.trim().to_string();

    if token.is_empty() {
        bot.send_message(
            msg.chat.id,
            "Welcome to ContractDesk. Request a link token in the CLI \
             (Telegram menu) and send it here as /start <token>.",
        )
        .await?;
        return Ok(());
    }

    let Some(link) = telegram_link_tokens::Entity::find()
        .filter(telegram_link_tokens::Column::Token.eq(&token))
        .one(state.db.as_ref())
        .await?
    else {
        bot.send_message(msg.chat.id, "That link token is not valid.")
            .await?;
        return Ok(());
    };

    let now = Utc::now();
    if !code_redeemable(link.used_at, Some(link.expires_at), now) {
        bot.send_message(msg.chat.id, "That link token expired or was already used.")
            .await?;
        return Ok(());
    }

    // One-time claim: the conditional UPDATE loses cleanly if the token was
    // redeemed concurrently between the read above and this write.
    let claimed = telegram_link_tokens::Entity::update_many()
        .col_expr(telegram_link_tokens::Column::UsedAt, Expr::value(now))
        .filter(telegram_link_tokens::Column::Id.eq(link.id))
        .filter(telegram_link_tokens::Column::UsedAt.is_null())
        .filter(telegram_link_tokens::Column::ExpiresAt.gt(now))
        .exec(state.db.as_ref())
        .await?;
    if claimed.rows_affected == 0 {
        bot.send_message(msg.chat.id, "That link token expired or was already used.")
            .await?;
        return Ok(());
    }

    let username = msg.from.as_ref().and_then(|u| u.username.clone());
    users::ActiveModel {
        id: Set(link.user_id),
        telegram_chat_id: Set(Some(chat_id)),
        telegram_username: Set(username),
        ..Default::default()
    }
    .update(state.db.as_ref())
    .await?;

    info!("Linked chat {} to user {}", chat_id, link.user_id);
    bot.send_message(
        msg.chat.id,
        "Account linked. You will receive contract and withdrawal updates here. \
         Try /balance or /contracts.",
    )
    .await?;
    Ok(())
}
