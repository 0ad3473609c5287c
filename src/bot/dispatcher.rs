use std::sync::Arc;

use teloxide::{prelude::*, RequestError};

use super::processor::{self, ProcessError};
use super::store::Store;

/* Dispatcher is the front-facing agent of the bot.
 * It receives messages from the platform, hands each one to the
 * processor, and sends back at most one text reply per message.
 * It communicates only with the Processor; platform concerns stay
 * here and never reach the core.
 */

/* Types */
pub type HandlerResult = Result<(), BotError>;

#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("Process error: {0}")]
    ProcessError(ProcessError),
    #[error("Request error: {0}")]
    RequestError(RequestError),
}

// Implement the From trait to convert from ProcessError to BotError
impl From<ProcessError> for BotError {
    fn from(process_error: ProcessError) -> BotError {
        BotError::ProcessError(process_error)
    }
}

// Implement the From trait to convert from RequestError to BotError
impl From<RequestError> for BotError {
    fn from(request_error: RequestError) -> BotError {
        BotError::RequestError(request_error)
    }
}

/* Main Dispatch function */
pub async fn run_dispatcher(bot: Bot, store: Arc<Store>) {
    let schema = Update::filter_message().endpoint(handle_update);

    Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![store])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/* One inbound event.
 * Non-text messages and messages without a sender are ignored.
 * A failed event is logged and acknowledged, so it never blocks the
 * other events in the same batch. Send failures propagate to the
 * dispatcher's error handler and are not retried.
 */
async fn handle_update(bot: Bot, msg: Message, store: Arc<Store>) -> HandlerResult {
    let (Some(text), Some(from)) = (msg.text(), msg.from()) else {
        return Ok(());
    };
    let sender_id = from.id.to_string();

    match processor::handle_message(&store, &sender_id, text) {
        Ok(Some(reply)) => {
            bot.send_message(msg.chat.id, reply).await?;
        }
        Ok(None) => {}
        Err(error) => {
            // The reply is withheld; the mutation was not persisted.
            log::error!("Failed to handle message from {sender_id}: {error}");
        }
    }

    Ok(())
}
