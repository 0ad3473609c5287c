use super::commands::{self, Request};
use super::store::{Role, Snapshot, Store, StoreError};

/* Processor is the logic center of the bot.
 * It receives one inbound event from the front-facing dispatcher and
 * routes it against the store: banned senders are dropped, canned
 * responses short-circuit, and everything else goes through the
 * command registry with an authorization check.
 * Each event is handled independently and to completion; there is no
 * conversation state.
 */

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("{0}")]
    StoreError(StoreError),
}

// Implement the From trait to convert from StoreError to ProcessError
impl From<StoreError> for ProcessError {
    fn from(store_error: StoreError) -> ProcessError {
        ProcessError::StoreError(store_error)
    }
}

/* Handles one inbound text event, returning the reply to send, if any.
 * The whole of routing and mutation runs as one critical section on
 * the store; the snapshot is persisted before this returns whenever
 * anything changed, including the lazy creation of the sender.
 */
pub fn handle_message(
    store: &Store,
    sender_id: &str,
    text: &str,
) -> Result<Option<String>, ProcessError> {
    let reply = store.apply(|snapshot| route(snapshot, sender_id, text))?;
    Ok(reply)
}

/* Routing precedence:
 *   1. banned sender: drop silently
 *   2. exact keyword match: canned reply
 *   3. sender has an id response: canned reply
 *   4. command registry, first match wins; unauthorized or unmatched
 *      text produces no reply
 */
fn route(snapshot: &mut Snapshot, sender_id: &str, text: &str) -> (Option<String>, bool) {
    // First contact from an unseen id creates the default record.
    let created = snapshot.user(sender_id).is_none();
    let sender = snapshot.ensure_user(sender_id);

    if sender.role == Role::Banned {
        return (None, created);
    }

    if let Some(response) = snapshot.keyword_response(text) {
        return (Some(response.clone()), created);
    }

    if let Some(response) = snapshot.id_response(sender_id) {
        return (Some(response.clone()), created);
    }

    let args: Vec<&str> = text.split(':').collect();
    let Some(spec) = commands::find(text, &args) else {
        return (None, created);
    };

    // Unauthorized callers get silence, not an error: command
    // existence is not leaked below its minimum role.
    if !snapshot.is_authorized(sender_id, spec.min_role) {
        return (None, created);
    }

    let effect = (spec.run)(
        snapshot,
        &Request {
            sender_id,
            args: &args,
        },
    );
    (effect.reply, created || effect.dirty)
}
