use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveTime};
use tokio::task::JoinHandle;

use super::store::{Role, Snapshot, Store, DEFAULT_COINS};

/* Daily coin reset.
 * A background task sleeps until the next local midnight, then runs
 * one sweep over all users and persists the snapshot once. Banned
 * users are always skipped.
 */

// How the sweep treats each non-banned user. Exactly one variant runs;
// the two are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    // Raise the balance to at least this many coins.
    Floor(u64),
    // Add this many coins regardless of balance.
    Grant(u64),
}

impl ResetPolicy {
    pub const DEFAULT: ResetPolicy = ResetPolicy::Floor(DEFAULT_COINS);

    // Parses "floor:<n>" or "grant:<n>".
    pub fn parse(raw: &str) -> Option<ResetPolicy> {
        let (kind, amount) = raw.split_once(':')?;
        let amount = amount.trim().parse().ok()?;
        match kind.trim() {
            "floor" => Some(ResetPolicy::Floor(amount)),
            "grant" => Some(ResetPolicy::Grant(amount)),
            _ => None,
        }
    }

    pub fn from_env() -> ResetPolicy {
        match std::env::var("COIN_RESET_POLICY") {
            Ok(raw) => ResetPolicy::parse(&raw).unwrap_or_else(|| {
                log::warn!("Unrecognized COIN_RESET_POLICY '{raw}', using the default");
                ResetPolicy::DEFAULT
            }),
            Err(_) => ResetPolicy::DEFAULT,
        }
    }
}

// One sweep. Returns how many balances changed.
pub fn apply_reset(snapshot: &mut Snapshot, policy: ResetPolicy) -> usize {
    let mut touched = 0;
    for user in snapshot.users.values_mut() {
        if user.role == Role::Banned {
            continue;
        }
        let before = user.coins;
        match policy {
            ResetPolicy::Floor(floor) => {
                if user.coins < floor {
                    user.coins = floor;
                }
            }
            ResetPolicy::Grant(amount) => user.credit(amount),
        }
        if user.coins != before {
            touched += 1;
        }
    }
    touched
}

fn until_next_midnight(now: DateTime<Local>) -> Duration {
    let next = (now.date_naive() + Days::new(1)).and_time(NaiveTime::MIN);
    match next.and_local_timezone(Local).earliest() {
        Some(midnight) => (midnight - now).to_std().unwrap_or(Duration::from_secs(1)),
        // Midnight falls into a DST gap; check back in an hour.
        None => Duration::from_secs(3600),
    }
}

/* Spawns the reset task.
 * A failed persist is logged and the sweep retried at the next
 * midnight; the in-memory balances from a failed sweep still stand,
 * matching the at-least-once persistence of commands.
 */
pub fn spawn_daily_reset(store: Arc<Store>, policy: ResetPolicy) -> JoinHandle<()> {
    log::info!("Daily coin reset scheduled with policy {policy:?}");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(until_next_midnight(Local::now())).await;
            let swept = store.apply(|snapshot| {
                let touched = apply_reset(snapshot, policy);
                (touched, touched > 0)
            });
            match swept {
                Ok(touched) => log::info!("Daily coin reset touched {touched} users"),
                Err(error) => log::error!("Daily coin reset failed to persist: {error}"),
            }
        }
    })
}
