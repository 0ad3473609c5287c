use super::games;
use super::store::{Role, Snapshot};

/* Command registry.
 * One declarative table maps each command pattern to its minimum role
 * and handler, in fixed precedence order. The dispatcher-facing
 * processor picks the first matching entry; handlers never check
 * authorization themselves.
 *
 * Handlers report whether they mutated the snapshot, so the store only
 * persists commands that changed something. Malformed arguments are a
 * silent no-op: no reply, no mutation.
 */

pub struct Request<'a> {
    pub sender_id: &'a str,
    pub args: &'a [&'a str],
}

pub struct Effect {
    pub reply: Option<String>,
    pub dirty: bool,
}

impl Effect {
    fn reply(text: String) -> Effect {
        Effect {
            reply: Some(text),
            dirty: false,
        }
    }

    fn mutated(text: String) -> Effect {
        Effect {
            reply: Some(text),
            dirty: true,
        }
    }

    fn silent() -> Effect {
        Effect {
            reply: None,
            dirty: false,
        }
    }
}

pub enum Pattern {
    // Whole message equals the command name; no arguments.
    Exact(&'static str),
    // First colon-delimited token equals the name, with at least one
    // argument after it.
    Prefixed(&'static str),
}

impl Pattern {
    fn matches(&self, text: &str, args: &[&str]) -> bool {
        match self {
            Pattern::Exact(name) => text == *name,
            Pattern::Prefixed(name) => args.len() >= 2 && args[0] == *name,
        }
    }
}

pub type Handler = fn(&mut Snapshot, &Request) -> Effect;

pub struct CommandSpec {
    pub pattern: Pattern,
    pub min_role: Role,
    pub run: Handler,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        pattern: Pattern::Exact("check"),
        min_role: Role::Normal,
        run: cmd_check_self,
    },
    CommandSpec {
        pattern: Pattern::Exact("情報"),
        min_role: Role::Normal,
        run: cmd_info,
    },
    CommandSpec {
        pattern: Pattern::Exact("スロット"),
        min_role: Role::Normal,
        run: cmd_slot,
    },
    CommandSpec {
        pattern: Pattern::Exact("おみくじ"),
        min_role: Role::Normal,
        run: cmd_fortune,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("chat"),
        min_role: Role::Deputy,
        run: cmd_set_id_response,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("notchat"),
        min_role: Role::Deputy,
        run: cmd_delete_id_response,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("key"),
        min_role: Role::Deputy,
        run: cmd_set_keyword,
    },
    CommandSpec {
        pattern: Pattern::Exact("notkey"),
        min_role: Role::Deputy,
        run: cmd_clear_keywords,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("check"),
        min_role: Role::Deputy,
        run: cmd_check_target,
    },
    CommandSpec {
        pattern: Pattern::Exact("権限者一覧"),
        min_role: Role::Deputy,
        run: cmd_list_privileged,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("givebu"),
        min_role: Role::Admin,
        run: cmd_ban,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("notgivebu"),
        min_role: Role::Admin,
        run: cmd_unban,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("副官付与"),
        min_role: Role::Admin,
        run: cmd_grant_deputy,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("副官削除"),
        min_role: Role::Admin,
        run: cmd_revoke_deputy,
    },
    CommandSpec {
        pattern: Pattern::Exact("ブラックリスト一覧"),
        min_role: Role::Admin,
        run: cmd_list_banned,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("coingive"),
        min_role: Role::Owner,
        run: cmd_give_coins,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("allcoingive"),
        min_role: Role::Owner,
        run: cmd_give_coins_all,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("notcoingive"),
        min_role: Role::Owner,
        run: cmd_take_coins,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("管理者付与"),
        min_role: Role::Owner,
        run: cmd_grant_admin,
    },
    CommandSpec {
        pattern: Pattern::Prefixed("管理者削除"),
        min_role: Role::Owner,
        run: cmd_revoke_admin,
    },
    CommandSpec {
        pattern: Pattern::Exact("参加者一覧"),
        min_role: Role::Owner,
        run: cmd_list_all,
    },
];

// First matching entry wins; unmatched text is not a command.
pub fn find(text: &str, args: &[&str]) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.pattern.matches(text, args))
}

// Inserts the default record for unseen ids, reporting whether one was
// created. Targeted commands admit unknown ids rather than rejecting
// them.
fn admit(snapshot: &mut Snapshot, user_id: &str) -> bool {
    if snapshot.user(user_id).is_some() {
        return false;
    }
    snapshot.ensure_user(user_id);
    true
}

fn set_role(snapshot: &mut Snapshot, user_id: &str, role: Role, confirmation: &str) -> Effect {
    snapshot.ensure_user(user_id).role = role;
    Effect::mutated(confirmation.to_string())
}

/* Handlers, in table order. */

fn cmd_check_self(_snapshot: &mut Snapshot, request: &Request) -> Effect {
    Effect::reply(format!("あなたのIDは {} です", request.sender_id))
}

fn cmd_info(snapshot: &mut Snapshot, request: &Request) -> Effect {
    let user = snapshot.ensure_user(request.sender_id);
    Effect::reply(format!(
        "ID: {}\nコイン: {}\n権限: {}",
        request.sender_id, user.coins, user.role
    ))
}

fn cmd_slot(snapshot: &mut Snapshot, request: &Request) -> Effect {
    let user = snapshot.ensure_user(request.sender_id);
    if user.coins < games::SLOT_COST {
        return Effect::reply("コインが足りません".to_string());
    }
    let reels = games::draw_reels(&mut rand::thread_rng());
    Effect::mutated(games::play_slot(user, reels))
}

fn cmd_fortune(_snapshot: &mut Snapshot, _request: &Request) -> Effect {
    let fortune = games::draw_fortune(&mut rand::thread_rng());
    Effect::reply(format!("あなたの運勢は・・・{fortune}！"))
}

// chat:<id>:<text...> — the response keeps any colons after the id.
fn cmd_set_id_response(snapshot: &mut Snapshot, request: &Request) -> Effect {
    if request.args.len() < 3 {
        return Effect::silent();
    }
    let response = request.args[2..].join(":");
    snapshot
        .id_responses
        .insert(request.args[1].to_string(), response);
    Effect::mutated("ID応答を登録しました".to_string())
}

fn cmd_delete_id_response(snapshot: &mut Snapshot, request: &Request) -> Effect {
    let removed = snapshot.id_responses.remove(request.args[1]).is_some();
    Effect {
        reply: Some("ID応答を削除しました".to_string()),
        dirty: removed,
    }
}

fn cmd_set_keyword(snapshot: &mut Snapshot, request: &Request) -> Effect {
    if request.args.len() < 3 {
        return Effect::silent();
    }
    snapshot
        .keywords
        .insert(request.args[1].to_string(), request.args[2].to_string());
    Effect::mutated("キーワードを登録しました".to_string())
}

fn cmd_clear_keywords(snapshot: &mut Snapshot, _request: &Request) -> Effect {
    snapshot.keywords.clear();
    Effect::mutated("キーワードをすべて削除しました".to_string())
}

fn cmd_check_target(snapshot: &mut Snapshot, request: &Request) -> Effect {
    let created = admit(snapshot, request.args[1]);
    let target = snapshot.ensure_user(request.args[1]);
    Effect {
        reply: Some(format!(
            "ID: {}\n権限: {}\nコイン: {}",
            request.args[1], target.role, target.coins
        )),
        dirty: created,
    }
}

fn cmd_list_privileged(snapshot: &mut Snapshot, _request: &Request) -> Effect {
    let listing = snapshot
        .users
        .iter()
        .filter(|(_, user)| user.role > Role::Normal)
        .map(|(id, user)| format!("ID: {}\n権限: {}", id, user.role))
        .collect::<Vec<_>>()
        .join("\n\n");
    if listing.is_empty() {
        Effect::reply("該当者なし".to_string())
    } else {
        Effect::reply(listing)
    }
}

fn cmd_ban(snapshot: &mut Snapshot, request: &Request) -> Effect {
    set_role(
        snapshot,
        request.args[1],
        Role::Banned,
        "ブラックメンバーに設定しました",
    )
}

fn cmd_unban(snapshot: &mut Snapshot, request: &Request) -> Effect {
    set_role(
        snapshot,
        request.args[1],
        Role::Normal,
        "ブラックメンバーを解除しました",
    )
}

fn cmd_grant_deputy(snapshot: &mut Snapshot, request: &Request) -> Effect {
    set_role(
        snapshot,
        request.args[1],
        Role::Deputy,
        "副管理者を付与しました",
    )
}

fn cmd_revoke_deputy(snapshot: &mut Snapshot, request: &Request) -> Effect {
    set_role(
        snapshot,
        request.args[1],
        Role::Normal,
        "副管理者を解除しました",
    )
}

fn cmd_list_banned(snapshot: &mut Snapshot, _request: &Request) -> Effect {
    let listing = snapshot
        .users
        .iter()
        .filter(|(_, user)| user.role == Role::Banned)
        .map(|(id, _)| id.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if listing.is_empty() {
        Effect::reply("ブラックメンバーはいません".to_string())
    } else {
        Effect::reply(listing)
    }
}

fn cmd_give_coins(snapshot: &mut Snapshot, request: &Request) -> Effect {
    let Some(amount) = parse_amount(request.args.get(2)) else {
        return Effect::silent();
    };
    snapshot.ensure_user(request.args[1]).credit(amount);
    Effect::mutated(format!("{amount} コイン付与しました"))
}

fn cmd_give_coins_all(snapshot: &mut Snapshot, request: &Request) -> Effect {
    let Some(amount) = parse_amount(request.args.get(1)) else {
        return Effect::silent();
    };
    for user in snapshot.users.values_mut() {
        if user.role != Role::Banned {
            user.credit(amount);
        }
    }
    Effect::mutated(format!("全ユーザーに {amount} コイン付与しました"))
}

fn cmd_take_coins(snapshot: &mut Snapshot, request: &Request) -> Effect {
    let Some(amount) = parse_amount(request.args.get(2)) else {
        return Effect::silent();
    };
    let target = snapshot.ensure_user(request.args[1]);
    target.debit(amount);
    Effect::mutated(format!(
        "{amount} コインを減らしました（残り: {}）",
        target.coins
    ))
}

fn cmd_grant_admin(snapshot: &mut Snapshot, request: &Request) -> Effect {
    set_role(
        snapshot,
        request.args[1],
        Role::Admin,
        "管理者を付与しました",
    )
}

fn cmd_revoke_admin(snapshot: &mut Snapshot, request: &Request) -> Effect {
    set_role(
        snapshot,
        request.args[1],
        Role::Normal,
        "管理者を解除しました",
    )
}

fn cmd_list_all(snapshot: &mut Snapshot, _request: &Request) -> Effect {
    let listing = snapshot
        .users
        .iter()
        .map(|(id, user)| format!("ID: {}\n権限: {}\nコイン: {}", id, user.role, user.coins))
        .collect::<Vec<_>>()
        .join("\n\n");
    if listing.is_empty() {
        Effect::reply("参加者がいません".to_string())
    } else {
        Effect::reply(listing)
    }
}

// Coin amounts must parse as a non-negative integer; anything else is
// a validation error handled by the caller as a silent no-op.
fn parse_amount(token: Option<&&str>) -> Option<u64> {
    token.and_then(|raw| raw.parse::<u64>().ok())
}
