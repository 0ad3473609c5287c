use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/* Data model for the persisted snapshot.
 * A snapshot owns three mappings: users, keyword responses, and id responses.
 * All access from the rest of the bot goes through the accessors here,
 * never by reaching into the maps directly.
 */

pub const DEFAULT_COINS: u64 = 20;

// Member roles, declared in rank order so the derived Ord is the
// authorization order. Banned sits below Normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Banned,
    Normal,
    Deputy,
    Admin,
    Owner,
}

impl Role {
    // Numeric rank, Banned = -1 through Owner = 3.
    pub fn rank(&self) -> i8 {
        match self {
            Role::Banned => -1,
            Role::Normal => 0,
            Role::Deputy => 1,
            Role::Admin => 2,
            Role::Owner => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Banned => "ブラックメンバー",
            Role::Normal => "ノーマルメンバー",
            Role::Deputy => "副管理者",
            Role::Admin => "管理者",
            Role::Owner => "運営者",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub coins: u64,
    pub role: Role,
}

impl Default for User {
    fn default() -> User {
        User {
            coins: DEFAULT_COINS,
            role: Role::Normal,
        }
    }
}

impl User {
    // Adds coins to the balance.
    pub fn credit(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    // Removes coins from the balance, clamped at zero.
    pub fn debit(&mut self, amount: u64) {
        self.coins = self.coins.saturating_sub(amount);
    }
}

// The whole persisted state, read and written as one JSON blob.
// BTreeMaps keep listing commands deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: BTreeMap<String, User>,
    #[serde(default)]
    pub keywords: BTreeMap<String, String>,
    #[serde(default)]
    pub id_responses: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    // Looks up a user, creating the default record for unseen ids.
    pub fn ensure_user(&mut self, user_id: &str) -> &mut User {
        self.users.entry(user_id.to_string()).or_default()
    }

    /* Checks whether a user clears the given minimum role.
     * Unseen ids are compared as default (Normal) members without
     * being inserted; the caller decides when to create records.
     */
    pub fn is_authorized(&self, user_id: &str, min_role: Role) -> bool {
        let role = self.user(user_id).map(|user| user.role).unwrap_or(Role::Normal);
        role.rank() >= min_role.rank()
    }

    pub fn keyword_response(&self, text: &str) -> Option<&String> {
        self.keywords.get(text)
    }

    pub fn id_response(&self, user_id: &str) -> Option<&String> {
        self.id_responses.get(user_id)
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::{Role, Snapshot, User, DEFAULT_COINS};

    const ALL_ROLES: [Role; 5] = [
        Role::Banned,
        Role::Normal,
        Role::Deputy,
        Role::Admin,
        Role::Owner,
    ];

    #[test]
    fn test_role_order_is_total() {
        for window in ALL_ROLES.windows(2) {
            assert!(window[0] < window[1]);
            assert!(window[0].rank() < window[1].rank());
        }
    }

    // Exhaustive 5x5 matrix: authorized iff rank(user) >= rank(min).
    #[test]
    fn test_authorization_matrix() {
        let mut snapshot = Snapshot::default();
        for (i, role) in ALL_ROLES.iter().enumerate() {
            snapshot.ensure_user(&format!("U{i}")).role = *role;
        }

        for (i, user_role) in ALL_ROLES.iter().enumerate() {
            for min_role in ALL_ROLES.iter() {
                let expected = user_role.rank() >= min_role.rank();
                assert_eq!(
                    snapshot.is_authorized(&format!("U{i}"), *min_role),
                    expected,
                    "{user_role:?} against minimum {min_role:?}"
                );
            }
        }
    }

    #[test]
    fn test_unseen_user_is_treated_as_normal() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_authorized("ghost", Role::Normal));
        assert!(!snapshot.is_authorized("ghost", Role::Deputy));
    }

    #[test]
    fn test_default_user() {
        let user = User::default();
        assert_eq!(user.coins, DEFAULT_COINS);
        assert_eq!(user.role, Role::Normal);
    }

    #[test]
    fn test_debit_clamps_at_zero() {
        let mut user = User::default();
        user.debit(999);
        assert_eq!(user.coins, 0);
        user.debit(1);
        assert_eq!(user.coins, 0);
    }

    #[test]
    fn test_ensure_user_is_idempotent() {
        let mut snapshot = Snapshot::default();
        snapshot.ensure_user("U1").coins = 5;
        assert_eq!(snapshot.ensure_user("U1").coins, 5);
        assert_eq!(snapshot.users.len(), 1);
    }
}
