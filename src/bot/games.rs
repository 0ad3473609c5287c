use rand::Rng;

use super::store::User;

/* Coin games.
 * The slot machine is split so that everything after the random draw
 * is a pure function of the drawn reels, and the fortune draw is a
 * uniform pick from a fixed list.
 */

pub const SLOT_COST: u64 = 1;
pub const SLOT_JACKPOT_REWARD: u64 = 500;
pub const SLOT_TRIPLE_REWARD: u64 = 75;

pub const FORTUNES: [&str; 5] = ["大吉", "中吉", "小吉", "末吉", "凶"];

// Three independent uniform digits, 0 through 9.
pub fn draw_reels(rng: &mut impl Rng) -> [u8; 3] {
    [
        rng.gen_range(0..=9),
        rng.gen_range(0..=9),
        rng.gen_range(0..=9),
    ]
}

// Reward for a drawn triple: 7-7-7 pays the jackpot, any other triple
// pays the flat reward, everything else pays nothing.
pub fn reward(reels: [u8; 3]) -> u64 {
    if reels[0] == reels[1] && reels[1] == reels[2] {
        if reels[0] == 7 {
            SLOT_JACKPOT_REWARD
        } else {
            SLOT_TRIPLE_REWARD
        }
    } else {
        0
    }
}

/* Settles one spin against a user's balance.
 * The cost is debited before any reward is credited. The caller has
 * already checked that the balance covers the cost.
 */
pub fn play_slot(user: &mut User, reels: [u8; 3]) -> String {
    user.debit(SLOT_COST);
    let digits = format!("{}{}{}", reels[0], reels[1], reels[2]);
    let win = reward(reels);
    if win > 0 {
        user.credit(win);
        format!("{digits} 当たり！{win}コイン獲得\n残り: {} コイン", user.coins)
    } else {
        format!("{digits} はずれ！\n残り: {} コイン", user.coins)
    }
}

// Uniform fortune draw. Stateless.
pub fn draw_fortune(rng: &mut impl Rng) -> &'static str {
    FORTUNES[rng.gen_range(0..FORTUNES.len())]
}

// Tests
#[cfg(test)]
mod tests {
    use super::{
        draw_fortune, draw_reels, play_slot, reward, FORTUNES, SLOT_JACKPOT_REWARD,
        SLOT_TRIPLE_REWARD,
    };
    use crate::bot::store::User;

    #[test]
    fn test_reward_tiers() {
        assert_eq!(reward([7, 7, 7]), SLOT_JACKPOT_REWARD);
        assert_eq!(reward([3, 3, 3]), SLOT_TRIPLE_REWARD);
        assert_eq!(reward([0, 0, 0]), SLOT_TRIPLE_REWARD);
        assert_eq!(reward([7, 7, 6]), 0);
        assert_eq!(reward([1, 2, 3]), 0);
    }

    // Losing spin nets exactly -1.
    #[test]
    fn test_losing_spin_debits_one() {
        let mut user = User::default();
        let reply = play_slot(&mut user, [1, 2, 3]);
        assert_eq!(user.coins, 19);
        assert!(reply.contains("123"));
        assert!(reply.contains("はずれ"));
        assert!(reply.contains("19"));
    }

    // Winning triple nets reward - 1; debit happens before the credit.
    #[test]
    fn test_winning_spin_nets_reward_minus_cost() {
        let mut user = User::default();
        play_slot(&mut user, [4, 4, 4]);
        assert_eq!(user.coins, 20 - 1 + SLOT_TRIPLE_REWARD);

        let mut user = User::default();
        let reply = play_slot(&mut user, [7, 7, 7]);
        assert_eq!(user.coins, 20 - 1 + SLOT_JACKPOT_REWARD);
        assert!(reply.contains("777"));
        assert!(reply.contains("当たり"));
    }

    #[test]
    fn test_draws_stay_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            for digit in draw_reels(&mut rng) {
                assert!(digit <= 9);
            }
            assert!(FORTUNES.contains(&draw_fortune(&mut rng)));
        }
    }
}
