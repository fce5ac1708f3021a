//! Coins, score and the bet ladder.

use crate::config::BetConfig;
use crate::error::{GameError, GameResult};

/// The shared economy every spend and reward goes through.
///
/// Coins are unsigned and only ever debited through [`Wallet::try_spend`],
/// which refuses without mutating when the balance is short.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    score: u64,
    coins: u64,
    bet: u64,
    ladder: Vec<u64>,
    total_bet: u64,
    total_win: u64,
}

impl Wallet {
    pub fn new(initial_score: u64, initial_coins: u64, bets: &BetConfig) -> Self {
        Self {
            score: initial_score,
            coins: initial_coins,
            bet: bets.default_bet,
            ladder: bets.ladder.clone(),
            total_bet: 0,
            total_win: 0,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn total_bet(&self) -> u64 {
        self.total_bet
    }

    pub fn total_win(&self) -> u64 {
        self.total_win
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.coins >= amount
    }

    /// Debit `amount` or fail with `InsufficientFunds`, leaving coins untouched.
    pub fn try_spend(&mut self, amount: u64) -> GameResult<()> {
        if self.coins < amount {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        log::debug!("Spent {} coins, {} left", amount, self.coins);
        Ok(())
    }

    /// Pay for one shot or strike at the current bet. Returns the bet paid.
    pub fn place_bet(&mut self) -> GameResult<u64> {
        let bet = self.bet;
        self.try_spend(bet)?;
        self.total_bet += bet;
        Ok(bet)
    }

    /// Add score, doubled while a double-score effect is active. Returns the
    /// points actually added.
    pub fn credit_score(&mut self, points: u64, doubled: bool) -> u64 {
        let points = if doubled { points * 2 } else { points };
        self.score = self.score.saturating_add(points);
        points
    }

    pub fn credit_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
        self.total_win = self.total_win.saturating_add(amount);
    }

    /// Select a bet from the ladder.
    pub fn set_bet(&mut self, bet: u64) -> GameResult<()> {
        if !self.ladder.contains(&bet) {
            return Err(GameError::InvalidBet(bet));
        }
        self.bet = bet;
        Ok(())
    }

    /// Step one rung up the ladder. Returns false at the top.
    pub fn increase_bet(&mut self) -> bool {
        match self.ladder.iter().position(|&b| b == self.bet) {
            Some(i) if i + 1 < self.ladder.len() => {
                self.bet = self.ladder[i + 1];
                true
            }
            _ => false,
        }
    }

    /// Step one rung down the ladder. Returns false at the bottom.
    pub fn decrease_bet(&mut self) -> bool {
        match self.ladder.iter().position(|&b| b == self.bet) {
            Some(i) if i > 0 => {
                self.bet = self.ladder[i - 1];
                true
            }
            _ => false,
        }
    }

    pub fn is_bankrupt_score(&self) -> bool {
        self.score == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(coins: u64) -> Wallet {
        Wallet::new(
            10_000,
            coins,
            &BetConfig {
                default_bet: 5,
                ladder: vec![1, 2, 5, 10],
            },
        )
    }

    #[test]
    fn spend_refuses_without_mutation() {
        let mut w = wallet(3);
        let err = w.place_bet().unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { needed: 5, available: 3 }));
        assert_eq!(w.coins(), 3);
        assert_eq!(w.total_bet(), 0);
    }

    #[test]
    fn place_bet_tracks_totals() {
        let mut w = wallet(100);
        assert_eq!(w.place_bet().unwrap(), 5);
        w.credit_coins(7);
        assert_eq!(w.coins(), 102);
        assert_eq!(w.total_bet(), 5);
        assert_eq!(w.total_win(), 7);
    }

    #[test]
    fn double_score_doubles_credit() {
        let mut w = wallet(0);
        assert_eq!(w.credit_score(10, true), 20);
        assert_eq!(w.credit_score(10, false), 10);
        assert_eq!(w.score(), 10_030);
    }

    #[test]
    fn bet_stays_on_ladder() {
        let mut w = wallet(0);
        assert!(matches!(w.set_bet(3), Err(GameError::InvalidBet(3))));
        assert_eq!(w.bet(), 5);
        assert!(w.increase_bet());
        assert_eq!(w.bet(), 10);
        assert!(!w.increase_bet());
        w.set_bet(1).unwrap();
        assert!(!w.decrease_bet());
        assert_eq!(w.bet(), 1);
    }
}
