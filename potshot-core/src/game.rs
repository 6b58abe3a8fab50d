use crate::error::{GameError, Result};
use crate::fee::FeeStrategy;
use crate::host::CallContext;
use crate::lottery::Lottery;
use crate::types::{format_coins, AccountId, Coins, ONE_COIN};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Transfer the host must carry out after a win: the whole pot to the winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutOrder {
    pub to: AccountId,
    pub amount: Coins,
}

/// What a single play produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Lost,
    Won { payout: PayoutOrder },
}

impl PlayOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Self::Won { .. })
    }
}

/// The game: one instance per deployment, owner fixed at construction.
///
/// A game cycles through epochs. Each epoch starts active with an empty
/// enrollment and the pot at one base coin, accumulates fees until a play
/// wins, and closes once the payout is confirmed. Only the owner's `reset`
/// opens the next epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    owner: AccountId,
    winner: Option<AccountId>,
    last_played: Option<AccountId>,
    active: bool,
    pot: Coins,
    players: HashSet<AccountId>,
    fee_strategy: FeeStrategy,
    lottery: Lottery,
}

impl GameState {
    pub fn new(owner: impl Into<AccountId>) -> Self {
        Self {
            owner: owner.into(),
            winner: None,
            last_played: None,
            active: true,
            pot: ONE_COIN,
            players: HashSet::new(),
            fee_strategy: FeeStrategy::default(),
            lottery: Lottery::default(),
        }
    }

    /// Take a shot at the pot.
    ///
    /// The first play by any account enrolls it free of charge; whatever
    /// value was attached is ignored. Repeat plays must attach at least the
    /// fee the active strategy prices the current enrollment at, and the
    /// full attached value goes into the pot. Every play then runs one
    /// lottery draw; on a win the returned order tells the host to move the
    /// whole pot to the caller. The game stays active until that payout is
    /// confirmed through [`on_payout_complete`](Self::on_payout_complete).
    ///
    /// All rejections happen before any state is touched.
    pub fn play<R: Rng + ?Sized>(&mut self, ctx: &CallContext, rng: &mut R) -> Result<PlayOutcome> {
        if !self.active {
            return Err(GameError::GameInactive {
                winner: self.winner.clone().unwrap_or_default(),
                pot: self.pot,
            });
        }

        if self.players.contains(&ctx.caller) {
            let players = self.players.len() as u64;
            let required = self.fee_strategy.calculate(players, ONE_COIN);
            if ctx.attached < required {
                return Err(GameError::InsufficientFee {
                    players,
                    required,
                    attached: ctx.attached,
                });
            }
            self.pot += ctx.attached;
            tracing::debug!(
                "{} paid {} into the pot, now {}",
                ctx.caller,
                format_coins(ctx.attached),
                format_coins(self.pot)
            );
        } else {
            // first play is on the house
            self.players.insert(ctx.caller.clone());
            tracing::info!(
                "{} joined the game, {} players in",
                ctx.caller,
                self.players.len()
            );
        }

        self.last_played = Some(ctx.caller.clone());

        if self.lottery.play(rng) {
            self.winner = Some(ctx.caller.clone());
            tracing::info!("{} won the pot of {}", ctx.caller, format_coins(self.pot));
            Ok(PlayOutcome::Won {
                payout: PayoutOrder {
                    to: ctx.caller.clone(),
                    amount: self.pot,
                },
            })
        } else {
            Ok(PlayOutcome::Lost)
        }
    }

    /// Confirmation half of the payout sequence.
    ///
    /// Only the game itself may close the epoch; the host addresses this
    /// entry point back at the game once the pot transfer settles. This is
    /// the sole path by which `active` becomes false.
    pub fn on_payout_complete(&mut self, ctx: &CallContext) -> Result<()> {
        if !ctx.is_self_call() {
            return Err(GameError::unauthorized("on_payout_complete", &ctx.caller));
        }
        self.active = false;
        tracing::info!("payout confirmed, the game is over");
        Ok(())
    }

    /// Owner-only: change the win chance. Takes effect on the next play.
    pub fn set_lottery_chance(&mut self, ctx: &CallContext, chance: f64) -> Result<bool> {
        self.require_owner(ctx, "set_lottery_chance")?;
        self.lottery.set_chance(chance)?;
        tracing::info!("win chance set to {}", chance);
        Ok(true)
    }

    /// Owner-only: change the fee rule. Takes effect on the next play.
    pub fn set_fee_strategy(&mut self, ctx: &CallContext, strategy: FeeStrategy) -> Result<bool> {
        self.require_owner(ctx, "set_fee_strategy")?;
        self.fee_strategy = strategy;
        tracing::info!("fee strategy set to {}", strategy);
        Ok(true)
    }

    /// Owner-only: open a new epoch. Clears enrollment, winner and last
    /// player, restores the pot to one base coin, and keeps the fee and
    /// lottery configuration as they are.
    pub fn reset(&mut self, ctx: &CallContext) -> Result<()> {
        self.require_owner(ctx, "reset")?;
        self.players.clear();
        self.winner = None;
        self.last_played = None;
        self.pot = ONE_COIN;
        self.active = true;
        tracing::info!("game reset by {}", ctx.caller);
        Ok(())
    }

    fn require_owner(&self, ctx: &CallContext, method: &'static str) -> Result<()> {
        if ctx.caller != self.owner {
            return Err(GameError::unauthorized(method, &ctx.caller));
        }
        Ok(())
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn winner(&self) -> Option<&AccountId> {
        self.winner.as_ref()
    }

    pub fn last_played(&self) -> Option<&AccountId> {
        self.last_played.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pot(&self) -> Coins {
        self.pot
    }

    pub fn pot_display(&self) -> String {
        format_coins(self.pot)
    }

    /// Fee a repeat play costs right now.
    pub fn current_fee(&self) -> Coins {
        self.fee_strategy
            .calculate(self.players.len() as u64, ONE_COIN)
    }

    pub fn fee_display(&self) -> String {
        format_coins(self.current_fee())
    }

    pub fn fee_strategy(&self) -> FeeStrategy {
        self.fee_strategy
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn has_played(&self, account: &AccountId) -> bool {
        self.players.contains(account)
    }

    pub fn explain_fees(&self) -> String {
        self.fee_strategy.explain()
    }

    pub fn explain_lottery(&self) -> String {
        self.lottery.explain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    const CONTRACT: &str = "potshot";
    const OWNER: &str = "carol";

    fn ctx(caller: &str) -> CallContext {
        CallContext::new(caller, CONTRACT)
    }

    fn losing_rng() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn winning_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn first_play_is_free_and_enrolls() {
        let mut game = GameState::new(OWNER);
        let alice = AccountId::from("alice");

        assert!(!game.has_played(&alice));
        let outcome = game.play(&ctx("alice"), &mut losing_rng()).unwrap();
        assert_eq!(outcome, PlayOutcome::Lost);
        assert!(game.has_played(&alice));
        assert_eq!(game.player_count(), 1);
        assert_eq!(game.last_played(), Some(&alice));
        // attached value on a first play is ignored, not pocketed
        game.play(&ctx("bob").with_attached(50 * ONE_COIN), &mut losing_rng())
            .unwrap();
        assert_eq!(game.pot(), ONE_COIN);
    }

    #[test]
    fn repeat_play_requires_the_computed_fee() {
        let mut game = GameState::new(OWNER);
        game.play(&ctx("alice"), &mut losing_rng()).unwrap();

        // one player in, quadratic fee is one base coin
        let err = game.play(&ctx("alice"), &mut losing_rng()).unwrap_err();
        match err {
            GameError::InsufficientFee {
                players,
                required,
                attached,
            } => {
                assert_eq!(players, 1);
                assert_eq!(required, ONE_COIN);
                assert_eq!(attached, 0);
            }
            other => panic!("unexpected error: {}", other),
        }
        // a rejected play mutates nothing
        assert_eq!(game.pot(), ONE_COIN);
        assert_eq!(game.player_count(), 1);

        game.play(&ctx("alice").with_attached(ONE_COIN), &mut losing_rng())
            .unwrap();
        assert_eq!(game.pot(), 2 * ONE_COIN);
    }

    // the worked example: quadratic fees over a two-player epoch
    #[test]
    fn pot_accounting_scenario() {
        let mut game = GameState::new(OWNER);
        let mut rng = losing_rng();

        game.play(&ctx("a"), &mut rng).unwrap();
        assert_eq!(game.pot(), ONE_COIN);

        assert!(game.play(&ctx("a"), &mut rng).is_err());

        game.play(&ctx("a").with_attached(ONE_COIN), &mut rng).unwrap();
        assert_eq!(game.pot(), 2 * ONE_COIN);

        game.play(&ctx("b"), &mut rng).unwrap();
        assert_eq!(game.player_count(), 2);
        assert_eq!(game.pot(), 2 * ONE_COIN);

        // with two players in, a's next play costs 4 base coins
        assert_eq!(game.current_fee(), 4 * ONE_COIN);
        let err = game
            .play(&ctx("a").with_attached(3 * ONE_COIN), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFee {
                required,
                ..
            } if required == 4 * ONE_COIN
        ));
    }

    #[test]
    fn win_sets_winner_and_orders_the_full_pot() {
        let mut game = GameState::new(OWNER);
        let mut rng = losing_rng();
        game.play(&ctx("a"), &mut rng).unwrap();
        game.play(&ctx("a").with_attached(ONE_COIN), &mut rng).unwrap();

        let outcome = game.play(&ctx("b"), &mut winning_rng()).unwrap();
        match outcome {
            PlayOutcome::Won { payout } => {
                assert_eq!(payout.to, AccountId::from("b"));
                assert_eq!(payout.amount, 2 * ONE_COIN);
            }
            PlayOutcome::Lost => panic!("forced draw should win"),
        }
        assert_eq!(game.winner(), Some(&AccountId::from("b")));
        // still active until the payout confirmation lands
        assert!(game.is_active());
        assert!(game.play(&ctx("c"), &mut losing_rng()).is_ok());
    }

    #[test]
    fn confirmation_closes_the_game() {
        let mut game = GameState::new(OWNER);
        game.play(&ctx("a"), &mut winning_rng()).unwrap();

        game.on_payout_complete(&CallContext::new(CONTRACT, CONTRACT))
            .unwrap();
        assert!(!game.is_active());

        let err = game.play(&ctx("b"), &mut losing_rng()).unwrap_err();
        match err {
            GameError::GameInactive { winner, pot } => {
                assert_eq!(winner, AccountId::from("a"));
                assert_eq!(pot, ONE_COIN);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn confirmation_rejects_everyone_but_the_game_itself() {
        let mut game = GameState::new(OWNER);
        game.play(&ctx("a"), &mut winning_rng()).unwrap();

        for caller in ["a", OWNER, "mallory"] {
            let err = game.on_payout_complete(&ctx(caller)).unwrap_err();
            assert!(matches!(err, GameError::Unauthorized { .. }));
            assert!(game.is_active());
        }
    }

    #[test]
    fn admin_operations_are_owner_only() {
        let mut game = GameState::new(OWNER);

        assert!(matches!(
            game.set_lottery_chance(&ctx("a"), 0.5).unwrap_err(),
            GameError::Unauthorized { .. }
        ));
        assert!(matches!(
            game.set_fee_strategy(&ctx("a"), FeeStrategy::Flat).unwrap_err(),
            GameError::Unauthorized { .. }
        ));
        assert!(matches!(
            game.reset(&ctx("a")).unwrap_err(),
            GameError::Unauthorized { .. }
        ));

        assert!(game.set_lottery_chance(&ctx(OWNER), 0.5).unwrap());
        assert!(game.set_fee_strategy(&ctx(OWNER), FeeStrategy::Flat).unwrap());
        assert_eq!(game.fee_strategy(), FeeStrategy::Flat);
    }

    #[test]
    fn invalid_chance_is_rejected_even_for_the_owner() {
        let mut game = GameState::new(OWNER);
        let err = game.set_lottery_chance(&ctx(OWNER), 1.5).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfiguration(_)));
    }

    #[test]
    fn reset_opens_a_fresh_epoch_but_keeps_configuration() {
        let mut game = GameState::new(OWNER);
        game.set_fee_strategy(&ctx(OWNER), FeeStrategy::Linear).unwrap();
        game.set_lottery_chance(&ctx(OWNER), 0.9).unwrap();

        let mut rng = losing_rng();
        game.play(&ctx("a"), &mut rng).unwrap();
        game.play(&ctx("a").with_attached(ONE_COIN), &mut rng).unwrap();
        game.play(&ctx("b"), &mut winning_rng()).unwrap();
        game.on_payout_complete(&CallContext::new(CONTRACT, CONTRACT))
            .unwrap();

        game.reset(&ctx(OWNER)).unwrap();

        assert!(game.is_active());
        assert_eq!(game.player_count(), 0);
        assert_eq!(game.pot(), ONE_COIN);
        assert_eq!(game.winner(), None);
        assert_eq!(game.last_played(), None);
        assert_eq!(game.owner(), &AccountId::from(OWNER));
        assert_eq!(game.fee_strategy(), FeeStrategy::Linear);
        assert_eq!(game.current_fee(), 0);
    }

    #[test]
    fn state_survives_a_serde_round_trip() {
        let mut game = GameState::new(OWNER);
        game.play(&ctx("a"), &mut losing_rng()).unwrap();
        game.play(&ctx("a").with_attached(ONE_COIN), &mut losing_rng())
            .unwrap();

        let json = serde_json::to_string(&game).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.pot(), game.pot());
        assert_eq!(restored.player_count(), 1);
        assert!(restored.has_played(&AccountId::from("a")));
        assert_eq!(restored.fee_strategy(), game.fee_strategy());
    }
}
