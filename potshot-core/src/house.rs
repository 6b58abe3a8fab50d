use crate::error::Result;
use crate::game::{GameState, PayoutOrder, PlayOutcome};
use crate::host::{CallContext, TransferAgent};
use crate::types::{format_coins, AccountId, Coins};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Runs a game on behalf of a host.
///
/// Play calls go straight through to [`GameState`]; when one of them wins,
/// the house carries out the two-phase payout: a settlement task awaits the
/// transfer agent (phase one) and then confirms completion with a
/// self-addressed call to `on_payout_complete` (phase two). The settlement
/// task is the only code path that self-addresses the confirmation.
///
/// Between the win and the confirmation the game is still active, so plays
/// can land while a payout is in flight. Ordering between those plays and
/// the confirmation is not guaranteed.
pub struct LotteryHouse {
    contract: AccountId,
    game: Arc<Mutex<GameState>>,
    transfers: Arc<dyn TransferAgent>,
    pending: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl LotteryHouse {
    pub fn new(
        contract: impl Into<AccountId>,
        game: GameState,
        transfers: Arc<dyn TransferAgent>,
    ) -> Self {
        Self {
            contract: contract.into(),
            game: Arc::new(Mutex::new(game)),
            transfers,
            pending: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn contract(&self) -> &AccountId {
        &self.contract
    }

    /// Shared handle to the game, for accessors and admin calls.
    pub fn game(&self) -> Arc<Mutex<GameState>> {
        self.game.clone()
    }

    /// Context for a call by `caller`, addressed at this game.
    pub fn context_for(&self, caller: impl Into<AccountId>) -> CallContext {
        CallContext::new(caller, self.contract.clone())
    }

    /// Play on behalf of `caller`, scheduling the payout on a win.
    pub async fn play<R: Rng + Send + ?Sized>(
        &self,
        caller: &AccountId,
        attached: Coins,
        rng: &mut R,
    ) -> Result<PlayOutcome> {
        let ctx = self.context_for(caller.clone()).with_attached(attached);
        let outcome = self.game.lock().await.play(&ctx, rng)?;
        if let PlayOutcome::Won { payout } = &outcome {
            self.schedule_payout(payout.clone());
        }
        Ok(outcome)
    }

    fn schedule_payout(&self, order: PayoutOrder) {
        let game = self.game.clone();
        let transfers = self.transfers.clone();
        let contract = self.contract.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = transfers.transfer(&order.to, order.amount).await {
                // no compensation path: the confirmation below still runs
                tracing::error!(
                    "pot transfer of {} to {} failed: {}",
                    format_coins(order.amount),
                    order.to,
                    e
                );
            }
            let ctx = CallContext::new(contract.clone(), contract);
            if let Err(e) = game.lock().await.on_payout_complete(&ctx) {
                tracing::error!("payout confirmation rejected: {}", e);
            }
        });
        self.pending.lock().push(handle);
    }

    /// Await every settlement task scheduled so far.
    pub async fn settle_pending(&self) {
        let handles: Vec<JoinHandle<()>> = self.pending.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("settlement task failed: {}", e);
            }
        }
    }
}
