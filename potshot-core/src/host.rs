use crate::error::Result;
use crate::types::{format_coins, AccountId, Coins};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// What the host attests about a single call into the game: who is calling,
/// which account the game itself lives at, and how much value rides along.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub caller: AccountId,
    pub contract: AccountId,
    pub attached: Coins,
}

impl CallContext {
    pub fn new(caller: impl Into<AccountId>, contract: impl Into<AccountId>) -> Self {
        Self {
            caller: caller.into(),
            contract: contract.into(),
            attached: 0,
        }
    }

    pub fn with_attached(mut self, attached: Coins) -> Self {
        self.attached = attached;
        self
    }

    /// True when the game is calling back into itself.
    pub fn is_self_call(&self) -> bool {
        self.caller == self.contract
    }
}

/// Moves funds on behalf of the game. Transfers settle asynchronously from
/// the game's point of view; the caller learns the outcome only when the
/// returned future resolves.
#[async_trait]
pub trait TransferAgent: Send + Sync {
    async fn transfer(&self, to: &AccountId, amount: Coins) -> Result<()>;
}

/// A settled payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub to: AccountId,
    pub amount: Coins,
    pub at: DateTime<Utc>,
}

/// Transfer agent for hosts without a real ledger: settles instantly and
/// remembers every payout it carried out.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<PayoutRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PayoutRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl TransferAgent for MemoryLedger {
    async fn transfer(&self, to: &AccountId, amount: Coins) -> Result<()> {
        self.records.lock().push(PayoutRecord {
            to: to.clone(),
            amount,
            at: Utc::now(),
        });
        tracing::info!("ledger credit: {} to {}", format_coins(amount), to);
        Ok(())
    }
}
