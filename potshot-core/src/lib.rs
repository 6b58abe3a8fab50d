//! Potshot game engine: a pay-to-play pot lottery.
//!
//! Accounts ante into a shared pot and every play runs a probabilistic
//! draw. A winner takes the whole pot once the asynchronous payout settles,
//! and the game stays closed until its owner resets it for a new epoch.

pub mod error;
pub mod fee;
pub mod game;
pub mod host;
pub mod house;
pub mod lottery;
pub mod types;

pub use error::{GameError, Result};
pub use fee::FeeStrategy;
pub use game::{GameState, PayoutOrder, PlayOutcome};
pub use host::{CallContext, MemoryLedger, PayoutRecord, TransferAgent};
pub use house::LotteryHouse;
pub use lottery::Lottery;
pub use types::{format_coins, parse_coins, AccountId, Coins, ONE_COIN};
