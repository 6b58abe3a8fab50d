use crate::types::{AccountId, Coins};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("game is over: {winner} took the pot of {pot} units")]
    GameInactive { winner: AccountId, pot: Coins },

    #[error("insufficient fee: with {players} players a repeat play costs {required} units, got {attached}")]
    InsufficientFee {
        players: u64,
        required: Coins,
        attached: Coins,
    },

    #[error("unauthorized: {caller} may not call {method}")]
    Unauthorized {
        method: &'static str,
        caller: AccountId,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dialog error: {0}")]
    Dialog(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn unauthorized(method: &'static str, caller: &AccountId) -> Self {
        Self::Unauthorized {
            method,
            caller: caller.clone(),
        }
    }

    pub fn transfer(msg: impl Into<String>) -> Self {
        Self::TransferFailed(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<dialoguer::Error> for GameError {
    fn from(err: dialoguer::Error) -> Self {
        GameError::Dialog(err.to_string())
    }
}
