use crate::error::{GameError, Result};
use crate::types::Coins;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule mapping enrollment size to the cost of a repeat play.
///
/// The first play by any account is always free; the strategy only prices
/// plays by accounts that are already enrolled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStrategy {
    Free,
    Flat,
    Linear,
    #[default]
    Quadratic,
}

impl FeeStrategy {
    /// Fee for a repeat play while `players` accounts are enrolled.
    pub fn calculate(&self, players: u64, base: Coins) -> Coins {
        let n = players as Coins;
        match self {
            Self::Free => 0,
            Self::Flat => base,
            Self::Linear => base.saturating_mul(n),
            Self::Quadratic => base.saturating_mul(n).saturating_mul(n),
        }
    }

    /// Player-facing description of the active rule.
    pub fn explain(&self) -> String {
        match self {
            Self::Free => "repeat plays are free of charge".to_string(),
            Self::Flat => "every repeat play costs one base coin, no matter how many players are in".to_string(),
            Self::Linear => "a repeat play costs one base coin per enrolled player".to_string(),
            Self::Quadratic => {
                "a repeat play costs one base coin times the square of the enrolled player count"
                    .to_string()
            }
        }
    }
}

impl fmt::Display for FeeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Free => "free",
            Self::Flat => "flat",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
        };
        f.write_str(name)
    }
}

impl FromStr for FeeStrategy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "flat" => Ok(Self::Flat),
            "linear" => Ok(Self::Linear),
            "quadratic" => Ok(Self::Quadratic),
            other => Err(GameError::config(format!(
                "unknown fee strategy '{}', expected free, flat, linear or quadratic",
                other
            ))),
        }
    }
}
