use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-attested identity of an account interacting with the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Amounts are tracked in the smallest currency unit.
pub type Coins = u128;

/// One whole coin, the game's base unit: initial pot and fee base.
pub const ONE_COIN: Coins = 1_000_000;

/// Render an amount of smallest units as whole coins, trailing zeros trimmed.
pub fn format_coins(amount: Coins) -> String {
    let whole = amount / ONE_COIN;
    let frac = amount % ONE_COIN;
    if frac == 0 {
        format!("{} coins", whole)
    } else {
        let frac = format!("{:06}", frac);
        format!("{}.{} coins", whole, frac.trim_end_matches('0'))
    }
}

/// Parse a decimal coin amount ("2", "0.5", ".25") into smallest units.
pub fn parse_coins(s: &str) -> Result<Coins> {
    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(GameError::config(format!("invalid coin amount '{}'", s)));
    }
    if frac.len() > 6 {
        return Err(GameError::config(format!(
            "coin amounts carry at most six decimal places, got '{}'",
            s
        )));
    }
    let whole: Coins = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| GameError::config(format!("invalid coin amount '{}'", s)))?
    };
    let frac_units: Coins = if frac.is_empty() {
        0
    } else {
        format!("{:0<6}", frac)
            .parse()
            .map_err(|_| GameError::config(format!("invalid coin amount '{}'", s)))?
    };
    Ok(whole.saturating_mul(ONE_COIN).saturating_add(frac_units))
}
