use crate::error::{GameError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Win chance a fresh game starts with.
pub const DEFAULT_CHANCE: f64 = 0.2;

/// Probability engine deciding win or lose per play.
///
/// The random source is injected per draw so a host supplying deterministic
/// randomness replays the same outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lottery {
    chance: f64,
}

impl Default for Lottery {
    fn default() -> Self {
        Self {
            chance: DEFAULT_CHANCE,
        }
    }
}

impl Lottery {
    pub fn new(chance: f64) -> Result<Self> {
        check_chance(chance)?;
        Ok(Self { chance })
    }

    pub fn chance(&self) -> f64 {
        self.chance
    }

    pub fn set_chance(&mut self, chance: f64) -> Result<()> {
        check_chance(chance)?;
        self.chance = chance;
        Ok(())
    }

    /// Consumes exactly one draw from `rng`, no retries.
    pub fn play<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.chance
    }

    pub fn explain(&self) -> String {
        format!(
            "players have a {:.1}% chance of winning the pot",
            self.chance * 100.0
        )
    }
}

fn check_chance(chance: f64) -> Result<()> {
    if !chance.is_finite() || chance <= 0.0 || chance > 1.0 {
        return Err(GameError::config(format!(
            "win chance must be in (0, 1], got {}",
            chance
        )));
    }
    Ok(())
}
