use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

/// Board size, mine count and an optional RNG seed for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
    /// Fixes both the mine layout and the agent's guesses when set.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    /// The classic 8x8 beginner board with 8 mines.
    fn default() -> Self {
        GameConfig {
            height: 8,
            width: 8,
            mines: 8,
            seed: None,
        }
    }
}

impl GameConfig {
    pub const HEIGHT_VAR: &'static str = "MINESWEEPER_HEIGHT";
    pub const WIDTH_VAR: &'static str = "MINESWEEPER_WIDTH";
    pub const MINES_VAR: &'static str = "MINESWEEPER_MINES";
    pub const SEED_VAR: &'static str = "MINESWEEPER_SEED";

    /// Reads overrides from the `MINESWEEPER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GameConfig::from_env`], reading variables through `lookup`.
    /// Missing keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = GameConfig::default();
        let config = GameConfig {
            height: parse(&lookup, Self::HEIGHT_VAR)?.unwrap_or(defaults.height),
            width: parse(&lookup, Self::WIDTH_VAR)?.unwrap_or(defaults.width),
            mines: parse(&lookup, Self::MINES_VAR)?.unwrap_or(defaults.mines),
            seed: parse(&lookup, Self::SEED_VAR)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fits = self
            .height
            .checked_mul(self.width)
            .is_some_and(|cells| self.mines <= cells);
        if self.height == 0 || self.width == 0 || !fits {
            return Err(Error::InvalidConfiguration {
                height: self.height,
                width: self.width,
                mines: self.mines,
            });
        }
        Ok(())
    }

    /// The RNG a game built from this config draws from.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidSetting { key, value }),
    }
}
