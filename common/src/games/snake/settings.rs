use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use super::types::{GameMode, TargetScore};

pub const MIN_GRID_SIZE: i32 = 10;
pub const MAX_GRID_SIZE: i32 = 30;
pub const MAX_FOOD_COUNT: u32 = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub grid_size: i32,
    pub food_count: u32,
    pub mode: GameMode,
    pub target_score: TargetScore,
    pub tick_interval_ms: u64,
    /// Fading food: foods older than this are replaced. `None` keeps food forever.
    pub food_lifetime_ms: Option<u64>,
    /// Consecutive discarded moves before the game is declared stalled.
    pub stall_tick_limit: u32,
    /// Deferred-loss window for a human player. Zero disables it.
    pub grace_period_ms: u64,
}

impl GameSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn food_lifetime(&self) -> Option<Duration> {
        self.food_lifetime_ms.map(Duration::from_millis)
    }

    pub fn grace_period(&self) -> Option<Duration> {
        (self.grace_period_ms > 0).then(|| Duration::from_millis(self.grace_period_ms))
    }

    pub fn cell_count(&self) -> usize {
        (self.grid_size * self.grid_size) as usize
    }

    /// Food count actually kept on the field for a snake of `snake_len`.
    pub fn effective_food_count(&self, snake_len: usize) -> usize {
        (self.food_count as usize).min(self.cell_count().saturating_sub(snake_len))
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            grid_size: 20,
            food_count: 1,
            mode: GameMode::Normal,
            target_score: TargetScore::Max,
            tick_interval_ms: 150,
            food_lifetime_ms: None,
            stall_tick_limit: 40,
            grace_period_ms: 250,
        }
    }
}

impl Validate for GameSettings {
    fn validate(&self) -> Result<(), String> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(format!(
                "grid_size must be between {} and {}",
                MIN_GRID_SIZE, MAX_GRID_SIZE
            ));
        }
        if self.food_count < 1 || self.food_count > MAX_FOOD_COUNT {
            return Err(format!("food_count must be between 1 and {}", MAX_FOOD_COUNT));
        }
        if self.tick_interval_ms < 50 || self.tick_interval_ms > 5000 {
            return Err("tick_interval_ms must be between 50 and 5000".to_string());
        }
        if let TargetScore::Finite(0) = self.target_score {
            return Err("target_score must be at least 1".to_string());
        }
        if self.food_lifetime_ms == Some(0) {
            return Err("food_lifetime_ms must be greater than 0 when set".to_string());
        }
        if self.stall_tick_limit == 0 {
            return Err("stall_tick_limit must be at least 1".to_string());
        }
        if self.grace_period_ms > 5000 {
            return Err("grace_period_ms must not exceed 5000".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(GameSettings::default().validate().is_ok());
    }

    #[test]
    fn test_grid_size_out_of_range() {
        let settings = GameSettings {
            grid_size: 31,
            ..GameSettings::default()
        };

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_finite_target_is_rejected() {
        let settings = GameSettings {
            target_score: TargetScore::Finite(0),
            ..GameSettings::default()
        };

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_effective_food_count_caps_at_free_cells() {
        let settings = GameSettings {
            grid_size: 10,
            food_count: 10,
            ..GameSettings::default()
        };

        assert_eq!(settings.effective_food_count(3), 10);
        assert_eq!(settings.effective_food_count(95), 5);
        assert_eq!(settings.effective_food_count(100), 0);
    }

    #[test]
    fn test_zero_grace_period_disables_it() {
        let settings = GameSettings {
            grace_period_ms: 0,
            ..GameSettings::default()
        };

        assert_eq!(settings.grace_period(), None);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let settings: GameSettings = serde_yaml_ng::from_str("mode: WRAP\ngrid_size: 15\n").unwrap();

        assert_eq!(settings.mode, GameMode::Wrap);
        assert_eq!(settings.grid_size, 15);
        assert_eq!(settings.food_count, 1);
    }
}
