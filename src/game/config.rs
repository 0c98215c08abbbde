//! Match configuration.
//!
//! Loaded once at startup. Defaults match the shipped game; any value can be
//! overridden from the environment.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::bounds::{Bounds, Position};
use crate::core::clock::Seconds;
use crate::game::cooldown::AbilityId;
use crate::game::faction::Faction;
use crate::game::layer::Layer;
use crate::game::world::{ItemSpawn, SubmitZone};

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// A setting is out of range.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Setting name.
        field: &'static str,
        /// What is wrong.
        reason: &'static str,
    },
}

/// Ability cooldowns and related timers, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Chaser attack scan.
    pub chaser_shockwave: Seconds,
    /// Chaser layer move.
    pub chaser_layer_move: Seconds,
    /// Chaser ultimate.
    pub chaser_ultimate: Seconds,
    /// Survivor layer move.
    pub survivor_layer_move: Seconds,
    /// How long the ultimate disables Survivor skills.
    pub survivor_skill_disable: Seconds,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            chaser_shockwave: 5.0,
            chaser_layer_move: 5.0,
            chaser_ultimate: 180.0,
            survivor_layer_move: 20.0,
            survivor_skill_disable: 60.0,
        }
    }
}

impl CooldownConfig {
    /// Cooldown of `ability` for `faction`, or `None` if the faction lacks it.
    pub fn duration_for(&self, faction: Faction, ability: AbilityId) -> Option<Seconds> {
        match (faction, ability) {
            (Faction::Chaser, AbilityId::Shockwave) => Some(self.chaser_shockwave),
            (Faction::Chaser, AbilityId::LayerMove) => Some(self.chaser_layer_move),
            (Faction::Chaser, AbilityId::Ultimate) => Some(self.chaser_ultimate),
            (Faction::Survivor, AbilityId::LayerMove) => Some(self.survivor_layer_move),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            ("chaser_shockwave", self.chaser_shockwave),
            ("chaser_layer_move", self.chaser_layer_move),
            ("chaser_ultimate", self.chaser_ultimate),
            ("survivor_layer_move", self.survivor_layer_move),
            ("survivor_skill_disable", self.survivor_skill_disable),
        ];
        for (field, value) in all {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a non-negative number of seconds",
                });
            }
        }
        Ok(())
    }
}

/// Victory thresholds and grace periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictoryConfig {
    /// Faction score at which Survivors win.
    pub win_score_threshold: u32,
    /// No victory check before this long after authority start.
    pub min_grace: Seconds,
    /// No "all caught" check before this long in Playing.
    pub all_caught_grace: Seconds,
    /// How often the faction score is logged.
    pub score_log_interval: Seconds,
}

impl Default for VictoryConfig {
    fn default() -> Self {
        Self {
            win_score_threshold: 100,
            min_grace: 300.0,
            all_caught_grace: 5.0,
            score_log_interval: 2.0,
        }
    }
}

impl VictoryConfig {
    /// Check the settings the evaluator depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.win_score_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "win_score_threshold",
                reason: "must be positive",
            });
        }
        for (field, value) in [
            ("min_grace", self.min_grace),
            ("all_caught_grace", self.all_caught_grace),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a non-negative number of seconds",
                });
            }
        }
        Ok(())
    }
}

/// Gameplay configuration for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Ready countdown length.
    pub ready_duration: Seconds,
    /// Match countdown length.
    pub match_duration: Seconds,
    /// How long Chasers are frozen when the ready countdown starts.
    pub chaser_freeze_duration: Seconds,
    /// Timeout winner when no timeout policy is registered.
    pub catcher_wins_on_timeout: bool,
    /// Claimed masks needed to start the ready countdown.
    pub mask_quorum: usize,
    /// Detach connections without a mask when the ready countdown starts.
    pub drop_unmasked_on_start: bool,
    /// Cooldowns.
    pub cooldowns: CooldownConfig,
    /// Victory rules.
    pub victory: VictoryConfig,
    /// Shockwave radius.
    pub shockwave_radius: f32,
    /// Pickup radius.
    pub interact_radius: f32,
    /// Play area before the match starts.
    pub lobby_bounds: Bounds,
    /// Play area while playing.
    pub game_bounds: Bounds,
    /// Submit zones.
    pub submit_zones: Vec<SubmitZone>,
    /// Items spawned when the match starts.
    pub item_spawns: Vec<ItemSpawn>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ready_duration: 5.0,
            match_duration: 600.0,
            chaser_freeze_duration: 5.0,
            catcher_wins_on_timeout: true,
            mask_quorum: 4,
            drop_unmasked_on_start: true,
            cooldowns: CooldownConfig::default(),
            victory: VictoryConfig::default(),
            shockwave_radius: 4.0,
            interact_radius: 1.5,
            lobby_bounds: Bounds::square(10.0),
            game_bounds: Bounds::square(20.0),
            submit_zones: vec![SubmitZone {
                id: 0,
                faction: Faction::Survivor,
                layer: Layer::Main,
                position: Position::ZERO,
                radius: 2.0,
                score_per_submit: 10,
            }],
            item_spawns: [Layer::L1, Layer::L2, Layer::L3]
                .into_iter()
                .enumerate()
                .map(|(i, layer)| ItemSpawn {
                    kind: i as u32 + 1,
                    layer,
                    allowed_faction: None,
                })
                .collect(),
        }
    }
}

impl MatchConfig {
    /// Defaults with environment overrides.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `MATCH_READY_SECONDS` | `ready_duration` |
    /// | `MATCH_DURATION_SECONDS` | `match_duration` |
    /// | `MATCH_CHASER_FREEZE_SECONDS` | `chaser_freeze_duration` |
    /// | `MATCH_CATCHER_WINS_ON_TIMEOUT` | `catcher_wins_on_timeout` |
    /// | `MATCH_MASK_QUORUM` | `mask_quorum` |
    /// | `MATCH_WIN_SCORE` | `victory.win_score_threshold` |
    /// | `MATCH_MIN_GRACE_SECONDS` | `victory.min_grace` |
    /// | `MATCH_ALL_CAUGHT_GRACE_SECONDS` | `victory.all_caught_grace` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        override_with(&lookup, "MATCH_READY_SECONDS", &mut config.ready_duration)?;
        override_with(&lookup, "MATCH_DURATION_SECONDS", &mut config.match_duration)?;
        override_with(&lookup, "MATCH_CHASER_FREEZE_SECONDS", &mut config.chaser_freeze_duration)?;
        if let Some(raw) = lookup("MATCH_CATCHER_WINS_ON_TIMEOUT") {
            config.catcher_wins_on_timeout = parse_bool("MATCH_CATCHER_WINS_ON_TIMEOUT", &raw)?;
        }
        override_with(&lookup, "MATCH_MASK_QUORUM", &mut config.mask_quorum)?;
        override_with(&lookup, "MATCH_WIN_SCORE", &mut config.victory.win_score_threshold)?;
        override_with(&lookup, "MATCH_MIN_GRACE_SECONDS", &mut config.victory.min_grace)?;
        override_with(&lookup, "MATCH_ALL_CAUGHT_GRACE_SECONDS", &mut config.victory.all_caught_grace)?;
        Ok(config)
    }

    /// Check ranges.
    ///
    /// Victory settings are not checked here: an invalid victory config only
    /// disables the evaluator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("ready_duration", self.ready_duration),
            ("match_duration", self.match_duration),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number of seconds",
                });
            }
        }
        if !self.chaser_freeze_duration.is_finite() || self.chaser_freeze_duration < 0.0 {
            return Err(ConfigError::Invalid {
                field: "chaser_freeze_duration",
                reason: "must be a non-negative number of seconds",
            });
        }
        if self.mask_quorum == 0 || self.mask_quorum > 4 {
            return Err(ConfigError::Invalid {
                field: "mask_quorum",
                reason: "must be between 1 and 4",
            });
        }
        if !self.lobby_bounds.is_valid() || !self.game_bounds.is_valid() {
            return Err(ConfigError::Invalid {
                field: "bounds",
                reason: "must have positive width and height",
            });
        }
        if !(self.shockwave_radius >= 0.0) || !(self.interact_radius >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "radius",
                reason: "must be non-negative",
            });
        }
        self.cooldowns.validate()
    }
}

pub(crate) fn override_with<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(key) {
        *target = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key,
            value: raw.clone(),
        })?;
    }
    Ok(())
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key,
            value: raw.to_string(),
        }),
    }
}
