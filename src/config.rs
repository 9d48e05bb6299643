use serde::Deserialize;
use tracing::Level;

use crate::effects::EffectName;
use crate::error::BackdropError;

/// Particle-count policy: a small base below the width breakpoint, a large one
/// at or above it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleBudget {
    pub breakpoint: f64,
    pub small: usize,
    pub large: usize,
}

impl Default for ParticleBudget {
    fn default() -> Self {
        Self {
            breakpoint: 768.0,
            small: 40,
            large: 80,
        }
    }
}

impl ParticleBudget {
    pub fn base(&self, width: f64) -> usize {
        if width < self.breakpoint {
            self.small
        } else {
            self.large
        }
    }

    /// Base count scaled by an effect's density multiplier.
    pub fn count(&self, width: f64, multiplier: f64) -> usize {
        (self.base(width) as f64 * multiplier).ceil() as usize
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub effect_key: String,
    pub theme_key: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            effect_key: "particleEffect".to_string(),
            theme_key: "theme".to_string(),
        }
    }
}

/// Backdrop configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    pub canvas_id: String,
    /// Pointer influence radius in CSS pixels.
    pub interaction_radius: f64,
    /// Minimum spacing between forwarded pointer moves.
    pub pointer_throttle_ms: f64,
    pub fade_out_ms: u32,
    pub fade_in_ms: u32,
    pub budget: ParticleBudget,
    pub storage: StorageKeys,
    pub default_effect: EffectName,
    /// Fixed RNG seed; the host picks one when absent.
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            canvas_id: "particleCanvas".to_string(),
            interaction_radius: 150.0,
            pointer_throttle_ms: 16.0, // one frame at 60Hz
            fade_out_ms: 500,
            fade_in_ms: 500,
            budget: ParticleBudget::default(),
            storage: StorageKeys::default(),
            default_effect: EffectName::Stars,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl BackdropConfig {
    pub fn from_json(json: &str) -> Result<Self, BackdropError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}
