//! Particle effects: one simulation + rendering strategy per [`EffectName`].

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::BackdropError;
use crate::input::MouseState;
use crate::surface::{Point, Surface, Viewport};
use crate::theme::Theme;

pub mod fireflies;
pub mod matrix;
pub mod snow;
pub mod stars;
pub mod web;

pub use fireflies::FirefliesEffect;
pub use matrix::MatrixEffect;
pub use snow::SnowEffect;
pub use stars::{ShootingStar, StarsEffect, TRAIL_CAP};
pub use web::WebEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectName {
    Web,
    Matrix,
    Fireflies,
    Snow,
    Stars,
}

impl EffectName {
    pub const ALL: [EffectName; 5] = [
        EffectName::Web,
        EffectName::Matrix,
        EffectName::Fireflies,
        EffectName::Snow,
        EffectName::Stars,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectName::Web => "web",
            EffectName::Matrix => "matrix",
            EffectName::Fireflies => "fireflies",
            EffectName::Snow => "snow",
            EffectName::Stars => "stars",
        }
    }

    /// Position in [`EffectName::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectName {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| BackdropError::UnknownEffect(s.to_string()))
    }
}

/// Capability set shared by every effect variant.
///
/// An effect holds its own entities and RNG but never the canvas: dimensions
/// arrive through [`Effect::bind`] and the surface is lent for each `draw`.
pub trait Effect {
    fn name(&self) -> EffectName;

    /// Rebind canvas dimensions without touching the particle set.
    fn bind(&mut self, viewport: Viewport);

    fn viewport(&self) -> Viewport;

    /// Rebuild every entity from the bound viewport.
    fn create_particles(&mut self);

    /// Advance one frame. Never touches the canvas.
    fn update(&mut self, mouse: &MouseState);

    /// Paint the current state. Never mutates simulation state.
    fn draw(&self, surface: &mut dyn Surface, theme: Theme);

    /// Drop all entities. Safe to call any number of times.
    fn destroy(&mut self);

    /// Number of live entities.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions of every live entity, in canvas coordinates.
    fn positions(&self) -> Vec<Point>;

    /// How far outside the viewport an entity may legitimately sit.
    fn margin(&self) -> f64;

    /// Whether the render loop clears the canvas before each frame.
    fn clears_each_frame(&self) -> bool {
        true
    }
}

/// Uniform point inside the viewport.
pub(crate) fn random_point(rng: &mut ChaCha8Rng, viewport: Viewport) -> Point {
    Point::new(
        rng.gen::<f64>() * viewport.width,
        rng.gen::<f64>() * viewport.height,
    )
}

/// Uniform value in `[-amount / 2, amount / 2)`.
pub(crate) fn jitter(rng: &mut ChaCha8Rng, amount: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * amount
}

/// Uniform value in `[min, min + span)`.
pub(crate) fn between(rng: &mut ChaCha8Rng, min: f64, span: f64) -> f64 {
    rng.gen::<f64>() * span + min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_strings() {
        for name in EffectName::ALL {
            assert_eq!(name.as_str().parse::<EffectName>().unwrap(), name);
        }
        assert!(matches!(
            "rain".parse::<EffectName>(),
            Err(BackdropError::UnknownEffect(_))
        ));
    }

    #[test]
    fn index_matches_table_order() {
        for (i, name) in EffectName::ALL.into_iter().enumerate() {
            assert_eq!(name.index(), i);
        }
    }
}
