use crate::config::ParticleBudget;
use crate::effects::{
    Effect, EffectName, FirefliesEffect, MatrixEffect, SnowEffect, StarsEffect, WebEffect,
};
use crate::surface::Viewport;

/// One instance of every effect, indexed by [`EffectName`].
pub struct EffectRegistry {
    effects: [Box<dyn Effect>; 5],
}

impl EffectRegistry {
    /// Build every effect bound to `viewport`. Each effect draws from its own
    /// RNG stream derived from `seed`.
    pub fn new(budget: ParticleBudget, viewport: Viewport, seed: u64) -> Self {
        let stream = |name: EffectName| seed.wrapping_add(name.index() as u64);
        let mut effects: [Box<dyn Effect>; 5] = [
            Box::new(WebEffect::new(budget, stream(EffectName::Web))),
            Box::new(MatrixEffect::new(stream(EffectName::Matrix))),
            Box::new(FirefliesEffect::new(budget, stream(EffectName::Fireflies))),
            Box::new(SnowEffect::new(budget, stream(EffectName::Snow))),
            Box::new(StarsEffect::new(budget, stream(EffectName::Stars))),
        ];
        for effect in &mut effects {
            effect.bind(viewport);
        }
        Self { effects }
    }

    pub fn get(&self, name: EffectName) -> &dyn Effect {
        self.effects[name.index()].as_ref()
    }

    pub fn get_mut(&mut self, name: EffectName) -> &mut dyn Effect {
        self.effects[name.index()].as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(|e| e.as_ref())
    }

    /// Rebind every instance, active or not, to new canvas dimensions.
    pub fn bind_all(&mut self, viewport: Viewport) {
        for effect in &mut self.effects {
            effect.bind(viewport);
        }
    }

    /// Names of effects currently holding entities.
    pub fn populated(&self) -> Vec<EffectName> {
        self.iter().filter(|e| !e.is_empty()).map(|e| e.name()).collect()
    }
}
