use std::f64::consts::TAU;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{between, jitter, random_point, Effect, EffectName};
use crate::config::ParticleBudget;
use crate::input::MouseState;
use crate::surface::{ColorStop, Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

/// Fireflies wrap once they are this far past an edge.
pub const WRAP_MARGIN: f64 = 20.0;
const MAX_SPEED: f64 = 1.0;
const WANDER: f64 = 0.1;
const PULL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Firefly {
    pub pos: Point,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub pulse: f64,
    pub pulse_speed: f64,
    pub max_opacity: f64,
}

impl Firefly {
    fn opacity(&self) -> f64 {
        (self.pulse.sin() + 1.0) / 2.0 * self.max_opacity
    }

    fn glow_size(&self) -> f64 {
        self.size + self.pulse.sin() * 2.0
    }
}

struct Palette {
    glow: [Rgba; 3],
    core: Rgba,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            glow: [
                Rgba::new(255, 215, 0, 1.0),
                Rgba::new(255, 180, 0, 1.0),
                Rgba::new(255, 150, 0, 0.0),
            ],
            core: Rgba::new(255, 255, 200, 1.0),
        },
        Theme::Light => Palette {
            glow: [
                Rgba::new(218, 165, 32, 1.0),
                Rgba::new(184, 134, 11, 1.0),
                Rgba::new(184, 134, 11, 0.0),
            ],
            core: Rgba::new(255, 235, 150, 1.0),
        },
    }
}

/// Wandering glow points drawn towards the pointer.
#[derive(Debug)]
pub struct FirefliesEffect {
    budget: ParticleBudget,
    viewport: Viewport,
    rng: ChaCha8Rng,
    flies: Vec<Firefly>,
}

impl FirefliesEffect {
    pub fn new(budget: ParticleBudget, seed: u64) -> Self {
        Self {
            budget,
            viewport: Viewport::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            flies: Vec::new(),
        }
    }

    pub fn flies(&self) -> &[Firefly] {
        &self.flies
    }
}

/// Toroidal wrap with a margin on both sides.
fn wrap(v: f64, extent: f64) -> f64 {
    if v < -WRAP_MARGIN {
        extent + WRAP_MARGIN
    } else if v > extent + WRAP_MARGIN {
        -WRAP_MARGIN
    } else {
        v
    }
}

impl Effect for FirefliesEffect {
    fn name(&self) -> EffectName {
        EffectName::Fireflies
    }

    fn bind(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_particles(&mut self) {
        let count = self.budget.count(self.viewport.width, 1.0);
        let rng = &mut self.rng;
        self.flies = (0..count)
            .map(|_| Firefly {
                pos: random_point(rng, self.viewport),
                size: between(rng, 2.0, 4.0),
                vx: jitter(rng, 1.0),
                vy: jitter(rng, 1.0),
                pulse: between(rng, 0.0, TAU),
                pulse_speed: between(rng, 0.02, 0.05),
                max_opacity: between(rng, 0.5, 0.5),
            })
            .collect();
    }

    fn update(&mut self, mouse: &MouseState) {
        let Viewport { width, height } = self.viewport;
        for f in &mut self.flies {
            f.vx = (f.vx + jitter(&mut self.rng, WANDER)).clamp(-MAX_SPEED, MAX_SPEED);
            f.vy = (f.vy + jitter(&mut self.rng, WANDER)).clamp(-MAX_SPEED, MAX_SPEED);
            f.pos.x += f.vx;
            f.pos.y += f.vy;
            f.pulse += f.pulse_speed;

            if let Some(inf) = mouse.influence(f.pos) {
                if let Some((ux, uy)) = inf.direction() {
                    let force = inf.force * PULL;
                    f.pos.x += ux * force;
                    f.pos.y += uy * force;
                }
            }

            f.pos.x = wrap(f.pos.x, width);
            f.pos.y = wrap(f.pos.y, height);
        }
    }

    fn draw(&self, surface: &mut dyn Surface, theme: Theme) {
        let palette = palette(theme);
        for f in &self.flies {
            let opacity = f.opacity();
            let glow = f.glow_size();
            let [inner, mid, outer] = palette.glow;
            surface.fill_glow(
                f.pos,
                glow * 3.0,
                &[
                    ColorStop::new(0.0, inner.with_alpha(opacity)),
                    ColorStop::new(0.4, mid.with_alpha(opacity * 0.5)),
                    ColorStop::new(1.0, outer),
                ],
            );
            surface.fill_circle(f.pos, glow * 0.5, palette.core.with_alpha(opacity));
        }
    }

    fn destroy(&mut self) {
        self.flies.clear();
    }

    fn len(&self) -> usize {
        self.flies.len()
    }

    fn positions(&self) -> Vec<Point> {
        self.flies.iter().map(|f| f.pos).collect()
    }

    fn margin(&self) -> f64 {
        WRAP_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_to_opposite_edge() {
        assert_eq!(wrap(-20.5, 800.0), 820.0);
        assert_eq!(wrap(820.5, 800.0), -20.0);
        assert_eq!(wrap(400.0, 800.0), 400.0);
    }

    #[test]
    fn speed_stays_clamped() {
        let mut fx = FirefliesEffect::new(ParticleBudget::default(), 3);
        fx.bind(Viewport::new(800.0, 600.0));
        fx.create_particles();
        let mouse = MouseState::new(150.0);
        for _ in 0..500 {
            fx.update(&mouse);
        }
        assert!(fx
            .flies()
            .iter()
            .all(|f| f.vx.abs() <= MAX_SPEED && f.vy.abs() <= MAX_SPEED));
    }

    #[test]
    fn pointer_attracts() {
        let mut fx = FirefliesEffect::new(ParticleBudget::default(), 3);
        fx.bind(Viewport::new(800.0, 600.0));
        fx.flies = vec![Firefly {
            pos: Point::new(400.0, 300.0),
            vx: 0.0,
            vy: 0.0,
            size: 3.0,
            pulse: 0.0,
            pulse_speed: 0.0,
            max_opacity: 1.0,
        }];
        let mut mouse = MouseState::new(150.0);
        mouse.set(Point::new(400.0, 330.0));
        let mut total_dy = 0.0;
        for _ in 0..20 {
            let before = fx.flies()[0].pos.y;
            fx.update(&mouse);
            total_dy += fx.flies()[0].pos.y - before;
        }
        assert!(total_dy > 0.0);
    }
}
