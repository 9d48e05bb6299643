use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{between, jitter, random_point, Effect, EffectName};
use crate::config::ParticleBudget;
use crate::input::MouseState;
use crate::surface::{ColorStop, Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

pub const DENSITY: f64 = 1.5;
pub const EDGE_MARGIN: f64 = 10.0;
const WOBBLE_AMPLITUDE: f64 = 0.5;
const PUSH: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flake {
    pub pos: Point,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub wobble: f64,
    pub wobble_speed: f64,
    pub opacity: f64,
}

/// Falling flakes that sway, dodge the pointer and recycle at the top.
#[derive(Debug)]
pub struct SnowEffect {
    budget: ParticleBudget,
    viewport: Viewport,
    rng: ChaCha8Rng,
    flakes: Vec<Flake>,
}

impl SnowEffect {
    pub fn new(budget: ParticleBudget, seed: u64) -> Self {
        Self {
            budget,
            viewport: Viewport::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            flakes: Vec::new(),
        }
    }

    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }
}

impl Effect for SnowEffect {
    fn name(&self) -> EffectName {
        EffectName::Snow
    }

    fn bind(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_particles(&mut self) {
        let count = self.budget.count(self.viewport.width, DENSITY);
        let rng = &mut self.rng;
        self.flakes = (0..count)
            .map(|_| Flake {
                pos: random_point(rng, self.viewport),
                size: between(rng, 1.0, 4.0),
                vy: between(rng, 0.5, 1.0),
                vx: jitter(rng, 0.5),
                wobble: between(rng, 0.0, TAU),
                wobble_speed: between(rng, 0.01, 0.02),
                opacity: between(rng, 0.3, 0.5),
            })
            .collect();
    }

    fn update(&mut self, mouse: &MouseState) {
        let Viewport { width, height } = self.viewport;
        for f in &mut self.flakes {
            f.wobble += f.wobble_speed;
            f.pos.x += f.wobble.sin() * WOBBLE_AMPLITUDE + f.vx;
            f.pos.y += f.vy;

            // Repulsion: move against the particle-to-pointer direction.
            if let Some(inf) = mouse.influence(f.pos) {
                if let Some((ux, uy)) = inf.direction() {
                    f.pos.x -= ux * inf.force * PUSH;
                    f.pos.y -= uy * inf.force * PUSH;
                }
            }

            if f.pos.y > height + EDGE_MARGIN {
                f.pos.y = -EDGE_MARGIN;
                f.pos.x = self.rng.gen::<f64>() * width;
            }
            f.pos.y = f.pos.y.max(-EDGE_MARGIN);
            if f.pos.x < -EDGE_MARGIN {
                f.pos.x = width + EDGE_MARGIN;
            } else if f.pos.x > width + EDGE_MARGIN {
                f.pos.x = -EDGE_MARGIN;
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface, theme: Theme) {
        let (glow, core) = match theme {
            Theme::Dark => (
                [
                    Rgba::new(255, 255, 255, 1.0),
                    Rgba::new(200, 230, 255, 1.0),
                    Rgba::new(150, 200, 255, 0.0),
                ],
                Rgba::new(255, 255, 255, 1.0),
            ),
            Theme::Light => (
                [
                    Rgba::new(0, 150, 200, 1.0),
                    Rgba::new(0, 120, 180, 1.0),
                    Rgba::new(0, 100, 150, 0.0),
                ],
                Rgba::new(0, 180, 220, 1.0),
            ),
        };

        for f in &self.flakes {
            surface.fill_glow(
                f.pos,
                f.size * 2.0,
                &[
                    ColorStop::new(0.0, glow[0].with_alpha(f.opacity)),
                    ColorStop::new(0.5, glow[1].with_alpha(f.opacity * 0.5)),
                    ColorStop::new(1.0, glow[2]),
                ],
            );
            surface.fill_circle(f.pos, f.size * 0.5, core.with_alpha(f.opacity));
        }
    }

    fn destroy(&mut self) {
        self.flakes.clear();
    }

    fn len(&self) -> usize {
        self.flakes.len()
    }

    fn positions(&self) -> Vec<Point> {
        self.flakes.iter().map(|f| f.pos).collect()
    }

    fn margin(&self) -> f64 {
        EDGE_MARGIN
    }
}
