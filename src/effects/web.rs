//! Drifting motes joined by distance-faded lines.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{between, jitter, random_point, Effect, EffectName};
use crate::config::ParticleBudget;
use crate::input::MouseState;
use crate::surface::{Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

/// Pairs closer than this are joined by a line.
pub const LINK_DISTANCE: f64 = 120.0;
const LINK_ALPHA: f64 = 0.1;
const PUSH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mote {
    pub pos: Point,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub opacity: f64,
}

#[derive(Debug)]
pub struct WebEffect {
    budget: ParticleBudget,
    viewport: Viewport,
    rng: ChaCha8Rng,
    motes: Vec<Mote>,
}

impl WebEffect {
    pub fn new(budget: ParticleBudget, seed: u64) -> Self {
        Self {
            budget,
            viewport: Viewport::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            motes: Vec::new(),
        }
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    fn ink(theme: Theme) -> Rgba {
        if theme.is_dark() {
            Rgba::new(255, 255, 255, 1.0)
        } else {
            Rgba::new(0, 0, 0, 1.0)
        }
    }
}

impl Effect for WebEffect {
    fn name(&self) -> EffectName {
        EffectName::Web
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
        self.motes = (0..count)
            .map(|_| Mote {
                pos: random_point(rng, self.viewport),
                size: between(rng, 1.0, 3.0),
                vx: jitter(rng, 0.5),
                vy: jitter(rng, 0.5),
                opacity: between(rng, 0.2, 0.5),
            })
            .collect();
    }

    fn update(&mut self, mouse: &MouseState) {
        let Viewport { width, height } = self.viewport;
        for m in &mut self.motes {
            m.pos.x += m.vx;
            m.pos.y += m.vy;

            if let Some(inf) = mouse.influence(m.pos) {
                let angle = inf.dy.atan2(inf.dx);
                m.pos.x -= angle.cos() * inf.force * PUSH;
                m.pos.y -= angle.sin() * inf.force * PUSH;
            }

            if m.pos.x < 0.0 || m.pos.x > width {
                m.vx = -m.vx;
                m.pos.x = m.pos.x.clamp(0.0, width);
            }
            if m.pos.y < 0.0 || m.pos.y > height {
                m.vy = -m.vy;
                m.pos.y = m.pos.y.clamp(0.0, height);
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface, theme: Theme) {
        let ink = Self::ink(theme);

        for m in &self.motes {
            surface.fill_circle(m.pos, m.size, ink.with_alpha(m.opacity));
        }

        // O(n^2); fine at the budget's ceiling of 120 motes.
        for (i, a) in self.motes.iter().enumerate() {
            for b in &self.motes[i + 1..] {
                let distance = a.pos.distance_to(b.pos);
                if distance < LINK_DISTANCE {
                    let alpha = LINK_ALPHA * (1.0 - distance / LINK_DISTANCE);
                    surface.stroke_line(a.pos, b.pos, 1.0, ink.with_alpha(alpha));
                }
            }
        }
    }

    fn destroy(&mut self) {
        self.motes.clear();
    }

    fn len(&self) -> usize {
        self.motes.len()
    }

    fn positions(&self) -> Vec<Point> {
        self.motes.iter().map(|m| m.pos).collect()
    }

    fn margin(&self) -> f64 {
        0.0
    }
}
