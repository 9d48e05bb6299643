//! Twinkling starfield with the occasional shooting star.

use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_4, TAU};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{between, jitter, random_point, Effect, EffectName};
use crate::config::ParticleBudget;
use crate::input::MouseState;
use crate::surface::{ColorStop, Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

pub const DENSITY: f64 = 1.5;
/// Longest trail a shooting star keeps; older points are evicted first.
pub const TRAIL_CAP: usize = 20;
/// Shooting stars are dropped once this far past the right or bottom edge.
pub const EXIT_MARGIN: f64 = 100.0;
/// Frames that must pass between two shooting stars.
const COOLDOWN_FRAMES: u32 = 120;
/// Per-frame chance of a spawn once the cooldown has elapsed.
const SPAWN_CHANCE: f64 = 0.02;
const FADE_PER_FRAME: f64 = 0.015;
const HEAD_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub pos: Point,
    pub size: f64,
    pub twinkle: f64,
    pub twinkle_speed: f64,
    pub base_opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Point,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShootingStar {
    pub pos: Point,
    pub speed: f64,
    pub angle: f64,
    pub opacity: f64,
    trail: VecDeque<TrailPoint>,
}

impl ShootingStar {
    pub fn new(pos: Point, speed: f64, angle: f64) -> Self {
        Self {
            pos,
            speed,
            angle,
            opacity: 1.0,
            trail: VecDeque::with_capacity(TRAIL_CAP + 1),
        }
    }

    /// Oldest point first.
    pub fn trail(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.trail.iter()
    }

    /// Advance one frame and record the new head in the trail.
    pub fn advance(&mut self) {
        self.pos.x += self.angle.cos() * self.speed;
        self.pos.y += self.angle.sin() * self.speed;
        self.opacity -= FADE_PER_FRAME;

        self.trail.push_back(TrailPoint {
            pos: self.pos,
            opacity: self.opacity,
        });
        if self.trail.len() > TRAIL_CAP {
            self.trail.pop_front();
        }
    }

    pub fn is_alive(&self, viewport: Viewport) -> bool {
        self.opacity > 0.0
            && self.pos.x < viewport.width + EXIT_MARGIN
            && self.pos.y < viewport.height + EXIT_MARGIN
    }
}

struct Palette {
    glow: [Rgba; 3],
    core: Rgba,
    trail: Rgba,
    head: [Rgba; 3],
}

fn palette(theme: Theme) -> Palette {
    let violet = Rgba::new(147, 51, 234, 1.0);
    let lavender = Rgba::new(200, 180, 255, 1.0);
    match theme {
        Theme::Dark => Palette {
            glow: [lavender, Rgba::new(168, 85, 247, 1.0), violet.with_alpha(0.0)],
            core: Rgba::new(255, 255, 255, 1.0),
            trail: lavender,
            head: [
                Rgba::new(255, 255, 255, 1.0),
                lavender,
                Rgba::new(168, 85, 247, 0.0),
            ],
        },
        Theme::Light => Palette {
            glow: [violet, Rgba::new(124, 58, 237, 1.0), Rgba::new(109, 40, 217, 0.0)],
            core: violet,
            trail: violet,
            head: [lavender, violet, Rgba::new(124, 58, 237, 0.0)],
        },
    }
}

#[derive(Debug)]
pub struct StarsEffect {
    budget: ParticleBudget,
    viewport: Viewport,
    rng: ChaCha8Rng,
    stars: Vec<Star>,
    shooting: Vec<ShootingStar>,
    frames_since_spawn: u32,
}

impl StarsEffect {
    pub fn new(budget: ParticleBudget, seed: u64) -> Self {
        Self {
            budget,
            viewport: Viewport::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            stars: Vec::new(),
            shooting: Vec::new(),
            frames_since_spawn: 0,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting
    }

    fn spawn_shooting_star(&mut self) {
        let rng = &mut self.rng;
        let pos = Point::new(
            rng.gen::<f64>() * self.viewport.width,
            rng.gen::<f64>() * self.viewport.height * 0.5,
        );
        let speed = between(rng, 8.0, 10.0);
        let angle = FRAC_PI_4 + jitter(rng, 0.3);
        self.shooting.push(ShootingStar::new(pos, speed, angle));
    }
}

impl Effect for StarsEffect {
    fn name(&self) -> EffectName {
        EffectName::Stars
    }

    fn bind(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_particles(&mut self) {
        self.shooting.clear();
        self.frames_since_spawn = 0;
        let count = self.budget.count(self.viewport.width, DENSITY);
        let rng = &mut self.rng;
        self.stars = (0..count)
            .map(|_| Star {
                pos: random_point(rng, self.viewport),
                size: between(rng, 0.5, 2.0),
                twinkle: between(rng, 0.0, TAU),
                twinkle_speed: between(rng, 0.01, 0.03),
                base_opacity: between(rng, 0.3, 0.5),
            })
            .collect();
    }

    fn update(&mut self, _mouse: &MouseState) {
        for star in &mut self.stars {
            star.twinkle += star.twinkle_speed;
        }

        self.frames_since_spawn += 1;
        if self.frames_since_spawn > COOLDOWN_FRAMES && self.rng.gen::<f64>() < SPAWN_CHANCE {
            self.spawn_shooting_star();
            self.frames_since_spawn = 0;
        }

        let viewport = self.viewport;
        self.shooting.retain_mut(|s| {
            s.advance();
            s.is_alive(viewport)
        });
    }

    fn draw(&self, surface: &mut dyn Surface, theme: Theme) {
        let palette = palette(theme);

        for star in &self.stars {
            let opacity = star.base_opacity + star.twinkle.sin() * 0.3;
            let size = star.size + star.twinkle.sin() * 0.5;
            surface.fill_glow(
                star.pos,
                size * 3.0,
                &[
                    ColorStop::new(0.0, palette.glow[0].with_alpha(opacity)),
                    ColorStop::new(0.3, palette.glow[1].with_alpha(opacity * 0.5)),
                    ColorStop::new(1.0, palette.glow[2]),
                ],
            );
            surface.fill_circle(star.pos, size * 0.5, palette.core.with_alpha(opacity));
        }

        for s in &self.shooting {
            let len = s.trail.len() as f64;
            for (i, point) in s.trail().enumerate() {
                let t = i as f64 / len;
                let alpha = t * point.opacity * 0.5;
                surface.fill_circle(point.pos, t * 3.0, palette.trail.with_alpha(alpha));
            }
            surface.fill_glow(
                s.pos,
                HEAD_RADIUS,
                &[
                    ColorStop::new(0.0, palette.head[0].with_alpha(s.opacity)),
                    ColorStop::new(0.5, palette.head[1].with_alpha(s.opacity * 0.5)),
                    ColorStop::new(1.0, palette.head[2]),
                ],
            );
        }
    }

    fn destroy(&mut self) {
        self.stars.clear();
        self.shooting.clear();
        self.frames_since_spawn = 0;
    }

    fn len(&self) -> usize {
        self.stars.len() + self.shooting.len()
    }

    fn positions(&self) -> Vec<Point> {
        self.stars
            .iter()
            .map(|s| s.pos)
            .chain(self.shooting.iter().map(|s| s.pos))
            .collect()
    }

    fn margin(&self) -> f64 {
        EXIT_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DrawOp, RecordingSurface};

    #[test]
    fn trail_is_capped_and_evicts_oldest() {
        let mut s = ShootingStar::new(Point::new(0.0, 0.0), 1.0, 0.0);
        for _ in 0..30 {
            s.advance();
        }
        assert_eq!(s.trail().len(), TRAIL_CAP);
        let xs: Vec<f64> = s.trail().map(|p| p.pos.x).collect();
        assert_eq!(xs.first().copied(), Some(11.0));
        assert_eq!(xs.last().copied(), Some(30.0));
    }

    #[test]
    fn shooting_star_dies_when_faded() {
        let vp = Viewport::new(10_000.0, 10_000.0);
        let mut s = ShootingStar::new(Point::new(0.0, 0.0), 1.0, FRAC_PI_4);
        let mut frames = 0;
        while s.is_alive(vp) {
            s.advance();
            frames += 1;
        }
        assert_eq!(frames, 67);
    }

    #[test]
    fn shooting_star_dies_past_exit_margin() {
        let vp = Viewport::new(100.0, 100.0);
        let mut s = ShootingStar::new(Point::new(195.0, 50.0), 10.0, 0.0);
        s.advance();
        assert!(!s.is_alive(vp));
    }

    #[test]
    fn no_spawn_during_cooldown() {
        let mut fx = StarsEffect::new(ParticleBudget::default(), 5);
        fx.bind(Viewport::new(1200.0, 800.0));
        fx.create_particles();
        let mouse = MouseState::new(150.0);
        for _ in 0..COOLDOWN_FRAMES {
            fx.update(&mouse);
        }
        assert!(fx.shooting_stars().is_empty());
    }

    #[test]
    fn shooting_stars_eventually_appear() {
        let mut fx = StarsEffect::new(ParticleBudget::default(), 5);
        fx.bind(Viewport::new(1200.0, 800.0));
        fx.create_particles();
        let mouse = MouseState::new(150.0);
        let mut seen = false;
        for _ in 0..2_000 {
            fx.update(&mouse);
            seen |= !fx.shooting_stars().is_empty();
        }
        assert!(seen);
    }

    #[test]
    fn trail_fades_by_age_and_head_glows() {
        let mut fx = StarsEffect::new(ParticleBudget::default(), 5);
        fx.bind(Viewport::new(1200.0, 800.0));
        let mut star = ShootingStar::new(Point::new(100.0, 100.0), 10.0, 0.0);
        for _ in 0..4 {
            star.advance();
        }
        fx.shooting.push(star.clone());

        let mut surface = RecordingSurface::new(fx.viewport());
        fx.draw(&mut surface, Theme::Dark);
        let ops = surface.ops();
        assert_eq!(ops.len(), 5);

        for (i, (op, point)) in ops.iter().zip(star.trail()).enumerate() {
            let t = i as f64 / 4.0;
            let DrawOp::Circle {
                center,
                radius,
                color,
            } = op
            else {
                panic!("trail dot {i} drawn as {op:?}");
            };
            assert_eq!(*center, point.pos);
            assert!((radius - t * 3.0).abs() < 1e-12);
            assert!((color.a - t * point.opacity * 0.5).abs() < 1e-12);
        }

        let DrawOp::Glow {
            center,
            radius,
            stops,
        } = &ops[4]
        else {
            panic!("head drawn as {:?}", ops[4]);
        };
        assert_eq!(*center, star.pos);
        assert_eq!(*radius, HEAD_RADIUS);
        assert_eq!(stops.len(), 3);
        assert!((stops[0].color.a - star.opacity).abs() < 1e-12);
        assert_eq!(stops[2].offset, 1.0);
    }
}
