//! Pointer state and the bridge that feeds host events to the controller.

use tracing::trace;

use crate::config::BackdropConfig;
use crate::controller::EffectController;
use crate::page::Page;
use crate::render_loop::Scheduler;
use crate::surface::{Point, Surface, Viewport};

/// Pointer position, absent when the pointer is outside the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseState {
    position: Option<Point>,
    pub radius: f64,
}

/// Offset from a particle to the pointer, with the falloff already applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Influence {
    /// Pointer minus particle.
    pub dx: f64,
    pub dy: f64,
    pub distance: f64,
    /// `(radius - distance) / radius`, in `(0, 1]`.
    pub force: f64,
}

impl Influence {
    /// Unit vector from the particle towards the pointer, `None` when they
    /// coincide.
    pub fn direction(&self) -> Option<(f64, f64)> {
        (self.distance > 0.0).then(|| (self.dx / self.distance, self.dy / self.distance))
    }
}

impl MouseState {
    pub fn new(radius: f64) -> Self {
        Self {
            position: None,
            radius,
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn set(&mut self, p: Point) {
        self.position = Some(p);
    }

    pub fn clear(&mut self) {
        self.position = None;
    }

    /// Influence on a particle at `p`, only when it is strictly inside the
    /// interaction radius.
    pub fn influence(&self, p: Point) -> Option<Influence> {
        let pointer = self.position?;
        let dx = pointer.x - p.x;
        let dy = pointer.y - p.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < self.radius {
            Some(Influence {
                dx,
                dy,
                distance,
                force: (self.radius - distance) / self.radius,
            })
        } else {
            None
        }
    }
}

/// Drops events arriving within `window_ms` of the last admitted one.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    window_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_ms: None,
        }
    }

    pub fn admit(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.window_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}

/// Host-facing entry point for pointer, resize and reduced-motion signals.
#[derive(Debug)]
pub struct InputBridge {
    throttle: Throttle,
}

impl InputBridge {
    pub fn new(config: &BackdropConfig) -> Self {
        Self {
            throttle: Throttle::new(config.pointer_throttle_ms),
        }
    }

    /// Forward a pointer move unless one was forwarded within the throttle
    /// window. Returns whether it was forwarded.
    pub fn pointer_moved<S: Surface, K: Scheduler, P: Page>(
        &mut self,
        controller: &mut EffectController<S, K, P>,
        now_ms: f64,
        position: Point,
    ) -> bool {
        if !self.throttle.admit(now_ms) {
            trace!(now_ms, "pointer move dropped");
            return false;
        }
        controller.set_pointer(position);
        true
    }

    pub fn pointer_left<S: Surface, K: Scheduler, P: Page>(
        &mut self,
        controller: &mut EffectController<S, K, P>,
    ) {
        controller.clear_pointer();
    }

    pub fn resized<S: Surface, K: Scheduler, P: Page>(
        &mut self,
        controller: &mut EffectController<S, K, P>,
        viewport: Viewport,
    ) {
        controller.resize(viewport);
    }

    pub fn reduced_motion_changed<S: Surface, K: Scheduler, P: Page>(
        &mut self,
        controller: &mut EffectController<S, K, P>,
        reduce: bool,
    ) {
        controller.set_reduced_motion(reduce);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influence_only_inside_radius() {
        let mut mouse = MouseState::new(150.0);
        assert!(mouse.influence(Point::new(0.0, 0.0)).is_none());

        mouse.set(Point::new(100.0, 100.0));
        let near = mouse.influence(Point::new(100.0, 25.0)).unwrap();
        assert_eq!(near.distance, 75.0);
        assert_eq!(near.force, 0.5);
        assert_eq!(near.direction(), Some((0.0, 1.0)));

        assert!(mouse.influence(Point::new(100.0, 250.0)).is_none());

        mouse.clear();
        assert!(mouse.position().is_none());
    }

    #[test]
    fn coincident_pointer_has_no_direction() {
        let mut mouse = MouseState::new(150.0);
        mouse.set(Point::new(10.0, 10.0));
        let inf = mouse.influence(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(inf.force, 1.0);
        assert!(inf.direction().is_none());
    }

    #[test]
    fn throttle_drops_events_inside_window() {
        let mut throttle = Throttle::new(16.0);
        assert!(throttle.admit(1000.0));
        assert!(!throttle.admit(1005.0));
        assert!(!throttle.admit(1015.9));
        assert!(throttle.admit(1016.0));
        assert!(!throttle.admit(1020.0));
    }
}
