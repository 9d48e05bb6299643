//! Owns the canvas, the effect instances and the switch state machine.

use tracing::{debug, info, trace};

use crate::config::BackdropConfig;
use crate::effects::{Effect, EffectName};
use crate::input::MouseState;
use crate::page::Page;
use crate::preferences::Preferences;
use crate::registry::EffectRegistry;
use crate::render_loop::{RenderLoop, Scheduler, TimerHandle};
use crate::surface::{Point, Surface, Viewport};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeStage {
    /// Canvas fading out; `from` is still running.
    Out,
    /// Canvas fading back in; `to` is running.
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active(EffectName),
    Transitioning {
        from: EffectName,
        to: EffectName,
        stage: FadeStage,
        /// The only pending timer the controller owns.
        timer: TimerHandle,
    },
}

/// What a switch request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Immediate,
    Started,
    Ignored,
}

pub struct EffectController<S, K, P> {
    config: BackdropConfig,
    surface: S,
    scheduler: K,
    page: P,
    registry: EffectRegistry,
    render_loop: RenderLoop,
    phase: Phase,
    mouse: MouseState,
    theme: Theme,
    reduced_motion: bool,
}

impl<S: Surface, K: Scheduler, P: Page> EffectController<S, K, P> {
    /// Build every effect against the surface's current size and apply the
    /// saved theme. Nothing animates until [`EffectController::start`].
    pub fn new(config: BackdropConfig, surface: S, scheduler: K, mut page: P) -> Self {
        let viewport = surface.viewport();
        let registry =
            EffectRegistry::new(config.budget, viewport, config.seed.unwrap_or_default());
        let theme = Preferences::load(&page, &config.storage, config.default_effect).theme;
        page.show_theme(theme);

        Self {
            mouse: MouseState::new(config.interaction_radius),
            config,
            surface,
            scheduler,
            page,
            registry,
            render_loop: RenderLoop::new(),
            phase: Phase::Idle,
            theme,
            reduced_motion: false,
        }
    }

    /// Restore the saved effect without a fade. Does nothing when the
    /// reduced-motion preference is already on.
    pub fn start(&mut self, reduced_motion: bool) {
        self.reduced_motion = reduced_motion;
        if reduced_motion {
            info!("reduced motion preferred, backdrop stays still");
            return;
        }
        let saved = Preferences::load(&self.page, &self.config.storage, self.config.default_effect);
        self.set_effect(saved.effect, false);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Effect whose render loop is live.
    pub fn running(&self) -> Option<EffectName> {
        match self.phase {
            Phase::Idle => None,
            Phase::Active(name) => Some(name),
            Phase::Transitioning { from, stage: FadeStage::Out, .. } => Some(from),
            Phase::Transitioning { to, stage: FadeStage::In, .. } => Some(to),
        }
    }

    /// Effect the user last chose; during a transition, its target.
    pub fn current(&self) -> Option<EffectName> {
        match self.phase {
            Phase::Idle => None,
            Phase::Active(name) | Phase::Transitioning { to: name, .. } => Some(name),
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn effect(&self, name: EffectName) -> &dyn Effect {
        self.registry.get(name)
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn frames_rendered(&self) -> u64 {
        self.render_loop.frames()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut K {
        &mut self.scheduler
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Switch by name; unknown names are ignored.
    pub fn set_effect_by_name(&mut self, name: &str, animate: bool) -> Switch {
        match name.parse() {
            Ok(name) => self.set_effect(name, animate),
            Err(err) => {
                debug!(%err, "ignoring effect request");
                Switch::Ignored
            }
        }
    }

    /// Selector click: re-selecting the current effect is a no-op.
    pub fn select(&mut self, name: EffectName) -> Switch {
        if self.current() == Some(name) {
            return Switch::Ignored;
        }
        self.set_effect(name, true)
    }

    /// Switch to `name`, crossfading when `animate` is set and something is
    /// already running. Requests during a transition are dropped.
    ///
    /// Reduced motion does not block this: only automatic starts are
    /// suppressed, an explicit request is honoured.
    pub fn set_effect(&mut self, name: EffectName, animate: bool) -> Switch {
        if self.is_transitioning() {
            debug!(effect = %name, "switch ignored, transition in flight");
            return Switch::Ignored;
        }

        let outcome = match self.phase {
            Phase::Active(from) if animate => {
                self.begin_transition(from, name);
                Switch::Started
            }
            _ => {
                self.page.show_background(name);
                self.activate(name);
                self.phase = Phase::Active(name);
                Switch::Immediate
            }
        };
        self.page.mark_selected(name);
        outcome
    }

    fn begin_transition(&mut self, from: EffectName, to: EffectName) {
        self.page.show_background(to);
        self.surface.fade_to(0.0, self.config.fade_out_ms);
        let timer = self.arm_timer(self.config.fade_out_ms);
        self.phase = Phase::Transitioning {
            from,
            to,
            stage: FadeStage::Out,
            timer,
        };
        debug!(%from, %to, "transition started");
    }

    /// Schedule the controller's timer, cancelling any earlier one first.
    fn arm_timer(&mut self, delay_ms: u32) -> TimerHandle {
        self.cancel_timer();
        self.scheduler.set_timeout(delay_ms)
    }

    fn cancel_timer(&mut self) {
        if let Phase::Transitioning { timer, .. } = self.phase {
            self.scheduler.clear_timeout(timer);
        }
    }

    /// Host callback for a fired timer.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        let Phase::Transitioning {
            from,
            to,
            stage,
            timer,
        } = self.phase
        else {
            trace!(?handle, "timer fired outside a transition");
            return;
        };
        if timer != handle {
            trace!(?handle, "stale timer ignored");
            return;
        }

        match stage {
            FadeStage::Out => {
                self.activate(to);
                self.surface.fade_to(1.0, self.config.fade_in_ms);
                let timer = self.scheduler.set_timeout(self.config.fade_in_ms);
                self.phase = Phase::Transitioning {
                    from,
                    to,
                    stage: FadeStage::In,
                    timer,
                };
            }
            FadeStage::In => {
                self.surface.settle();
                self.phase = Phase::Active(to);
                debug!(%from, %to, "transition complete");
            }
        }
    }

    /// Host callback for a fired animation frame.
    pub fn on_frame(&mut self) {
        let Some(name) = self.running() else {
            trace!("frame fired while idle");
            return;
        };
        let effect = self.registry.get_mut(name);
        self.render_loop.tick(
            &mut self.scheduler,
            effect,
            &mut self.surface,
            &self.mouse,
            self.theme,
        );
    }

    /// Tear down whatever runs now, then build and start `name`.
    fn activate(&mut self, name: EffectName) {
        self.halt();
        self.surface.clear();

        let viewport = self.surface.viewport();
        let effect = self.registry.get_mut(name);
        effect.bind(viewport);
        effect.create_particles();
        let particles = effect.len();

        self.render_loop.start(&mut self.scheduler);
        self.page.show_effect(name);
        Preferences::save_effect(&mut self.page, &self.config.storage, name);
        info!(effect = %name, particles, "effect active");
    }

    /// Stop the frame loop and destroy the running effect.
    fn halt(&mut self) {
        self.render_loop.stop(&mut self.scheduler);
        if let Some(name) = self.running() {
            self.registry.get_mut(name).destroy();
        }
    }

    /// Stop everything: pending timer, frame loop, running effect. The canvas
    /// is cleared and left fully opaque. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.is_transitioning() {
            self.cancel_timer();
            self.surface.fade_to(1.0, 0);
            self.surface.settle();
        }
        self.halt();
        self.surface.clear();
        self.phase = Phase::Idle;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.surface.resize(viewport);
        self.registry.bind_all(viewport);
        if let Some(name) = self.running() {
            self.registry.get_mut(name).create_particles();
        }
        debug!(width = viewport.width, height = viewport.height, "resized");
    }

    /// Turning the preference on halts the backdrop; turning it off again
    /// does not restart anything. Either way the next explicit
    /// [`EffectController::set_effect`] starts an effect.
    pub fn set_reduced_motion(&mut self, reduce: bool) {
        if reduce == self.reduced_motion {
            return;
        }
        self.reduced_motion = reduce;
        if reduce {
            self.teardown();
            info!("reduced motion enabled, backdrop halted");
        } else {
            info!("reduced motion disabled");
        }
    }

    pub fn set_pointer(&mut self, position: Point) {
        self.mouse.set(position);
    }

    pub fn clear_pointer(&mut self) {
        self.mouse.clear();
    }

    /// Takes effect on the next frame; particles are left untouched.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.page.show_theme(theme);
        Preferences::save_theme(&mut self.page, &self.config.storage, theme);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggle();
        self.set_theme(theme);
        theme
    }
}
