//! Per-frame driver shared by every effect.

use tracing::trace;

use crate::effects::Effect;
use crate::input::MouseState;
use crate::surface::Surface;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u32);

/// Host callback scheduling: animation frames and one-shot timers.
///
/// The host calls back into the controller (`on_frame` / `on_timer`) when a
/// scheduled callback fires. Cancelled callbacks must never fire.
pub trait Scheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle;
    fn clear_timeout(&mut self, handle: TimerHandle);
}

/// Holds at most one outstanding frame request.
#[derive(Debug, Default)]
pub struct RenderLoop {
    pending: Option<FrameHandle>,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the first frame, replacing any request already outstanding.
    pub fn start<K: Scheduler>(&mut self, scheduler: &mut K) {
        self.stop(scheduler);
        self.pending = Some(scheduler.request_frame());
    }

    /// Cancel the outstanding request, if any.
    pub fn stop<K: Scheduler>(&mut self, scheduler: &mut K) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames rendered since this loop was created.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame (clear, update, draw) and schedule the next.
    ///
    /// A frame arriving while the loop is stopped is stale and ignored.
    pub fn tick<K: Scheduler>(
        &mut self,
        scheduler: &mut K,
        effect: &mut dyn Effect,
        surface: &mut dyn Surface,
        mouse: &MouseState,
        theme: Theme,
    ) {
        if self.pending.take().is_none() {
            trace!("stale frame ignored");
            return;
        }

        if effect.clears_each_frame() {
            surface.clear();
        }
        effect.update(mouse);
        effect.draw(surface, theme);
        self.frames += 1;

        self.pending = Some(scheduler.request_frame());
    }
}
