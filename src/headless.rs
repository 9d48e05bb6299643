//! In-memory host: a recording surface, a manually driven scheduler and a
//! map-backed page. Drives the preview binary and the native test suite.

use std::collections::HashMap;

use crate::config::BackdropConfig;
use crate::controller::EffectController;
use crate::effects::EffectName;
use crate::error::BackdropError;
use crate::page::Page;
use crate::render_loop::{FrameHandle, Scheduler, TimerHandle};
use crate::surface::{ColorStop, Point, Rgba, Surface, Viewport};
use crate::theme::Theme;

/// Frame interval of a 60Hz display.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Veil(Rgba),
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
    Glow {
        center: Point,
        radius: f64,
        stops: Vec<ColorStop>,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba,
    },
    Glyph {
        glyph: char,
        at: Point,
        font_px: f64,
        color: Rgba,
    },
}

#[derive(Debug)]
pub struct RecordingSurface {
    viewport: Viewport,
    opacity: f64,
    fading: bool,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            opacity: 1.0,
            fading: false,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Target opacity of the canvas element.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Whether a fade transition style is still attached.
    pub fn is_fading(&self) -> bool {
        self.fading
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.ops.push(DrawOp::Clear);
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn veil(&mut self, color: Rgba) {
        self.ops.push(DrawOp::Veil(color));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_glow(&mut self, center: Point, radius: f64, stops: &[ColorStop]) {
        self.ops.push(DrawOp::Glow {
            center,
            radius,
            stops: stops.to_vec(),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_glyph(&mut self, glyph: char, at: Point, font_px: f64, color: Rgba) {
        self.ops.push(DrawOp::Glyph {
            glyph,
            at,
            font_px,
            color,
        });
    }

    fn fade_to(&mut self, opacity: f64, _duration_ms: u32) {
        self.opacity = opacity;
        self.fading = true;
    }

    fn settle(&mut self) {
        self.fading = false;
    }
}

/// Scheduler whose clock only moves when told to.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now_ms: f64,
    next_id: u32,
    frames: Vec<FrameHandle>,
    timers: Vec<(TimerHandle, f64)>,
}

impl ManualScheduler {
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn advance_clock(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    /// Frame requests neither fired nor cancelled.
    pub fn outstanding_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Pop the oldest outstanding frame request.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        (!self.frames.is_empty()).then(|| self.frames.remove(0))
    }

    /// Pop the earliest timer that is due.
    pub fn take_due_timer(&mut self) -> Option<TimerHandle> {
        let (idx, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, (_, due))| *due <= self.now_ms)
            .min_by(|a, b| a.1 .1.total_cmp(&b.1 .1))?;
        Some(self.timers.remove(idx).0)
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        self.frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|h| *h != handle);
    }

    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        let handle = TimerHandle(self.next_id());
        self.timers.push((handle, self.now_ms + f64::from(delay_ms)));
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.retain(|(h, _)| *h != handle);
    }
}

/// Page backed by a map, recording the indicators it was asked to show.
#[derive(Debug, Default)]
pub struct MemoryPage {
    entries: HashMap<String, String>,
    fail_writes: bool,
    pub shown_effect: Option<EffectName>,
    pub background: Option<EffectName>,
    pub selected: Option<EffectName>,
    pub theme: Option<Theme>,
}

impl MemoryPage {
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Make every subsequent `store` fail, like a full or disabled storage.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl Page for MemoryPage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), BackdropError> {
        if self.fail_writes {
            return Err(BackdropError::Storage("quota exceeded".to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn show_effect(&mut self, name: EffectName) {
        self.shown_effect = Some(name);
    }

    fn show_background(&mut self, name: EffectName) {
        self.background = Some(name);
    }

    fn mark_selected(&mut self, name: EffectName) {
        self.selected = Some(name);
    }

    fn show_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }
}

pub type HeadlessBackdrop = EffectController<RecordingSurface, ManualScheduler, MemoryPage>;

impl HeadlessBackdrop {
    pub fn headless(config: BackdropConfig, viewport: Viewport, page: MemoryPage) -> Self {
        EffectController::new(
            config,
            RecordingSurface::new(viewport),
            ManualScheduler::default(),
            page,
        )
    }

    /// Fire the next outstanding frame, if there is one.
    pub fn pump_frame(&mut self) -> bool {
        if self.scheduler_mut().take_frame().is_none() {
            return false;
        }
        self.on_frame();
        true
    }

    pub fn fire_due_timers(&mut self) -> usize {
        let mut fired = 0;
        while let Some(handle) = self.scheduler_mut().take_due_timer() {
            self.on_timer(handle);
            fired += 1;
        }
        fired
    }

    /// Move the clock forward by `ms`, one display frame at a time, firing
    /// timers and frames as they come due. Returns the frames pumped.
    pub fn advance(&mut self, ms: f64) -> u64 {
        let mut remaining = ms;
        let mut frames = 0;
        while remaining > 0.0 {
            let step = remaining.min(FRAME_MS);
            self.scheduler_mut().advance_clock(step);
            remaining -= step;
            self.fire_due_timers();
            if self.pump_frame() {
                frames += 1;
            }
        }
        frames
    }
}
