use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Weak;

use gloo_timers::callback::Timeout;
use tracing::{trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::Backdrop;
use crate::render_loop::{FrameHandle, Scheduler, TimerHandle};
use crate::surface::{ColorStop, Point, Rgba, Surface, Viewport};
use crate::BackdropError;

const FADE_EASING: &str = "cubic-bezier(0.4, 0, 0.2, 1)";

/// Canvas 2D context behind the [`Surface`] trait.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
}

/// Draw calls only throw on invalid geometry; log and carry on.
fn check(result: Result<(), JsValue>) {
    if let Err(err) = result {
        trace!(?err, "canvas call failed");
    }
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, viewport: Viewport) -> Result<Self, BackdropError> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|err| BackdropError::Js(format!("{err:?}")))?
            .ok_or(BackdropError::ContextUnavailable)?
            .dyn_into()
            .map_err(|_| BackdropError::ContextUnavailable)?;

        let mut surface = Self {
            canvas,
            ctx,
            viewport,
        };
        surface.resize(viewport);
        Ok(surface)
    }

    fn circle_path(&self, center: Point, radius: f64) {
        self.ctx.begin_path();
        check(self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU));
    }
}

impl Surface for CanvasSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.viewport.width, self.viewport.height);
    }

    fn veil(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx
            .fill_rect(0.0, 0.0, self.viewport.width, self.viewport.height);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.circle_path(center, radius);
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.fill();
    }

    fn fill_glow(&mut self, center: Point, radius: f64, stops: &[ColorStop]) {
        let radius = radius.max(0.0);
        let gradient = match self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
        {
            Ok(gradient) => gradient,
            Err(err) => {
                trace!(?err, "radial gradient rejected");
                return;
            }
        };
        for stop in stops {
            check(gradient.add_color_stop(stop.offset as f32, &stop.color.to_string()));
        }
        self.circle_path(center, radius);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.set_line_width(width);
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_glyph(&mut self, glyph: char, at: Point, font_px: f64, color: Rgba) {
        self.ctx.set_font(&format!("{font_px}px monospace"));
        self.ctx.set_fill_style_str(&color.to_string());
        let mut buf = [0u8; 4];
        check(self.ctx.fill_text(glyph.encode_utf8(&mut buf), at.x, at.y));
    }

    fn fade_to(&mut self, opacity: f64, duration_ms: u32) {
        let style = self.canvas.style();
        check(style.set_property("transition", &format!("opacity {duration_ms}ms {FADE_EASING}")));
        check(style.set_property("opacity", &opacity.to_string()));
    }

    fn settle(&mut self) {
        if let Err(err) = self.canvas.style().remove_property("transition") {
            trace!(?err, "could not drop transition style");
        }
    }
}

/// requestAnimationFrame and setTimeout behind the [`Scheduler`] trait.
///
/// Both callbacks re-enter the controller through a weak handle, so a
/// dropped backdrop simply stops receiving them.
pub struct WasmScheduler {
    window: Window,
    app: Weak<RefCell<Backdrop>>,
    // One closure serves every frame; it lives as long as the scheduler.
    frame: Closure<dyn FnMut(f64)>,
    next_timer: u32,
    // Dropping a `Timeout` cancels it and frees its closure.
    timers: HashMap<TimerHandle, Timeout>,
    // Fired timers whose callback may still be on the stack; freed on the
    // next frame, so at most a crossfade's worth is ever held.
    spent: Vec<Timeout>,
}

impl WasmScheduler {
    pub fn new(window: Window, app: Weak<RefCell<Backdrop>>) -> Self {
        let weak = app.clone();
        let frame = Closure::wrap(Box::new(move |_timestamp: f64| {
            if let Some(app) = weak.upgrade() {
                let mut app = app.borrow_mut();
                app.scheduler_mut().spent.clear();
                app.on_frame();
            }
        }) as Box<dyn FnMut(f64)>);

        Self {
            window,
            app,
            frame,
            next_timer: 0,
            timers: HashMap::new(),
            spent: Vec::new(),
        }
    }

    /// Timeout closures still owned by the scheduler, pending or spent.
    pub fn held_timers(&self) -> usize {
        self.timers.len() + self.spent.len()
    }
}

impl Scheduler for WasmScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        match self
            .window
            .request_animation_frame(self.frame.as_ref().unchecked_ref())
        {
            Ok(id) => FrameHandle(id as u32),
            Err(err) => {
                warn!(?err, "requestAnimationFrame failed");
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0 as i32) {
            warn!(?err, "cancelAnimationFrame failed");
        }
    }

    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        self.next_timer += 1;
        let handle = TimerHandle(self.next_timer);
        let app = self.app.clone();
        let timeout = Timeout::new(delay_ms, move || {
            if let Some(app) = app.upgrade() {
                let mut app = app.borrow_mut();
                let scheduler = app.scheduler_mut();
                if let Some(fired) = scheduler.timers.remove(&handle) {
                    scheduler.spent.push(fired);
                }
                app.on_timer(handle);
            }
        });
        self.timers.insert(handle, timeout);
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle);
    }
}
