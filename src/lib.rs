#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Animated canvas backdrop: five switchable particle effects behind a
//! crossfading controller.
//!
//! Everything outside `wasm` is host-independent and runs natively against
//! the [`headless`] host.

pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod headless;
pub mod input;
pub mod page;
pub mod preferences;
pub mod registry;
pub mod render_loop;
pub mod surface;
pub mod theme;

pub use config::{BackdropConfig, ParticleBudget, StorageKeys};
pub use controller::{EffectController, FadeStage, Phase, Switch};
pub use effects::{Effect, EffectName};
pub use error::BackdropError;
pub use input::{InputBridge, MouseState};
pub use page::Page;
pub use registry::EffectRegistry;
pub use render_loop::{FrameHandle, RenderLoop, Scheduler, TimerHandle};
pub use surface::{ColorStop, Point, Rgba, Surface, Viewport};
pub use theme::Theme;

// Only compile the browser host when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing::info;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use crate::{BackdropConfig, BackdropError, EffectController, InputBridge, Switch};

    mod input;
    mod log;
    mod page;
    mod render;

    pub use page::BrowserPage;
    pub use render::{CanvasSurface, WasmScheduler};

    pub type Backdrop =
        EffectController<render::CanvasSurface, render::WasmScheduler, page::BrowserPage>;

    const CONFIG_ATTR: &str = "data-backdrop-config";
    const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<Backdrop>>>> = const { RefCell::new(None) };
    }

    impl From<BackdropError> for JsValue {
        fn from(err: BackdropError) -> Self {
            js_sys::Error::new(&err.to_string()).into()
        }
    }

    fn with_app<R>(f: impl FnOnce(&mut Backdrop) -> R) -> Option<R> {
        APP.with(|slot| {
            let app = slot.borrow().clone()?;
            let mut app = app.borrow_mut();
            Some(f(&mut app))
        })
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or(BackdropError::MissingGlobal("window"))?;
        let document = window
            .document()
            .ok_or(BackdropError::MissingGlobal("document"))?;
        let body = document
            .body()
            .ok_or(BackdropError::MissingGlobal("document.body"))?;

        let mut config = match body.get_attribute(CONFIG_ATTR) {
            Some(json) => BackdropConfig::from_json(&json)?,
            None => BackdropConfig::default(),
        };
        log::init(config.level());
        if config.seed.is_none() {
            config.seed = Some((js_sys::Math::random() * f64::from(u32::MAX)) as u64);
        }

        let canvas = document
            .get_element_by_id(&config.canvas_id)
            .ok_or_else(|| BackdropError::ElementNotFound(config.canvas_id.clone()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BackdropError::ElementNotFound(config.canvas_id.clone()))?;

        let surface = render::CanvasSurface::new(canvas, input::window_viewport(&window))?;
        let page = page::BrowserPage::new(&window, &document)?;
        let reduced_motion = window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .map(|mql| mql.matches())
            .unwrap_or(false);

        let bridge = Rc::new(RefCell::new(InputBridge::new(&config)));
        let app: Rc<RefCell<Backdrop>> = Rc::new_cyclic(|weak| {
            let scheduler = render::WasmScheduler::new(window.clone(), weak.clone());
            RefCell::new(EffectController::new(config, surface, scheduler, page))
        });

        input::attach(&window, &document, &app, &bridge)?;
        app.borrow_mut().start(reduced_motion);
        info!(effect = ?app.borrow().current(), "backdrop started");

        APP.with(|slot| *slot.borrow_mut() = Some(app));
        Ok(())
    }

    /// Switch effects with a crossfade. Returns false when the request was
    /// ignored (unknown name, transition in flight).
    #[wasm_bindgen]
    pub fn set_effect(name: &str) -> bool {
        with_app(|app| app.set_effect_by_name(name, true) != Switch::Ignored).unwrap_or(false)
    }

    /// Flip between the dark and light theme; returns the new theme.
    #[wasm_bindgen]
    pub fn toggle_theme() -> Option<String> {
        with_app(|app| app.toggle_theme().to_string())
    }

    #[wasm_bindgen]
    pub fn current_effect() -> Option<String> {
        with_app(|app| app.current().map(|name| name.to_string())).flatten()
    }
}
