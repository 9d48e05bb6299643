use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Element, Event, EventTarget, MediaQueryListEvent, MouseEvent, Window};

use super::page::OPTION_SELECTOR;
use super::{Backdrop, REDUCED_MOTION_QUERY};
use crate::effects::EffectName;
use crate::input::InputBridge;
use crate::surface::{Point, Viewport};
use crate::BackdropError;

const THEME_TOGGLE_ID: &str = "themeToggle";

pub fn window_viewport(window: &Window) -> Viewport {
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
}

fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Attach `handler` for `event` on `target` for the lifetime of the page.
fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), BackdropError> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|err| BackdropError::Js(format!("{err:?}")))?;
    closure.forget();
    Ok(())
}

/// Wire window, media-query and selector events to the bridge and controller.
pub fn attach(
    window: &Window,
    document: &Document,
    app: &Rc<RefCell<Backdrop>>,
    bridge: &Rc<RefCell<InputBridge>>,
) -> Result<(), BackdropError> {
    {
        let (app, bridge, win) = (app.clone(), bridge.clone(), window.clone());
        listen(window, "resize", move |_| {
            let viewport = window_viewport(&win);
            let mut app = app.borrow_mut();
            bridge.borrow_mut().resized(&mut *app, viewport);
        })?;
    }

    {
        let (app, bridge, win) = (app.clone(), bridge.clone(), window.clone());
        listen(window, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let at = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
            let mut app = app.borrow_mut();
            bridge.borrow_mut().pointer_moved(&mut *app, now_ms(&win), at);
        })?;
    }

    {
        let (app, bridge) = (app.clone(), bridge.clone());
        listen(window, "mouseout", move |event| {
            // Only leaving the window counts, not moving between elements.
            let left_window = event
                .dyn_ref::<MouseEvent>()
                .map_or(true, |e| e.related_target().is_none());
            if left_window {
                let mut app = app.borrow_mut();
                bridge.borrow_mut().pointer_left(&mut *app);
            }
        })?;
    }

    if let Some(query) = window.match_media(REDUCED_MOTION_QUERY).ok().flatten() {
        let (app, bridge) = (app.clone(), bridge.clone());
        listen(&query, "change", move |event| {
            if let Some(event) = event.dyn_ref::<MediaQueryListEvent>() {
                let mut app = app.borrow_mut();
                bridge
                    .borrow_mut()
                    .reduced_motion_changed(&mut *app, event.matches());
            }
        })?;
    }

    let options = document
        .query_selector_all(OPTION_SELECTOR)
        .map_err(|err| BackdropError::Js(format!("{err:?}")))?;
    for i in 0..options.length() {
        let Some(option) = options.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let app = app.clone();
        let tagged = option.clone();
        listen(&option, "click", move |_| {
            let Some(raw) = tagged.get_attribute("data-effect") else {
                return;
            };
            match raw.parse::<EffectName>() {
                Ok(name) => {
                    app.borrow_mut().select(name);
                }
                Err(err) => debug!(%err, "selector option ignored"),
            }
        })?;
    }

    if let Some(toggle) = document.get_element_by_id(THEME_TOGGLE_ID) {
        let app = app.clone();
        listen(&toggle, "click", move |_| {
            app.borrow_mut().toggle_theme();
        })?;
    }

    Ok(())
}
