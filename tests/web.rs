#![cfg(target_arch = "wasm32")]

use std::rc::Weak;

use backdrop_wasm::wasm::{BrowserPage, CanvasSurface, WasmScheduler};
use backdrop_wasm::{EffectName, Page, Point, Rgba, Scheduler, Surface, Theme, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlCanvasElement, Window};

wasm_bindgen_test_configure!(run_in_browser);

fn dom() -> (Window, Document) {
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();
    (window, document)
}

fn append(document: &Document, tag: &str, class: &str) -> Element {
    let el = document.create_element(tag).unwrap();
    el.set_class_name(class);
    document.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn canvas_surface_sizes_and_fades() {
    let (_, document) = dom();
    let canvas: HtmlCanvasElement = append(&document, "canvas", "").dyn_into().unwrap();

    let mut surface = CanvasSurface::new(canvas.clone(), Viewport::new(320.0, 200.0)).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (320, 200));

    surface.resize(Viewport::new(640.0, 480.0));
    assert_eq!((canvas.width(), canvas.height()), (640, 480));

    // Drawing with degenerate geometry must not throw.
    surface.fill_circle(Point::new(10.0, 10.0), -1.0, Rgba::new(255, 255, 255, 1.0));
    surface.fill_glyph('7', Point::new(0.0, 14.0), 14.0, Rgba::new(0, 255, 65, 0.8));
    surface.clear();

    surface.fade_to(0.0, 500);
    let style = canvas.style();
    assert_eq!(style.get_property_value("opacity").unwrap(), "0");
    assert!(style
        .get_property_value("transition")
        .unwrap()
        .starts_with("opacity"));

    surface.fade_to(1.0, 500);
    surface.settle();
    assert_eq!(style.get_property_value("opacity").unwrap(), "1");
    assert_eq!(style.get_property_value("transition").unwrap(), "");
}

#[wasm_bindgen_test]
fn browser_page_drives_indicators() {
    let (window, document) = dom();
    let web_layer = append(&document, "div", "bg-layer bg-web");
    let snow_layer = append(&document, "div", "bg-layer bg-snow active");
    let web_option = append(&document, "button", "effect-option");
    web_option.set_attribute("data-effect", "web").unwrap();
    let snow_option = append(&document, "button", "effect-option active");
    snow_option.set_attribute("data-effect", "snow").unwrap();

    let mut page = BrowserPage::new(&window, &document).unwrap();

    page.show_background(EffectName::Web);
    assert!(web_layer.class_list().contains("active"));
    assert!(!snow_layer.class_list().contains("active"));

    page.mark_selected(EffectName::Web);
    assert!(web_option.class_list().contains("active"));
    assert!(!snow_option.class_list().contains("active"));

    page.show_effect(EffectName::Web);
    let body = document.body().unwrap();
    assert_eq!(body.get_attribute("data-effect").as_deref(), Some("web"));

    page.show_theme(Theme::Light);
    assert!(body.class_list().contains("light-theme"));
    page.show_theme(Theme::Dark);
    assert!(!body.class_list().contains("light-theme"));
}

#[wasm_bindgen_test]
fn browser_page_persists_to_local_storage() {
    let (window, document) = dom();
    let mut page = BrowserPage::new(&window, &document).unwrap();

    page.store("backdropTestKey", "fireflies").unwrap();
    assert_eq!(page.load("backdropTestKey").as_deref(), Some("fireflies"));
    assert_eq!(page.load("backdropMissingKey"), None);

    window
        .local_storage()
        .unwrap()
        .unwrap()
        .remove_item("backdropTestKey")
        .unwrap();
}

#[wasm_bindgen_test]
fn cleared_timeouts_are_released() {
    let (window, _) = dom();
    let mut scheduler = WasmScheduler::new(window, Weak::new());

    let fade_out = scheduler.set_timeout(500);
    let fade_in = scheduler.set_timeout(1000);
    assert_ne!(fade_out, fade_in);
    assert_eq!(scheduler.held_timers(), 2);

    scheduler.clear_timeout(fade_out);
    assert_eq!(scheduler.held_timers(), 1);
    // Clearing twice is harmless.
    scheduler.clear_timeout(fade_out);
    assert_eq!(scheduler.held_timers(), 1);

    scheduler.clear_timeout(fade_in);
    assert_eq!(scheduler.held_timers(), 0);
}
