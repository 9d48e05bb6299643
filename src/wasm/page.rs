use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Storage, Window};

use crate::effects::EffectName;
use crate::page::Page;
use crate::theme::Theme;
use crate::BackdropError;

pub const OPTION_SELECTOR: &str = ".effect-option";
const LAYER_SELECTOR: &str = ".bg-layer";
const ACTIVE_CLASS: &str = "active";
const LIGHT_CLASS: &str = "light-theme";

/// localStorage plus the document body and selector markup.
pub struct BrowserPage {
    document: Document,
    body: HtmlElement,
    storage: Option<Storage>,
}

impl BrowserPage {
    pub fn new(window: &Window, document: &Document) -> Result<Self, BackdropError> {
        let body = document
            .body()
            .ok_or(BackdropError::MissingGlobal("document.body"))?;
        // Private browsing can deny storage outright; run without persistence.
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            warn!("localStorage unavailable, preferences will not persist");
        }
        Ok(Self {
            document: document.clone(),
            body,
            storage,
        })
    }

    fn each(&self, selector: &str, mut f: impl FnMut(&Element)) {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return;
        };
        for i in 0..nodes.length() {
            if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                f(&el);
            }
        }
    }
}

fn set_class(el: &Element, class: &str, on: bool) {
    if let Err(err) = el.class_list().toggle_with_force(class, on) {
        warn!(?err, class, "class toggle failed");
    }
}

impl Page for BrowserPage {
    fn load(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), BackdropError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or(BackdropError::MissingGlobal("localStorage"))?;
        storage
            .set_item(key, value)
            .map_err(|err| BackdropError::Storage(format!("{err:?}")))
    }

    fn show_effect(&mut self, name: EffectName) {
        if let Err(err) = self.body.set_attribute("data-effect", name.as_str()) {
            warn!(?err, "could not set data-effect");
        }
    }

    fn show_background(&mut self, name: EffectName) {
        let wanted = format!("bg-{name}");
        self.each(LAYER_SELECTOR, |layer| {
            set_class(layer, ACTIVE_CLASS, layer.class_list().contains(&wanted));
        });
    }

    fn mark_selected(&mut self, name: EffectName) {
        self.each(OPTION_SELECTOR, |option| {
            let tagged = option.get_attribute("data-effect");
            set_class(option, ACTIVE_CLASS, tagged.as_deref() == Some(name.as_str()));
        });
    }

    fn show_theme(&mut self, theme: Theme) {
        set_class(&self.body, LIGHT_CLASS, theme == Theme::Light);
    }
}
