//! Page-level state outside the simulation: persisted key/value pairs and
//! the indicators other page elements style themselves from.

use crate::effects::EffectName;
use crate::error::BackdropError;
use crate::theme::Theme;

pub trait Page {
    fn load(&self, key: &str) -> Option<String>;

    fn store(&mut self, key: &str, value: &str) -> Result<(), BackdropError>;

    /// Reflect the running effect on the document (`data-effect`).
    fn show_effect(&mut self, name: EffectName);

    /// Activate the background layer paired with `name`.
    fn show_background(&mut self, name: EffectName);

    /// Highlight the selector option for `name`.
    fn mark_selected(&mut self, name: EffectName);

    fn show_theme(&mut self, theme: Theme);
}
