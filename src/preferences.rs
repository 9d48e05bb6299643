use tracing::{debug, warn};

use crate::config::StorageKeys;
use crate::effects::EffectName;
use crate::page::Page;
use crate::theme::Theme;

/// Last chosen effect and theme, as persisted by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub effect: EffectName,
    pub theme: Theme,
}

impl Preferences {
    /// Read both entries. Missing or unrecognised values fall back to
    /// `default_effect` and the dark theme.
    pub fn load<P: Page>(page: &P, keys: &StorageKeys, default_effect: EffectName) -> Self {
        let effect = page
            .load(&keys.effect_key)
            .and_then(|raw| match raw.parse::<EffectName>() {
                Ok(name) => Some(name),
                Err(err) => {
                    debug!(%err, "ignoring saved effect");
                    None
                }
            })
            .unwrap_or(default_effect);
        let theme = page
            .load(&keys.theme_key)
            .and_then(|raw| raw.parse::<Theme>().ok())
            .unwrap_or_default();
        Self { effect, theme }
    }

    pub fn save_effect<P: Page>(page: &mut P, keys: &StorageKeys, effect: EffectName) {
        if let Err(err) = page.store(&keys.effect_key, effect.as_str()) {
            warn!(%err, %effect, "could not persist effect");
        }
    }

    pub fn save_theme<P: Page>(page: &mut P, keys: &StorageKeys, theme: Theme) {
        if let Err(err) = page.store(&keys.theme_key, theme.as_str()) {
            warn!(%err, %theme, "could not persist theme");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::MemoryPage;

    #[test]
    fn defaults_when_nothing_saved() {
        let page = MemoryPage::default();
        let prefs = Preferences::load(&page, &StorageKeys::default(), EffectName::Stars);
        assert_eq!(prefs.effect, EffectName::Stars);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn unknown_saved_effect_falls_back() {
        let mut page = MemoryPage::default();
        page.store("particleEffect", "rain").unwrap();
        page.store("theme", "light").unwrap();
        let prefs = Preferences::load(&page, &StorageKeys::default(), EffectName::Stars);
        assert_eq!(prefs.effect, EffectName::Stars);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn failed_store_is_swallowed() {
        let mut page = MemoryPage::default();
        page.fail_writes(true);
        Preferences::save_effect(&mut page, &StorageKeys::default(), EffectName::Snow);
        assert_eq!(page.load("particleEffect"), None);
    }
}
