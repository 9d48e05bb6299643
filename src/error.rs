//! Error types for the backdrop host and its configuration.

use thiserror::Error;

/// Errors raised while wiring the backdrop to its host page.
///
/// The per-frame simulation never fails; everything here happens at setup
/// time or at the storage boundary.
#[derive(Error, Debug)]
pub enum BackdropError {
    /// A browser global (window, document, storage) is not available.
    #[error("{0} not available")]
    MissingGlobal(&'static str),

    /// No element with the given id exists in the document.
    #[error("element #{0} not found")]
    ElementNotFound(String),

    /// The canvas refused to hand out a 2D context.
    #[error("2d canvas context unavailable")]
    ContextUnavailable,

    /// A JavaScript call threw.
    #[error("javascript error: {0}")]
    Js(String),

    /// Configuration JSON could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading or writing persisted preferences failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A string did not name one of the known effects.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// A stored theme value was neither "dark" nor "light".
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}
