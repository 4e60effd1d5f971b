//! Error types for the papermark library.

use thiserror::Error;

use crate::ast::Kind;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors in the node renderer configuration.
///
/// These are raised while the extension registry is built, independent of
/// any document. The only exception is rendering a hand-built tree that
/// contains a kind no enabled extension produces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("node kind {kind:?} bound twice (second binding from {extension})")]
    DuplicateBinding { kind: Kind, extension: &'static str },

    #[error("no renderer bound for node kind {0:?}")]
    UnboundKind(Kind),
}

/// Errors that abort a render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors loading the TOML configuration or the assets it names.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid TOML: {0}")]
    Toml(String),

    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}
