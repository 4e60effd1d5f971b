//! Converter configuration, read from TOML.
//!
//! ```toml
//! preamble = "custom.typ"
//!
//! [extensions]
//! table = true
//! strikethrough = true
//! task_checkbox = true
//! image_block = true
//!
//! [diagnostics]
//! context_lines = 2
//! ```
//!
//! Every key is optional; a missing key takes its default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, SettingsError};
use crate::extension::{
    ExtensionRegistry, ImageBlockExtension, StrikethroughExtension, TableExtension,
    TaskCheckBoxExtension,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Typst file used instead of the embedded preamble.
    pub preamble: Option<PathBuf>,
    pub extensions: ExtensionsConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Which GFM extensions are enabled. All of them are by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionsConfig {
    pub table: bool,
    pub strikethrough: bool,
    pub task_checkbox: bool,
    pub image_block: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            table: true,
            strikethrough: true,
            task_checkbox: true,
            image_block: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Source lines printed before and after each reported segment.
    pub context_lines: usize,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, SettingsError> {
        toml::from_str(input).map_err(|e| SettingsError::Toml(e.to_string()))
    }

    /// Read a configuration file. A relative `preamble` path is taken
    /// relative to the directory of the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut config = Self::from_toml_str(&input)?;
        let dir = path.parent().unwrap_or(Path::new(""));
        config.preamble = config.preamble.take().map(|preamble| {
            if preamble.is_relative() {
                dir.join(preamble)
            } else {
                preamble
            }
        });
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Build a registry with the core renderer and the enabled extensions.
    pub fn registry(&self) -> Result<ExtensionRegistry, ConfigError> {
        let ext = self.extensions;
        let mut builder = ExtensionRegistry::builder();
        if ext.table {
            builder = builder.extension(TableExtension);
        }
        if ext.strikethrough {
            builder = builder.extension(StrikethroughExtension);
        }
        if ext.task_checkbox {
            builder = builder.extension(TaskCheckBoxExtension);
        }
        if ext.image_block {
            builder = builder.extension(ImageBlockExtension);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Kind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.extensions.table);
        assert_eq!(config.diagnostics.context_lines, 0);
        assert_eq!(config.preamble, None);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            r#"
preamble = "book.typ"

[extensions]
table = false

[diagnostics]
context_lines = 2
"#,
        )
        .unwrap();
        assert_eq!(config.preamble, Some(PathBuf::from("book.typ")));
        assert!(!config.extensions.table);
        assert!(config.extensions.strikethrough);
        assert_eq!(config.diagnostics.context_lines, 2);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[extensions]\ntable = \"yes\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::Toml(_)));

        let err = Config::from_toml_str("unknown = 1\n").unwrap_err();
        assert!(matches!(err, SettingsError::Toml(_)));
    }

    #[test]
    fn test_registry_follows_flags() {
        let config = Config::from_toml_str("[extensions]\ntable = false\nimage_block = false\n").unwrap();
        let registry = config.registry().unwrap();
        assert!(registry.binding(Kind::Table).is_none());
        assert!(registry.binding(Kind::ImageBlock).is_none());
        assert!(registry.binding(Kind::Strikethrough).is_some());
        assert_eq!(registry.extensions(), &["core", "strikethrough", "task-checkbox"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/papermark.toml").unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_load_resolves_preamble_against_config_dir() {
        let dir = std::env::temp_dir().join(format!("papermark-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("papermark.toml");
        std::fs::write(&path, "preamble = \"custom.typ\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.preamble, Some(dir.join("custom.typ")));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
