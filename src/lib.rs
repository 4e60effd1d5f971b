//! # papermark
//!
//! Converts GitHub-flavored Markdown into Typst markup.
//!
//! The pipeline has three stages:
//!
//! 1. [`parser::parse`] folds the `pulldown-cmark` event stream into a
//!    [`Node`] tree whose text points back into the source bytes, then runs
//!    the AST transformers of the enabled extensions.
//! 2. [`render::Renderer`] walks the tree and writes Typst through the
//!    emission functions bound in an [`ExtensionRegistry`].
//! 3. Content that has no Typst equivalent (raw HTML) is dropped and
//!    reported through a [`diagnostics::Reporter`] as `file:line:column`.
//!
//! ## Quick Start
//!
//! ```rust
//! let typst = papermark::convert("# Hello *world*\n").unwrap();
//! assert!(typst.ends_with("= Hello #emph[world]\n"));
//! ```
//!
//! ## Extensions
//!
//! Tables, strikethrough, task list items and lone-image figures are
//! separate [`extension::Extension`]s. Each can be left out of a registry
//! without affecting the others; see [`config::ExtensionsConfig`].
//!
//! ## Output
//!
//! Every document starts with a preamble (page, text, and heading setup),
//! embedded in the crate unless the configuration names another file. Code
//! blocks, tables and standalone images become `#figure(..)` calls with a
//! placeholder caption and label.

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod escape;
pub mod extension;
pub mod parser;
pub mod render;
pub mod transform;

use std::io::Write;

pub use ast::{Kind, Node, NodeValue};
pub use config::Config;
pub use diagnostics::{Diagnostic, Position, Reporter};
pub use error::{ConfigError, Error, RenderError, Result, SettingsError};
pub use extension::{Extension, ExtensionRegistry};
pub use render::{Preamble, Renderer};

/// A configured Markdown to Typst converter.
///
/// Building one composes the extension registry and loads the preamble;
/// after that it is read-only and can convert any number of documents,
/// including from several threads at once.
#[derive(Debug)]
pub struct Papermark {
    registry: ExtensionRegistry,
    preamble: Preamble,
    context_lines: usize,
}

impl Papermark {
    /// All GFM extensions and the embedded preamble.
    pub fn new() -> Result<Self> {
        Ok(Self {
            registry: ExtensionRegistry::gfm()?,
            preamble: Preamble::default(),
            context_lines: 0,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let preamble = match &config.preamble {
            Some(path) => Preamble::load(path)?,
            None => Preamble::default(),
        };
        Ok(Self {
            registry: config.registry()?,
            preamble,
            context_lines: config.diagnostics.context_lines,
        })
    }

    pub fn with_registry(registry: ExtensionRegistry, preamble: Preamble) -> Self {
        Self {
            registry,
            preamble,
            context_lines: 0,
        }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    /// Parse `markdown` with this converter's parser hooks.
    pub fn parse(&self, markdown: &str) -> Node {
        parser::parse(markdown, self.registry.parser_hooks())
    }

    /// Convert `markdown` and write the Typst output to `out`.
    ///
    /// Returns diagnostics for content that was dropped.
    pub fn convert<W: Write>(&self, markdown: &str, out: W) -> Result<Vec<Diagnostic>> {
        let doc = self.parse(markdown);
        Renderer::new(&self.registry, &self.preamble).render(&doc, markdown.as_bytes(), out)
    }

    /// Like [`Papermark::convert`], but also print each diagnostic to
    /// standard error with its position in `file`.
    pub fn convert_named<W: Write>(&self, file: &str, markdown: &str, out: W) -> Result<Vec<Diagnostic>> {
        let doc = self.parse(markdown);
        let reporter = Reporter::new(file, markdown.as_bytes(), self.context_lines);
        Renderer::new(&self.registry, &self.preamble)
            .with_reporter(&reporter)
            .render(&doc, markdown.as_bytes(), out)
    }

    /// Convert `markdown` into a new string.
    ///
    /// Fails with [`Error::Utf8`] if the preamble was loaded from a file that
    /// is not UTF-8.
    pub fn convert_to_string(&self, markdown: &str) -> Result<String> {
        let mut out = Vec::with_capacity(markdown.len() * 2 + self.preamble.as_bytes().len());
        self.convert(markdown, &mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

/// Convert Markdown to Typst with the default configuration.
pub fn convert(markdown: &str) -> Result<String> {
    Papermark::new()?.convert_to_string(markdown)
}
