//! Extension descriptors and the registry that composes them.
//!
//! An [`Extension`] contributes two things: parser hooks (the parser options
//! it needs and AST transformers to run after parsing) and renderer
//! bindings from node [`Kind`]s to [`RenderFn`]s. The registry is built once
//! and is read-only afterwards, so it can be shared between threads.

mod image_block;
mod strikethrough;
mod table;
mod task_checkbox;

pub use image_block::ImageBlockExtension;
pub use strikethrough::StrikethroughExtension;
pub use table::TableExtension;
pub use task_checkbox::TaskCheckBoxExtension;

use pulldown_cmark::Options;

use crate::ast::{Kind, Node};
use crate::error::ConfigError;
use crate::render::{RenderFn, TypstRenderer};

/// A rewrite pass run over the whole tree after parsing.
pub type AstTransformer = fn(&mut Node);

/// Parser-side configuration collected from all extensions.
#[derive(Debug, Clone)]
pub struct ParserHooks {
    /// Options passed to the Markdown parser.
    pub options: Options,
    /// Transformers, in registration order.
    pub transformers: Vec<AstTransformer>,
}

impl Default for ParserHooks {
    fn default() -> Self {
        Self {
            options: Options::empty(),
            transformers: Vec::new(),
        }
    }
}

impl ParserHooks {
    pub fn enable(&mut self, options: Options) {
        self.options |= options;
    }

    pub fn add_transformer(&mut self, transformer: AstTransformer) {
        self.transformers.push(transformer);
    }

    /// Run every transformer over `doc`.
    pub fn transform(&self, doc: &mut Node) {
        for transformer in &self.transformers {
            transformer(doc);
        }
    }
}

/// A unit of functionality that can be enabled or left out independently.
pub trait Extension: Send + Sync {
    /// Name used in configuration errors.
    fn name(&self) -> &'static str;

    /// Node kinds this extension makes the parser produce. Each of them must
    /// end up with a renderer, from this extension or another one.
    fn kinds(&self) -> &'static [Kind];

    fn extend_parser(&self, _hooks: &mut ParserHooks) {}

    /// Bind renderers for the kinds this extension handles.
    fn register(&self, reg: &mut Registrar<'_>) -> Result<(), ConfigError>;
}

#[derive(Clone, Copy)]
struct Binding {
    render: RenderFn,
    extension: &'static str,
}

/// Handle an [`Extension`] uses to bind its renderers.
pub struct Registrar<'a> {
    bindings: &'a mut [Option<Binding>; Kind::COUNT],
    extension: &'static str,
}

impl Registrar<'_> {
    /// Bind `render` to `kind`. A kind can be bound only once.
    pub fn bind(&mut self, kind: Kind, render: RenderFn) -> Result<(), ConfigError> {
        let slot = &mut self.bindings[kind.index()];
        if let Some(existing) = slot {
            tracing::debug!(?kind, first = existing.extension, second = self.extension, "Duplicate renderer binding");
            return Err(ConfigError::DuplicateBinding {
                kind,
                extension: self.extension,
            });
        }
        *slot = Some(Binding {
            render,
            extension: self.extension,
        });
        Ok(())
    }
}

/// The composed set of parser hooks and renderer bindings.
pub struct ExtensionRegistry {
    bindings: [Option<Binding>; Kind::COUNT],
    hooks: ParserHooks,
    extensions: Vec<&'static str>,
}

impl ExtensionRegistry {
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder::default()
    }

    /// The core renderer plus every GitHub-flavored extension.
    pub fn gfm() -> Result<Self, ConfigError> {
        Self::builder()
            .extension(TableExtension)
            .extension(StrikethroughExtension)
            .extension(TaskCheckBoxExtension)
            .extension(ImageBlockExtension)
            .build()
    }

    /// The renderer bound to `kind`, if any.
    pub fn binding(&self, kind: Kind) -> Option<RenderFn> {
        self.bindings[kind.index()].map(|b| b.render)
    }

    /// Name of the extension that bound `kind`.
    pub fn bound_by(&self, kind: Kind) -> Option<&'static str> {
        self.bindings[kind.index()].map(|b| b.extension)
    }

    pub fn parser_hooks(&self) -> &ParserHooks {
        &self.hooks
    }

    /// Names of the registered extensions, core first.
    pub fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound: Vec<Kind> = Kind::ALL
            .iter()
            .copied()
            .filter(|k| self.bindings[k.index()].is_some())
            .collect();
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.extensions)
            .field("bound", &bound)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Collects extensions in order and builds an [`ExtensionRegistry`].
pub struct ExtensionRegistryBuilder {
    core: bool,
    extensions: Vec<Box<dyn Extension>>,
}

impl Default for ExtensionRegistryBuilder {
    fn default() -> Self {
        Self {
            core: true,
            extensions: Vec::new(),
        }
    }
}

impl ExtensionRegistryBuilder {
    /// Leave out the core Typst renderer, for callers binding every kind themselves.
    #[must_use]
    pub fn without_core(mut self) -> Self {
        self.core = false;
        self
    }

    #[must_use]
    pub fn extension<E: Extension + 'static>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    #[must_use]
    pub fn boxed(mut self, extension: Box<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Register everything and check that every producible kind is bound.
    pub fn build(self) -> Result<ExtensionRegistry, ConfigError> {
        let mut extensions: Vec<Box<dyn Extension>> = Vec::with_capacity(self.extensions.len() + 1);
        if self.core {
            extensions.push(Box::new(TypstRenderer));
        }
        extensions.extend(self.extensions);

        let mut bindings = [None; Kind::COUNT];
        let mut hooks = ParserHooks::default();
        for extension in &extensions {
            extension.extend_parser(&mut hooks);
            let mut reg = Registrar {
                bindings: &mut bindings,
                extension: extension.name(),
            };
            extension.register(&mut reg)?;
            tracing::debug!(extension = extension.name(), "Registered extension");
        }

        for extension in &extensions {
            if let Some(kind) = extension
                .kinds()
                .iter()
                .copied()
                .find(|k| bindings[k.index()].is_none())
            {
                return Err(ConfigError::UnboundKind(kind));
            }
        }

        Ok(ExtensionRegistry {
            bindings,
            hooks,
            extensions: extensions.iter().map(|e| e.name()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::render::{Cursor, Emitter, Visit, WalkStatus};

    fn noop(
        _em: &mut Emitter<'_>,
        _source: &[u8],
        _cursor: Cursor<'_>,
        _visit: Visit,
    ) -> Result<WalkStatus, RenderError> {
        Ok(WalkStatus::Continue)
    }

    struct Rebinder;

    impl Extension for Rebinder {
        fn name(&self) -> &'static str {
            "rebinder"
        }

        fn kinds(&self) -> &'static [Kind] {
            &[]
        }

        fn register(&self, reg: &mut Registrar<'_>) -> Result<(), ConfigError> {
            reg.bind(Kind::Heading, noop)
        }
    }

    struct Forgetful;

    impl Extension for Forgetful {
        fn name(&self) -> &'static str {
            "forgetful"
        }

        fn kinds(&self) -> &'static [Kind] {
            &[Kind::Strikethrough]
        }

        fn register(&self, _reg: &mut Registrar<'_>) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    #[test]
    fn test_gfm_binds_every_kind() {
        let registry = ExtensionRegistry::gfm().unwrap();
        for kind in Kind::ALL {
            assert!(registry.binding(kind).is_some(), "{kind:?} unbound");
        }
        assert_eq!(
            registry.extensions(),
            &["core", "table", "strikethrough", "task-checkbox", "image-block"]
        );
        assert_eq!(registry.bound_by(Kind::Table), Some("table"));
        assert_eq!(registry.bound_by(Kind::Heading), Some("core"));
    }

    #[test]
    fn test_gfm_parser_hooks() {
        let registry = ExtensionRegistry::gfm().unwrap();
        let hooks = registry.parser_hooks();
        assert!(hooks.options.contains(Options::ENABLE_TABLES));
        assert!(hooks.options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(hooks.options.contains(Options::ENABLE_TASKLISTS));
        assert_eq!(hooks.transformers.len(), 1);
    }

    #[test]
    fn test_extensions_are_independent() {
        let registry = ExtensionRegistry::builder()
            .extension(StrikethroughExtension)
            .build()
            .unwrap();
        assert!(registry.binding(Kind::Strikethrough).is_some());
        assert!(registry.binding(Kind::Table).is_none());
        assert!(registry.binding(Kind::ImageBlock).is_none());
        assert!(!registry.parser_hooks().options.contains(Options::ENABLE_TABLES));
        assert!(registry.parser_hooks().transformers.is_empty());
    }

    #[test]
    fn test_duplicate_binding_fails_at_build() {
        let err = ExtensionRegistry::builder()
            .extension(Rebinder)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateBinding {
                kind: Kind::Heading,
                extension: "rebinder"
            }
        );
    }

    #[test]
    fn test_same_extension_twice_fails() {
        let err = ExtensionRegistry::builder()
            .extension(TableExtension)
            .extension(TableExtension)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateBinding { kind: Kind::Table, .. }
        ));
    }

    #[test]
    fn test_unbound_declared_kind_fails_at_build() {
        let err = ExtensionRegistry::builder()
            .extension(Forgetful)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnboundKind(Kind::Strikethrough));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExtensionRegistry>();
    }
}
