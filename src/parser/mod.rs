//! Markdown parsing into the document tree.
//!
//! Conformance to CommonMark and the GFM extensions is left to
//! `pulldown-cmark`; this module only folds its event stream into a
//! [`Node`] tree whose text nodes point back into the source, then runs the
//! AST transformers registered by extensions.

mod builder;

use pulldown_cmark::Parser;

use crate::ast::Node;
use crate::extension::ParserHooks;

use builder::TreeBuilder;

/// Parse `source` with the options and transformers in `hooks`.
pub fn parse(source: &str, hooks: &ParserHooks) -> Node {
    let mut builder = TreeBuilder::new(source);
    for (event, range) in Parser::new_ext(source, hooks.options).into_offset_iter() {
        builder.event(event, range);
    }
    let mut doc = builder.finish();
    hooks.transform(&mut doc);

    tracing::debug!(bytes = source.len(), blocks = doc.children.len(), "Parsed document");
    doc
}
