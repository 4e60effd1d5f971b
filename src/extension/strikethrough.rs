//! GFM strikethrough (`~~text~~`).

use pulldown_cmark::Options;

use crate::ast::Kind;
use crate::error::{ConfigError, RenderError};
use crate::extension::{Extension, ParserHooks, Registrar};
use crate::render::{Cursor, Emitter, Visit, WalkStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct StrikethroughExtension;

impl Extension for StrikethroughExtension {
    fn name(&self) -> &'static str {
        "strikethrough"
    }

    fn kinds(&self) -> &'static [Kind] {
        &[Kind::Strikethrough]
    }

    fn extend_parser(&self, hooks: &mut ParserHooks) {
        hooks.enable(Options::ENABLE_STRIKETHROUGH);
    }

    fn register(&self, reg: &mut Registrar<'_>) -> Result<(), ConfigError> {
        reg.bind(Kind::Strikethrough, render_strikethrough)
    }
}

fn render_strikethrough(
    em: &mut Emitter<'_>,
    _source: &[u8],
    _cursor: Cursor<'_>,
    visit: Visit,
) -> Result<WalkStatus, RenderError> {
    match visit {
        Visit::Enter => em.write(b"#strike[")?,
        Visit::Exit => em.write(b"]")?,
    }
    Ok(WalkStatus::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeValue, Segment};
    use crate::extension::ExtensionRegistry;
    use crate::render::{Preamble, Renderer};

    #[test]
    fn test_strike_wraps_children() {
        let registry = ExtensionRegistry::builder()
            .extension(StrikethroughExtension)
            .build()
            .unwrap();
        let preamble = Preamble::from_bytes(Vec::new());
        let doc = Node::document(vec![Node::with_children(
            NodeValue::Paragraph,
            vec![Node::with_children(
                NodeValue::Strikethrough,
                vec![Node::text(Segment::new(0, 4))],
            )],
        )]);
        let out = Renderer::new(&registry, &preamble)
            .render_to_vec(&doc, b"gone")
            .unwrap();
        assert_eq!(out, b"\n#strike[gone]\n");
    }
}
