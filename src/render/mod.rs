//! Rendering layer for converting document trees to Typst markup.
//!
//! The engine walks the tree depth first and visits every node twice, once
//! on [`Visit::Enter`] and once on [`Visit::Exit`]. What gets written for a
//! node is decided by the [`RenderFn`] bound to its [`Kind`] in an
//! [`ExtensionRegistry`]; the engine itself only knows about traversal.

pub mod preamble;
pub mod typst;

pub use preamble::Preamble;
pub use typst::TypstRenderer;

use std::io::{self, BufWriter, Write};

use crate::ast::{Kind, Node, Segment};
use crate::diagnostics::{Diagnostic, Reporter};
use crate::error::{ConfigError, RenderError, Result};
use crate::escape;
use crate::extension::ExtensionRegistry;

/// Which side of a node the traversal is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Enter,
    Exit,
}

impl Visit {
    pub fn is_enter(self) -> bool {
        self == Visit::Enter
    }
}

/// What the traversal does after a node has been entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    /// Visit the children, then exit the node.
    Continue,
    /// The node already wrote its content; go straight to exit.
    SkipChildren,
}

/// A node together with the one piece of sibling context renderers need.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'n> {
    pub node: &'n Node,
    pub has_next_sibling: bool,
}

impl<'n> Cursor<'n> {
    pub fn new(node: &'n Node, has_next_sibling: bool) -> Self {
        Self {
            node,
            has_next_sibling,
        }
    }
}

/// Signature of a node emission function.
pub type RenderFn =
    fn(&mut Emitter<'_>, &[u8], Cursor<'_>, Visit) -> std::result::Result<WalkStatus, RenderError>;

/// Output sink handed to every [`RenderFn`].
pub struct Emitter<'a> {
    out: &'a mut dyn Write,
    preamble: &'a [u8],
    reporter: Option<&'a Reporter<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Emitter<'a> {
    pub fn new(out: &'a mut dyn Write, preamble: &'a [u8]) -> Self {
        Self {
            out,
            preamble,
            reporter: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: Option<&'a Reporter<'a>>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Write bytes verbatim.
    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    pub fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(args)
    }

    /// Write bytes as escaped Typst content.
    pub fn content(&mut self, bytes: &[u8]) -> io::Result<()> {
        escape::write_content(&mut *self.out, bytes)
    }

    /// Write bytes as a quoted Typst string literal.
    pub fn string(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(b"\"")?;
        escape::write_string(&mut *self.out, bytes)?;
        self.out.write_all(b"\"")
    }

    /// Write the static preamble.
    pub fn preamble(&mut self) -> io::Result<()> {
        self.out.write_all(self.preamble)
    }

    /// Terminate a block: one newline, and a blank line if a sibling follows.
    pub fn close_block(&mut self, cursor: Cursor<'_>) -> io::Result<()> {
        debug_assert!(
            cursor.node.kind().is_block(),
            "{:?} is not a block",
            cursor.node.kind()
        );
        if cursor.has_next_sibling {
            self.out.write_all(b"\n\n")
        } else {
            self.out.write_all(b"\n")
        }
    }

    /// Record a diagnostic about content that could not be rendered.
    ///
    /// This never fails the render; with a reporter attached the diagnostic
    /// is also printed right away.
    pub fn report(&mut self, segment: Segment, message: impl Into<String>) {
        let diag = Diagnostic::new(segment, message).with_category("warning");
        tracing::warn!(start = segment.start, stop = segment.stop, message = %diag.message, "Dropped content");
        if let Some(reporter) = self.reporter {
            reporter.report(&diag);
        }
        self.diagnostics.push(diag);
    }

    fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Renders document trees with the bindings of one registry.
///
/// A renderer borrows everything it uses and holds no per-document state,
/// so one instance can render any number of documents.
#[derive(Clone, Copy)]
pub struct Renderer<'a> {
    registry: &'a ExtensionRegistry,
    preamble: &'a Preamble,
    reporter: Option<&'a Reporter<'a>>,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a ExtensionRegistry, preamble: &'a Preamble) -> Self {
        Self {
            registry,
            preamble,
            reporter: None,
        }
    }

    /// Print diagnostics for dropped content through `reporter`.
    pub fn with_reporter(mut self, reporter: &'a Reporter<'a>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Render `doc` into `out`. `source` is the buffer the tree's segments
    /// point into.
    ///
    /// Returns the diagnostics recorded for dropped content. Nothing is
    /// written if the tree contains a kind without a bound renderer. After a
    /// write error, output still held in the buffer is discarded.
    pub fn render<W: Write>(&self, doc: &Node, source: &[u8], out: W) -> Result<Vec<Diagnostic>> {
        self.check_bound(doc)?;

        tracing::debug!(bytes = source.len(), "Rendering document");
        let mut out = BufWriter::new(out);
        let result = self.render_buffered(&mut out, doc, source).and_then(|diagnostics| {
            out.flush().map_err(RenderError::Io)?;
            Ok(diagnostics)
        });
        if let Err(e) = &result {
            tracing::debug!(error = %e, "Render aborted");
            // dropping the writer would flush the buffer
            let (_out, _unwritten) = out.into_parts();
        }
        result
    }

    fn render_buffered(&self, out: &mut dyn Write, doc: &Node, source: &[u8]) -> Result<Vec<Diagnostic>> {
        let mut emitter = Emitter::new(out, self.preamble.as_bytes()).with_reporter(self.reporter);
        self.walk(&mut emitter, source, doc)?;
        Ok(emitter.into_diagnostics())
    }

    /// Render `doc` into a new buffer.
    pub fn render_to_vec(&self, doc: &Node, source: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(source.len() * 2 + self.preamble.as_bytes().len());
        self.render(doc, source, &mut out)?;
        Ok(out)
    }

    fn check_bound(&self, doc: &Node) -> std::result::Result<(), ConfigError> {
        for node in doc.descendants() {
            self.lookup(node.kind())?;
        }
        Ok(())
    }

    fn lookup(&self, kind: Kind) -> std::result::Result<RenderFn, ConfigError> {
        self.registry
            .binding(kind)
            .ok_or(ConfigError::UnboundKind(kind))
    }

    /// Depth-first traversal over an explicit stack, so nesting depth is
    /// bounded by memory rather than by the call stack.
    fn walk(&self, emitter: &mut Emitter<'_>, source: &[u8], doc: &Node) -> Result<()> {
        let mut stack = Vec::new();
        self.enter(emitter, source, Cursor::new(doc, false), &mut stack)?;

        while let Some(frame) = stack.last_mut() {
            let node = frame.cursor.node;
            if frame.next_child < node.children.len() {
                let i = frame.next_child;
                frame.next_child += 1;
                let child = Cursor::new(&node.children[i], i + 1 < node.children.len());
                self.enter(emitter, source, child, &mut stack)?;
            } else if let Some(frame) = stack.pop() {
                (frame.render)(emitter, source, frame.cursor, Visit::Exit)?;
            }
        }
        Ok(())
    }

    fn enter<'n>(
        &self,
        emitter: &mut Emitter<'_>,
        source: &[u8],
        cursor: Cursor<'n>,
        stack: &mut Vec<Frame<'n>>,
    ) -> Result<()> {
        let render = self.lookup(cursor.node.kind())?;
        let next_child = match render(emitter, source, cursor, Visit::Enter)? {
            WalkStatus::Continue => 0,
            WalkStatus::SkipChildren => cursor.node.children.len(),
        };
        stack.push(Frame {
            cursor,
            render,
            next_child,
        });
        Ok(())
    }
}

/// A node that has been entered and not yet exited.
struct Frame<'n> {
    cursor: Cursor<'n>,
    render: RenderFn,
    next_child: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeValue, Text};
    use crate::extension::{Extension, Registrar};
    use pretty_assertions::assert_eq;

    fn trace_node(
        em: &mut Emitter<'_>,
        _source: &[u8],
        cursor: Cursor<'_>,
        visit: Visit,
    ) -> std::result::Result<WalkStatus, RenderError> {
        let tag = match visit {
            Visit::Enter => "+",
            Visit::Exit => "-",
        };
        write!(em, "{tag}{:?} ", cursor.node.kind())?;
        if visit.is_enter() && cursor.node.kind() == Kind::CodeSpan {
            return Ok(WalkStatus::SkipChildren);
        }
        Ok(WalkStatus::Continue)
    }

    struct Tracer;

    impl Extension for Tracer {
        fn name(&self) -> &'static str {
            "tracer"
        }

        fn kinds(&self) -> &'static [Kind] {
            &[]
        }

        fn register(&self, reg: &mut Registrar<'_>) -> std::result::Result<(), ConfigError> {
            for kind in [Kind::Document, Kind::Paragraph, Kind::CodeSpan, Kind::Text] {
                reg.bind(kind, trace_node)?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_walk_order_and_skip_children() {
        let registry = ExtensionRegistry::builder()
            .without_core()
            .extension(Tracer)
            .build()
            .unwrap();
        let preamble = Preamble::from_bytes(Vec::new());
        let source = b"ab";
        let doc = Node::document(vec![Node::with_children(
            NodeValue::Paragraph,
            vec![Node::with_children(
                NodeValue::CodeSpan,
                vec![Node::new(NodeValue::Text(Text::raw(Segment::new(0, 2))))],
            )],
        )]);

        let out = Renderer::new(&registry, &preamble)
            .render_to_vec(&doc, source)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "+Document +Paragraph +CodeSpan -CodeSpan -Paragraph -Document "
        );
    }

    #[test]
    fn test_unbound_kind_writes_nothing() {
        let registry = ExtensionRegistry::builder().build().unwrap();
        let preamble = Preamble::from_bytes(b"PRE".to_vec());
        let doc = Node::document(vec![
            Node::new(NodeValue::ThematicBreak),
            Node::new(NodeValue::Strikethrough),
        ]);

        let mut out = Vec::new();
        let err = Renderer::new(&registry, &preamble)
            .render(&doc, b"", &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Config(ConfigError::UnboundKind(Kind::Strikethrough))
        ));
        assert!(out.is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    /// Fails its first write and accepts everything after that.
    #[derive(Default)]
    struct FlakyWriter {
        failed: bool,
        delivered: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "reset"));
            }
            self.delivered.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_render_delivers_nothing_later() {
        let registry = ExtensionRegistry::gfm().unwrap();
        let preamble = Preamble::from_bytes(b"PRE".to_vec());
        let doc = Node::document(vec![Node::new(NodeValue::ThematicBreak)]);

        let mut out = FlakyWriter::default();
        let result = Renderer::new(&registry, &preamble).render(&doc, b"", &mut out);
        assert!(matches!(result, Err(crate::Error::Render(RenderError::Io(_)))));
        assert!(out.failed);
        assert!(out.delivered.is_empty());
    }

    #[test]
    fn test_deep_nesting_renders() {
        const DEPTH: usize = 5000;
        let mut node = Node::with_children(
            NodeValue::Paragraph,
            vec![Node::text(Segment::new(0, 1))],
        );
        for _ in 0..DEPTH {
            node = Node::with_children(NodeValue::Blockquote, vec![node]);
        }
        let doc = Node::document(vec![node]);

        let registry = ExtensionRegistry::gfm().unwrap();
        let preamble = Preamble::from_bytes(Vec::new());
        let out = Renderer::new(&registry, &preamble)
            .render_to_vec(&doc, b"a")
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("#quote(block: true)[").count(), DEPTH);
        assert!(out.contains("[\na\n]"));
    }

    #[test]
    fn test_write_failure_aborts_render() {
        let registry = ExtensionRegistry::gfm().unwrap();
        let preamble = Preamble::from_bytes(Vec::new());
        let doc = Node::document(vec![Node::new(NodeValue::ThematicBreak)]);

        let err = Renderer::new(&registry, &preamble)
            .render(&doc, b"", FailingWriter)
            .unwrap_err();
        assert!(matches!(err, crate::Error::Render(RenderError::Io(_))));
    }
}
