//! Typst emission functions for the core CommonMark node kinds.

use std::io;

use crate::ast::{Kind, Node, NodeValue, Segment, Text};
use crate::error::{ConfigError, RenderError};
use crate::extension::{Extension, Registrar};
use crate::render::{Cursor, Emitter, Visit, WalkStatus};

/// Caption written into every figure until captions can be given in the source.
pub const FIGURE_CAPTION: &str = "Caption";

/// Label attached to every figure until labels can be given in the source.
pub const FIGURE_LABEL: &str = "label";

type RenderResult = Result<WalkStatus, RenderError>;

/// The renderer for every kind the parser produces without extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypstRenderer;

impl Extension for TypstRenderer {
    fn name(&self) -> &'static str {
        "core"
    }

    fn kinds(&self) -> &'static [Kind] {
        &[
            Kind::Document,
            Kind::Heading,
            Kind::Paragraph,
            Kind::TextBlock,
            Kind::List,
            Kind::ListItem,
            Kind::FencedCodeBlock,
            Kind::CodeBlock,
            Kind::Blockquote,
            Kind::ThematicBreak,
            Kind::HtmlBlock,
            Kind::CodeSpan,
            Kind::Emphasis,
            Kind::Image,
            Kind::Link,
            Kind::AutoLink,
            Kind::RawHtml,
            Kind::Text,
        ]
    }

    fn register(&self, reg: &mut Registrar<'_>) -> Result<(), ConfigError> {
        reg.bind(Kind::Document, render_document)?;
        reg.bind(Kind::Heading, render_heading)?;
        reg.bind(Kind::Paragraph, render_paragraph)?;
        reg.bind(Kind::TextBlock, render_text_block)?;
        reg.bind(Kind::List, render_list)?;
        reg.bind(Kind::ListItem, render_list_item)?;
        reg.bind(Kind::FencedCodeBlock, render_fenced_code_block)?;
        reg.bind(Kind::CodeBlock, render_code_block)?;
        reg.bind(Kind::Blockquote, render_blockquote)?;
        reg.bind(Kind::ThematicBreak, render_thematic_break)?;
        reg.bind(Kind::HtmlBlock, render_html_block)?;

        reg.bind(Kind::CodeSpan, render_code_span)?;
        reg.bind(Kind::Emphasis, render_emphasis)?;
        reg.bind(Kind::Image, render_image)?;
        reg.bind(Kind::Link, render_link)?;
        reg.bind(Kind::AutoLink, render_auto_link)?;
        reg.bind(Kind::RawHtml, render_raw_html)?;
        reg.bind(Kind::Text, render_text)?;
        Ok(())
    }
}

/// Open a `#figure(` call; the body follows as its first argument.
pub(crate) fn open_figure(em: &mut Emitter<'_>) -> io::Result<()> {
    em.write(b"#figure(\n")
}

/// Close a figure with the placeholder caption and label, then end the block.
pub(crate) fn close_figure(em: &mut Emitter<'_>, cursor: Cursor<'_>) -> io::Result<()> {
    write!(em, "caption: [{FIGURE_CAPTION}],\n) #label(\"{FIGURE_LABEL}\")")?;
    em.close_block(cursor)
}

fn render_document(em: &mut Emitter<'_>, _source: &[u8], _cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        em.preamble()?;
        em.write(b"\n")?;
    }
    Ok(WalkStatus::Continue)
}

fn render_heading(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    match visit {
        Visit::Enter => {
            let level = match cursor.node.value {
                NodeValue::Heading { level } => level.clamp(1, 6),
                _ => 1,
            };
            for _ in 0..level {
                em.write(b"=")?;
            }
            em.write(b" ")?;
        }
        Visit::Exit => em.close_block(cursor)?,
    }
    Ok(WalkStatus::Continue)
}

fn render_paragraph(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit == Visit::Exit {
        em.close_block(cursor)?;
    }
    Ok(WalkStatus::Continue)
}

fn render_text_block(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit == Visit::Exit {
        em.close_block(cursor)?;
    }
    Ok(WalkStatus::Continue)
}

fn render_list(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    let NodeValue::List { ordered, start, tight } = cursor.node.value else {
        return Ok(WalkStatus::Continue);
    };
    match visit {
        Visit::Enter => {
            let open: &[u8] = if ordered { b"#enum(" } else { b"#list(" };
            em.write(open)?;
            write!(em, "tight: {tight}")?;
            if ordered && start != 1 {
                write!(em, ", start: {start}")?;
            }
            em.write(b",\n")?;
        }
        Visit::Exit => {
            em.write(b")")?;
            em.close_block(cursor)?;
        }
    }
    Ok(WalkStatus::Continue)
}

fn render_list_item(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    match visit {
        Visit::Enter => {
            em.write(b"[")?;
            // loose items start their block content on a fresh line
            let starts_with_text = cursor
                .node
                .first_child()
                .is_some_and(|c| c.kind() == Kind::TextBlock);
            if !starts_with_text {
                em.write(b"\n")?;
            }
        }
        Visit::Exit => em.write(b"],\n")?,
    }
    Ok(WalkStatus::Continue)
}

/// Write a `raw(block: true, ...)` call over `lines`.
fn write_raw_block(
    em: &mut Emitter<'_>,
    source: &[u8],
    language: Option<&str>,
    lines: &[Text],
) -> io::Result<()> {
    em.write(b"raw(block: true, ")?;
    if let Some(language) = language {
        em.write(b"lang: ")?;
        em.string(language.as_bytes())?;
        em.write(b", ")?;
    }
    let content: Vec<u8> = lines.iter().flat_map(|l| l.value(source)).copied().collect();
    em.string(&content)?;
    em.write(b"),\n")
}

fn render_fenced_code_block(em: &mut Emitter<'_>, source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        if let NodeValue::FencedCodeBlock { language, lines } = &cursor.node.value {
            open_figure(em)?;
            write_raw_block(em, source, language.as_deref(), lines)?;
            close_figure(em, cursor)?;
        }
    }
    Ok(WalkStatus::SkipChildren)
}

fn render_code_block(em: &mut Emitter<'_>, source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        if let NodeValue::CodeBlock { lines } = &cursor.node.value {
            open_figure(em)?;
            write_raw_block(em, source, None, lines)?;
            close_figure(em, cursor)?;
        }
    }
    Ok(WalkStatus::SkipChildren)
}

fn render_blockquote(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    match visit {
        Visit::Enter => em.write(b"#quote(block: true)[\n")?,
        Visit::Exit => {
            em.write(b"]")?;
            em.close_block(cursor)?;
        }
    }
    Ok(WalkStatus::Continue)
}

fn render_thematic_break(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        em.write(b"#line(length: 100%)")?;
        em.close_block(cursor)?;
    }
    Ok(WalkStatus::Continue)
}

/// HTML has no Typst equivalent: the block is dropped and reported, but
/// still terminated so sibling spacing stays intact.
fn render_html_block(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        if let NodeValue::HtmlBlock { lines } = &cursor.node.value {
            em.report(span_of(lines), "unsupported HTML block dropped");
        }
        em.close_block(cursor)?;
    }
    Ok(WalkStatus::SkipChildren)
}

fn render_code_span(em: &mut Emitter<'_>, source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        let mut content = Vec::new();
        for child in &cursor.node.children {
            if let NodeValue::Text(text) = &child.value {
                let value = text.value(source);
                match value.strip_suffix(b"\n") {
                    Some(line) => {
                        content.extend_from_slice(line.strip_suffix(b"\r").unwrap_or(line));
                        content.push(b' ');
                    }
                    None => content.extend_from_slice(value),
                }
            }
        }
        em.write(b"#raw(")?;
        em.string(&content)?;
        em.write(b")")?;
    }
    Ok(WalkStatus::SkipChildren)
}

fn render_emphasis(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    match visit {
        Visit::Enter => {
            let strong = matches!(cursor.node.value, NodeValue::Emphasis { level } if level >= 2);
            let open: &[u8] = if strong { b"#strong[" } else { b"#emph[" };
            em.write(open)?;
        }
        Visit::Exit => em.write(b"]")?,
    }
    Ok(WalkStatus::Continue)
}

fn render_image(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        if let NodeValue::Image { destination, .. } = &cursor.node.value {
            em.write(b"#image(")?;
            em.string(destination.as_bytes())?;
            em.write(b")")?;
        }
    }
    Ok(WalkStatus::SkipChildren)
}

fn render_link(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    match visit {
        Visit::Enter => {
            let destination = match &cursor.node.value {
                NodeValue::Link { destination, .. } => destination.as_str(),
                _ => "",
            };
            em.write(b"#link(")?;
            em.string(destination.as_bytes())?;
            em.write(b")[")?;
        }
        Visit::Exit => em.write(b"]")?,
    }
    Ok(WalkStatus::Continue)
}

fn render_auto_link(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        if let NodeValue::AutoLink { url } = &cursor.node.value {
            em.write(b"#link(")?;
            em.string(url.as_bytes())?;
            em.write(b")")?;
        }
    }
    Ok(WalkStatus::SkipChildren)
}

/// Inline HTML is dropped and reported.
fn render_raw_html(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        if let NodeValue::RawHtml { segments } = &cursor.node.value {
            em.report(span_of(segments), "unsupported raw HTML dropped");
        }
    }
    Ok(WalkStatus::SkipChildren)
}

fn render_text(em: &mut Emitter<'_>, source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit.is_enter() {
        if let NodeValue::Text(text) = &cursor.node.value {
            if text.raw {
                em.write(text.value(source))?;
            } else {
                em.content(text.value(source))?;
                if text.hard_line_break {
                    em.write(b" \\\n")?;
                } else if text.soft_line_break {
                    em.write(b"\n")?;
                }
            }
        }
    }
    Ok(WalkStatus::Continue)
}

/// The segment covering `segments` from the first start to the last stop.
fn span_of(segments: &[Segment]) -> Segment {
    match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => Segment::new(first.start, last.stop),
        _ => Segment::default(),
    }
}

/// First image under `node`, used by figure renderers.
pub(crate) fn first_image(node: &Node) -> Option<&str> {
    node.descendants().find_map(|n| match &n.value {
        NodeValue::Image { destination, .. } => Some(destination.as_str()),
        _ => None,
    })
}
