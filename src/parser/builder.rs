//! Builds a [`Node`] tree from the flat pulldown-cmark event stream.

use std::ops::Range;

use pulldown_cmark::{Alignment as MdAlignment, CodeBlockKind, Event, HeadingLevel, LinkType, Tag, TagEnd};

use crate::ast::{Alignment, Kind, Node, NodeValue, Segment, Text};

/// An open node waiting for its end event.
struct Frame {
    node: Node,
    /// Children are handed to the parent and the node itself is discarded.
    /// Used for constructs the tree has no kind for.
    splice: bool,
}

impl Frame {
    fn new(value: NodeValue) -> Self {
        Self {
            node: Node::new(value),
            splice: false,
        }
    }

    fn splice() -> Self {
        Self {
            node: Node::new(NodeValue::Paragraph),
            splice: true,
        }
    }
}

pub(crate) struct TreeBuilder<'s> {
    source: &'s str,
    stack: Vec<Frame>,
}

impl<'s> TreeBuilder<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Self {
            source,
            stack: vec![Frame::new(NodeValue::Document)],
        }
    }

    pub(crate) fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text, range),
            Event::Code(code) => self.code(&code, range),
            Event::Html(_) => self.html(range),
            Event::InlineHtml(_) => self.inline(Node::new(NodeValue::RawHtml {
                segments: vec![range.into()],
            })),
            Event::SoftBreak => self.line_break(range, false),
            Event::HardBreak => self.line_break(range, true),
            Event::Rule => {
                self.close_text_block();
                self.append(Node::new(NodeValue::ThematicBreak));
            }
            Event::TaskListMarker(checked) => {
                self.inline(Node::new(NodeValue::TaskCheckBox { checked }));
            }
            other => tracing::trace!(?range, event = ?other, "Ignoring event"),
        }
    }

    /// Close everything still open and return the document.
    pub(crate) fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.pop();
        }
        match self.stack.pop() {
            Some(frame) => frame.node,
            None => Node::document(Vec::new()),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let value = match tag {
            Tag::Emphasis => return self.open_inline(NodeValue::Emphasis { level: 1 }),
            Tag::Strong => return self.open_inline(NodeValue::Emphasis { level: 2 }),
            Tag::Strikethrough => return self.open_inline(NodeValue::Strikethrough),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let value = match link_type {
                    LinkType::Autolink => NodeValue::AutoLink {
                        url: dest_url.to_string(),
                    },
                    LinkType::Email => NodeValue::AutoLink {
                        url: format!("mailto:{dest_url}"),
                    },
                    _ => NodeValue::Link {
                        destination: dest_url.to_string(),
                        title: non_empty(&title),
                    },
                };
                return self.open_inline(value);
            }
            Tag::Image { dest_url, title, .. } => {
                return self.open_inline(NodeValue::Image {
                    destination: dest_url.to_string(),
                    title: non_empty(&title),
                })
            }

            Tag::Paragraph => NodeValue::Paragraph,
            Tag::Heading { level, .. } => NodeValue::Heading {
                level: heading_level(level),
            },
            Tag::BlockQuote(_) => NodeValue::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeValue::FencedCodeBlock {
                language: info.split_whitespace().next().map(str::to_string),
                lines: Vec::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => NodeValue::CodeBlock { lines: Vec::new() },
            Tag::HtmlBlock => NodeValue::HtmlBlock { lines: Vec::new() },
            Tag::List(start) => NodeValue::List {
                ordered: start.is_some(),
                start: start.unwrap_or(1),
                tight: true,
            },
            Tag::Item => NodeValue::ListItem,
            Tag::Table(alignments) => NodeValue::Table {
                alignments: alignments.iter().map(|a| alignment(*a)).collect(),
            },
            Tag::TableHead => NodeValue::TableHeader,
            Tag::TableRow => NodeValue::TableRow,
            Tag::TableCell => NodeValue::TableCell,
            other => {
                tracing::trace!(tag = ?other, "Splicing unsupported container");
                self.stack.push(Frame::splice());
                return;
            }
        };

        let mut frame = Frame::new(value);
        if frame.node.kind() == Kind::Paragraph && self.top_is_marker_only() {
            // a task marker read before the paragraph of a loose item
            if let Some(mut marker) = self.stack.pop() {
                frame.node.children = std::mem::take(&mut marker.node.children);
            }
        } else {
            self.close_text_block();
        }
        self.stack.push(frame);
    }

    fn end(&mut self, _tag: TagEnd) {
        // a text block is only ever closed by the end of its item
        self.close_text_block();
        self.pop();
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        let mut node = Text::new(range.clone().into());
        // tabs partly consumed by indentation come back as spaces with no
        // source bytes behind them
        if self.source.get(range) != Some(text) {
            node.literal = Some(text.to_string());
        }

        if let Some(
            NodeValue::FencedCodeBlock { lines, .. } | NodeValue::CodeBlock { lines },
        ) = self.top_value_mut()
        {
            lines.push(node);
            return;
        }
        self.inline(Node::new(NodeValue::Text(node)));
    }

    fn code(&mut self, code: &str, range: Range<usize>) {
        let raw = self.source.as_bytes().get(range.clone()).unwrap_or_default();
        let ticks = raw.iter().take_while(|&&b| b == b'`').count();
        let inner = Segment::new(range.start + ticks, range.end.saturating_sub(ticks));

        let mut text = Text::raw(inner);
        if inner.value(self.source.as_bytes()) != code.as_bytes() {
            text.literal = Some(code.to_string());
        }
        self.inline(Node::with_children(
            NodeValue::CodeSpan,
            vec![Node::new(NodeValue::Text(text))],
        ));
    }

    fn html(&mut self, range: Range<usize>) {
        if let Some(NodeValue::HtmlBlock { lines }) = self.top_value_mut() {
            lines.push(range.into());
            return;
        }
        self.inline(Node::new(NodeValue::RawHtml {
            segments: vec![range.into()],
        }));
    }

    /// Breaks are flags on the text before them.
    fn line_break(&mut self, range: Range<usize>, hard: bool) {
        let last = self
            .stack
            .last_mut()
            .and_then(|frame| frame.node.children.last_mut());
        if let Some(Node {
            value: NodeValue::Text(text),
            ..
        }) = last
        {
            set_break(text, hard);
            return;
        }

        let mut text = Text::new(Segment::empty(range.start));
        set_break(&mut text, hard);
        self.inline(Node::new(NodeValue::Text(text)));
    }

    fn open_inline(&mut self, value: NodeValue) {
        self.ensure_inline_container();
        self.stack.push(Frame::new(value));
    }

    fn inline(&mut self, node: Node) {
        self.ensure_inline_container();
        self.append(node);
    }

    /// Tight list items carry their inline content without a paragraph.
    fn ensure_inline_container(&mut self) {
        if self.top_kind() == Some(Kind::ListItem) {
            self.stack.push(Frame::new(NodeValue::TextBlock));
        }
    }

    fn close_text_block(&mut self) {
        if self.top_kind() == Some(Kind::TextBlock) {
            self.pop();
        }
    }

    fn top_is_marker_only(&self) -> bool {
        self.stack.last().is_some_and(|frame| {
            frame.node.kind() == Kind::TextBlock
                && !frame.node.children.is_empty()
                && frame
                    .node
                    .children
                    .iter()
                    .all(|c| c.kind() == Kind::TaskCheckBox)
        })
    }

    fn append(&mut self, node: Node) {
        if let Some(frame) = self.stack.last_mut() {
            frame.node.children.push(node);
        }
    }

    fn pop(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };

        let mut node = frame.node;
        if node.kind() == Kind::List {
            let loose = node
                .children
                .iter()
                .any(|item| item.children.iter().any(|c| c.kind() == Kind::Paragraph));
            if let NodeValue::List { tight, .. } = &mut node.value {
                *tight = !loose;
            }
        }

        if frame.splice {
            if let Some(parent) = self.stack.last_mut() {
                parent.node.children.append(&mut node.children);
            }
        } else {
            self.append(node);
        }
    }

    fn top_kind(&self) -> Option<Kind> {
        self.stack.last().map(|frame| frame.node.kind())
    }

    fn top_value_mut(&mut self) -> Option<&mut NodeValue> {
        self.stack.last_mut().map(|frame| &mut frame.node.value)
    }
}

fn set_break(text: &mut Text, hard: bool) {
    if hard {
        text.hard_line_break = true;
    } else {
        text.soft_line_break = true;
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn alignment(a: MdAlignment) -> Alignment {
    match a {
        MdAlignment::None => Alignment::None,
        MdAlignment::Left => Alignment::Left,
        MdAlignment::Center => Alignment::Center,
        MdAlignment::Right => Alignment::Right,
    }
}
