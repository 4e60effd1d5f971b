//! Abstract Syntax Tree definitions for GitHub-flavored Markdown documents.
//!
//! The tree is produced by [`crate::parser`] (or built by hand) and is read
//! by the render engine. Text content is not copied out of the source: text
//! nodes carry a [`Segment`] into the original bytes.

/// A half-open byte range `[start, stop)` into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Segment {
    pub start: usize,
    pub stop: usize,
}

impl Segment {
    /// Create a segment. `stop` is clamped so that `start <= stop` holds.
    pub fn new(start: usize, stop: usize) -> Self {
        Self {
            start,
            stop: stop.max(start),
        }
    }

    /// An empty segment positioned at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// The bytes this segment covers, or an empty slice if it lies outside `source`.
    pub fn value<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        source.get(self.start..self.stop).unwrap_or_default()
    }
}

impl From<std::ops::Range<usize>> for Segment {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Table column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// The Typst alignment value for this column.
    pub fn typst_name(&self) -> &'static str {
        match self {
            Self::None => "auto",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// A run of text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    /// Location of the text in the source.
    pub segment: Segment,
    /// Copy the bytes verbatim instead of escaping them.
    pub raw: bool,
    /// The text is followed by a hard line break.
    pub hard_line_break: bool,
    /// The text is followed by a soft line break.
    pub soft_line_break: bool,
    /// Decoded content when it differs from the source bytes
    /// (backslash escapes, entity references).
    pub literal: Option<String>,
}

impl Text {
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            ..Default::default()
        }
    }

    pub fn raw(segment: Segment) -> Self {
        Self {
            segment,
            raw: true,
            ..Default::default()
        }
    }

    /// The text content, preferring the decoded literal over the source bytes.
    pub fn value<'a>(&'a self, source: &'a [u8]) -> &'a [u8] {
        match &self.literal {
            Some(literal) => literal.as_bytes(),
            None => self.segment.value(source),
        }
    }
}

/// Node payloads. Every kind the renderer knows is listed here; there is no
/// open-ended extension point on the parser side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    /// The root of a document
    Document,

    /// An ATX or setext heading with level 1-6
    Heading { level: u8 },

    /// A paragraph of inline content
    Paragraph,

    /// Inline content of a tight list item, not wrapped in a paragraph
    TextBlock,

    /// An ordered or unordered list
    List {
        ordered: bool,
        start: u64,
        tight: bool,
    },

    ListItem,

    /// A GFM table
    Table { alignments: Vec<Alignment> },

    /// The header row of a table; its children are cells
    TableHeader,

    TableRow,

    TableCell,

    /// A fenced code block; `lines` hold the content including line endings
    FencedCodeBlock {
        language: Option<String>,
        lines: Vec<Text>,
    },

    /// An indented code block
    CodeBlock { lines: Vec<Text> },

    /// A block quote
    Blockquote,

    /// A thematic break (horizontal rule)
    ThematicBreak,

    /// An HTML block
    HtmlBlock { lines: Vec<Segment> },

    /// Inline code; children are raw text, one per source line
    CodeSpan,

    /// Emphasis (level 1) or strong emphasis (level 2)
    Emphasis { level: u8 },

    /// An inline image; children hold the alt text
    Image {
        destination: String,
        title: Option<String>,
    },

    /// An image that was alone in its paragraph; the only child is the image
    ImageBlock,

    /// A link
    Link {
        destination: String,
        title: Option<String>,
    },

    /// An autolink (`<https://...>` or `<user@example.com>`)
    AutoLink { url: String },

    /// Raw inline HTML
    RawHtml { segments: Vec<Segment> },

    /// Text content
    Text(Text),

    /// GFM strikethrough
    Strikethrough,

    /// GFM task list marker
    TaskCheckBox { checked: bool },
}

/// The tag of a [`NodeValue`], used as the key of renderer bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Document,
    Heading,
    Paragraph,
    TextBlock,
    List,
    ListItem,
    Table,
    TableHeader,
    TableRow,
    TableCell,
    FencedCodeBlock,
    CodeBlock,
    Blockquote,
    ThematicBreak,
    HtmlBlock,
    CodeSpan,
    Emphasis,
    Image,
    ImageBlock,
    Link,
    AutoLink,
    RawHtml,
    Text,
    Strikethrough,
    TaskCheckBox,
}

impl Kind {
    /// Number of node kinds.
    pub const COUNT: usize = 25;

    /// Every node kind, in declaration order.
    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Document,
        Kind::Heading,
        Kind::Paragraph,
        Kind::TextBlock,
        Kind::List,
        Kind::ListItem,
        Kind::Table,
        Kind::TableHeader,
        Kind::TableRow,
        Kind::TableCell,
        Kind::FencedCodeBlock,
        Kind::CodeBlock,
        Kind::Blockquote,
        Kind::ThematicBreak,
        Kind::HtmlBlock,
        Kind::CodeSpan,
        Kind::Emphasis,
        Kind::Image,
        Kind::ImageBlock,
        Kind::Link,
        Kind::AutoLink,
        Kind::RawHtml,
        Kind::Text,
        Kind::Strikethrough,
        Kind::TaskCheckBox,
    ];

    /// Position of this kind in [`Kind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether nodes of this kind are separated from their siblings by a
    /// blank line. List items and table rows are parts of their container
    /// and end with a single newline instead.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Kind::Heading
                | Kind::Paragraph
                | Kind::TextBlock
                | Kind::List
                | Kind::Table
                | Kind::FencedCodeBlock
                | Kind::CodeBlock
                | Kind::Blockquote
                | Kind::ThematicBreak
                | Kind::HtmlBlock
                | Kind::ImageBlock
        )
    }
}

impl NodeValue {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Document => Kind::Document,
            Self::Heading { .. } => Kind::Heading,
            Self::Paragraph => Kind::Paragraph,
            Self::TextBlock => Kind::TextBlock,
            Self::List { .. } => Kind::List,
            Self::ListItem => Kind::ListItem,
            Self::Table { .. } => Kind::Table,
            Self::TableHeader => Kind::TableHeader,
            Self::TableRow => Kind::TableRow,
            Self::TableCell => Kind::TableCell,
            Self::FencedCodeBlock { .. } => Kind::FencedCodeBlock,
            Self::CodeBlock { .. } => Kind::CodeBlock,
            Self::Blockquote => Kind::Blockquote,
            Self::ThematicBreak => Kind::ThematicBreak,
            Self::HtmlBlock { .. } => Kind::HtmlBlock,
            Self::CodeSpan => Kind::CodeSpan,
            Self::Emphasis { .. } => Kind::Emphasis,
            Self::Image { .. } => Kind::Image,
            Self::ImageBlock => Kind::ImageBlock,
            Self::Link { .. } => Kind::Link,
            Self::AutoLink { .. } => Kind::AutoLink,
            Self::RawHtml { .. } => Kind::RawHtml,
            Self::Text(_) => Kind::Text,
            Self::Strikethrough => Kind::Strikethrough,
            Self::TaskCheckBox { .. } => Kind::TaskCheckBox,
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub value: NodeValue,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(value: NodeValue) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    pub fn with_children(value: NodeValue, children: Vec<Node>) -> Self {
        Self { value, children }
    }

    pub fn document(children: Vec<Node>) -> Self {
        Self::with_children(NodeValue::Document, children)
    }

    pub fn text(segment: Segment) -> Self {
        Self::new(NodeValue::Text(Text::new(segment)))
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Dropping goes through an explicit stack, so trees nested deeper than the
/// call stack allows are still freed.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
