//! Source positions and diagnostic reporting.
//!
//! A [`Reporter`] indexes the start of every line in a source buffer once and
//! then maps byte offsets to 1-based line and column numbers. Columns count
//! bytes, not characters.

use std::fmt;
use std::io::{self, Write};

use crate::ast::Segment;

/// A position in a source file.
///
/// Any field may be missing; [`fmt::Display`] degrades through the forms
/// `file:line:column`, `file:line`, `line:column`, `line`, `file`, and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub file: Option<String>,
    /// Starting at 1.
    pub line: Option<usize>,
    /// Byte count, starting at 1.
    pub column: Option<usize>,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.as_deref().filter(|file| !file.is_empty());
        match (file, self.line) {
            (Some(file), Some(line)) => {
                write!(f, "{file}:{line}")?;
                if let Some(column) = self.column {
                    write!(f, ":{column}")?;
                }
                Ok(())
            }
            (None, Some(line)) => {
                write!(f, "{line}")?;
                if let Some(column) = self.column {
                    write!(f, ":{column}")?;
                }
                Ok(())
            }
            (Some(file), None) => f.write_str(file),
            (None, None) => f.write_str("-"),
        }
    }
}

/// A message attached to a source segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub segment: Segment,
    /// Optional category printed before the message.
    pub category: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(segment: Segment, message: impl Into<String>) -> Self {
        Self {
            segment,
            category: None,
            message: message.into(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Maps byte offsets in one source buffer to positions and prints diagnostics.
#[derive(Debug, Clone)]
pub struct Reporter<'a> {
    file: String,
    data: &'a [u8],
    context: usize,
    line_starts: Vec<usize>,
}

impl<'a> Reporter<'a> {
    /// Index `data`. `context` is the number of source lines printed before
    /// and after the reported segment; zero prints none.
    pub fn new(file: impl Into<String>, data: &'a [u8], context: usize) -> Self {
        let mut line_starts = Vec::with_capacity(data.len() / 32 + 1);
        line_starts.push(0);
        line_starts.extend(memchr::memchr_iter(b'\n', data).map(|i| i + 1));

        Self {
            file: file.into(),
            data,
            context,
            line_starts,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Number of lines, counting a trailing empty line after a final newline.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Offsets at which each line begins.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// The 0-based line containing `offset`.
    pub fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            // line_starts[0] == 0, so a miss always lands after the first entry
            Err(insert) => insert - 1,
        }
    }

    /// The 0-based line and byte column of `offset`.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let line = self.line_index(offset);
        (line, offset - self.line_starts[line])
    }

    /// The 1-based position of `offset`.
    pub fn position(&self, offset: usize) -> Position {
        let (line, column) = self.line_column(offset);
        Position {
            file: Some(self.file.clone()),
            line: Some(line + 1),
            column: Some(column + 1),
        }
    }

    /// Contents of the 0-based line `index`, without its line ending.
    pub fn line(&self, index: usize) -> Option<&[u8]> {
        let start = *self.line_starts.get(index)?;
        let stop = match self.line_starts.get(index + 1) {
            Some(next) => next - 1,
            None => self.data.len(),
        };
        let line = &self.data[start..stop];
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Write `diag` and its context lines to `w`.
    pub fn report_to<W: Write + ?Sized>(&self, w: &mut W, diag: &Diagnostic) -> io::Result<()> {
        let start_line = self.line_index(diag.segment.start);
        let pos = self.position(diag.segment.start);

        match &diag.category {
            Some(category) => writeln!(w, "{pos}: {category}: {}", diag.message)?,
            None => writeln!(w, "{pos}: {}", diag.message)?,
        }

        if self.context > 0 {
            let stop_line = self.line_index(diag.segment.stop.max(diag.segment.start));
            let first = start_line.saturating_sub(self.context);
            let last = (stop_line + self.context).min(self.line_count() - 1);
            for index in first..=last {
                if let Some(line) = self.line(index) {
                    write!(w, "{index}\t")?;
                    w.write_all(line)?;
                    w.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }

    /// Write `diag` to standard error. Failures to write are ignored.
    pub fn report(&self, diag: &Diagnostic) {
        let stderr = io::stderr();
        let mut lock = stderr.lock();
        if let Err(e) = self.report_to(&mut lock, diag) {
            tracing::debug!(error = %e, "Failed to write diagnostic");
        }
    }
}
