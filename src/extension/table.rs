//! GFM tables, rendered as a `table` inside a figure.

use pulldown_cmark::Options;

use crate::ast::{Kind, NodeValue};
use crate::error::{ConfigError, RenderError};
use crate::extension::{Extension, ParserHooks, Registrar};
use crate::render::typst::{close_figure, open_figure};
use crate::render::{Cursor, Emitter, Visit, WalkStatus};

type RenderResult = Result<WalkStatus, RenderError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtension;

impl Extension for TableExtension {
    fn name(&self) -> &'static str {
        "table"
    }

    fn kinds(&self) -> &'static [Kind] {
        &[Kind::Table, Kind::TableHeader, Kind::TableRow, Kind::TableCell]
    }

    fn extend_parser(&self, hooks: &mut ParserHooks) {
        hooks.enable(Options::ENABLE_TABLES);
    }

    fn register(&self, reg: &mut Registrar<'_>) -> Result<(), ConfigError> {
        reg.bind(Kind::Table, render_table)?;
        reg.bind(Kind::TableHeader, render_table_header)?;
        reg.bind(Kind::TableRow, render_table_row)?;
        reg.bind(Kind::TableCell, render_table_cell)
    }
}

fn render_table(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    let NodeValue::Table { alignments } = &cursor.node.value else {
        return Ok(WalkStatus::Continue);
    };
    match visit {
        Visit::Enter => {
            // the parser pads every row to the delimiter row, but hand-built
            // trees may carry no alignments at all
            let columns = if alignments.is_empty() {
                cursor.node.first_child().map_or(0, |row| row.children.len())
            } else {
                alignments.len()
            };
            open_figure(em)?;
            write!(em, "table(\ncolumns: {columns},\n")?;
            if !alignments.is_empty() {
                em.write(b"align: (")?;
                for (i, alignment) in alignments.iter().enumerate() {
                    if i > 0 {
                        em.write(b", ")?;
                    }
                    em.write_str(alignment.typst_name())?;
                }
                em.write(b",),\n")?;
            }
        }
        Visit::Exit => {
            em.write(b"),\n")?;
            close_figure(em, cursor)?;
        }
    }
    Ok(WalkStatus::Continue)
}

fn render_table_header(em: &mut Emitter<'_>, _source: &[u8], _cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    match visit {
        Visit::Enter => em.write(b"table.header(")?,
        Visit::Exit => em.write(b"),\n")?,
    }
    Ok(WalkStatus::Continue)
}

fn render_table_row(em: &mut Emitter<'_>, _source: &[u8], _cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    if visit == Visit::Exit {
        em.write(b",\n")?;
    }
    Ok(WalkStatus::Continue)
}

fn render_table_cell(em: &mut Emitter<'_>, _source: &[u8], cursor: Cursor<'_>, visit: Visit) -> RenderResult {
    match visit {
        Visit::Enter => em.write(b"[")?,
        Visit::Exit => {
            em.write(b"]")?;
            if cursor.has_next_sibling {
                em.write(b", ")?;
            }
        }
    }
    Ok(WalkStatus::Continue)
}
