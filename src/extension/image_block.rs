//! Images that stand alone in their paragraph, rendered as figures.

use crate::ast::Kind;
use crate::error::{ConfigError, RenderError};
use crate::extension::{Extension, ParserHooks, Registrar};
use crate::render::typst::{close_figure, first_image, open_figure};
use crate::render::{Cursor, Emitter, Visit, WalkStatus};
use crate::transform::promote_image_blocks;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBlockExtension;

impl Extension for ImageBlockExtension {
    fn name(&self) -> &'static str {
        "image-block"
    }

    fn kinds(&self) -> &'static [Kind] {
        &[Kind::ImageBlock]
    }

    fn extend_parser(&self, hooks: &mut ParserHooks) {
        hooks.add_transformer(promote_image_blocks);
    }

    fn register(&self, reg: &mut Registrar<'_>) -> Result<(), ConfigError> {
        reg.bind(Kind::ImageBlock, render_image_block)
    }
}

fn render_image_block(
    em: &mut Emitter<'_>,
    _source: &[u8],
    cursor: Cursor<'_>,
    visit: Visit,
) -> Result<WalkStatus, RenderError> {
    if visit.is_enter() {
        open_figure(em)?;
        em.write(b"image(")?;
        em.string(first_image(cursor.node).unwrap_or_default().as_bytes())?;
        em.write(b"),\n")?;
        close_figure(em, cursor)?;
    }
    Ok(WalkStatus::SkipChildren)
}
