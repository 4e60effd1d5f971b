//! GFM task list items (`- [ ]` and `- [x]`).

use pulldown_cmark::Options;

use crate::ast::{Kind, NodeValue};
use crate::error::{ConfigError, RenderError};
use crate::extension::{Extension, ParserHooks, Registrar};
use crate::render::{Cursor, Emitter, Visit, WalkStatus};

const CHECKED: &str = "☑ ";
const UNCHECKED: &str = "☐ ";

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskCheckBoxExtension;

impl Extension for TaskCheckBoxExtension {
    fn name(&self) -> &'static str {
        "task-checkbox"
    }

    fn kinds(&self) -> &'static [Kind] {
        &[Kind::TaskCheckBox]
    }

    fn extend_parser(&self, hooks: &mut ParserHooks) {
        hooks.enable(Options::ENABLE_TASKLISTS);
    }

    fn register(&self, reg: &mut Registrar<'_>) -> Result<(), ConfigError> {
        reg.bind(Kind::TaskCheckBox, render_task_checkbox)
    }
}

fn render_task_checkbox(
    em: &mut Emitter<'_>,
    _source: &[u8],
    cursor: Cursor<'_>,
    visit: Visit,
) -> Result<WalkStatus, RenderError> {
    if visit.is_enter() {
        let checked = matches!(cursor.node.value, NodeValue::TaskCheckBox { checked: true });
        em.write_str(if checked { CHECKED } else { UNCHECKED })?;
    }
    Ok(WalkStatus::SkipChildren)
}
