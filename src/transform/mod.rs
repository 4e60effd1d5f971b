//! AST rewrite passes run between parsing and rendering.

use crate::ast::{Kind, Node, NodeValue};

/// Turn every paragraph whose only child is an image into an image block.
///
/// The image node itself is kept as the only child of the new block, so the
/// renderer still sees its destination and alt text. Running the pass a
/// second time changes nothing.
pub fn promote_image_blocks(root: &mut Node) {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if is_lone_image_paragraph(node) {
            node.value = NodeValue::ImageBlock;
            continue;
        }
        pending.extend(node.children.iter_mut());
    }
}

fn is_lone_image_paragraph(node: &Node) -> bool {
    node.kind() == Kind::Paragraph
        && node.children.len() == 1
        && node.children[0].kind() == Kind::Image
}
