use crate::editing::ops::Edit;
use crate::model::{Attrs, Block, BlockKind, ContentItem, CursorPosition};
use crate::parsing::detect_block_markdown;

/// Result of an auto-conversion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConvert {
    pub converted: bool,
    pub cursor: CursorPosition,
}

/// Retype the addressed block in place.
///
/// The block keeps its id; content is replaced wholesale and `new_attrs` is
/// merged into the existing attrs. The cursor relocates to the end of the
/// first fragment of the new content.
pub fn convert_block_to(
    blocks: &mut [Block],
    pos: CursorPosition,
    kind: BlockKind,
    content: Vec<ContentItem>,
    new_attrs: Attrs,
) -> Edit {
    let Some(block) = blocks.get_mut(pos.block) else {
        return Edit {
            cursor: pos,
            changed: false,
        };
    };
    block.kind = kind;
    block.set_content(content);
    block.attrs.extend(new_attrs);

    let cursor = CursorPosition::new(pos.block, 0, block.fragment_len(0));
    Edit {
        cursor,
        changed: true,
    }
}

/// Promote a paragraph to a structured block when its text matches
/// block-level markdown.
///
/// Applies only to paragraphs, and runs the detector against the block's
/// full current text, not just a typed prefix. The host invokes this after
/// a space character is typed, which is what makes "type `# ` → heading"
/// live conversion work.
pub fn try_auto_convert_markdown(blocks: &mut [Block], pos: CursorPosition) -> AutoConvert {
    let declined = AutoConvert {
        converted: false,
        cursor: pos,
    };
    let Some(block) = blocks.get(pos.block) else {
        return declined;
    };
    if block.kind != BlockKind::Paragraph {
        return declined;
    }

    let Some(descriptor) = detect_block_markdown(&block.plain_text()) else {
        return declined;
    };
    let edit = convert_block_to(
        blocks,
        pos,
        descriptor.kind,
        vec![ContentItem::Text(descriptor.content)],
        descriptor.attrs,
    );
    AutoConvert {
        converted: true,
        cursor: edit.cursor,
    }
}

/// Reversion rule: a structured block emptied by a deletion becomes a plain
/// paragraph again.
///
/// Returns the clamped cursor when the reversion fired, `None` otherwise.
pub fn revert_emptied_block(blocks: &mut [Block], pos: CursorPosition) -> Option<CursorPosition> {
    let block = blocks.get_mut(pos.block)?;
    if !block.kind.is_structured() || !block.is_empty() {
        return None;
    }
    block.kind = BlockKind::Paragraph;
    block.set_content(vec![ContentItem::Text(String::new())]);
    block.attrs.clear();
    Some(CursorPosition::new(pos.block, 0, 0))
}
