//! Toggle commands over an [`Editor`], built from the model primitives in
//! [`crate::transforms`]. Every command absorbs a missing selection as a
//! silent no-op: a toolbar click on an unfocused editor must never fail.

use crate::core::{BlockType, Editor, ElementKind, InlineType, Mark, Marks, Node};
use crate::transforms::{
    active_marks, apply_marks, collapse_selection, find_nodes, find_nodes_in, insert_nodes,
    move_cursor, set_nodes, unhang_range, unwrap_nodes, wrap_nodes, Edge, MoveOptions,
    WrapOptions,
};

#[derive(Debug, Clone)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Whether a mark is set across the current selection. False when the
/// selection is absent. `Roman` answers the derived style axis: active when
/// neither bold nor italic is.
pub fn is_mark_active(editor: &Editor, mark: Mark) -> bool {
    active_marks(editor).is_some_and(|marks| marks.contains(mark))
}

/// Flips a mark on the current selection. `Roman` is absorbing rather than
/// a true toggle: it always clears bold and italic, whatever their state.
pub fn toggle_mark(editor: &mut Editor, mark: Mark) -> Result<(), CommandError> {
    if editor.selection().is_none() {
        return Ok(());
    }
    if mark == Mark::Roman {
        let apply = |mut marks: Marks| {
            marks.bold = false;
            marks.italic = false;
            marks
        };
        return apply_marks(editor, &apply, "command:toggle_roman");
    }

    let target = !is_mark_active(editor, mark);
    let apply = move |mut marks: Marks| {
        marks.set(mark, target);
        marks
    };
    apply_marks(editor, &apply, toggle_mark_source(mark))
}

fn toggle_mark_source(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "command:toggle_bold",
        Mark::Italic => "command:toggle_italic",
        Mark::Roman => "command:toggle_roman",
        Mark::Underline => "command:toggle_underline",
        Mark::Strikethrough => "command:toggle_strikethrough",
        Mark::Code => "command:toggle_code_mark",
    }
}

/// Whether any block-level node in the unhung selection range carries the
/// given type. False when the selection is absent.
pub fn is_block_active(editor: &Editor, block_type: BlockType) -> bool {
    let Some(sel) = editor.selection() else {
        return false;
    };
    let range = unhang_range(editor.doc(), sel);
    find_nodes_in(
        editor,
        &range,
        move |n| matches!(n, Node::Element(el) if el.kind.block_type() == Some(block_type)),
    )
    .next()
    .is_some()
}

/// A collapsed caret inserts a brand-new empty block of the given type; it
/// never converts the block under the caret. A range converts the matched
/// blocks: back to paragraph when the type is already active, to the type
/// otherwise.
pub fn toggle_block(editor: &mut Editor, block_type: BlockType) -> Result<(), CommandError> {
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    if sel.is_collapsed() {
        return insert_nodes(editor, Node::block(block_type, ""));
    }

    let next = if is_block_active(editor, block_type) {
        BlockType::Paragraph
    } else {
        block_type
    };
    set_nodes(editor, next)
}

/// Forced entry into code-block mode, with no active/inactive branch: the
/// toolbar's code action must land in a code block regardless of the prior
/// block type.
pub fn toggle_code_block(editor: &mut Editor) -> Result<(), CommandError> {
    set_nodes(editor, BlockType::CodeBlock)
}

/// Whether an element of the given inline type intersects the current
/// selection's path set. False when the selection is absent.
pub fn is_inline_active(editor: &Editor, inline_type: InlineType) -> bool {
    find_nodes(
        editor,
        move |n| matches!(n, Node::Element(el) if el.kind.inline_type() == Some(inline_type)),
    )
    .next()
    .is_some()
}

/// Unwraps every element of the given inline type found in the selection,
/// promoting its children. Text content is unchanged.
pub fn unwrap_inline(editor: &mut Editor, inline_type: InlineType) -> Result<(), CommandError> {
    unwrap_nodes(
        editor,
        move |n| matches!(n, Node::Element(el) if el.kind.inline_type() == Some(inline_type)),
    )
}

/// Wraps the selection in a link. Links never nest: an active link is
/// unwrapped first. A collapsed caret inserts a link labeled with its own
/// URL; a range wraps exactly the selected span and collapses to its end.
pub fn wrap_link(editor: &mut Editor, url: &str) -> Result<(), CommandError> {
    if is_inline_active(editor, InlineType::Link) {
        unwrap_inline(editor, InlineType::Link)?;
    }
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    if sel.is_collapsed() {
        return insert_nodes(
            editor,
            Node::element(
                ElementKind::Link {
                    url: url.to_string(),
                },
                vec![Node::text(url)],
            ),
        );
    }
    wrap_nodes(
        editor,
        ElementKind::Link {
            url: url.to_string(),
        },
        WrapOptions { split: true },
    )?;
    collapse_selection(editor, Edge::End);
    Ok(())
}

/// The union of link creation and removal, driven by the current state. The
/// caller supplies the URL it already obtained; a missing or empty URL, or
/// an absent selection, is a no-op when creating. Removal needs no URL.
pub fn toggle_link(editor: &mut Editor, url: Option<&str>) -> Result<(), CommandError> {
    if is_inline_active(editor, InlineType::Link) {
        return unwrap_inline(editor, InlineType::Link);
    }
    match url {
        Some(url) if !url.is_empty() && editor.selection().is_some() => wrap_link(editor, url),
        _ => Ok(()),
    }
}

/// Toggles a code element around the selection. The `inline` attribute is
/// set only when true; a block-placed code element leaves it unset. Block
/// code proper uses the separate code-block block type.
pub fn toggle_code(editor: &mut Editor, is_inline: bool) -> Result<(), CommandError> {
    if is_inline_active(editor, InlineType::Code) {
        return unwrap_inline(editor, InlineType::Code);
    }
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    let kind = ElementKind::Code {
        inline: is_inline.then_some(true),
    };
    if sel.is_collapsed() {
        return insert_nodes(editor, Node::element(kind, vec![Node::text("")]));
    }
    wrap_nodes(editor, kind, WrapOptions { split: true })?;
    collapse_selection(editor, Edge::End);
    Ok(())
}

/// Toggles a math element at the caret. Inline math starts as the "$$"
/// placeholder with the cursor parked between the delimiters; block math
/// starts empty. Wrapping a non-collapsed selection is not implemented and
/// leaves the tree untouched.
pub fn toggle_math(editor: &mut Editor, is_inline: bool) -> Result<(), CommandError> {
    if is_inline_active(editor, InlineType::Math) {
        return unwrap_inline(editor, InlineType::Math);
    }
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    if !sel.is_collapsed() {
        return Ok(());
    }

    let placeholder = if is_inline { "$$" } else { "" };
    insert_nodes(
        editor,
        Node::element(
            ElementKind::Math { inline: is_inline },
            vec![Node::text(placeholder)],
        ),
    )?;
    if is_inline {
        move_cursor(
            editor,
            MoveOptions {
                distance: 1,
                reverse: true,
            },
        );
    }
    Ok(())
}
