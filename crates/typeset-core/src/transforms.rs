use std::cmp::Ordering;

use crate::commands::CommandError;
use crate::core::{
    children_at_path, clamp_to_char_boundary, node_at_path, path_compare, BlockType, Document,
    Editor, ElementKind, ElementNode, Mark, Marks, Node, Point, Selection, TextNode,
};
use crate::ops::{Op, Path, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

#[derive(Debug, Clone, Copy)]
pub struct MoveOptions {
    /// Distance in offset units (characters).
    pub distance: usize,
    pub reverse: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WrapOptions {
    /// Split partially covered text so only the selected span is enclosed.
    pub split: bool,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Lazy document-order traversal of every node with its path. Re-invoking
/// re-walks the tree; no walk state outlives one iterator.
pub struct NodeEntries<'a> {
    stack: Vec<(&'a Node, Path)>,
}

pub fn node_entries(doc: &Document) -> NodeEntries<'_> {
    let stack = doc
        .children
        .iter()
        .enumerate()
        .rev()
        .map(|(ix, node)| (node, vec![ix]))
        .collect();
    NodeEntries { stack }
}

impl<'a> Iterator for NodeEntries<'a> {
    type Item = (&'a Node, Path);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, path) = self.stack.pop()?;
        if let Node::Element(el) = node {
            for (ix, child) in el.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(ix);
                self.stack.push((child, child_path));
            }
        }
        Some((node, path))
    }
}

enum Span {
    Range(Path, Path),
    Empty,
}

/// [`node_entries`] filtered to a selection range and a predicate. A node is
/// in range when its path compares inside the endpoint paths, which keeps
/// the ancestors of either endpoint (they compare equal to a descendant).
pub struct FindNodes<'a, F> {
    entries: NodeEntries<'a>,
    span: Span,
    pred: F,
}

impl<'a, F: Fn(&Node) -> bool> Iterator for FindNodes<'a, F> {
    type Item = (&'a Node, Path);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Span::Range(start, end) = &self.span else {
                return None;
            };
            let (node, path) = self.entries.next()?;
            if path_compare(&path, start) == Ordering::Less
                || path_compare(&path, end) == Ordering::Greater
            {
                continue;
            }
            if (self.pred)(node) {
                return Some((node, path));
            }
        }
    }
}

/// Matching nodes within the current selection; yields nothing when the
/// selection is absent.
pub fn find_nodes<F: Fn(&Node) -> bool>(editor: &Editor, pred: F) -> FindNodes<'_, F> {
    let span = match editor.selection() {
        Some(sel) => {
            let (start, end) = sel.ordered();
            Span::Range(start.path, end.path)
        }
        None => Span::Empty,
    };
    FindNodes {
        entries: node_entries(editor.doc()),
        span,
        pred,
    }
}

/// Matching nodes within an explicit range.
pub fn find_nodes_in<'a, F: Fn(&Node) -> bool>(
    editor: &'a Editor,
    range: &Selection,
    pred: F,
) -> FindNodes<'a, F> {
    let (start, end) = range.ordered();
    FindNodes {
        entries: node_entries(editor.doc()),
        span: Span::Range(start.path, end.path),
        pred,
    }
}

/// Normalizes a range whose end hangs at offset 0 of a node back to the end
/// of the previous text leaf, so block-level matching does not pick up the
/// block the range merely touches.
pub fn unhang_range(doc: &Document, sel: &Selection) -> Selection {
    let (start, mut end) = sel.ordered();
    if sel.is_collapsed() || end.offset != 0 {
        return Selection {
            anchor: start,
            focus: end,
        };
    }
    while end.offset == 0 && end.path != start.path {
        match previous_text_leaf(doc, &end.path) {
            Some((path, len)) => {
                if path.as_slice() < start.path.as_slice() {
                    end = start.clone();
                    break;
                }
                end = Point::new(path, len);
            }
            None => break,
        }
    }
    Selection {
        anchor: start,
        focus: end,
    }
}

fn previous_text_leaf(doc: &Document, before: &[usize]) -> Option<(Path, usize)> {
    let mut last: Option<(Path, usize)> = None;
    for (node, path) in node_entries(doc) {
        if path.as_slice() >= before {
            break;
        }
        if let Node::Text(t) = node {
            last = Some((path, t.text.len()));
        }
    }
    last
}

/// The marks map at the current selection, or `None` when the selection is
/// absent. A caret reads the leaf under it; a range reads the first text
/// leaf the range actually covers.
pub fn active_marks(editor: &Editor) -> Option<Marks> {
    let sel = editor.selection()?;
    if sel.is_collapsed() {
        return Some(marks_at_point(editor.doc(), &sel.focus));
    }

    let doc = editor.doc();
    let (start, end) = sel.ordered();
    if let Some(spans) = block_spans(doc, &start, &end) {
        if let Some((block, s, _)) = spans.into_iter().next() {
            if let Some((rel, _)) = point_at_global(&block.el.children, s) {
                let mut path = block.path.clone();
                path.extend(rel);
                return Some(marks_at_point(doc, &Point::new(path, 0)));
            }
        }
    }
    Some(marks_at_point(doc, &sel.focus))
}

fn marks_at_point(doc: &Document, point: &Point) -> Marks {
    match node_at_path(doc, &point.path) {
        Some(Node::Text(t)) => t.marks.clone(),
        _ => Marks::default(),
    }
}

// ---------------------------------------------------------------------------
// Inline geometry
// ---------------------------------------------------------------------------

pub(crate) fn node_text_len(node: &Node) -> usize {
    match node {
        Node::Text(t) => t.text.len(),
        Node::Element(el) => inline_text_len(&el.children),
    }
}

pub(crate) fn inline_text_len(children: &[Node]) -> usize {
    children.iter().map(node_text_len).sum()
}

/// Global text offset of a point given relative to `children`.
fn point_to_global(children: &[Node], rel: &[usize], offset: usize) -> usize {
    let Some((&ix, rest)) = rel.split_first() else {
        return 0;
    };
    let mut global = 0usize;
    for (i, node) in children.iter().enumerate() {
        if i < ix {
            global += node_text_len(node);
            continue;
        }
        match node {
            Node::Text(t) => global += clamp_to_char_boundary(&t.text, offset),
            Node::Element(el) => global += point_to_global(&el.children, rest, offset),
        }
        break;
    }
    global
}

/// Leaf point for a global text offset. Offsets on a leaf boundary resolve
/// into the following leaf; the end of the content resolves to the end of
/// the last leaf.
fn point_at_global(children: &[Node], global: usize) -> Option<(Path, usize)> {
    let mut remaining = global;
    for (ix, node) in children.iter().enumerate() {
        let len = node_text_len(node);
        if remaining < len {
            return match node {
                Node::Text(t) => Some((vec![ix], clamp_to_char_boundary(&t.text, remaining))),
                Node::Element(el) => {
                    let (mut rel, offset) = point_at_global(&el.children, remaining)?;
                    rel.insert(0, ix);
                    Some((rel, offset))
                }
            };
        }
        remaining -= len;
    }
    last_text_leaf(children)
}

fn first_text_leaf(children: &[Node]) -> Option<(Path, usize)> {
    for (ix, node) in children.iter().enumerate() {
        match node {
            Node::Text(t) => return Some((vec![ix], t.text.len())),
            Node::Element(el) => {
                if let Some((mut rel, len)) = first_text_leaf(&el.children) {
                    rel.insert(0, ix);
                    return Some((rel, len));
                }
            }
        }
    }
    None
}

fn last_text_leaf(children: &[Node]) -> Option<(Path, usize)> {
    for (ix, node) in children.iter().enumerate().rev() {
        match node {
            Node::Text(t) => return Some((vec![ix], t.text.len())),
            Node::Element(el) => {
                if let Some((mut rel, len)) = last_text_leaf(&el.children) {
                    rel.insert(0, ix);
                    return Some((rel, len));
                }
            }
        }
    }
    None
}

/// Splits an inline run at a global offset. A text leaf on the boundary
/// splits in two; an inline element splits into two elements of the same
/// kind carrying the split halves of its children.
fn split_children_at_global(children: &[Node], global: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left: Vec<Node> = Vec::new();
    let mut right: Vec<Node> = Vec::new();
    let mut cursor = 0usize;

    for node in children {
        let len = node_text_len(node);
        if cursor + len <= global {
            left.push(node.clone());
        } else if cursor >= global {
            right.push(node.clone());
        } else {
            let local = global - cursor;
            match node {
                Node::Text(t) => {
                    let at = clamp_to_char_boundary(&t.text, local);
                    let before = &t.text[..at];
                    let after = &t.text[at..];
                    if !before.is_empty() {
                        left.push(Node::Text(TextNode {
                            text: before.to_string(),
                            marks: t.marks.clone(),
                        }));
                    }
                    if !after.is_empty() {
                        right.push(Node::Text(TextNode {
                            text: after.to_string(),
                            marks: t.marks.clone(),
                        }));
                    }
                }
                Node::Element(el) => {
                    let (l, r) = split_children_at_global(&el.children, local);
                    if !l.is_empty() {
                        left.push(Node::element(el.kind.clone(), l));
                    }
                    if !r.is_empty() {
                        right.push(Node::element(el.kind.clone(), r));
                    }
                }
            }
        }
        cursor += len;
    }
    (left, right)
}

fn wrap_inline_span(
    children: &[Node],
    start: usize,
    end: usize,
    kind: &ElementKind,
) -> (Vec<Node>, usize) {
    let (left, rest) = split_children_at_global(children, start);
    let (mid, right) = split_children_at_global(&rest, end - start);
    let wrapper_ix = left.len();
    let mut out = left;
    out.push(Node::element(kind.clone(), mid));
    out.extend(right);
    (out, wrapper_ix)
}

fn leaf_bounds(children: &[Node], out: &mut Vec<(usize, usize)>, base: usize) -> usize {
    let mut cursor = base;
    for node in children {
        match node {
            Node::Text(t) => {
                out.push((cursor, cursor + t.text.len()));
                cursor += t.text.len();
            }
            Node::Element(el) => cursor = leaf_bounds(&el.children, out, cursor),
        }
    }
    cursor
}

fn snap_to_leaf_start(children: &[Node], global: usize) -> usize {
    let mut bounds = Vec::new();
    leaf_bounds(children, &mut bounds, 0);
    bounds
        .iter()
        .find(|(s, e)| *s <= global && global < *e)
        .map(|(s, _)| *s)
        .unwrap_or(global)
}

fn snap_to_leaf_end(children: &[Node], global: usize) -> usize {
    let mut bounds = Vec::new();
    leaf_bounds(children, &mut bounds, 0);
    bounds
        .iter()
        .find(|(s, e)| *s < global && global <= *e)
        .map(|(_, e)| *e)
        .unwrap_or(global)
}

// ---------------------------------------------------------------------------
// Block enumeration
// ---------------------------------------------------------------------------

struct TextBlock<'a> {
    path: Path,
    el: &'a ElementNode,
}

fn blocks_in_order(doc: &Document) -> Vec<TextBlock<'_>> {
    fn walk<'a>(children: &'a [Node], path: &mut Vec<usize>, out: &mut Vec<TextBlock<'a>>) {
        for (ix, node) in children.iter().enumerate() {
            let Node::Element(el) = node else {
                continue;
            };
            if el.kind.is_inline() {
                continue;
            }
            path.push(ix);
            if el.children.iter().any(|n| matches!(n, Node::Text(_))) {
                out.push(TextBlock {
                    path: path.clone(),
                    el,
                });
            } else {
                walk(&el.children, path, out);
            }
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(&doc.children, &mut Vec::new(), &mut out);
    out
}

/// Nearest ancestor element that is placed at block level.
fn nearest_block_path(doc: &Document, point_path: &[usize]) -> Option<Path> {
    let mut path: Path = point_path.to_vec();
    while !path.is_empty() {
        if let Some(Node::Element(el)) = node_at_path(doc, &path) {
            if !el.kind.is_inline() {
                return Some(path);
            }
        }
        path.pop();
    }
    None
}

/// The blocks a range touches, each with the covered global text span.
/// Blocks with no covered text are skipped.
fn block_spans<'a>(
    doc: &'a Document,
    start: &Point,
    end: &Point,
) -> Option<Vec<(TextBlock<'a>, usize, usize)>> {
    let start_block = nearest_block_path(doc, &start.path)?;
    let end_block = nearest_block_path(doc, &end.path)?;
    let blocks = blocks_in_order(doc);
    let start_index = blocks.iter().position(|b| b.path == start_block)?;
    let end_index = blocks.iter().position(|b| b.path == end_block)?;
    let (start_index, end_index) = if start_index <= end_index {
        (start_index, end_index)
    } else {
        (end_index, start_index)
    };

    let mut out = Vec::new();
    for (block_index, block) in blocks
        .into_iter()
        .enumerate()
        .take(end_index + 1)
        .skip(start_index)
    {
        let children = block.el.children.as_slice();
        let total = inline_text_len(children);
        let s = if block_index == start_index {
            point_to_global(children, &start.path[block.path.len()..], start.offset)
        } else {
            0
        };
        let e = if block_index == end_index {
            point_to_global(children, &end.path[block.path.len()..], end.offset)
        } else {
            total
        };
        if s >= e {
            continue;
        }
        out.push((block, s, e));
    }
    Some(out)
}

fn replace_children_ops(block_path: &[usize], old_len: usize, new_children: &[Node]) -> Vec<Op> {
    let mut ops: Vec<Op> = Vec::new();
    for child_ix in (0..old_len).rev() {
        let mut path = block_path.to_vec();
        path.push(child_ix);
        ops.push(Op::RemoveNode { path });
    }
    for (child_ix, node) in new_children.iter().cloned().enumerate() {
        let mut path = block_path.to_vec();
        path.push(child_ix);
        ops.push(Op::InsertNode { path, node });
    }
    ops
}

// ---------------------------------------------------------------------------
// Mark application
// ---------------------------------------------------------------------------

pub fn add_mark(editor: &mut Editor, mark: Mark) -> Result<(), CommandError> {
    let apply = move |mut marks: Marks| {
        marks.set(mark, true);
        marks
    };
    apply_marks(editor, &apply, "transform:add_mark")
}

pub fn remove_mark(editor: &mut Editor, mark: Mark) -> Result<(), CommandError> {
    let apply = move |mut marks: Marks| {
        marks.set(mark, false);
        marks
    };
    apply_marks(editor, &apply, "transform:remove_mark")
}

pub(crate) fn apply_marks(
    editor: &mut Editor,
    apply: &dyn Fn(Marks) -> Marks,
    source: &'static str,
) -> Result<(), CommandError> {
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    let computed = if sel.is_collapsed() {
        caret_marks_ops(editor, apply)
    } else {
        range_marks_ops(editor, &sel, apply)
    };
    let Some((ops, selection_after)) = computed else {
        return Ok(());
    };
    if ops.is_empty() {
        return Ok(());
    }
    editor
        .apply(
            Transaction::new(ops)
                .selection_after(selection_after)
                .source(source),
        )
        .map_err(|e| CommandError::new(format!("Failed to apply marks: {e:?}")))
}

/// A caret toggle splits the leaf under the cursor and parks the new marks
/// on an empty leaf between the halves, so the next typed character picks
/// them up and the active-marks query sees them immediately.
fn caret_marks_ops(editor: &Editor, apply: &dyn Fn(Marks) -> Marks) -> Option<(Vec<Op>, Selection)> {
    let focus = editor.selection()?.focus.clone();
    let (child_ix, parent_path) = focus.path.split_last()?;
    let parent_children = children_at_path(editor.doc(), parent_path)?;
    let Node::Text(text) = parent_children.get(*child_ix)? else {
        return None;
    };

    let cursor = clamp_to_char_boundary(&text.text, focus.offset);
    let marks_before = text.marks.clone();
    let marks_after = apply(marks_before.clone());
    if marks_after == marks_before {
        return Some((Vec::new(), Selection::collapsed(focus)));
    }

    if text.text.is_empty() {
        let selection_after = Selection::collapsed(Point::new(focus.path.clone(), 0));
        return Some((
            vec![Op::SetTextMarks {
                path: focus.path.clone(),
                marks: marks_after,
            }],
            selection_after,
        ));
    }

    let left = text.text[..cursor].to_string();
    let right = text.text[cursor..].to_string();

    let mut replacement: Vec<Node> = Vec::new();
    let base_child_ix = *child_ix;
    let mut caret_child_ix = base_child_ix;

    if !left.is_empty() {
        replacement.push(Node::Text(TextNode {
            text: left,
            marks: marks_before.clone(),
        }));
        caret_child_ix += 1;
    }
    replacement.push(Node::Text(TextNode {
        text: String::new(),
        marks: marks_after,
    }));
    if !right.is_empty() {
        replacement.push(Node::Text(TextNode {
            text: right,
            marks: marks_before,
        }));
    }

    let mut ops: Vec<Op> = Vec::new();
    ops.push(Op::RemoveNode {
        path: focus.path.clone(),
    });
    for (i, node) in replacement.into_iter().enumerate() {
        let mut path = parent_path.to_vec();
        path.push(base_child_ix + i);
        ops.push(Op::InsertNode { path, node });
    }

    let mut caret_path = parent_path.to_vec();
    caret_path.push(caret_child_ix);
    Some((ops, Selection::collapsed(Point::new(caret_path, 0))))
}

fn range_marks_ops(
    editor: &Editor,
    sel: &Selection,
    apply: &dyn Fn(Marks) -> Marks,
) -> Option<(Vec<Op>, Selection)> {
    let doc = editor.doc();
    let (start, end) = sel.ordered();
    let spans = block_spans(doc, &start, &end)?;

    let mut ops: Vec<Op> = Vec::new();
    let mut new_anchor = sel.anchor.clone();
    let mut new_focus = sel.focus.clone();

    for (block, s, e) in spans {
        let children = block.el.children.as_slice();
        let new_children = apply_marks_in_children(children, s, e, apply);
        ops.extend(replace_children_ops(&block.path, children.len(), &new_children));

        for point in [&mut new_anchor, &mut new_focus] {
            if point.path.len() > block.path.len() && point.path.starts_with(&block.path) {
                let global =
                    point_to_global(children, &point.path[block.path.len()..], point.offset);
                if let Some((rel, offset)) = point_at_global(&new_children, global) {
                    let mut path = block.path.clone();
                    path.extend(rel);
                    *point = Point::new(path, offset);
                }
            }
        }
    }

    Some((
        ops,
        Selection {
            anchor: new_anchor,
            focus: new_focus,
        },
    ))
}

fn apply_marks_in_children(
    children: &[Node],
    start: usize,
    end: usize,
    apply: &dyn Fn(Marks) -> Marks,
) -> Vec<Node> {
    if start >= end {
        return children.to_vec();
    }

    let mut out: Vec<Node> = Vec::new();
    let mut cursor = 0usize;

    for node in children {
        let len = node_text_len(node);
        let (node_start, node_end) = (cursor, cursor + len);
        cursor = node_end;

        if end <= node_start || start >= node_end {
            out.push(node.clone());
            continue;
        }

        match node {
            Node::Element(el) => out.push(Node::element(
                el.kind.clone(),
                apply_marks_in_children(
                    &el.children,
                    start.saturating_sub(node_start),
                    (end - node_start).min(len),
                    apply,
                ),
            )),
            Node::Text(t) => {
                let sel_start =
                    clamp_to_char_boundary(&t.text, start.saturating_sub(node_start).min(len));
                let sel_end = clamp_to_char_boundary(&t.text, (end - node_start).min(len));

                if sel_start == 0 && sel_end == t.text.len() {
                    let mut next = t.clone();
                    next.marks = apply(next.marks);
                    out.push(Node::Text(next));
                    continue;
                }

                let prefix = &t.text[..sel_start];
                let middle = &t.text[sel_start..sel_end];
                let suffix = &t.text[sel_end..];

                if !prefix.is_empty() {
                    out.push(Node::Text(TextNode {
                        text: prefix.to_string(),
                        marks: t.marks.clone(),
                    }));
                }
                if !middle.is_empty() {
                    out.push(Node::Text(TextNode {
                        text: middle.to_string(),
                        marks: apply(t.marks.clone()),
                    }));
                }
                if !suffix.is_empty() {
                    out.push(Node::Text(TextNode {
                        text: suffix.to_string(),
                        marks: t.marks.clone(),
                    }));
                }
            }
        }
    }

    if out.is_empty() {
        out.push(Node::text(""));
    }
    out
}

// ---------------------------------------------------------------------------
// Structural transforms
// ---------------------------------------------------------------------------

/// Inserts a node at the caret, replacing the selection first when it is
/// non-collapsed. Inline nodes split the focused leaf and land between the
/// halves; block nodes become the next sibling of the caret's block. The
/// selection collapses to the end of the inserted content.
pub fn insert_nodes(editor: &mut Editor, node: Node) -> Result<(), CommandError> {
    if editor.selection().is_none() {
        return Ok(());
    }
    if editor.selection().is_some_and(|sel| !sel.is_collapsed()) {
        delete_selection(editor)?;
    }
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    let focus = sel.focus;

    let inline = match &node {
        Node::Text(_) => true,
        Node::Element(el) => el.kind.is_inline(),
    };
    if inline {
        insert_inline_at(editor, &focus, node)
    } else {
        insert_block_after(editor, &focus, node)
    }
}

fn insert_inline_at(editor: &mut Editor, focus: &Point, node: Node) -> Result<(), CommandError> {
    let (ops, selection_after) = {
        let doc = editor.doc();
        let Some((&child_ix, parent_path)) = focus.path.split_last() else {
            return Ok(());
        };
        let Some(parent_children) = children_at_path(doc, parent_path) else {
            return Ok(());
        };
        let Some(Node::Text(text)) = parent_children.get(child_ix) else {
            return Ok(());
        };

        let cursor = clamp_to_char_boundary(&text.text, focus.offset);
        let left = text.text[..cursor].to_string();
        let right = text.text[cursor..].to_string();
        let marks = text.marks.clone();

        let mut replacement: Vec<Node> = Vec::new();
        let mut inserted_ix = child_ix;
        if !left.is_empty() {
            replacement.push(Node::Text(TextNode {
                text: left,
                marks: marks.clone(),
            }));
            inserted_ix += 1;
        }

        let (caret_rel, caret_offset) = match &node {
            Node::Text(t) => (Vec::new(), t.text.len()),
            Node::Element(el) => last_text_leaf(&el.children).unwrap_or((vec![0], 0)),
        };
        replacement.push(node);
        if !right.is_empty() {
            replacement.push(Node::Text(TextNode { text: right, marks }));
        }

        let mut ops = vec![Op::RemoveNode {
            path: focus.path.clone(),
        }];
        for (i, n) in replacement.into_iter().enumerate() {
            let mut path = parent_path.to_vec();
            path.push(child_ix + i);
            ops.push(Op::InsertNode { path, node: n });
        }

        let mut caret_path = parent_path.to_vec();
        caret_path.push(inserted_ix);
        caret_path.extend(caret_rel);
        (
            ops,
            Selection::collapsed(Point::new(caret_path, caret_offset)),
        )
    };

    editor
        .apply(
            Transaction::new(ops)
                .selection_after(selection_after)
                .source("transform:insert_nodes"),
        )
        .map_err(|e| CommandError::new(format!("Failed to insert nodes: {e:?}")))
}

fn insert_block_after(editor: &mut Editor, focus: &Point, node: Node) -> Result<(), CommandError> {
    let (ops, selection_after) = {
        let doc = editor.doc();
        let Some(block_path) = nearest_block_path(doc, &focus.path) else {
            return Ok(());
        };
        let Some((&block_ix, parent_path)) = block_path.split_last() else {
            return Ok(());
        };

        let mut insert_path = parent_path.to_vec();
        insert_path.push(block_ix + 1);

        let caret = match &node {
            Node::Element(el) => {
                let (rel, offset) = last_text_leaf(&el.children).unwrap_or((vec![0], 0));
                let mut path = insert_path.clone();
                path.extend(rel);
                Point::new(path, offset)
            }
            Node::Text(t) => Point::new(insert_path.clone(), t.text.len()),
        };

        (
            vec![Op::InsertNode {
                path: insert_path,
                node,
            }],
            Selection::collapsed(caret),
        )
    };

    editor
        .apply(
            Transaction::new(ops)
                .selection_after(selection_after)
                .source("transform:insert_nodes"),
        )
        .map_err(|e| CommandError::new(format!("Failed to insert nodes: {e:?}")))
}

/// Sets the block type of every block-level element in the unhung selection
/// range. Overwriting the kind is what keeps block types mutually exclusive.
pub fn set_nodes(editor: &mut Editor, block_type: BlockType) -> Result<(), CommandError> {
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    let ops: Vec<Op> = {
        let range = unhang_range(editor.doc(), &sel);
        find_nodes_in(
            editor,
            &range,
            |n| matches!(n, Node::Element(el) if el.kind.block_type().is_some()),
        )
        .map(|(_, path)| Op::SetKind {
            path,
            kind: block_type.kind(),
        })
        .collect()
    };
    if ops.is_empty() {
        return Ok(());
    }
    editor
        .apply(Transaction::new(ops).source("transform:set_nodes"))
        .map_err(|e| CommandError::new(format!("Failed to set block type: {e:?}")))
}

/// Wraps the selected content in a new element. Inline kinds wrap the
/// covered span of each touched block; block kinds wrap the covered run of
/// sibling blocks. No-op on a collapsed or absent selection.
pub fn wrap_nodes(
    editor: &mut Editor,
    kind: ElementKind,
    options: WrapOptions,
) -> Result<(), CommandError> {
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    if sel.is_collapsed() {
        return Ok(());
    }
    if kind.is_inline() {
        wrap_inline_kind(editor, &sel, kind, options)
    } else {
        wrap_block_kind(editor, &sel, kind)
    }
}

fn wrap_inline_kind(
    editor: &mut Editor,
    sel: &Selection,
    kind: ElementKind,
    options: WrapOptions,
) -> Result<(), CommandError> {
    let (ops, selection_after) = {
        let doc = editor.doc();
        let (start, end) = sel.ordered();
        let Some(spans) = block_spans(doc, &start, &end) else {
            return Ok(());
        };

        let mut ops: Vec<Op> = Vec::new();
        let mut wrapped_anchor: Option<Point> = None;
        let mut wrapped_focus: Option<Point> = None;

        for (block, mut s, mut e) in spans {
            let children = block.el.children.as_slice();
            if !options.split {
                s = snap_to_leaf_start(children, s);
                e = snap_to_leaf_end(children, e);
            }
            if s >= e {
                continue;
            }

            let (new_children, wrapper_ix) = wrap_inline_span(children, s, e, &kind);
            ops.extend(replace_children_ops(&block.path, children.len(), &new_children));

            let Some(Node::Element(wrapper)) = new_children.get(wrapper_ix) else {
                continue;
            };
            if wrapped_anchor.is_none() {
                if let Some((rel, _)) = first_text_leaf(&wrapper.children) {
                    let mut path = block.path.clone();
                    path.push(wrapper_ix);
                    path.extend(rel);
                    wrapped_anchor = Some(Point::new(path, 0));
                }
            }
            if let Some((rel, len)) = last_text_leaf(&wrapper.children) {
                let mut path = block.path.clone();
                path.push(wrapper_ix);
                path.extend(rel);
                wrapped_focus = Some(Point::new(path, len));
            }
        }

        if ops.is_empty() {
            return Ok(());
        }
        let selection_after = match (wrapped_anchor, wrapped_focus) {
            (Some(anchor), Some(focus)) => Some(Selection { anchor, focus }),
            _ => None,
        };
        (ops, selection_after)
    };

    let mut tx = Transaction::new(ops).source("transform:wrap_nodes");
    if let Some(selection_after) = selection_after {
        tx = tx.selection_after(selection_after);
    }
    editor
        .apply(tx)
        .map_err(|e| CommandError::new(format!("Failed to wrap nodes: {e:?}")))
}

fn wrap_block_kind(
    editor: &mut Editor,
    sel: &Selection,
    kind: ElementKind,
) -> Result<(), CommandError> {
    let (ops, selection_after) = {
        let doc = editor.doc();
        let (start, end) = sel.ordered();
        let Some(start_block) = nearest_block_path(doc, &start.path) else {
            return Ok(());
        };
        let Some(end_block) = nearest_block_path(doc, &end.path) else {
            return Ok(());
        };
        let Some((&start_ix, start_parent)) = start_block.split_last() else {
            return Ok(());
        };
        let Some((&end_ix, end_parent)) = end_block.split_last() else {
            return Ok(());
        };
        if start_parent != end_parent {
            return Ok(());
        }
        let (start_ix, end_ix) = if start_ix <= end_ix {
            (start_ix, end_ix)
        } else {
            (end_ix, start_ix)
        };

        let Some(parent_children) = children_at_path(doc, start_parent) else {
            return Ok(());
        };
        if end_ix >= parent_children.len() {
            return Ok(());
        }

        let selected: Vec<Node> = parent_children[start_ix..=end_ix].to_vec();
        let wrapper = Node::element(kind, selected);

        let mut ops: Vec<Op> = Vec::new();
        for ix in (start_ix..=end_ix).rev() {
            let mut path = start_parent.to_vec();
            path.push(ix);
            ops.push(Op::RemoveNode { path });
        }
        let mut insert_path = start_parent.to_vec();
        insert_path.push(start_ix);
        ops.push(Op::InsertNode {
            path: insert_path,
            node: wrapper,
        });

        let start_parent = start_parent.to_vec();
        let remap_point = |point: &Point| -> Point {
            if !point.path.starts_with(&start_parent)
                || point.path.len() < start_parent.len() + 2
            {
                return point.clone();
            }
            let block_ix = point.path[start_parent.len()];
            if block_ix < start_ix || block_ix > end_ix {
                return point.clone();
            }
            let mut new_path = start_parent.clone();
            new_path.push(start_ix);
            new_path.push(block_ix - start_ix);
            new_path.extend_from_slice(&point.path[start_parent.len() + 1..]);
            Point {
                path: new_path,
                offset: point.offset,
            }
        };

        let selection_after = Selection {
            anchor: remap_point(&sel.anchor),
            focus: remap_point(&sel.focus),
        };
        (ops, selection_after)
    };

    editor
        .apply(
            Transaction::new(ops)
                .selection_after(selection_after)
                .source("transform:wrap_nodes"),
        )
        .map_err(|e| CommandError::new(format!("Failed to wrap nodes: {e:?}")))
}

/// Removes every matching element intersecting the selection's path set,
/// promoting its children in place. Unrelated ancestors stay untouched.
pub fn unwrap_nodes(
    editor: &mut Editor,
    pred: impl Fn(&Node) -> bool,
) -> Result<(), CommandError> {
    let mut paths: Vec<Path> = {
        if editor.selection().is_none() {
            return Ok(());
        }
        find_nodes(editor, |n| matches!(n, Node::Element(_)))
            .filter(|(node, _)| pred(node))
            .map(|(_, path)| path)
            .collect()
    };
    // Deepest and rightmost first, so earlier paths stay valid across
    // successive splices.
    paths.sort();
    paths.reverse();

    for path in paths {
        unwrap_at(editor, &path)?;
    }
    Ok(())
}

fn unwrap_at(editor: &mut Editor, path: &[usize]) -> Result<(), CommandError> {
    let (ops, selection_after) = {
        let doc = editor.doc();
        let Some(Node::Element(el)) = node_at_path(doc, path) else {
            return Ok(());
        };
        let children = el.children.clone();
        let count = children.len();
        let Some((&elem_ix, parent_path)) = path.split_last() else {
            return Ok(());
        };
        let parent_path = parent_path.to_vec();

        let mut ops: Vec<Op> = Vec::new();
        ops.push(Op::RemoveNode {
            path: path.to_vec(),
        });
        for (i, node) in children.into_iter().enumerate() {
            let mut insert_path = parent_path.clone();
            insert_path.push(elem_ix + i);
            ops.push(Op::InsertNode {
                path: insert_path,
                node,
            });
        }

        let remap_point = |point: &Point| -> Point {
            if point.path.len() > path.len() && point.path.starts_with(path) {
                let inner_ix = point.path[path.len()];
                let mut new_path = parent_path.clone();
                new_path.push(elem_ix + inner_ix);
                new_path.extend_from_slice(&point.path[path.len() + 1..]);
                return Point {
                    path: new_path,
                    offset: point.offset,
                };
            }
            if point.path.len() > parent_path.len() && point.path.starts_with(&parent_path) {
                let depth = parent_path.len();
                if point.path[depth] > elem_ix {
                    let mut new_path = point.path.clone();
                    new_path[depth] += count.saturating_sub(1);
                    return Point {
                        path: new_path,
                        offset: point.offset,
                    };
                }
            }
            point.clone()
        };

        let selection_after = editor.selection().map(|sel| Selection {
            anchor: remap_point(&sel.anchor),
            focus: remap_point(&sel.focus),
        });
        (ops, selection_after)
    };

    let mut tx = Transaction::new(ops).source("transform:unwrap_nodes");
    if let Some(selection_after) = selection_after {
        tx = tx.selection_after(selection_after);
    }
    editor
        .apply(tx)
        .map_err(|e| CommandError::new(format!("Failed to unwrap nodes: {e:?}")))
}

/// Collapses the selection to its start or end in document order.
pub fn collapse_selection(editor: &mut Editor, edge: Edge) {
    let Some(sel) = editor.selection().cloned() else {
        return;
    };
    let (start, end) = sel.ordered();
    let point = match edge {
        Edge::Start => start,
        Edge::End => end,
    };
    editor.set_selection(Selection::collapsed(point));
}

/// Moves the selection endpoints by offset units through the document-order
/// run of text leaves.
pub fn move_cursor(editor: &mut Editor, options: MoveOptions) {
    let Some(sel) = editor.selection().cloned() else {
        return;
    };
    let anchor = shift_point(editor.doc(), &sel.anchor, options.distance, options.reverse);
    let focus = if sel.is_collapsed() {
        anchor.clone()
    } else {
        shift_point(editor.doc(), &sel.focus, options.distance, options.reverse)
    };
    editor.set_selection(Selection { anchor, focus });
}

fn shift_point(doc: &Document, point: &Point, distance: usize, reverse: bool) -> Point {
    let mut leaves: Vec<(Path, &str)> = Vec::new();
    for (node, path) in node_entries(doc) {
        if let Node::Text(t) = node {
            leaves.push((path, t.text.as_str()));
        }
    }
    let Some(mut idx) = leaves.iter().position(|(p, _)| p == &point.path) else {
        return point.clone();
    };
    let mut offset = clamp_to_char_boundary(leaves[idx].1, point.offset);
    let mut remaining = distance;

    if reverse {
        while remaining > 0 {
            if offset > 0 {
                offset = prev_char_boundary(leaves[idx].1, offset);
                remaining -= 1;
            } else if idx > 0 {
                idx -= 1;
                offset = leaves[idx].1.len();
            } else {
                break;
            }
        }
    } else {
        while remaining > 0 {
            if offset < leaves[idx].1.len() {
                offset = next_char_boundary(leaves[idx].1, offset);
                remaining -= 1;
            } else if idx + 1 < leaves.len() {
                idx += 1;
                offset = 0;
            } else {
                break;
            }
        }
    }

    Point::new(leaves[idx].0.clone(), offset)
}

fn prev_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.saturating_sub(1);
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn next_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = (ix + 1).min(s.len());
    while ix < s.len() && !s.is_char_boundary(ix) {
        ix += 1;
    }
    ix
}

/// Inserts text at the caret with the marks of the leaf under it, replacing
/// the selection first when non-collapsed.
pub fn insert_text(editor: &mut Editor, text: &str) -> Result<(), CommandError> {
    if text.is_empty() || editor.selection().is_none() {
        return Ok(());
    }
    if editor.selection().is_some_and(|sel| !sel.is_collapsed()) {
        delete_selection(editor)?;
    }
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    let focus = sel.focus;
    let offset = {
        let Some(Node::Text(leaf)) = node_at_path(editor.doc(), &focus.path) else {
            return Ok(());
        };
        clamp_to_char_boundary(&leaf.text, focus.offset)
    };

    editor
        .apply(
            Transaction::new(vec![Op::InsertText {
                path: focus.path.clone(),
                offset,
                text: text.to_string(),
            }])
            .selection_after(Selection::collapsed(Point::new(
                focus.path,
                offset + text.len(),
            )))
            .source("transform:insert_text"),
        )
        .map_err(|e| CommandError::new(format!("Failed to insert text: {e:?}")))
}

/// Removes the content covered by a non-collapsed selection, merging the
/// boundary blocks when they are siblings. The selection collapses to the
/// start of the removed range.
pub fn delete_selection(editor: &mut Editor) -> Result<(), CommandError> {
    let Some(sel) = editor.selection().cloned() else {
        return Ok(());
    };
    if sel.is_collapsed() {
        return Ok(());
    }
    let (start, end) = sel.ordered();

    if start.path == end.path {
        return editor
            .apply(
                Transaction::new(vec![Op::RemoveText {
                    path: start.path.clone(),
                    range: start.offset..end.offset,
                }])
                .selection_after(Selection::collapsed(Point::new(
                    start.path.clone(),
                    start.offset,
                )))
                .source("transform:delete_selection"),
            )
            .map_err(|e| CommandError::new(format!("Failed to delete selection: {e:?}")));
    }

    let (ops, selection_after) = {
        let doc = editor.doc();
        let Some(start_block) = nearest_block_path(doc, &start.path) else {
            return Ok(());
        };
        let Some(end_block) = nearest_block_path(doc, &end.path) else {
            return Ok(());
        };

        if start_block == end_block {
            let Some(children) = children_at_path(doc, &start_block) else {
                return Ok(());
            };
            let s = point_to_global(children, &start.path[start_block.len()..], start.offset);
            let e = point_to_global(children, &end.path[start_block.len()..], end.offset);
            let (left, _) = split_children_at_global(children, s);
            let (_, right) = split_children_at_global(children, e);
            let mut new_children = left;
            new_children.extend(right);

            let ops = replace_children_ops(&start_block, children.len(), &new_children);
            let caret = point_at_global(&new_children, s)
                .map(|(rel, offset)| {
                    let mut path = start_block.clone();
                    path.extend(rel);
                    Point::new(path, offset)
                })
                .unwrap_or_else(|| {
                    let mut path = start_block.clone();
                    path.push(0);
                    Point::new(path, 0)
                });
            (ops, Selection::collapsed(caret))
        } else if start_block[..start_block.len() - 1] == end_block[..end_block.len() - 1] {
            // Sibling blocks: keep the head of the first and the tail of the
            // last in one merged block, drop everything in between.
            let Some(start_children) = children_at_path(doc, &start_block) else {
                return Ok(());
            };
            let Some(end_children) = children_at_path(doc, &end_block) else {
                return Ok(());
            };
            let s = point_to_global(
                start_children,
                &start.path[start_block.len()..],
                start.offset,
            );
            let e = point_to_global(end_children, &end.path[end_block.len()..], end.offset);

            let (left, _) = split_children_at_global(start_children, s);
            let (_, right) = split_children_at_global(end_children, e);
            let mut new_children = left;
            new_children.extend(right);

            let mut ops = replace_children_ops(&start_block, start_children.len(), &new_children);
            let start_ix = start_block[start_block.len() - 1];
            let end_ix = end_block[end_block.len() - 1];
            let parent = &start_block[..start_block.len() - 1];
            for ix in (start_ix + 1..=end_ix).rev() {
                let mut path = parent.to_vec();
                path.push(ix);
                ops.push(Op::RemoveNode { path });
            }

            let caret = point_at_global(&new_children, s)
                .map(|(rel, offset)| {
                    let mut path = start_block.clone();
                    path.extend(rel);
                    Point::new(path, offset)
                })
                .unwrap_or_else(|| {
                    let mut path = start_block.clone();
                    path.push(0);
                    Point::new(path, 0)
                });
            (ops, Selection::collapsed(caret))
        } else {
            // Boundary blocks live in different containers; clear the covered
            // span of each touched block and keep the block shells.
            let Some(spans) = block_spans(doc, &start, &end) else {
                return Ok(());
            };
            let mut ops: Vec<Op> = Vec::new();
            for (block, s, e) in spans {
                let children = block.el.children.as_slice();
                let (left, _) = split_children_at_global(children, s);
                let (_, right) = split_children_at_global(children, e);
                let mut new_children = left;
                new_children.extend(right);
                ops.extend(replace_children_ops(&block.path, children.len(), &new_children));
            }
            let caret = Point::new(start.path.clone(), start.offset);
            (ops, Selection::collapsed(caret))
        }
    };

    if ops.is_empty() {
        return Ok(());
    }
    editor
        .apply(
            Transaction::new(ops)
                .selection_after(selection_after)
                .source("transform:delete_selection"),
        )
        .map_err(|e| CommandError::new(format!("Failed to delete selection: {e:?}")))
}
