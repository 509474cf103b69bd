use crate::core::{Document, ElementKind, Node};
use crate::ops::Op;

/// A structural repair over the document tree. Passes are pure: they look at
/// the tree and emit the ops that would fix the first violation they find.
pub(crate) trait NormalizePass {
    fn run(&self, doc: &Document) -> Vec<Op>;
}

fn passes() -> Vec<Box<dyn NormalizePass>> {
    vec![
        Box::new(EnsureNonEmptyDocument),
        Box::new(WrapLooseRootContent),
        Box::new(EnsureTextLeaf),
        Box::new(MergeAdjacentTextLeaves),
    ]
}

/// One repair batch per call; `Editor::apply` iterates to a fixpoint, so
/// every batch is computed against the tree it will actually be applied to.
pub(crate) fn repair_ops(doc: &Document) -> Vec<Op> {
    for pass in passes() {
        let ops = pass.run(doc);
        if !ops.is_empty() {
            return ops;
        }
    }
    Vec::new()
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn run(&self, doc: &Document) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

/// Unwrapping a block-placed element splices its text children directly into
/// the root. The root only holds block elements, so stray runs of text or
/// inline elements get rewrapped into a paragraph.
struct WrapLooseRootContent;

fn is_loose_at_root(node: &Node) -> bool {
    match node {
        Node::Text(_) => true,
        Node::Element(el) => el.kind.is_inline(),
    }
}

impl NormalizePass for WrapLooseRootContent {
    fn run(&self, doc: &Document) -> Vec<Op> {
        let Some(start) = doc.children.iter().position(is_loose_at_root) else {
            return Vec::new();
        };
        let mut end = start;
        while end + 1 < doc.children.len() && is_loose_at_root(&doc.children[end + 1]) {
            end += 1;
        }

        let run: Vec<Node> = doc.children[start..=end].to_vec();
        let mut ops: Vec<Op> = Vec::new();
        for ix in (start..=end).rev() {
            ops.push(Op::RemoveNode { path: vec![ix] });
        }
        ops.push(Op::InsertNode {
            path: vec![start],
            node: Node::element(ElementKind::Paragraph, run),
        });
        ops
    }
}

/// Every element holding inline content must keep at least one text leaf,
/// so there is always a place for the caret to land. Elements that contain
/// block children are containers and are only walked through.
struct EnsureTextLeaf;

impl NormalizePass for EnsureTextLeaf {
    fn run(&self, doc: &Document) -> Vec<Op> {
        fn walk(children: &[Node], path: &mut Vec<usize>) -> Option<Vec<Op>> {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };
                path.push(ix);

                let is_container = el
                    .children
                    .iter()
                    .any(|n| matches!(n, Node::Element(child) if !child.kind.is_inline()));
                let has_text = el.children.iter().any(|n| matches!(n, Node::Text(_)));
                if !is_container && !has_text {
                    let mut insert_path = path.clone();
                    insert_path.push(0);
                    path.pop();
                    return Some(vec![Op::InsertNode {
                        path: insert_path,
                        node: Node::text(""),
                    }]);
                }

                if let Some(ops) = walk(&el.children, path) {
                    path.pop();
                    return Some(ops);
                }
                path.pop();
            }
            None
        }

        walk(&doc.children, &mut Vec::new()).unwrap_or_default()
    }
}

/// Adjacent sibling text leaves with identical marks merge into one leaf.
struct MergeAdjacentTextLeaves;

impl NormalizePass for MergeAdjacentTextLeaves {
    fn run(&self, doc: &Document) -> Vec<Op> {
        fn merge_run(children: &[Node], path: &[usize]) -> Option<Vec<Op>> {
            let mut start = 0usize;
            while start + 1 < children.len() {
                let (Node::Text(left), Node::Text(right)) =
                    (&children[start], &children[start + 1])
                else {
                    start += 1;
                    continue;
                };
                if left.marks != right.marks {
                    start += 1;
                    continue;
                }

                let mut end = start + 1;
                let mut appended = right.text.clone();
                while end + 1 < children.len() {
                    let Node::Text(next) = &children[end + 1] else {
                        break;
                    };
                    if next.marks != left.marks {
                        break;
                    }
                    end += 1;
                    appended.push_str(&next.text);
                }

                let mut ops: Vec<Op> = Vec::new();
                if !appended.is_empty() {
                    let mut insert_path = path.to_vec();
                    insert_path.push(start);
                    ops.push(Op::InsertText {
                        path: insert_path,
                        offset: left.text.len(),
                        text: appended,
                    });
                }
                for remove_ix in (start + 1..=end).rev() {
                    let mut remove_path = path.to_vec();
                    remove_path.push(remove_ix);
                    ops.push(Op::RemoveNode { path: remove_path });
                }
                return Some(ops);
            }
            None
        }

        fn walk(children: &[Node], path: &mut Vec<usize>) -> Option<Vec<Op>> {
            if let Some(ops) = merge_run(children, path) {
                return Some(ops);
            }
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };
                path.push(ix);
                if let Some(ops) = walk(&el.children, path) {
                    path.pop();
                    return Some(ops);
                }
                path.pop();
            }
            None
        }

        walk(&doc.children, &mut Vec::new()).unwrap_or_default()
    }
}
