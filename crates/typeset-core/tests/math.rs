use typeset_core::{
    insert_text, is_inline_active, toggle_math, Document, Editor, ElementKind, InlineType, Node,
    Point, Selection,
};

fn editor_with_text(text: &str) -> Editor {
    let doc = Document {
        children: vec![Node::paragraph(text)],
    };
    Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 0))))
}

fn math_elements(editor: &Editor) -> Vec<(bool, String)> {
    let mut out = Vec::new();
    for (node, _) in typeset_core::node_entries(editor.doc()) {
        let Node::Element(el) = node else { continue };
        if let ElementKind::Math { inline } = &el.kind {
            let mut text = String::new();
            for child in &el.children {
                if let Node::Text(t) = child {
                    text.push_str(&t.text);
                }
            }
            out.push((*inline, text));
        }
    }
    out
}

#[test]
fn inline_math_inserts_placeholder_with_caret_between_delimiters() {
    let mut editor = Editor::default();

    toggle_math(&mut editor, true).unwrap();

    assert_eq!(math_elements(&editor), vec![(true, "$$".to_string())]);
    assert!(is_inline_active(&editor, InlineType::Math));

    // The cursor sits one offset unit back from the end: between the "$"
    // delimiters, ready for a formula.
    let sel = editor.selection().expect("selection present");
    assert!(sel.is_collapsed());
    assert_eq!(sel.focus.offset, 1);

    insert_text(&mut editor, "x").unwrap();
    assert_eq!(math_elements(&editor), vec![(true, "$x$".to_string())]);
}

#[test]
fn block_math_starts_empty() {
    let mut editor = editor_with_text("before");
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 0], 6)));

    toggle_math(&mut editor, false).unwrap();

    assert_eq!(math_elements(&editor), vec![(false, String::new())]);
    let Node::Element(block) = &editor.doc().children[1] else {
        panic!("expected math element after the paragraph");
    };
    assert_eq!(block.kind, ElementKind::Math { inline: false });
    let sel = editor.selection().expect("selection present");
    assert_eq!(sel.focus.path, vec![1, 0]);
    assert_eq!(sel.focus.offset, 0);
}

#[test]
fn non_collapsed_math_is_a_noop() {
    let mut editor = editor_with_text("hello");
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });
    let doc_before = editor.doc().clone();
    let selection_before = editor.selection().cloned();

    toggle_math(&mut editor, true).unwrap();

    assert_eq!(editor.doc(), &doc_before);
    assert_eq!(editor.selection().cloned(), selection_before);
    assert!(math_elements(&editor).is_empty());
}

#[test]
fn toggling_active_math_unwraps_it() {
    let mut editor = Editor::default();
    toggle_math(&mut editor, true).unwrap();
    assert!(is_inline_active(&editor, InlineType::Math));

    toggle_math(&mut editor, true).unwrap();

    assert!(!is_inline_active(&editor, InlineType::Math));
    assert!(math_elements(&editor).is_empty());
    let Node::Element(paragraph) = &editor.doc().children[0] else {
        panic!("expected paragraph element");
    };
    assert_eq!(paragraph.children.len(), 1);
    let Node::Text(t) = &paragraph.children[0] else {
        panic!("expected text leaf");
    };
    assert_eq!(t.text, "$$");
}
