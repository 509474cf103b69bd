use typeset_core::{
    active_marks, is_mark_active, toggle_mark, Document, Editor, ElementKind, Mark, Marks, Node,
    Point, Selection, TextNode,
};

fn editor_with_text(text: &str) -> Editor {
    let doc = Document {
        children: vec![Node::paragraph(text)],
    };
    Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 0))))
}

fn bold_text(text: &str) -> Node {
    Node::Text(TextNode {
        text: text.to_string(),
        marks: Marks {
            bold: true,
            ..Marks::default()
        },
    })
}

#[test]
fn caret_toggle_is_idempotent() {
    let mut editor = editor_with_text("abc");
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 0], 1)));

    assert!(!is_mark_active(&editor, Mark::Bold));

    toggle_mark(&mut editor, Mark::Bold).unwrap();
    assert!(is_mark_active(&editor, Mark::Bold));

    toggle_mark(&mut editor, Mark::Bold).unwrap();
    assert!(!is_mark_active(&editor, Mark::Bold));

    // The split leaves merge back into a single plain run.
    let Node::Element(paragraph) = &editor.doc().children[0] else {
        panic!("expected paragraph element");
    };
    assert_eq!(paragraph.children.len(), 1);
    let Node::Text(t) = &paragraph.children[0] else {
        panic!("expected text leaf");
    };
    assert_eq!(t.text, "abc");
    assert!(!t.marks.bold);
}

#[test]
fn roman_absorbs_bold_and_italic_at_caret() {
    let doc = Document {
        children: vec![Node::element(ElementKind::Paragraph, vec![bold_text("abc")])],
    };
    let mut editor = Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 1))));

    assert!(is_mark_active(&editor, Mark::Bold));
    assert!(!is_mark_active(&editor, Mark::Roman));

    toggle_mark(&mut editor, Mark::Roman).unwrap();

    let marks = active_marks(&editor).expect("selection present");
    assert!(!marks.bold);
    assert!(!marks.italic);
    assert!(marks.contains(Mark::Roman));
}

#[test]
fn roman_is_absorbing_not_a_toggle() {
    let mut editor = editor_with_text("abc");
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 0], 1)));

    toggle_mark(&mut editor, Mark::Roman).unwrap();
    assert!(is_mark_active(&editor, Mark::Roman));

    // Toggling roman again keeps the plain state.
    toggle_mark(&mut editor, Mark::Roman).unwrap();
    assert!(is_mark_active(&editor, Mark::Roman));
    assert!(!is_mark_active(&editor, Mark::Bold));
    assert!(!is_mark_active(&editor, Mark::Italic));
}

#[test]
fn underline_composes_with_the_style_axis() {
    let mut editor = editor_with_text("abc");
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 0], 1)));

    toggle_mark(&mut editor, Mark::Bold).unwrap();
    toggle_mark(&mut editor, Mark::Underline).unwrap();
    assert!(is_mark_active(&editor, Mark::Bold));
    assert!(is_mark_active(&editor, Mark::Underline));

    toggle_mark(&mut editor, Mark::Roman).unwrap();
    assert!(!is_mark_active(&editor, Mark::Bold));
    assert!(is_mark_active(&editor, Mark::Underline));
}

#[test]
fn queries_answer_false_without_a_selection() {
    let mut editor = editor_with_text("abc");
    editor.clear_selection();

    assert!(active_marks(&editor).is_none());
    assert!(!is_mark_active(&editor, Mark::Bold));
    assert!(!is_mark_active(&editor, Mark::Roman));
}
