use typeset_core::{
    delete_selection, insert_text, Document, Editor, Node, Point, Selection,
};

fn editor_with_blocks(texts: &[&str]) -> Editor {
    let doc = Document {
        children: texts.iter().map(|t| Node::paragraph(*t)).collect(),
    };
    Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 0))))
}

#[test]
fn typing_inserts_at_the_caret() {
    let mut editor = editor_with_blocks(&["held"]);
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 0], 2)));

    insert_text(&mut editor, "llo wor").unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("hello world")]);
    assert_eq!(editor.selection().unwrap().focus.offset, 9);
}

#[test]
fn delete_within_one_leaf() {
    let mut editor = editor_with_blocks(&["hello"]);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 1),
        focus: Point::new(vec![0, 0], 3),
    });

    delete_selection(&mut editor).unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("hlo")]);
    let sel = editor.selection().unwrap();
    assert!(sel.is_collapsed());
    assert_eq!(sel.focus.offset, 1);
}

#[test]
fn delete_across_sibling_blocks_merges_them() {
    let mut editor = editor_with_blocks(&["hello", "world"]);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 2),
        focus: Point::new(vec![1, 0], 3),
    });

    delete_selection(&mut editor).unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("held")]);
    let sel = editor.selection().unwrap();
    assert!(sel.is_collapsed());
    assert_eq!(sel.focus.path, vec![0, 0]);
    assert_eq!(sel.focus.offset, 2);
}

#[test]
fn typing_over_a_selection_replaces_it() {
    let mut editor = editor_with_blocks(&["hello"]);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });

    insert_text(&mut editor, "x").unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("x")]);
}
