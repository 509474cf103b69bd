use typeset_core::{
    is_block_active, toggle_block, toggle_code_block, BlockType, Document, Editor, ElementKind,
    Node, Point, Selection,
};

fn editor_with_blocks(texts: &[&str]) -> Editor {
    let doc = Document {
        children: texts.iter().map(|t| Node::paragraph(*t)).collect(),
    };
    Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 0))))
}

fn block_kind(editor: &Editor, row: usize) -> ElementKind {
    let Node::Element(block) = &editor.doc().children[row] else {
        panic!("expected element block");
    };
    block.kind.clone()
}

#[test]
fn heading_toggle_is_exclusive_and_cycles_back() {
    let mut editor = editor_with_blocks(&["hello"]);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });

    toggle_block(&mut editor, BlockType::Heading).unwrap();

    assert_eq!(block_kind(&editor, 0), ElementKind::Heading);
    assert!(is_block_active(&editor, BlockType::Heading));
    assert!(!is_block_active(&editor, BlockType::Paragraph));

    toggle_block(&mut editor, BlockType::Heading).unwrap();

    assert_eq!(block_kind(&editor, 0), ElementKind::Paragraph);
    assert!(!is_block_active(&editor, BlockType::Heading));
    assert!(is_block_active(&editor, BlockType::Paragraph));
}

#[test]
fn collapsed_toggle_inserts_instead_of_converting() {
    let mut editor = editor_with_blocks(&["hello"]);
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 0], 2)));

    toggle_block(&mut editor, BlockType::Quote).unwrap();

    // The block under the caret is untouched; a fresh empty quote follows it.
    assert_eq!(block_kind(&editor, 0), ElementKind::Paragraph);
    assert_eq!(block_kind(&editor, 1), ElementKind::Quote);
    let Node::Element(quote) = &editor.doc().children[1] else {
        panic!("expected quote element");
    };
    let Node::Text(t) = &quote.children[0] else {
        panic!("expected text leaf");
    };
    assert!(t.text.is_empty());

    let sel = editor.selection().expect("selection present");
    assert!(sel.is_collapsed());
    assert_eq!(sel.focus.path, vec![1, 0]);
}

#[test]
fn quote_overwrites_heading() {
    let mut editor = editor_with_blocks(&["title"]);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });

    toggle_block(&mut editor, BlockType::Heading).unwrap();
    toggle_block(&mut editor, BlockType::Quote).unwrap();

    assert_eq!(block_kind(&editor, 0), ElementKind::Quote);
    assert!(!is_block_active(&editor, BlockType::Heading));
}

#[test]
fn code_block_setter_is_unconditional() {
    let mut editor = editor_with_blocks(&["let x = 1;"]);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 10),
    });
    toggle_block(&mut editor, BlockType::Heading).unwrap();
    editor.set_selection(Selection::collapsed(Point::new(vec![0, 0], 0)));

    toggle_code_block(&mut editor).unwrap();
    assert_eq!(block_kind(&editor, 0), ElementKind::CodeBlock);

    // No active/inactive branch: a second invocation stays in code-block.
    toggle_code_block(&mut editor).unwrap();
    assert_eq!(block_kind(&editor, 0), ElementKind::CodeBlock);
    assert!(is_block_active(&editor, BlockType::CodeBlock));
}

#[test]
fn range_toggle_converts_every_block_it_covers() {
    let mut editor = editor_with_blocks(&["one", "two"]);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![1, 0], 3),
    });

    toggle_block(&mut editor, BlockType::Heading).unwrap();

    assert_eq!(block_kind(&editor, 0), ElementKind::Heading);
    assert_eq!(block_kind(&editor, 1), ElementKind::Heading);
}

#[test]
fn hanging_range_does_not_convert_the_touched_block() {
    let mut editor = editor_with_blocks(&["hello", "world"]);
    // The range ends at offset 0 of the second block: it only hangs into it.
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![1, 0], 0),
    });

    toggle_block(&mut editor, BlockType::Heading).unwrap();

    assert_eq!(block_kind(&editor, 0), ElementKind::Heading);
    assert_eq!(block_kind(&editor, 1), ElementKind::Paragraph);
}
