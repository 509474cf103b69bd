use typeset_core::{
    is_inline_active, toggle_link, wrap_link, Document, Editor, ElementKind, InlineType, Node,
    Point, Selection,
};

fn editor_with_text(text: &str) -> Editor {
    let doc = Document {
        children: vec![Node::paragraph(text)],
    };
    Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 0))))
}

fn paragraph_children(editor: &Editor, row: usize) -> &[Node] {
    let Node::Element(block) = &editor.doc().children[row] else {
        panic!("expected element block");
    };
    &block.children
}

fn links_in(editor: &Editor) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (node, _) in typeset_core::node_entries(editor.doc()) {
        let Node::Element(el) = node else { continue };
        if let ElementKind::Link { url } = &el.kind {
            let mut label = String::new();
            for child in &el.children {
                if let Node::Text(t) = child {
                    label.push_str(&t.text);
                }
            }
            out.push((url.clone(), label));
        }
    }
    out
}

#[test]
fn link_round_trip_leaves_text_unchanged() {
    let mut editor = editor_with_text("hello");
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });

    toggle_link(&mut editor, Some("http://x")).unwrap();

    assert!(is_inline_active(&editor, InlineType::Link));
    assert_eq!(
        links_in(&editor),
        vec![("http://x".to_string(), "hello".to_string())]
    );

    // The selection collapsed to the end of the wrapped content, so the
    // second toggle sees the link as active and removes it. No URL needed.
    toggle_link(&mut editor, None).unwrap();

    assert!(!is_inline_active(&editor, InlineType::Link));
    assert!(links_in(&editor).is_empty());
    let children = paragraph_children(&editor, 0);
    assert_eq!(children.len(), 1);
    let Node::Text(t) = &children[0] else {
        panic!("expected text leaf");
    };
    assert_eq!(t.text, "hello");
}

#[test]
fn link_at_empty_cursor_is_labeled_with_its_url() {
    let mut editor = Editor::default();

    wrap_link(&mut editor, "http://x").unwrap();

    assert_eq!(
        links_in(&editor),
        vec![("http://x".to_string(), "http://x".to_string())]
    );
    // Caret sits at the end of the inserted label.
    let sel = editor.selection().expect("selection present");
    assert!(sel.is_collapsed());
    assert_eq!(sel.focus.offset, "http://x".len());
}

#[test]
fn partial_selection_wraps_exactly_the_selected_span() {
    let mut editor = editor_with_text("hello world");
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 6),
        focus: Point::new(vec![0, 0], 11),
    });

    toggle_link(&mut editor, Some("http://x")).unwrap();

    let children = paragraph_children(&editor, 0);
    let Node::Text(before) = &children[0] else {
        panic!("expected leading text");
    };
    assert_eq!(before.text, "hello ");
    assert_eq!(
        links_in(&editor),
        vec![("http://x".to_string(), "world".to_string())]
    );
}

#[test]
fn cancelled_prompt_is_a_noop() {
    let mut editor = editor_with_text("hello");
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });
    let before = editor.doc().clone();

    toggle_link(&mut editor, None).unwrap();
    assert_eq!(editor.doc(), &before);

    toggle_link(&mut editor, Some("")).unwrap();
    assert_eq!(editor.doc(), &before);
}

#[test]
fn wrapping_over_an_active_link_replaces_it() {
    let mut editor = editor_with_text("hello");
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });
    toggle_link(&mut editor, Some("http://a")).unwrap();
    assert_eq!(links_in(&editor).len(), 1);

    // Links never nest: the old link is unwrapped before the new one lands.
    wrap_link(&mut editor, "http://b").unwrap();

    let links = links_in(&editor);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].0, "http://b");
}
