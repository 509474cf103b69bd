use serde::{Deserialize, Serialize};

use crate::core::Document;

const DEFAULT_SCHEMA: &str = "typeset";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// A versioned JSON wrapper for persisting documents. The node shapes stay
/// compatible with the editor's conventional serialized form: elements are
/// `{"type": ..., "children": [...]}`, text leaves `{"text": ...}` with
/// only the active mark flags present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypesetValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub document: Document,
}

impl TypesetValue {
    pub fn from_document(document: Document) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            document,
        }
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ElementKind, Marks, Node, TextNode};

    #[test]
    fn round_trip_preserves_document() {
        let document = Document {
            children: vec![
                Node::paragraph("Hello"),
                Node::element(
                    ElementKind::CodeBlock,
                    vec![Node::Text(TextNode {
                        text: "let x = 1;".into(),
                        marks: Marks::default(),
                    })],
                ),
            ],
        };
        let value = TypesetValue::from_document(document.clone());
        let json = value.to_json_pretty().expect("serialize");
        let parsed = TypesetValue::from_json_str(&json).expect("deserialize");
        assert_eq!(parsed.into_document(), document);
    }

    #[test]
    fn elements_serialize_with_kebab_case_tags() {
        let value = TypesetValue::from_document(Document {
            children: vec![Node::element(ElementKind::CodeBlock, vec![Node::text("")])],
        });
        let json = serde_json::to_string(&value).expect("serialize");
        assert!(json.contains(r#""type":"code-block""#));
    }

    #[test]
    fn inactive_marks_are_omitted() {
        let value = TypesetValue::from_document(Document {
            children: vec![Node::paragraph("plain")],
        });
        let json = serde_json::to_string(&value).expect("serialize");
        assert!(!json.contains("bold"));
        assert!(!json.contains("strikethrough"));
    }

    #[test]
    fn link_keeps_its_url_attribute() {
        let doc = Document {
            children: vec![Node::element(
                ElementKind::Paragraph,
                vec![Node::element(
                    ElementKind::Link {
                        url: "https://example.com".into(),
                    },
                    vec![Node::text("example")],
                )],
            )],
        };
        let json = serde_json::to_string(&TypesetValue::from_document(doc.clone())).expect("serialize");
        assert!(json.contains(r#""url":"https://example.com""#));
        let parsed = TypesetValue::from_json_str(&json).expect("deserialize");
        assert_eq!(parsed.into_document(), doc);
    }
}
