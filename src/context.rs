use serde::Serialize;
use serde_json::{Map, Value};

use crate::markup::{AttributeNode, ElementNode, SourcePosition};

/// Per-file facts shared by every element in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Root-relative path with forward slashes.
    pub relative_path: String,
    pub file_name: String,
}

/// Read-only view of one element handed to the classifier, the attribute
/// pipeline and user hooks. Lives only while its element is being tagged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementContext {
    pub element_name: String,
    pub file_path: String,
    /// 1-based, never zero.
    pub line: u32,
    /// 0-based.
    pub column: u32,
    pub file_name: String,
    /// 1 for the outermost element of a file.
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ElementContext {
    pub fn new(
        element: &ElementNode,
        file: &FileInfo,
        depth: usize,
        capture_props: bool,
        capture_content: bool,
    ) -> Self {
        let position = element.location.unwrap_or_default();
        let position = SourcePosition {
            line: position.line.max(1),
            column: position.column,
        };

        ElementContext {
            element_name: element.name.to_string(),
            file_path: file.relative_path.clone(),
            line: position.line,
            column: position.column,
            file_name: file.file_name.clone(),
            depth,
            props: if capture_props {
                literal_props(element)
            } else {
                None
            },
            content: if capture_content {
                element.flattened_text()
            } else {
                None
            },
        }
    }
}

fn literal_props(element: &ElementNode) -> Option<Map<String, Value>> {
    let props: Map<String, Value> = element
        .attributes
        .iter()
        .filter_map(|attr| match attr {
            AttributeNode::Literal { name, value } => Some((name.clone(), value.to_json())),
            _ => None,
        })
        .collect();

    if props.is_empty() {
        None
    } else {
        Some(props)
    }
}
