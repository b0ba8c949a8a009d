use serde::{Deserialize, Serialize};

/// One node of a Contentful rich-text document. The document itself is a
/// node with `nodeType = "document"`; text leaves carry `value` and `marks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextNode {
    pub node_type: String,
    #[serde(default)]
    pub content: Vec<RichTextNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
}

impl RichTextNode {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.value.as_deref().map_or(true, str::is_empty)
    }

    /// Look up a string inside `data` by a path of object keys.
    pub fn data_str(&self, path: &[&str]) -> Option<&str> {
        path.iter()
            .try_fold(&self.data, |value, key| value.get(key))
            .and_then(|v| v.as_str())
    }
}
