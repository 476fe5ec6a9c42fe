use serde_json::{json, Value};

/// Build a minimal Atlassian Document Format (ADF) doc, one paragraph per line.
///
/// Blank lines become empty paragraphs so spacing survives in Jira.
pub fn adf_doc(text: &str) -> Value {
    let mut paragraphs: Vec<Value> = text
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                json!({"type": "paragraph", "content": []})
            } else {
                json!({
                    "type": "paragraph",
                    "content": [{"type": "text", "text": line}],
                })
            }
        })
        .collect();

    if paragraphs.is_empty() {
        paragraphs.push(json!({"type": "paragraph", "content": []}));
    }

    json!({"type": "doc", "version": 1, "content": paragraphs})
}
