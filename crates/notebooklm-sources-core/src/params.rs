//! Positional RPC parameter layouts.
//!
//! The service identifies fields by position, not name, and the nesting
//! depth around the payload differs per source kind:
//!
//! | Builder | Payload slot |
//! |---------|--------------|
//! | [`build_file_registration_params`] | `[[filename]]` |
//! | [`build_url_add_params`] | `[[[null, null, [url], null ×7, 1]]]` |
//! | [`build_video_add_params`] | `[[[null ×7, [url], null, null, 1]]]` |
//!
//! These shapes are protocol facts. Each builder is pinned by a test
//! against a literal; change them only alongside a captured browser request.

use serde_json::{json, Value};

/// Source-type marker that follows the notebook id in add requests.
fn source_type_marker() -> Value {
    json!([2])
}

/// Trailing client-options block shared by every add request.
fn add_options() -> Value {
    json!([1, null, null, null, null, null, null, null, null, null, [1]])
}

/// Notebook path the RPC boundary attaches to each call.
pub fn notebook_source_path(notebook_id: &str) -> String {
    format!("/notebook/{notebook_id}")
}

/// Parameters announcing a file upload. The filename is wrapped twice, not
/// three times like URL payloads.
pub fn build_file_registration_params(notebook_id: &str, filename: &str) -> Vec<Value> {
    vec![
        json!([[filename]]),
        json!(notebook_id),
        source_type_marker(),
        add_options(),
    ]
}

/// Parameters adding a generic web page. The URL sits in slot 2 of an
/// eleven-element source record.
pub fn build_url_add_params(notebook_id: &str, url: &str) -> Vec<Value> {
    vec![
        json!([[null, null, [url], null, null, null, null, null, null, null, 1]]),
        json!(notebook_id),
        source_type_marker(),
        add_options(),
    ]
}

/// Parameters adding a video reference. Same record as a web page but the
/// URL sits in slot 7.
pub fn build_video_add_params(notebook_id: &str, url: &str) -> Vec<Value> {
    vec![
        json!([[null, null, null, null, null, null, null, [url], null, null, 1]]),
        json!(notebook_id),
        source_type_marker(),
        add_options(),
    ]
}

pub fn build_list_params(notebook_id: &str) -> Vec<Value> {
    vec![json!(notebook_id)]
}

pub fn build_delete_params(notebook_id: &str, source_id: &str) -> Vec<Value> {
    vec![json!(notebook_id), json!(source_id)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_json(params: Vec<Value>) -> Value {
        Value::Array(params)
    }

    #[test]
    fn test_file_registration_layout() {
        let expected: Value = serde_json::from_str(
            r#"[[["report.pdf"]],"nb-1",[2],[1,null,null,null,null,null,null,null,null,null,[1]]]"#,
        )
        .unwrap();
        assert_eq!(as_json(build_file_registration_params("nb-1", "report.pdf")), expected);
    }

    #[test]
    fn test_url_add_layout() {
        let expected: Value = serde_json::from_str(
            r#"[[[null,null,["https://example.com/a"],null,null,null,null,null,null,null,1]],"nb-1",[2],[1,null,null,null,null,null,null,null,null,null,[1]]]"#,
        )
        .unwrap();
        assert_eq!(as_json(build_url_add_params("nb-1", "https://example.com/a")), expected);
    }

    #[test]
    fn test_video_add_layout() {
        let expected: Value = serde_json::from_str(
            r#"[[[null,null,null,null,null,null,null,["https://youtu.be/abc123"],null,null,1]],"nb-1",[2],[1,null,null,null,null,null,null,null,null,null,[1]]]"#,
        )
        .unwrap();
        assert_eq!(as_json(build_video_add_params("nb-1", "https://youtu.be/abc123")), expected);
    }

    #[test]
    fn test_payload_depth_differs_per_kind() {
        assert_eq!(build_file_registration_params("n", "f")[0][0][0], json!("f"));
        assert_eq!(build_url_add_params("n", "u")[0][0][2][0], json!("u"));
        assert_eq!(build_video_add_params("n", "u")[0][0][7][0], json!("u"));
    }

    #[test]
    fn test_list_and_delete_layouts() {
        assert_eq!(as_json(build_list_params("nb-1")), json!(["nb-1"]));
        assert_eq!(as_json(build_delete_params("nb-1", "src-9")), json!(["nb-1", "src-9"]));
    }

    #[test]
    fn test_source_path() {
        assert_eq!(notebook_source_path("nb-1"), "/notebook/nb-1");
    }
}
