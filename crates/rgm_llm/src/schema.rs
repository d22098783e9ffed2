//! The file-batch response schema and its parser.
//!
//! Structured generations must return `{"files": [{"path", "sourcecode"}]}`.
//! The raw text is checked against the JSON Schema before it is
//! deserialized, so a mismatch names the offending field.

use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use rgm_core::FileBatch;

use crate::error::{LlmError, LlmResult};

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub sourcecode: String,
}

/// Structured response of the coder and refactorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesResponse {
    pub files: Vec<GeneratedFile>,
}

impl FilesResponse {
    /// Collapse into a path-keyed batch; later entries for a path win.
    pub fn into_batch(self) -> FileBatch {
        self.files
            .into_iter()
            .map(|file| (file.path, file.sourcecode))
            .collect()
    }
}

/// JSON Schema for [`FilesResponse`].
pub fn files_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "files": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": { "type": "string" },
                        "sourcecode": { "type": "string" }
                    },
                    "required": ["path", "sourcecode"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["files"],
        "additionalProperties": false
    })
}

/// Parse and validate a structured response.
pub fn parse_files_response(text: &str) -> LlmResult<FilesResponse> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| LlmError::InvalidResponse(format!("not valid JSON: {}", e)))?;

    let schema = files_schema();
    let compiled = JSONSchema::compile(&schema)
        .map_err(|e| LlmError::SchemaMismatch(format!("schema does not compile: {}", e)))?;
    if let Err(errors) = compiled.validate(&value) {
        let details: Vec<String> = errors
            .map(|e| format!("{} at '{}'", e, e.instance_path))
            .collect();
        return Err(LlmError::SchemaMismatch(details.join("; ")));
    }

    let response: FilesResponse = serde_json::from_value(value)
        .map_err(|e| LlmError::SchemaMismatch(e.to_string()))?;
    debug!(files = response.files.len(), "Parsed structured response");
    Ok(response)
}

/// Parse a structured response straight into a file batch.
pub fn parse_file_batch(text: &str) -> LlmResult<FileBatch> {
    parse_files_response(text).map(FilesResponse::into_batch)
}

/// Convert a JSON Schema into the OpenAPI subset Gemini accepts.
///
/// Type names are upper-cased and `additionalProperties` is dropped.
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, value) in map {
                match key.as_str() {
                    "additionalProperties" | "$schema" => {}
                    "type" => {
                        let upper = value
                            .as_str()
                            .map(|t| Value::String(t.to_ascii_uppercase()))
                            .unwrap_or_else(|| value.clone());
                        out.insert(key.clone(), upper);
                    }
                    _ => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_response() {
        let batch = parse_file_batch(
            r#"{"files": [{"path": "src/calc.py", "sourcecode": "def add(a, b):\n    return a + b\n"}]}"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch["src/calc.py"].contains("return a + b"));
    }

    #[test]
    fn test_duplicate_paths_last_wins() {
        let batch = parse_file_batch(
            r#"{"files": [{"path": "a.py", "sourcecode": "1"}, {"path": "a.py", "sourcecode": "2"}]}"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch["a.py"], "2");
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = parse_file_batch(r#"{"files": [{"path": "a.py""#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let err = parse_file_batch(r#"{"files": [{"path": "a.py"}]}"#).unwrap_err();
        assert!(matches!(err, LlmError::SchemaMismatch(_)));

        let err = parse_file_batch(r#"{"documents": []}"#).unwrap_err();
        assert!(matches!(err, LlmError::SchemaMismatch(_)));
    }

    #[test]
    fn test_empty_files_is_valid() {
        assert!(parse_file_batch(r#"{"files": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_gemini_schema_conversion() {
        let converted = to_gemini_schema(&files_schema());
        assert_eq!(converted["type"], "OBJECT");
        assert_eq!(converted["properties"]["files"]["type"], "ARRAY");
        assert_eq!(
            converted["properties"]["files"]["items"]["properties"]["path"]["type"],
            "STRING"
        );
        assert!(converted.get("additionalProperties").is_none());
        assert!(converted["properties"]["files"]["items"]
            .get("additionalProperties")
            .is_none());
    }
}
