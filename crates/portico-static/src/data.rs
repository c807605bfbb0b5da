//! JSON data loading.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::BuildError;

/// A JSON object as loaded from a data file.
pub type DataMap = Map<String, Value>;

/// Load a JSON object from `path`.
///
/// A missing file is not an error: a warning is logged and an empty map is
/// returned. A file that exists but is not a valid JSON object is fatal.
pub fn load_data(path: &Path) -> Result<DataMap, BuildError> {
    if !path.exists() {
        tracing::warn!("Data file not found: {}", path.display());
        return Ok(DataMap::new());
    }

    let content = fs::read_to_string(path).map_err(|e| BuildError::read(path, e))?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => {
            tracing::debug!("Loaded {} keys from {}", map.len(), path.display());
            Ok(map)
        }
        Ok(other) => Err(BuildError::Parse {
            path: path.to_path_buf(),
            message: format!("expected a JSON object, found {}", kind_of(&other)),
        }),
        Err(e) => Err(BuildError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn loads_json_object() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.json");
        fs::write(&path, r#"{"title": "Portfolio", "links": {"github": "gh"}}"#).unwrap();

        let data = load_data(&path).unwrap();

        assert_eq!(data["title"], Value::from("Portfolio"));
        assert_eq!(data["links"]["github"], Value::from("gh"));
    }

    #[test]
    fn missing_file_yields_empty_map() {
        let temp = tempdir().unwrap();

        let data = load_data(&temp.path().join("nope.json")).unwrap();

        assert!(data.is_empty());
    }

    #[test]
    fn malformed_json_is_fatal() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("timeline.json");
        fs::write(&path, "{ not json").unwrap();

        let result = load_data(&path);

        assert!(matches!(result, Err(BuildError::Parse { .. })));
    }

    #[test]
    fn rejects_non_object_document() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("timeline.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = load_data(&path).unwrap_err();

        assert!(err.to_string().contains("expected a JSON object, found an array"));
    }
}
