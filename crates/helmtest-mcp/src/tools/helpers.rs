// Helmtest - Helm chart unit testing for AI assistants
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Helper functions shared across MCP tools.

use crate::error::{McpError, McpResult};
use crate::protocol::{CallToolResult, Content};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Component, Path, PathBuf};

/// Parse JSON arguments into a typed structure.
pub fn parse_args<T: for<'de> Deserialize<'de>>(args: Option<JsonValue>) -> McpResult<T> {
    let args = args.unwrap_or(JsonValue::Object(serde_json::Map::new()));
    serde_json::from_value(args).map_err(|e| McpError::InvalidArguments(e.to_string()))
}

/// Canonical form of the server root, or the root as given if it cannot be resolved.
pub fn canonical_root(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
}

/// Resolve an existing path relative to root and ensure it doesn't escape the root directory.
///
/// Symlinks are resolved before the containment check.
pub fn resolve_safe_path(root: &Path, path: &str) -> McpResult<PathBuf> {
    let requested = Path::new(path);

    let resolved = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };

    let canonical = resolved
        .canonicalize()
        .map_err(|_| McpError::NotFound(requested.display().to_string()))?;

    if !canonical.starts_with(canonical_root(root)) {
        return Err(McpError::PathTraversal(requested.display().to_string()));
    }

    Ok(canonical)
}

/// Resolve a path that may not exist yet, such as a report file to be written.
///
/// The parent directory must exist and lie under root.
pub fn resolve_output_path(root: &Path, path: &str) -> McpResult<PathBuf> {
    let requested = Path::new(path);

    let file_name = match requested.components().next_back() {
        Some(Component::Normal(name)) => name.to_os_string(),
        _ => {
            return Err(McpError::InvalidArguments(format!(
                "output path must name a file: {}",
                requested.display()
            )))
        }
    };

    let parent = match requested.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    };
    let parent = resolve_safe_path(root, &parent)?;
    if !parent.is_dir() {
        return Err(McpError::NotFound(requested.display().to_string()));
    }

    let target = parent.join(file_name);
    if target.is_dir() {
        return Err(McpError::InvalidArguments(format!(
            "output path is a directory: {}",
            requested.display()
        )));
    }
    Ok(target)
}

/// Render a resolved path relative to root, with `/` separators.
pub fn display_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(canonical_root(root)) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

/// Build a successful tool result carrying `value` as text and as structured content.
pub fn json_result(value: JsonValue) -> McpResult<CallToolResult> {
    let text = serde_json::to_string_pretty(&value)?;
    Ok(CallToolResult {
        content: vec![Content::Text { text }],
        structured_content: Some(value),
        is_error: None,
    })
}

/// Build an `isError` tool result from a failed tool call.
pub fn error_result(error: &McpError) -> CallToolResult {
    CallToolResult {
        content: vec![Content::Text {
            text: format!("Error: {}", error),
        }],
        structured_content: None,
        is_error: Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize)]
    struct Args {
        name: String,
        #[serde(default)]
        count: Option<u32>,
    }

    #[test]
    fn test_parse_args() {
        let args: Args = parse_args(Some(json!({"name": "a", "count": 2}))).unwrap();
        assert_eq!(args.name, "a");
        assert_eq!(args.count, Some(2));
    }

    #[test]
    fn test_parse_args_missing_required() {
        let err = parse_args::<Args>(None).unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(ref m) if m.contains("name")));
    }

    #[test]
    fn test_resolve_safe_path_relative() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("test.yaml"), "suite: a").unwrap();

        let resolved = resolve_safe_path(temp_dir.path(), "test.yaml").unwrap();
        assert!(resolved.ends_with("test.yaml"));
    }

    #[test]
    fn test_resolve_safe_path_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let inner = temp_dir.path().join("root");
        fs::create_dir(&inner).unwrap();
        fs::write(temp_dir.path().join("outside.yaml"), "suite: a").unwrap();

        let err = resolve_safe_path(&inner, "../outside.yaml").unwrap_err();
        assert!(matches!(err, McpError::PathTraversal(_)));
    }

    #[test]
    fn test_resolve_safe_path_absolute_outside_root() {
        let root = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let outside = other.path().join("x.yaml");
        fs::write(&outside, "suite: a").unwrap();

        let err = resolve_safe_path(root.path(), outside.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, McpError::PathTraversal(_)));
    }

    #[test]
    fn test_resolve_safe_path_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let err = resolve_safe_path(temp_dir.path(), "nonexistent.yaml").unwrap_err();
        assert!(matches!(err, McpError::NotFound(_)));
    }

    #[test]
    fn test_resolve_output_path() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("reports")).unwrap();

        let target = resolve_output_path(temp_dir.path(), "reports/out.xml").unwrap();
        assert!(target.ends_with("reports/out.xml"));

        let bare = resolve_output_path(temp_dir.path(), "out.xml").unwrap();
        assert_eq!(bare.parent().unwrap(), temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_output_path_rejects_escape() {
        let temp_dir = TempDir::new().unwrap();
        let inner = temp_dir.path().join("root");
        fs::create_dir(&inner).unwrap();

        let err = resolve_output_path(&inner, "../out.xml").unwrap_err();
        assert!(matches!(err, McpError::PathTraversal(_)));

        let err = resolve_output_path(&inner, "missing/out.xml").unwrap_err();
        assert!(matches!(err, McpError::NotFound(_)));

        let err = resolve_output_path(&inner, "..").unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(_)));
    }

    #[test]
    fn test_display_path() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("charts").join("app");
        fs::create_dir_all(&nested).unwrap();
        let canonical = nested.canonicalize().unwrap();

        assert_eq!(display_path(temp_dir.path(), &canonical), "charts/app");
        assert_eq!(
            display_path(temp_dir.path(), &temp_dir.path().canonicalize().unwrap()),
            "."
        );
    }

    #[test]
    fn test_json_result_carries_structured_content() {
        let result = json_result(json!({"valid": true})).unwrap();
        assert_eq!(result.structured_content, Some(json!({"valid": true})));
        assert!(result.is_error.is_none());
        let Content::Text { text } = &result.content[0];
        assert!(text.contains("\"valid\": true"));
    }

    #[test]
    fn test_error_result() {
        let result = error_result(&McpError::NotFound("charts/x".into()));
        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_none());
        let Content::Text { text } = &result.content[0];
        assert_eq!(text, "Error: Not found: charts/x");
    }
}
