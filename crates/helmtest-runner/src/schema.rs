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
//! Schema validation of test-suite files.
//!
//! The helm-unittest suite schema (draft-07) is compiled into the crate and
//! initialised on first use. Callers may load a different document with
//! [`TestSuiteSchema::from_path`] and share it behind an `Arc`.
//!
//! Every violation the validator reports is kept, in order, with two
//! locations: the validator's own JSON pointer and a `$`-rooted dotted path
//! (`$.tests[0].asserts`). For missing required properties the dotted path
//! names the property itself (`$.suite`).

use crate::discovery::TestDiscovery;
use crate::error::{RunnerError, RunnerResult};
use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

const BUNDLED_SCHEMA: &str = include_str!("../schema/helm-testsuite.json");

static BUNDLED: OnceLock<Result<TestSuiteSchema, String>> = OnceLock::new();

/// One schema violation or YAML syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaError {
    /// JSON pointer reported by the validator; empty for YAML syntax errors.
    pub pointer: String,
    /// `$`-rooted dotted path.
    pub path: String,
    /// 1-based line of a YAML syntax error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column of a YAML syntax error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub message: String,
}

/// Outcome of validating one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub file_path: PathBuf,
    pub valid: bool,
    pub message: String,
    pub errors: Vec<SchemaError>,
}

impl ValidationResult {
    fn from_errors(file_path: &Path, errors: Vec<SchemaError>) -> Self {
        let valid = errors.is_empty();
        let message = if valid {
            format!("Validation successful for {}", file_path.display())
        } else {
            format!(
                "Schema validation failed for {} ({} error{})",
                file_path.display(),
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            )
        };
        Self {
            file_path: file_path.to_path_buf(),
            valid,
            message,
            errors,
        }
    }

    fn yaml_failure(file_path: &Path, error: &serde_yaml::Error) -> Self {
        let location = error.location();
        Self {
            file_path: file_path.to_path_buf(),
            valid: false,
            message: format!("Invalid YAML syntax in {}", file_path.display()),
            errors: vec![SchemaError {
                pointer: String::new(),
                path: "$".to_string(),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
                message: error.to_string(),
            }],
        }
    }

    fn unreadable(file_path: &Path, error: &RunnerError) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            valid: false,
            message: format!("Could not validate {}", file_path.display()),
            errors: vec![SchemaError {
                pointer: String::new(),
                path: "$".to_string(),
                line: None,
                column: None,
                message: error.to_string(),
            }],
        }
    }
}

/// A compiled test-suite schema.
pub struct TestSuiteSchema {
    document: JsonValue,
    validator: Validator,
    origin: String,
}

impl fmt::Debug for TestSuiteSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSuiteSchema")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl TestSuiteSchema {
    /// The schema shipped with the crate, compiled once per process.
    pub fn bundled() -> RunnerResult<&'static TestSuiteSchema> {
        BUNDLED
            .get_or_init(|| {
                serde_json::from_str(BUNDLED_SCHEMA)
                    .map_err(|e| e.to_string())
                    .and_then(|document| {
                        Self::from_value(document, "bundled").map_err(|e| e.to_string())
                    })
            })
            .as_ref()
            .map_err(|e| RunnerError::Schema(e.clone()))
    }

    /// Load and compile a schema document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> RunnerResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RunnerError::NotFound(path.to_path_buf()),
            _ => RunnerError::Io(e),
        })?;
        let document: JsonValue = serde_json::from_str(&text)
            .map_err(|e| RunnerError::Schema(format!("{}: {}", path.display(), e)))?;
        Self::from_value(document, &path.display().to_string())
    }

    /// Compile a schema document. The draft is taken from `$schema`.
    pub fn from_value(document: JsonValue, origin: &str) -> RunnerResult<Self> {
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| RunnerError::Schema(format!("{}: {}", origin, e)))?;
        Ok(Self {
            document,
            validator,
            origin: origin.to_string(),
        })
    }

    /// The raw schema document.
    pub fn document(&self) -> &JsonValue {
        &self.document
    }

    /// Where the document came from (`bundled` or a file path).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn validate_value(&self, instance: &JsonValue) -> Vec<SchemaError> {
        self.validator
            .iter_errors(instance)
            .map(|error| {
                let pointer = error.instance_path.to_string();
                let required = match &error.kind {
                    ValidationErrorKind::Required { property } => property.as_str().map(str::to_string),
                    _ => None,
                };
                SchemaError {
                    path: dotted_path(&pointer, required.as_deref()),
                    pointer,
                    line: None,
                    column: None,
                    message: error.to_string(),
                }
            })
            .collect()
    }

    /// Validate YAML text. Syntax errors become a failed result.
    pub fn validate_str(&self, text: &str, file_path: &Path) -> ValidationResult {
        let instance: JsonValue = match serde_yaml::from_str(text) {
            Ok(instance) => instance,
            Err(e) => return ValidationResult::yaml_failure(file_path, &e),
        };
        ValidationResult::from_errors(file_path, self.validate_value(&instance))
    }

    /// Validate one suite file.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> RunnerResult<ValidationResult> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RunnerError::NotFound(path.to_path_buf()),
            _ => RunnerError::Io(e),
        })?;
        let result = self.validate_str(&text, path);
        debug!(
            "Validated {}: {} ({} errors)",
            path.display(),
            if result.valid { "valid" } else { "invalid" },
            result.errors.len()
        );
        Ok(result)
    }

    /// Discover suite files under `dir` and validate each one.
    pub fn validate_tests(
        &self,
        dir: impl Into<PathBuf>,
        pattern: Option<&str>,
    ) -> RunnerResult<Vec<ValidationResult>> {
        let discovery = TestDiscovery::new(dir, pattern)?;
        Ok(discovery
            .iter()
            .map(|file| {
                self.validate_file(&file.path)
                    .unwrap_or_else(|e| ValidationResult::unreadable(&file.path, &e))
            })
            .collect())
    }
}

/// Convert a JSON pointer to a `$`-rooted dotted path, optionally naming a
/// missing property.
pub fn dotted_path(pointer: &str, property: Option<&str>) -> String {
    let mut path = String::from("$");
    let segments = pointer.split('/').skip(1).filter(|s| !s.is_empty());
    for segment in segments.map(|s| s.replace("~1", "/").replace("~0", "~")) {
        push_segment(&mut path, &segment);
    }
    if let Some(property) = property {
        push_segment(&mut path, property);
    }
    path
}

fn push_segment(path: &mut String, segment: &str) {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        path.push('[');
        path.push_str(segment);
        path.push(']');
    } else {
        path.push('.');
        path.push_str(segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundled() -> &'static TestSuiteSchema {
        TestSuiteSchema::bundled().unwrap()
    }

    #[test]
    fn test_bundled_schema_is_shared() {
        let first = bundled() as *const TestSuiteSchema;
        let second = bundled() as *const TestSuiteSchema;
        assert_eq!(first, second);
        assert_eq!(bundled().origin(), "bundled");
        assert_eq!(bundled().document()["required"], json!(["suite", "tests"]));
    }

    #[test]
    fn test_dotted_path() {
        assert_eq!(dotted_path("", None), "$");
        assert_eq!(dotted_path("", Some("suite")), "$.suite");
        assert_eq!(dotted_path("/tests/0/asserts", None), "$.tests[0].asserts");
        assert_eq!(dotted_path("/tests/1", Some("it")), "$.tests[1].it");
        assert_eq!(dotted_path("/set/a~1b", None), "$.set.a/b");
    }

    #[test]
    fn test_valid_suite() {
        let yaml = "suite: test deployment\ntemplates:\n  - deployment.yaml\ntests:\n  - it: should render\n    asserts:\n      - isKind:\n          of: Deployment\n";
        let result = bundled().validate_str(yaml, Path::new("deployment_test.yaml"));
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_missing_suite_names_field() {
        let yaml = "tests:\n  - it: a\n    asserts: []\n";
        let result = bundled().validate_str(yaml, Path::new("t.yaml"));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "$.suite");
        assert_eq!(result.errors[0].pointer, "");
        assert!(result.errors[0].message.contains("suite"));
    }

    #[test]
    fn test_all_errors_are_kept() {
        let yaml = "suite: 3\ntests:\n  - asserts:\n      - bogusAssertion: {}\n";
        let result = bundled().validate_str(yaml, Path::new("t.yaml"));
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"$.suite"), "{:?}", paths);
        assert!(paths.contains(&"$.tests[0].it"), "{:?}", paths);
        assert!(paths.contains(&"$.tests[0].asserts[0]"), "{:?}", paths);
    }

    #[test]
    fn test_yaml_syntax_error_has_location() {
        let yaml = "suite: ok\ntests:\n  - it: [unclosed\n";
        let result = bundled().validate_str(yaml, Path::new("t.yaml"));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].line.is_some());
        assert!(result.message.starts_with("Invalid YAML syntax"));
    }

    #[test]
    fn test_custom_schema() {
        let schema = TestSuiteSchema::from_value(
            json!({"$schema": "http://json-schema.org/draft-07/schema#", "required": ["owner"]}),
            "inline",
        )
        .unwrap();
        let result = schema.validate_str("suite: s\n", Path::new("t.yaml"));
        assert_eq!(result.errors[0].path, "$.owner");
    }

    #[test]
    fn test_invalid_schema_document() {
        let err = TestSuiteSchema::from_value(json!({"type": 12}), "inline").unwrap_err();
        assert!(matches!(err, RunnerError::Schema(_)));
    }
}
