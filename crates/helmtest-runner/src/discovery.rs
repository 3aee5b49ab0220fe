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
//! Test-suite file discovery and suite-definition loading.

use crate::error::{RunnerError, RunnerResult};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File-name convention used when no pattern is given (case-insensitive).
pub const DEFAULT_PATTERN: &str = r".*\.yaml$";

/// A discovered suite file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestFile {
    pub path: PathBuf,
    /// Directory depth below the discovery root; a file directly under the root has depth 1.
    pub depth: usize,
}

/// Recursive discovery of suite files under a root directory.
///
/// The root and pattern are checked up front; the walk itself happens lazily
/// on each call to [`TestDiscovery::iter`].
#[derive(Debug, Clone)]
pub struct TestDiscovery {
    root: PathBuf,
    pattern: Regex,
}

impl TestDiscovery {
    /// Create a discovery over `root`.
    ///
    /// A non-blank `pattern` is a regular expression matched against each
    /// file name, anchored at the start of the name. Blank or absent patterns
    /// fall back to [`DEFAULT_PATTERN`].
    pub fn new(root: impl Into<PathBuf>, pattern: Option<&str>) -> RunnerResult<Self> {
        let root = root.into();
        let pattern = compile_pattern(pattern)?;

        let metadata = fs::metadata(&root).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RunnerError::NotFound(root.clone()),
            _ => RunnerError::Io(e),
        })?;
        if !metadata.is_dir() {
            return Err(RunnerError::NotADirectory(root));
        }

        Ok(Self { root, pattern })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a file name follows the configured convention.
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }

    /// Walk the tree. Every call starts a fresh walk; entries within a
    /// directory are visited in file-name order.
    pub fn iter(&self) -> impl Iterator<Item = TestFile> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| entry.file_name().to_str().is_some_and(|name| self.matches(name)))
            .map(|entry| {
                debug!("Discovered test file {}", entry.path().display());
                TestFile {
                    depth: entry.depth(),
                    path: entry.into_path(),
                }
            })
    }
}

fn compile_pattern(pattern: Option<&str>) -> RunnerResult<Regex> {
    match pattern.map(str::trim).filter(|p| !p.is_empty()) {
        None => RegexBuilder::new(&format!("^(?:{})", DEFAULT_PATTERN))
            .case_insensitive(true)
            .build()
            .map_err(|e| RunnerError::InvalidPattern {
                pattern: DEFAULT_PATTERN.to_string(),
                message: e.to_string(),
            }),
        Some(pattern) => {
            // Validate on its own first so the error names the caller's pattern.
            Regex::new(pattern).map_err(|e| RunnerError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            Regex::new(&format!("^(?:{})", pattern)).map_err(|e| RunnerError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
        }
    }
}

/// The parts of a suite file an assistant needs to pick tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteDefinition {
    pub suite: String,
    /// `it` descriptions, in file order.
    pub tests: Vec<String>,
    /// The suite-level `release` mapping, `{}` when absent.
    pub release: JsonValue,
    pub file_path: PathBuf,
}

/// Load one suite file.
pub fn load_suite(path: impl AsRef<Path>) -> RunnerResult<SuiteDefinition> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RunnerError::NotFound(path.to_path_buf()),
        _ => RunnerError::Io(e),
    })?;

    let document: YamlValue = serde_yaml::from_str(&text).map_err(|e| RunnerError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mapping = match document {
        YamlValue::Mapping(mapping) => mapping,
        YamlValue::Null => {
            return Err(RunnerError::invalid_suite(path, "suite", "is missing (file is empty)"))
        }
        _ => {
            return Err(RunnerError::invalid_suite(
                path,
                "suite",
                "is missing (document is not a mapping)",
            ))
        }
    };

    let suite = match mapping.get("suite") {
        None => return Err(RunnerError::invalid_suite(path, "suite", "is missing")),
        Some(YamlValue::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(YamlValue::String(_)) => {
            return Err(RunnerError::invalid_suite(path, "suite", "must not be empty"))
        }
        Some(_) => return Err(RunnerError::invalid_suite(path, "suite", "must be a string")),
    };

    let tests = match mapping.get("tests") {
        None => return Err(RunnerError::invalid_suite(path, "tests", "is missing")),
        Some(YamlValue::Sequence(items)) if !items.is_empty() => items,
        Some(YamlValue::Sequence(_)) => {
            return Err(RunnerError::invalid_suite(path, "tests", "must not be empty"))
        }
        Some(_) => return Err(RunnerError::invalid_suite(path, "tests", "must be a list")),
    };

    let mut descriptions = Vec::with_capacity(tests.len());
    for (index, test) in tests.iter().enumerate() {
        match test.get("it") {
            Some(YamlValue::String(it)) => descriptions.push(it.trim().to_string()),
            _ => {
                return Err(RunnerError::invalid_suite(
                    path,
                    &format!("tests[{}].it", index),
                    "must be a string",
                ))
            }
        }
    }

    let release = match mapping.get("release") {
        None | Some(YamlValue::Null) => JsonValue::Object(serde_json::Map::new()),
        Some(value) => serde_json::to_value(value).map_err(|e| {
            RunnerError::invalid_suite(path, "release", &format!("cannot be represented as JSON ({})", e))
        })?,
    };

    Ok(SuiteDefinition {
        suite,
        tests: descriptions,
        release,
        file_path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_pattern_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let discovery = TestDiscovery::new(temp.path(), None).unwrap();
        assert!(discovery.matches("deployment_test.yaml"));
        assert!(discovery.matches("SERVICE_TEST.YAML"));
        assert!(!discovery.matches("values.yml"));
        assert!(!discovery.matches("notes.yaml.bak"));
    }

    #[test]
    fn test_blank_pattern_uses_default() {
        let temp = TempDir::new().unwrap();
        let discovery = TestDiscovery::new(temp.path(), Some("  ")).unwrap();
        assert!(discovery.matches("a.yaml"));
    }

    #[test]
    fn test_caller_pattern_is_anchored_at_start() {
        let temp = TempDir::new().unwrap();
        let discovery = TestDiscovery::new(temp.path(), Some(r".*_test\.yaml$")).unwrap();
        assert!(discovery.matches("deployment_test.yaml"));
        assert!(!discovery.matches("values.yaml"));

        let prefix = TestDiscovery::new(temp.path(), Some("deploy")).unwrap();
        assert!(prefix.matches("deployment_test.yaml"));
        assert!(!prefix.matches("my-deployment_test.yaml"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = TestDiscovery::new(temp.path(), Some("(unclosed")).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = TestDiscovery::new(temp.path().join("nope"), None).unwrap_err();
        assert!(matches!(err, RunnerError::NotFound(_)));
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "a.yaml", "suite: s");
        let err = TestDiscovery::new(&file, None).unwrap_err();
        assert!(matches!(err, RunnerError::NotADirectory(_)));
    }

    #[test]
    fn test_iter_reports_depth_and_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b_test.yaml", "");
        write(temp.path(), "a_test.yaml", "");
        write(temp.path(), "nested/deeper/c_test.yaml", "");
        write(temp.path(), "nested/README.md", "");

        let discovery = TestDiscovery::new(temp.path(), None).unwrap();
        let found: Vec<_> = discovery
            .iter()
            .map(|f| (f.path.file_name().unwrap().to_string_lossy().into_owned(), f.depth))
            .collect();
        assert_eq!(
            found,
            vec![
                ("a_test.yaml".to_string(), 1),
                ("b_test.yaml".to_string(), 1),
                ("c_test.yaml".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_iter_is_restartable() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a_test.yaml", "");
        let discovery = TestDiscovery::new(temp.path(), None).unwrap();
        assert_eq!(discovery.iter().count(), 1);
        write(temp.path(), "b_test.yaml", "");
        assert_eq!(discovery.iter().count(), 2);
    }

    #[test]
    fn test_load_suite() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "deployment_test.yaml",
            "suite: test deployment\nrelease:\n  name: my-release\n  namespace: apps\ntests:\n  - it: should render  \n    asserts:\n      - isKind:\n          of: Deployment\n  - it: should set replicas\n    asserts: []\n",
        );
        let suite = load_suite(&path).unwrap();
        assert_eq!(suite.suite, "test deployment");
        assert_eq!(suite.tests, vec!["should render", "should set replicas"]);
        assert_eq!(suite.release["namespace"], "apps");
        assert_eq!(suite.file_path, path);
    }

    #[test]
    fn test_load_suite_defaults_release() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "t.yaml", "suite: s\ntests:\n  - it: a\n");
        assert_eq!(load_suite(&path).unwrap().release, serde_json::json!({}));
    }

    #[test]
    fn test_load_suite_errors() {
        let temp = TempDir::new().unwrap();
        let cases = [
            ("missing_suite.yaml", "tests:\n  - it: a\n", "suite"),
            ("empty_suite.yaml", "suite: ' '\ntests:\n  - it: a\n", "suite"),
            ("missing_tests.yaml", "suite: s\n", "tests"),
            ("empty_tests.yaml", "suite: s\ntests: []\n", "tests"),
            ("bad_it.yaml", "suite: s\ntests:\n  - asserts: []\n", "tests[0].it"),
            ("empty.yaml", "", "suite"),
        ];
        for (name, content, expected_field) in cases {
            let path = write(temp.path(), name, content);
            match load_suite(&path).unwrap_err() {
                RunnerError::InvalidSuite { field, .. } => assert_eq!(field, expected_field, "{}", name),
                other => panic!("{}: unexpected error {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_load_suite_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "broken.yaml", "suite: [unclosed\n");
        assert!(matches!(load_suite(&path).unwrap_err(), RunnerError::Parse { .. }));
    }

    #[test]
    fn test_load_suite_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_suite(temp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, RunnerError::NotFound(_)));
    }
}
