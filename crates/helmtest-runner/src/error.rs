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
//! Error types for discovery, validation and execution.

use helmtest_report::{ReportError, ReportFormat};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the runner layer.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A path the caller named does not exist.
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory was expected.
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The file-name pattern is not a valid regular expression.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A suite file is not valid YAML.
    #[error("Invalid YAML in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A suite file is valid YAML but not a usable suite definition.
    #[error("Invalid test suite {}: field '{field}' {message}", path.display())]
    InvalidSuite {
        path: PathBuf,
        field: String,
        message: String,
    },

    /// The schema document could not be loaded or compiled.
    #[error("Invalid schema document: {0}")]
    Schema(String),

    /// The runner is missing, could not be started, or produced no report.
    #[error("Runner configuration error: {0}")]
    Configuration(String),

    /// The runner did not finish in time and was killed.
    #[error("Runner timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The runner cannot write reports in this format.
    #[error("Output format '{0}' is not produced by helm unittest (expected junit, xunit or nunit)")]
    UnsupportedFormat(ReportFormat),

    /// Invalid test suite glob.
    #[error("Invalid test suite glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// The report could not be normalized.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

impl RunnerError {
    pub(crate) fn invalid_suite(path: &std::path::Path, field: &str, message: &str) -> Self {
        RunnerError::InvalidSuite {
            path: path.to_path_buf(),
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RunnerError::NotFound(PathBuf::from("charts/missing"));
        assert_eq!(err.to_string(), "Path not found: charts/missing");
    }

    #[test]
    fn test_invalid_suite_display() {
        let err = RunnerError::invalid_suite(std::path::Path::new("t.yaml"), "suite", "is missing");
        assert_eq!(err.to_string(), "Invalid test suite t.yaml: field 'suite' is missing");
    }

    #[test]
    fn test_report_error_is_transparent() {
        let err: RunnerError = ReportError::Json("bad".to_string()).into();
        assert_eq!(err.to_string(), ReportError::Json("bad".to_string()).to_string());
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(RunnerError::Timeout { secs: 5 }.to_string(), "Runner timed out after 5s");
    }
}
