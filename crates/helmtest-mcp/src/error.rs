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

//! Error types for the MCP server.

use helmtest_report::ReportError;
use helmtest_runner::RunnerError;
use thiserror::Error;

/// MCP server error type.
#[derive(Error, Debug)]
pub enum McpError {
    /// A report or suite file could not be parsed.
    #[error("Parse failure: {0}")]
    Parse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Tool not found.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Invalid arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Path traversal attempt.
    #[error("Path traversal not allowed: {0}")]
    PathTraversal(String),

    /// File or directory not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Runner missing, misconfigured, or produced no report.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Runner exceeded its timeout.
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type for MCP operations.
pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    /// Get the MCP error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => -32001,
            Self::Json(_) => -32700,
            Self::Io(_) => -32002,
            Self::InvalidRequest(_) => -32600,
            Self::ToolNotFound(_) => -32601,
            Self::ResourceNotFound(_) => -32602,
            Self::InvalidArguments(_) => -32602,
            Self::PathTraversal(_) => -32003,
            Self::NotFound(_) => -32004,
            Self::Configuration(_) => -32005,
            Self::Timeout(_) => -32006,
        }
    }
}

impl From<RunnerError> for McpError {
    fn from(err: RunnerError) -> Self {
        let message = err.to_string();
        match err {
            RunnerError::NotFound(_) | RunnerError::NotADirectory(_) => Self::NotFound(message),
            RunnerError::InvalidPattern { .. }
            | RunnerError::InvalidGlob { .. }
            | RunnerError::UnsupportedFormat(_) => Self::InvalidArguments(message),
            RunnerError::Parse { .. } | RunnerError::InvalidSuite { .. } | RunnerError::Report(_) => {
                Self::Parse(message)
            }
            RunnerError::Schema(_) | RunnerError::Configuration(_) => Self::Configuration(message),
            RunnerError::Timeout { .. } => Self::Timeout(message),
            RunnerError::Io(e) => Self::Io(e),
        }
    }
}

impl From<ReportError> for McpError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UnknownFormat(_) => Self::InvalidArguments(err.to_string()),
            _ => Self::Parse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helmtest_report::ReportFormat;
    use std::path::PathBuf;

    #[test]
    fn test_runner_errors_map_to_kinds() {
        let not_found: McpError = RunnerError::NotFound(PathBuf::from("charts/app")).into();
        assert!(matches!(not_found, McpError::NotFound(_)));

        let timeout: McpError = RunnerError::Timeout { secs: 3 }.into();
        assert!(matches!(timeout, McpError::Timeout(ref m) if m.contains("3s")));

        let config: McpError = RunnerError::Configuration("runner not installed: helm".into()).into();
        assert!(matches!(config, McpError::Configuration(_)));

        let parse: McpError = RunnerError::Report(ReportError::Json("bad".into())).into();
        assert!(matches!(parse, McpError::Parse(_)));

        let format: McpError = RunnerError::UnsupportedFormat(ReportFormat::Tap).into();
        assert!(matches!(format, McpError::InvalidArguments(_)));
    }

    #[test]
    fn test_unknown_format_is_invalid_arguments() {
        let err: McpError = ReportError::UnknownFormat("html".into()).into();
        assert_eq!(err.code(), -32602);
    }

    #[test]
    fn test_codes_are_distinct_for_failure_kinds() {
        let codes = [
            McpError::NotFound(String::new()).code(),
            McpError::Configuration(String::new()).code(),
            McpError::Parse(String::new()).code(),
            McpError::Timeout(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
