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

//! Argument types for MCP tools.

use crate::error::{McpError, McpResult};
use helmtest_report::ReportFormat;
use helmtest_runner::MAX_TIMEOUT_SECS;
use serde::Deserialize;
use std::time::Duration;

// ============ Argument Structures ============

/// `get_tests` and `validate_tests`.
#[derive(Debug, Deserialize)]
pub struct DirectoryArgs {
    pub dir_path: String,
    #[serde(default)]
    pub pattern: Option<String>,
}

/// `get_test_from_file` and `validate_schema`.
#[derive(Debug, Deserialize)]
pub struct TestFileArgs {
    pub test_file_path: String,
}

/// `run_unittest` and `update_snapshot`.
#[derive(Debug, Deserialize)]
pub struct RunArgs {
    /// Glob of suite files, relative to the chart.
    pub test_suite_files: String,
    pub chart_path: String,
    #[serde(default)]
    pub values_path: Vec<String>,
    #[serde(default = "default_output_type")]
    pub output_type: String,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl RunArgs {
    pub fn format(&self) -> McpResult<ReportFormat> {
        let format: ReportFormat = self.output_type.parse()?;
        if !format.is_runner_output() {
            return Err(McpError::InvalidArguments(format!(
                "output_type must be one of junit, xunit, nunit (got '{}')",
                self.output_type
            )));
        }
        Ok(format)
    }

    pub fn timeout(&self) -> McpResult<Option<Duration>> {
        match self.timeout_secs {
            None => Ok(None),
            Some(secs) if (1..=MAX_TIMEOUT_SECS).contains(&secs) => {
                Ok(Some(Duration::from_secs(secs)))
            }
            Some(secs) => Err(McpError::InvalidArguments(format!(
                "timeout_secs must be between 1 and {} (got {})",
                MAX_TIMEOUT_SECS, secs
            ))),
        }
    }
}

/// `parse_report`.
#[derive(Debug, Deserialize)]
pub struct ParseReportArgs {
    pub report_path: String,
    pub format: String,
}

// ============ Default Value Functions ============

fn default_output_type() -> String {
    ReportFormat::XUnit.as_str().to_string()
}
