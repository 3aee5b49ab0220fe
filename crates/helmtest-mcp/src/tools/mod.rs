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

//! Helm unit test tools for MCP server.
//!
//! Available tools:
//! - `get_tests`: Discover suite files under a directory and load each definition
//! - `get_test_from_file`: Load one suite definition
//! - `validate_schema`: Validate one suite file against the test-suite schema
//! - `validate_tests`: Validate every suite file under a directory
//! - `run_unittest`: Run `helm unittest` and normalize its report
//! - `update_snapshot`: Same as `run_unittest`, updating snapshots
//! - `parse_report`: Normalize an existing report file

mod discovery;
mod execution;
mod helpers;
mod report;
#[macro_use]
mod schema_macros;
mod types;
mod validation;

// Re-export public APIs
pub use discovery::{execute_get_test_from_file, execute_get_tests};
pub use execution::{execute_run_unittest, execute_update_snapshot};
pub use helpers::error_result;
pub use report::execute_parse_report;
pub use validation::{execute_validate_schema, execute_validate_tests};

use crate::error::{McpError, McpResult};
use crate::protocol::{CallToolResult, Tool};
use helmtest_runner::{RunnerConfig, TestSuiteSchema};
use serde_json::{json, Value as JsonValue};
use std::path::Path;

/// What a tool call may touch: the server root, the runner and the schema.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    pub root: &'a Path,
    pub runner: &'a RunnerConfig,
    pub schema: &'a TestSuiteSchema,
}

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    let run_input = tool_schema! {
        required: ["test_suite_files", "chart_path"],
        properties: {
            test_suite_files: schema_string!("Glob of suite files relative to the chart, e.g. tests/*_test.yaml"),
            chart_path: path_arg!("Chart directory"),
            values_path: schema_string_array!("Values files passed to the runner with -v, in order"),
            output_type: format_arg!(["junit", "xunit", "nunit"], "Report format requested from the runner", default: "xunit"),
            output_file: path_arg!("Keep the runner's report at this path (parent directory must exist)"),
            timeout_secs: timeout_arg!()
        }
    };

    vec![
        Tool {
            name: "get_tests".to_string(),
            description: "Discover helm-unittest suite files under a directory, recursively, and load the suite name and test descriptions of each.".to_string(),
            input_schema: tool_schema! {
                required: ["dir_path"],
                properties: {
                    dir_path: path_arg!("Directory to search"),
                    pattern: pattern_arg!()
                }
            },
            output_schema: Some(tool_schema! {
                required: ["dir_path", "pattern", "count", "files"],
                properties: {
                    dir_path: schema_string!("Searched directory"),
                    pattern: schema_string!("Pattern in effect"),
                    count: schema_integer!("Number of files found"),
                    files: json!({
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "path": { "type": "string" },
                                "depth": { "type": "integer" },
                                "definition": definition_schema(),
                                "error": { "type": "string" }
                            },
                            "required": ["path", "depth"]
                        }
                    })
                }
            }),
        },
        Tool {
            name: "get_test_from_file".to_string(),
            description: "Load one helm-unittest suite file: suite name, test descriptions and release settings.".to_string(),
            input_schema: tool_schema! {
                required: ["test_file_path"],
                properties: {
                    test_file_path: path_arg!("Suite file")
                }
            },
            output_schema: Some(definition_schema()),
        },
        Tool {
            name: "validate_schema".to_string(),
            description: "Validate one suite file against the helm-unittest test-suite schema. Violations are reported with JSON pointer and $-path locations.".to_string(),
            input_schema: tool_schema! {
                required: ["test_file_path"],
                properties: {
                    test_file_path: path_arg!("Suite file")
                }
            },
            output_schema: Some(validation_schema()),
        },
        Tool {
            name: "validate_tests".to_string(),
            description: "Discover suite files under a directory and validate each against the test-suite schema.".to_string(),
            input_schema: tool_schema! {
                required: ["dir_path"],
                properties: {
                    dir_path: path_arg!("Directory to search"),
                    pattern: pattern_arg!()
                }
            },
            output_schema: Some(tool_schema! {
                required: ["dir_path", "count", "valid", "invalid", "results"],
                properties: {
                    dir_path: schema_string!("Searched directory"),
                    pattern: schema_string!("Pattern in effect"),
                    count: schema_integer!("Number of files validated"),
                    valid: schema_integer!("Files that passed"),
                    invalid: schema_integer!("Files that failed"),
                    results: json!({ "type": "array", "items": validation_schema() })
                }
            }),
        },
        Tool {
            name: "run_unittest".to_string(),
            description: "Run helm unittest for a chart and return the normalized report: summary, suites, failures, runner counts, exit code and captured output.".to_string(),
            input_schema: run_input.clone(),
            output_schema: Some(execution_schema()),
        },
        Tool {
            name: "update_snapshot".to_string(),
            description: "Run helm unittest with snapshot updating (-u) and return the normalized report.".to_string(),
            input_schema: run_input,
            output_schema: Some(execution_schema()),
        },
        Tool {
            name: "parse_report".to_string(),
            description: "Normalize an existing test report (junit, xunit, nunit, json or tap) into suites and cases.".to_string(),
            input_schema: tool_schema! {
                required: ["report_path", "format"],
                properties: {
                    report_path: path_arg!("Report file"),
                    format: format_arg!(["junit", "xunit", "nunit", "json", "tap"])
                }
            },
            output_schema: Some(report_schema(&["report_path", "format"])),
        },
    ]
}

fn definition_schema() -> JsonValue {
    tool_schema! {
        required: ["suite", "tests", "release", "file_path"],
        properties: {
            suite: schema_string!("Suite name"),
            tests: schema_string_array!("Test descriptions (it), in file order"),
            release: json!({ "type": "object", "description": "Suite-level release settings" }),
            file_path: schema_string!("Suite file")
        }
    }
}

fn validation_schema() -> JsonValue {
    tool_schema! {
        required: ["file_path", "valid", "message", "errors"],
        properties: {
            file_path: schema_string!("Validated file"),
            valid: json!({ "type": "boolean" }),
            message: schema_string!("Human-readable outcome"),
            errors: json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "pointer": { "type": "string" },
                        "path": { "type": "string" },
                        "line": { "type": "integer" },
                        "column": { "type": "integer" },
                        "message": { "type": "string" }
                    },
                    "required": ["pointer", "path", "message"]
                }
            })
        }
    }
}

fn report_schema(extra_required: &[&str]) -> JsonValue {
    let mut schema = tool_schema! {
        required: ["summary", "suites", "failures"],
        properties: {
            summary: json!({
                "type": "object",
                "properties": {
                    "suites": { "type": "integer" },
                    "total": { "type": "integer" },
                    "passed": { "type": "integer" },
                    "failed": { "type": "integer" },
                    "skipped": { "type": "integer" },
                    "duration": { "type": "number" }
                },
                "required": ["suites", "total", "passed", "failed", "skipped", "duration"]
            }),
            suites: json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "cases": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "name": { "type": "string" },
                                    "status": { "type": "string", "enum": ["passed", "failed", "skipped"] },
                                    "message": { "type": "string" },
                                    "duration": { "type": "number" }
                                },
                                "required": ["name", "status", "duration"]
                            }
                        }
                    },
                    "required": ["name", "cases"]
                }
            }),
            failures: json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "suite": { "type": "string" },
                        "case": { "type": "string" },
                        "message": { "type": ["string", "null"] }
                    },
                    "required": ["suite", "case"]
                }
            }),
            report_path: schema_string!("Parsed report file"),
            format: schema_string!("Report format")
        }
    };
    if let Some(required) = schema["required"].as_array_mut() {
        required.extend(extra_required.iter().map(|field| json!(field)));
    }
    schema
}

fn execution_schema() -> JsonValue {
    let mut schema = report_schema(&["success", "exit_code", "duration_secs", "stdout", "stderr"]);
    if let Some(properties) = schema["properties"].as_object_mut() {
        properties.remove("report_path");
        properties.remove("format");
        properties.insert("success".to_string(), json!({ "type": "boolean" }));
        properties.insert("exit_code".to_string(), json!({ "type": ["integer", "null"] }));
        properties.insert("duration_secs".to_string(), json!({ "type": "number" }));
        properties.insert("command".to_string(), schema_string_array!("Runner command line"));
        properties.insert("update_snapshot".to_string(), json!({ "type": "boolean" }));
        properties.insert("runner_summary".to_string(), json!({ "type": ["object", "null"] }));
        properties.insert("consistent".to_string(), json!({ "type": ["boolean", "null"] }));
        properties.insert("output_file".to_string(), json!({ "type": ["string", "null"] }));
        properties.insert("stdout".to_string(), json!({ "type": "string" }));
        properties.insert("stderr".to_string(), json!({ "type": "string" }));
    }
    schema
}

/// Execute a tool by name.
pub fn execute_tool(
    name: &str,
    arguments: Option<JsonValue>,
    ctx: &ToolContext<'_>,
) -> McpResult<CallToolResult> {
    match name {
        "get_tests" => execute_get_tests(arguments, ctx),
        "get_test_from_file" => execute_get_test_from_file(arguments, ctx),
        "validate_schema" => execute_validate_schema(arguments, ctx),
        "validate_tests" => execute_validate_tests(arguments, ctx),
        "run_unittest" => execute_run_unittest(arguments, ctx),
        "update_snapshot" => execute_update_snapshot(arguments, ctx),
        "parse_report" => execute_parse_report(arguments, ctx),
        _ => Err(McpError::ToolNotFound(name.to_string())),
    }
}
