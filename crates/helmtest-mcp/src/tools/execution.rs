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

//! Test execution tools.

use crate::error::{McpError, McpResult};
use crate::protocol::CallToolResult;
use crate::tools::helpers::{
    display_path, json_result, parse_args, resolve_output_path, resolve_safe_path,
};
use crate::tools::report::report_json;
use crate::tools::types::RunArgs;
use crate::tools::ToolContext;
use helmtest_runner::{ExecutionResult, RunRequest, TestExecutor};
use serde_json::{json, Value as JsonValue};
use std::path::{Component, Path};

/// Execute run_unittest tool.
pub fn execute_run_unittest(args: Option<JsonValue>, ctx: &ToolContext<'_>) -> McpResult<CallToolResult> {
    run(args, ctx, false)
}

/// Execute update_snapshot tool.
pub fn execute_update_snapshot(
    args: Option<JsonValue>,
    ctx: &ToolContext<'_>,
) -> McpResult<CallToolResult> {
    run(args, ctx, true)
}

fn run(args: Option<JsonValue>, ctx: &ToolContext<'_>, update_snapshot: bool) -> McpResult<CallToolResult> {
    let args: RunArgs = parse_args(args)?;
    let request = build_request(args, ctx, update_snapshot)?;

    let result = TestExecutor::new(ctx.runner.clone()).run(&request)?;
    json_result(execution_json(ctx.root, &result, update_snapshot))
}

fn build_request(args: RunArgs, ctx: &ToolContext<'_>, update_snapshot: bool) -> McpResult<RunRequest> {
    let output_type = args.format()?;
    let timeout = args.timeout()?;
    check_suite_glob(&args.test_suite_files)?;

    let chart_path = resolve_safe_path(ctx.root, &args.chart_path)?;
    let values_files = args
        .values_path
        .iter()
        .map(|path| resolve_safe_path(ctx.root, path))
        .collect::<McpResult<Vec<_>>>()?;
    let output_file = args
        .output_file
        .as_deref()
        .map(|path| resolve_output_path(ctx.root, path))
        .transpose()?;

    Ok(RunRequest {
        chart_path,
        test_suite_files: args.test_suite_files,
        values_files,
        output_type,
        output_file,
        update_snapshot,
        timeout,
    })
}

/// The suite glob is resolved against the chart and must stay inside it.
fn check_suite_glob(pattern: &str) -> McpResult<()> {
    if pattern.trim().is_empty() {
        return Err(McpError::InvalidArguments(
            "test_suite_files must not be empty".to_string(),
        ));
    }
    let escapes = Path::new(pattern)
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir));
    if escapes {
        return Err(McpError::PathTraversal(pattern.to_string()));
    }
    Ok(())
}

fn execution_json(root: &Path, result: &ExecutionResult, update_snapshot: bool) -> JsonValue {
    let mut value = report_json(&result.report);
    value["success"] = json!(result.exit_code == Some(0) && result.summary().is_success());
    value["exit_code"] = json!(result.exit_code);
    value["duration_secs"] = json!(result.duration.as_secs_f64());
    value["command"] = json!(result.command);
    value["update_snapshot"] = json!(update_snapshot);
    value["runner_summary"] = json!(result.runner_summary);
    value["consistent"] = json!(result.is_consistent());
    value["output_file"] = json!(result
        .output_file
        .as_deref()
        .map(|path| display_path(root, path)));
    value["stdout"] = json!(result.stdout);
    value["stderr"] = json!(result.stderr);
    value
}
