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

//! Schema validation tools.

use crate::error::McpResult;
use crate::protocol::CallToolResult;
use crate::tools::discovery::effective_pattern;
use crate::tools::helpers::{display_path, json_result, parse_args, resolve_safe_path};
use crate::tools::types::{DirectoryArgs, TestFileArgs};
use crate::tools::ToolContext;
use helmtest_runner::ValidationResult;
use serde_json::{json, Value as JsonValue};
use std::path::Path;

/// Execute validate_schema tool.
///
/// A file that violates the schema is a normal result with `valid: false`.
pub fn execute_validate_schema(
    args: Option<JsonValue>,
    ctx: &ToolContext<'_>,
) -> McpResult<CallToolResult> {
    let args: TestFileArgs = parse_args(args)?;
    let path = resolve_safe_path(ctx.root, &args.test_file_path)?;
    let result = ctx.schema.validate_file(&path)?;
    json_result(validation_json(ctx.root, &result))
}

/// Execute validate_tests tool.
pub fn execute_validate_tests(
    args: Option<JsonValue>,
    ctx: &ToolContext<'_>,
) -> McpResult<CallToolResult> {
    let args: DirectoryArgs = parse_args(args)?;
    let dir = resolve_safe_path(ctx.root, &args.dir_path)?;
    let results = ctx.schema.validate_tests(&dir, args.pattern.as_deref())?;

    let valid = results.iter().filter(|r| r.valid).count();
    json_result(json!({
        "dir_path": display_path(ctx.root, &dir),
        "pattern": effective_pattern(args.pattern.as_deref()),
        "count": results.len(),
        "valid": valid,
        "invalid": results.len() - valid,
        "results": results
            .iter()
            .map(|r| validation_json(ctx.root, r))
            .collect::<Vec<_>>()
    }))
}

fn validation_json(root: &Path, result: &ValidationResult) -> JsonValue {
    json!({
        "file_path": display_path(root, &result.file_path),
        "valid": result.valid,
        "message": result.message,
        "errors": result.errors
    })
}
