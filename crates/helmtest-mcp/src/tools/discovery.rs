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

//! Suite discovery tools.

use crate::error::McpResult;
use crate::protocol::CallToolResult;
use crate::tools::helpers::{display_path, json_result, parse_args, resolve_safe_path};
use crate::tools::types::{DirectoryArgs, TestFileArgs};
use crate::tools::ToolContext;
use helmtest_runner::{load_suite, SuiteDefinition, TestDiscovery, DEFAULT_PATTERN};
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use tracing::debug;

/// Execute get_tests tool.
pub fn execute_get_tests(args: Option<JsonValue>, ctx: &ToolContext<'_>) -> McpResult<CallToolResult> {
    let args: DirectoryArgs = parse_args(args)?;
    let dir = resolve_safe_path(ctx.root, &args.dir_path)?;
    let discovery = TestDiscovery::new(&dir, args.pattern.as_deref())?;

    let files: Vec<JsonValue> = discovery
        .iter()
        .map(|file| {
            let path = display_path(ctx.root, &file.path);
            match load_suite(&file.path) {
                Ok(definition) => json!({
                    "path": path,
                    "depth": file.depth,
                    "definition": definition_json(ctx.root, &definition)
                }),
                Err(e) => {
                    debug!("Could not load {}: {}", path, e);
                    json!({
                        "path": path,
                        "depth": file.depth,
                        "error": e.to_string()
                    })
                }
            }
        })
        .collect();

    json_result(json!({
        "dir_path": display_path(ctx.root, &dir),
        "pattern": effective_pattern(args.pattern.as_deref()),
        "count": files.len(),
        "files": files
    }))
}

/// Execute get_test_from_file tool.
pub fn execute_get_test_from_file(
    args: Option<JsonValue>,
    ctx: &ToolContext<'_>,
) -> McpResult<CallToolResult> {
    let args: TestFileArgs = parse_args(args)?;
    let path = resolve_safe_path(ctx.root, &args.test_file_path)?;
    let definition = load_suite(&path)?;
    json_result(definition_json(ctx.root, &definition))
}

pub(crate) fn effective_pattern(pattern: Option<&str>) -> &str {
    match pattern {
        Some(p) if !p.trim().is_empty() => p,
        _ => DEFAULT_PATTERN,
    }
}

fn definition_json(root: &Path, definition: &SuiteDefinition) -> JsonValue {
    json!({
        "suite": definition.suite,
        "tests": definition.tests,
        "release": definition.release,
        "file_path": display_path(root, &definition.file_path)
    })
}
