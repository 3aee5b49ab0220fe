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

//! Report parsing tool and the shared report rendering.

use crate::error::McpResult;
use crate::protocol::CallToolResult;
use crate::tools::helpers::{display_path, json_result, parse_args, resolve_safe_path};
use crate::tools::types::ParseReportArgs;
use crate::tools::ToolContext;
use helmtest_report::{normalize, Report, ReportFormat};
use serde_json::{json, Value as JsonValue};
use std::fs;

/// Execute parse_report tool.
pub fn execute_parse_report(args: Option<JsonValue>, ctx: &ToolContext<'_>) -> McpResult<CallToolResult> {
    let args: ParseReportArgs = parse_args(args)?;
    let format: ReportFormat = args.format.parse()?;
    let path = resolve_safe_path(ctx.root, &args.report_path)?;

    let bytes = fs::read(&path)?;
    let report = normalize(&bytes, format)?;

    let mut result = report_json(&report);
    result["report_path"] = json!(display_path(ctx.root, &path));
    result["format"] = json!(format);
    json_result(result)
}

/// Summary, suites and failures of a normalized report.
pub(crate) fn report_json(report: &Report) -> JsonValue {
    let failures: Vec<JsonValue> = report
        .failures()
        .map(|(suite, case)| {
            json!({
                "suite": suite,
                "case": case.name,
                "message": case.message
            })
        })
        .collect();

    json!({
        "summary": report.summary(),
        "suites": report.suites,
        "failures": failures
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use helmtest_report::{Case, CaseStatus, Suite};

    #[test]
    fn test_report_json_lists_failures_in_order() {
        let mut suite = Suite::new("deployment");
        suite.cases.push(Case::new("renders", CaseStatus::Passed, 0.25));
        suite.cases.push(
            Case::new("sets replicas", CaseStatus::Failed, 0.5)
                .with_message(Some("expected 3, got 1".to_string())),
        );
        let report = Report { suites: vec![suite] };

        let value = report_json(&report);
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["suites"][0]["cases"][1]["status"], "failed");
        assert_eq!(value["failures"][0]["suite"], "deployment");
        assert_eq!(value["failures"][0]["message"], "expected 3, got 1");
    }

    #[test]
    fn test_report_json_empty() {
        let value = report_json(&Report::default());
        assert_eq!(value["summary"]["total"], 0);
        assert_eq!(value["failures"], json!([]));
    }
}
