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

//! Runner console summary.
//!
//! `helm unittest` ends its console output with a block like:
//!
//! ```text
//! Charts:      1 failed, 0 passed, 1 total
//! Test Suites: 1 failed, 1 passed, 2 total
//! Tests:       1 failed, 2 passed, 3 total
//! Snapshot:    0 passed, 0 total
//! Time:        12.1035ms
//! ```
//!
//! The counts are used to cross-check a normalized [`Report`](crate::Report).

use crate::model::Summary;
use serde::Serialize;

/// Counts from one summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunnerCounts {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub total: usize,
}

/// The runner's own summary block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunnerSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts: Option<RunnerCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suites: Option<RunnerCounts>,
    pub tests: RunnerCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<RunnerCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl RunnerSummary {
    /// Whether the runner's test counts agree with a normalized summary.
    ///
    /// Errored tests count as failed.
    pub fn matches(&self, summary: &Summary) -> bool {
        self.tests.total == summary.total
            && self.tests.passed == summary.passed
            && self.tests.failed + self.tests.errored == summary.failed
    }
}

/// Parse the summary block from runner stdout.
///
/// Returns `None` when the output has no `Tests:` line. When the runner
/// printed several blocks, the last one wins.
pub fn parse_summary(output: &str) -> Option<RunnerSummary> {
    let plain = strip_ansi_escapes::strip_str(output);

    let mut summary = RunnerSummary::default();
    let mut saw_tests = false;

    for line in plain.lines() {
        let Some((label, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();

        match label.trim() {
            "Charts" => summary.charts = parse_counts(value),
            "Test Suites" => summary.suites = parse_counts(value),
            "Tests" => {
                if let Some(counts) = parse_counts(value) {
                    summary.tests = counts;
                    saw_tests = true;
                }
            }
            "Snapshot" | "Snapshots" => summary.snapshots = parse_counts(value),
            "Time" if !value.is_empty() => summary.time = Some(value.to_string()),
            _ => {}
        }
    }

    saw_tests.then_some(summary)
}

/// Parse `1 failed, 2 passed, 3 total`.
fn parse_counts(value: &str) -> Option<RunnerCounts> {
    let mut counts = RunnerCounts::default();
    let mut saw_total = false;

    for part in value.split(',') {
        let mut words = part.split_whitespace();
        let (Some(number), Some(kind)) = (words.next(), words.next()) else {
            return None;
        };
        let number: usize = number.parse().ok()?;
        match kind {
            "passed" => counts.passed = number,
            "failed" => counts.failed = number,
            "errored" => counts.errored = number,
            "skipped" => counts.skipped = number,
            "total" => {
                counts.total = number;
                saw_total = true;
            }
            _ => {}
        }
    }

    saw_total.then_some(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Case, CaseStatus, Report, Suite};

    const OUTPUT: &str = "
### Chart [ app ] charts/app

 PASS  test service\tcharts/app/tests/service_test.yaml
 FAIL  test deployment\tcharts/app/tests/deployment_test.yaml
\t- should set replicas

Charts:      1 failed, 0 passed, 1 total
Test Suites: 1 failed, 1 passed, 2 total
Tests:       1 failed, 2 passed, 3 total
Snapshot:    0 passed, 0 total
Time:        12.1035ms
";

    #[test]
    fn test_parse_summary_block() {
        let summary = parse_summary(OUTPUT).unwrap();
        assert_eq!(
            summary.tests,
            RunnerCounts {
                passed: 2,
                failed: 1,
                errored: 0,
                skipped: 0,
                total: 3
            }
        );
        assert_eq!(summary.suites.unwrap().total, 2);
        assert_eq!(summary.charts.unwrap().failed, 1);
        assert_eq!(summary.snapshots.unwrap().total, 0);
        assert_eq!(summary.time.as_deref(), Some("12.1035ms"));
    }

    #[test]
    fn test_parse_summary_strips_ansi() {
        let colored = "\x1b[1mTests:\x1b[0m       \x1b[31m1 failed\x1b[0m, 1 errored, 0 passed, 2 total\n";
        let summary = parse_summary(colored).unwrap();
        assert_eq!(summary.tests.errored, 1);
        assert_eq!(summary.tests.total, 2);
    }

    #[test]
    fn test_parse_summary_absent() {
        assert!(parse_summary("Error: chart not found\n").is_none());
        assert!(parse_summary("Tests: lots\n").is_none());
    }

    #[test]
    fn test_summary_matches_report() {
        let mut suite = Suite::new("s");
        suite.cases.push(Case::new("a", CaseStatus::Passed, 0.0));
        suite.cases.push(Case::new("b", CaseStatus::Passed, 0.0));
        suite.cases.push(Case::new("c", CaseStatus::Failed, 0.0));
        let report = Report { suites: vec![suite] };

        let summary = parse_summary(OUTPUT).unwrap();
        assert!(summary.matches(&report.summary()));

        let mut off = summary.clone();
        off.tests.passed = 1;
        assert!(!off.matches(&report.summary()));
    }
}
