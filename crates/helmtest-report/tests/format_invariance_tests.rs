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
//! Cross-format tests for report normalization
//!
//! The same run (2 suites, 3 cases, 1 failure) is stored in every supported
//! format and must normalize to the same result tree.

use helmtest_report::{normalize, parse_summary, CaseStatus, Report, ReportError, ReportFormat};

const JUNIT: &str = include_str!("fixtures/run.junit.xml");
const XUNIT: &str = include_str!("fixtures/run.xunit.xml");
const NUNIT: &str = include_str!("fixtures/run.nunit.xml");
const JSON: &str = include_str!("fixtures/run.json");
const TAP: &str = include_str!("fixtures/run.tap");
const CONSOLE: &str = include_str!("fixtures/console.txt");

fn fixture(format: ReportFormat) -> &'static str {
    match format {
        ReportFormat::JUnit => JUNIT,
        ReportFormat::XUnit => XUNIT,
        ReportFormat::NUnit => NUNIT,
        ReportFormat::Json => JSON,
        ReportFormat::Tap => TAP,
    }
}

fn normalized(format: ReportFormat) -> Report {
    normalize(fixture(format).as_bytes(), format)
        .unwrap_or_else(|e| panic!("{} fixture failed to normalize: {}", format, e))
}

// =============================================================================
// Invariance
// =============================================================================

#[test]
fn test_every_format_normalizes_to_same_report() {
    let reference = normalized(ReportFormat::Json);
    for format in ReportFormat::ALL {
        assert_eq!(normalized(format), reference, "{} differs from json", format);
    }
}

#[test]
fn test_every_format_has_expected_shape() {
    for format in ReportFormat::ALL {
        let report = normalized(format);

        let suites: Vec<_> = report.suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(suites, vec!["deployment", "service"], "{}", format);

        let summary = report.summary();
        assert_eq!(summary.suites, 2, "{}", format);
        assert_eq!(summary.total, 3, "{}", format);
        assert_eq!(summary.passed, 2, "{}", format);
        assert_eq!(summary.failed, 1, "{}", format);
        assert_eq!(summary.skipped, 0, "{}", format);
        assert!(!summary.is_success());
    }
}

#[test]
fn test_failure_message_survives_every_format() {
    for format in ReportFormat::ALL {
        let report = normalized(format);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1, "{}", format);

        let (suite, case) = failures[0];
        assert_eq!(suite, "deployment");
        assert_eq!(case.name, "should set replicas");
        assert_eq!(case.status, CaseStatus::Failed);
        assert_eq!(case.message.as_deref(), Some("expected 3, got 1"), "{}", format);
    }
}

#[test]
fn test_durations_are_seconds_in_every_format() {
    for format in ReportFormat::ALL {
        let report = normalized(format);
        assert_eq!(report.summary().duration, 0.875, "{}", format);
    }
}

#[test]
fn test_console_summary_agrees_with_every_format() {
    let console = parse_summary(CONSOLE).expect("console summary");
    for format in ReportFormat::ALL {
        assert!(console.matches(&normalized(format).summary()), "{}", format);
    }
}

// =============================================================================
// Cross-format Rejection
// =============================================================================

#[test]
fn test_content_is_rejected_under_wrong_tag() {
    for content_format in ReportFormat::ALL {
        for tag in ReportFormat::ALL {
            if tag == content_format {
                continue;
            }
            let result = normalize(fixture(content_format).as_bytes(), tag);
            assert!(
                result.is_err(),
                "{} content was accepted as {}",
                content_format,
                tag
            );
        }
    }
}

#[test]
fn test_truncated_reports_are_rejected() {
    for format in ReportFormat::ALL {
        let text = fixture(format);
        let truncated = &text[..text.len() / 2];
        assert!(normalize(truncated.as_bytes(), format).is_err(), "{}", format);
    }
}

#[test]
fn test_unknown_tag_is_rejected() {
    let err = "html".parse::<ReportFormat>().unwrap_err();
    assert_eq!(err, ReportError::UnknownFormat("html".to_string()));
}
