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

//! Helmtest report normalization
//!
//! Turns the machine-readable reports emitted by `helm unittest` (and a couple
//! of companion formats) into a single result tree: a [`Report`] holds ordered
//! [`Suite`]s, each holding ordered [`Case`]s with a [`CaseStatus`], an optional
//! failure message and a duration.
//!
//! # Supported Formats
//!
//! | Tag     | Family         | Shape                                                   |
//! |---------|----------------|---------------------------------------------------------|
//! | `junit` | XML            | `<testsuites>` / `<testsuite>` / `<testcase>`            |
//! | `xunit` | XML            | `<assemblies>` / `<assembly>` / `<collection>` / `<test>` |
//! | `nunit` | XML            | `<test-results>` / `<test-suite>` / `<results>` / `<test-case>` |
//! | `json`  | JSON           | the serialized [`Report`] itself                         |
//! | `tap`   | line-oriented  | TAP 13/14, one `# Subtest:` block per suite              |
//!
//! Suites and cases keep the order in which the producing tool reported them.
//! Content that does not have the shape its tag promises is rejected with a
//! [`ReportError`]; nothing is silently dropped.
//!
//! # Examples
//!
//! ```rust
//! use helmtest_report::{normalize, CaseStatus, ReportFormat};
//!
//! let xml = r#"<testsuites>
//!   <testsuite name="deployment">
//!     <testcase name="renders" time="0.01"/>
//!     <testcase name="sets replicas" time="0.02">
//!       <failure message="expected 3, got 1"/>
//!     </testcase>
//!   </testsuite>
//! </testsuites>"#;
//!
//! let report = normalize(xml.as_bytes(), ReportFormat::JUnit).unwrap();
//! let summary = report.summary();
//! assert_eq!(summary.total, 2);
//! assert_eq!(summary.failed, 1);
//! assert_eq!(report.suites[0].cases[1].status, CaseStatus::Failed);
//! ```

pub mod console;
mod error;
mod format;
mod json;
mod junit;
mod model;
mod nunit;
mod tap;
mod xml;
mod xunit;

pub use console::{parse_summary, RunnerCounts, RunnerSummary};
pub use error::{ReportError, ReportResult};
pub use format::ReportFormat;
pub use model::{Case, CaseStatus, Report, Suite, Summary};

/// Parse raw report bytes in the given format into a [`Report`].
///
/// # Errors
///
/// Returns a [`ReportError`] when the bytes are not valid UTF-8 or do not
/// match the structure expected for `format`.
pub fn normalize(bytes: &[u8], format: ReportFormat) -> ReportResult<Report> {
    let text = std::str::from_utf8(bytes).map_err(|e| ReportError::Utf8 {
        format,
        message: e.to_string(),
    })?;

    match format {
        ReportFormat::JUnit => junit::parse(text),
        ReportFormat::XUnit => xunit::parse(text),
        ReportFormat::NUnit => nunit::parse(text),
        ReportFormat::Json => json::parse(text),
        ReportFormat::Tap => tap::parse(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rejects_invalid_utf8() {
        let bytes = [0x3c, 0xff, 0xfe, 0x3e];
        let err = normalize(&bytes, ReportFormat::XUnit).unwrap_err();
        assert!(matches!(err, ReportError::Utf8 { format: ReportFormat::XUnit, .. }));
    }

    #[test]
    fn test_normalize_dispatches_on_tag() {
        // Valid JUnit is not valid xUnit.
        let xml = r#"<testsuite name="s"><testcase name="c"/></testsuite>"#;
        assert!(normalize(xml.as_bytes(), ReportFormat::JUnit).is_ok());
        assert!(normalize(xml.as_bytes(), ReportFormat::XUnit).is_err());
    }
}
