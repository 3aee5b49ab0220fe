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

//! Normalized result tree.

use serde::{Deserialize, Serialize};

/// Outcome of a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
            CaseStatus::Skipped => "skipped",
        }
    }
}

/// A single test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub name: String,
    pub status: CaseStatus,
    /// Failure (or skip) message as reported, trimmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

impl Case {
    pub fn new(name: impl Into<String>, status: CaseStatus, duration: f64) -> Self {
        Self {
            name: name.into(),
            status,
            message: None,
            duration,
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }
}

/// A named group of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suite {
    pub name: String,
    #[serde(default)]
    pub cases: Vec<Case>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }
}

/// The normalized report: suites in reported order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Report {
    pub suites: Vec<Suite>,
}

/// Counts derived from a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub suites: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Sum of case durations, in seconds.
    pub duration: f64,
}

impl Summary {
    /// Whether no case failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl Report {
    /// Iterate over every case together with the name of its suite.
    pub fn cases(&self) -> impl Iterator<Item = (&str, &Case)> {
        self.suites
            .iter()
            .flat_map(|suite| suite.cases.iter().map(move |case| (suite.name.as_str(), case)))
    }

    /// Cases that failed, in report order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Case)> {
        self.cases()
            .filter(|(_, case)| case.status == CaseStatus::Failed)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            suites: self.suites.len(),
            ..Summary::default()
        };

        for (_, case) in self.cases() {
            summary.total += 1;
            summary.duration += case.duration;
            match case.status {
                CaseStatus::Passed => summary.passed += 1,
                CaseStatus::Failed => summary.failed += 1,
                CaseStatus::Skipped => summary.skipped += 1,
            }
        }

        summary
    }
}
