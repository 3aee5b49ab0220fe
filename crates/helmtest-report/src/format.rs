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

//! Report format tags.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// JUnit XML.
    JUnit,
    /// xUnit.net v2 XML.
    XUnit,
    /// NUnit 2 XML (NUnit 3 `test-run` roots are accepted too).
    NUnit,
    /// Serialized [`Report`](crate::Report).
    Json,
    /// Test Anything Protocol, one subtest per suite.
    Tap,
}

impl ReportFormat {
    /// All formats, in tag order.
    pub const ALL: [ReportFormat; 5] = [
        ReportFormat::JUnit,
        ReportFormat::XUnit,
        ReportFormat::NUnit,
        ReportFormat::Json,
        ReportFormat::Tap,
    ];

    /// Formats that `helm unittest -t` can write.
    pub const RUNNER: [ReportFormat; 3] =
        [ReportFormat::JUnit, ReportFormat::XUnit, ReportFormat::NUnit];

    /// The lowercase tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::JUnit => "junit",
            ReportFormat::XUnit => "xunit",
            ReportFormat::NUnit => "nunit",
            ReportFormat::Json => "json",
            ReportFormat::Tap => "tap",
        }
    }

    /// Whether the runner can produce this format.
    pub fn is_runner_output(self) -> bool {
        Self::RUNNER.contains(&self)
    }

    /// File extension used for report files of this format.
    pub fn file_extension(self) -> &'static str {
        match self {
            ReportFormat::JUnit | ReportFormat::XUnit | ReportFormat::NUnit => "xml",
            ReportFormat::Json => "json",
            ReportFormat::Tap => "tap",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junit" => Ok(ReportFormat::JUnit),
            "xunit" => Ok(ReportFormat::XUnit),
            "nunit" => Ok(ReportFormat::NUnit),
            "json" => Ok(ReportFormat::Json),
            "tap" => Ok(ReportFormat::Tap),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}
