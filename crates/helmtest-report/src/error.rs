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

//! Error types for report normalization.

use crate::format::ReportFormat;
use thiserror::Error;

/// Errors that can occur while normalizing a report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// The format tag is not one of the supported formats.
    #[error("Unsupported report format '{0}' (expected one of: junit, xunit, nunit, json, tap)")]
    UnknownFormat(String),

    /// Report bytes are not valid UTF-8.
    #[error("{format} report is not valid UTF-8: {message}")]
    Utf8 {
        format: ReportFormat,
        message: String,
    },

    /// XML syntax error.
    #[error("{format} report is not well-formed XML: {message}")]
    Xml {
        format: ReportFormat,
        message: String,
    },

    /// JSON syntax or shape error.
    #[error("json report does not match the report schema: {0}")]
    Json(String),

    /// TAP stream error, with 1-based line number.
    #[error("tap report error at line {line}: {message}")]
    Tap { line: usize, message: String },

    /// Document is well-formed but does not have the expected shape.
    #[error("{format} report has unexpected structure: {message}")]
    Structure {
        format: ReportFormat,
        message: String,
    },

    /// A required attribute is missing.
    #[error("{format} report: <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        format: ReportFormat,
        element: String,
        attribute: String,
    },

    /// A numeric attribute could not be parsed.
    #[error("{format} report: attribute '{attribute}' has invalid number '{value}'")]
    InvalidNumber {
        format: ReportFormat,
        attribute: String,
        value: String,
    },

    /// A case outcome could not be mapped to passed/failed/skipped.
    #[error("{format} report: unknown result '{value}' for case '{case}'")]
    UnknownStatus {
        format: ReportFormat,
        case: String,
        value: String,
    },
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
