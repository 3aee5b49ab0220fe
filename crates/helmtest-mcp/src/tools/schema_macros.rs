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

//! Declarative macros for JSON schema generation.
//!
//! Tool input and output schemas share a handful of shapes:
//! - String arguments (paths, globs, regex patterns)
//! - Integer parameters with bounds (timeouts)
//! - Enumerated types (report formats)
//! - String arrays (values files)
//!
//! # Examples
//!
//! ```text
//! let schema = tool_schema! {
//!     required: ["chart_path"],
//!     properties: {
//!         chart_path: path_arg!("Chart directory"),
//!         output_type: format_arg!(["junit", "xunit", "nunit"], "Report format", default: "xunit"),
//!         timeout_secs: timeout_arg!()
//!     }
//! };
//! ```

/// Generate a JSON schema object with type "string" and description.
///
/// # Usage
/// ```text
/// schema_string!("Description of the string field")
/// schema_string!("Suite file", pattern: r"\.yaml$")
/// ```
#[macro_export]
macro_rules! schema_string {
    ($description:expr) => {
        serde_json::json!({
            "type": "string",
            "description": $description
        })
    };
    ($description:expr, pattern: $pattern:expr) => {
        serde_json::json!({
            "type": "string",
            "description": $description,
            "pattern": $pattern
        })
    };
}

/// Generate a JSON schema object with type "integer" and optional constraints.
///
/// # Usage
/// ```text
/// schema_integer!("Exit code")
/// schema_integer!("Timeout", minimum: 1, maximum: 3600)
/// ```
#[macro_export]
macro_rules! schema_integer {
    ($description:expr) => {
        serde_json::json!({
            "type": "integer",
            "description": $description
        })
    };
    ($description:expr, minimum: $min:expr, maximum: $max:expr) => {
        serde_json::json!({
            "type": "integer",
            "description": $description,
            "minimum": $min,
            "maximum": $max
        })
    };
}

/// Generate a JSON schema object with string enum constraints.
///
/// # Usage
/// ```text
/// schema_enum!(["junit", "xunit"], "Report format")
/// schema_enum!(["junit", "xunit"], "Report format", default: "xunit")
/// ```
#[macro_export]
macro_rules! schema_enum {
    ([$($variant:expr),+ $(,)?], $description:expr) => {
        serde_json::json!({
            "type": "string",
            "enum": [$($variant),+],
            "description": $description
        })
    };
    ([$($variant:expr),+ $(,)?], $description:expr, default: $default:expr) => {
        serde_json::json!({
            "type": "string",
            "enum": [$($variant),+],
            "description": $description,
            "default": $default
        })
    };
}

/// Generate a JSON schema object with string array type.
///
/// # Usage
/// ```text
/// schema_string_array!("Values files")
/// ```
#[macro_export]
macro_rules! schema_string_array {
    ($description:expr) => {
        serde_json::json!({
            "type": "array",
            "items": { "type": "string" },
            "description": $description
        })
    };
}

/// Generate an object schema with properties and required fields.
///
/// Used for both tool input and tool output schemas.
///
/// # Usage
/// ```text
/// tool_schema! {
///     required: ["dir_path"],
///     properties: {
///         dir_path: path_arg!("Directory to search"),
///         pattern: pattern_arg!()
///     }
/// }
/// ```
#[macro_export]
macro_rules! tool_schema {
    (
        required: [$($req:expr),* $(,)?],
        properties: {
            $($field:ident: $schema:expr),+ $(,)?
        }
    ) => {
        serde_json::json!({
            "type": "object",
            "properties": {
                $(stringify!($field): $schema),+
            },
            "required": [$($req),*]
        })
    };
}

/// Generate schema for a path argument, resolved against the server root.
///
/// # Usage
/// ```text
/// path_arg!()
/// path_arg!("Chart directory")
/// ```
#[macro_export]
macro_rules! path_arg {
    () => {
        $crate::schema_string!("File or directory path, relative to the server root")
    };
    ($description:expr) => {
        $crate::schema_string!($description)
    };
}

/// Generate schema for the optional file-name pattern of discovery tools.
#[macro_export]
macro_rules! pattern_arg {
    () => {
        $crate::schema_string!(
            "Regular expression matched against file names from their start. Defaults to any name ending in .yaml (case-insensitive)"
        )
    };
}

/// Generate schema for a report format argument.
///
/// # Usage
/// ```text
/// format_arg!(["junit", "xunit", "nunit"])
/// format_arg!(["junit", "xunit", "nunit"], "Report format", default: "xunit")
/// ```
#[macro_export]
macro_rules! format_arg {
    ([$($variant:expr),+ $(,)?]) => {
        $crate::schema_enum!([$($variant),+], "Report format")
    };
    ([$($variant:expr),+ $(,)?], $description:expr) => {
        $crate::schema_enum!([$($variant),+], $description)
    };
    ([$($variant:expr),+ $(,)?], $description:expr, default: $default:expr) => {
        $crate::schema_enum!([$($variant),+], $description, default: $default)
    };
}

/// Generate schema for the per-run timeout argument.
#[macro_export]
macro_rules! timeout_arg {
    () => {
        $crate::schema_integer!(
            "Seconds before the runner is killed. Defaults to the server's configured timeout",
            minimum: 1,
            maximum: helmtest_runner::MAX_TIMEOUT_SECS
        )
    };
}
