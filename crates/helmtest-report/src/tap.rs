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

//! TAP (Test Anything Protocol) reports.
//!
//! Each suite is a TAP 14 subtest: a `# Subtest: <suite>` comment, an
//! indented body with one test point per case, and a top-level test point
//! closing it.
//!
//! ```text
//! TAP version 14
//! 1..2
//! # Subtest: deployment
//!     1..2
//!     ok 1 - should render deployment
//!     not ok 2 - should set replicas
//!       ---
//!       message: expected 3, got 1
//!       duration_ms: 500
//!       ...
//! not ok 1 - deployment
//! # Subtest: service
//!     1..1
//!     ok 1 - should expose port # SKIP no ingress
//! ok 2 - service
//! ```
//!
//! `# SKIP` and `# TODO` directives map to skipped cases. YAML diagnostic
//! blocks may carry `message` and `duration_ms`. Plans, when present, must
//! match the number of test points. Indentation is spaces only; a tab in it
//! is an error.

use crate::error::{ReportError, ReportResult};
use crate::model::{Case, CaseStatus, Report, Suite};
use serde::Deserialize;

const BODY_INDENT: usize = 4;

#[derive(Debug, Default, Deserialize)]
struct Diagnostics {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    duration_ms: Option<f64>,
}

#[derive(Debug, PartialEq)]
enum Directive {
    Skip(Option<String>),
    Todo(Option<String>),
}

#[derive(Debug, PartialEq)]
struct TestPoint {
    ok: bool,
    description: String,
    directive: Option<Directive>,
}

/// Open `# Subtest:` block.
struct OpenSuite {
    suite: Suite,
    plan: Option<usize>,
    opened_at: usize,
}

/// YAML diagnostic block being collected.
struct YamlBlock {
    start: usize,
    indent: usize,
    lines: Vec<String>,
    /// Whether the block belongs to a case (top-level blocks are ignored).
    for_case: bool,
}

pub(crate) fn parse(text: &str) -> ReportResult<Report> {
    let mut report = Report::default();
    let mut open: Option<OpenSuite> = None;
    let mut yaml: Option<YamlBlock> = None;
    let mut plan: Option<usize> = None;
    let mut top_level_points = 0usize;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r');

        if let Some(block) = yaml.as_mut() {
            if line.trim() == "..." {
                let block = yaml.take().ok_or_else(|| tap_error(line_no, "unexpected end of YAML block"))?;
                if block.for_case {
                    apply_diagnostics(&mut open, block)?;
                }
            } else {
                block.lines.push(dedent(line, block.indent).to_string());
            }
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        if line.trim_start_matches(' ').starts_with('\t') {
            return Err(tap_error(line_no, "tab indentation is not supported"));
        }
        let indent = line.len() - line.trim_start_matches(' ').len();
        let content = line.trim();

        if content.starts_with("Bail out!") {
            return Err(tap_error(line_no, content));
        }

        if indent >= BODY_INDENT {
            let current = open
                .as_mut()
                .ok_or_else(|| tap_error(line_no, "indented line outside of a subtest"))?;

            if content == "---" {
                if current.suite.cases.is_empty() {
                    return Err(tap_error(line_no, "YAML block without a preceding test point"));
                }
                yaml = Some(YamlBlock {
                    start: line_no,
                    indent,
                    lines: Vec::new(),
                    for_case: true,
                });
            } else if let Some(count) = parse_plan(content) {
                current.plan = Some(count);
            } else if content.starts_with("# Subtest") {
                return Err(tap_error(line_no, "nested subtests are not supported"));
            } else if content.starts_with('#') {
                // comment
            } else if let Some(point) = parse_point(content) {
                current.suite.cases.push(case_from_point(point, line_no)?);
            } else {
                return Err(tap_error(line_no, &format!("unrecognized line '{}'", content)));
            }
            continue;
        }

        if indent > 0 {
            if content == "---" {
                yaml = Some(YamlBlock {
                    start: line_no,
                    indent,
                    lines: Vec::new(),
                    for_case: false,
                });
                continue;
            }
            return Err(tap_error(line_no, &format!("unexpected indentation for '{}'", content)));
        }

        if content.starts_with("TAP version") {
            continue;
        } else if let Some(count) = parse_plan(content) {
            plan = Some(count);
        } else if let Some(name) = content.strip_prefix("# Subtest:") {
            if let Some(unclosed) = open.as_ref() {
                return Err(tap_error(
                    line_no,
                    &format!("subtest '{}' was never closed", unclosed.suite.name),
                ));
            }
            let name = name.trim();
            if name.is_empty() {
                return Err(tap_error(line_no, "subtest without a name"));
            }
            open = Some(OpenSuite {
                suite: Suite::new(name),
                plan: None,
                opened_at: line_no,
            });
        } else if content.starts_with('#') {
            // comment
        } else if parse_point(content).is_some() {
            let closed = open
                .take()
                .ok_or_else(|| tap_error(line_no, "test point outside of a subtest"))?;
            check_suite_plan(&closed, line_no)?;
            report.suites.push(closed.suite);
            top_level_points += 1;
        } else {
            return Err(tap_error(line_no, &format!("unrecognized line '{}'", content)));
        }
    }

    let last_line = text.lines().count();
    if let Some(block) = yaml {
        return Err(tap_error(block.start, "YAML block is not terminated with '...'"));
    }
    if let Some(unclosed) = open {
        return Err(tap_error(
            unclosed.opened_at,
            &format!("subtest '{}' was never closed", unclosed.suite.name),
        ));
    }
    if let Some(expected) = plan {
        if expected != top_level_points {
            return Err(tap_error(
                last_line,
                &format!("plan expects {} suites, found {}", expected, top_level_points),
            ));
        }
    }

    Ok(report)
}

fn tap_error(line: usize, message: &str) -> ReportError {
    ReportError::Tap {
        line,
        message: message.to_string(),
    }
}

fn check_suite_plan(open: &OpenSuite, line_no: usize) -> ReportResult<()> {
    match open.plan {
        Some(expected) if expected != open.suite.cases.len() => Err(tap_error(
            line_no,
            &format!(
                "subtest '{}' plans {} cases, found {}",
                open.suite.name,
                expected,
                open.suite.cases.len()
            ),
        )),
        _ => Ok(()),
    }
}

fn dedent(line: &str, indent: usize) -> &str {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    &line[spaces.min(indent)..]
}

fn apply_diagnostics(open: &mut Option<OpenSuite>, block: YamlBlock) -> ReportResult<()> {
    let diagnostics: Diagnostics = if block.lines.iter().all(|l| l.trim().is_empty()) {
        Diagnostics::default()
    } else {
        serde_yaml::from_str(&block.lines.join("\n"))
            .map_err(|e| tap_error(block.start, &format!("invalid YAML diagnostics: {}", e)))?
    };

    let case = open
        .as_mut()
        .and_then(|o| o.suite.cases.last_mut())
        .ok_or_else(|| tap_error(block.start, "YAML block without a preceding test point"))?;

    if let Some(ms) = diagnostics.duration_ms {
        if !ms.is_finite() || ms < 0.0 {
            return Err(tap_error(block.start, &format!("invalid duration_ms {}", ms)));
        }
        case.duration = ms / 1000.0;
    }
    if let Some(message) = diagnostics.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        case.message = Some(message.to_string());
    }
    Ok(())
}

fn case_from_point(point: TestPoint, line_no: usize) -> ReportResult<Case> {
    if point.description.is_empty() {
        return Err(tap_error(line_no, "test point without a description"));
    }

    let (status, message) = match point.directive {
        Some(Directive::Skip(reason)) | Some(Directive::Todo(reason)) => (CaseStatus::Skipped, reason),
        None if point.ok => (CaseStatus::Passed, None),
        None => (CaseStatus::Failed, None),
    };

    Ok(Case::new(point.description, status, 0.0).with_message(message))
}

fn parse_plan(content: &str) -> Option<usize> {
    let rest = content.strip_prefix("1..")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let tail = rest[digits.len()..].trim_start();
    if !tail.is_empty() && !tail.starts_with('#') {
        return None;
    }
    digits.parse().ok()
}

fn parse_point(content: &str) -> Option<TestPoint> {
    let (ok, rest) = if let Some(rest) = content.strip_prefix("not ok") {
        (false, rest)
    } else if let Some(rest) = content.strip_prefix("ok") {
        (true, rest)
    } else {
        return None;
    };

    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }

    let rest = rest.trim_start();
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit()).trim_start();
    let rest = rest.strip_prefix("- ").unwrap_or(rest);

    let (description, directive) = split_directive(rest);
    Some(TestPoint {
        ok,
        description,
        directive,
    })
}

/// Split `description # DIRECTIVE reason` on the first unescaped `#`.
fn split_directive(text: &str) -> (String, Option<Directive>) {
    let mut description = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        match c {
            '\\' if chars.peek().map(|(_, next)| *next) == Some('#') => {
                description.push('#');
                chars.next();
            }
            '#' => {
                let directive = parse_directive(text[index + 1..].trim());
                return (description.trim().to_string(), directive);
            }
            _ => description.push(c),
        }
    }

    (description.trim().to_string(), None)
}

fn parse_directive(text: &str) -> Option<Directive> {
    let keyword: String = text.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let reason = text[keyword.len()..].trim();
    let reason = if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    };

    match keyword.to_ascii_lowercase().as_str() {
        "skip" | "skipped" => Some(Directive::Skip(reason)),
        "todo" => Some(Directive::Todo(reason)),
        _ => None,
    }
}
