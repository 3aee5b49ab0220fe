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

//! NUnit XML reports.
//!
//! helm-unittest writes NUnit 2 (`<test-results>` root, cases wrapped in a
//! `<results>` element). NUnit 3 (`<test-run>` root, cases directly under
//! `<test-suite>`) is accepted as well. Suites that only group other suites
//! are skipped; every `<test-case>` lands in its nearest `<test-suite>`. A
//! `<test-case>` outside any suite is an error.
//!
//! The root `time` attribute is a wall-clock timestamp in some writers, so
//! durations are taken from the cases only.

use crate::error::{ReportError, ReportResult};
use crate::format::ReportFormat;
use crate::model::{Case, CaseStatus, Report, Suite};
use crate::xml::{
    check_orphan_cases, elements, first_element, outcome_message, parse_document, parent_is,
    required_attr, seconds_attr, unexpected_root,
};
use roxmltree::Node;

const FORMAT: ReportFormat = ReportFormat::NUnit;

pub(crate) fn parse(text: &str) -> ReportResult<Report> {
    let doc = parse_document(text, FORMAT)?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "test-results" | "test-run" => {}
        other => return Err(unexpected_root(FORMAT, other, "<test-results> or <test-run>")),
    }

    let mut report = Report::default();
    for node in root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "test-suite")
    {
        let cases: Vec<Node<'_, '_>> = case_nodes(node).collect();
        if cases.is_empty() && has_child_suites(node) {
            continue;
        }

        let mut suite = Suite::new(required_attr(node, "name", FORMAT)?);
        for case in cases {
            suite.cases.push(parse_case(case)?);
        }
        report.suites.push(suite);
    }

    let collected = report.cases().count();
    check_orphan_cases(root, "test-case", collected, in_suite, FORMAT)?;

    Ok(report)
}

fn in_suite(case: Node<'_, '_>) -> bool {
    match case.parent_element() {
        Some(parent) if parent.tag_name().name() == "test-suite" => true,
        Some(parent) if parent.tag_name().name() == "results" => parent_is(parent, "test-suite"),
        _ => false,
    }
}

/// `<test-case>` children, directly or via `<results>`.
fn case_nodes<'a, 'input: 'a>(suite: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    let wrapped = first_element(suite, "results")
        .into_iter()
        .flat_map(|results| elements(results, "test-case"));
    elements(suite, "test-case").chain(wrapped)
}

fn has_child_suites(suite: Node<'_, '_>) -> bool {
    first_element(suite, "test-suite").is_some()
        || first_element(suite, "results")
            .map(|results| first_element(results, "test-suite").is_some())
            .unwrap_or(false)
}

fn parse_case(node: Node<'_, '_>) -> ReportResult<Case> {
    let name = required_attr(node, "name", FORMAT)?;
    let duration = seconds_attr(node, "time", FORMAT)?;

    let status = match node.attribute("result") {
        Some(result) => map_result(name, result)?,
        None if node.attribute("executed").is_some_and(|v| v.eq_ignore_ascii_case("false")) => {
            CaseStatus::Skipped
        }
        None => {
            return Err(ReportError::MissingAttribute {
                format: FORMAT,
                element: "test-case".to_string(),
                attribute: "result".to_string(),
            })
        }
    };

    let message = match status {
        CaseStatus::Failed => first_element(node, "failure").and_then(outcome_message),
        CaseStatus::Skipped => first_element(node, "reason").and_then(outcome_message),
        CaseStatus::Passed => None,
    };

    Ok(Case::new(name, status, duration).with_message(message))
}

fn map_result(case: &str, result: &str) -> ReportResult<CaseStatus> {
    let lowered = result.trim().to_ascii_lowercase();
    let status = if lowered.contains("success") || lowered.contains("pass") {
        CaseStatus::Passed
    } else if lowered.contains("fail")
        || lowered.contains("error")
        || lowered.contains("notrunnable")
        || lowered.contains("cancel")
    {
        CaseStatus::Failed
    } else if lowered.contains("skip")
        || lowered.contains("ignore")
        || lowered.contains("inconclusive")
        || lowered.contains("notrun")
    {
        CaseStatus::Skipped
    } else {
        return Err(ReportError::UnknownStatus {
            format: FORMAT,
            case: case.to_string(),
            value: result.to_string(),
        });
    };
    Ok(status)
}
