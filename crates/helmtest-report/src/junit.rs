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

//! JUnit XML reports.
//!
//! The root is either `<testsuites>` or a single `<testsuite>`. Suites may
//! nest; every `<testsuite>` that directly holds `<testcase>` elements (or
//! holds nothing at all) becomes one [`Suite`], so each case lands in exactly
//! one suite. A `<testcase>` outside any `<testsuite>` is an error. A case is
//! failed when it has a `<failure>` or `<error>` child and skipped when it has
//! a `<skipped>` child.

use crate::error::ReportResult;
use crate::format::ReportFormat;
use crate::model::{Case, CaseStatus, Report, Suite};
use crate::xml::{
    check_orphan_cases, elements, first_element, outcome_message, parse_document, parent_is,
    required_attr, seconds_attr, unexpected_root,
};
use roxmltree::Node;

const FORMAT: ReportFormat = ReportFormat::JUnit;

pub(crate) fn parse(text: &str) -> ReportResult<Report> {
    let doc = parse_document(text, FORMAT)?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "testsuites" | "testsuite" => {}
        other => return Err(unexpected_root(FORMAT, other, "<testsuites> or <testsuite>")),
    }

    let mut report = Report::default();
    for node in root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "testsuite")
    {
        let has_cases = first_element(node, "testcase").is_some();
        let is_container = first_element(node, "testsuite").is_some();
        if is_container && !has_cases {
            continue;
        }
        report.suites.push(parse_suite(node)?);
    }

    let collected = report.cases().count();
    check_orphan_cases(root, "testcase", collected, |case| parent_is(case, "testsuite"), FORMAT)?;

    Ok(report)
}

fn parse_suite(node: Node<'_, '_>) -> ReportResult<Suite> {
    let mut suite = Suite::new(required_attr(node, "name", FORMAT)?);
    for testcase in elements(node, "testcase") {
        suite.cases.push(parse_case(testcase)?);
    }
    Ok(suite)
}

fn parse_case(node: Node<'_, '_>) -> ReportResult<Case> {
    let name = required_attr(node, "name", FORMAT)?;
    let duration = seconds_attr(node, "time", FORMAT)?;

    let (status, message) = if let Some(failure) =
        first_element(node, "failure").or_else(|| first_element(node, "error"))
    {
        (CaseStatus::Failed, outcome_message(failure))
    } else if let Some(skipped) = first_element(node, "skipped") {
        (CaseStatus::Skipped, outcome_message(skipped))
    } else {
        (CaseStatus::Passed, None)
    };

    Ok(Case::new(name, status, duration).with_message(message))
}
