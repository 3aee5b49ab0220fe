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

//! xUnit.net v2 XML reports.
//!
//! `<assemblies>` holds `<assembly>` elements, each holding `<collection>`
//! elements (one per helm-unittest suite) of `<test result="Pass|Fail|Skip">`. A `<test>` anywhere else is an error.

use crate::error::{ReportError, ReportResult};
use crate::format::ReportFormat;
use crate::model::{Case, CaseStatus, Report, Suite};
use crate::xml::{
    check_orphan_cases, elements, first_element, outcome_message, parse_document, parent_is,
    required_attr, seconds_attr, text_of, unexpected_root,
};
use roxmltree::Node;

const FORMAT: ReportFormat = ReportFormat::XUnit;

pub(crate) fn parse(text: &str) -> ReportResult<Report> {
    let doc = parse_document(text, FORMAT)?;
    let root = doc.root_element();

    let assemblies: Vec<Node<'_, '_>> = match root.tag_name().name() {
        "assemblies" => elements(root, "assembly").collect(),
        "assembly" => vec![root],
        other => return Err(unexpected_root(FORMAT, other, "<assemblies> or <assembly>")),
    };

    let mut report = Report::default();
    for assembly in assemblies {
        for collection in elements(assembly, "collection") {
            report.suites.push(parse_collection(collection)?);
        }
    }

    let collected = report.cases().count();
    check_orphan_cases(root, "test", collected, in_collection, FORMAT)?;

    Ok(report)
}

fn in_collection(test: Node<'_, '_>) -> bool {
    test.parent_element()
        .is_some_and(|parent| parent.tag_name().name() == "collection" && parent_is(parent, "assembly"))
}

fn parse_collection(node: Node<'_, '_>) -> ReportResult<Suite> {
    let mut suite = Suite::new(required_attr(node, "name", FORMAT)?);
    for test in elements(node, "test") {
        suite.cases.push(parse_test(test)?);
    }
    Ok(suite)
}

fn parse_test(node: Node<'_, '_>) -> ReportResult<Case> {
    let name = required_attr(node, "name", FORMAT)?;
    let result = required_attr(node, "result", FORMAT)?;
    let duration = seconds_attr(node, "time", FORMAT)?;

    let status = match result.trim().to_ascii_lowercase().as_str() {
        "pass" | "passed" => CaseStatus::Passed,
        "fail" | "failed" => CaseStatus::Failed,
        "skip" | "skipped" | "notrun" => CaseStatus::Skipped,
        _ => {
            return Err(ReportError::UnknownStatus {
                format: FORMAT,
                case: name.to_string(),
                value: result.to_string(),
            })
        }
    };

    let message = match status {
        CaseStatus::Failed => first_element(node, "failure").and_then(outcome_message),
        CaseStatus::Skipped => first_element(node, "reason").and_then(text_of),
        CaseStatus::Passed => None,
    };

    Ok(Case::new(name, status, duration).with_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XUNIT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<assemblies>
    <assembly name="Asm 1" total="3" passed="1" failed="1" skipped="1" errors="0" time="1.2">
        <collection name="Coll 1">
            <test name="Test 1" result="Pass" time="0.7" />
            <test name="Test 2" result="Fail" time="0.5">
                <failure>
                    <message>Error found</message>
                </failure>
            </test>
        </collection>
        <collection name="Coll 2">
            <test name="Test 3" result="Skip" time="0">
                <reason><![CDATA[not today]]></reason>
            </test>
        </collection>
    </assembly>
</assemblies>
"#;

    #[test]
    fn test_parse_xunit_collections() {
        let report = parse(XUNIT_XML).unwrap();
        assert_eq!(report.suites.len(), 2);
        assert_eq!(report.suites[0].name, "Coll 1");
        assert_eq!(report.suites[0].cases[0].status, CaseStatus::Passed);

        let failed = &report.suites[0].cases[1];
        assert_eq!(failed.status, CaseStatus::Failed);
        assert_eq!(failed.message.as_deref(), Some("Error found"));
        assert_eq!(failed.duration, 0.5);

        let skipped = &report.suites[1].cases[0];
        assert_eq!(skipped.status, CaseStatus::Skipped);
        assert_eq!(skipped.message.as_deref(), Some("not today"));
    }

    #[test]
    fn test_parse_xunit_failure_message_attribute() {
        let xml = r#"<assemblies><assembly><collection name="c">
            <test name="t" result="Fail"><failure message="Error found" /></test>
        </collection></assembly></assemblies>"#;
        let report = parse(xml).unwrap();
        assert_eq!(report.suites[0].cases[0].message.as_deref(), Some("Error found"));
    }

    #[test]
    fn test_parse_xunit_single_assembly_root() {
        let xml = r#"<assembly><collection name="c"><test name="t" result="pass"/></collection></assembly>"#;
        let report = parse(xml).unwrap();
        assert_eq!(report.summary().passed, 1);
    }

    #[test]
    fn test_parse_xunit_unknown_result() {
        let xml = r#"<assemblies><assembly><collection name="c">
            <test name="t" result="Maybe"/>
        </collection></assembly></assemblies>"#;
        let err = parse(xml).unwrap_err();
        assert!(matches!(err, ReportError::UnknownStatus { ref value, .. } if value == "Maybe"));
    }

    #[test]
    fn test_parse_xunit_missing_result() {
        let xml = r#"<assemblies><assembly><collection name="c"><test name="t"/></collection></assembly></assemblies>"#;
        let err = parse(xml).unwrap_err();
        assert!(matches!(err, ReportError::MissingAttribute { ref attribute, .. } if attribute == "result"));
    }

    #[test]
    fn test_parse_xunit_wrong_root() {
        let err = parse("<testsuites/>").unwrap_err();
        assert!(matches!(err, ReportError::Structure { .. }));
    }

    #[test]
    fn test_parse_xunit_rejects_test_outside_collection() {
        let xml = r#"<assemblies><assembly name="a">
            <collection name="c"><test name="x" result="Pass"/></collection>
            <test name="orphan" result="Fail"/>
        </assembly></assemblies>"#;
        match parse(xml).unwrap_err() {
            ReportError::Structure { message, .. } => assert!(message.contains("orphan"), "{}", message),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
