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

//! DOM helpers shared by the XML dialects.

use crate::error::{ReportError, ReportResult};
use crate::format::ReportFormat;
use roxmltree::{Document, Node};

pub(crate) fn parse_document(text: &str, format: ReportFormat) -> ReportResult<Document<'_>> {
    Document::parse(text).map_err(|e| ReportError::Xml {
        format,
        message: e.to_string(),
    })
}

/// Element children with the given local name.
pub(crate) fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

pub(crate) fn first_element<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Option<Node<'a, 'input>> {
    elements(node, name).next()
}

pub(crate) fn required_attr<'a>(
    node: Node<'a, '_>,
    attribute: &str,
    format: ReportFormat,
) -> ReportResult<&'a str> {
    node.attribute(attribute)
        .ok_or_else(|| ReportError::MissingAttribute {
            format,
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

/// Duration attribute in seconds; absent means zero.
pub(crate) fn seconds_attr(node: Node<'_, '_>, attribute: &str, format: ReportFormat) -> ReportResult<f64> {
    match node.attribute(attribute) {
        None => Ok(0.0),
        Some(raw) if raw.trim().is_empty() => Ok(0.0),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| ReportError::InvalidNumber {
                format,
                attribute: attribute.to_string(),
                value: raw.to_string(),
            }),
    }
}

/// Trimmed text content, `None` when blank.
pub(crate) fn text_of(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    non_blank(&text)
}

pub(crate) fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Message of a `<failure>`-like element: `message` attribute, then a
/// `<message>` child, then the element's own text.
pub(crate) fn outcome_message(node: Node<'_, '_>) -> Option<String> {
    node.attribute("message")
        .and_then(non_blank)
        .or_else(|| first_element(node, "message").and_then(text_of))
        .or_else(|| text_of(node))
}

pub(crate) fn unexpected_root(format: ReportFormat, found: &str, expected: &str) -> ReportError {
    ReportError::Structure {
        format,
        message: format!("root element <{}> is not {}", found, expected),
    }
}

/// Fail when the document holds `case` elements the suite walk did not
/// collect. `in_suite` tells whether a case element sits where the dialect
/// reads cases from; the first one that does not is named in the error.
pub(crate) fn check_orphan_cases(
    root: Node<'_, '_>,
    case: &'static str,
    collected: usize,
    in_suite: impl Fn(Node<'_, '_>) -> bool,
    format: ReportFormat,
) -> ReportResult<()> {
    let found: Vec<Node<'_, '_>> = root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == case)
        .collect();
    if found.len() <= collected {
        return Ok(());
    }

    let orphan = found.iter().find(|n| !in_suite(**n)).or(found.last());
    let label = match orphan.and_then(|n| n.attribute("name")) {
        Some(name) => format!("<{} name=\"{}\">", case, name),
        None => format!("<{}>", case),
    };
    Err(ReportError::Structure {
        format,
        message: format!(
            "{} is not inside a suite ({} of {} <{}> elements not collected)",
            label,
            found.len() - collected,
            found.len(),
            case
        ),
    })
}

/// Whether the parent element has the given local name.
pub(crate) fn parent_is(node: Node<'_, '_>, name: &str) -> bool {
    node.parent_element()
        .is_some_and(|parent| parent.tag_name().name() == name)
}
