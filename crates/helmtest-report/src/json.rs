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

//! JSON reports: the serialized [`Report`] tree.

use crate::error::{ReportError, ReportResult};
use crate::model::Report;

pub(crate) fn parse(text: &str) -> ReportResult<Report> {
    let report: Report = serde_json::from_str(text).map_err(|e| ReportError::Json(e.to_string()))?;

    if let Some(case) = report
        .cases()
        .map(|(_, case)| case)
        .find(|case| !case.duration.is_finite() || case.duration < 0.0)
    {
        return Err(ReportError::Json(format!(
            "case '{}' has invalid duration {}",
            case.name, case.duration
        )));
    }

    Ok(report)
}
