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
//! Helmtest runner
//!
//! The filesystem and subprocess side of helm chart unit testing:
//!
//! - [`TestDiscovery`] finds suite files under a directory
//! - [`load_suite`] reads one suite file into a [`SuiteDefinition`]
//! - [`TestSuiteSchema`] validates suite files against the helm-unittest schema
//! - [`TestExecutor`] runs `helm unittest` and normalizes its report
//!
//! # Examples
//!
//! ```rust,no_run
//! use helmtest_runner::{RunRequest, TestExecutor};
//!
//! let executor = TestExecutor::default();
//! let result = executor.run(&RunRequest::new("charts/app", "tests/*_test.yaml"))?;
//! println!("{} of {} passed", result.summary().passed, result.summary().total);
//! # Ok::<(), helmtest_runner::RunnerError>(())
//! ```

mod discovery;
mod error;
mod executor;
mod schema;

pub use discovery::{load_suite, SuiteDefinition, TestDiscovery, TestFile, DEFAULT_PATTERN};
pub use error::{RunnerError, RunnerResult};
pub use executor::{
    ExecutionResult, RunRequest, RunnerConfig, TestExecutor, DEFAULT_HELM_BIN,
    DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS,
};
pub use schema::{dotted_path, SchemaError, TestSuiteSchema, ValidationResult};
