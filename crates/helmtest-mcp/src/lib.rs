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

//! Helmtest Model Context Protocol (MCP) Server
//!
//! This crate exposes helm chart unit testing to AI assistants over MCP
//! (JSON-RPC 2.0 on stdio). Key features:
//!
//! - **Discover suites** under a chart's `tests/` directory
//! - **Validate suites** against the helm-unittest JSON schema
//! - **Run `helm unittest`** with a timeout and normalize its report
//! - **Update snapshots** through the runner
//! - **Parse reports** in JUnit, xUnit, NUnit, JSON or TAP form
//!
//! The schema document is also published as the resource
//! `schema://helm-testsuite.json`.

mod error;
mod protocol;
mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use protocol::*;
pub use server::{McpServer, McpServerConfig};
pub use tools::{execute_tool, get_tools, ToolContext};

/// MCP Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name for MCP protocol
pub const SERVER_NAME: &str = "helmtest-mcp";

/// MCP protocol revision spoken by the server.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// URI of the test-suite schema resource.
pub const SCHEMA_RESOURCE_URI: &str = "schema://helm-testsuite.json";
