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

//! MCP Server implementation.

use crate::error::{McpError, McpResult};
use crate::protocol::*;
use crate::tools::{error_result, execute_tool, get_tools, ToolContext};
use crate::{PROTOCOL_VERSION, SCHEMA_RESOURCE_URI, SERVER_NAME, VERSION};
use helmtest_runner::{RunnerConfig, TestSuiteSchema};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader as AsyncBufReader};
use tracing::{debug, error, info, warn};

const SCHEMA_MIME_TYPE: &str = "application/schema+json";

const INSTRUCTIONS: &str = "Helm chart unit testing. Use get_tests to find suite files, \
validate_schema or validate_tests before running, then run_unittest with the chart path \
and a suite glob relative to the chart. Paths are relative to the server root.";

/// MCP Server configuration.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Root path for file operations.
    ///
    /// Every path argument is resolved against this directory; paths that
    /// resolve outside it are rejected.
    pub root_path: PathBuf,

    /// Server name reported in protocol handshake.
    pub name: String,

    /// Server version reported in protocol handshake.
    pub version: String,

    /// Runner binary and default timeout.
    pub runner: RunnerConfig,

    /// Test-suite schema; the bundled document when `None`.
    pub schema: Option<Arc<TestSuiteSchema>>,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            root_path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            name: SERVER_NAME.to_string(),
            version: VERSION.to_string(),
            runner: RunnerConfig::default(),
            schema: None,
        }
    }
}

/// Helm unit test MCP Server.
///
/// Implements the Model Context Protocol over stdio: JSON-RPC 2.0, one
/// message per line. Requests are handled one at a time; each tool call runs
/// to completion before the next line is read.
pub struct McpServer {
    config: McpServerConfig,

    /// Set by `initialize`, cleared by `shutdown`. `tools/call` is refused
    /// while unset.
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use helmtest_mcp::{McpServer, McpServerConfig};
    /// use std::path::PathBuf;
    ///
    /// let config = McpServerConfig {
    ///     root_path: PathBuf::from("/srv/charts"),
    ///     ..Default::default()
    /// };
    /// let server = McpServer::new(config);
    /// assert!(!server.is_initialized());
    /// ```
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config,
            initialized: false,
        }
    }

    /// Create a new MCP server with default config and specified root path.
    pub fn with_root(root_path: PathBuf) -> Self {
        Self::new(McpServerConfig {
            root_path,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn schema(&self) -> McpResult<&TestSuiteSchema> {
        match &self.config.schema {
            Some(schema) => Ok(schema.as_ref()),
            None => Ok(TestSuiteSchema::bundled()?),
        }
    }

    /// Run the server using stdio transport (synchronous).
    ///
    /// Runs until stdin is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading stdin or writing stdout fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use helmtest_mcp::{McpServer, McpServerConfig};
    ///
    /// let mut server = McpServer::new(McpServerConfig::default());
    /// server.run_stdio().expect("Server failed");
    /// ```
    pub fn run_stdio(&mut self) -> McpResult<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let reader = BufReader::new(stdin.lock());

        info!(
            "Helmtest MCP Server starting on stdio (root: {})",
            self.config.root_path.display()
        );

        for line in reader.lines() {
            let line = line?;
            if let Some(response) = self.handle_line(&line)? {
                writeln!(stdout, "{}", response)?;
                stdout.flush()?;
            }
        }

        info!("stdin closed, stopping");
        Ok(())
    }

    /// Run the server using stdio transport (asynchronous).
    ///
    /// # Errors
    ///
    /// Returns an error if writing stdout fails. A failed read ends the loop.
    pub async fn run_stdio_async(&mut self) -> McpResult<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = AsyncBufReader::new(stdin);

        info!(
            "Helmtest MCP Server starting on stdio (async, root: {})",
            self.config.root_path.display()
        );

        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line)? {
                        stdout.write_all(response.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                    }
                }
                Err(e) => {
                    error!("Read error: {}", e);
                    break;
                }
            }
        }

        info!("stdin closed, stopping");
        Ok(())
    }

    /// Handle one line of input, returning the serialized response if any.
    ///
    /// Blank lines and notifications produce no response. Malformed JSON is
    /// answered with a parse error (-32700) and a null id; well-formed JSON
    /// that is not a request gets -32600.
    pub fn handle_line(&mut self, line: &str) -> McpResult<Option<String>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        debug!("Received: {}", line);

        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => Some(JsonRpcResponse::error(
                None,
                -32700,
                format!("Parse error: {}", e),
                None,
            )),
            Ok(message) => {
                let id = message.get("id").cloned();
                match serde_json::from_value::<JsonRpcRequest>(message) {
                    Ok(request) => self.handle_request(request),
                    Err(e) => {
                        let e = McpError::InvalidRequest(e.to_string());
                        Some(JsonRpcResponse::error(id, e.code(), e.to_string(), None))
                    }
                }
            }
        };

        match response {
            Some(response) => {
                let text = serde_json::to_string(&response)?;
                debug!("Sending: {}", text);
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// Handle a single JSON-RPC message.
    ///
    /// # Supported Methods
    ///
    /// - `initialize` - Protocol handshake
    /// - `notifications/initialized` (and legacy `initialized`) - handshake completion
    /// - `ping` - Health check
    /// - `tools/list` - List the test tools
    /// - `tools/call` - Execute a tool (after `initialize`)
    /// - `resources/list` - List the schema resource
    /// - `resources/read` - Read the schema document
    /// - `shutdown` - Reset lifecycle state
    ///
    /// Returns `None` for notifications. Unknown methods get -32601.
    pub fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            let e = McpError::InvalidRequest(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            ));
            return request
                .id
                .map(|id| JsonRpcResponse::error(Some(id), e.code(), e.to_string(), None));
        }

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "shutdown" => self.handle_shutdown(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" if !self.initialized => {
                let e = McpError::InvalidRequest("server not initialized".to_string());
                warn!("Refusing tools/call: {}", e);
                JsonRpcResponse::error(id, e.code(), e.to_string(), None)
            }
            "tools/call" => self.handle_tools_call(id, request.params),
            "resources/list" => self.handle_resources_list(id),
            "resources/read" => self.handle_resources_read(id, request.params),
            method => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::error(id, -32601, format!("Method not found: {}", method), None)
            }
        };
        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                info!("Client sent initialized notification");
            }
            "notifications/cancelled" => debug!("Client cancelled a request"),
            other => debug!("Ignoring notification: {}", other),
        }
    }

    fn handle_initialize(&mut self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return JsonRpcResponse::error(id, -32602, message, None),
        };

        if params.protocol_version != PROTOCOL_VERSION {
            debug!(
                "Client requested protocol {}, answering with {}",
                params.protocol_version, PROTOCOL_VERSION
            );
        }

        self.initialized = true;
        info!(
            "Server initialized for {} {}",
            params.client_info.name, params.client_info.version
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                resources: Some(ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        success(id, &result)
    }

    fn handle_shutdown(&mut self, id: Option<Value>) -> JsonRpcResponse {
        info!("Server shutting down");
        self.initialized = false;
        JsonRpcResponse::success(id, json!({}))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        success(id, &ListToolsResult { tools: get_tools() })
    }

    /// Execute a tool. Failures other than an unknown tool name become
    /// `isError` results rather than JSON-RPC errors.
    fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return JsonRpcResponse::error(id, -32602, message, None),
        };

        info!("Calling tool {}", params.name);
        let outcome = self.schema().and_then(|schema| {
            let ctx = ToolContext {
                root: &self.config.root_path,
                runner: &self.config.runner,
                schema,
            };
            execute_tool(&params.name, params.arguments, &ctx)
        });

        match outcome {
            Ok(result) => success(id, &result),
            Err(e @ McpError::ToolNotFound(_)) => {
                warn!("{}", e);
                JsonRpcResponse::error(id, e.code(), e.to_string(), None)
            }
            Err(e) => {
                warn!("Tool {} failed: {}", params.name, e);
                success(id, &error_result(&e))
            }
        }
    }

    fn handle_resources_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let resources = vec![Resource {
            uri: SCHEMA_RESOURCE_URI.to_string(),
            name: "helm-testsuite.json".to_string(),
            description: Some("JSON schema for helm-unittest suite files".to_string()),
            mime_type: Some(SCHEMA_MIME_TYPE.to_string()),
        }];
        success(id, &ListResourcesResult { resources })
    }

    fn handle_resources_read(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ReadResourceParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return JsonRpcResponse::error(id, -32602, message, None),
        };

        if params.uri != SCHEMA_RESOURCE_URI {
            let e = McpError::ResourceNotFound(params.uri);
            return JsonRpcResponse::error(id, e.code(), e.to_string(), None);
        }

        let text = self
            .schema()
            .and_then(|schema| serde_json::to_string_pretty(schema.document()).map_err(McpError::from));
        match text {
            Ok(text) => success(
                id,
                &ReadResourceResult {
                    contents: vec![ResourceContent {
                        uri: params.uri,
                        mime_type: Some(SCHEMA_MIME_TYPE.to_string()),
                        text: Some(text),
                    }],
                },
            ),
            Err(e) => JsonRpcResponse::error(id, e.code(), e.to_string(), None),
        }
    }
}

/// Deserialize request params, or describe why they are unusable.
fn parse_params<T: for<'de> serde::Deserialize<'de>>(params: Option<Value>) -> Result<T, String> {
    match params {
        Some(p) => serde_json::from_value(p).map_err(|e| format!("Invalid params: {}", e)),
        None => Err("Missing params".to_string()),
    }
}

/// Build a success response, or an internal error if the result cannot be serialized.
fn success<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!("Failed to serialize result: {}", e);
            JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e), None)
        }
    }
}
