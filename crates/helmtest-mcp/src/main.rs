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

//! Helmtest MCP Server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve the current directory
//! helmtest-mcp
//!
//! # Serve a chart repository with a specific helm binary
//! helmtest-mcp --root /path/to/charts --helm-bin /usr/local/bin/helm
//!
//! # Run with debug logging
//! RUST_LOG=debug helmtest-mcp
//! ```
//!
//! # Available Tools
//!
//! - `get_tests`: Discover suite files and load their definitions
//! - `get_test_from_file`: Load one suite definition
//! - `validate_schema`: Validate one suite file
//! - `validate_tests`: Validate every suite file under a directory
//! - `run_unittest`: Run `helm unittest` and normalize the report
//! - `update_snapshot`: Run `helm unittest -u`
//! - `parse_report`: Normalize an existing report file

use clap::{ArgAction, Parser};
use helmtest_mcp::{McpServer, McpServerConfig};
use helmtest_runner::{RunnerConfig, TestSuiteSchema, DEFAULT_HELM_BIN, DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVE: &str = "helmtest_mcp=info,helmtest_runner=info";

#[derive(Parser)]
#[command(name = "helmtest-mcp")]
#[command(author = "Dweve B.V.")]
#[command(version)]
#[command(about = "Helm chart unit testing Model Context Protocol (MCP) Server for AI/LLM integration")]
struct Cli {
    /// Root directory for file operations
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// helm executable used to run `helm unittest`
    #[arg(long, env = "HELMTEST_HELM_BIN", default_value = DEFAULT_HELM_BIN)]
    helm_bin: PathBuf,

    /// Default runner timeout in seconds
    #[arg(
        long,
        env = "HELMTEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)
    )]
    timeout_secs: u64,

    /// Test-suite JSON schema to use instead of the bundled one
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Use async runtime
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    r#async: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVE))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let schema = match &cli.schema {
        Some(path) => {
            let schema = TestSuiteSchema::from_path(path)?;
            info!("Using test-suite schema {}", schema.origin());
            Some(Arc::new(schema))
        }
        None => None,
    };

    let config = McpServerConfig {
        root_path: cli.root.canonicalize().unwrap_or(cli.root),
        runner: RunnerConfig {
            helm_bin: cli.helm_bin,
            default_timeout: Duration::from_secs(cli.timeout_secs),
        },
        schema,
        ..Default::default()
    };

    let mut server = McpServer::new(config);

    if cli.r#async {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(server.run_stdio_async())?;
    } else {
        server.run_stdio()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_secs_in_range() {
        let cli = Cli::try_parse_from(["helmtest-mcp", "--timeout-secs", "30"]).unwrap();
        assert_eq!(cli.timeout_secs, 30);

        let cli = Cli::try_parse_from(["helmtest-mcp", "--timeout-secs", "3600"]).unwrap();
        assert_eq!(cli.timeout_secs, MAX_TIMEOUT_SECS);
    }

    #[test]
    fn test_timeout_secs_out_of_range() {
        assert!(Cli::try_parse_from(["helmtest-mcp", "--timeout-secs", "0"]).is_err());
        assert!(Cli::try_parse_from(["helmtest-mcp", "--timeout-secs", "3601"]).is_err());
        assert!(Cli::try_parse_from(["helmtest-mcp", "--timeout-secs", "-5"]).is_err());
    }
}
