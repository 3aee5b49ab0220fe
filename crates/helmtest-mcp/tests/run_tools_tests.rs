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

//! `run_unittest` and `update_snapshot` against a fake `helm`.

#![cfg(unix)]

use helmtest_mcp::{McpServer, McpServerConfig, PROTOCOL_VERSION};
use helmtest_runner::RunnerConfig;
use serde_json::{json, Value};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

const PREAMBLE: &str = r#"#!/bin/sh
here="$(dirname "$0")"
printf '%s\n' "$@" > "$here/args.txt"
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

const WRITE_JUNIT: &str = r#"cat > "$out" <<'XML'
<testsuites>
  <testsuite name="deployment">
    <testcase name="should render deployment" time="0.25"/>
    <testcase name="should set replicas" time="0.5">
      <failure message="expected 3, got 1"/>
    </testcase>
  </testsuite>
  <testsuite name="service">
    <testcase name="should expose port" time="0.125"/>
  </testsuite>
</testsuites>
XML
printf 'Charts:      1 failed, 0 passed, 1 total\nTest Suites: 1 failed, 1 passed, 2 total\nTests:       1 failed, 2 passed, 3 total\nSnapshot:    0 passed, 0 total\nTime:        8.2ms\n'
exit 1
"#;

struct Repo {
    temp: TempDir,
    bin: TempDir,
}

impl Repo {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let chart = temp.path().join("charts/app");
        fs::create_dir_all(chart.join("tests")).unwrap();
        fs::write(chart.join("Chart.yaml"), "apiVersion: v2\nname: app\nversion: 0.1.0\n").unwrap();
        fs::write(chart.join("tests/deployment_test.yaml"), "suite: deployment\n").unwrap();
        fs::write(chart.join("values-prod.yaml"), "replicaCount: 3\n").unwrap();
        Self {
            temp,
            bin: TempDir::new().unwrap(),
        }
    }

    fn server(&self, body: &str) -> McpServer {
        let script = self.bin.path().join("helm");
        fs::write(&script, format!("{}{}", PREAMBLE, body)).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut server = McpServer::new(McpServerConfig {
            root_path: self.temp.path().to_path_buf(),
            runner: RunnerConfig {
                helm_bin: script,
                default_timeout: Duration::from_secs(30),
            },
            ..Default::default()
        });
        let initialize = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "1.0"}
            }
        });
        server.handle_line(&initialize.to_string()).unwrap();
        server
    }

    fn args(&self) -> Vec<String> {
        fs::read_to_string(self.bin.path().join("args.txt"))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }
}

fn call(server: &mut McpServer, name: &str, arguments: Value) -> Value {
    let line = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string();
    let response: Value = serde_json::from_str(&server.handle_line(&line).unwrap().unwrap()).unwrap();
    response["result"].clone()
}

#[test]
fn test_run_unittest_normalizes_report() {
    let repo = Repo::new();
    let mut server = repo.server(WRITE_JUNIT);

    let result = call(
        &mut server,
        "run_unittest",
        json!({
            "test_suite_files": "tests/*_test.yaml",
            "chart_path": "charts/app",
            "output_type": "junit"
        }),
    );
    assert!(result.get("isError").is_none(), "{result}");

    let value = &result["structuredContent"];
    assert_eq!(value["exit_code"], 1);
    assert_eq!(value["success"], false);
    assert_eq!(value["summary"]["total"], 3);
    assert_eq!(value["summary"]["failed"], 1);
    assert_eq!(value["failures"][0]["message"], "expected 3, got 1");
    assert_eq!(value["runner_summary"]["tests"]["total"], 3);
    assert_eq!(value["consistent"], true);
    assert_eq!(value["update_snapshot"], false);
    assert!(value["output_file"].is_null());

    let args = repo.args();
    assert_eq!(args[0], "unittest");
    assert!(args.windows(2).any(|w| w == ["-t", "junit"]));
    assert!(!args.contains(&"-u".to_string()));
}

#[test]
fn test_update_snapshot_passes_flag_and_keeps_report() {
    let repo = Repo::new();
    let mut server = repo.server(WRITE_JUNIT);

    let result = call(
        &mut server,
        "update_snapshot",
        json!({
            "test_suite_files": "tests/*_test.yaml",
            "chart_path": "charts/app",
            "values_path": ["charts/app/values-prod.yaml"],
            "output_type": "junit",
            "output_file": "charts/app/report.xml"
        }),
    );
    let value = &result["structuredContent"];
    assert_eq!(value["update_snapshot"], true);
    assert_eq!(value["output_file"], "charts/app/report.xml");
    assert!(repo.path("charts/app/report.xml").is_file());

    let args = repo.args();
    assert!(args.contains(&"-u".to_string()));
    let values = args.iter().position(|a| a == "-v").unwrap();
    assert!(args[values + 1].ends_with("values-prod.yaml"));
}

#[test]
fn test_run_unittest_missing_report_is_tool_error() {
    let repo = Repo::new();
    let mut server = repo.server("echo 'Error: plugin \"unittest\" not found' >&2\nexit 1\n");

    let result = call(
        &mut server,
        "run_unittest",
        json!({"test_suite_files": "tests/*_test.yaml", "chart_path": "charts/app"}),
    );
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error: Configuration error"), "{text}");
    assert!(text.contains("plugin"));
}

#[test]
fn test_run_unittest_timeout_is_tool_error() {
    let repo = Repo::new();
    let mut server = repo.server("sleep 30\n");

    let result = call(
        &mut server,
        "run_unittest",
        json!({
            "test_suite_files": "tests/*_test.yaml",
            "chart_path": "charts/app",
            "timeout_secs": 1
        }),
    );
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"].as_str().unwrap().contains("Timeout"));
}

#[test]
fn test_run_unittest_unmatched_glob() {
    let repo = Repo::new();
    let mut server = repo.server(WRITE_JUNIT);

    let result = call(
        &mut server,
        "run_unittest",
        json!({"test_suite_files": "tests/*_spec.yaml", "chart_path": "charts/app"}),
    );
    assert_eq!(result["isError"], true);
    assert!(!repo.bin.path().join("args.txt").exists());
}
