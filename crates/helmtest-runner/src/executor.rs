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
//! Execution of `helm unittest`.
//!
//! One call spawns one runner process in its own process group, waits for it
//! with a deadline and reads the report it wrote. A process that outlives the
//! deadline is killed together with everything it started.

use crate::error::{RunnerError, RunnerResult};
use helmtest_report::{normalize, parse_summary, Report, ReportFormat, RunnerSummary, Summary};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Default runner executable.
pub const DEFAULT_HELM_BIN: &str = "helm";

/// Default per-run timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Upper bound accepted for per-run timeouts, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How to reach the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// `helm` executable, looked up on `PATH` when not absolute.
    pub helm_bin: PathBuf,
    pub default_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            helm_bin: PathBuf::from(DEFAULT_HELM_BIN),
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// One runner invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub chart_path: PathBuf,
    /// Glob for suite files, relative to the chart (`tests/*_test.yaml`).
    pub test_suite_files: String,
    pub values_files: Vec<PathBuf>,
    pub output_type: ReportFormat,
    /// Where the runner writes its report; a temporary file when `None`.
    pub output_file: Option<PathBuf>,
    pub update_snapshot: bool,
    /// Overrides [`RunnerConfig::default_timeout`].
    pub timeout: Option<Duration>,
}

impl RunRequest {
    pub fn new(chart_path: impl Into<PathBuf>, test_suite_files: impl Into<String>) -> Self {
        Self {
            chart_path: chart_path.into(),
            test_suite_files: test_suite_files.into(),
            values_files: Vec::new(),
            output_type: ReportFormat::XUnit,
            output_file: None,
            update_snapshot: false,
            timeout: None,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub command: Vec<String>,
    /// `None` when the runner was ended by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub report: Report,
    pub runner_summary: Option<RunnerSummary>,
    pub duration: Duration,
    /// Report location, when the caller asked to keep it.
    pub output_file: Option<PathBuf>,
}

impl ExecutionResult {
    pub fn summary(&self) -> Summary {
        self.report.summary()
    }

    /// Whether the runner's console counts agree with the parsed report.
    /// `None` when the runner printed no summary.
    pub fn is_consistent(&self) -> Option<bool> {
        self.runner_summary
            .as_ref()
            .map(|runner| runner.matches(&self.summary()))
    }
}

/// Runs `helm unittest` for [`RunRequest`]s.
#[derive(Debug, Clone, Default)]
pub struct TestExecutor {
    config: RunnerConfig,
}

impl TestExecutor {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// The arguments passed to the runner, without the executable.
    pub fn arguments(&self, request: &RunRequest, report_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "unittest".into(),
            "-f".into(),
            request.test_suite_files.clone().into(),
            request.chart_path.clone().into(),
            "-t".into(),
            request.output_type.as_str().into(),
            "-o".into(),
            report_path.into(),
        ];
        if request.update_snapshot {
            args.push("-u".into());
        }
        for values in &request.values_files {
            args.push("-v".into());
            args.push(values.into());
        }
        args
    }

    /// Run the tests and parse the report.
    ///
    /// Failing tests are not an error: the runner's exit code is reported
    /// as-is and the failures appear in the report.
    pub fn run(&self, request: &RunRequest) -> RunnerResult<ExecutionResult> {
        if !request.output_type.is_runner_output() {
            return Err(RunnerError::UnsupportedFormat(request.output_type));
        }
        check_inputs(request)?;

        // The temporary report (if any) lives until this function returns.
        let (report_path, _temp_report): (PathBuf, Option<NamedTempFile>) = match &request.output_file {
            Some(path) => {
                remove_stale_report(path)?;
                (path.clone(), None)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("helmtest-report-")
                    .suffix(&format!(".{}", request.output_type.file_extension()))
                    .tempfile()?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        let args = self.arguments(request, &report_path);
        let command_line: Vec<String> = std::iter::once(self.config.helm_bin.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let timeout = capped_timeout(request.timeout.unwrap_or(self.config.default_timeout));

        info!("Running {}", command_line.join(" "));
        let started = Instant::now();

        let mut command = Command::new(&self.config.helm_bin);
        command.args(&args);
        let mut child = ScopedChild::spawn(command).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RunnerError::Configuration(format!(
                "runner not installed: {} ({})",
                self.config.helm_bin.display(),
                e
            )),
            _ => RunnerError::Configuration(format!(
                "failed to start {}: {}",
                self.config.helm_bin.display(),
                e
            )),
        })?;

        let status = match child.wait_deadline(started + timeout)? {
            Some(status) => status,
            None => {
                warn!(
                    "Runner exceeded {}s timeout, killing process group",
                    timeout.as_secs()
                );
                child.kill();
                return Err(RunnerError::Timeout {
                    secs: timeout.as_secs(),
                });
            }
        };
        let (stdout, stderr) = child.output();
        let duration = started.elapsed();
        info!(
            "Runner exited with {} after {:.2}s",
            status,
            duration.as_secs_f64()
        );

        let bytes = match fs::read(&report_path) {
            Ok(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => bytes,
            Ok(_) => return Err(missing_report(status, &stderr)),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(missing_report(status, &stderr)),
            Err(e) => return Err(RunnerError::Io(e)),
        };
        let report = normalize(&bytes, request.output_type)?;
        let runner_summary = parse_summary(&stdout);
        debug!(
            "Parsed {} cases from {} report",
            report.summary().total,
            request.output_type
        );

        Ok(ExecutionResult {
            command: command_line,
            exit_code: status.code(),
            stdout,
            stderr,
            report,
            runner_summary,
            duration,
            output_file: request.output_file.clone(),
        })
    }
}

/// Timeouts above [`MAX_TIMEOUT_SECS`] are cut down to it.
fn capped_timeout(timeout: Duration) -> Duration {
    let max = Duration::from_secs(MAX_TIMEOUT_SECS);
    if timeout > max {
        warn!(
            "Timeout of {}s exceeds the {}s limit, using the limit",
            timeout.as_secs(),
            MAX_TIMEOUT_SECS
        );
        max
    } else {
        timeout
    }
}

fn check_inputs(request: &RunRequest) -> RunnerResult<()> {
    let chart = &request.chart_path;
    match fs::metadata(chart) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(RunnerError::NotADirectory(chart.clone())),
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(RunnerError::NotFound(chart.clone())),
        Err(e) => return Err(RunnerError::Io(e)),
    }

    for values in &request.values_files {
        if !values.is_file() {
            return Err(RunnerError::NotFound(values.clone()));
        }
    }

    let pattern = chart.join(&request.test_suite_files);
    let pattern = pattern.to_string_lossy();
    let mut matches = glob::glob(&pattern).map_err(|e| RunnerError::InvalidGlob {
        pattern: request.test_suite_files.clone(),
        message: e.to_string(),
    })?;
    if !matches.any(|entry| entry.is_ok()) {
        return Err(RunnerError::NotFound(chart.join(&request.test_suite_files)));
    }
    Ok(())
}

fn remove_stale_report(path: &Path) -> RunnerResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed previous report {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RunnerError::Io(e)),
    }
}

fn missing_report(status: ExitStatus, stderr: &str) -> RunnerError {
    let stderr = stderr.trim();
    let detail = if stderr.is_empty() {
        "no output on stderr".to_string()
    } else {
        stderr.to_string()
    };
    RunnerError::Configuration(format!(
        "runner exited with {} without writing a report: {}",
        status, detail
    ))
}

/// A spawned runner that is always reaped.
///
/// The child leads its own process group so a timeout can take down
/// everything it started. Dropping a handle whose child is still running
/// kills the group and waits for the child.
struct ScopedChild {
    child: Child,
    stdout: Option<JoinHandle<Vec<u8>>>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    reaped: bool,
}

impl ScopedChild {
    fn spawn(mut command: Command) -> io::Result<Self> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn()?;
        let stdout = child.stdout.take().map(drain_stdout);
        let stderr = child.stderr.take().map(drain_stderr);
        debug!("Spawned runner pid {}", child.id());

        Ok(Self {
            child,
            stdout,
            stderr,
            reaped: false,
        })
    }

    /// Wait until the child exits or `deadline` passes (`Ok(None)`).
    fn wait_deadline(&mut self, deadline: Instant) -> io::Result<Option<ExitStatus>> {
        loop {
            if has_exited(&mut self.child)? {
                // Leftover background processes would keep the pipes open.
                // The leader is not reaped yet, so its pid still names the group.
                kill_group(&self.child);
                let status = self.child.wait()?;
                self.reaped = true;
                return Ok(Some(status));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Kill the process group and reap the child.
    fn kill(&mut self) {
        if self.reaped {
            return;
        }
        kill_group(&self.child);
        if let Err(e) = self.child.kill() {
            debug!("Kill of pid {} failed: {}", self.child.id(), e);
        }
        match self.child.wait() {
            Ok(status) => debug!("Reaped runner pid {}: {}", self.child.id(), status),
            Err(e) => warn!("Failed to reap runner pid {}: {}", self.child.id(), e),
        }
        self.reaped = true;
        // Pipes may still be held by processes outside the group.
        self.stdout.take();
        self.stderr.take();
    }

    /// Collected stdout and stderr, lossily decoded.
    fn output(&mut self) -> (String, String) {
        (join_pipe(self.stdout.take()), join_pipe(self.stderr.take()))
    }
}

impl Drop for ScopedChild {
    fn drop(&mut self) {
        if !self.reaped {
            self.kill();
        }
    }
}

fn drain_stdout(mut pipe: ChildStdout) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            debug!("Error reading runner stdout: {}", e);
        }
        buf
    })
}

fn drain_stderr(mut pipe: ChildStderr) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            debug!("Error reading runner stderr: {}", e);
        }
        buf
    })
}

fn join_pipe(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Whether the child has exited, leaving it unreaped.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn has_exited(child: &mut Child) -> io::Result<bool> {
    use nix::sys::wait::{waitid, Id, WaitPidFlag, WaitStatus};
    use nix::unistd::Pid;

    let Ok(pid) = i32::try_from(child.id()) else {
        return Ok(child.try_wait()?.is_some());
    };
    let flags = WaitPidFlag::WEXITED | WaitPidFlag::WNOHANG | WaitPidFlag::WNOWAIT;
    match waitid(Id::Pid(Pid::from_raw(pid)), flags) {
        Ok(WaitStatus::StillAlive) => Ok(false),
        Ok(_) => Ok(true),
        Err(e) => Err(io::Error::from(e)),
    }
}

/// Whether the child has exited. Without `waitid` this reaps the leader, so
/// the group kill that follows can race with pid reuse.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn has_exited(child: &mut Child) -> io::Result<bool> {
    Ok(child.try_wait()?.is_some())
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(pid) = i32::try_from(child.id()) else {
        return;
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) => debug!("Killed process group {}", pid),
        Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => debug!("killpg({}) failed: {}", pid, e),
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}
