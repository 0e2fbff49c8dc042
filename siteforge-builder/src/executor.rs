//! Build executor
//!
//! Runs the dependency install and the static build as child processes in
//! the workspace. Both steps are bounded by a timeout. Each step runs in its
//! own process group, and the whole group is killed when the step ends so
//! no descendant keeps writing into the workspace.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{BuildConfig, CommandSpec};
use crate::error::{BuildError, BuildStep};

/// Upper bound on the captured output kept in a `BuildError`
const MAX_CAPTURED_OUTPUT: usize = 16 * 1024;

/// How long to wait for a killed process group to disappear
const GROUP_EXIT_GRACE: Duration = Duration::from_secs(1);

/// Runs install and build commands for a workspace
#[derive(Debug, Clone)]
pub struct BuildExecutor {
    install_command: CommandSpec,
    build_command: CommandSpec,
    install_timeout: Duration,
    build_timeout: Duration,
    stripped_env: Vec<String>,
    output_subdir: String,
}

impl BuildExecutor {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            install_command: config.install_command.clone(),
            build_command: config.build_command.clone(),
            install_timeout: config.install_timeout,
            build_timeout: config.build_timeout,
            stripped_env: config.stripped_env.clone(),
            output_subdir: config.output_subdir.clone(),
        }
    }

    /// Installs the site's dependencies
    pub async fn run_install(&self, workspace_root: &Path) -> Result<(), BuildError> {
        self.run_step(
            BuildStep::Install,
            &self.install_command,
            workspace_root,
            self.install_timeout,
            &[],
        )
        .await
    }

    /// Builds the site and returns the output directory
    ///
    /// The output location is fixed by configuration; it is not checked
    /// here whether the build actually created it.
    pub async fn run_build(&self, workspace_root: &Path) -> Result<PathBuf, BuildError> {
        self.run_step(
            BuildStep::Build,
            &self.build_command,
            workspace_root,
            self.build_timeout,
            &self.stripped_env,
        )
        .await?;

        Ok(workspace_root.join(&self.output_subdir))
    }

    async fn run_step(
        &self,
        step: BuildStep,
        spec: &CommandSpec,
        workspace_root: &Path,
        timeout: Duration,
        stripped_env: &[String],
    ) -> Result<(), BuildError> {
        info!("Running {} command: {}", step, spec);

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(workspace_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);

        for var in stripped_env {
            command.env_remove(var);
        }

        let mut child = command.spawn().map_err(|source| BuildError::Spawn {
            step,
            command: spec.to_string(),
            source,
        })?;
        let group = child.id().and_then(ProcessGroup::led_by);
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let waited = tokio::time::timeout(timeout, async {
            tokio::try_join!(child.wait(), read_pipe(stdout_pipe), read_pipe(stderr_pipe))
        })
        .await;

        // Whatever the outcome, nothing started by the step may outlive it
        if let Some(group) = group {
            group.kill();
        }
        if let Err(e) = child.wait().await {
            warn!("Failed to reap {} command: {}", step, e);
        }
        if let Some(group) = group {
            group.wait_gone().await;
        }

        let (status, stdout, stderr) = match waited {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(BuildError::Spawn {
                    step,
                    command: spec.to_string(),
                    source,
                });
            }
            Err(_) => return Err(BuildError::TimedOut { step, timeout }),
        };

        let stdout = String::from_utf8_lossy(&stdout);
        let stderr = String::from_utf8_lossy(&stderr);

        if !status.success() {
            return Err(BuildError::Failed {
                step,
                exit_code: status.code(),
                output: capture_tail(&stdout, &stderr),
            });
        }

        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", step, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", step, stderr.trim());
        }

        info!("{} command completed", step);
        Ok(())
    }
}

/// A step's process group, identified by the pid of its leader
#[derive(Debug, Clone, Copy)]
struct ProcessGroup(libc::pid_t);

impl ProcessGroup {
    fn led_by(pid: u32) -> Option<Self> {
        libc::pid_t::try_from(pid)
            .ok()
            .filter(|pid| *pid > 0)
            .map(Self)
    }

    /// Sends SIGKILL to every process in the group
    fn kill(self) {
        self.signal(libc::SIGKILL);
    }

    /// Waits until no process in the group is left, up to `GROUP_EXIT_GRACE`
    async fn wait_gone(self) {
        let deadline = tokio::time::Instant::now() + GROUP_EXIT_GRACE;
        while self.signal(0) {
            if tokio::time::Instant::now() >= deadline {
                warn!("Process group {} still present after kill", self.0);
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Returns whether any process in the group received the signal
    fn signal(self, signal: libc::c_int) -> bool {
        // SAFETY: kill(2) takes no pointers; a negative pid addresses the group
        unsafe { libc::kill(-self.0, signal) == 0 }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Joins stdout and stderr, keeping at most the last `MAX_CAPTURED_OUTPUT` bytes
fn capture_tail(stdout: &str, stderr: &str) -> String {
    let combined = match (stdout.trim(), stderr.trim()) {
        ("", err) => err.to_string(),
        (out, "") => out.to_string(),
        (out, err) => format!("{}\n{}", out, err),
    };

    if combined.len() <= MAX_CAPTURED_OUTPUT {
        return combined;
    }

    let mut start = combined.len() - MAX_CAPTURED_OUTPUT;
    while !combined.is_char_boundary(start) {
        start += 1;
    }
    combined[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with(install: &str, build: &str) -> BuildConfig {
        BuildConfig::new("/unused")
            .with_install_command(CommandSpec::shell(install))
            .with_build_command(CommandSpec::shell(build))
            .with_timeouts(Duration::from_secs(10), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_install_runs_in_workspace() {
        let dir = TempDir::new().unwrap();
        let executor = BuildExecutor::new(&config_with("echo installed > marker.txt", "true"));

        executor.run_install(dir.path()).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("marker.txt")).unwrap(),
            "installed\n"
        );
    }

    #[tokio::test]
    async fn test_build_returns_output_dir() {
        let dir = TempDir::new().unwrap();
        let executor = BuildExecutor::new(&config_with(
            "true",
            "mkdir -p out && echo '<html></html>' > out/index.html",
        ));

        let output_dir = executor.run_build(dir.path()).await.unwrap();
        assert_eq!(output_dir, dir.path().join("out"));
        assert!(output_dir.join("index.html").is_file());
    }

    #[tokio::test]
    async fn test_non_zero_exit_captures_output() {
        let dir = TempDir::new().unwrap();
        let executor = BuildExecutor::new(&config_with(
            "true",
            "echo compiling; echo 'Module not found' >&2; exit 3",
        ));

        let err = executor.run_build(dir.path()).await.unwrap_err();
        match err {
            BuildError::Failed {
                step,
                exit_code,
                output,
            } => {
                assert_eq!(step, BuildStep::Build);
                assert_eq!(exit_code, Some(3));
                assert!(output.contains("compiling"));
                assert!(output.contains("Module not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_step() {
        let dir = TempDir::new().unwrap();
        let config = config_with("exec sleep 5", "true")
            .with_timeouts(Duration::from_millis(200), Duration::from_secs(10));
        let executor = BuildExecutor::new(&config);

        let started = std::time::Instant::now();
        let err = executor.run_install(dir.path()).await.unwrap_err();

        assert!(matches!(
            err,
            BuildError::TimedOut {
                step: BuildStep::Install,
                ..
            }
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_timeout_kills_descendants() {
        let dir = TempDir::new().unwrap();
        let config = config_with(
            "true",
            "W=$PWD; sh -c \"sleep 1; echo late > $W/late.txt\"; true",
        )
        .with_timeouts(Duration::from_secs(10), Duration::from_millis(200));
        let executor = BuildExecutor::new(&config);

        let err = executor.run_build(dir.path()).await.unwrap_err();
        assert!(matches!(err, BuildError::TimedOut { step: BuildStep::Build, .. }));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn test_background_process_does_not_outlive_step() {
        let dir = TempDir::new().unwrap();
        let executor = BuildExecutor::new(&config_with(
            "(sleep 1; echo late > \"$PWD/late.txt\") > /dev/null 2>&1 &",
            "true",
        ));

        executor.run_install(dir.path()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig::new("/unused").with_install_command(CommandSpec::new(
            "siteforge-no-such-program",
            Vec::<String>::new(),
        ));
        let executor = BuildExecutor::new(&config);

        let err = executor.run_install(dir.path()).await.unwrap_err();
        assert!(matches!(err, BuildError::Spawn { step: BuildStep::Install, .. }));
    }

    #[tokio::test]
    async fn test_stripped_env_only_affects_build() {
        let dir = TempDir::new().unwrap();
        let script = |file: &str| format!("printf '%s' \"${{HOME:-unset}}\" > {}", file);
        let config = config_with(&script("install-env.txt"), &script("build-env.txt"))
            .with_stripped_env(vec!["HOME".to_string()]);
        let executor = BuildExecutor::new(&config);

        executor.run_install(dir.path()).await.unwrap();
        executor.run_build(dir.path()).await.unwrap();

        let expected_install = std::env::var("HOME")
            .ok()
            .filter(|home| !home.is_empty())
            .unwrap_or_else(|| "unset".to_string());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("install-env.txt")).unwrap(),
            expected_install
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("build-env.txt")).unwrap(),
            "unset"
        );
    }

    #[test]
    fn test_capture_tail_truncates() {
        let long = "x".repeat(MAX_CAPTURED_OUTPUT + 100);
        let tail = capture_tail(&long, "");
        assert_eq!(tail.len(), MAX_CAPTURED_OUTPUT);

        assert_eq!(capture_tail("out", "err"), "out\nerr");
        assert_eq!(capture_tail("", " err "), "err");
    }
}
