//! Build configuration
//!
//! Everything the build executor would otherwise read from process-wide
//! state: commands, timeouts, and the environment variables hidden from
//! the build. Tests construct their own instead of touching the real
//! environment.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default time allowed for the dependency install step
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Default time allowed for the build step
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(180);

/// Output directory of a static export, relative to the workspace
pub const DEFAULT_OUTPUT_SUBDIR: &str = "out";

/// Default bound on a whole deployment (site creation plus upload)
pub const DEFAULT_DEPLOY_TIMEOUT: Duration = Duration::from_secs(60);

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs `script` through `sh -c`
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh", ["-c".to_string(), script.into()])
    }

    /// Splits a command line on whitespace
    ///
    /// No quoting rules; returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Build pipeline configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory under which per-invocation workspaces are created
    pub workspace_root: PathBuf,

    /// Dependency installation command
    pub install_command: CommandSpec,

    /// Static build command
    pub build_command: CommandSpec,

    /// Maximum time the install command may run
    pub install_timeout: Duration,

    /// Maximum time the build command may run
    pub build_timeout: Duration,

    /// Variables removed from the build command's environment.
    /// `NODE_ENV` set by the host process breaks `next build` static exports.
    pub stripped_env: Vec<String>,

    /// Build output directory, relative to the workspace
    pub output_subdir: String,
}

impl BuildConfig {
    /// Creates a configuration with defaults rooted at `workspace_root`
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            install_command: CommandSpec::new("npm", ["install", "--no-audit", "--no-fund"]),
            build_command: CommandSpec::new("npm", ["run", "build"]),
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            build_timeout: DEFAULT_BUILD_TIMEOUT,
            stripped_env: vec!["NODE_ENV".to_string()],
            output_subdir: DEFAULT_OUTPUT_SUBDIR.to_string(),
        }
    }

    pub fn with_install_command(mut self, command: CommandSpec) -> Self {
        self.install_command = command;
        self
    }

    pub fn with_build_command(mut self, command: CommandSpec) -> Self {
        self.build_command = command;
        self
    }

    pub fn with_timeouts(mut self, install: Duration, build: Duration) -> Self {
        self.install_timeout = install;
        self.build_timeout = build;
        self
    }

    pub fn with_stripped_env(mut self, vars: Vec<String>) -> Self {
        self.stripped_env = vars;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.workspace_root.as_os_str().is_empty() {
            return Err("workspace_root cannot be empty".to_string());
        }

        if self.install_command.program.is_empty() {
            return Err("install command cannot be empty".to_string());
        }

        if self.build_command.program.is_empty() {
            return Err("build command cannot be empty".to_string());
        }

        if self.install_timeout.is_zero() {
            return Err("install_timeout must be greater than 0".to_string());
        }

        if self.build_timeout.is_zero() {
            return Err("build_timeout must be greater than 0".to_string());
        }

        let output = std::path::Path::new(&self.output_subdir);
        if self.output_subdir.is_empty() || output.is_absolute() || self.output_subdir.contains("..")
        {
            return Err("output_subdir must be a relative path inside the workspace".to_string());
        }

        Ok(())
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("siteforge-builds"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuildConfig::default();
        assert_eq!(config.install_timeout, Duration::from_secs(120));
        assert_eq!(config.build_timeout, Duration::from_secs(180));
        assert_eq!(config.stripped_env, vec!["NODE_ENV".to_string()]);
        assert_eq!(config.output_subdir, "out");
        assert_eq!(config.build_command.to_string(), "npm run build");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BuildConfig::new("/tmp/builds");
        assert!(config.validate().is_ok());

        config.build_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
        config.build_timeout = DEFAULT_BUILD_TIMEOUT;

        config.output_subdir = "../escape".to_string();
        assert!(config.validate().is_err());
        config.output_subdir = "dist".to_string();

        config.install_command = CommandSpec::new("", Vec::<String>::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_command_parse() {
        let cmd = CommandSpec::parse("  pnpm install --frozen-lockfile ").unwrap();
        assert_eq!(cmd.program, "pnpm");
        assert_eq!(cmd.args, vec!["install", "--frozen-lockfile"]);
        assert!(CommandSpec::parse("   ").is_none());
    }

    #[test]
    fn test_shell_command() {
        let cmd = CommandSpec::shell("echo hi");
        assert_eq!(cmd.program, "sh");
        assert_eq!(cmd.args, vec!["-c", "echo hi"]);
    }
}
