/*!
 * Sandbox Types
 * Common types for sandbox policy, telemetry, and configuration
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Sandbox operation result
///
/// # Must Use
/// Sandbox operations can fail and must be handled
#[must_use = "sandbox operations can fail and must be handled"]
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Errors that escape the sandbox subsystem
///
/// Policy breaches never surface here; they are recorded as
/// [`SandboxViolation`]s instead. The only escaping failure is a malformed
/// manager configuration, rejected at construction time.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum SandboxError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Host platform as seen by the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linux,
    Darwin,
    Other,
}

impl Platform {
    /// Platform the current process is compiled for
    #[must_use]
    pub const fn current() -> Self {
        #[cfg(target_os = "linux")]
        {
            Platform::Linux
        }
        #[cfg(target_os = "macos")]
        {
            Platform::Darwin
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Platform::Other
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Darwin => write!(f, "darwin"),
            Platform::Other => write!(f, "other"),
        }
    }
}

/// Isolation primitives usable on the current host
///
/// Immutable snapshot, computed once per detector lifetime and cached by
/// reference. Repeated queries on the same instance return the same object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SandboxCapabilities {
    pub platform: Platform,
    /// Landlock LSM (unprivileged filesystem restriction)
    pub landlock: bool,
    /// Seccomp syscall filtering
    pub seccomp: bool,
    /// User/pid/net/mount namespace support
    pub namespaces: bool,
    /// POSIX resource limits
    pub rlimits: bool,
    /// Darwin sandbox-exec profile mechanism
    pub sandbox_exec: bool,
}

impl SandboxCapabilities {
    /// Capabilities with every flag false (the no-isolation baseline)
    #[must_use]
    pub const fn none() -> Self {
        Self {
            platform: Platform::Other,
            landlock: false,
            seccomp: false,
            namespaces: false,
            rlimits: false,
            sandbox_exec: false,
        }
    }
}

/// Filesystem access mode for allowlist checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    Read,
    Write,
    Exec,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
            AccessMode::Exec => write!(f, "exec"),
        }
    }
}

/// Per-mode filesystem allowlists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilesystemPolicy {
    pub read_paths: Vec<PathBuf>,
    pub write_paths: Vec<PathBuf>,
    pub exec_paths: Vec<PathBuf>,
}

impl FilesystemPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_read_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.read_paths = paths;
        self
    }

    #[must_use]
    pub fn with_write_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.write_paths = paths;
        self
    }

    #[must_use]
    pub fn with_exec_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.exec_paths = paths;
        self
    }

    /// Paths governing the given access mode
    #[must_use]
    pub fn paths(&self, mode: AccessMode) -> &[PathBuf] {
        match mode {
            AccessMode::Read => &self.read_paths,
            AccessMode::Write => &self.write_paths,
            AccessMode::Exec => &self.exec_paths,
        }
    }
}

/// Resource ceilings for a guarded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceLimits {
    pub max_memory_mb: u64,
    pub max_cpu_percent: u8,
    pub max_file_size_mb: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_memory_mb: 512,
            max_cpu_percent: 50,
            max_file_size_mb: 100,
        }
    }
}

impl ResourceLimits {
    #[must_use]
    pub fn with_memory_mb(mut self, mb: u64) -> Self {
        self.max_memory_mb = mb;
        self
    }

    #[must_use]
    pub fn with_cpu_percent(mut self, pct: u8) -> Self {
        self.max_cpu_percent = pct;
        self
    }

    #[must_use]
    pub fn with_file_size_mb(mut self, mb: u64) -> Self {
        self.max_file_size_mb = mb;
        self
    }
}

/// Per-call sandbox options
///
/// A value object: constructed by the caller, never mutated by the sandbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SandboxOptions {
    /// Paths the guarded call declares it will touch
    pub filesystem: FilesystemPolicy,
    /// Resource ceilings; monitoring starts only when set
    pub resources: Option<ResourceLimits>,
    /// Whether the call may reach the network
    pub network_allowed: bool,
}

impl SandboxOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filesystem(mut self, filesystem: FilesystemPolicy) -> Self {
        self.filesystem = filesystem;
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: ResourceLimits) -> Self {
        self.resources = Some(resources);
        self
    }

    #[must_use]
    pub fn with_network_allowed(mut self, allowed: bool) -> Self {
        self.network_allowed = allowed;
        self
    }
}

/// Category of a recorded violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Filesystem,
    Resource,
    Network,
}

/// A recorded policy breach
///
/// An observation, not an exception: violations accumulate in the execution
/// result and never abort the guarded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SandboxViolation {
    pub kind: ViolationKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SandboxViolation {
    #[must_use]
    pub fn filesystem(description: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ViolationKind::Filesystem,
            description: description.into(),
            path: Some(path.into()),
        }
    }

    #[must_use]
    pub fn resource(description: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Resource,
            description: description.into(),
            path: None,
        }
    }

    #[must_use]
    pub fn network(description: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Network,
            description: description.into(),
            path: None,
        }
    }
}

impl std::fmt::Display for SandboxViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.path {
            Some(p) => write!(f, "{:?} violation: {} ({})", self.kind, self.description, p.display()),
            None => write!(f, "{:?} violation: {}", self.kind, self.description),
        }
    }
}

/// Resource consumption observed over one guarded call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceUsage {
    /// Peak sampled resident memory, MiB (strictly positive)
    pub memory_peak_mb: f64,
    /// Accumulated CPU time, milliseconds
    pub cpu_time_ms: u64,
}

/// Failure of the guarded task itself
///
/// Captured into the execution result, never propagated out of `run`.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The guarded future resolved to an error
    #[error(transparent)]
    Task(#[from] anyhow::Error),
    /// The guarded future panicked; the payload is preserved as the message
    #[error("guarded task panicked: {0}")]
    Panic(String),
}

/// Terminal record of exactly one `run` call
///
/// Owned by the caller after return; `violations` is always present (possibly
/// empty) and `usage` is attached on success and failure alike.
#[derive(Debug)]
pub struct ExecutionResult<T> {
    pub outcome: Result<T, TaskError>,
    pub violations: Vec<SandboxViolation>,
    pub usage: ResourceUsage,
}

impl<T> ExecutionResult<T> {
    /// Whether the guarded task completed without error
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Task error, if the guarded task failed
    #[must_use]
    pub fn error(&self) -> Option<&TaskError> {
        self.outcome.as_ref().err()
    }
}

/// Enforcement technology an implementation actually selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementTechnology {
    Landlock,
    Seccomp,
    Namespaces,
    None,
}

impl std::fmt::Display for EnforcementTechnology {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EnforcementTechnology::Landlock => write!(f, "landlock"),
            EnforcementTechnology::Seccomp => write!(f, "seccomp"),
            EnforcementTechnology::Namespaces => write!(f, "namespaces"),
            EnforcementTechnology::None => write!(f, "none"),
        }
    }
}

/// Operator-requested sandbox technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    Auto,
    None,
    Landlock,
    Seccomp,
}

impl FromStr for Technology {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Technology::Auto),
            "none" => Ok(Technology::None),
            "landlock" => Ok(Technology::Landlock),
            "seccomp" => Ok(Technology::Seccomp),
            other => Err(SandboxError::InvalidConfig(format!(
                "unrecognized sandbox technology: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Technology::Auto => write!(f, "auto"),
            Technology::None => write!(f, "none"),
            Technology::Landlock => write!(f, "landlock"),
            Technology::Seccomp => write!(f, "seccomp"),
        }
    }
}

/// Operator configuration for the sandbox manager
///
/// Immutable for the manager's lifetime; validated at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SandboxManagerConfig {
    pub enabled: bool,
    pub technology: Technology,
    pub allowed_read_paths: Vec<PathBuf>,
    pub allowed_write_paths: Vec<PathBuf>,
    pub max_memory_mb: u64,
    pub max_cpu_percent: u8,
    pub max_file_size_mb: u64,
    pub network_allowed: bool,
}

impl Default for SandboxManagerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            technology: Technology::Auto,
            allowed_read_paths: vec![],
            allowed_write_paths: vec![],
            max_memory_mb: 512,
            max_cpu_percent: 50,
            max_file_size_mb: 100,
            network_allowed: false,
        }
    }
}

impl SandboxManagerConfig {
    /// Validate operator input; called by the manager before any sandbox is
    /// constructed so bad config never surfaces inside a `run` call
    pub fn validate(&self) -> SandboxResult<()> {
        if self.max_cpu_percent > 100 {
            return Err(SandboxError::InvalidConfig(format!(
                "max_cpu_percent must be 0-100, got {}",
                self.max_cpu_percent
            )));
        }
        if self.max_memory_mb == 0 {
            return Err(SandboxError::InvalidConfig(
                "max_memory_mb must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Operator allowlists as a filesystem policy (exec has no operator
    /// surface; declared exec paths are checked against the read allowlist)
    #[must_use]
    pub fn filesystem_policy(&self) -> FilesystemPolicy {
        FilesystemPolicy {
            read_paths: self.allowed_read_paths.clone(),
            write_paths: self.allowed_write_paths.clone(),
            exec_paths: self.allowed_read_paths.clone(),
        }
    }

    /// Resource ceilings from operator config
    #[must_use]
    pub fn resource_limits(&self) -> ResourceLimits {
        ResourceLimits {
            max_memory_mb: self.max_memory_mb,
            max_cpu_percent: self.max_cpu_percent,
            max_file_size_mb: self.max_file_size_mb,
        }
    }
}

/// Which sandbox implementation is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxKind {
    Noop,
    Linux,
    Darwin,
}

impl std::fmt::Display for SandboxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SandboxKind::Noop => write!(f, "noop"),
            SandboxKind::Linux => write!(f, "linux"),
            SandboxKind::Darwin => write!(f, "darwin"),
        }
    }
}

/// Operational snapshot of the manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SandboxStatus {
    pub enabled: bool,
    pub technology: Technology,
    pub capabilities: SandboxCapabilities,
    pub kind: SandboxKind,
}
