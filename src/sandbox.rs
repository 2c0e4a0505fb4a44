/*!
 * Sandbox Variant Dispatch
 * Closed set of implementations selected once at construction
 *
 * The active platform is exposed through `capabilities().platform` and
 * `kind()`; callers never branch on concrete types.
 */

use crate::darwin::DarwinSandbox;
use crate::linux::LinuxSandbox;
use crate::noop::NoopSandbox;
use crate::types::{ExecutionResult, SandboxCapabilities, SandboxKind, SandboxOptions};
use std::future::Future;

/// A concrete sandbox implementation
#[derive(Debug)]
pub enum Sandbox {
    Noop(NoopSandbox),
    Linux(LinuxSandbox),
    Darwin(DarwinSandbox),
}

impl Sandbox {
    /// Which implementation is active
    #[must_use]
    pub fn kind(&self) -> SandboxKind {
        match self {
            Sandbox::Noop(_) => SandboxKind::Noop,
            Sandbox::Linux(_) => SandboxKind::Linux,
            Sandbox::Darwin(_) => SandboxKind::Darwin,
        }
    }

    /// Capability snapshot of the active implementation, cached per instance
    #[must_use]
    pub fn capabilities(&self) -> &SandboxCapabilities {
        match self {
            Sandbox::Noop(s) => s.capabilities(),
            Sandbox::Linux(s) => s.capabilities(),
            Sandbox::Darwin(s) => s.capabilities(),
        }
    }

    /// Whether this implementation can actually isolate on the current host
    #[must_use]
    pub fn is_available(&self) -> bool {
        match self {
            Sandbox::Noop(s) => s.is_available(),
            Sandbox::Linux(s) => s.is_available(),
            Sandbox::Darwin(s) => s.is_available(),
        }
    }

    /// Execute a guarded task
    ///
    /// Never fails as a call: task errors, panics, and policy breaches all
    /// land inside the returned result.
    pub async fn run<T, F, Fut>(&self, task: F, options: &SandboxOptions) -> ExecutionResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self {
            Sandbox::Noop(s) => s.run(task, options).await,
            Sandbox::Linux(s) => s.run(task, options).await,
            Sandbox::Darwin(s) => s.run(task, options).await,
        }
    }
}
