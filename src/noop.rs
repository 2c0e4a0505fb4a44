/*!
 * No-op Sandbox
 * Guaranteed fallback when no isolation primitive exists
 *
 * Executes the guarded task directly. Capability flags are all false so the
 * caller can see exactly what protection it is (not) getting; usage is still
 * instrumented for telemetry uniformity.
 */

use crate::exec::call_guarded;
use crate::monitor::UsageProbe;
use crate::types::{ExecutionResult, SandboxCapabilities, SandboxOptions};
use log::warn;
use std::future::Future;
use std::sync::Once;

static FALLBACK_WARNING: Once = Once::new();

/// Sandbox implementation with zero isolation
#[derive(Debug)]
pub struct NoopSandbox {
    capabilities: SandboxCapabilities,
}

impl Default for NoopSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopSandbox {
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: SandboxCapabilities::none(),
        }
    }

    /// All flags false, platform `other`
    #[must_use]
    pub fn capabilities(&self) -> &SandboxCapabilities {
        &self.capabilities
    }

    /// The no-op sandbox is the fallback of last resort and is always usable
    #[must_use]
    pub fn is_available(&self) -> bool {
        true
    }

    /// Execute the task with no isolation
    ///
    /// Warns once per process lifetime, not once per call; declared options
    /// are not validated because there is no policy to validate against.
    pub async fn run<T, F, Fut>(&self, task: F, _options: &SandboxOptions) -> ExecutionResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        FALLBACK_WARNING.call_once(|| {
            warn!("Sandbox isolation unavailable or disabled; executing tool calls directly");
        });

        let probe = UsageProbe::begin();
        let outcome = call_guarded(task).await;
        ExecutionResult {
            outcome,
            violations: Vec::new(),
            usage: probe.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_value_through() {
        let sandbox = NoopSandbox::new();
        let result = sandbox
            .run(|| async { Ok(42) }, &SandboxOptions::default())
            .await;

        assert!(result.success());
        assert_eq!(result.outcome.unwrap(), 42);
        assert!(result.violations.is_empty());
    }

    #[tokio::test]
    async fn test_run_instruments_usage() {
        let sandbox = NoopSandbox::new();
        let result = sandbox
            .run(|| async { Ok(()) }, &SandboxOptions::default())
            .await;

        assert!(result.usage.memory_peak_mb > 0.0);
    }

    #[tokio::test]
    async fn test_run_captures_failure() {
        let sandbox = NoopSandbox::new();
        let result: ExecutionResult<()> = sandbox
            .run(
                || async { Err(anyhow::anyhow!("bad tool")) },
                &SandboxOptions::default(),
            )
            .await;

        assert!(!result.success());
        assert!(result.error().is_some());
        assert!(result.usage.memory_peak_mb > 0.0);
    }

    #[test]
    fn test_capabilities_all_false() {
        let sandbox = NoopSandbox::new();
        let caps = sandbox.capabilities();
        assert!(!caps.landlock && !caps.seccomp && !caps.namespaces && !caps.rlimits);
        assert!(sandbox.is_available());
    }
}
