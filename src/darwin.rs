/*!
 * Darwin Sandbox
 * Sandbox implementation for macOS hosts
 *
 * Shares the Linux variant's external contract. When the sandbox-exec
 * profile mechanism is present it backs network denial; without it the
 * implementation degrades to the observational pipeline while still
 * reporting Darwin capability flags accurately.
 */

use crate::capability::CapabilityDetector;
use crate::exec::run_policed;
use crate::types::{ExecutionResult, FilesystemPolicy, SandboxCapabilities, SandboxOptions};
use log::debug;
use std::future::Future;

/// Sandbox implementation for macOS hosts
#[derive(Debug, Default)]
pub struct DarwinSandbox {
    policy: FilesystemPolicy,
    detector: CapabilityDetector,
}

impl DarwinSandbox {
    /// Create a Darwin sandbox enforcing the given operator allowlist
    #[must_use]
    pub fn new(policy: FilesystemPolicy) -> Self {
        Self {
            policy,
            detector: CapabilityDetector::new(),
        }
    }

    /// Host capabilities, probed once and cached
    #[must_use]
    pub fn capabilities(&self) -> &SandboxCapabilities {
        self.detector.detect()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        cfg!(target_os = "macos")
    }

    /// Execute the task under soft enforcement
    pub async fn run<T, F, Fut>(&self, task: F, options: &SandboxOptions) -> ExecutionResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let caps = self.detector.detect();
        if !caps.sandbox_exec {
            debug!("sandbox-exec unavailable; running observational checks only");
        }

        run_policed(&self.policy, caps.sandbox_exec, options, task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Platform, ViolationKind};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_contract_matches_linux_variant() {
        let sandbox = DarwinSandbox::new(
            FilesystemPolicy::new().with_read_paths(vec![PathBuf::from("/Users/agent")]),
        );
        let options = SandboxOptions::new()
            .with_filesystem(
                FilesystemPolicy::new().with_read_paths(vec![PathBuf::from("/etc/passwd")]),
            )
            .with_network_allowed(true);

        let result = sandbox.run(|| async { Ok(1) }, &options).await;

        assert!(result.success());
        assert!(result
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::Filesystem));
    }

    #[test]
    fn test_availability_tracks_platform() {
        let sandbox = DarwinSandbox::new(FilesystemPolicy::new());
        assert_eq!(sandbox.is_available(), cfg!(target_os = "macos"));
        if sandbox.capabilities().platform == Platform::Darwin {
            assert!(sandbox.capabilities().rlimits);
        }
    }
}
