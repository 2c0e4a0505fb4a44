/*!
 * Linux Sandbox
 * Soft-enforcement sandbox backed by Linux isolation primitives
 *
 * Pre-checks declared paths against the operator allowlist, monitors
 * resources while the task runs, and selects the strongest enforcement
 * technology the kernel offers. A missing technology is reported as a
 * capability gap, never silently faked.
 */

use crate::capability::CapabilityDetector;
use crate::exec::run_policed;
use crate::types::{
    EnforcementTechnology, ExecutionResult, FilesystemPolicy, SandboxCapabilities, SandboxOptions,
};
use log::{debug, warn};
use std::future::Future;

/// Sandbox implementation for Linux hosts
#[derive(Debug, Default)]
pub struct LinuxSandbox {
    policy: FilesystemPolicy,
    detector: CapabilityDetector,
}

impl LinuxSandbox {
    /// Create a Linux sandbox enforcing the given operator allowlist
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
        cfg!(target_os = "linux")
    }

    /// Strongest enforcement technology the detector reports
    ///
    /// Preference order: landlock, then seccomp, then namespace isolation,
    /// else none.
    #[must_use]
    pub fn enforcement(&self) -> EnforcementTechnology {
        let caps = self.detector.detect();
        if caps.landlock {
            EnforcementTechnology::Landlock
        } else if caps.seccomp {
            EnforcementTechnology::Seccomp
        } else if caps.namespaces {
            EnforcementTechnology::Namespaces
        } else {
            EnforcementTechnology::None
        }
    }

    /// Execute the task under soft enforcement
    ///
    /// Declared path violations accumulate before execution and never block
    /// it; resource monitoring runs only when ceilings are configured.
    pub async fn run<T, F, Fut>(&self, task: F, options: &SandboxOptions) -> ExecutionResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let caps = self.detector.detect();
        match self.enforcement() {
            EnforcementTechnology::None => {
                warn!("No kernel enforcement technology available; falling back to soft checks only");
            }
            technology => debug!("Sandbox enforcement technology: {technology}"),
        }

        run_policed(&self.policy, caps.namespaces, options, task).await
    }
}
