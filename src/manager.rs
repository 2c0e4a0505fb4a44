/*!
 * Sandbox Manager
 * Translates operator configuration into one cached sandbox instance
 *
 * The single source of truth for sandbox selection. Configuration errors
 * fail at construction, never inside a `run` call; repeat `create_sandbox`
 * calls return the same instance so capability caches survive.
 */

use crate::capability::CapabilityDetector;
use crate::darwin::DarwinSandbox;
use crate::linux::LinuxSandbox;
use crate::noop::NoopSandbox;
use crate::sandbox::Sandbox;
use crate::types::{
    Platform, SandboxCapabilities, SandboxManagerConfig, SandboxResult, SandboxStatus, Technology,
};
use log::{info, warn};
use std::sync::{Arc, OnceLock};

/// Manager owning sandbox selection and the detected capability snapshot
#[derive(Debug)]
pub struct SandboxManager {
    config: SandboxManagerConfig,
    detector: CapabilityDetector,
    sandbox: OnceLock<Arc<Sandbox>>,
}

impl SandboxManager {
    /// Create a manager, rejecting malformed configuration up front
    pub fn new(config: SandboxManagerConfig) -> SandboxResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            detector: CapabilityDetector::new(),
            sandbox: OnceLock::new(),
        })
    }

    /// Resolve and cache the sandbox for this configuration
    ///
    /// Memoized: repeat calls return the same instance.
    pub fn create_sandbox(&self) -> Arc<Sandbox> {
        Arc::clone(self.sandbox.get_or_init(|| {
            let sandbox = self.select();
            info!(
                "Sandbox resolved: kind={} technology={} enabled={}",
                sandbox.kind(),
                self.config.technology,
                self.config.enabled
            );
            Arc::new(sandbox)
        }))
    }

    /// Host capabilities, detected lazily and cached for the manager lifetime
    pub fn capabilities(&self) -> &SandboxCapabilities {
        self.detector.detect()
    }

    /// Operational snapshot for status surfaces
    pub fn status(&self) -> SandboxStatus {
        SandboxStatus {
            enabled: self.config.enabled,
            technology: self.config.technology,
            capabilities: self.capabilities().clone(),
            kind: self.create_sandbox().kind(),
        }
    }

    /// Whether any isolation is requested at all
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.technology != Technology::None
    }

    #[must_use]
    pub fn config(&self) -> &SandboxManagerConfig {
        &self.config
    }

    /// Decision table, first match wins:
    /// disabled or `none` -> no-op; `seccomp` -> no-op (unimplemented, never
    /// faked); `landlock`/`auto` on Linux -> Linux; Darwin -> Darwin;
    /// otherwise no-op.
    fn select(&self) -> Sandbox {
        if !self.config.enabled {
            return Sandbox::Noop(NoopSandbox::new());
        }

        match self.config.technology {
            Technology::None => Sandbox::Noop(NoopSandbox::new()),
            Technology::Seccomp => {
                warn!("Seccomp backend is not implemented; resolving to no-op rather than faking isolation");
                Sandbox::Noop(NoopSandbox::new())
            }
            Technology::Landlock | Technology::Auto => {
                match self.detector.detect().platform {
                    Platform::Linux => {
                        Sandbox::Linux(LinuxSandbox::new(self.config.filesystem_policy()))
                    }
                    Platform::Darwin => {
                        Sandbox::Darwin(DarwinSandbox::new(self.config.filesystem_policy()))
                    }
                    Platform::Other => Sandbox::Noop(NoopSandbox::new()),
                }
            }
        }
    }
}
