/*!
 * Capability Detection
 * Probes the host once for available isolation primitives
 *
 * Detection is deterministic, never fails, and is memoized per detector
 * instance: repeated calls return the same cached snapshot by reference.
 */

use crate::namespace::detect_namespace_support;
use crate::types::{Platform, SandboxCapabilities};
use log::debug;
use std::sync::OnceLock;

/// Lazily-initialized capability probe
///
/// Owns its cache explicitly rather than hiding it in module state, so two
/// detectors can disagree only by probing at different times.
#[derive(Debug, Default)]
pub struct CapabilityDetector {
    cached: OnceLock<SandboxCapabilities>,
}

impl CapabilityDetector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cached: OnceLock::new(),
        }
    }

    /// Detect host capabilities, probing at most once per detector lifetime
    pub fn detect(&self) -> &SandboxCapabilities {
        self.cached.get_or_init(|| {
            let caps = probe_host();
            debug!(
                "Detected sandbox capabilities: platform={} landlock={} seccomp={} namespaces={} rlimits={} sandbox_exec={}",
                caps.platform, caps.landlock, caps.seccomp, caps.namespaces, caps.rlimits, caps.sandbox_exec
            );
            caps
        })
    }
}

/// Probe the current host; every individual probe degrades silently to false
fn probe_host() -> SandboxCapabilities {
    match Platform::current() {
        Platform::Linux => probe_linux(),
        Platform::Darwin => probe_darwin(),
        Platform::Other => SandboxCapabilities::none(),
    }
}

fn probe_linux() -> SandboxCapabilities {
    SandboxCapabilities {
        platform: Platform::Linux,
        landlock: probe_landlock(),
        seccomp: probe_seccomp(),
        namespaces: detect_namespace_support().any(),
        rlimits: true,
        sandbox_exec: false,
    }
}

fn probe_darwin() -> SandboxCapabilities {
    SandboxCapabilities {
        platform: Platform::Darwin,
        landlock: false,
        seccomp: false,
        namespaces: false,
        rlimits: true,
        sandbox_exec: std::path::Path::new("/usr/bin/sandbox-exec").exists(),
    }
}

/// Landlock is listed as an active LSM when the kernel enables it
fn probe_landlock() -> bool {
    std::fs::read_to_string("/sys/kernel/security/lsm")
        .map(|lsms| lsms.split(',').any(|lsm| lsm.trim() == "landlock"))
        .unwrap_or(false)
}

/// Seccomp support shows up as available filter actions, or failing that as
/// a Seccomp field in the process status
fn probe_seccomp() -> bool {
    if std::path::Path::new("/proc/sys/kernel/seccomp/actions_avail").exists() {
        return true;
    }
    std::fs::read_to_string("/proc/self/status")
        .map(|status| status.lines().any(|line| line.starts_with("Seccomp:")))
        .unwrap_or(false)
}
