/*!
 * Agent Sandbox Library
 * Soft-enforcement execution sandbox for agent tool invocations
 *
 * Isolates semi-trusted tool calls from the host: capability detection,
 * path allowlist validation, concurrent resource monitoring, and
 * per-platform sandbox selection behind a single contract. Enforcement
 * is deliberately soft: violations are recorded and returned, never
 * thrown, so an isolation failure cannot become a host outage.
 */

pub mod capability;
pub mod darwin;
mod exec;
pub mod linux;
pub mod manager;
pub mod monitor;
pub mod namespace;
pub mod noop;
pub mod path;
pub mod sandbox;
pub mod types;

// Re-exports
pub use capability::CapabilityDetector;
pub use manager::SandboxManager;
pub use monitor::ResourceMonitor;
pub use namespace::{
    build_unshare_command, detect_namespace_support, NamespaceSupport, UnshareOptions,
};
pub use path::validate_path;
pub use sandbox::Sandbox;
pub use types::{
    AccessMode, EnforcementTechnology, ExecutionResult, FilesystemPolicy, Platform,
    ResourceLimits, ResourceUsage, SandboxCapabilities, SandboxError, SandboxKind,
    SandboxManagerConfig, SandboxOptions, SandboxResult, SandboxStatus, SandboxViolation,
    TaskError, Technology, ViolationKind,
};
