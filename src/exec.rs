/*!
 * Guarded Execution
 * Shared run pipeline: capture every failure, record every violation
 *
 * `run` never fails as a call. Task errors and panics are folded into the
 * execution result, and violations accumulate without ever aborting the
 * guarded task (soft enforcement).
 */

use crate::monitor::{ResourceMonitor, UsageProbe};
use crate::path::validate_path;
use crate::types::{
    AccessMode, ExecutionResult, FilesystemPolicy, SandboxOptions, SandboxViolation, TaskError,
};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Drive the guarded future to completion, converting errors and panics into
/// a task error that preserves the original failure
pub(crate) async fn call_guarded<T, F, Fut>(task: F) -> Result<T, TaskError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(task()).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(TaskError::Task(err)),
        Err(payload) => Err(TaskError::Panic(panic_message(payload.as_ref()))),
    }
}

/// Coerce a panic payload into a message, preserving string payloads verbatim
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Policy-checked execution shared by the Linux and Darwin sandboxes
///
/// Pre-checks every declared path against the operator allowlist, surfaces a
/// network capability gap when outbound denial cannot be enforced, monitors
/// resources when ceilings are configured, and only then assembles the
/// result. Violation ordering is stable: filesystem, then network, then
/// resource.
pub(crate) async fn run_policed<T, F, Fut>(
    policy: &FilesystemPolicy,
    network_isolation_available: bool,
    options: &SandboxOptions,
    task: F,
) -> ExecutionResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut violations = check_declared_paths(policy, &options.filesystem);

    if !options.network_allowed && !network_isolation_available {
        violations.push(SandboxViolation::network(
            "network denial requested but no isolation primitive is available to enforce it",
        ));
    }

    match options.resources {
        Some(limits) => {
            let monitor = ResourceMonitor::start(limits);
            let outcome = call_guarded(task).await;
            let (usage, resource_violations) = monitor.finish().await;
            violations.extend(resource_violations);
            ExecutionResult {
                outcome,
                violations,
                usage,
            }
        }
        None => {
            let probe = UsageProbe::begin();
            let outcome = call_guarded(task).await;
            ExecutionResult {
                outcome,
                violations,
                usage: probe.finish(),
            }
        }
    }
}

/// Validate every declared read/write/exec path against the allowlist
fn check_declared_paths(
    policy: &FilesystemPolicy,
    declared: &FilesystemPolicy,
) -> Vec<SandboxViolation> {
    let mut violations = Vec::new();
    for mode in [AccessMode::Read, AccessMode::Write, AccessMode::Exec] {
        for path in declared.paths(mode) {
            if let Some(violation) = validate_path(path, mode, policy) {
                violations.push(violation);
            }
        }
    }
    violations
}
