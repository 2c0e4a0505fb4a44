/*!
 * Resource Monitoring
 * Concurrent observation of memory/CPU during a guarded call
 *
 * The guarded task cannot be pre-empted mid-expression, so enforcement is a
 * periodic sampling loop running alongside it. Purely observational: over-
 * budget calls are recorded as violations and keep running. There is no hard
 * kill switch at this layer.
 */

use crate::types::{ResourceLimits, ResourceUsage, SandboxViolation};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default sampling interval for the polling loop
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Call-scoped resource monitor
///
/// One monitor per `run` invocation; state is never shared across calls, so
/// a sandbox instance tolerates concurrently overlapping runs.
pub struct ResourceMonitor {
    state: Arc<MonitorState>,
    task: JoinHandle<()>,
    cpu_start_ms: u64,
}

struct MonitorState {
    limits: ResourceLimits,
    peak_bytes: AtomicU64,
    /// Edge-trigger latch: one violation per threshold crossing, not per tick
    over_limit: AtomicBool,
    violations: Mutex<Vec<SandboxViolation>>,
}

impl MonitorState {
    fn sample(&self) {
        let bytes = current_memory_bytes();
        self.peak_bytes.fetch_max(bytes, Ordering::Relaxed);

        let ceiling_bytes = self.limits.max_memory_mb.saturating_mul(BYTES_PER_MIB);
        if bytes > ceiling_bytes {
            if !self.over_limit.swap(true, Ordering::Relaxed) {
                self.violations.lock().push(SandboxViolation::resource(format!(
                    "memory usage {:.1} MiB exceeds ceiling of {} MiB",
                    bytes as f64 / BYTES_PER_MIB as f64,
                    self.limits.max_memory_mb
                )));
            }
        } else {
            self.over_limit.store(false, Ordering::Relaxed);
        }
    }
}

impl ResourceMonitor {
    /// Start monitoring with the default polling interval
    #[must_use]
    pub fn start(limits: ResourceLimits) -> Self {
        Self::with_interval(limits, DEFAULT_POLL_INTERVAL)
    }

    /// Start monitoring with an explicit polling interval
    #[must_use]
    pub fn with_interval(limits: ResourceLimits, interval: Duration) -> Self {
        let state = Arc::new(MonitorState {
            limits,
            peak_bytes: AtomicU64::new(0),
            over_limit: AtomicBool::new(false),
            violations: Mutex::new(Vec::new()),
        });

        // First sample up front so even instant calls report real usage
        state.sample();

        let task_state = Arc::clone(&state);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick resolves immediately; skip it, the caller already
            // took the initial sample
            ticker.tick().await;
            loop {
                ticker.tick().await;
                task_state.sample();
            }
        });

        Self {
            state,
            task,
            cpu_start_ms: cpu_time_ms(),
        }
    }

    /// Stop sampling, flush a final sample, and report usage plus violations
    ///
    /// Usage covers the full call lifetime: the final sample lands before the
    /// result is assembled.
    pub async fn finish(self) -> (ResourceUsage, Vec<SandboxViolation>) {
        self.task.abort();
        let _ = self.task.await;

        self.state.sample();

        let usage = ResourceUsage {
            memory_peak_mb: peak_mb(self.state.peak_bytes.load(Ordering::Relaxed)),
            cpu_time_ms: cpu_time_ms().saturating_sub(self.cpu_start_ms),
        };
        let violations = std::mem::take(&mut *self.state.violations.lock());
        (usage, violations)
    }
}

/// Lightweight begin/end usage probe for unmonitored runs
///
/// Keeps result telemetry uniform when no resource ceilings are configured.
pub(crate) struct UsageProbe {
    cpu_start_ms: u64,
    start_bytes: u64,
}

impl UsageProbe {
    pub(crate) fn begin() -> Self {
        Self {
            cpu_start_ms: cpu_time_ms(),
            start_bytes: current_memory_bytes(),
        }
    }

    pub(crate) fn finish(self) -> ResourceUsage {
        let peak = self.start_bytes.max(current_memory_bytes());
        ResourceUsage {
            memory_peak_mb: peak_mb(peak),
            cpu_time_ms: cpu_time_ms().saturating_sub(self.cpu_start_ms),
        }
    }
}

/// Peak bytes as MiB, floored strictly above zero for telemetry invariants
fn peak_mb(bytes: u64) -> f64 {
    (bytes.max(1) as f64) / (BYTES_PER_MIB as f64)
}

/// Current resident set size in bytes
///
/// Linux reads VmRSS from /proc/self/status (reported in KiB); other Unix
/// hosts fall back to the getrusage high-water mark; elsewhere a 1 MiB floor
/// keeps telemetry non-degenerate.
pub(crate) fn current_memory_bytes() -> u64 {
    #[cfg(target_os = "linux")]
    {
        if let Some(kb) = read_vm_rss_kb() {
            return kb.saturating_mul(1024);
        }
    }
    #[cfg(all(unix, not(target_os = "linux")))]
    {
        if let Some(bytes) = max_rss_bytes() {
            return bytes;
        }
    }
    BYTES_PER_MIB
}

#[cfg(target_os = "linux")]
fn read_vm_rss_kb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    line.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn max_rss_bytes() -> Option<u64> {
    use nix::sys::resource::{getrusage, UsageWho};
    let usage = getrusage(UsageWho::RUSAGE_SELF).ok()?;
    let max_rss = u64::try_from(usage.max_rss()).ok()?;
    // ru_maxrss is bytes on Darwin, KiB elsewhere
    #[cfg(target_os = "macos")]
    {
        Some(max_rss)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Some(max_rss.saturating_mul(1024))
    }
}

/// Accumulated user+system CPU time of this process, in milliseconds
pub(crate) fn cpu_time_ms() -> u64 {
    #[cfg(unix)]
    {
        use nix::sys::resource::{getrusage, UsageWho};
        match getrusage(UsageWho::RUSAGE_SELF) {
            Ok(usage) => {
                let user = usage.user_time();
                let system = usage.system_time();
                let secs = (user.tv_sec() + system.tv_sec()) as u64;
                let micros = (user.tv_usec() + system.tv_usec()) as u64;
                secs * 1_000 + micros / 1_000
            }
            Err(_) => 0,
        }
    }
    #[cfg(not(unix))]
    {
        0
    }
}
