/*!
 * Namespace Support Probing and Unshare Command Construction
 * Pure helpers backing the Linux sandbox implementation
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Namespace primitives available on the current host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NamespaceSupport {
    pub user_namespaces: bool,
    pub pid_namespaces: bool,
    pub network_namespaces: bool,
    pub mount_namespaces: bool,
    pub unshare_available: bool,
}

impl NamespaceSupport {
    /// Whether any namespace isolation can be attempted at all
    #[must_use]
    pub fn any(&self) -> bool {
        self.user_namespaces
            || self.pid_namespaces
            || self.network_namespaces
            || self.mount_namespaces
    }
}

/// Probe the host for namespace support
///
/// Linux exposes one entry per namespace type under `/proc/self/ns`; the
/// probe also requires the `unshare` binary for anything to be actionable.
/// Non-Linux hosts report every capability false. Never fails: a missing
/// `/proc` degrades to `false`.
#[must_use]
pub fn detect_namespace_support() -> NamespaceSupport {
    #[cfg(target_os = "linux")]
    {
        NamespaceSupport {
            user_namespaces: ns_entry_exists("user"),
            pid_namespaces: ns_entry_exists("pid"),
            network_namespaces: ns_entry_exists("net"),
            mount_namespaces: ns_entry_exists("mnt"),
            unshare_available: unshare_on_path(),
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        NamespaceSupport::default()
    }
}

#[cfg(target_os = "linux")]
fn ns_entry_exists(name: &str) -> bool {
    std::path::Path::new("/proc/self/ns").join(name).exists()
}

#[cfg(target_os = "linux")]
fn unshare_on_path() -> bool {
    std::env::var_os("PATH")
        .map(|path| {
            std::env::split_paths(&path).any(|dir| dir.join("unshare").is_file())
        })
        .unwrap_or(false)
}

/// Isolation flags for an unshare invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UnshareOptions {
    /// New PID namespace (implies forking so the command becomes init)
    pub pid: bool,
    /// New network namespace (no external connectivity)
    pub network: bool,
    /// New mount namespace with a private /proc
    pub mount: bool,
    /// Working directory inside the mount namespace
    pub working_dir: Option<PathBuf>,
}

impl UnshareOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pid(mut self) -> Self {
        self.pid = true;
        self
    }

    #[must_use]
    pub fn with_network(mut self) -> Self {
        self.network = true;
        self
    }

    #[must_use]
    pub fn with_mount(mut self) -> Self {
        self.mount = true;
        self
    }

    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Build an `unshare(1)` command line wrapping the given command
///
/// `--user` is always present (least-privilege default). PID isolation adds
/// `--fork` so the wrapped command becomes the namespace's init. Pure string
/// construction; only meaningful when executed on a Linux host.
#[must_use]
pub fn build_unshare_command(command: &str, opts: &UnshareOptions) -> String {
    let mut parts: Vec<String> = vec!["unshare".into(), "--user".into()];

    if opts.pid {
        parts.push("--pid".into());
        parts.push("--fork".into());
    }

    if opts.network {
        parts.push("--net".into());
    }

    if opts.mount {
        parts.push("--mount".into());
        parts.push("--mount-proc".into());
        if let Some(ref dir) = opts.working_dir {
            parts.push(format!("--wd={}", dir.display()));
        }
    }

    parts.push(command.to_string());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_flag_always_present() {
        let cmd = build_unshare_command("true", &UnshareOptions::new());
        assert_eq!(cmd, "unshare --user true");
    }

    #[test]
    fn test_pid_implies_fork() {
        let cmd = build_unshare_command("sleep 1", &UnshareOptions::new().with_pid());
        assert_eq!(cmd, "unshare --user --pid --fork sleep 1");
    }

    #[test]
    fn test_network_isolation_flag() {
        let cmd = build_unshare_command("curl example.com", &UnshareOptions::new().with_network());
        assert!(cmd.contains("--net"));
        assert!(!cmd.contains("--pid"));
    }

    #[test]
    fn test_mount_isolation_with_working_dir() {
        let opts = UnshareOptions::new().with_mount().with_working_dir("/work");
        let cmd = build_unshare_command("make", &opts);
        assert_eq!(cmd, "unshare --user --mount --mount-proc --wd=/work make");
    }

    #[test]
    fn test_working_dir_ignored_without_mount() {
        let opts = UnshareOptions::new().with_working_dir("/work");
        let cmd = build_unshare_command("true", &opts);
        assert!(!cmd.contains("--wd"));
    }

    #[test]
    fn test_full_isolation() {
        let opts = UnshareOptions::new().with_pid().with_network().with_mount();
        let cmd = build_unshare_command("sh -c 'id'", &opts);
        assert_eq!(
            cmd,
            "unshare --user --pid --fork --net --mount --mount-proc sh -c 'id'"
        );
    }

    #[test]
    fn test_detect_never_panics() {
        let support = detect_namespace_support();
        #[cfg(not(target_os = "linux"))]
        assert!(!support.any() && !support.unshare_available);
        #[cfg(target_os = "linux")]
        let _ = support.any();
    }
}
