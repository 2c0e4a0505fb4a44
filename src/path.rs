/*!
 * Path Allowlist Validation
 * Pure decision function for filesystem access requests
 *
 * Advisory only: the caller decides whether a violation aborts execution.
 * The reference policy is log-and-continue.
 */

use crate::types::{AccessMode, FilesystemPolicy, SandboxViolation};
use std::path::{Component, Path, PathBuf};

/// Validate a declared path against the allowlist for the given access mode
///
/// Total over all inputs: returns a filesystem violation or `None`, never
/// fails. Traversal segments and embedded NUL bytes are rejected before the
/// allowlist is consulted, so canonicalization tricks cannot bypass an empty
/// or permissive list.
#[must_use]
pub fn validate_path(
    path: &Path,
    mode: AccessMode,
    policy: &FilesystemPolicy,
) -> Option<SandboxViolation> {
    if has_traversal(path) {
        return Some(SandboxViolation::filesystem(
            format!("suspicious path for {mode} access: contains traversal segment"),
            path,
        ));
    }

    if has_nul_byte(path) {
        return Some(SandboxViolation::filesystem(
            format!("suspicious path for {mode} access: contains NUL byte"),
            path,
        ));
    }

    if is_allowed(path, policy.paths(mode)) {
        None
    } else {
        Some(SandboxViolation::filesystem(
            format!("path not in the {mode} allowlist"),
            path,
        ))
    }
}

/// Whether the path contains a `..` segment
fn has_traversal(path: &Path) -> bool {
    path.components().any(|c| c == Component::ParentDir)
}

/// Whether the path embeds a NUL byte
fn has_nul_byte(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().contains(&0)
}

/// Boundary-aware allowlist membership
///
/// A path is permitted iff it equals an entry or sits below one; a plain
/// string prefix is not enough (`/home/user` must not match `/home/username`).
/// `Path::starts_with` compares whole components, which is exactly that rule.
fn is_allowed(path: &Path, allowlist: &[PathBuf]) -> bool {
    allowlist.iter().any(|entry| path.starts_with(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_policy(paths: &[&str]) -> FilesystemPolicy {
        FilesystemPolicy::new().with_read_paths(paths.iter().copied().map(PathBuf::from).collect())
    }

    #[test]
    fn test_exact_match_allowed() {
        let policy = read_policy(&["/home/user/project"]);
        assert!(validate_path(Path::new("/home/user/project"), AccessMode::Read, &policy).is_none());
    }

    #[test]
    fn test_child_path_allowed() {
        let policy = read_policy(&["/home/user/project"]);
        assert!(
            validate_path(Path::new("/home/user/project/src/main.rs"), AccessMode::Read, &policy)
                .is_none()
        );
    }

    #[test]
    fn test_prefix_without_separator_rejected() {
        let policy = read_policy(&["/home/user"]);
        let violation = validate_path(Path::new("/home/username/x"), AccessMode::Read, &policy);
        assert!(violation.is_some(), "/home/username must not match /home/user");
    }

    #[test]
    fn test_unlisted_path_rejected() {
        let policy = read_policy(&["/home/user/project"]);
        let violation =
            validate_path(Path::new("/etc/passwd"), AccessMode::Read, &policy).expect("violation");
        assert!(violation.description.contains("allowlist"));
        assert_eq!(violation.path.as_deref(), Some(Path::new("/etc/passwd")));
    }

    #[test]
    fn test_traversal_rejected_even_when_listed() {
        // /tmp/../etc resolves inside no allowlist check; the traversal alone
        // is the violation
        let policy = read_policy(&["/tmp", "/tmp/../etc"]);
        let violation =
            validate_path(Path::new("/tmp/../etc"), AccessMode::Read, &policy).expect("violation");
        assert!(violation.description.contains("traversal"));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let policy = read_policy(&["/tmp"]);
        let violation = validate_path(Path::new("/tmp/a\0b"), AccessMode::Read, &policy);
        assert!(violation.is_some());
    }

    #[test]
    fn test_mode_selects_allowlist() {
        let policy = FilesystemPolicy::new()
            .with_read_paths(vec![PathBuf::from("/data")])
            .with_write_paths(vec![PathBuf::from("/tmp")]);

        assert!(validate_path(Path::new("/data/x"), AccessMode::Read, &policy).is_none());
        assert!(validate_path(Path::new("/data/x"), AccessMode::Write, &policy).is_some());
        assert!(validate_path(Path::new("/tmp/x"), AccessMode::Write, &policy).is_none());
        assert!(validate_path(Path::new("/tmp/x"), AccessMode::Exec, &policy).is_some());
    }

    #[test]
    fn test_empty_allowlist_denies_all() {
        let policy = FilesystemPolicy::new();
        assert!(validate_path(Path::new("/anything"), AccessMode::Read, &policy).is_some());
        assert!(validate_path(Path::new(""), AccessMode::Read, &policy).is_some());
    }

    #[test]
    fn test_relative_paths_handled() {
        let policy = read_policy(&["tmp"]);
        assert!(validate_path(Path::new("tmp/file"), AccessMode::Read, &policy).is_none());
        assert!(validate_path(Path::new("tmpfile"), AccessMode::Read, &policy).is_some());
    }
}
