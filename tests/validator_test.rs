/*!
 * Path Validator Integration Tests
 * Totality, boundary-aware prefixes, and traversal defense
 */

use agent_sandbox::{validate_path, AccessMode, FilesystemPolicy, ViolationKind};
use std::path::{Path, PathBuf};

fn policy() -> FilesystemPolicy {
    FilesystemPolicy::new()
        .with_read_paths(vec![PathBuf::from("/home/user/project")])
        .with_write_paths(vec![PathBuf::from("/tmp")])
        .with_exec_paths(vec![PathBuf::from("/usr/bin")])
}

#[test]
fn test_outside_allowlist_is_filesystem_violation() {
    let violation = validate_path(Path::new("/etc/passwd"), AccessMode::Read, &policy())
        .expect("violation for unlisted path");
    assert_eq!(violation.kind, ViolationKind::Filesystem);
    assert!(violation.description.contains("allowlist"));
}

#[test]
fn test_prefix_requires_separator_boundary() {
    let policy = FilesystemPolicy::new().with_read_paths(vec![PathBuf::from("/home/user")]);
    assert!(
        validate_path(Path::new("/home/username/x"), AccessMode::Read, &policy).is_some(),
        "/home/username must not satisfy the /home/user entry"
    );
    assert!(validate_path(Path::new("/home/user/x"), AccessMode::Read, &policy).is_none());
    assert!(validate_path(Path::new("/home/user"), AccessMode::Read, &policy).is_none());
}

#[test]
fn test_traversal_rejected_for_every_mode() {
    for mode in [AccessMode::Read, AccessMode::Write, AccessMode::Exec] {
        let violation = validate_path(Path::new("/tmp/../etc/shadow"), mode, &policy())
            .expect("traversal violation");
        assert_eq!(violation.kind, ViolationKind::Filesystem);
    }
}

#[test]
fn test_nul_byte_rejected_regardless_of_allowlist() {
    let permissive = FilesystemPolicy::new().with_read_paths(vec![PathBuf::from("/")]);
    assert!(validate_path(Path::new("/tmp/\0evil"), AccessMode::Read, &permissive).is_some());
}

#[test]
fn test_total_over_arbitrary_inputs() {
    let empty = FilesystemPolicy::new();
    let inputs = ["", ".", "..", "/", "//", "a\0b", "C:\\windows", "relative/path", "~user"];
    for input in inputs {
        for mode in [AccessMode::Read, AccessMode::Write, AccessMode::Exec] {
            // Must decide, never panic
            let _ = validate_path(Path::new(input), mode, &empty);
        }
    }
}

#[test]
fn test_real_directory_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    std::fs::write(root.join("tool-output.json"), b"{}").expect("write");

    let policy = FilesystemPolicy::new().with_write_paths(vec![root.clone()]);
    assert!(validate_path(&root.join("tool-output.json"), AccessMode::Write, &policy).is_none());

    // Sibling directory sharing the name as a prefix must not match
    let sibling = root.as_os_str().to_os_string();
    let mut sibling = sibling.into_string().expect("utf8 tempdir");
    sibling.push_str("-evil");
    assert!(validate_path(Path::new(&sibling), AccessMode::Write, &policy).is_some());
}

#[test]
fn test_exec_mode_uses_exec_allowlist() {
    assert!(validate_path(Path::new("/usr/bin/rg"), AccessMode::Exec, &policy()).is_none());
    assert!(validate_path(Path::new("/usr/bin/rg"), AccessMode::Write, &policy()).is_some());
}
