// crates/upload-kit-cli/src/tests/fixture.rs
// ============================================================================
// Module: Upload Fixture Tests
// Description: Unit tests for test file creation and cleanup.
// Purpose: Ensure upload fixtures never outlive the command that wrote them.
// Dependencies: tempfile
// ============================================================================

use crate::fixture::PROGRESS_TEST_FILE;
use crate::fixture::SMOKE_TEST_FILE;
use crate::fixture::TestFileGuard;

#[test]
fn specs_match_expected_sizes() {
    assert_eq!(SMOKE_TEST_FILE.size(), 4_600);
    assert_eq!(SMOKE_TEST_FILE.contents().len(), SMOKE_TEST_FILE.size());
    assert_eq!(PROGRESS_TEST_FILE.size(), 2_050_000);
}

#[test]
fn create_makes_missing_root_and_remove_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("uploads");
    let guard = TestFileGuard::create(&root, &SMOKE_TEST_FILE).unwrap();
    let path = guard.path().to_path_buf();
    assert_eq!(path, root.join("test-upload.txt"));
    assert_eq!(guard.size(), 4_600);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SMOKE_TEST_FILE.contents());
    assert!(guard.remove().unwrap());
    assert!(!path.exists());
}

#[test]
fn remove_reports_file_already_gone() {
    let dir = tempfile::tempdir().unwrap();
    let guard = TestFileGuard::create(dir.path(), &SMOKE_TEST_FILE).unwrap();
    std::fs::remove_file(guard.path()).unwrap();
    assert!(!guard.remove().unwrap());
}

#[test]
fn drop_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = {
        let guard = TestFileGuard::create(dir.path(), &PROGRESS_TEST_FILE).unwrap();
        guard.path().to_path_buf()
    };
    assert!(!path.exists());
}

#[test]
fn create_fails_when_root_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    assert!(TestFileGuard::create(&blocker, &SMOKE_TEST_FILE).is_err());
}
