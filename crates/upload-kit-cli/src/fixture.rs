// crates/upload-kit-cli/src/fixture.rs
// ============================================================================
// Module: Upload Fixtures
// Description: Temporary files placed in the server's upload root.
// Purpose: Give the MCP smoke tests a known file and guarantee its removal.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! The smoke and progress commands write a file into the upload root, ask
//! the server to upload it by relative name, then delete it. A
//! [`TestFileGuard`] deletes the file on drop so early returns and failed
//! tool calls still clean up.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

// ============================================================================
// SECTION: Specs
// ============================================================================

/// Repeated-line file description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestFileSpec {
    /// File name relative to the upload root.
    pub file_name: &'static str,
    /// Line written `repeat` times.
    pub line: &'static str,
    /// Repetitions.
    pub repeat: usize,
}

/// Small file for the basic upload smoke test.
pub const SMOKE_TEST_FILE: TestFileSpec = TestFileSpec {
    file_name: "test-upload.txt",
    line: "Hello, this is a test file for MCP S3 upload!\n",
    repeat: 100,
};

/// Large file for the progress test (roughly 2 MB).
pub const PROGRESS_TEST_FILE: TestFileSpec = TestFileSpec {
    file_name: "large-test.txt",
    line: "This is test data for progress tracking.\n",
    repeat: 50_000,
};

impl TestFileSpec {
    /// Returns the full file contents.
    #[must_use]
    pub fn contents(&self) -> String {
        self.line.repeat(self.repeat)
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.line.len().saturating_mul(self.repeat)
    }
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Owns a written test file and removes it on drop.
#[derive(Debug)]
pub struct TestFileGuard {
    /// Absolute path of the file.
    path: PathBuf,
    /// Bytes written.
    size: u64,
    /// Cleared once the file is removed explicitly.
    armed: bool,
}

impl TestFileGuard {
    /// Writes `spec` into `root`, creating `root` when missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory or file cannot be written.
    pub fn create(root: &Path, spec: &TestFileSpec) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        let path = root.join(spec.file_name);
        let contents = spec.contents();
        fs::write(&path, contents.as_bytes())?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "test file written");
        Ok(Self {
            path,
            size: u64::try_from(contents.len()).unwrap_or(u64::MAX),
            armed: true,
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of bytes written.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Removes the file now.
    ///
    /// Returns `false` when the file was already gone.
    ///
    /// # Errors
    ///
    /// Returns an I/O error other than "not found".
    pub fn remove(mut self) -> io::Result<bool> {
        self.armed = false;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl Drop for TestFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %err, "test file cleanup failed");
        }
    }
}
