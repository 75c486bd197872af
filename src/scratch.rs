//! Per-request scratch files.
//!
//! Every request gets its own names under the scratch directory, derived from
//! a fresh request id, so concurrent requests never share a path. A
//! [`ScratchPath`] removes its file when released or dropped; removal is
//! best-effort and failures are only logged.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A scratch file path owned by one request.
#[derive(Debug)]
pub struct ScratchPath {
    path: PathBuf,
    released: bool,
}

impl ScratchPath {
    /// `<dir>/<stem>-<request_id>.<extension>`
    pub fn new(dir: &Path, request_id: Uuid, stem: &str, extension: &str) -> Self {
        let name = format!("{stem}-{}.{extension}", request_id.as_simple());
        Self { path: dir.join(name), released: false }
    }

    /// Scratch location for a request's archive.
    pub fn archive(dir: &Path, request_id: Uuid) -> Self {
        Self::new(dir, request_id, "qrcodes", "zip")
    }

    /// Scratch location for a request's uploaded logo.
    ///
    /// Only the extension of `original_name` is kept, and only if it is plain
    /// ASCII alphanumeric; the rest of the client-supplied name never reaches
    /// the filesystem.
    pub fn logo_upload(dir: &Path, request_id: Uuid, original_name: &str) -> Self {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin")
            .to_ascii_lowercase();
        Self::new(dir, request_id, "logo", &extension)
    }

    /// The owned path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file; fails if anything already exists at the path.
    pub fn create(&self) -> io::Result<File> {
        OpenOptions::new().write(true).create_new(true).open(&self.path)
    }

    /// Removes the file now instead of on drop.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove scratch file"),
        }
    }
}

impl Drop for ScratchPath {
    fn drop(&mut self) {
        self.remove();
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_names_are_unique_per_request() {
        let dir = Path::new("/tmp/scratch");
        let a = ScratchPath::archive(dir, Uuid::new_v4());
        let b = ScratchPath::archive(dir, Uuid::new_v4());
        assert_ne!(a.path(), b.path());
        assert!(a.path().to_string_lossy().ends_with(".zip"));
    }

    #[test]
    fn test_logo_name_keeps_only_extension() {
        let id = Uuid::new_v4();
        let dir = Path::new("/tmp/scratch");
        let logo = ScratchPath::logo_upload(dir, id, "../../etc/Brand.PNG");
        assert_eq!(logo.path(), dir.join(format!("logo-{}.png", id.as_simple())));

        let odd = ScratchPath::logo_upload(dir, id, "logo.p$g");
        assert!(odd.path().to_string_lossy().ends_with(".bin"));
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchPath::archive(dir.path(), Uuid::new_v4());
        let path = scratch.path().to_path_buf();
        scratch.create().unwrap().write_all(b"zip").unwrap();
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_release_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchPath::archive(dir.path(), Uuid::new_v4());
        scratch.release();
    }

    #[test]
    fn test_create_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchPath::archive(dir.path(), Uuid::new_v4());
        scratch.create().unwrap();
        assert!(scratch.create().is_err());
    }
}
