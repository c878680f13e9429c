use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Sandbox Error Types
// ============================================================================

/// Errors that can occur during path sandbox operations.
///
/// These errors indicate attempts to reach outside the project root, either
/// from user input or from link targets declared inside corpus documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    /// The sandbox root path does not exist
    #[error("Sandbox root does not exist: {path}")]
    RootNotFound { path: String },

    /// The sandbox root path is not a directory
    #[error("Sandbox root is not a directory: {path}")]
    RootNotDirectory { path: String },

    /// Failed to canonicalize the sandbox root path
    #[error("Failed to canonicalize sandbox root '{path}': {reason}")]
    RootCanonicalizationFailed { path: String, reason: String },

    /// Path contains ".." traversal components
    #[error("Path contains parent directory traversal: {path}")]
    ParentTraversal { path: String },

    /// Path is absolute and not within the sandbox root
    #[error("Absolute path not allowed: {path}")]
    AbsolutePath { path: String },

    /// Path resolves outside the sandbox root
    #[error("Path escapes sandbox root: {path} resolves outside {root}")]
    EscapeAttempt { path: String, root: String },

    /// Path is or contains a symlink (when symlinks are not allowed)
    #[error("Symlink not allowed: {path}")]
    SymlinkNotAllowed { path: String },

    /// Failed to canonicalize the joined path
    #[error("Failed to canonicalize path '{path}': {reason}")]
    PathCanonicalizationFailed { path: String, reason: String },
}

// ============================================================================
// SandboxRoot - Validated root directory for corpus operations
// ============================================================================

/// A validated project root for corpus reads and writes.
///
/// All paths derived from this root are guaranteed to stay within it. This
/// matters because link targets come out of document front matter: a corpus
/// file can declare `upstream: ../../etc/passwd` and the loader must treat
/// that as an unresolvable reference, never as a path to open.
///
/// The root is canonicalized at construction time; joined paths are rejected
/// when they contain `..` components, are absolute, or resolve outside the
/// root (including via symlinked directories).
///
/// # Example
///
/// ```rust,no_run
/// use docgate_utils::paths::SandboxRoot;
///
/// let root = SandboxRoot::new("/path/to/project")?;
/// let doc = root.join("docs/ARCHITECTURE_OVERVIEW.mdc")?;
/// println!("Safe path: {}", doc.as_path().display());
/// # Ok::<(), docgate_utils::paths::SandboxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    /// Canonicalized absolute path to the root
    root: PathBuf,
    /// Whether symlinked files inside the root are allowed
    allow_symlinks: bool,
}

impl SandboxRoot {
    /// Create a new sandbox root from a path.
    ///
    /// Canonicalizes the path and verifies it exists as a directory.
    /// Symlinks inside the root are permitted as long as they resolve within
    /// it; use [`strict()`](Self::strict) to reject them entirely.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        Self::build(root, true)
    }

    /// Create a sandbox root that rejects any symlinked component.
    pub fn strict(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        Self::build(root, false)
    }

    fn build(root: impl AsRef<Path>, allow_symlinks: bool) -> Result<Self, SandboxError> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(SandboxError::RootNotFound {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(SandboxError::RootNotDirectory {
                path: root_path.display().to_string(),
            });
        }

        // Canonicalize to get absolute path with symlinks resolved
        let canonical =
            root_path
                .canonicalize()
                .map_err(|e| SandboxError::RootCanonicalizationFailed {
                    path: root_path.display().to_string(),
                    reason: e.to_string(),
                })?;

        Ok(Self {
            root: canonical,
            allow_symlinks,
        })
    }

    /// Join a relative path, validating it stays within the sandbox.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path contains `..` traversal components
    /// - The path is absolute
    /// - The resolved path escapes the sandbox root
    /// - The path contains a symlink (strict mode only)
    pub fn join(&self, rel: impl AsRef<Path>) -> Result<SandboxPath, SandboxError> {
        let rel_path = rel.as_ref();

        if rel_path.is_absolute() {
            return Err(SandboxError::AbsolutePath {
                path: rel_path.display().to_string(),
            });
        }

        // Reject ".." components before any filesystem operations
        if rel_path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(SandboxError::ParentTraversal {
                path: rel_path.display().to_string(),
            });
        }

        let full_path = self.root.join(rel_path);

        if !self.allow_symlinks {
            self.check_symlinks_in_path(&full_path)?;
        }

        if full_path.exists() {
            let canonical =
                full_path
                    .canonicalize()
                    .map_err(|e| SandboxError::PathCanonicalizationFailed {
                        path: full_path.display().to_string(),
                        reason: e.to_string(),
                    })?;

            if !canonical.starts_with(&self.root) {
                return Err(SandboxError::EscapeAttempt {
                    path: rel_path.display().to_string(),
                    root: self.root.display().to_string(),
                });
            }

            Ok(SandboxPath {
                full: canonical,
                rel: rel_path.to_path_buf(),
            })
        } else {
            // For non-existent paths (autofix rename targets, new files) the
            // nearest existing ancestor must still resolve within the root,
            // or a symlinked directory could redirect the write outside.
            self.validate_ancestor_within_sandbox(&full_path, rel_path)?;

            Ok(SandboxPath {
                full: full_path,
                rel: rel_path.to_path_buf(),
            })
        }
    }

    /// Check if any component in the path is a symlink.
    fn check_symlinks_in_path(&self, path: &Path) -> Result<(), SandboxError> {
        let mut current = PathBuf::new();

        for component in path.components() {
            current.push(component);

            if current.exists()
                && current
                    .symlink_metadata()
                    .map(|m| m.is_symlink())
                    .unwrap_or(false)
            {
                return Err(SandboxError::SymlinkNotAllowed {
                    path: current.display().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validate that the nearest existing ancestor of a non-existent path
    /// stays within the sandbox when canonicalized.
    fn validate_ancestor_within_sandbox(
        &self,
        full_path: &Path,
        rel_path: &Path,
    ) -> Result<(), SandboxError> {
        let mut ancestor = full_path.to_path_buf();
        while !ancestor.exists() {
            if !ancestor.pop() {
                return Ok(());
            }
        }

        let canonical_ancestor =
            ancestor
                .canonicalize()
                .map_err(|e| SandboxError::PathCanonicalizationFailed {
                    path: ancestor.display().to_string(),
                    reason: e.to_string(),
                })?;

        if !canonical_ancestor.starts_with(&self.root) {
            return Err(SandboxError::EscapeAttempt {
                path: rel_path.display().to_string(),
                root: self.root.display().to_string(),
            });
        }

        Ok(())
    }

    /// Get the canonicalized root path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.root
    }
}

// ============================================================================
// SandboxPath - A validated path within a SandboxRoot
// ============================================================================

/// A path that has been validated to be within a `SandboxRoot`.
///
/// Cannot be constructed directly; must come from [`SandboxRoot::join()`].
#[derive(Debug, Clone)]
pub struct SandboxPath {
    /// Full path (root + relative)
    full: PathBuf,
    /// Relative path from root
    rel: PathBuf,
}

impl SandboxPath {
    /// Get the full path for I/O operations.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.full
    }

    /// Get the relative portion of the path, suitable for display or for
    /// storage in reports and history entries.
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.rel
    }

    /// Convert to a `PathBuf` for ownership.
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        self.full.clone()
    }
}

impl AsRef<Path> for SandboxPath {
    fn as_ref(&self) -> &Path {
        &self.full
    }
}

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> std::io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[test]
    fn test_sandbox_root_new_valid_directory() {
        let temp = create_test_dir();
        let root = SandboxRoot::new(temp.path());
        assert!(root.is_ok());
        let root = root.unwrap();
        assert!(root.as_path().is_absolute());
    }

    #[test]
    fn test_sandbox_root_new_nonexistent_path() {
        let result = SandboxRoot::new("/nonexistent/path/that/does/not/exist");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::RootNotFound { .. }
        ));
    }

    #[test]
    fn test_sandbox_root_new_file_not_directory() {
        let temp = create_test_dir();
        let file_path = temp.path().join("file.txt");
        std::fs::write(&file_path, "content").unwrap();

        let result = SandboxRoot::new(&file_path);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::RootNotDirectory { .. }
        ));
    }

    #[test]
    fn test_sandbox_join_simple_relative_path() {
        let temp = create_test_dir();
        let subdir = temp.path().join("docs");
        std::fs::create_dir(&subdir).unwrap();
        let file = subdir.join("file.mdc");
        std::fs::write(&file, "content").unwrap();

        let root = SandboxRoot::new(temp.path()).unwrap();
        let result = root.join("docs/file.mdc");
        assert!(result.is_ok());
        let sandbox_path = result.unwrap();
        assert_eq!(sandbox_path.relative(), Path::new("docs/file.mdc"));
    }

    #[test]
    fn test_sandbox_join_nonexistent_path_allowed() {
        let temp = create_test_dir();
        let root = SandboxRoot::new(temp.path()).unwrap();

        // Non-existent paths are allowed (for creating new files)
        let result = root.join("new/path/to/file.mdc");
        assert!(result.is_ok());
    }

    #[test]
    fn test_sandbox_join_rejects_parent_traversal() {
        let temp = create_test_dir();
        let root = SandboxRoot::new(temp.path()).unwrap();

        let result = root.join("../escape");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::ParentTraversal { .. }
        ));
    }

    #[test]
    fn test_sandbox_join_rejects_hidden_parent_traversal() {
        let temp = create_test_dir();
        let root = SandboxRoot::new(temp.path()).unwrap();

        let result = root.join("docs/../../../escape");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::ParentTraversal { .. }
        ));
    }

    #[test]
    fn test_sandbox_join_rejects_absolute_path() {
        let temp = create_test_dir();
        let root = SandboxRoot::new(temp.path()).unwrap();

        let result = root.join("/etc/passwd");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::AbsolutePath { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_sandbox_join_rejects_symlink_in_strict_mode() {
        let temp = create_test_dir();
        let target = temp.path().join("target.mdc");
        std::fs::write(&target, "content").unwrap();

        let link = temp.path().join("link.mdc");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let root = SandboxRoot::strict(temp.path()).unwrap();
        let result = root.join("link.mdc");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::SymlinkNotAllowed { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_sandbox_join_allows_internal_symlink_by_default() {
        let temp = create_test_dir();
        let target = temp.path().join("target.mdc");
        std::fs::write(&target, "content").unwrap();

        let link = temp.path().join("link.mdc");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let root = SandboxRoot::new(temp.path()).unwrap();
        let result = root.join("link.mdc");
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_sandbox_join_rejects_symlink_escape() {
        let temp = create_test_dir();
        let outside = TempDir::new().unwrap();
        let outside_file = outside.path().join("secret.txt");
        std::fs::write(&outside_file, "secret").unwrap();

        // Symlink inside the sandbox pointing outside
        let link = temp.path().join("escape_link");
        std::os::unix::fs::symlink(&outside_file, &link).unwrap();

        let root = SandboxRoot::new(temp.path()).unwrap();
        let result = root.join("escape_link");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::EscapeAttempt { .. }
        ));
    }

    /// Regression test for symlink traversal via non-existent paths: a
    /// symlinked directory pointing outside the root must not allow new
    /// files to be created through it.
    #[cfg(unix)]
    #[test]
    fn test_sandbox_join_rejects_symlink_dir_escape_via_nonexistent_path() {
        let temp = create_test_dir();
        let outside = TempDir::new().unwrap();

        let outside_dir = outside.path().join("elsewhere");
        std::fs::create_dir(&outside_dir).unwrap();

        let escape_link = temp.path().join("escape_dir");
        std::os::unix::fs::symlink(&outside_dir, &escape_link).unwrap();

        let root = SandboxRoot::new(temp.path()).unwrap();

        let result = root.join("escape_dir/new_file.mdc");
        assert!(
            result.is_err(),
            "Expected escape to be detected for non-existent path through symlinked directory"
        );
        assert!(matches!(
            result.unwrap_err(),
            SandboxError::EscapeAttempt { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_sandbox_join_allows_safe_symlink_dir_with_nonexistent_path() {
        let temp = create_test_dir();

        let inside_dir = temp.path().join("real_subdir");
        std::fs::create_dir(&inside_dir).unwrap();

        let safe_link = temp.path().join("link_to_subdir");
        std::os::unix::fs::symlink(&inside_dir, &safe_link).unwrap();

        let root = SandboxRoot::new(temp.path()).unwrap();

        let result = root.join("link_to_subdir/new_file.mdc");
        assert!(
            result.is_ok(),
            "Expected safe symlink with non-existent path to succeed"
        );
    }

    #[test]
    fn test_sandbox_path_accessors() {
        let temp = create_test_dir();
        let subdir = temp.path().join("a/b");
        std::fs::create_dir_all(&subdir).unwrap();
        let file = subdir.join("file.mdc");
        std::fs::write(&file, "content").unwrap();

        let root = SandboxRoot::new(temp.path()).unwrap();
        let sandbox_path = root.join("a/b/file.mdc").unwrap();

        assert!(sandbox_path.as_path().is_absolute());
        assert_eq!(sandbox_path.relative(), Path::new("a/b/file.mdc"));
        assert!(sandbox_path.to_path_buf().ends_with("file.mdc"));

        let path_ref: &Path = sandbox_path.as_ref();
        assert!(path_ref.ends_with("file.mdc"));
    }

    #[test]
    fn test_sandbox_error_display() {
        let err = SandboxError::ParentTraversal {
            path: "../escape".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("parent directory traversal"));
        assert!(msg.contains("../escape"));
    }

    #[test]
    fn test_ensure_dir_all_idempotent() {
        let temp = create_test_dir();
        let dir = temp.path().join("x/y/z");
        ensure_dir_all(&dir).unwrap();
        ensure_dir_all(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
