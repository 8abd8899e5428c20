//! Mapping request targets onto files under the document root.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;

/// Why a target did not resolve to a servable file. Every variant is
/// answered with a 404; the distinction only shows up in logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveFailure {
    #[error("not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("path escapes the document root")]
    Traversal,
    #[error("not a regular file")]
    NotAFile,
    #[error("invalid path")]
    InvalidPath,
    #[error("i/o error: {0}")]
    Io(io::ErrorKind),
}

impl From<io::Error> for ResolveFailure {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => ResolveFailure::NotFound,
            io::ErrorKind::PermissionDenied => ResolveFailure::PermissionDenied,
            kind => ResolveFailure::Io(kind),
        }
    }
}

impl ResolveFailure {
    /// A plain miss, as opposed to a file that exists but cannot be served.
    pub fn is_not_found(&self) -> bool {
        *self == ResolveFailure::NotFound
    }
}

/// Outcome of resolving one target.
///
/// `path` always lies under the document root. For targets rejected before
/// any path was built (traversal, invalid bytes) it is the root itself.
#[derive(Debug)]
pub struct ResolvedResource {
    pub path: PathBuf,
    /// `None` when the file exists but its metadata could not be read.
    pub size: Option<u64>,
    pub failure: Option<ResolveFailure>,
    file: Option<File>,
}

impl ResolvedResource {
    fn found(path: PathBuf, file: File, size: Option<u64>) -> Self {
        Self {
            path,
            size,
            failure: None,
            file: Some(file),
        }
    }

    fn missing(path: PathBuf, failure: ResolveFailure) -> Self {
        Self {
            path,
            size: None,
            failure: Some(failure),
            file: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.file.is_some()
    }

    /// Hands out the open file, leaving the resource marked as consumed.
    pub fn take_file(&mut self) -> Option<File> {
        self.file.take()
    }
}

/// The directory all served files must live under.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
    index_file: String,
}

impl DocumentRoot {
    /// Canonicalizes `root`, which must be an existing directory.
    pub fn open(root: impl AsRef<Path>, index_file: impl Into<String>) -> io::Result<Self> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("document root {}: {}", root.display(), e),
            )
        })?;

        if !canonical.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("document root is not a directory: {}", root.display()),
            ));
        }

        Ok(Self {
            root: canonical,
            index_file: index_file.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves a request target and opens the file read-only.
    ///
    /// A target ending in `/` names that directory's index file.
    pub async fn resolve(&self, target: &str) -> ResolvedResource {
        let target: Cow<'_, str> = if target.ends_with('/') {
            Cow::Owned(format!("{}{}", target, self.index_file))
        } else {
            Cow::Borrowed(target)
        };

        let path = match self.join(&target) {
            Ok(p) => p,
            Err(failure) => return ResolvedResource::missing(self.root.clone(), failure),
        };

        let file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) => return ResolvedResource::missing(path, e.into()),
        };

        // Symlinks may still point outside the root.
        match tokio::fs::canonicalize(&path).await {
            Ok(real) if real.starts_with(&self.root) => {}
            Ok(_) => return ResolvedResource::missing(path, ResolveFailure::Traversal),
            Err(e) => return ResolvedResource::missing(path, e.into()),
        }

        match file_size(file.metadata().await, &path).await {
            Ok(size) => ResolvedResource::found(path, file, size),
            Err(failure) => ResolvedResource::missing(path, failure),
        }
    }

    /// Joins `target` onto the root segment by segment.
    fn join(&self, target: &str) -> Result<PathBuf, ResolveFailure> {
        let mut path = self.root.clone();

        for segment in target.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(ResolveFailure::Traversal),
                s if s.contains('\0') || s.contains('\\') => {
                    return Err(ResolveFailure::InvalidPath);
                }
                s => path.push(s),
            }
        }

        Ok(path)
    }
}

/// Size of an opened file, from its handle's metadata or, failing that,
/// from a fresh lookup of `path`. Directories are never servable; a size
/// neither lookup can provide is `None`.
async fn file_size(
    meta: io::Result<std::fs::Metadata>,
    path: &Path,
) -> Result<Option<u64>, ResolveFailure> {
    let meta = match meta {
        Ok(meta) => meta,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Handle metadata unavailable");
            match tokio::fs::metadata(path).await {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "File size unknown");
                    return Ok(None);
                }
            }
        }
    };

    if meta.is_dir() {
        return Err(ResolveFailure::NotAFile);
    }
    Ok(Some(meta.len()))
}
