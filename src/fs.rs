//! Filesystem collaborator used by uploads and downloads
//!
//! Files are addressed by a relative path inside one of a fixed set of
//! directories. Which physical location a directory maps to is owned
//! entirely by the [`FileSystem`] implementation.

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Well-known storage locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Directory {
    /// User documents
    #[default]
    Documents,
    /// Private application data
    Data,
    /// Cache that may be purged by the platform
    Cache,
    /// Application-specific external storage
    External,
    /// Shared external storage
    ExternalStorage,
}

impl Directory {
    /// Every directory, in declaration order
    pub const ALL: [Directory; 5] = [
        Directory::Documents,
        Directory::Data,
        Directory::Cache,
        Directory::External,
        Directory::ExternalStorage,
    ];

    fn dir_name(self) -> &'static str {
        match self {
            Directory::Documents => "documents",
            Directory::Data => "data",
            Directory::Cache => "cache",
            Directory::External => "external",
            Directory::ExternalStorage => "external-storage",
        }
    }
}

/// A file location owned by the filesystem collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Path relative to `directory`
    pub path: String,
    /// Directory the path is relative to
    #[serde(default)]
    pub directory: Directory,
}

impl FileRef {
    /// A file inside [`Directory::Documents`]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            directory: Directory::default(),
        }
    }

    /// A file inside `directory`
    pub fn in_directory(path: impl Into<String>, directory: Directory) -> Self {
        Self {
            path: path.into(),
            directory,
        }
    }

    /// Last path segment, used as the multipart filename
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
    }
}

/// Read/write access to directory-scoped files
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the whole file
    async fn read_file(&self, path: &str, directory: Directory) -> Result<Bytes>;

    /// Write `data`, replacing any existing file, and return where it landed
    async fn write_file(&self, path: &str, directory: Directory, data: Bytes) -> Result<PathBuf>;
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    roots: HashMap<Directory, PathBuf>,
}

impl LocalFileSystem {
    /// Map every directory to a subdirectory of `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            roots: Directory::ALL
                .into_iter()
                .map(|dir| (dir, root.join(dir.dir_name())))
                .collect(),
        }
    }

    /// Override the location of a single directory
    pub fn directory(mut self, directory: Directory, path: impl Into<PathBuf>) -> Self {
        self.roots.insert(directory, path.into());
        self
    }

    /// Resolve `path` inside `directory`, refusing to escape it
    pub fn resolve(&self, path: &str, directory: Directory) -> std::io::Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if path.is_empty() || escapes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path must be relative and stay inside its directory: {:?}", path),
            ));
        }

        let root = self.roots.get(&directory).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no location configured for {:?}", directory),
            )
        })?;
        Ok(root.join(relative))
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::with_root(std::env::temp_dir().join("tether"))
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn read_file(&self, path: &str, directory: Directory) -> Result<Bytes> {
        let full_path = self.resolve(path, directory).map_err(|source| Error::FileAccess {
            path: PathBuf::from(path),
            source,
        })?;

        tracing::trace!(path = %full_path.display(), "reading file");
        let content = tokio::fs::read(&full_path)
            .await
            .map_err(|source| Error::FileAccess {
                path: full_path,
                source,
            })?;
        Ok(content.into())
    }

    async fn write_file(&self, path: &str, directory: Directory, data: Bytes) -> Result<PathBuf> {
        let full_path = self.resolve(path, directory).map_err(|source| Error::FileWrite {
            path: PathBuf::from(path),
            source,
        })?;
        let write_error = |source| Error::FileWrite {
            path: full_path.clone(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        tracing::trace!(path = %full_path.display(), bytes = data.len(), "writing file");
        let mut file = tokio::fs::File::create(&full_path)
            .await
            .map_err(write_error)?;
        file.write_all(&data).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;

        Ok(full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let temp = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::with_root(temp.path());

        let written = fs
            .write_file("nested/dir/data.bin", Directory::Cache, Bytes::from_static(b"\x00\x01abc"))
            .await
            .unwrap();
        assert_eq!(written, temp.path().join("cache/nested/dir/data.bin"));

        let read = fs.read_file("nested/dir/data.bin", Directory::Cache).await.unwrap();
        assert_eq!(read.as_ref(), b"\x00\x01abc");
    }

    #[tokio::test]
    async fn test_missing_file_is_access_error() {
        let temp = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::with_root(temp.path());

        let err = fs.read_file("nope.txt", Directory::Documents).await.unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[tokio::test]
    async fn test_rejects_paths_escaping_the_directory() {
        let temp = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::with_root(temp.path());

        for path in ["../secret", "/etc/passwd", "a/../../b", ""] {
            let err = fs
                .write_file(path, Directory::Data, Bytes::from_static(b"x"))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::FileWrite { .. }), "{path}");
        }
    }

    #[test]
    fn test_directory_override() {
        let fs = LocalFileSystem::with_root("/base").directory(Directory::Cache, "/var/cache/app");
        assert_eq!(
            fs.resolve("x.bin", Directory::Cache).unwrap(),
            PathBuf::from("/var/cache/app/x.bin")
        );
        assert_eq!(
            fs.resolve("x.bin", Directory::Documents).unwrap(),
            PathBuf::from("/base/documents/x.bin")
        );
    }

    #[test]
    fn test_file_ref_file_name() {
        assert_eq!(FileRef::new("photos/cat.png").file_name(), "cat.png");
        assert_eq!(FileRef::new("").file_name(), "file");
    }
}
