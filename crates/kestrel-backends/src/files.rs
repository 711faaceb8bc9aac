//! Catalog for a local directory of model weight files.

use async_trait::async_trait;
use kestrel_core::{Backend, BackendCatalog, RawModelDescriptor, Result as CoreResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognized as model weights.
const MODEL_EXTENSIONS: [&str; 3] = ["gguf", "bin", "safetensors"];

/// Catalog that enumerates model weight files under a directory.
pub struct FileStoreCatalog {
    /// Root directory scanned for weight files.
    root: PathBuf,
}

impl FileStoreCatalog {
    /// Creates a catalog scanning the given directory.
    pub fn new<T: Into<PathBuf>>(root: T) -> Self {
        Self { root: root.into() }
    }

    /// Returns the scanned root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_model_file(path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                MODEL_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(extension))
            })
    }
}

#[async_trait]
impl BackendCatalog for FileStoreCatalog {
    fn name(&self) -> &'static str {
        "local-file"
    }

    fn backend(&self) -> Backend {
        Backend::LocalFile
    }

    async fn list_models(&self) -> CoreResult<Vec<RawModelDescriptor>> {
        if !self.root.is_dir() {
            return Err(kestrel_core::Error::Backend(format!(
                "model directory does not exist: {}",
                self.root.display()
            )));
        }

        let mut descriptors = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !Self::is_model_file(path) {
                continue;
            }

            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("unknown")
                .to_owned();

            let mut descriptor = RawModelDescriptor::new(name);
            if let Ok(file_meta) = entry.metadata() {
                descriptor = descriptor.with_size_bytes(file_meta.len());
            }
            descriptor
                .metadata
                .insert("path".to_owned(), path.display().to_string());
            descriptors.push(descriptor);
        }

        // Directory iteration order is platform-dependent; sort for
        // deterministic discovery order.
        descriptors.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(descriptors)
    }

    async fn health_check(&self) -> bool {
        self.root.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) {
        if let Err(error) = fs::write(dir.join(name), bytes) {
            panic!("failed to write {name}: {error}");
        }
    }

    #[tokio::test]
    async fn test_lists_only_model_files_sorted() {
        let temp_dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temp dir: {error}"),
        };
        write_file(temp_dir.path(), "zephyr-7b.gguf", b"abcd");
        write_file(temp_dir.path(), "llama-3b.bin", b"ab");
        write_file(temp_dir.path(), "README.md", b"not a model");

        let catalog = FileStoreCatalog::new(temp_dir.path());
        let models = match catalog.list_models().await {
            Ok(models) => models,
            Err(error) => panic!("list failed: {error}"),
        };

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "llama-3b");
        assert_eq!(models[1].name, "zephyr-7b");
        assert_eq!(models[0].size_bytes, Some(2));
        assert!(models[0].metadata.contains_key("path"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let catalog = FileStoreCatalog::new("/nonexistent/kestrel/models");
        assert!(!catalog.health_check().await);
        assert!(catalog.list_models().await.is_err());
    }
}
