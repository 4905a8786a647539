//! Implements BuildOutput on the local filesystem.
//!
//! Layout: `<root>/index.html`, `<root>/images/`, `<root>/static/` (copied
//! from the source static directory). The whole tree is recreated every run.

use crate::domain::DomainError;
use crate::ports::BuildOutput;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const IMAGES_DIR: &str = "images";
const STATIC_DIR: &str = "static";
const INDEX_FILE: &str = "index.html";

pub struct BuildDir {
    root: PathBuf,
    static_src: PathBuf,
}

impl BuildDir {
    pub fn new(root: impl AsRef<Path>, static_src: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            static_src: static_src.as_ref().to_path_buf(),
        }
    }

    /// Copy `src` into `dest` recursively. Returns the number of files copied.
    async fn copy_tree(src: &Path, dest: &Path) -> Result<usize, DomainError> {
        let mut copied = 0usize;
        let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];

        while let Some((from, to)) = pending.pop() {
            fs::create_dir_all(&to)
                .await
                .map_err(|e| DomainError::Build(format!("create {}: {}", to.display(), e)))?;
            let mut entries = fs::read_dir(&from)
                .await
                .map_err(|e| DomainError::Build(format!("read {}: {}", from.display(), e)))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| DomainError::Build(format!("read {}: {}", from.display(), e)))?
            {
                let kind = entry
                    .file_type()
                    .await
                    .map_err(|e| DomainError::Build(e.to_string()))?;
                let target = to.join(entry.file_name());
                if kind.is_dir() {
                    pending.push((entry.path(), target));
                } else {
                    fs::copy(entry.path(), &target).await.map_err(|e| {
                        DomainError::Build(format!("copy to {}: {}", target.display(), e))
                    })?;
                    copied += 1;
                }
            }
        }
        Ok(copied)
    }
}

#[async_trait::async_trait]
impl BuildOutput for BuildDir {
    async fn prepare(&self) -> Result<(), DomainError> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => debug!(path = %self.root.display(), "removed previous build"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DomainError::Build(format!(
                    "remove {}: {}",
                    self.root.display(),
                    e
                )));
            }
        }
        fs::create_dir_all(self.images_dir())
            .await
            .map_err(|e| DomainError::Build(format!("create {}: {}", self.root.display(), e)))?;

        let has_static = fs::try_exists(&self.static_src).await.map_err(|e| {
            DomainError::Build(format!("check {}: {}", self.static_src.display(), e))
        })?;
        if has_static {
            let copied = Self::copy_tree(&self.static_src, &self.root.join(STATIC_DIR)).await?;
            info!(src = %self.static_src.display(), files = copied, "copied static assets");
        } else {
            warn!(src = %self.static_src.display(), "static directory not found, skipping");
        }
        Ok(())
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    fn image_href(&self, file_name: &str) -> String {
        format!("{}/{}", IMAGES_DIR, file_name)
    }

    async fn write_index(&self, html: &str) -> Result<PathBuf, DomainError> {
        let path = self.root.join(INDEX_FILE);
        fs::write(&path, html.as_bytes())
            .await
            .map_err(|e| DomainError::Build(format!("write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), bytes = html.len(), "wrote report");
        Ok(path)
    }
}
