//! Local artifact store.
//!
//! Layout under the store root:
//!
//! ```text
//! files/<id><ext>      stored bytes
//! metadata/<id>.json   ArtifactMeta sidecar
//! ```

use crate::{
    config::Config,
    error::{Result, SplitCheckError},
    util::{now_rfc3339, sha256_hex},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub id: String,
    pub filename: String,
    pub original_filename: String,
    pub size: u64,
    pub content_type: String,
    pub upload_date: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub files: Vec<ArtifactMeta>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHealth {
    pub status: String,
    pub storage_path: String,
    pub storage_available: bool,
}

pub struct FileStore {
    root: PathBuf,
    max_bytes: u64,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.paths.store_dir, cfg.limits.max_artifact_bytes)
    }

    fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    fn meta_dir(&self) -> PathBuf {
        self.root.join("metadata")
    }

    fn meta_path(&self, id: &Uuid) -> PathBuf {
        self.meta_dir().join(format!("{id}.json"))
    }

    pub fn health(&self) -> StoreHealth {
        let available = self.files_dir().is_dir() && self.meta_dir().is_dir();
        StoreHealth {
            status: if available { "healthy" } else { "uninitialized" }.into(),
            storage_path: self.files_dir().display().to_string(),
            storage_available: available,
        }
    }

    /// Copies a file into the store.
    pub fn put(&self, src: &Path) -> Result<ArtifactMeta> {
        if !src.exists() {
            return Err(SplitCheckError::NotFound(src.display().to_string()));
        }
        let size = std::fs::metadata(src)?.len();
        self.check_size(size)?;
        let bytes = std::fs::read(src)?;
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.put_bytes(&name, &bytes)
    }

    pub fn put_bytes(&self, original_filename: &str, bytes: &[u8]) -> Result<ArtifactMeta> {
        self.check_size(bytes.len() as u64)?;
        std::fs::create_dir_all(self.files_dir())?;
        std::fs::create_dir_all(self.meta_dir())?;

        let id = Uuid::new_v4();
        let ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let filename = format!("{id}{ext}");
        let path = self.files_dir().join(&filename);

        let meta = ArtifactMeta {
            id: id.to_string(),
            filename,
            original_filename: original_filename.to_string(),
            size: bytes.len() as u64,
            content_type: guess_content_type(original_filename).to_string(),
            upload_date: now_rfc3339(),
            path: path.display().to_string(),
            sha256: sha256_hex(bytes),
        };
        write_pair(&path, bytes, &self.meta_path(&id), &meta)?;

        info!(id = %meta.id, name = %meta.original_filename, size = meta.size, "artifact stored");
        Ok(meta)
    }

    /// Stores each file, skipping the ones that fail.
    pub fn put_many(&self, srcs: &[PathBuf]) -> Vec<ArtifactMeta> {
        let mut stored = Vec::with_capacity(srcs.len());
        for src in srcs {
            match self.put(src) {
                Ok(meta) => stored.push(meta),
                Err(err) => warn!("failed to store {}: {err}", src.display()),
            }
        }
        stored
    }

    pub fn metadata(&self, id: &str) -> Result<ArtifactMeta> {
        let id = parse_id(id)?;
        let meta_path = self.meta_path(&id);
        if !meta_path.exists() {
            return Err(SplitCheckError::NotFound(id.to_string()));
        }
        let raw = std::fs::read(&meta_path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Returns the metadata and stored bytes.
    pub fn read(&self, id: &str) -> Result<(ArtifactMeta, Vec<u8>)> {
        let meta = self.metadata(id)?;
        let path = Path::new(&meta.path);
        if !path.exists() {
            return Err(SplitCheckError::NotFound(format!("{id} (file missing on disk)")));
        }
        let bytes = std::fs::read(path)?;
        debug!(id, size = bytes.len(), "artifact read");
        Ok((meta, bytes))
    }

    pub fn export(&self, id: &str, dest: &Path) -> Result<ArtifactMeta> {
        let (meta, bytes) = self.read(id)?;
        std::fs::write(dest, bytes)?;
        Ok(meta)
    }

    /// Newest first. `total` counts every stored artifact.
    pub fn list(&self, skip: usize, limit: usize) -> Result<ArtifactList> {
        let meta_dir = self.meta_dir();
        if !meta_dir.is_dir() {
            return Ok(ArtifactList {
                files: Vec::new(),
                total: 0,
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&meta_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = std::fs::read(&path)?;
            match serde_json::from_slice::<ArtifactMeta>(&raw) {
                Ok(meta) => files.push(meta),
                Err(err) => warn!("skipping unreadable metadata {}: {err}", path.display()),
            }
        }

        files.sort_by(|a, b| {
            uploaded_at(b)
                .cmp(&uploaded_at(a))
                .then_with(|| a.id.cmp(&b.id))
        });
        let total = files.len();
        let files = files.into_iter().skip(skip).take(limit).collect();
        Ok(ArtifactList { files, total })
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let meta = self.metadata(id)?;
        let path = Path::new(&meta.path);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        std::fs::remove_file(self.meta_path(&parse_id(id)?))?;
        info!(id, "artifact deleted");
        Ok(())
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_bytes {
            return Err(SplitCheckError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Writes the data file, then its sidecar. A failed sidecar write removes
/// the data file so no unlisted bytes stay behind.
fn write_pair(data_path: &Path, bytes: &[u8], meta_path: &Path, meta: &ArtifactMeta) -> Result<()> {
    std::fs::write(data_path, bytes)?;
    let sidecar = serde_json::to_vec_pretty(meta)
        .map_err(SplitCheckError::from)
        .and_then(|raw| std::fs::write(meta_path, raw).map_err(SplitCheckError::from));
    if let Err(err) = sidecar {
        let _ = std::fs::remove_file(data_path);
        return Err(err);
    }
    Ok(())
}

/// Unparseable dates sort last.
fn uploaded_at(meta: &ArtifactMeta) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(&meta.upload_date, &Rfc3339).ok()
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| SplitCheckError::InvalidId(id.to_string()))
}

pub fn guess_content_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_sidecar_removes_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("a.xml");
        let meta = ArtifactMeta {
            id: "a".into(),
            filename: "a.xml".into(),
            original_filename: "a.xml".into(),
            size: 4,
            content_type: "application/xml".into(),
            upload_date: now_rfc3339(),
            path: data.display().to_string(),
            sha256: sha256_hex(b"<R/>"),
        };

        let err = write_pair(&data, b"<R/>", &dir.path().join("missing/a.json"), &meta).unwrap_err();
        assert!(matches!(err, SplitCheckError::Io(_)));
        assert!(!data.exists());
    }
}
