use crate::{
    actual::ActualDoc,
    config::Config,
    error::{Result, SplitCheckError},
    ground_truth::{parse_ground_truth_bytes, ExpectedResultSet},
    report::OverallValidationResult,
    scoring,
    store::FileStore,
    util::looks_like_url,
};
use std::path::Path;
use tracing::{debug, info};

/// Fetched artifact bytes plus what is known about their kind.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where ground-truth artifacts come from.
pub trait ArtifactSource {
    fn fetch(&self, target: &str) -> Result<Artifact>;
}

impl ArtifactSource for FileStore {
    fn fetch(&self, target: &str) -> Result<Artifact> {
        let (meta, bytes) = self.read(target)?;
        Ok(Artifact {
            name: meta.original_filename,
            content_type: Some(meta.content_type),
            bytes,
        })
    }
}

/// Treats targets as filesystem paths.
pub struct PathSource {
    max_bytes: u64,
}

impl PathSource {
    pub fn new(cfg: &Config) -> Self {
        Self {
            max_bytes: cfg.limits.max_artifact_bytes,
        }
    }
}

impl ArtifactSource for PathSource {
    fn fetch(&self, target: &str) -> Result<Artifact> {
        let path = Path::new(target);
        if !path.is_file() {
            return Err(SplitCheckError::NotFound(target.to_string()));
        }
        let size = std::fs::metadata(path)?.len();
        if size > self.max_bytes {
            return Err(SplitCheckError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(Artifact {
            name: target.to_string(),
            content_type: None,
            bytes: std::fs::read(path)?,
        })
    }
}

pub struct Validator<S: ArtifactSource> {
    cfg: Config,
    source: S,
}

impl<S: ArtifactSource> Validator<S> {
    pub fn new(cfg: &Config, source: S) -> Self {
        Self {
            cfg: cfg.clone(),
            source,
        }
    }

    /// Fetches, checks and parses the ground truth behind `target`.
    pub fn load_ground_truth(&self, target: &str) -> Result<ExpectedResultSet> {
        if self.cfg.security.reject_url_inputs && looks_like_url(target) {
            return Err(SplitCheckError::Rejected(format!("URL inputs are disabled: {target}")));
        }

        let artifact = self.source.fetch(target)?;
        let size = artifact.bytes.len() as u64;
        if size > self.cfg.limits.max_artifact_bytes {
            return Err(SplitCheckError::TooLarge {
                size,
                max: self.cfg.limits.max_artifact_bytes,
            });
        }
        self.check_kind(&artifact)?;
        debug!(name = %artifact.name, size, "ground truth fetched");

        parse_ground_truth_bytes(&artifact.bytes)
    }

    pub fn validate(&self, target: &str, actual: &[ActualDoc]) -> Result<OverallValidationResult> {
        let expected = self.load_ground_truth(target)?;
        info!(
            ground_truth = %target,
            expected = expected.split_docs.len(),
            actual = actual.len(),
            "validating split"
        );
        Ok(scoring::validate_split(&expected, actual))
    }

    fn check_kind(&self, artifact: &Artifact) -> Result<()> {
        let store = &self.cfg.store;
        if let Some(ct) = artifact.content_type.as_deref() {
            if store.ground_truth_content_types.iter().any(|c| c == ct) {
                return Ok(());
            }
        }
        let ext = Path::new(&artifact.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if let Some(ext) = ext {
            if store.ground_truth_extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                return Ok(());
            }
        }
        Err(SplitCheckError::WrongKind(artifact.name.clone()))
    }
}
