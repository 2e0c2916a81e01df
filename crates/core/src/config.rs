//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the artifact loader.
//! Library code never reads process-wide environment variables; the binary does that and hands
//! the result in.

use crate::constants::{ARTIFACT_EXTENSIONS, DEFAULT_ARTIFACT_DIR, SCHEMA_ARTIFACT_STEM};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    artifact_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `artifact_dir` is not a directory.
    pub fn new(artifact_dir: PathBuf) -> CoreResult<Self> {
        if !artifact_dir.is_dir() {
            return Err(CoreError::InvalidInput(format!(
                "artifact directory {} does not exist",
                artifact_dir.display()
            )));
        }

        Ok(Self { artifact_dir })
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }
}

fn looks_like_artifact_dir(path: &Path) -> bool {
    path.is_dir()
        && ARTIFACT_EXTENSIONS
            .iter()
            .any(|ext| path.join(format!("{SCHEMA_ARTIFACT_STEM}.{ext}")).is_file())
}

/// Resolve the artifact directory without reading environment variables.
///
/// If `override_dir` is provided, it must be a directory containing a feature schema file.
/// Otherwise this searches for `artifacts/` relative to the current working directory and
/// then walks up from `CARGO_MANIFEST_DIR`.
pub fn resolve_artifact_dir(override_dir: Option<PathBuf>) -> CoreResult<PathBuf> {
    if let Some(dir) = override_dir {
        if looks_like_artifact_dir(&dir) {
            return Ok(dir);
        }
        return Err(CoreError::InvalidInput(format!(
            "artifact directory override {} has no {SCHEMA_ARTIFACT_STEM} file",
            dir.display()
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_ARTIFACT_DIR);
    if looks_like_artifact_dir(&cwd_relative) {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_ARTIFACT_DIR);
        if looks_like_artifact_dir(&candidate) {
            return Ok(candidate);
        }
    }

    Err(CoreError::InvalidInput(format!(
        "could not locate {DEFAULT_ARTIFACT_DIR}/ directory containing a feature schema"
    )))
}
