//! Per-dataset working directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DatascopeError, IoResultExt as _, Result};

/// Directory layout for one dataset under a workspace root:
/// `{root}/{name}/{stages,process,garbage,chunks,converted}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetWorkspace {
    pub root: PathBuf,
    pub stages: PathBuf,
    pub process: PathBuf,
    pub garbage: PathBuf,
    pub chunks: PathBuf,
    pub converted: PathBuf,
}

impl DatasetWorkspace {
    /// Create (or reuse) the directories for `dataset_name`.
    pub fn create(root: impl AsRef<Path>, dataset_name: &str) -> Result<Self> {
        validate_name(dataset_name)?;
        let base = root.as_ref().join(dataset_name);
        let ws = Self {
            stages: base.join("stages"),
            process: base.join("process"),
            garbage: base.join("garbage"),
            chunks: base.join("chunks"),
            converted: base.join("converted"),
            root: base,
        };
        for dir in [&ws.stages, &ws.process, &ws.garbage, &ws.chunks, &ws.converted] {
            fs::create_dir_all(dir).at_path(dir)?;
        }
        Ok(ws)
    }
}

/// Dataset names become a single directory component.
fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if bad {
        return Err(DatascopeError::Validation(format!(
            "invalid dataset name {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let ws = DatasetWorkspace::create(dir.path(), "sales").unwrap();
        assert_eq!(ws.root, dir.path().join("sales"));
        for sub in ["stages", "process", "garbage", "chunks", "converted"] {
            assert!(dir.path().join("sales").join(sub).is_dir(), "{sub}");
        }
        // idempotent
        assert_eq!(DatasetWorkspace::create(dir.path(), "sales").unwrap(), ws);
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["", "..", "a/b", "a\\b"] {
            let err = DatasetWorkspace::create(dir.path(), name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{name:?}");
        }
    }
}
