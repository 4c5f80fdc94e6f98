//! FsProjectChecker - ディスク上のプロジェクトレイアウトを検査する

use std::path::Path;

use crate::domain::{CreateError, MANIFEST_PATH, Manifest, ManifestIssue};
use crate::ports::ProjectChecker;
use crate::typed::Exported;

/// FsProjectChecker は最小限のレイアウト検査を行う
///
/// - タスクパスはディレクトリであること
/// - manifest を渡されていなければ `config/manifest.json` が存在すること
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProjectChecker;

impl FsProjectChecker {
    pub fn new() -> Self {
        Self
    }
}

impl ProjectChecker for FsProjectChecker {
    fn is_valid_task_project(
        &self,
        task_path: &Path,
        manifest: Option<&Manifest>,
    ) -> Result<(), CreateError> {
        let invalid = |reason: &str| CreateError::InvalidProject {
            path: task_path.to_path_buf(),
            reason: reason.to_string(),
        };
        if !task_path.is_dir() {
            return Err(invalid("not a directory"));
        }
        if manifest.is_none() && !task_path.join(MANIFEST_PATH).is_file() {
            return Err(invalid("missing config/manifest.json"));
        }
        Ok(())
    }

    fn check_export_to_be_task(
        &self,
        exported: &Exported,
        manifest: &Manifest,
    ) -> Result<(), CreateError> {
        if exported.is_task() {
            return Ok(());
        }
        Err(CreateError::InvalidExport {
            entry: manifest.main.clone(),
            reason: format!("exported {} must implement Task", exported.describe()),
        })
    }

    fn valid_manifest(&self, manifest: &Manifest) -> Vec<ManifestIssue> {
        manifest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_directory_is_invalid() {
        let checker = FsProjectChecker::new();
        let err = checker
            .is_valid_task_project(Path::new("/definitely/not/here"), None)
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidProject { reason, .. } if reason == "not a directory"));
    }

    #[test]
    fn in_memory_manifest_skips_file_check() {
        let dir = tempfile::tempdir().unwrap();
        let checker = FsProjectChecker::new();
        let manifest = Manifest::new("t", "entry");

        assert!(checker.is_valid_task_project(dir.path(), None).is_err());
        assert!(checker.is_valid_task_project(dir.path(), Some(&manifest)).is_ok());
    }

    #[test]
    fn value_export_is_rejected() {
        let checker = FsProjectChecker::new();
        let manifest = Manifest::new("t", "entry");
        let err = checker
            .check_export_to_be_task(&Exported::Value(json!("nope")), &manifest)
            .unwrap_err();
        assert!(err.to_string().contains("exported string must implement Task"));
    }
}
