//! ProjectChecker port - プロジェクト形状と export の検査
//!
//! ディスク上のレイアウト検査は外部協力者として扱い、ここでは契約だけを定義します。

use std::path::Path;

use crate::domain::{CreateError, Manifest, ManifestIssue};
use crate::typed::Exported;

/// ProjectChecker はタスク生成前の検証を行う
///
/// # 契約
/// - `is_valid_task_project`: レイアウトが不正なら `CreateError::InvalidProject`
/// - `check_export_to_be_task`: export が Task でなければ `CreateError::InvalidExport`
/// - `valid_manifest`: 問題の一覧（空なら妥当）
pub trait ProjectChecker: Send + Sync {
    fn is_valid_task_project(
        &self,
        task_path: &Path,
        manifest: Option<&Manifest>,
    ) -> Result<(), CreateError>;

    fn check_export_to_be_task(
        &self,
        exported: &Exported,
        manifest: &Manifest,
    ) -> Result<(), CreateError>;

    fn valid_manifest(&self, manifest: &Manifest) -> Vec<ManifestIssue>;
}
