//! Manifest - タスクの静的な記述子
//!
//! `config/manifest.json` に置かれる JSON ドキュメント。
//! タスクの identity (`name`)、エントリポイント (`main`)、
//! 呼び出しを許可された skill とそのメソッド一覧 (`skills`) を宣言します。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::CreateError;
use super::state::TaskKind;
use crate::ports::ProjectChecker;

/// プロジェクトルートからの manifest の相対パス
pub const MANIFEST_PATH: &str = "config/manifest.json";

/// Manifest はタスクの宣言
///
/// # JSON 形状
/// ```json
/// {
///   "name": "weather-report",
///   "main": "weather_report",
///   "type": "task",
///   "skills": { "weather": ["getTemp", "getHumidity"] }
/// }
/// ```
///
/// `skills` が無いことと空の map であることは区別されます（どちらも何も許可しない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub main: String,

    /// 宣言上の種別。無ければ Task 実装の `kind()` に従う。
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TaskKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<BTreeMap<String, Vec<String>>>,
}

/// valid_manifest が返す個々の問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIssue {
    /// 問題のあるフィールドへのパス（例: `skills.weather[1]`）
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Manifest {
    pub fn new(name: impl Into<String>, main: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main: main.into(),
            kind: None,
            skills: None,
        }
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// skill と許可するメソッドを追加する
    pub fn grant<I, S>(mut self, skill: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills
            .get_or_insert_with(BTreeMap::new)
            .insert(skill.into(), methods.into_iter().map(Into::into).collect());
        self
    }

    /// `skill` に対して許可されたメソッド一覧
    pub fn granted_methods(&self, skill: &str) -> Option<&[String]> {
        self.skills.as_ref()?.get(skill).map(Vec::as_slice)
    }

    /// manifest の形状を検査する
    ///
    /// 問題が無ければ空の Vec を返します。
    pub fn validate(&self) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ManifestIssue {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.main.trim().is_empty() {
            issues.push(ManifestIssue {
                field: "main".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if let Some(skills) = &self.skills {
            for (skill, methods) in skills {
                if skill.trim().is_empty() {
                    issues.push(ManifestIssue {
                        field: "skills".to_string(),
                        message: "skill names must not be empty".to_string(),
                    });
                }
                for (i, method) in methods.iter().enumerate() {
                    if method.trim().is_empty() {
                        issues.push(ManifestIssue {
                            field: format!("skills.{skill}[{i}]"),
                            message: "method names must not be empty".to_string(),
                        });
                    }
                }
            }
        }
        issues
    }

    /// project ディレクトリから manifest を読み込む
    ///
    /// 1. checker でプロジェクト形状を確認
    /// 2. `config/manifest.json` を読んでデシリアライズ
    /// 3. checker で manifest の内容を検証
    pub fn load(task_path: &Path, checker: &dyn ProjectChecker) -> Result<Self, CreateError> {
        checker.is_valid_task_project(task_path, None)?;

        let path = task_path.join(MANIFEST_PATH);
        let raw = std::fs::read_to_string(&path).map_err(|e| CreateError::ManifestRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let manifest: Manifest =
            serde_json::from_str(&raw).map_err(|e| CreateError::ManifestRead {
                path: path.clone(),
                reason: format!("json decode: {e}"),
            })?;

        let issues = checker.valid_manifest(&manifest);
        if !issues.is_empty() {
            return Err(CreateError::InvalidManifest {
                path: task_path.to_path_buf(),
                issues,
            });
        }
        Ok(manifest)
    }

    pub fn manifest_path(task_path: &Path) -> PathBuf {
        task_path.join(MANIFEST_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::FsProjectChecker;
    use serde_json::json;

    #[test]
    fn skills_section_is_optional() {
        let m: Manifest = serde_json::from_value(json!({
            "name": "t",
            "main": "entry",
        }))
        .unwrap();
        assert!(m.skills.is_none());
        assert!(m.kind.is_none());
        assert!(m.granted_methods("weather").is_none());
    }

    #[test]
    fn type_field_maps_to_kind() {
        let m: Manifest = serde_json::from_value(json!({
            "name": "t",
            "main": "entry",
            "type": "skill",
        }))
        .unwrap();
        assert_eq!(m.kind, Some(TaskKind::Skill));
        assert_eq!(serde_json::to_value(&m).unwrap()["type"], "skill");
    }

    #[test]
    fn grant_builds_skills_section() {
        let m = Manifest::new("t", "entry").grant("weather", ["getTemp"]);
        assert_eq!(
            m.granted_methods("weather"),
            Some(&["getTemp".to_string()][..])
        );
    }

    #[test]
    fn validate_reports_empty_fields() {
        let m = Manifest::new("", "entry").grant("weather", ["getTemp", " "]);
        let issues = m.validate();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "skills.weather[1]"]);
    }

    #[test]
    fn load_reads_manifest_from_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            Manifest::manifest_path(dir.path()),
            r#"{"name":"demo","main":"demo_main","skills":{"weather":["getTemp"]}}"#,
        )
        .unwrap();

        let m = Manifest::load(dir.path(), &FsProjectChecker::new()).unwrap();
        assert_eq!(m.name, "demo");
        assert_eq!(m.main, "demo_main");
    }

    #[test]
    fn load_rejects_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            Manifest::manifest_path(dir.path()),
            r#"{"name":"","main":"demo_main"}"#,
        )
        .unwrap();

        let err = Manifest::load(dir.path(), &FsProjectChecker::new()).unwrap_err();
        assert!(matches!(err, CreateError::InvalidManifest { .. }));
    }

    #[test]
    fn load_rejects_non_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(dir.path(), &FsProjectChecker::new()).unwrap_err();
        assert!(matches!(err, CreateError::InvalidProject { .. }));
    }
}
