//! Errors - エラー型と分類
//!
//! # 分類
//! - **CreateError**: タスク生成時の検証エラー（致命的、登録は中断）
//! - **ChannelError**: イベントチャネルの初期化エラー（致命的）
//! - **RunError**: ライフサイクル実行時のエラー
//! - **DelegationError**: delegate の拒否（回復可能、呼び出し側で捕捉できる）

use std::path::PathBuf;

use serde_json::json;

use super::manifest::ManifestIssue;
use super::state::TaskPhase;

/// タスク側の business logic が返す任意のエラー
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// ChannelError はイベントチャネルのエラー
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("cannot initialise event channel at {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot watch event channel at {path}: {reason}")]
    Watch { path: PathBuf, reason: String },
}

/// CreateError はタスク生成時のエラー
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("task \"{path}\" does not look like a rallf task: {reason}")]
    InvalidProject { path: PathBuf, reason: String },

    #[error("entry point \"{entry}\" is not a task export: {reason}")]
    InvalidExport { entry: String, reason: String },

    #[error("task {path} manifest is invalid: {}", join_issues(.issues))]
    InvalidManifest {
        path: PathBuf,
        issues: Vec<ManifestIssue>,
    },

    #[error("cannot read manifest {path}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

fn join_issues(issues: &[ManifestIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// RunError はライフサイクル実行のエラー
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// 名前が登録済みのタスクを指していない（どのフェーズも実行されない）
    #[error("\"{0}\" is not a registered task; exported value must implement Task")]
    NotATask(String),

    #[error("task \"{name}\" already left the created phase (phase: {phase})")]
    AlreadyStarted { name: String, phase: TaskPhase },

    /// Task::start のエラーをそのまま運ぶ
    #[error(transparent)]
    Task(BoxError),
}

/// 権限を与える manifest の例
fn skills_hint(skill: &str, method: &str) -> String {
    format!(
        " Please add to manifest: \"skills\": {{ \"{skill}\": [\"{method}\"] }}"
    )
}

/// DelegationError は delegate の拒否理由
///
/// 拒否理由ごとに variant が分かれているので、呼び出し側は
/// メッセージ文字列ではなく variant で分岐できます。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DelegationError {
    #[error("You haven't required access to skill method {skill}.{method}.{}", skills_hint(.skill, .method))]
    AccessDenied { skill: String, method: String },

    #[error("Mock \"{mock}\" does not export any skills but you are requesting skill ({skill})")]
    MockMissingSkills { mock: String, skill: String },

    #[error("Skill \"{skill}\" is not exported in mock: {mock}")]
    SkillNotExported { mock: String, skill: String },

    #[error("Skill method \"{method}\" of skill \"{skill}\" is not exported by mock: {mock}")]
    MethodNotExported {
        mock: String,
        skill: String,
        method: String,
    },

    /// 登録されていないタスクからの delegate（呼び出し契約違反）
    #[error("task \"{0}\" is not registered")]
    TaskNotRegistered(String),

    /// skill のコールバック自身が返した拒否
    #[error("skill callback rejected: {0}")]
    Rejected(serde_json::Value),
}

impl DelegationError {
    /// 機械可読な種別
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccessDenied { .. } => "access_denied",
            Self::MockMissingSkills { .. } => "mock_missing_skills",
            Self::SkillNotExported { .. } => "skill_not_exported",
            Self::MethodNotExported { .. } => "method_not_exported",
            Self::TaskNotRegistered(_) => "task_not_registered",
            Self::Rejected(_) => "rejected",
        }
    }

    /// `{ "error": ..., "kind": ... }` 形式の拒否ペイロード
    ///
    /// Rejected はコールバックの値をそのまま返す。
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            Self::Rejected(value) => value.clone(),
            other => json!({ "error": other.to_string(), "kind": other.kind() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_message_carries_manifest_hint() {
        let err = DelegationError::AccessDenied {
            skill: "weather".to_string(),
            method: "getTemp".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"skills\": { \"weather\": [\"getTemp\"] }"));
    }

    #[test]
    fn payload_has_error_and_kind() {
        let err = DelegationError::SkillNotExported {
            mock: "default".to_string(),
            skill: "weather".to_string(),
        };
        let payload = err.to_payload();
        assert_eq!(payload["kind"], "skill_not_exported");
        assert!(payload["error"].as_str().unwrap().contains("weather"));
    }

    #[test]
    fn rejected_payload_is_passed_through() {
        let err = DelegationError::Rejected(json!({"code": 7}));
        assert_eq!(err.to_payload(), json!({"code": 7}));
    }

    #[test]
    fn invalid_manifest_lists_issues() {
        let err = CreateError::InvalidManifest {
            path: PathBuf::from("demo"),
            issues: vec![ManifestIssue {
                field: "main".to_string(),
                message: "must not be empty".to_string(),
            }],
        };
        assert!(err.to_string().contains("main: must not be empty"));
    }
}
