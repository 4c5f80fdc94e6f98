//! State - タスクの状態と種別

use std::fmt;

use serde::{Deserialize, Serialize};

/// TaskPhase はライフサイクルの位置
///
/// # 状態遷移
/// - created: 生成直後
/// - setup: delegate の bind 中
/// - running: Task::start 実行中
/// - finished: 完了
///
/// 遷移は一方向・一回きり（ループも再入もしない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    Created,
    Setup,
    Running,
    Finished,
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Setup => "setup",
            Self::Running => "running",
            Self::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// TaskKind はタスクの宣言された種別
///
/// Skill は別のタスクから capability として消費されるため、
/// 完了時にデバイスを落としてはいけない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Task,
    Skill,
}

impl TaskKind {
    pub fn owns_devices(self) -> bool {
        self != Self::Skill
    }
}
