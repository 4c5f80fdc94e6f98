//! RunnerConfig - ランナーの設定

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// RunnerConfig はプロジェクト内のイベントチャネルの配置
///
/// すべてのフィールドにデフォルトがあり、JSON では必要なものだけ上書きできる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// イベントチャネルを置くディレクトリ（タスクパスからの相対）
    pub channel_dir: PathBuf,
    /// イベントチャネルのファイル名
    pub channel_file: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            channel_dir: PathBuf::from(".rallf"),
            channel_file: "event-pipe".to_string(),
        }
    }
}

impl RunnerConfig {
    /// タスクのイベントチャネルのパス
    pub fn channel_path(&self, task_path: &Path) -> PathBuf {
        task_path.join(&self.channel_dir).join(&self.channel_file)
    }
}
