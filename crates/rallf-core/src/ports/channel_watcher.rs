//! ChannelWatcher port - ファイルベースのイベントチャネル監視の抽象化
//!
//! # 実装
//! - **NotifyWatcher**: notify クレートによる実ファイル監視（本番用）
//! - **InMemoryWatcher**: ディスクに触れずに変更を注入できる fake（テスト用）

use std::path::Path;
use std::sync::Arc;

use crate::domain::ChannelError;

/// 変更後のファイル内容（トリム前）を受け取るコールバック
pub type ChangeCallback = Arc<dyn Fn(String) + Send + Sync>;

/// 監視のハンドル
///
/// drop すると監視が止まる。中身は実装ごとのガード。
pub struct WatchHandle {
    _guard: Box<dyn Send>,
}

impl WatchHandle {
    pub fn new(guard: impl Send + 'static) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle").finish_non_exhaustive()
    }
}

/// ChannelWatcher は 1 つのバックファイルを監視する
///
/// # 契約
/// - 変更が検出されるたびに、その時点のファイル内容全体で `on_change` を呼ぶ
/// - 内容の差分判定・トリム・デコードは呼び出し側（EventChannel）の責務
/// - 返した WatchHandle が生きている間だけ監視する
pub trait ChannelWatcher: Send + Sync {
    fn watch(&self, path: &Path, on_change: ChangeCallback) -> Result<WatchHandle, ChannelError>;
}
