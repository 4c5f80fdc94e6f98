//! Ports - 抽象化レイヤー
//!
//! ランタイムが外部（ファイルシステム、プロジェクトのレイアウト）に触れる箇所を
//! trait として切り出し、本番実装とテスト用 fake を差し替え可能にします。

pub mod channel_watcher;
pub mod project_checker;

pub use self::channel_watcher::{ChangeCallback, ChannelWatcher, WatchHandle};
pub use self::project_checker::ProjectChecker;
