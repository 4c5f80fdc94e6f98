//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **NotifyWatcher**: notify による実ファイル監視（本番用）
//! - **InMemoryWatcher**: 変更を合成して注入する fake（テスト用）
//! - **FsProjectChecker**: ディスク上のプロジェクト検査

pub mod fs_checker;
pub mod inmem_watcher;
pub mod notify_watcher;

pub use self::fs_checker::FsProjectChecker;
pub use self::inmem_watcher::InMemoryWatcher;
pub use self::notify_watcher::NotifyWatcher;
