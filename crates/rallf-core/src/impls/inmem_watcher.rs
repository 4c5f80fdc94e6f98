//! InMemoryWatcher - ディスクに触れない ChannelWatcher（テスト用）
//!
//! # 学習ポイント
//! - Drop ガードによる購読解除
//! - ロックを外してからコールバックを呼ぶ（コールバック内の再入に備える）

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::ChannelError;
use crate::ports::{ChangeCallback, ChannelWatcher, WatchHandle};

type Subscribers = Arc<Mutex<HashMap<PathBuf, Vec<(u64, ChangeCallback)>>>>;

/// InMemoryWatcher は `write` で合成した変更を購読者に配る
///
/// # 使用例
/// ```ignore
/// let watcher = InMemoryWatcher::new();
/// let channel = EventChannel::attach(&path, &watcher, emitter)?;
/// watcher.write(&path, "sensor:door {\"open\":true}");
/// ```
#[derive(Clone, Default)]
pub struct InMemoryWatcher {
    subscribers: Subscribers,
    next_id: Arc<AtomicU64>,
}

struct Subscription {
    subscribers: Subscribers,
    path: PathBuf,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(list) = subscribers.get_mut(&self.path) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                subscribers.remove(&self.path);
            }
        }
    }
}

impl InMemoryWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `path` の内容が `content` に変わったことにする
    pub fn write(&self, path: &Path, content: &str) {
        let callbacks: Vec<ChangeCallback> = {
            let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
            subscribers
                .get(path)
                .map(|list| list.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(content.to_string());
        }
    }

    /// `path` に対して生きている監視の数
    pub fn watch_count(&self, path: &Path) -> usize {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.get(path).map_or(0, Vec::len)
    }
}

impl ChannelWatcher for InMemoryWatcher {
    fn watch(&self, path: &Path, on_change: ChangeCallback) -> Result<WatchHandle, ChannelError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(path.to_path_buf())
            .or_default()
            .push((id, on_change));
        Ok(WatchHandle::new(Subscription {
            subscribers: self.subscribers.clone(),
            path: path.to_path_buf(),
            id,
        }))
    }
}
