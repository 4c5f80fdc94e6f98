//! NotifyWatcher - notify クレートによるファイル監視
//!
//! エディタの「置き換え保存」でも追えるように、ファイルではなく親ディレクトリを
//! 非再帰で監視し、対象ファイル名のイベントだけを拾います。
//! コールバックは notify のイベントスレッド上で呼ばれる。

use std::path::Path;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::domain::ChannelError;
use crate::ports::{ChangeCallback, ChannelWatcher, WatchHandle};

#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatcher;

impl NotifyWatcher {
    pub fn new() -> Self {
        Self
    }
}

impl ChannelWatcher for NotifyWatcher {
    fn watch(&self, path: &Path, on_change: ChangeCallback) -> Result<WatchHandle, ChannelError> {
        let watch_error = |reason: String| ChannelError::Watch {
            path: path.to_path_buf(),
            reason,
        };

        let file_name = path
            .file_name()
            .ok_or_else(|| watch_error("channel path has no file name".to_string()))?
            .to_os_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };
        let target = path.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, path = %target.display(), "channel watcher error");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            if !event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()))
            {
                return;
            }
            match std::fs::read_to_string(&target) {
                Ok(content) => on_change(content),
                Err(e) => debug!(error = %e, path = %target.display(), "cannot read channel"),
            }
        })
        .map_err(|e| watch_error(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| watch_error(e.to_string()))?;
        debug!(path = %path.display(), "watching event channel");

        Ok(WatchHandle::new(watcher))
    }
}
