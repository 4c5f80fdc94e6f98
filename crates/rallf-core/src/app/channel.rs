//! EventChannel - ファイル経由の外部シグナルをタイプ付きイベントに変換する
//!
//! # フロー
//! 1. open: バックファイルが無ければ空で作る
//! 2. watch: ChannelWatcher で変更を受け取る
//! 3. 前回と内容が違えばトリムしてワイヤ文法にマッチさせる
//! 4. マッチしたら EventEnvelope にデコードして `on_change` へ
//!
//! 文法に合わない内容（書き込み途中・ゴミ）は黙って捨てる。

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::emitter::EventEmitter;
use crate::domain::{ChannelError, EventEnvelope};
use crate::ports::{ChannelWatcher, WatchHandle};

/// EventChannel は 1 タスク 1 本の監視を保持する
///
/// drop すると監視が止まる。
#[derive(Debug)]
pub struct EventChannel {
    path: PathBuf,
    _watch: Mutex<WatchHandle>,
}

impl EventChannel {
    /// バックファイルを用意する（既存の内容は触らない）
    pub fn open(path: &Path) -> Result<(), ChannelError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| ChannelError::Init {
                path: path.to_path_buf(),
                source,
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ChannelError::Init {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(())
    }

    /// 監視を開始し、デコードできたイベントごとに `on_change` を呼ぶ
    pub fn watch<F>(
        path: &Path,
        watcher: &dyn ChannelWatcher,
        on_change: F,
    ) -> Result<Self, ChannelError>
    where
        F: Fn(EventEnvelope) + Send + Sync + 'static,
    {
        let initial = std::fs::read_to_string(path).unwrap_or_default();
        let last = Arc::new(Mutex::new(initial));
        let channel_path = path.to_path_buf();

        let handle = watcher.watch(
            path,
            Arc::new(move |content: String| {
                {
                    let mut last = last.lock().unwrap_or_else(|e| e.into_inner());
                    if *last == content {
                        return;
                    }
                    last.clone_from(&content);
                }
                match EventEnvelope::decode(content.trim()) {
                    Some(envelope) => on_change(envelope),
                    None => tracing::debug!(
                        path = %channel_path.display(),
                        bytes = content.len(),
                        "channel content does not match the wire grammar, dropped"
                    ),
                }
            }),
        )?;

        Ok(Self {
            path: path.to_path_buf(),
            _watch: Mutex::new(handle),
        })
    }

    /// open + watch。デコードしたイベントを `<event_name>:<event_type>` で emitter に流す。
    pub fn attach(
        path: &Path,
        watcher: &dyn ChannelWatcher,
        emitter: EventEmitter,
    ) -> Result<Self, ChannelError> {
        Self::open(path)?;
        Self::watch(path, watcher, move |envelope| {
            emitter.emit(&envelope.emission_key(), &envelope.data);
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryWatcher;
    use serde_json::{Value, json};

    fn collect(
        watcher: &InMemoryWatcher,
        path: &Path,
    ) -> (EventChannel, Arc<Mutex<Vec<EventEnvelope>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let channel =
            EventChannel::watch(path, watcher, move |env| sink.lock().unwrap().push(env)).unwrap();
        (channel, seen)
    }

    #[test]
    fn open_creates_directory_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".rallf").join("event-pipe");

        EventChannel::open(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn open_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event-pipe");
        std::fs::write(&path, "a:b 1").unwrap();

        EventChannel::open(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a:b 1");
    }

    #[test]
    fn open_fails_when_parent_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let err = EventChannel::open(&blocker.join("event-pipe")).unwrap_err();
        assert!(matches!(err, ChannelError::Init { .. }));
    }

    #[test]
    fn decodes_trimmed_content() {
        let watcher = InMemoryWatcher::new();
        let path = Path::new("/virtual/event-pipe");
        let (_channel, seen) = collect(&watcher, path);

        watcher.write(path, "  sensor:door {\"k\":1}\n");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event_type, "sensor");
        assert_eq!(seen[0].event_name, "door");
        assert_eq!(seen[0].data, json!({"k": 1}));
    }

    #[test]
    fn malformed_content_is_dropped_silently() {
        let watcher = InMemoryWatcher::new();
        let path = Path::new("/virtual/event-pipe");
        let (_channel, seen) = collect(&watcher, path);

        watcher.write(path, "sensor:door");
        watcher.write(path, "garbage");

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn unchanged_content_is_not_re_emitted() {
        let watcher = InMemoryWatcher::new();
        let path = Path::new("/virtual/event-pipe");
        let (_channel, seen) = collect(&watcher, path);

        watcher.write(path, "a:b hello");
        watcher.write(path, "a:b hello");
        watcher.write(path, "a:b again");

        let data: Vec<Value> = seen.lock().unwrap().iter().map(|e| e.data.clone()).collect();
        assert_eq!(data, vec![json!("hello"), json!("again")]);
    }

    #[test]
    fn attach_emits_with_name_first_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".rallf").join("event-pipe");
        let watcher = InMemoryWatcher::new();
        let emitter = EventEmitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        emitter.on("door:sensor", move |data| sink.lock().unwrap().push(data.clone()));

        let _channel = EventChannel::attach(&path, &watcher, emitter).unwrap();
        watcher.write(&path, "sensor:door {\"open\":true}");

        assert_eq!(*seen.lock().unwrap(), vec![json!({"open": true})]);
    }

    #[test]
    fn dropping_the_channel_stops_the_watch() {
        let watcher = InMemoryWatcher::new();
        let path = Path::new("/virtual/event-pipe");
        let (channel, seen) = collect(&watcher, path);
        assert_eq!(watcher.watch_count(path), 1);

        drop(channel);
        assert_eq!(watcher.watch_count(path), 0);
        watcher.write(path, "a:b 1");
        assert!(seen.lock().unwrap().is_empty());
    }
}
