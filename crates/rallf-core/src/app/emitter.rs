//! EventEmitter - タスクごとのプロセス内イベントストリーム
//!
//! キー（例: `setup:start`, `door:sensor`）ごとにリスナーを登録し、
//! emit 時に同期的に呼び出します。リスナー登録前に emit されたイベントは失われる。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// EventEmitter は clone しても同じリスナー表を共有する
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<Mutex<HashMap<String, Vec<Listener>>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key` にリスナーを追加する
    pub fn on<F>(&self, key: impl Into<String>, listener: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners
            .entry(key.into())
            .or_default()
            .push(Arc::new(listener));
    }

    /// `key` のリスナーを登録順に呼び、呼んだ数を返す
    pub fn emit(&self, key: &str, data: &Value) -> usize {
        // ロックを持ったままリスナーを呼ぶと、リスナー内の on() でデッドロックする
        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners.get(key).cloned().unwrap_or_default()
        };
        tracing::trace!(key, listeners = snapshot.len(), "emit");
        for listener in &snapshot {
            listener(data);
        }
        snapshot.len()
    }

    pub fn listener_count(&self, key: &str) -> usize {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.get(key).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<_> = listeners.keys().cloned().collect();
        keys.sort();
        f.debug_struct("EventEmitter").field("keys", &keys).finish()
    }
}
