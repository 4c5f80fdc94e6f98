//! Devices / Robot - シミュレートされたデバイス環境
//!
//! 実デバイスのドライバは持たない。mock が宣言したデバイスを
//! 「起動中」として保持し、quit_all で全部止めるだけの最小実装です。

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// mock が宣言するデバイス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub name: String,

    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl DeviceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: serde_json::Map::new(),
        }
    }
}

/// Robot はタスクが動作する作業ディレクトリへの参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Robot {
    cwd: PathBuf,
}

impl Robot {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

#[derive(Debug)]
struct DeviceSlot {
    spec: DeviceSpec,
    running: bool,
}

/// Devices はタスクごとのシミュレートされたデバイス群
#[derive(Debug, Default)]
pub struct Devices {
    slots: Mutex<Vec<DeviceSlot>>,
    shutdowns: AtomicUsize,
}

impl Devices {
    pub fn new() -> Self {
        Self::default()
    }

    /// mock の devices で初期化する（既存のものは置き換え）
    pub fn set_devices(&self, specs: &[DeviceSpec]) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        *slots = specs
            .iter()
            .cloned()
            .map(|spec| DeviceSlot {
                spec,
                running: true,
            })
            .collect();
    }

    pub fn get(&self, name: &str) -> Option<DeviceSpec> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .iter()
            .find(|s| s.spec.name == name)
            .map(|s| s.spec.clone())
    }

    /// 起動中のデバイス名
    pub fn running(&self) -> Vec<String> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .iter()
            .filter(|s| s.running)
            .map(|s| s.spec.name.clone())
            .collect()
    }

    /// 全デバイスを停止し、止めた数を返す
    pub fn quit_all(&self) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let mut stopped = 0;
        for slot in slots.iter_mut().filter(|s| s.running) {
            slot.running = false;
            stopped += 1;
        }
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        stopped
    }

    /// quit_all が呼ばれた回数
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}
