//! TaskInstance - 生成済みの実行単位

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::emitter::EventEmitter;
use crate::domain::{Devices, InstanceId, Manifest, Robot, TaskPhase};
use crate::typed::{MockBundle, Task};

/// TaskInstance は 1 回の create で作られるタスク
///
/// manifest と mock は所有せず共有（読み取り専用）。
/// レジストリから外れる（teardown）まで生き続け、finish しても自動では消えない。
pub struct TaskInstance {
    id: InstanceId,
    name: String,
    manifest: Arc<Manifest>,
    mock: Arc<MockBundle>,
    robot: Robot,
    input: Value,
    persisting: AtomicBool,
    phase: Mutex<TaskPhase>,
    events: EventEmitter,
    devices: Devices,
    task: tokio::sync::Mutex<Box<dyn Task>>,
}

impl TaskInstance {
    pub(crate) fn new(
        task: Box<dyn Task>,
        manifest: Arc<Manifest>,
        mock: Arc<MockBundle>,
        robot: Robot,
        input: Value,
    ) -> Self {
        let devices = Devices::new();
        devices.set_devices(mock.devices());
        Self {
            id: InstanceId::generate(),
            name: manifest.name.clone(),
            manifest,
            mock,
            robot,
            input,
            persisting: AtomicBool::new(false),
            phase: Mutex::new(TaskPhase::Created),
            events: EventEmitter::new(),
            devices,
            task: tokio::sync::Mutex::new(task),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn mock(&self) -> &Arc<MockBundle> {
        &self.mock
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    pub fn is_persisting(&self) -> bool {
        self.persisting.load(Ordering::SeqCst)
    }

    pub fn set_persisting(&self, persisting: bool) {
        self.persisting.store(persisting, Ordering::SeqCst);
    }

    /// 永続化の要求。保存先は持たないので、フラグを立てて記録するだけ。
    pub fn persist(&self) {
        self.set_persisting(true);
        tracing::debug!(
            task = %self.name,
            id = %self.id,
            "persist requested (no store configured)"
        );
    }

    pub fn phase(&self) -> TaskPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// created → setup。すでに動いたことがあれば現在のフェーズを Err で返す。
    pub(crate) fn begin_setup(&self) -> Result<(), TaskPhase> {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        if *phase != TaskPhase::Created {
            return Err(*phase);
        }
        *phase = TaskPhase::Setup;
        Ok(())
    }

    pub(crate) fn advance(&self, to: TaskPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        let from = *phase;
        tracing::debug!(task = %self.name, %from, %to, "phase");
        *phase = to;
    }

    pub(crate) fn task(&self) -> &tokio::sync::Mutex<Box<dyn Task>> {
        &self.task
    }
}

impl std::fmt::Debug for TaskInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("phase", &self.phase())
            .field("mock", &self.mock.name())
            .finish_non_exhaustive()
    }
}
