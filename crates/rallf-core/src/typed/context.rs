//! TaskContext - Task::start に渡される実行コンテキスト
//!
//! ライフサイクルの setup フェーズで LocalDelegate を bind し、
//! このコンテキスト経由でタスクに公開します。

use std::sync::Arc;

use serde_json::Value;

use crate::app::{DelegationBroker, EventEmitter, TaskInstance};
use crate::domain::{DelegationError, Devices, Robot};

/// LocalDelegate はタスク名を bind 済みの delegate
///
/// `DelegationBroker::delegate` と同じ形で、タスク引数だけが固定されている。
#[derive(Clone)]
pub struct LocalDelegate {
    broker: Arc<DelegationBroker>,
    task: String,
}

impl LocalDelegate {
    pub fn bind(broker: Arc<DelegationBroker>, task: impl Into<String>) -> Self {
        Self {
            broker,
            task: task.into(),
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub async fn call(
        &self,
        skill: &str,
        method: &str,
        data: Value,
    ) -> Result<Value, DelegationError> {
        self.broker.delegate(&self.task, skill, method, data).await
    }
}

/// TaskContext は実行中タスクから見えるランナーの面
pub struct TaskContext {
    instance: Arc<TaskInstance>,
    delegate: LocalDelegate,
}

impl TaskContext {
    pub fn new(instance: Arc<TaskInstance>, delegate: LocalDelegate) -> Self {
        Self { instance, delegate }
    }

    pub fn instance(&self) -> &Arc<TaskInstance> {
        &self.instance
    }

    pub fn name(&self) -> &str {
        self.instance.name()
    }

    pub fn input(&self) -> &Value {
        self.instance.input()
    }

    pub fn robot(&self) -> &Robot {
        self.instance.robot()
    }

    pub fn events(&self) -> &EventEmitter {
        self.instance.events()
    }

    pub fn devices(&self) -> &Devices {
        self.instance.devices()
    }

    /// skill メソッドを呼ぶ（manifest の許可と mock の export を経由）
    pub async fn delegate(
        &self,
        skill: &str,
        method: &str,
        data: Value,
    ) -> Result<Value, DelegationError> {
        self.delegate.call(skill, method, data).await
    }

    pub fn persist(&self) {
        self.instance.persist();
    }

    pub fn local_delegate(&self) -> &LocalDelegate {
        &self.delegate
    }
}
