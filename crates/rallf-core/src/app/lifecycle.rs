//! TaskLifecycle - タスク 1 件を created → setup → running → finished で進める
//!
//! # フロー
//! 1. タスク名が登録済みの Task を指すか確認（違えば NotATask、どのフェーズも走らない）
//! 2. emit `setup:start`
//! 3. LocalDelegate を bind
//! 4. emit `setup:end`
//! 5. emit `start` → `Task::start` を await
//! 6. emit `finish`
//! 7. Skill でなければシミュレートデバイスを全停止（manifest の `type` が優先）
//! 8. 5 の値を返す
//!
//! 5 のエラーは何も足さずにそのまま返す。

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info};

use super::broker::DelegationBroker;
use crate::domain::{RunError, TaskPhase};
use crate::typed::{LocalDelegate, TaskContext};

pub struct TaskLifecycle {
    broker: Arc<DelegationBroker>,
}

impl TaskLifecycle {
    pub fn new(broker: Arc<DelegationBroker>) -> Self {
        Self { broker }
    }

    /// 登録済みタスク `name` を最後まで実行する
    pub async fn run(&self, name: &str) -> Result<Value, RunError> {
        let Some(instance) = self.broker.registry().lookup(name).map(|e| e.instance) else {
            return Err(RunError::NotATask(name.to_string()));
        };

        instance
            .begin_setup()
            .map_err(|phase| RunError::AlreadyStarted {
                name: name.to_string(),
                phase,
            })?;
        let events = instance.events();
        events.emit("setup:start", &json!({}));

        let delegate = LocalDelegate::bind(self.broker.clone(), instance.name());
        let ctx = TaskContext::new(instance.clone(), delegate);

        events.emit("setup:end", &json!({}));

        instance.advance(TaskPhase::Running);
        events.emit("start", &json!({}));
        info!(task = %name, id = %instance.id(), "task started");

        let (result, kind) = {
            let mut task = instance.task().lock().await;
            let kind = instance.manifest().kind.unwrap_or_else(|| task.kind());
            (task.start(&ctx).await, kind)
        };
        let value = result.map_err(RunError::Task)?;

        events.emit("finish", &json!({}));
        instance.advance(TaskPhase::Finished);

        if kind.owns_devices() {
            let stopped = instance.devices().quit_all();
            debug!(task = %name, stopped, "simulated devices shut down");
        }
        info!(task = %name, id = %instance.id(), "task finished");

        Ok(value)
    }
}
