//! テスト用の Task とフィクスチャ

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::config::RunnerConfig;
use super::instance::TaskInstance;
use super::registry::TaskRegistry;
use crate::domain::{BoxError, TaskKind};
use crate::impls::{FsProjectChecker, InMemoryWatcher};
use crate::typed::{Exported, Task, TaskCatalog, TaskContext};

/// input をそのまま返す。本体の実行を `body` イベントで知らせる。
#[derive(Default)]
pub(crate) struct Echo;

#[async_trait]
impl Task for Echo {
    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
        ctx.events().emit("body", &json!({}));
        Ok(ctx.input().clone())
    }
}

#[derive(Default)]
pub(crate) struct SkillTask;

#[async_trait]
impl Task for SkillTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Skill
    }

    async fn start(&mut self, _ctx: &TaskContext) -> Result<Value, BoxError> {
        Ok(Value::Null)
    }
}

/// persist を要求して終わる
#[derive(Default)]
pub(crate) struct Persisting;

#[async_trait]
impl Task for Persisting {
    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
        ctx.persist();
        Ok(Value::Null)
    }
}

#[derive(Default)]
pub(crate) struct Boom;

#[async_trait]
impl Task for Boom {
    async fn start(&mut self, _ctx: &TaskContext) -> Result<Value, BoxError> {
        Err("boom".into())
    }
}

/// 許可された呼び出しと拒否される呼び出しを両方行い、拒否は捕捉する
#[derive(Default)]
pub(crate) struct Delegating;

#[async_trait]
impl Task for Delegating {
    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
        let temp = ctx.delegate("weather", "getTemp", json!({})).await?;
        let humidity = ctx.delegate("weather", "getHumidity", json!({})).await;
        let humidity_error = humidity.err().map(|e| e.kind());
        Ok(json!({ "temp": temp, "humidity_error": humidity_error }))
    }
}

/// 拒否を `?` でそのまま返す
#[derive(Default)]
pub(crate) struct StrictDelegating;

#[async_trait]
impl Task for StrictDelegating {
    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
        Ok(ctx.delegate("weather", "getTemp", json!({})).await?)
    }
}

/// bind 済みの delegate を clone して別タスクから呼ぶ
#[derive(Default)]
pub(crate) struct SpawnedDelegating;

#[async_trait]
impl Task for SpawnedDelegating {
    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
        let delegate = ctx.local_delegate().clone();
        let bound_to = delegate.task().to_string();
        let temp = tokio::spawn(async move {
            delegate.call("weather", "getTemp", json!({})).await
        })
        .await??;
        Ok(json!({ "bound_to": bound_to, "temp": temp }))
    }
}

pub(crate) fn fixture_catalog() -> TaskCatalog {
    let mut catalog = TaskCatalog::new();
    catalog.register_task::<Echo>("echo").unwrap();
    catalog.register_task::<SkillTask>("skill").unwrap();
    catalog.register_task::<Boom>("boom").unwrap();
    catalog.register_task::<Persisting>("persisting").unwrap();
    catalog.register_task::<Delegating>("delegating").unwrap();
    catalog
        .register_task::<StrictDelegating>("strict_delegating")
        .unwrap();
    catalog
        .register_task::<SpawnedDelegating>("spawned_delegating")
        .unwrap();
    catalog
        .register("not_a_task", || Exported::Value(json!({"main": true})))
        .unwrap();
    catalog
}

/// 一時ディレクトリ + InMemoryWatcher のレジストリ
pub(crate) fn fixture_registry() -> (tempfile::TempDir, InMemoryWatcher, TaskRegistry) {
    let dir = tempfile::tempdir().unwrap();
    let watcher = InMemoryWatcher::new();
    let registry = TaskRegistry::new(
        fixture_catalog(),
        Arc::new(FsProjectChecker::new()),
        Arc::new(watcher.clone()),
        RunnerConfig::default(),
    );
    (dir, watcher, registry)
}

/// `keys` の各イベントを受信順に記録する
pub(crate) fn record_events(instance: &TaskInstance, keys: &[&str]) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for key in keys {
        let log = log.clone();
        let key_owned = key.to_string();
        instance
            .events()
            .on(*key, move |_| log.lock().unwrap().push(key_owned.clone()));
    }
    log
}
