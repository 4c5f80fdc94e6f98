//! RunnerBuilder - ランナーの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - ports のデフォルト実装と差し替え

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use super::broker::DelegationBroker;
use super::config::RunnerConfig;
use super::instance::TaskInstance;
use super::lifecycle::TaskLifecycle;
use super::registry::{RegistryEntry, TaskRegistry};
use crate::domain::{CreateError, DelegationError, Manifest, RunError};
use crate::impls::{FsProjectChecker, NotifyWatcher};
use crate::ports::{ChannelWatcher, ProjectChecker};
use crate::typed::{CatalogError, MockBundle, Task, TaskCatalog};

/// RunnerBuilder はランナーを構築
///
/// # 使用例
/// ```ignore
/// let runner = RunnerBuilder::new()
///     .register::<WeatherReport>("weather_report")?
///     .expect_entry_points(&["weather_report"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_entry_points() で期待される `main` を登録
/// - build() 時に「期待集合 ⊆ catalog」をチェック
/// - 不足があれば BuildError を返す
pub struct RunnerBuilder {
    catalog: TaskCatalog,
    expected: Option<Vec<String>>,
    checker: Arc<dyn ProjectChecker>,
    watcher: Arc<dyn ChannelWatcher>,
    config: RunnerConfig,
}

/// BuildError はランナー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing entry points: {0:?}. These entry points were expected but not registered.")]
    MissingEntryPoints(Vec<String>),
}

impl RunnerBuilder {
    /// デフォルト（FsProjectChecker + NotifyWatcher）で作成
    pub fn new() -> Self {
        Self {
            catalog: TaskCatalog::new(),
            expected: None,
            checker: Arc::new(FsProjectChecker::new()),
            watcher: Arc::new(NotifyWatcher::new()),
            config: RunnerConfig::default(),
        }
    }

    /// Task 型をエントリポイントとして登録
    pub fn register<T: Task + Default>(
        mut self,
        entry: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        self.catalog.register_task::<T>(entry)?;
        Ok(self)
    }

    /// 組み立て済みの catalog を使う（既存の登録は置き換え）
    pub fn catalog(mut self, catalog: TaskCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn expect_entry_points(mut self, entries: &[&str]) -> Self {
        self.expected = Some(entries.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn checker(mut self, checker: Arc<dyn ProjectChecker>) -> Self {
        self.checker = checker;
        self
    }

    pub fn watcher(mut self, watcher: Arc<dyn ChannelWatcher>) -> Self {
        self.watcher = watcher;
        self
    }

    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// # 検証
    /// - expect_entry_points() の項目が全て catalog にあるかチェック
    pub fn build(self) -> Result<Runner, BuildError> {
        if let Some(expected) = &self.expected {
            let missing: Vec<String> = expected
                .iter()
                .filter(|entry| !self.catalog.contains(entry))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingEntryPoints(missing));
            }
        }

        let registry = Arc::new(TaskRegistry::new(
            self.catalog,
            self.checker,
            self.watcher,
            self.config,
        ));
        let broker = Arc::new(DelegationBroker::new(registry.clone()));
        let lifecycle = TaskLifecycle::new(broker.clone());
        Ok(Runner {
            registry,
            broker,
            lifecycle,
        })
    }
}

impl Default for RunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runner はレジストリ・ブローカー・ライフサイクルをまとめた面
pub struct Runner {
    registry: Arc<TaskRegistry>,
    broker: Arc<DelegationBroker>,
    lifecycle: TaskLifecycle,
}

impl Runner {
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// `config/manifest.json` を読み、検証して返す
    pub fn load_manifest(&self, task_path: &Path) -> Result<Manifest, CreateError> {
        Manifest::load(task_path, self.registry.checker())
    }

    pub fn create_task(
        &self,
        task_path: &Path,
        manifest: impl Into<Arc<Manifest>>,
        input: Value,
        mock: impl Into<Arc<MockBundle>>,
    ) -> Result<Arc<TaskInstance>, CreateError> {
        self.registry.create(task_path, manifest, input, mock)
    }

    pub async fn run_task(&self, name: &str) -> Result<Value, RunError> {
        self.lifecycle.run(name).await
    }

    pub async fn delegate(
        &self,
        task: &str,
        skill_name: &str,
        skill_method: &str,
        data: Value,
    ) -> Result<Value, DelegationError> {
        self.broker.delegate(task, skill_name, skill_method, data).await
    }

    pub fn lookup(&self, name: &str) -> Option<RegistryEntry> {
        self.registry.lookup(name)
    }

    /// teardown: 登録を外し、チャネルの監視を止める
    pub fn remove(&self, name: &str) -> Option<RegistryEntry> {
        self.registry.remove(name)
    }
}
