//! TaskRegistry - タスク名 → {instance, mock, manifest} の表
//!
//! # 設計
//! - グローバル変数ではなく明示的なオブジェクトとして持ち、必要な相手に Arc で渡す
//! - 同名で create すると上書き（エラーにしない）
//! - 検証のどこかで失敗したら何も登録しない

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info};

use super::channel::EventChannel;
use super::config::RunnerConfig;
use super::instance::TaskInstance;
use crate::domain::{CreateError, Manifest, Robot};
use crate::ports::{ChannelWatcher, ProjectChecker};
use crate::typed::{Exported, MockBundle, TaskCatalog};

/// RegistryEntry は登録済みタスク 1 件
///
/// clone しても同じ instance / channel を指す。
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub instance: Arc<TaskInstance>,
    pub mock: Arc<MockBundle>,
    pub manifest: Arc<Manifest>,
    channel: Arc<EventChannel>,
}

impl RegistryEntry {
    pub fn channel(&self) -> &EventChannel {
        &self.channel
    }
}

/// TaskRegistry はタスクの生成と登録を仲介する
pub struct TaskRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
    catalog: TaskCatalog,
    checker: Arc<dyn ProjectChecker>,
    watcher: Arc<dyn ChannelWatcher>,
    config: RunnerConfig,
}

impl TaskRegistry {
    pub fn new(
        catalog: TaskCatalog,
        checker: Arc<dyn ProjectChecker>,
        watcher: Arc<dyn ChannelWatcher>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            catalog,
            checker,
            watcher,
            config,
        }
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn checker(&self) -> &dyn ProjectChecker {
        self.checker.as_ref()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// タスクを生成して登録する
    ///
    /// # フロー
    /// 1. プロジェクト形状と manifest を検査
    /// 2. `manifest.main` を catalog で引き、export が Task か検査
    /// 3. instance を組み立て（robot / input / devices）
    /// 4. イベントチャネルを開いて監視を開始
    /// 5. 登録（同名は上書き、旧エントリの監視はここで止まる）
    pub fn create(
        &self,
        task_path: &Path,
        manifest: impl Into<Arc<Manifest>>,
        input: Value,
        mock: impl Into<Arc<MockBundle>>,
    ) -> Result<Arc<TaskInstance>, CreateError> {
        let manifest: Arc<Manifest> = manifest.into();
        let mock: Arc<MockBundle> = mock.into();

        self.checker
            .is_valid_task_project(task_path, Some(&manifest))?;
        let issues = self.checker.valid_manifest(&manifest);
        if !issues.is_empty() {
            return Err(CreateError::InvalidManifest {
                path: task_path.to_path_buf(),
                issues,
            });
        }

        let exported =
            self.catalog
                .instantiate(&manifest.main)
                .ok_or_else(|| CreateError::InvalidExport {
                    entry: manifest.main.clone(),
                    reason: "no export registered for this entry point".to_string(),
                })?;
        self.checker.check_export_to_be_task(&exported, &manifest)?;
        let Exported::Task(task) = exported else {
            return Err(CreateError::InvalidExport {
                entry: manifest.main.clone(),
                reason: "exported value is not a task".to_string(),
            });
        };

        let robot = Robot::new(match mock.robot_cwd() {
            Some(cwd) => task_path.join(cwd),
            None => task_path.to_path_buf(),
        });
        let instance = Arc::new(TaskInstance::new(
            task,
            manifest.clone(),
            mock.clone(),
            robot,
            input,
        ));

        let channel_path = self.config.channel_path(task_path);
        let name = instance.name().to_string();

        // 新しいチャネルの監視はロックの外で張る（失敗してもレジストリは無変更）
        let channel = EventChannel::attach(
            &channel_path,
            self.watcher.as_ref(),
            instance.events().clone(),
        )?;
        let entry = RegistryEntry {
            instance: instance.clone(),
            mock,
            manifest,
            channel: Arc::new(channel),
        };
        let replaced = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.insert(name.clone(), entry)
        };

        // 旧エントリ（とその監視）はロックを外してから drop する
        if let Some(previous) = replaced {
            debug!(
                task = %name,
                replaced = %previous.instance.id(),
                "task re-created, previous entry overwritten"
            );
            drop(previous);
        }
        info!(
            task = %name,
            id = %instance.id(),
            channel = %channel_path.display(),
            "task created"
        );
        Ok(instance)
    }

    pub fn lookup(&self, name: &str) -> Option<RegistryEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(name).cloned()
    }

    /// 登録を外す（チャネルの監視もここで止まる）
    pub fn remove(&self, name: &str) -> Option<RegistryEntry> {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(name)
        };
        if removed.is_some() {
            debug!(task = %name, "task unregistered");
        }
        removed
    }

    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<_> = entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
