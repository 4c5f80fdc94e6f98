//! TaskCatalog - エントリポイントと Task 生成関数の対応表
//!
//! manifest の `main` を catalog で引いて export を得ます。
//! 起動時に登録し（mutable）、実行時は参照のみ（immutable）。

use std::collections::HashMap;
use std::sync::Arc;

use super::task::{Exported, Task};

type Factory = Arc<dyn Fn() -> Exported + Send + Sync>;

/// CatalogError は TaskCatalog の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("entry point '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// TaskCatalog は `main` → export 生成関数
///
/// # 使用例
/// ```ignore
/// let mut catalog = TaskCatalog::new();
/// catalog.register_task::<WeatherReport>("weather_report")?;
/// ```
#[derive(Clone, Default)]
pub struct TaskCatalog {
    factories: HashMap<String, Factory>,
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 任意の export を返す生成関数を登録
    pub fn register<F>(&mut self, entry: impl Into<String>, factory: F) -> Result<(), CatalogError>
    where
        F: Fn() -> Exported + Send + Sync + 'static,
    {
        let entry = entry.into();
        if self.factories.contains_key(&entry) {
            return Err(CatalogError::AlreadyRegistered(entry));
        }
        self.factories.insert(entry, Arc::new(factory));
        Ok(())
    }

    /// Default で作れる Task 型を登録
    pub fn register_task<T: Task + Default>(
        &mut self,
        entry: impl Into<String>,
    ) -> Result<(), CatalogError> {
        self.register(entry, || Exported::Task(Box::new(T::default())))
    }

    /// 新しい export を生成する。未登録なら None。
    pub fn instantiate(&self, entry: &str) -> Option<Exported> {
        self.factories.get(entry).map(|factory| factory())
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.factories.contains_key(entry)
    }

    pub fn entries(&self) -> Vec<String> {
        let mut entries: Vec<_> = self.factories.keys().cloned().collect();
        entries.sort();
        entries
    }
}

impl std::fmt::Debug for TaskCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskCatalog")
            .field("entries", &self.entries())
            .finish()
    }
}
