//! DelegationBroker - タスクから skill への唯一の入口
//!
//! # フロー
//! 1. レジストリからタスクのエントリを引く
//! 2. AccessPolicy で manifest の許可を確認
//! 3. mock の skills → skill → method の順に解決
//! 4. コールバックを `(data, &entry)` で呼び、結果をそのまま返す
//!
//! 拒否理由はすべて別の variant になる。

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use super::policy::AccessPolicy;
use super::registry::TaskRegistry;
use crate::domain::DelegationError;

pub struct DelegationBroker {
    registry: Arc<TaskRegistry>,
}

impl DelegationBroker {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// `task` の権限で `skill_name.skill_method` を呼ぶ
    pub async fn delegate(
        &self,
        task: &str,
        skill_name: &str,
        skill_method: &str,
        data: Value,
    ) -> Result<Value, DelegationError> {
        let Some(entry) = self.registry.lookup(task) else {
            error!(
                task,
                skill = skill_name,
                method = skill_method,
                "delegate from unregistered task"
            );
            return Err(DelegationError::TaskNotRegistered(task.to_string()));
        };

        if !AccessPolicy::is_permitted(&entry.manifest, skill_name, skill_method) {
            debug!(
                task,
                skill = skill_name,
                method = skill_method,
                "delegate denied by manifest"
            );
            return Err(DelegationError::AccessDenied {
                skill: skill_name.to_string(),
                method: skill_method.to_string(),
            });
        }

        let mock = &entry.mock;
        let Some(skills) = mock.skills() else {
            return Err(DelegationError::MockMissingSkills {
                mock: mock.name().to_string(),
                skill: skill_name.to_string(),
            });
        };
        let Some(skill) = skills.get(skill_name) else {
            return Err(DelegationError::SkillNotExported {
                mock: mock.name().to_string(),
                skill: skill_name.to_string(),
            });
        };
        let Some(method) = skill.get(skill_method) else {
            return Err(DelegationError::MethodNotExported {
                mock: mock.name().to_string(),
                skill: skill_name.to_string(),
                method: skill_method.to_string(),
            });
        };

        debug!(
            task,
            skill = skill_name,
            method = skill_method,
            mock = mock.name(),
            "delegating"
        );
        method.call(data, &entry).await
    }
}
