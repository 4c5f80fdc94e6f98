//! Mock - skill のシミュレート実装
//!
//! 実機の代わりに delegate を受ける。mock は skill ごとにメソッド名 →
//! コールバックの表を持ち、ブローカーはそれを普通の map lookup で解決します。
//!
//! # 使用例
//! ```ignore
//! let mock = MockBundle::new("default")
//!     .with_skill(
//!         "weather",
//!         MockSkill::new().method_fn("getTemp", |_data, _entry| Ok(json!(21.5))),
//!     )
//!     .with_device(DeviceSpec::new("thermo"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::RegistryEntry;
use crate::domain::{DelegationError, DeviceSpec};

/// SkillMethod は mock が提供する 1 メソッド
///
/// `entry` は呼び出し元タスクのレジストリエントリ（instance / mock / manifest）。
/// 返したエラーはブローカーで包まれずにそのまま呼び出し側へ届きます。
#[async_trait]
pub trait SkillMethod: Send + Sync {
    async fn call(&self, data: Value, entry: &RegistryEntry) -> Result<Value, DelegationError>;
}

/// 同期クロージャを SkillMethod にするアダプタ
pub struct FnMethod<F>(F);

impl<F> FnMethod<F>
where
    F: Fn(Value, &RegistryEntry) -> Result<Value, DelegationError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> SkillMethod for FnMethod<F>
where
    F: Fn(Value, &RegistryEntry) -> Result<Value, DelegationError> + Send + Sync,
{
    async fn call(&self, data: Value, entry: &RegistryEntry) -> Result<Value, DelegationError> {
        (self.0)(data, entry)
    }
}

/// MockSkill は 1 つの skill が export するメソッド群
#[derive(Clone, Default)]
pub struct MockSkill {
    methods: HashMap<String, Arc<dyn SkillMethod>>,
}

impl MockSkill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, name: impl Into<String>, method: impl SkillMethod + 'static) -> Self {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn method_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &RegistryEntry) -> Result<Value, DelegationError> + Send + Sync + 'static,
    {
        self.method(name, FnMethod::new(f))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SkillMethod>> {
        self.methods.get(name).cloned()
    }

    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for MockSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSkill")
            .field("methods", &self.method_names())
            .finish()
    }
}

/// MockBundle は名前付きのシミュレート capability 一式
///
/// `skills` が None のとき「skills セクション自体が無い」ことを表す。
#[derive(Debug, Clone)]
pub struct MockBundle {
    name: String,
    skills: Option<HashMap<String, MockSkill>>,
    devices: Vec<DeviceSpec>,
    robot_cwd: Option<String>,
}

impl MockBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: None,
            devices: Vec::new(),
            robot_cwd: None,
        }
    }

    pub fn with_skill(mut self, name: impl Into<String>, skill: MockSkill) -> Self {
        self.skills
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), skill);
        self
    }

    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.devices.push(device);
        self
    }

    /// robot の作業ディレクトリ（タスクパスからの相対）
    pub fn with_robot_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.robot_cwd = Some(cwd.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skills(&self) -> Option<&HashMap<String, MockSkill>> {
        self.skills.as_ref()
    }

    pub fn devices(&self) -> &[DeviceSpec] {
        &self.devices
    }

    pub fn robot_cwd(&self) -> Option<&str> {
        self.robot_cwd.as_deref()
    }
}
