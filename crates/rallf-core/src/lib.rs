//! rallf-core
//!
//! Core building blocks for the rallf task runner.
//!
//! タスクをシミュレートされたロボット / デバイス環境で実行し、
//! skill への delegate を mock で満たすランタイムです。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（manifest, event envelope, phase, devices, errors）
//! - **ports**: 抽象化レイヤー（ChannelWatcher, ProjectChecker）
//! - **app**: ランタイム（EventChannel, AccessPolicy, DelegationBroker, TaskLifecycle, TaskRegistry, Runner）
//! - **typed**: ユーザーが実装する API（Task trait, TaskCatalog, TaskContext, MockBundle）
//! - **impls**: ports の実装（NotifyWatcher, InMemoryWatcher, FsProjectChecker）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

pub use app::{Runner, RunnerBuilder, RunnerConfig};
pub use domain::{CreateError, DelegationError, EventEnvelope, Manifest, RunError};
pub use typed::{MockBundle, MockSkill, Task, TaskContext};
