//! App - アプリケーション層
//!
//! このモジュールは、domain と ports を組み合わせてランナーを実装します。
//!
//! # 主要コンポーネント
//! - **EventChannel**: ファイル経由のシグナル → タイプ付きイベント
//! - **AccessPolicy**: manifest による skill 呼び出しの許可判定
//! - **DelegationBroker**: 許可確認 → mock のコールバック呼び出し
//! - **TaskLifecycle**: setup → start → finish の進行
//! - **TaskRegistry**: タスク名 → {instance, mock, manifest}
//! - **RunnerBuilder / Runner**: ワイヤリングと外向きの面

pub mod broker;
pub mod builder;
pub mod channel;
pub mod config;
pub mod emitter;
pub mod instance;
pub mod lifecycle;
pub mod policy;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

// 主要な型を再エクスポート
pub use self::broker::DelegationBroker;
pub use self::builder::{BuildError, Runner, RunnerBuilder};
pub use self::channel::EventChannel;
pub use self::config::RunnerConfig;
pub use self::emitter::EventEmitter;
pub use self::instance::TaskInstance;
pub use self::lifecycle::TaskLifecycle;
pub use self::policy::AccessPolicy;
pub use self::registry::{RegistryEntry, TaskRegistry};
