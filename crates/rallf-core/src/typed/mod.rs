//! Typed - ユーザーが実装する側の API
//!
//! - **Task**: タスク本体（`start` が business logic）
//! - **TaskCatalog**: manifest の `main` から export を生成する表
//! - **TaskContext / LocalDelegate**: 実行中タスクに渡される面
//! - **MockBundle / MockSkill / SkillMethod**: skill のシミュレート実装

pub mod catalog;
pub mod context;
pub mod mock;
pub mod task;

pub use self::catalog::{CatalogError, TaskCatalog};
pub use self::context::{LocalDelegate, TaskContext};
pub use self::mock::{FnMethod, MockBundle, MockSkill, SkillMethod};
pub use self::task::{Exported, Task};
