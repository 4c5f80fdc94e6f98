//! Task trait - ユーザー定義の作業単位
//!
//! # 学習ポイント
//! - `async_trait` による async メソッドを持つ object-safe trait
//! - `Box<dyn Task>` でエントリポイントごとの具象型を消去する

use async_trait::async_trait;
use serde_json::Value;

use super::context::TaskContext;
use crate::domain::{BoxError, TaskKind};

/// Task はランナーが実行する作業単位
///
/// # 使用例
/// ```ignore
/// #[derive(Default)]
/// struct WeatherReport;
///
/// #[async_trait]
/// impl Task for WeatherReport {
///     async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
///         let temp = ctx.delegate("weather", "getTemp", json!({})).await?;
///         Ok(json!({ "temp": temp }))
///     }
/// }
/// ```
///
/// `start` の戻り値（または Err）はライフサイクルからそのまま呼び出し元へ返る。
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// 宣言上の種別。Skill は完了時にデバイスを停止しない。
    fn kind(&self) -> TaskKind {
        TaskKind::Task
    }

    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError>;
}

/// Exported はエントリポイントが export した値
///
/// エントリポイントは Task 以外の値を export することもある。
/// その場合は生成時の export 検査で InvalidExport になる。
pub enum Exported {
    Task(Box<dyn Task>),
    Value(Value),
}

impl Exported {
    pub fn is_task(&self) -> bool {
        matches!(self, Self::Task(_))
    }

    /// ログ・エラーメッセージ用の短い説明
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Task(_) => "task",
            Self::Value(Value::Null) => "null",
            Self::Value(Value::Bool(_)) => "boolean",
            Self::Value(Value::Number(_)) => "number",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Array(_)) => "array",
            Self::Value(Value::Object(_)) => "object",
        }
    }
}

impl std::fmt::Debug for Exported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Exported").field(&self.describe()).finish()
    }
}
