//! CLI に組み込みの Task と mock
//!
//! `rallf run` は manifest の `main` をこの catalog から引き、
//! `--mock` で選んだ bundle で skill 呼び出しを満たします。

use async_trait::async_trait;
use rallf_core::domain::{BoxError, DeviceSpec};
use rallf_core::typed::{CatalogError, TaskCatalog};
use rallf_core::{MockBundle, MockSkill, Task, TaskContext};
use serde_json::{Value, json};
use tracing::{info, warn};

/// `rallf init` が manifest に書くデフォルトの main
pub const DEFAULT_MAIN: &str = "weather_report";

pub const MOCK_NAMES: &[&str] = &["default", "offline"];

/// 気温と湿度を weather skill に問い合わせてまとめる
///
/// 湿度は任意。拒否されても気温だけで報告する。
#[derive(Default)]
pub struct WeatherReport;

#[async_trait]
impl Task for WeatherReport {
    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
        let city = ctx
            .input()
            .get("city")
            .and_then(Value::as_str)
            .unwrap_or("Barcelona")
            .to_string();

        ctx.events()
            .on("weather:alert", |data| info!(%data, "weather alert"));

        let temp = ctx
            .delegate("weather", "getTemp", json!({ "city": city }))
            .await?;
        let humidity = match ctx
            .delegate("weather", "getHumidity", json!({ "city": city }))
            .await
        {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "humidity unavailable");
                Value::Null
            }
        };
        let sensor = ctx.devices().get("thermometer").map(|d| d.name);

        Ok(json!({
            "city": city,
            "temp": temp,
            "humidity": humidity,
            "sensor": sensor,
        }))
    }
}

/// input をそのまま返す
#[derive(Default)]
pub struct Echo;

#[async_trait]
impl Task for Echo {
    async fn start(&mut self, ctx: &TaskContext) -> Result<Value, BoxError> {
        Ok(ctx.input().clone())
    }
}

pub fn catalog() -> Result<TaskCatalog, CatalogError> {
    let mut catalog = TaskCatalog::new();
    catalog.register_task::<WeatherReport>(DEFAULT_MAIN)?;
    catalog.register_task::<Echo>("echo")?;
    Ok(catalog)
}

/// 名前から mock bundle を組み立てる
///
/// - `default`: weather skill（getTemp / getHumidity）と thermometer デバイス
/// - `offline`: skill も デバイスも無い
pub fn mock(name: &str) -> Option<MockBundle> {
    match name {
        "default" => Some(
            MockBundle::new("default")
                .with_skill(
                    "weather",
                    MockSkill::new()
                        .method_fn("getTemp", |data, entry| {
                            let city = data.get("city").cloned().unwrap_or(Value::Null);
                            Ok(json!({
                                "city": city,
                                "celsius": 21.5,
                                "requested_by": entry.instance.name(),
                            }))
                        })
                        .method_fn("getHumidity", |_data, _entry| Ok(json!(0.4))),
                )
                .with_device(DeviceSpec::new("thermometer")),
        ),
        "offline" => Some(MockBundle::new("offline")),
        _ => None,
    }
}
