//! EventEnvelope - イベントチャネルのワイヤ形式
//!
//! # ワイヤ文法
//! ```text
//! <event_type>:<event_name> <json-or-raw-payload>
//! ```
//! - `event_type` / `event_name` は英数字とアンダースコア（空文字も可）
//! - 最初の空白以降はすべて payload
//! - payload は JSON として解釈し、失敗したら文字列として扱う
//!
//! プロセス内で emit するときのキーは `<event_name>:<event_type>`（name が先）。

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static WIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]*):([A-Za-z0-9_]*) ([^\r\n]*)$").expect("wire grammar regex")
});

/// EventEnvelope はチャネルから届いた 1 イベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_name: String,
    pub event_type: String,
    pub data: Value,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, event_name: impl Into<String>, data: Value) -> Self {
        Self {
            event_name: event_name.into(),
            event_type: event_type.into(),
            data,
        }
    }

    /// トリム済みの 1 ショット分の内容をデコードする
    ///
    /// 文法に合わなければ None（エラーにはしない）。
    pub fn decode(content: &str) -> Option<Self> {
        let caps = WIRE.captures(content)?;
        Some(Self {
            event_type: caps[1].to_string(),
            event_name: caps[2].to_string(),
            data: lenient_json(&caps[3]),
        })
    }

    /// ワイヤ形式にエンコードする
    ///
    /// 文字列はデコードで同じ文字列に戻るときだけ生のまま書く。
    /// `"123"` や `""` のように戻らないものは JSON 文字列として書く。
    pub fn encode(&self) -> String {
        let payload = match &self.data {
            Value::String(s) if is_raw_safe(s) => s.clone(),
            other => other.to_string(),
        };
        format!("{}:{} {}", self.event_type, self.event_name, payload)
    }

    /// emit に使うキー
    pub fn emission_key(&self) -> String {
        format!("{}:{}", self.event_name, self.event_type)
    }
}

fn is_raw_safe(s: &str) -> bool {
    !s.is_empty()
        && s.trim() == s
        && !s.contains(['\r', '\n'])
        && serde_json::from_str::<Value>(s).is_err()
}

/// JSON として読めなければ文字列値にする
pub fn lenient_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn decodes_json_payload() {
        let env = EventEnvelope::decode(r#"sensor:door {"k":1}"#).unwrap();
        assert_eq!(env.event_type, "sensor");
        assert_eq!(env.event_name, "door");
        assert_eq!(env.data, json!({"k": 1}));
    }

    #[test]
    fn raw_payload_becomes_json_string() {
        let env = EventEnvelope::decode("sensor:door hello").unwrap();
        assert_eq!(env.data, Value::String("hello".to_string()));
    }

    #[test]
    fn emission_key_puts_name_first() {
        let env = EventEnvelope::decode("sensor:door 1").unwrap();
        assert_eq!(env.emission_key(), "door:sensor");
    }

    #[test]
    fn empty_tokens_are_allowed() {
        let env = EventEnvelope::decode(": {}").unwrap();
        assert_eq!(env.event_type, "");
        assert_eq!(env.event_name, "");
        assert_eq!(env.emission_key(), ":");
    }

    #[test]
    fn payload_keeps_inner_spaces() {
        let env = EventEnvelope::decode("a:b hello world").unwrap();
        assert_eq!(env.data, json!("hello world"));
    }

    #[rstest]
    #[case::missing_space("sensor:door")]
    #[case::missing_colon("sensordoor {}")]
    #[case::dash_in_token("sen-sor:door {}")]
    #[case::multiline("sensor:door {}\nextra")]
    #[case::carriage_return("a:b x\ry")]
    #[case::empty("")]
    fn malformed_content_is_rejected(#[case] content: &str) {
        assert!(EventEnvelope::decode(content).is_none());
    }

    #[rstest]
    #[case::numeric_string(json!("123"), r#"a:b "123""#)]
    #[case::bool_string(json!("true"), r#"a:b "true""#)]
    #[case::null_string(json!("null"), r#"a:b "null""#)]
    #[case::empty_string(json!(""), r#"a:b """#)]
    #[case::padded_string(json!(" hi "), r#"a:b " hi ""#)]
    #[case::plain_string(json!("hello"), "a:b hello")]
    #[case::object(json!({"open": true}), r#"a:b {"open":true}"#)]
    fn encoded_payload_survives_the_channel(#[case] data: Value, #[case] wire: &str) {
        let env = EventEnvelope::new("a", "b", data);
        let encoded = env.encode();
        assert_eq!(encoded, wire);
        // チャネルはトリムしてからデコードする
        assert_eq!(EventEnvelope::decode(encoded.trim()), Some(env));
    }
}
