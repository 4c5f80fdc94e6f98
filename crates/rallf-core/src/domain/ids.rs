//! Identifiers.
//!
//! タスクの名前 (`manifest.name`) はレジストリのキーで、同名で作り直すと上書きされる。
//! 名前だけでは「どの生成か」を区別できないので、生成ごとに ULID の
//! InstanceId を振ります。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// 1 回の create に対応する識別子
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(Ulid);

impl InstanceId {
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = InstanceId::generate();
        let b = InstanceId::generate();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("instance-"));
    }

    #[test]
    fn ids_can_be_serialized() {
        let id = InstanceId::generate();
        let s = serde_json::to_string(&id).unwrap();
        let back: InstanceId = serde_json::from_str(&s).unwrap();
        assert_eq!(id, back);
    }
}
