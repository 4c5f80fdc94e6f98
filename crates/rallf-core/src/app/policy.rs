//! AccessPolicy - manifest による skill 呼び出しの許可判定
//!
//! 副作用の無い純粋関数。panic もしない。

use crate::domain::Manifest;

pub struct AccessPolicy;

impl AccessPolicy {
    /// `manifest.skills[skill_name]` に `skill_method` が完全一致で含まれるとき true
    ///
    /// skills セクション・skill・メソッドのいずれかが無ければ false。
    pub fn is_permitted(manifest: &Manifest, skill_name: &str, skill_method: &str) -> bool {
        manifest
            .granted_methods(skill_name)
            .is_some_and(|methods| methods.iter().any(|m| m == skill_method))
    }
}
