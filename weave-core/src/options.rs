#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use weave_model::TypeRef;

/// What to do when two mixins used by the same consumer both supply a
/// member with the same name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossMixinPolicy {
    /// Copy both, say nothing.
    Allow,
    /// Copy both and emit a warning.
    #[default]
    Warn,
    /// Keep the first copy; the later one is an error and is skipped.
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Prefix of every capability interface name.
    pub interface_prefix: String,
    /// Names accepted as the universal root base type.
    pub root_types: Vec<String>,
    pub cross_mixin_conflicts: CrossMixinPolicy,
    /// Warn when a mixin carries more than one mixin-constructor marker.
    pub check_mixin_constructors: bool,
    /// `using` directives written at the top of each augmentation.
    pub usings: Vec<String>,
    /// Resolve mixins and consumers on the rayon pool. Output is identical
    /// either way.
    pub parallel: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            interface_prefix: "I_Mx".to_string(),
            root_types: vec!["System.Object".to_string(), "object".to_string()],
            cross_mixin_conflicts: CrossMixinPolicy::Warn,
            check_mixin_constructors: true,
            usings: vec!["System".to_string()],
            parallel: true,
        }
    }
}

impl ResolverOptions {
    pub fn is_root_type(&self, base: &TypeRef) -> bool {
        base.args.is_empty() && self.root_types.iter().any(|r| r == &base.name)
    }

    pub fn interface_name(&self, mixin_name: &str) -> String {
        format!("{}{}", self.interface_prefix, mixin_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_type_accepts_both_spellings() {
        let opts = ResolverOptions::default();
        assert!(opts.is_root_type(&TypeRef::named("object")));
        assert!(opts.is_root_type(&TypeRef::named("System.Object")));
        assert!(!opts.is_root_type(&TypeRef::named("Sample.Base")));
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let opts: ResolverOptions =
            serde_json::from_str(r#"{"cross_mixin_conflicts":"reject"}"#).expect("options");
        assert_eq!(opts.cross_mixin_conflicts, CrossMixinPolicy::Reject);
        assert_eq!(opts.interface_prefix, "I_Mx");
        assert!(opts.parallel);
    }
}
