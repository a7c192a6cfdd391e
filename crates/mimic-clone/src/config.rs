//! Engine configuration

/// How text values are duplicated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum TextPolicy {
    /// Copy the characters into a new allocation
    #[default]
    Copy,
    /// Reuse the source allocation (text is immutable)
    Share,
}

/// Configuration for [`DefaultCloningEngine`](crate::DefaultCloningEngine)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Text duplication policy (default: copy)
    pub text_policy: TextPolicy,
    /// Identity map entries reserved per session (default: 64)
    pub session_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text_policy: TextPolicy::Copy,
            session_capacity: 64,
        }
    }
}
