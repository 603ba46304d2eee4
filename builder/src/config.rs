//! Builder configuration.

/// When expression nodes are materialized into IR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum BuildMode {
    /// Nodes are recorded and materialized by [`BuilderContext::build`](crate::BuilderContext::build).
    #[default]
    Deferred,

    /// Nodes are materialized as soon as they are constructed, unless they
    /// depend on a reduction axis without a loop, or are reductions.
    InPlace,
}

impl BuildMode {
    /// Get the build mode from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `KILN_BUILD_INPLACE=1` (or `true`) - materialize at construction
    pub fn from_env() -> Self {
        match std::env::var("KILN_BUILD_INPLACE") {
            Ok(value) if matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on") => {
                Self::InPlace
            }
            _ => Self::Deferred,
        }
    }

    pub fn is_in_place(&self) -> bool {
        matches!(self, Self::InPlace)
    }
}
