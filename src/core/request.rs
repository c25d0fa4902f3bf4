//! Build requests.

use crate::core::variant::BuildVariant;

/// One invocation's worth of build intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildRequest {
    /// Selected variant. `None` is an invalid request that runs no stage.
    pub variant: Option<BuildVariant>,
    /// Rebuild the precompiled header and dependency archive first.
    pub full: bool,
}

impl BuildRequest {
    /// Create a request for a variant.
    pub fn new(variant: BuildVariant) -> Self {
        BuildRequest {
            variant: Some(variant),
            full: false,
        }
    }

    /// Request a full rebuild.
    pub fn full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }
}
