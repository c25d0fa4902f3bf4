//! Build pipeline.
//!
//! This module implements the engine build chain (precompiled header,
//! dependency archive, main compile, link) and the independent shader pass.

pub mod artifacts;
pub mod error;
pub mod events;
pub mod flags;
pub mod orchestrator;
pub mod shader;
pub mod stage;
pub mod toolchain;

pub use artifacts::{ArtifactStore, CleanupReport};
pub use error::BuildError;
pub use events::BuildEvent;
pub use flags::{CompileStage, FlagSet};
pub use orchestrator::{BuildOrchestrator, BuildReport, BuildState};
pub use shader::{ShaderCompiler, ShaderReport};
pub use stage::{Stage, StageReport, StageRunner};
pub use toolchain::{CommandSpec, Toolchain};
