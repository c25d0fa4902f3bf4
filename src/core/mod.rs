//! Core data model: variants, requests and artifacts.

pub mod artifact;
pub mod request;
pub mod variant;

pub use artifact::{Artifact, ArtifactKind, StageKind};
pub use request::BuildRequest;
pub use variant::{BuildVariant, VariantProfile};
