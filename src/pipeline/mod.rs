//! The encode and decode pipelines and the artifact container they share.

pub mod artifact;
pub mod format;
pub mod orchestrator;
pub mod reconstruct;


pub use artifact::{ArrayInfo, Artifact, ArtifactInfo};
pub use format::{ArtifactHeader, ARTIFACT_FORMAT_VERSION, ARTIFACT_MAGIC};
pub use orchestrator::{encode_frames, run, EncodeOutput, EncodeReport};
pub use reconstruct::reconstruct_frames;
