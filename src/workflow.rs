//! Workflow JSON repair: document model, normalization passes, directory walk.
mod document;
mod pass;
mod walk;

pub use pass::{Change, NormalizationPass};
pub use walk::{walk, WalkSummary};
