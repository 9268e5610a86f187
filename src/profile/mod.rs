//! Preference profile: click ingestion, derived weights and ratios,
//! persistence and archival.

pub mod archive;
pub mod report;
pub mod store;
mod tracker;
pub mod types;
mod weights;

pub use archive::ArchiveOutcome;
pub use report::{PreferenceAnalysis, ProfileStats};
pub use store::{JsonFileStore, MemoryStore, ProfileStore};
pub use tracker::PreferenceTracker;
pub use types::*;
