//! Frame extraction pipeline.
//!
//! Organizes the steps that turn a video into a set of sampled image files:
//! temporal sampling, downscaling, encoding, and the per-video and batch
//! drivers that tie them to the ledger.

/// Target-rate frame selection
pub mod sampler;

/// Width-capped box-filter downscaling
pub mod scaling;

/// JPEG/PNG encoding and frame file management
pub mod writer;

/// Single-video extraction guarded by the ledger
pub mod extract;

/// Batch orchestration over many videos
pub mod batch;

pub use batch::{BatchSummary, VideoReport, VideoStatus, process_videos};
pub use extract::{ExtractOptions, ExtractOutcome, extract_video};
pub use sampler::TemporalSampler;
