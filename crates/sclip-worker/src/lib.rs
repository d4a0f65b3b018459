//! Clip production pipeline.
//!
//! This crate provides:
//! - The single-clip pipeline (extract, cut, caption, mix, metadata)
//! - Batch mass-production over input folders with processed records
//! - Batch upload with an `uploaded.json` record
//! - Configuration from environment variables

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;

pub use batch::{find_input_folders, run_batch, run_batch_upload, BatchReport};
pub use config::PipelineConfig;
pub use error::{WorkerError, WorkerResult};
pub use pipeline::{process_clip, ClipOutcome, ClipPaths};
