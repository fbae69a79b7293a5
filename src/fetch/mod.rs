//! The article fetch phase.
//!
//! Consumes pending link records and resolves them into full articles:
//!
//! - [`retry::RetryFetch`] wraps a single fetch with front-loaded
//!   exponential backoff; a terminal failure is reported, never raised
//! - [`orchestrator::BatchFetchOrchestrator`] slices the backlog into
//!   fixed-size batches, bounds in-flight requests per batch, checkpoints
//!   after every batch and pauses between them

pub mod orchestrator;
pub mod retry;
