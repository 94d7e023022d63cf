//! Request orchestration: validate, plan, render, encode.
//!
//! [`engine::SpinEngine::generate`] runs on the calling thread; [`engine::SpinEngine::spawn`]
//! validates inline and moves the render and encode work to a background thread.

/// Requests, outputs and the synchronous pipeline.
pub mod engine;
/// Background jobs with cancellation.
pub mod job;
