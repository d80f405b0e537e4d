//! Progress engine: HTTP plumbing and the timer-driven tracker runtime.
mod client;
mod tracker;
mod types;
mod wire;

pub use client::{ClientSettings, ProgressClient, ReqwestProgressClient};
pub use tracker::{TrackerEvent, TrackerHandle, TrackerSettings};
pub use types::{FailureKind, PollError};
pub use wire::{check_submit_response, decode_progress, encode_analysis_request};
