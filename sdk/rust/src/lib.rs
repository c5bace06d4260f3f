//! Client side of the AI judge: an HTTP [`VerdictGateway`](judge_core::VerdictGateway)
//! for a running judge server, and text panels for rendering a case.

pub mod client;
pub mod panel;

pub use client::{ClientError, JudgeClient, RemoteSample, DEFAULT_BASE_URL};
