// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Parley chat assistant.
//!
//! The gateway exposes upload, question, forget and audio-status endpoints over
//! the session and task registries. Questions go to the configured
//! [`InferenceProvider`](parley_core::InferenceProvider); requested speech
//! synthesis runs on a bounded background worker pool whose result callers poll.

pub mod error;
pub mod form;
pub mod handlers;
pub mod server;
pub mod synthesis;

pub use error::ApiError;
pub use server::{bind, router, start_server, GatewayState, API_PREFIX};
pub use synthesis::{PoolConfig, SynthesisPool, SynthesisQueue, SYNTHESIS_FAILED};
