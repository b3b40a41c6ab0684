// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral in-memory registries for Parley.
//!
//! Sessions bind a conversational context (document text or an uploaded
//! image) to an opaque identifier; tasks track asynchronous speech synthesis.
//! Both live only for the lifetime of the process and are flushed by the
//! [`Registries::shutdown`] hook.

pub mod id;
pub mod keyed;
pub mod lifecycle;
pub mod session;
pub mod task;

pub use id::RecordId;
pub use keyed::KeyedRegistry;
pub use lifecycle::{Registries, ShutdownReport};
pub use session::{ClearReport, SessionContext, SessionRecord, SessionRegistry};
pub use task::{TaskRecord, TaskRegistry};
