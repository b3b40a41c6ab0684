// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup and shutdown hooks for the registries.

use std::sync::Arc;

use tracing::info;

use crate::session::SessionRegistry;
use crate::task::TaskRegistry;

/// The process-wide registries, created once at startup and shared by `Arc`.
#[derive(Clone, Default)]
pub struct Registries {
    pub sessions: Arc<SessionRegistry>,
    pub tasks: Arc<TaskRegistry>,
}

/// What the shutdown hook released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub sessions_cleared: usize,
    pub files_removed: usize,
    pub tasks_cleared: usize,
}

impl Registries {
    /// Creates empty registries.
    pub fn init() -> Self {
        info!("session and task registries initialized");
        Self::default()
    }

    /// Clears sessions (deleting their owned files) and then tasks.
    ///
    /// Safe to call more than once and while requests are still in flight:
    /// anything created after the key snapshot survives until the next call.
    pub fn shutdown(&self) -> ShutdownReport {
        info!("clearing registries");
        let sessions = self.sessions.clear_all();
        let tasks_cleared = self.tasks.clear_all();

        let report = ShutdownReport {
            sessions_cleared: sessions.sessions,
            files_removed: sessions.files_removed,
            tasks_cleared,
        };
        info!(
            sessions = report.sessions_cleared,
            files = report.files_removed,
            tasks = report.tasks_cleared,
            "registries cleared"
        );
        report
    }
}
