// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dispatch observability counters, exposed read-only via
//! [`crate::engine::Engine::stats`].

use serde::Serialize;

/// Snapshot of the Trace Dispatcher's running counters.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Stats {
    /// Whether the object trace is currently installed.
    pub tracing: bool,
    /// Number of times the object-trace callback (`on_command`) has run.
    pub trace_hits: u64,
    /// Number of `info frame`-equivalent lookups performed.
    pub frame_lookups: u64,
    /// Number of commands fast-rejected because no registered Proc
    /// breakpoint's name matched.
    pub proc_fast_rejects: u64,
    /// Number of commands fast-rejected because File breakpoints are
    /// registered but the dispatcher took no further action on this call.
    pub file_fast_rejects: u64,
}