// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The host interpreter contract: everything the engine needs from, and
//! publishes into, the scripting host it's embedded in. One external
//! collaborator, one trait, default-free because every one of these
//! operations is load-bearing rather than an optional callback.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::event::{CommandToken, Frame};

/// An opaque handle to an installed trace, returned by
/// [`Host::install_trace`] and handed back to [`Host::remove_trace`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TraceToken(pub u64);

/// The interpreter-side operations the engine needs. Every method is
/// load-bearing: there is no default implementation because a host that
/// can't provide one of these can't host this engine.
#[async_trait]
pub trait Host: Send + Sync {
    /// Resolve the fully-qualified command name a trace callback token
    /// refers to, if the host can determine one right now.
    fn resolve_command_name(&self, token: &CommandToken) -> Option<String>;

    /// Canonicalize a file path for storage/comparison.
    fn normalize_path(&self, path: &str) -> String;

    /// Compare two paths for equality under the host's own notion of path
    /// identity (case sensitivity, symlinks, drive letters, etc.).
    fn paths_equal(&self, a: &str, b: &str) -> bool;

    /// Snapshot the current execution frame.
    fn frame_info(&self) -> anyhow::Result<Frame>;

    /// The current call-stack depth, used as a fallback when `frame_info`
    /// can't report a level.
    fn current_call_depth(&self) -> i64;

    /// Evaluate `expr` as a boolean condition at the given frame level.
    fn eval_at_level(&self, level: i64, expr: &str) -> anyhow::Result<bool>;

    /// Perform variable/command substitution (but not command execution) on
    /// `template` at the given frame level, for log messages.
    fn subst_at_level(&self, level: i64, template: &str) -> anyhow::Result<String>;

    /// Make the command currently under evaluation available as `$cmd` in
    /// the frame at `level`, so conditions and log templates can reference
    /// it.
    fn set_cmd_var(&self, level: i64, cmd: &[String]) -> anyhow::Result<()>;

    /// The current frame's local variables, name to string value.
    fn locals(&self) -> anyhow::Result<BTreeMap<String, String>>;

    /// The formal argument names of a procedure.
    fn proc_args(&self, proc_name: &str) -> anyhow::Result<Vec<String>>;

    /// Read a variable's current string value, if it exists.
    fn get_var(&self, name: &str) -> Option<String>;

    /// Install the object trace (the per-command callback driving
    /// `Engine::on_command`). `allow_inline` mirrors the `perf_allow_inline`
    /// config knob.
    fn install_trace(&self, allow_inline: bool) -> anyhow::Result<TraceToken>;

    /// Remove a previously installed trace.
    fn remove_trace(&self, token: TraceToken);

    /// Ensure the execution-step trace (the one that drives
    /// `Engine::on_proc_enter` and file:line matching) is installed. Unlike
    /// the object trace, this is not tracked by a token the engine holds,
    /// since the host is responsible for multiplexing it across all
    /// interested features.
    fn ensure_exec_traces(&self);

    /// Publish `value` as the value of global variable `name`, triggering
    /// any write traces the host or its embedder may have on it.
    fn publish_global(&self, name: &str, value: &serde_json::Value);

    /// Remove a global variable entirely.
    fn unset_global(&self, name: &str);

    /// Write `text` to the interpreter's standard output channel, the way
    /// the host's own `puts` would. Used for log-only breakpoints (§4.2.f):
    /// their substituted message must reach stdout, not a logging sink, so
    /// it's a distinct operation from `log`.
    fn emit_output(&self, text: &str);

    /// Report an error that occurred outside of any call the engine's
    /// caller can observe directly (e.g. a failed resume wait).
    fn background_error(&self, err: anyhow::Error);

    /// Suspend until the host resumes execution (by setting the `resume`
    /// variable, or equivalent). Must yield to the host's own event loop /
    /// async runtime rather than blocking a thread.
    async fn wait_for_resume(&self) -> anyhow::Result<()>;
}