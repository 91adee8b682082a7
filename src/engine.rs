// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Engine state machine, lifecycle, and the command-surface entry points
//! that aren't part of dispatch or the pause/resume rendezvous (those live
//! in `dispatch.rs` and `rendezvous.rs`, as separate `impl Engine` blocks).

use std::sync::Arc;

use log::trace;

use crate::breakpoint::{Breakpoint, BreakSpec, BreakpointId};
use crate::config::{self, Config};
use crate::error::EngineError;
use crate::event::{Frame, StopEvent};
use crate::host::{Host, TraceToken};
use crate::registry::Registry;
use crate::stats::Stats;

/// Well-known global variable names the engine publishes into / reads from
/// the host.
pub const VAR_STOPPED: &str = "stopped";
pub const VAR_LAST_STOP: &str = "last_stop";
pub const VAR_RESUME: &str = "resume";

/// The outcome of a single dispatch call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    /// No breakpoint fired, or one fired but only logged.
    Continue,
    /// A breakpoint fired, a stop event was published, and (for
    /// `on_command`/`on_proc_enter`) the pause rendezvous has already been
    /// awaited before returning.
    Paused,
}

/// The engine. Owns the breakpoint registry, configuration, and lifecycle
/// state; drives the host through the [`Host`] trait.
pub struct Engine {
    pub(crate) host: Arc<dyn Host>,
    pub(crate) registry: Registry,
    pub(crate) config: Config,
    pub(crate) started: bool,
    pub(crate) is_paused: bool,
    pub(crate) last_stop_event: Option<StopEvent>,
    pub(crate) trace_token: Option<TraceToken>,
    pub(crate) stats: Stats,
}

impl Engine {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            registry: Registry::new(),
            config: Config::default(),
            started: false,
            is_paused: false,
            last_stop_event: None,
            trace_token: None,
            stats: Stats::default(),
        }
    }

    /// Run `f` with `is_paused` forced true, restoring the previous value
    /// afterward. Used to guard internal frame-introspection calls so they
    /// can't recursively trigger the object trace.
    pub(crate) fn with_trace_suppressed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = self.is_paused;
        self.is_paused = true;
        let result = f(self);
        self.is_paused = prev;
        result
    }

    pub(crate) fn fetch_frame(&mut self) -> anyhow::Result<Frame> {
        self.stats.frame_lookups += 1;
        self.with_trace_suppressed(|eng| eng.host.frame_info())
    }

    /// Install or remove the object trace / exec-step trace based on
    /// whether any breakpoint kind that needs them is currently registered
    /// and the engine is started.
    pub(crate) fn recompute_tracing(&mut self) {
        let need_object_trace =
            self.started && (self.registry.have_proc_bps() || self.registry.have_method_bps());

        if need_object_trace {
            if self.trace_token.is_none() {
                match self.host.install_trace(self.config.perf_allow_inline) {
                    Ok(token) => self.trace_token = Some(token),
                    Err(err) => self.host.background_error(err),
                }
            }
        } else if let Some(token) = self.trace_token.take() {
            self.host.remove_trace(token);
        }

        if self.started && (self.registry.have_file_line_bps() || self.registry.have_proc_bps()) {
            self.host.ensure_exec_traces();
        }
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        trace!("engine start");
        self.started = true;
        self.stats = Stats::default();
        self.recompute_tracing();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), EngineError> {
        trace!("engine stop");
        self.started = false;
        self.is_paused = false;
        self.registry.clear();
        self.last_stop_event = None;
        self.host.unset_global(VAR_RESUME);
        self.stats = Stats::default();
        self.recompute_tracing();
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn set_config(&mut self, opts: &[(&str, &str)]) -> Result<Config, EngineError> {
        config::apply(&mut self.config, opts)?;
        self.recompute_tracing();
        Ok(self.config)
    }

    pub fn break_add(&mut self, mut spec: BreakSpec) -> Result<BreakpointId, EngineError> {
        if self.config.path_normalize {
            if let Some(file) = spec.file.as_mut() {
                *file = self.host.normalize_path(file);
            }
        }
        let id = self.registry.add(&spec)?;
        self.recompute_tracing();
        Ok(id)
    }

    pub fn break_rm(&mut self, id: BreakpointId) -> Result<(), EngineError> {
        self.registry.remove(id)?;
        self.recompute_tracing();
        Ok(())
    }

    pub fn break_clear(&mut self) {
        self.registry.clear();
        self.recompute_tracing();
    }

    pub fn break_ls(&self) -> Vec<Breakpoint> {
        self.registry.list()
    }

    pub fn stats(&self) -> Stats {
        let mut s = self.stats;
        s.tracing = self.trace_token.is_some();
        s
    }

    /// Pure match against registered File breakpoints; does not evaluate
    /// condition/hit-spec/log, and does not pause.
    pub fn match_fileline(&self, file: &str, line: i64) -> bool {
        if line <= 0 {
            return false;
        }
        let comparison_path = if self.config.path_normalize {
            self.host.normalize_path(file)
        } else {
            file.to_string()
        };
        self.registry.file_line_breakpoints().any(|bp| {
            let Some(bp_line) = bp.line else { return false };
            if bp_line as i64 != line {
                return false;
            }
            let Some(bp_path) = bp.file_path.as_deref() else { return false };
            if self.config.path_normalize {
                self.host.paths_equal(bp_path, &comparison_path)
            } else {
                bp_path == comparison_path
            }
        })
    }

    /// Snapshot the current frame and locals/args and publish a stop event
    /// without blocking.
    pub fn pause_now(&mut self, reason: Option<&str>) -> Result<(), EngineError> {
        let mut frame = self
            .with_trace_suppressed(|eng| eng.host.frame_info())
            .unwrap_or_else(|_| Frame::fallback());
        if frame.level.is_none() {
            frame.level = Some(self.host.current_call_depth());
        }

        let mut locals = self
            .with_trace_suppressed(|eng| eng.host.locals())
            .unwrap_or_default();
        if !frame.proc.is_empty() {
            if let Ok(args) = self.with_trace_suppressed(|eng| eng.host.proc_args(&frame.proc)) {
                for name in args {
                    locals
                        .entry(name.clone())
                        .or_insert_with(|| self.host.get_var(&name).unwrap_or_default());
                }
            }
        }

        let mut event = StopEvent::from_frame(frame, reason.unwrap_or("manual").to_string());
        event.locals = Some(locals);
        self.stop_event(event);
        Ok(())
    }

    pub fn last_stop_event(&self) -> Option<&StopEvent> {
        self.last_stop_event.as_ref()
    }
}
