// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-process breakpoint registry and command-trace dispatcher for embedding
//! an interactive debugger in a dynamically-typed scripting host.
//!
//! The engine never touches the host's parser or bytecode; it is driven
//! entirely through the [`Host`] trait, which the embedder implements over
//! whatever trace/eval primitives its interpreter exposes. See `SPEC_FULL.md`
//! for the full module-by-module design and `DESIGN.md` for where each piece
//! is grounded.

mod breakpoint;
mod config;
mod dispatch;
mod engine;
mod error;
mod event;
mod glob;
mod hitspec;
mod host;
mod registry;
mod rendezvous;
mod stats;

#[cfg(test)]
mod test_support;

pub use self::{
    breakpoint::{BreakSpec, BreakTarget, Breakpoint, BreakpointId, BreakpointKind},
    config::Config,
    engine::{DispatchOutcome, Engine, VAR_LAST_STOP, VAR_RESUME, VAR_STOPPED},
    error::{Detail, EngineError, EngineResult, Subsystem},
    event::{CommandToken, Frame, StopEvent},
    host::{Host, TraceToken},
    stats::Stats,
};