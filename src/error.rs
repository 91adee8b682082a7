// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured errors for the Public Command Surface.
//!
//! Every failure a caller can act on programmatically carries a stable
//! `(ENGINE, subsystem, detail)` triple rather than just a message, so a host
//! binding can map errors onto its own error reporting without string
//! matching.

use std::fmt;
use thiserror::Error;

/// Which part of the engine raised the error.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Subsystem {
    Config,
    Start,
    Stop,
    Break,
    Pause,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Subsystem::Config => "CONFIG",
            Subsystem::Start => "START",
            Subsystem::Stop => "STOP",
            Subsystem::Break => "BREAK",
            Subsystem::Pause => "PAUSE",
        };
        f.write_str(s)
    }
}

/// What kind of thing went wrong within the subsystem.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Detail {
    Usage,
    Option,
    Value,
    Target,
    Unknown,
    Subcommand,
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Detail::Usage => "USAGE",
            Detail::Option => "OPTION",
            Detail::Value => "VALUE",
            Detail::Target => "TARGET",
            Detail::Unknown => "UNKNOWN",
            Detail::Subcommand => "SUBCOMMAND",
        };
        f.write_str(s)
    }
}

/// A structured engine error: `ENGINE/<subsystem>/<detail>: <message>`.
#[derive(Debug, Error)]
#[error("ENGINE/{subsystem}/{detail}: {message}")]
pub struct EngineError {
    pub subsystem: Subsystem,
    pub detail: Detail,
    pub message: String,
}

impl EngineError {
    pub fn new(subsystem: Subsystem, detail: Detail, message: impl Into<String>) -> Self {
        Self {
            subsystem,
            detail,
            message: message.into(),
        }
    }

    /// The stable `(ENGINE, subsystem, detail)` triple for programmatic matching.
    pub fn code(&self) -> (&'static str, Subsystem, Detail) {
        ("ENGINE", self.subsystem, self.detail)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
