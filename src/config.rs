// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Engine configuration: the three boolean knobs the host can tune, plus the
//! string-keyed parser used by [`crate::engine::Engine::config`], which
//! mirrors the `?-opt val?...` shape of the original command surface at the
//! typed Rust boundary.

use serde::Serialize;

use crate::error::{Detail, EngineError, Subsystem};

/// Engine-wide tunables.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Config {
    /// Allow the object trace to be installed with Tcl's "inline" execution
    /// optimization left enabled. Disabling this trades performance for
    /// guaranteed visibility of every command, including ones a host might
    /// otherwise execute without dispatching through the trace.
    pub perf_allow_inline: bool,
    /// Normalize file paths (both stored breakpoint paths and paths passed to
    /// `match_fileline`) through the host's canonicalization before
    /// comparison.
    pub path_normalize: bool,
    /// Evaluate conditions and log templates in the host's safe interpreter
    /// rather than the trusted one.
    pub safe_eval: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            perf_allow_inline: true,
            path_normalize: true,
            safe_eval: false,
        }
    }
}

/// Parse a single config option's string value into a `bool`, accepting the
/// same spellings Tcl's boolean parsing does.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply a set of `-opt val` pairs to `config`, validating each before any
/// mutation is committed so a bad option never leaves the config half
/// updated.
pub fn apply(config: &mut Config, opts: &[(&str, &str)]) -> Result<(), EngineError> {
    let mut next = *config;
    for (opt, val) in opts {
        let value = parse_bool(val).ok_or_else(|| {
            EngineError::new(
                Subsystem::Config,
                Detail::Value,
                format!("expected a boolean value for {opt}, got {val:?}"),
            )
        })?;
        match *opt {
            "-perf.allowInline" => next.perf_allow_inline = value,
            "-path.normalize" => next.path_normalize = value,
            "-safeEval" => next.safe_eval = value,
            other => {
                return Err(EngineError::new(
                    Subsystem::Config,
                    Detail::Option,
                    format!("unknown configuration option {other}"),
                ))
            }
        }
    }
    *config = next;
    Ok(())
}
