// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Breakpoint records and the typed add-request shape consumed by
//! [`crate::engine::Engine::break_add`].

use serde::Serialize;

use crate::error::{Detail, EngineError, Subsystem};

/// Identifies a breakpoint. Monotonically increasing within a single
/// started→stopped cycle; never reused until `break_clear`/`stop` resets the
/// counter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct BreakpointId(pub u64);

/// Which of the three breakpoint shapes this record is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakpointKind {
    File,
    Proc,
    Method,
}

/// A registered breakpoint. Exactly one of the kind-specific field groups is
/// populated, per `kind`; the predicate fields (`condition`, `hit_spec`,
/// `oneshot`, `log_message`) apply uniformly across kinds, though the
/// documented dispatch algorithm only ever evaluates them for `Method` and
/// `Proc` breakpoints (see `SPEC_FULL.md` §9 on the File-breakpoint
/// asymmetry, preserved from the original).
#[derive(Clone, Debug, Serialize)]
pub struct Breakpoint {
    pub id: BreakpointId,
    pub kind: BreakpointKind,

    pub file_path: Option<String>,
    pub line: Option<u32>,

    pub proc_name: Option<String>,

    pub object_pattern: Option<String>,
    pub method_name: Option<String>,

    pub condition: Option<String>,
    pub hit_spec: Option<String>,
    pub oneshot: bool,
    pub log_message: Option<String>,

    pub hits: u64,
}

/// The resolved, conflict-free target of a breakpoint-add request.
pub enum BreakTarget {
    File { file_path: String, line: u32 },
    Proc { proc_name: String },
    Method { object_pattern: String, method_name: String },
}

/// Typed input to `break_add`. One optional field per CLI-style option; see
/// `DESIGN.md` Open Question 2 for why conflict detection here is
/// field-presence-based rather than token-order-based.
#[derive(Default, Debug, Clone)]
pub struct BreakSpec {
    pub file: Option<String>,
    pub line: Option<i64>,
    pub proc: Option<String>,
    pub method: Option<(String, String)>,
    pub condition: Option<String>,
    pub hit_spec: Option<String>,
    pub oneshot: bool,
    pub log_message: Option<String>,
}

impl BreakSpec {
    /// Validate and resolve the target, producing a `BREAK/TARGET` error on
    /// conflicting or missing target options and a `BREAK/VALUE` error on a
    /// non-positive line number.
    pub fn resolve_target(&self) -> Result<BreakTarget, EngineError> {
        let has_file = self.file.is_some() || self.line.is_some();
        let has_proc = self.proc.is_some();
        let has_method = self.method.is_some();

        let target_count = [has_file, has_proc, has_method].iter().filter(|b| **b).count();
        if target_count == 0 {
            return Err(EngineError::new(
                Subsystem::Break,
                Detail::Target,
                "no breakpoint target specified",
            ));
        }
        if target_count > 1 {
            return Err(EngineError::new(
                Subsystem::Break,
                Detail::Target,
                "conflicting breakpoint target options",
            ));
        }

        if has_file {
            let file_path = self.file.clone().ok_or_else(|| {
                EngineError::new(Subsystem::Break, Detail::Target, "file breakpoints require -file")
            })?;
            let line = self.line.ok_or_else(|| {
                EngineError::new(Subsystem::Break, Detail::Target, "file breakpoints require -line")
            })?;
            if line <= 0 {
                return Err(EngineError::new(
                    Subsystem::Break,
                    Detail::Value,
                    format!("line must be positive, got {line}"),
                ));
            }
            return Ok(BreakTarget::File { file_path, line: line as u32 });
        }

        if has_proc {
            let proc_name = self.proc.clone().unwrap();
            if proc_name.is_empty() {
                return Err(EngineError::new(
                    Subsystem::Break,
                    Detail::Value,
                    "proc name must not be empty",
                ));
            }
            return Ok(BreakTarget::Proc { proc_name });
        }

        let (object_pattern, method_name) = self.method.clone().unwrap();
        if object_pattern.is_empty() || method_name.is_empty() {
            return Err(EngineError::new(
                Subsystem::Break,
                Detail::Value,
                "method breakpoints require both an object pattern and a method name",
            ));
        }
        Ok(BreakTarget::Method { object_pattern, method_name })
    }
}

impl Breakpoint {
    pub(crate) fn new(id: BreakpointId, target: BreakTarget, spec: &BreakSpec) -> Self {
        let (kind, file_path, line, proc_name, object_pattern, method_name) = match target {
            BreakTarget::File { file_path, line } => {
                (BreakpointKind::File, Some(file_path), Some(line), None, None, None)
            }
            BreakTarget::Proc { proc_name } => {
                (BreakpointKind::Proc, None, None, Some(proc_name), None, None)
            }
            BreakTarget::Method { object_pattern, method_name } => (
                BreakpointKind::Method,
                None,
                None,
                None,
                Some(object_pattern),
                Some(method_name),
            ),
        };
        Self {
            id,
            kind,
            file_path,
            line,
            proc_name,
            object_pattern,
            method_name,
            condition: spec.condition.clone(),
            hit_spec: spec.hit_spec.clone(),
            oneshot: spec.oneshot,
            log_message: spec.log_message.clone(),
            hits: 0,
        }
    }
}
