// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The stop-event schema and the frame snapshot it's built from, plus the
//! opaque command token the host uses to identify the command currently
//! under the object trace.

use std::collections::BTreeMap;

use serde::Serialize;

/// An opaque handle to the command currently being traced, as understood by
/// the host. Passed back into [`crate::host::Host::resolve_command_name`]
/// rather than re-resolved by name, since the host is the only party that
/// can answer "what procedure does this resolve to right now".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommandToken(pub u64);

/// A snapshot of the host's current execution frame.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub kind: String,
    pub file: String,
    pub line: i64,
    pub proc: String,
    pub cmd: Vec<String>,
    pub level: Option<i64>,
}

impl Frame {
    /// The fallback frame used when the host cannot supply one (e.g. at the
    /// top level, or when introspection itself fails).
    pub fn fallback() -> Self {
        Self {
            kind: "eval".to_string(),
            file: String::new(),
            line: -1,
            proc: String::new(),
            cmd: Vec::new(),
            level: None,
        }
    }
}

/// The dict published to `stopped`/`last_stop` when the engine pauses.
#[derive(Clone, Debug, Serialize)]
pub struct StopEvent {
    pub event: String,
    pub reason: String,
    pub file: String,
    pub line: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub proc: String,
    pub cmd: Vec<String>,
    pub level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locals: Option<BTreeMap<String, String>>,
}

impl StopEvent {
    pub fn from_frame(frame: Frame, reason: String) -> Self {
        Self {
            event: "stopped".to_string(),
            reason,
            file: frame.file,
            line: frame.line,
            kind: frame.kind,
            proc: frame.proc,
            cmd: frame.cmd,
            level: frame.level.unwrap_or(0),
            locals: None,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_frame_defaults_level_to_zero() {
        let frame = Frame { level: None, ..Frame::fallback() };
        let event = StopEvent::from_frame(frame, "breakpoint".to_string());
        assert_eq!(event.level, 0);
        assert_eq!(event.event, "stopped");
    }

    #[test]
    fn locals_are_omitted_when_absent() {
        let event = StopEvent::from_frame(Frame::fallback(), "manual".to_string());
        let value = event.to_value();
        assert!(value.get("locals").is_none());
    }
}