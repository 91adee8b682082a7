// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The Breakpoint Registry: CRUD over breakpoints keyed by monotonic id,
//! plus the per-kind fast-reject flags the Trace Dispatcher consults before
//! doing any real matching work.

use std::collections::BTreeMap;

use crate::breakpoint::{BreakSpec, Breakpoint, BreakpointId, BreakpointKind};
use crate::error::{Detail, EngineError, Subsystem};

/// Breakpoints keyed by id. A `BTreeMap` is used rather than a hash map
/// because ids are monotonic and never reused within a cycle: iteration
/// order is simultaneously insertion order (what dispatch needs for
/// first-match-wins) and ascending-id order (what `break_ls` must return).
/// See `DESIGN.md` Open Question 1.
#[derive(Default)]
pub struct Registry {
    breakpoints: BTreeMap<u64, Breakpoint>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self { breakpoints: BTreeMap::new(), next_id: 1 }
    }

    pub fn add(&mut self, spec: &BreakSpec) -> Result<BreakpointId, EngineError> {
        let target = spec.resolve_target()?;
        let id = BreakpointId(self.next_id);
        self.next_id += 1;
        let bp = Breakpoint::new(id, target, spec);
        self.breakpoints.insert(id.0, bp);
        Ok(id)
    }

    pub fn remove(&mut self, id: BreakpointId) -> Result<(), EngineError> {
        self.breakpoints.remove(&id.0).map(|_| ()).ok_or_else(|| {
            EngineError::new(
                Subsystem::Break,
                Detail::Unknown,
                format!("no such breakpoint: {}", id.0),
            )
        })
    }

    pub fn clear(&mut self) {
        self.breakpoints.clear();
        self.next_id = 1;
    }

    pub fn get(&self, id: BreakpointId) -> Option<&Breakpoint> {
        self.breakpoints.get(&id.0)
    }

    /// List all breakpoints in ascending-id order.
    pub fn list(&self) -> Vec<Breakpoint> {
        self.breakpoints.values().cloned().collect()
    }

    pub fn count(&self, kind: BreakpointKind) -> usize {
        self.breakpoints.values().filter(|bp| bp.kind == kind).count()
    }

    pub fn have_proc_bps(&self) -> bool {
        self.count(BreakpointKind::Proc) > 0
    }

    pub fn have_file_line_bps(&self) -> bool {
        self.count(BreakpointKind::File) > 0
    }

    pub fn have_method_bps(&self) -> bool {
        self.count(BreakpointKind::Method) > 0
    }

    /// Breakpoints of a given kind, in registry (== insertion) order.
    pub fn iter_of_kind(&self, kind: BreakpointKind) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values().filter(move |bp| bp.kind == kind)
    }

    pub fn file_line_breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.iter_of_kind(BreakpointKind::File)
    }

    /// Bump a breakpoint's hit counter and return the new value. Panics if
    /// `id` is not present, which would indicate a dispatch bug (the id came
    /// from a scan of this same registry moments earlier, under the
    /// single-threaded cooperative model nothing else could have removed it
    /// in between).
    pub fn increment_hits(&mut self, id: BreakpointId) -> u64 {
        let bp = self
            .breakpoints
            .get_mut(&id.0)
            .expect("breakpoint id from a live scan must still be present");
        bp.hits += 1;
        bp.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_spec(name: &str) -> BreakSpec {
        BreakSpec { proc: Some(name.to_string()), ..Default::default() }
    }

    #[test]
    fn ids_are_monotonic_and_reset_on_clear() {
        let mut reg = Registry::new();
        let a = reg.add(&proc_spec("::a")).unwrap();
        let b = reg.add(&proc_spec("::b")).unwrap();
        assert_eq!(a.0, 1);
        assert_eq!(b.0, 2);

        reg.clear();
        let c = reg.add(&proc_spec("::c")).unwrap();
        assert_eq!(c.0, 1, "ids must reset to 1 after clear");
    }

    #[test]
    fn remove_unknown_id_is_an_error() {
        let mut reg = Registry::new();
        let err = reg.remove(BreakpointId(42)).unwrap_err();
        assert_eq!(err.code().2, Detail::Unknown);
    }

    #[test]
    fn list_is_ascending_by_id() {
        let mut reg = Registry::new();
        reg.add(&proc_spec("::a")).unwrap();
        reg.add(&proc_spec("::b")).unwrap();
        reg.add(&proc_spec("::c")).unwrap();
        let ids: Vec<u64> = reg.list().iter().map(|bp| bp.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn counts_track_kind() {
        let mut reg = Registry::new();
        reg.add(&proc_spec("::a")).unwrap();
        assert!(reg.have_proc_bps());
        assert!(!reg.have_file_line_bps());
        assert_eq!(reg.count(BreakpointKind::Proc), 1);
    }

    #[test]
    fn hits_increment() {
        let mut reg = Registry::new();
        let id = reg.add(&proc_spec("::a")).unwrap();
        assert_eq!(reg.increment_hits(id), 1);
        assert_eq!(reg.increment_hits(id), 2);
        assert_eq!(reg.get(id).unwrap().hits, 2);
    }
}