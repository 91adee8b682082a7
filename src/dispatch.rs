// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Trace dispatcher: the object-trace and exec-step-trace callback bodies.
//! Both share the same evaluate-and-maybe-pause pipeline; proc breakpoints
//! get their own entry point (`on_proc_enter`) because their evaluation can
//! only happen correctly once the callee's frame is established, which the
//! object trace (`on_command`) fires too early to observe.

use log::{debug, trace};

use crate::breakpoint::{BreakpointId, BreakpointKind};
use crate::engine::{DispatchOutcome, Engine};
use crate::event::{CommandToken, StopEvent};
use crate::glob::glob_match;
use crate::hitspec::hit_spec_ok;

/// Whether a stored Proc breakpoint name matches a resolved command name.
/// Exact match, or a match after stripping a leading `::` from the stored
/// name when the resolved name has none (the original's fallback rule for
/// names resolved relative to the global namespace).
pub fn proc_name_matches(stored: &str, resolved: &str) -> bool {
    if stored == resolved {
        return true;
    }
    if let Some(rest) = stored.strip_prefix("::") {
        if !resolved.starts_with("::") && rest == resolved {
            return true;
        }
    }
    false
}

/// The result of evaluating one matched breakpoint candidate's
/// condition/hit-spec/log/pause pipeline.
enum CandidateOutcome {
    /// Condition or hit-spec rejected this candidate; keep scanning.
    Rejected,
    /// Logged (and possibly marked oneshot for removal); keep scanning.
    Logged { oneshot_id: Option<BreakpointId> },
    /// This candidate should pause; scanning stops here.
    Paused { event: StopEvent, oneshot_id: Option<BreakpointId> },
}

impl Engine {
    /// The object-trace callback: runs on every executed command. Handles
    /// Proc fast-match/fast-reject accounting (no evaluation, delegated to
    /// [`Engine::on_proc_enter`]), the full Method breakpoint pipeline, and
    /// File fast-reject accounting.
    pub async fn on_command(
        &mut self,
        token: &CommandToken,
        objv: &[String],
    ) -> anyhow::Result<DispatchOutcome> {
        self.stats.trace_hits += 1;
        if self.is_paused {
            return Ok(DispatchOutcome::Continue);
        }
        trace!("on_command objv={objv:?}");

        if self.registry.have_proc_bps() {
            let resolved = self.host.resolve_command_name(token).or_else(|| objv.first().cloned());
            let matched = resolved.as_deref().is_some_and(|name| {
                self.registry
                    .iter_of_kind(BreakpointKind::Proc)
                    .any(|bp| proc_name_matches(bp.proc_name.as_deref().unwrap_or(""), name))
            });
            if !matched {
                self.stats.proc_fast_rejects += 1;
            }
        } else {
            self.stats.proc_fast_rejects += 1;
        }

        let mut outcome = DispatchOutcome::Continue;
        if self.registry.have_method_bps() && objv.len() >= 2 {
            let obj = objv[0].clone();
            let selector = objv[1].clone();
            let ids: Vec<BreakpointId> = self
                .registry
                .iter_of_kind(BreakpointKind::Method)
                .filter(|bp| {
                    glob_match(&obj, bp.object_pattern.as_deref().unwrap_or(""))
                        && bp.method_name.as_deref() == Some(selector.as_str())
                })
                .map(|bp| bp.id)
                .collect();

            if let Some(result) = self.run_candidate_pipeline(&ids, objv).await? {
                match result {
                    CandidateOutcome::Paused { event, oneshot_id } => {
                        self.stop_event(event);
                        if let Some(id) = oneshot_id {
                            self.registry.remove(id).ok();
                            self.recompute_tracing();
                        }
                        outcome = DispatchOutcome::Paused;
                    }
                    CandidateOutcome::Logged { oneshot_id } => {
                        if let Some(id) = oneshot_id {
                            self.registry.remove(id).ok();
                            self.recompute_tracing();
                        }
                    }
                    CandidateOutcome::Rejected => {}
                }
            }
        }

        if matches!(outcome, DispatchOutcome::Continue) && self.registry.have_file_line_bps() {
            self.stats.file_fast_rejects += 1;
        }

        if matches!(outcome, DispatchOutcome::Paused) {
            self.enter_pause().await?;
        }

        Ok(outcome)
    }

    /// The exec-step-trace callback: invoked by the host once it has
    /// resolved that `proc_name` is being entered at a stable frame
    /// (`level`). Runs the same condition/hit-spec/log/pause pipeline as
    /// `on_command`'s Method path, against Proc breakpoints.
    pub async fn on_proc_enter(
        &mut self,
        proc_name: &str,
        objv: &[String],
    ) -> anyhow::Result<DispatchOutcome> {
        if self.is_paused {
            return Ok(DispatchOutcome::Continue);
        }

        let ids: Vec<BreakpointId> = self
            .registry
            .iter_of_kind(BreakpointKind::Proc)
            .filter(|bp| proc_name_matches(bp.proc_name.as_deref().unwrap_or(""), proc_name))
            .map(|bp| bp.id)
            .collect();
        if ids.is_empty() {
            return Ok(DispatchOutcome::Continue);
        }

        let mut outcome = DispatchOutcome::Continue;
        if let Some(result) = self.run_candidate_pipeline(&ids, objv).await? {
            match result {
                CandidateOutcome::Paused { mut event, oneshot_id } => {
                    event.proc = proc_name.to_string();
                    self.stop_event(event);
                    if let Some(id) = oneshot_id {
                        self.registry.remove(id).ok();
                        self.recompute_tracing();
                    }
                    outcome = DispatchOutcome::Paused;
                }
                CandidateOutcome::Logged { oneshot_id } => {
                    if let Some(id) = oneshot_id {
                        self.registry.remove(id).ok();
                        self.recompute_tracing();
                    }
                }
                CandidateOutcome::Rejected => {}
            }
        }

        if matches!(outcome, DispatchOutcome::Paused) {
            self.enter_pause().await?;
        }
        Ok(outcome)
    }

    /// Scan `ids` in order, evaluating each candidate's condition/hit-spec
    /// in turn; the first candidate that logs or pauses stops the scan.
    /// Returns `None` only when `ids` is empty.
    async fn run_candidate_pipeline(
        &mut self,
        ids: &[BreakpointId],
        objv: &[String],
    ) -> anyhow::Result<Option<CandidateOutcome>> {
        if ids.is_empty() {
            return Ok(None);
        }

        let frame = self.fetch_frame().unwrap_or_else(|_| crate::event::Frame::fallback());
        let level = frame.level.unwrap_or(0);
        if let Err(err) = self.host.set_cmd_var(level, objv) {
            debug!("set_cmd_var failed, conditions referencing $cmd may misbehave: {err:#}");
        }

        for &id in ids {
            let hits = self.registry.increment_hits(id);
            let Some(bp) = self.registry.get(id) else { continue };
            let condition = bp.condition.clone();
            let hit_spec = bp.hit_spec.clone();
            let log_message = bp.log_message.clone();
            let oneshot = bp.oneshot;

            if let Some(cond) = condition {
                let ok = self
                    .with_trace_suppressed(|eng| eng.host.eval_at_level(level, &cond))
                    .unwrap_or_else(|err| {
                        debug!("condition evaluation failed, treating as false: {err:#}");
                        false
                    });
                if !ok {
                    continue;
                }
            }
            if !hit_spec_ok(hit_spec.as_deref(), hits) {
                continue;
            }

            if let Some(template) = log_message {
                match self.with_trace_suppressed(|eng| eng.host.subst_at_level(level, &template)) {
                    Ok(msg) => self.host.emit_output(&msg),
                    Err(err) => debug!("log substitution failed: {err:#}"),
                }
                return Ok(Some(CandidateOutcome::Logged {
                    oneshot_id: oneshot.then_some(id),
                }));
            }

            let event = StopEvent::from_frame(frame.clone(), "breakpoint".to_string());
            return Ok(Some(CandidateOutcome::Paused {
                event,
                oneshot_id: oneshot.then_some(id),
            }));
        }

        Ok(Some(CandidateOutcome::Rejected))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::breakpoint::BreakSpec;
    use crate::engine::{DispatchOutcome, Engine};
    use crate::event::CommandToken;
    use crate::test_support::FakeHost;

    fn objv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn proc_name_matching_tolerates_global_prefix() {
        assert!(super::proc_name_matches("::foo", "::foo"));
        assert!(super::proc_name_matches("::foo", "foo"));
        assert!(!super::proc_name_matches("::foo", "::bar"));
        assert!(!super::proc_name_matches("foo", "::foo"));
    }

    #[tokio::test]
    async fn proc_breakpoint_trips_and_publishes_stop_event() {
        let host = Arc::new(FakeHost::new());
        host.resume_notify().notify_one();
        let mut engine = Engine::new(host.clone());
        engine.start().unwrap();
        engine
            .break_add(BreakSpec { proc: Some("::foo".into()), ..Default::default() })
            .unwrap();

        let outcome = engine.on_proc_enter("::foo", &objv(&["::foo"])).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Paused);
        let event = engine.last_stop_event().unwrap();
        assert_eq!(event.proc, "::foo");
        assert_eq!(engine.stats().trace_hits, 0, "on_proc_enter doesn't bump trace_hits");
    }

    #[tokio::test]
    async fn conditional_proc_breakpoint_only_trips_when_condition_true() {
        let host = Arc::new(FakeHost::new());
        host.resume_notify().notify_one();
        host.set_condition_result(false);
        let mut engine = Engine::new(host.clone());
        engine.start().unwrap();
        engine
            .break_add(BreakSpec {
                proc: Some("::foo".into()),
                condition: Some("$n > 10".into()),
                ..Default::default()
            })
            .unwrap();

        let outcome = engine.on_proc_enter("::foo", &objv(&["::foo"])).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Continue);

        host.set_condition_result(true);
        let outcome = engine.on_proc_enter("::foo", &objv(&["::foo"])).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Paused);
    }

    #[tokio::test]
    async fn hit_count_gate_trips_on_third_hit() {
        let host = Arc::new(FakeHost::new());
        host.resume_notify().notify_one();
        let mut engine = Engine::new(host.clone());
        engine.start().unwrap();
        engine
            .break_add(BreakSpec {
                proc: Some("::foo".into()),
                hit_spec: Some("==3".into()),
                ..Default::default()
            })
            .unwrap();

        for _ in 0..2 {
            let outcome = engine.on_proc_enter("::foo", &objv(&["::foo"])).await.unwrap();
            assert_eq!(outcome, DispatchOutcome::Continue);
        }
        let outcome = engine.on_proc_enter("::foo", &objv(&["::foo"])).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Paused);
    }

    #[tokio::test]
    async fn oneshot_proc_breakpoint_is_removed_after_publication() {
        let host = Arc::new(FakeHost::new());
        host.resume_notify().notify_one();
        let mut engine = Engine::new(host.clone());
        engine.start().unwrap();
        let id = engine
            .break_add(BreakSpec {
                proc: Some("::foo".into()),
                oneshot: true,
                ..Default::default()
            })
            .unwrap();

        let outcome = engine.on_proc_enter("::foo", &objv(&["::foo"])).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Paused);
        assert!(host.published(crate::engine::VAR_STOPPED).is_some());
        assert!(engine.break_ls().iter().all(|bp| bp.id != id));
    }

    #[tokio::test]
    async fn log_only_breakpoint_never_publishes_a_stop_event() {
        let host = Arc::new(FakeHost::new());
        let mut engine = Engine::new(host.clone());
        engine.start().unwrap();
        engine
            .break_add(BreakSpec {
                proc: Some("::foo".into()),
                log_message: Some("entered foo".into()),
                oneshot: true,
                ..Default::default()
            })
            .unwrap();

        let outcome = engine.on_proc_enter("::foo", &objv(&["::foo"])).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Continue);
        assert!(host.published(crate::engine::VAR_STOPPED).is_none());
        assert_eq!(host.stdout(), vec!["entered foo".to_string()], "log message reaches stdout, not just a log sink");
        assert!(engine.break_ls().is_empty(), "oneshot log breakpoint removed after logging");
    }

    #[tokio::test]
    async fn method_breakpoint_matches_glob_pattern_and_selector() {
        let host = Arc::new(FakeHost::new());
        host.resume_notify().notify_one();
        let mut engine = Engine::new(host.clone());
        engine.start().unwrap();
        engine
            .break_add(BreakSpec {
                method: Some(("::widgets::*".into(), "render".into())),
                ..Default::default()
            })
            .unwrap();

        let token = CommandToken(1);
        let outcome = engine
            .on_command(&token, &objv(&["::widgets::Button1", "render"]))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Paused);

        let mut engine2 = Engine::new(host.clone());
        engine2.start().unwrap();
        engine2
            .break_add(BreakSpec {
                method: Some(("::widgets::*".into(), "render".into())),
                ..Default::default()
            })
            .unwrap();
        let outcome2 = engine2
            .on_command(&token, &objv(&["::widgets::Button1", "resize"]))
            .await
            .unwrap();
        assert_eq!(outcome2, DispatchOutcome::Continue);
    }

    #[tokio::test]
    async fn paused_dispatcher_short_circuits() {
        let host = Arc::new(FakeHost::new());
        let mut engine = Engine::new(host.clone());
        engine.start().unwrap();
        engine
            .break_add(BreakSpec { proc: Some("::foo".into()), ..Default::default() })
            .unwrap();
        engine.is_paused = true;

        let token = CommandToken(1);
        let outcome = engine.on_command(&token, &objv(&["::foo"])).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Continue);
        assert_eq!(engine.stats().trace_hits, 1, "trace_hits still counts the call itself");
    }
}