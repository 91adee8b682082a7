// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Pause/resume rendezvous: publish a stop event, then cooperatively
//! suspend until the host signals resume.

use log::error;

use crate::engine::{Engine, VAR_LAST_STOP, VAR_RESUME, VAR_STOPPED};
use crate::event::StopEvent;

impl Engine {
    /// Publish `event` as both `stopped` and `last_stop`. Does not pause;
    /// callers that want to block afterward call [`Engine::enter_pause`]
    /// separately (this is what [`Engine::pause_now`] relies on to avoid
    /// blocking).
    pub fn stop_event(&mut self, event: StopEvent) {
        let value = event.to_value();
        self.last_stop_event = Some(event);
        self.host.publish_global(VAR_STOPPED, &value);
        self.host.publish_global(VAR_LAST_STOP, &value);
    }

    /// Suspend until the host resumes execution. Re-entrancy-guarded: a
    /// nested call while already paused is a no-op. A failed wait is reported
    /// via `Host::background_error` rather than propagated, so a broken host
    /// wait primitive never poisons the debuggee.
    pub async fn enter_pause(&mut self) -> anyhow::Result<()> {
        if self.is_paused {
            return Ok(());
        }
        self.is_paused = true;
        if let Err(err) = self.host.wait_for_resume().await {
            error!("resume wait failed: {err:#}");
            self.host.background_error(err);
        }
        self.host.unset_global(VAR_RESUME);
        self.is_paused = false;
        Ok(())
    }
}
