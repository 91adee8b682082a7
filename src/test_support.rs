// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A fake [`Host`] implementation shared across this crate's `#[cfg(test)]`
//! modules, grounded in the same `tokio::sync::Notify`-backed cooperative
//! wait pattern as `onefuzz/src/utils.rs::CheckNotify`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::event::{CommandToken, Frame};
use crate::host::{Host, TraceToken};

pub struct FakeHost {
    published: Mutex<HashMap<String, serde_json::Value>>,
    unset: Mutex<Vec<String>>,
    condition_result: Mutex<bool>,
    resume_notify: Arc<Notify>,
    next_trace_token: Mutex<u64>,
    stdout: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(HashMap::new()),
            unset: Mutex::new(Vec::new()),
            condition_result: Mutex::new(true),
            resume_notify: Arc::new(Notify::new()),
            next_trace_token: Mutex::new(1),
            stdout: Mutex::new(Vec::new()),
        }
    }

    pub fn published(&self, name: &str) -> Option<serde_json::Value> {
        self.published.lock().unwrap().get(name).cloned()
    }

    pub fn unset_globals(&self) -> Vec<String> {
        self.unset.lock().unwrap().clone()
    }

    pub fn set_condition_result(&self, value: bool) {
        *self.condition_result.lock().unwrap() = value;
    }

    pub fn resume_notify(&self) -> Arc<Notify> {
        self.resume_notify.clone()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.stdout.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for FakeHost {
    fn resolve_command_name(&self, _token: &CommandToken) -> Option<String> {
        None
    }

    fn normalize_path(&self, path: &str) -> String {
        path.to_string()
    }

    fn paths_equal(&self, a: &str, b: &str) -> bool {
        a == b
    }

    fn frame_info(&self) -> anyhow::Result<Frame> {
        Ok(Frame {
            kind: "command".to_string(),
            file: String::new(),
            line: 1,
            proc: String::new(),
            cmd: Vec::new(),
            level: Some(0),
        })
    }

    fn current_call_depth(&self) -> i64 {
        0
    }

    fn eval_at_level(&self, _level: i64, _expr: &str) -> anyhow::Result<bool> {
        Ok(*self.condition_result.lock().unwrap())
    }

    fn subst_at_level(&self, _level: i64, template: &str) -> anyhow::Result<String> {
        Ok(template.to_string())
    }

    fn set_cmd_var(&self, _level: i64, _cmd: &[String]) -> anyhow::Result<()> {
        Ok(())
    }

    fn locals(&self) -> anyhow::Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }

    fn proc_args(&self, _proc_name: &str) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn get_var(&self, _name: &str) -> Option<String> {
        None
    }

    fn install_trace(&self, _allow_inline: bool) -> anyhow::Result<TraceToken> {
        let mut next = self.next_trace_token.lock().unwrap();
        let token = TraceToken(*next);
        *next += 1;
        Ok(token)
    }

    fn remove_trace(&self, _token: TraceToken) {}

    fn ensure_exec_traces(&self) {}

    fn publish_global(&self, name: &str, value: &serde_json::Value) {
        self.published.lock().unwrap().insert(name.to_string(), value.clone());
    }

    fn unset_global(&self, name: &str) {
        self.unset.lock().unwrap().push(name.to_string());
        self.published.lock().unwrap().remove(name);
    }

    fn emit_output(&self, text: &str) {
        self.stdout.lock().unwrap().push(text.to_string());
    }

    fn background_error(&self, _err: anyhow::Error) {}

    async fn wait_for_resume(&self) -> anyhow::Result<()> {
        self.resume_notify.notified().await;
        Ok(())
    }
}