//! Scripted inference backend for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{BackendError, InferenceBackend};

/// Replays canned responses in order and records every call
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<String>>,
    probe_ok: bool,
    probes: Mutex<usize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            probe_ok: true,
            probes: Mutex::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose connectivity probe always fails
    pub fn offline() -> Self {
        Self {
            probe_ok: false,
            ..Self::new(&[])
        }
    }

    pub fn probes(&self) -> usize {
        *self.probes.lock().unwrap()
    }

    pub fn completions(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn probe(&self) -> Result<(), BackendError> {
        *self.probes.lock().unwrap() += 1;
        if self.probe_ok {
            Ok(())
        } else {
            Err(BackendError::Unreachable {
                url: "http://localhost:11434".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BackendError::Transport("no scripted response left".to_string()))
    }
}
