//! Scripted completion service for offline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use specguard::ai::{AIError, CompletionService, ModelInfo};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order and records every prompt.
pub struct ScriptedService {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    stateful: bool,
}

impl ScriptedService {
    pub fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            stateful: false,
        }
    }

    pub fn stateful(mut self) -> Self {
        self.stateful = true;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str) -> Result<String, AIError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AIError::InvalidResponse("no scripted response left".to_string()))
    }

    fn is_stateful(&self) -> bool {
        self.stateful
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "scripted".to_string(),
            model_name: "scripted".to_string(),
            is_local: true,
            context_window: 0,
            supports_json: true,
        }
    }
}

pub fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
