//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, TextProvider};

/// A recorded `complete` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Behavior for one call.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String),
    Fail,
}

/// Replies from a queue; once the queue is drained it repeats `fallback`.
pub struct ScriptedProvider {
    name: String,
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    fn with(name: &str, queue: Vec<Scripted>, fallback: Scripted) -> Self {
        Self {
            name: name.to_string(),
            queue: Mutex::new(queue.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `text`.
    pub fn replying(name: &str, text: impl Into<String>) -> Self {
        Self::with(name, vec![], Scripted::Reply(text.into()))
    }

    /// Always fails.
    pub fn failing(name: &str) -> Self {
        Self::with(name, vec![], Scripted::Fail)
    }

    /// Plays `script` in order, then fails.
    pub fn sequence(name: &str, script: Vec<Scripted>) -> Self {
        Self::with(name, script, Scripted::Fail)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            user: user.to_string(),
            max_tokens,
            temperature,
        });
        let next = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Scripted::Reply(text) => Ok(text),
            Scripted::Fail => Err(LlmError::Api {
                status: 503,
                message: format!("{} unavailable", self.name),
            }),
        }
    }
}
