use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Completion, TextModel};
use crate::error::RemoteCallError;
use crate::prompts::Prompt;

/// A scripted model for tests. Returns pre-defined results in order and
/// remembers every prompt it was given.
pub struct MockModel {
    replies: Mutex<VecDeque<Result<Completion, RemoteCallError>>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl MockModel {
    pub fn new(replies: Vec<Result<Completion, RemoteCallError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model that answers every call in `texts` order.
    pub fn answering(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(Completion::text(*t))).collect())
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextModel for MockModel {
    fn model_id(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Completion, RemoteCallError> {
        let n = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.clone());
            prompts.len()
        };
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(RemoteCallError::Malformed(format!(
                "MockModel: no more replies (called {n} times)"
            )))
        })
    }
}
