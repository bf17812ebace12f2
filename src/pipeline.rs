//! The single-turn query pipeline: prompt, one model call, plain text back.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::Config;
use crate::consts::format_number;
use crate::error::{ConfigurationError, RemoteCallError};
use crate::model::TextModel;
use crate::model::gemini::GeminiModel;
use crate::prompts::{Prompt, Query};
use crate::tracer::langsmith::LangSmithTracer;
use crate::tracer::{NoopTracer, RunRecord, RunTracer, new_run_id};

/// Every `answer` does the same thing. The only thing carried between calls
/// is the set of run uploads still in flight.
pub struct QueryPipeline {
    model: Arc<dyn TextModel>,
    tracer: Arc<dyn RunTracer>,
    uploads: Mutex<JoinSet<()>>,
}

impl QueryPipeline {
    /// Gemini for completions, LangSmith for run records.
    pub fn new(config: &Config) -> Result<Self, ConfigurationError> {
        let model = GeminiModel::new(&config.model)?;
        let tracer = LangSmithTracer::new(&config.tracing)?;
        Ok(Self::with_model(Arc::new(model)).with_tracer(Arc::new(tracer)))
    }

    /// A pipeline over any model, recording nothing.
    pub fn with_model(model: Arc<dyn TextModel>) -> Self {
        Self {
            model,
            tracer: Arc::new(NoopTracer),
            uploads: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn RunTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Ask `question` and return the model's completion exactly as received.
    ///
    /// An empty question is sent like any other. Errors from the model are
    /// returned as-is after a single attempt. The run record is uploaded in
    /// the background and never delays the result.
    pub async fn answer(&self, question: &str) -> Result<String, RemoteCallError> {
        let prompt = Prompt::for_query(&Query::new(question));

        let start_time = OffsetDateTime::now_utc();
        let result = self.model.complete(&prompt).await;
        let end_time = OffsetDateTime::now_utc();

        self.spawn_upload(RunRecord {
            id: new_run_id(),
            model: self.model.model_id().to_string(),
            messages: prompt.messages().to_vec(),
            output: result.as_ref().ok().map(|c| c.text.clone()),
            error: result.as_ref().err().map(|e| e.to_string()),
            start_time,
            end_time,
        });

        let completion = result?;
        if let Some(usage) = completion.usage {
            debug!(
                "tokens: {} input + {} output = {}",
                format_number(usage.input_tokens),
                format_number(usage.output_tokens),
                format_number(usage.total()),
            );
        }
        Ok(completion.text)
    }

    /// Wait up to `within` for run uploads still in flight; abandon the rest.
    pub async fn flush(&self, within: Duration) {
        let mut uploads = std::mem::take(&mut *self.uploads.lock().unwrap());
        if uploads.is_empty() {
            return;
        }

        if tokio::time::timeout(within, uploads.join_all()).await.is_err() {
            warn!("gave up waiting for run uploads after {:?}", within);
        }
    }

    fn spawn_upload(&self, run: RunRecord) {
        let tracer = Arc::clone(&self.tracer);
        let mut uploads = self.uploads.lock().unwrap();
        // Reap finished uploads so a long session doesn't accumulate them
        while uploads.try_join_next().is_some() {}
        uploads.spawn(async move {
            if let Err(e) = tracer.record(&run).await {
                warn!(run_id = %run.id, "failed to record run: {e:#}");
            }
        });
    }
}
