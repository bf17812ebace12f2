use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;

use augur::model::mock::MockModel;
use augur::model::{Completion, TokenUsage};
use augur::prompts::{PromptMessage, Role, SYSTEM_INSTRUCTION};
use augur::tracer::{RunRecord, RunTracer};
use augur::{Config, ConfigurationError, QueryPipeline, RemoteCallError, Settings};

/// Keeps every run it is handed.
#[derive(Default)]
struct RecordingTracer {
    runs: Mutex<Vec<RunRecord>>,
}

#[async_trait]
impl RunTracer for RecordingTracer {
    async fn record(&self, run: &RunRecord) -> Result<()> {
        self.runs.lock().unwrap().push(run.clone());
        Ok(())
    }
}

struct FailingTracer;

#[async_trait]
impl RunTracer for FailingTracer {
    async fn record(&self, _run: &RunRecord) -> Result<()> {
        bail!("tracing endpoint unreachable")
    }
}

fn pipeline(model: &Arc<MockModel>) -> QueryPipeline {
    QueryPipeline::with_model(model.clone())
}

fn expected_messages(question: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage {
            role: Role::System,
            content: SYSTEM_INSTRUCTION.to_string(),
        },
        PromptMessage {
            role: Role::User,
            content: question.to_string(),
        },
    ]
}

#[tokio::test]
async fn one_request_with_system_then_user() {
    let model = Arc::new(MockModel::answering(&["Paris."]));
    let answer = pipeline(&model)
        .answer("What is the capital of France?")
        .await
        .unwrap();

    assert_eq!(answer, "Paris.");
    assert_eq!(model.call_count(), 1);
    assert_eq!(
        model.prompts()[0].messages(),
        expected_messages("What is the capital of France?").as_slice()
    );
}

#[tokio::test]
async fn empty_question_still_calls_the_model() {
    let model = Arc::new(MockModel::answering(&["How can I help?"]));
    let answer = pipeline(&model).answer("").await.unwrap();

    assert_eq!(answer, "How can I help?");
    assert_eq!(model.call_count(), 1);
    assert_eq!(model.prompts()[0].question(), "");
}

#[tokio::test]
async fn completion_returned_verbatim() {
    let raw = "  **Paris**\n\n- capital of France  \n";
    let model = Arc::new(MockModel::new(vec![Ok(Completion {
        text: raw.to_string(),
        usage: Some(TokenUsage {
            input_tokens: 20,
            output_tokens: 8,
        }),
    })]));

    let answer = pipeline(&model).answer("capital?").await.unwrap();
    assert_eq!(answer, raw);
}

#[tokio::test]
async fn remote_error_surfaces_without_retry() {
    let model = Arc::new(MockModel::new(vec![
        Err(RemoteCallError::Api {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        }),
        Ok(Completion::text("should never be reached")),
    ]));

    let err = pipeline(&model).answer("anything").await.unwrap_err();

    assert!(matches!(err, RemoteCallError::Api { status: 429, .. }));
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn calls_are_independent() {
    let model = Arc::new(MockModel::answering(&["one", "two"]));
    let pipeline = pipeline(&model);

    assert_eq!(pipeline.answer("first").await.unwrap(), "one");
    assert_eq!(pipeline.answer("second").await.unwrap(), "two");

    let prompts = model.prompts();
    assert_eq!(prompts[1].messages(), expected_messages("second").as_slice());
}

#[tokio::test]
async fn tracer_sees_successful_run() {
    let model = Arc::new(MockModel::answering(&["Paris."]));
    let tracer = Arc::new(RecordingTracer::default());
    let pipeline = pipeline(&model).with_tracer(tracer.clone());

    pipeline.answer("capital of France?").await.unwrap();
    pipeline.flush(Duration::from_secs(1)).await;

    let runs = tracer.runs.lock().unwrap();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert_eq!(run.model, "mock");
    assert_eq!(run.messages, expected_messages("capital of France?"));
    assert_eq!(run.output.as_deref(), Some("Paris."));
    assert!(run.error.is_none());
    assert!(run.end_time >= run.start_time);
}

#[tokio::test]
async fn tracer_sees_failed_run() {
    let model = Arc::new(MockModel::new(vec![Err(RemoteCallError::Malformed(
        "no candidates".to_string(),
    ))]));
    let tracer = Arc::new(RecordingTracer::default());
    let pipeline = pipeline(&model).with_tracer(tracer.clone());

    assert!(pipeline.answer("q").await.is_err());
    pipeline.flush(Duration::from_secs(1)).await;

    let runs = tracer.runs.lock().unwrap();
    assert_eq!(runs.len(), 1);
    assert!(runs[0].output.is_none());
    assert_eq!(
        runs[0].error.as_deref(),
        Some("malformed response: no candidates")
    );
}

#[tokio::test]
async fn tracer_failure_does_not_change_answer() {
    let model = Arc::new(MockModel::answering(&["still here"]));
    let pipeline = pipeline(&model).with_tracer(Arc::new(FailingTracer));

    assert_eq!(pipeline.answer("q").await.unwrap(), "still here");
    pipeline.flush(Duration::from_secs(1)).await;
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn whitespace_around_question_is_sent_as_typed() {
    let model = Arc::new(MockModel::answering(&["ok"]));
    pipeline(&model).answer("  spaced question \t").await.unwrap();
    assert_eq!(model.prompts()[0].question(), "  spaced question \t");
}

#[tokio::test]
async fn flush_with_nothing_pending_returns() {
    let model = Arc::new(MockModel::answering(&[]));
    pipeline(&model).flush(Duration::from_millis(10)).await;
}

#[test]
fn missing_credentials_fail_before_any_pipeline_exists() {
    let err = Config::load(Settings::default(), |_| None).unwrap_err();
    assert!(matches!(err, ConfigurationError::Missing(_)));
}

#[test]
fn pipeline_builds_from_complete_config() {
    let config = Config::load(Settings::default(), |name| Some(format!("{name}-value"))).unwrap();
    let pipeline = QueryPipeline::new(&config).unwrap();
    assert_eq!(pipeline.model_id(), augur::consts::DEFAULT_MODEL);
}
