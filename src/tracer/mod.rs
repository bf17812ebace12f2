//! Per-call run records sent to a tracing service.
//!
//! A tracer sees every call the pipeline makes, successful or not. Its own
//! failures are the caller's to log; they never change an answer.

pub mod langsmith;

use anyhow::Result;
use async_trait::async_trait;
use rand::RngExt;
use time::OffsetDateTime;

use crate::prompts::PromptMessage;

/// One model call, as seen from outside.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: String,
    pub model: String,
    pub messages: Vec<PromptMessage>,
    /// Exactly one of `output` and `error` is set.
    pub output: Option<String>,
    pub error: Option<String>,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
}

#[async_trait]
pub trait RunTracer: Send + Sync {
    async fn record(&self, run: &RunRecord) -> Result<()>;
}

/// Discards every record.
pub struct NoopTracer;

#[async_trait]
impl RunTracer for NoopTracer {
    async fn record(&self, _run: &RunRecord) -> Result<()> {
        Ok(())
    }
}

/// Random (version 4) UUID in hyphenated form.
pub fn new_run_id() -> String {
    let mut rng = rand::rng();
    let mut bytes: [u8; 16] = rng.random();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
