use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;

use super::{RunRecord, RunTracer};
use crate::config::TracingConfig;
use crate::error::ConfigurationError;

const RUN_NAME: &str = "QueryPipeline";
const PROVIDER: &str = "google_genai";

/// Posts runs to a LangSmith-compatible `/runs` endpoint.
///
/// Every upload is bounded by the configured timeout.
pub struct LangSmithTracer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    project: String,
}

impl LangSmithTracer {
    pub fn new(config: &TracingConfig) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigurationError::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            project: config.project.clone(),
        })
    }

    fn payload(&self, run: &RunRecord) -> Result<Value> {
        let outputs = run.output.as_ref().map(|text| json!({ "output": text }));
        Ok(json!({
            "id": run.id,
            "name": RUN_NAME,
            "run_type": "llm",
            "inputs": { "messages": run.messages },
            "outputs": outputs,
            "error": run.error,
            "start_time": run.start_time.format(&Rfc3339)?,
            "end_time": run.end_time.format(&Rfc3339)?,
            "session_name": self.project,
            "extra": {
                "metadata": {
                    "ls_provider": PROVIDER,
                    "ls_model_name": run.model,
                }
            }
        }))
    }
}

#[async_trait]
impl RunTracer for LangSmithTracer {
    async fn record(&self, run: &RunRecord) -> Result<()> {
        let body = self.payload(run)?;
        let resp = self
            .client
            .post(format!("{}/runs", self.endpoint))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to reach tracing endpoint")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("tracing API error ({}): {}", status, text);
        }
        Ok(())
    }
}
