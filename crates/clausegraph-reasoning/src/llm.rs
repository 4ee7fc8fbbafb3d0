use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use clausegraph_core::config::AppConfig;
use clausegraph_core::error::{ClauseGraphError, Result};
use clausegraph_core::reasoning::{
    Anomaly, AnomalyAnalyzer, AnomalySource, AnomalyType, ReviewRequest, Severity,
};

// ---------------------------------------------------------------------------
// Anthropic Messages API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// Reply schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReviewOutput {
    #[serde(default)]
    anomalies: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ReviewedAnomaly {
    #[serde(rename = "type")]
    anomaly_type: String,
    severity: String,
    description: String,
    #[serde(default)]
    involved_clauses: Vec<String>,
    #[serde(default)]
    lines: Vec<u32>,
    #[serde(default)]
    recommendation: Option<String>,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = r#"You are a contract analysis expert. You will receive:
1. A contract's text
2. A graph representing the contract's clauses, obligations, rights and conditions
3. Anomalies already detected by a rule-based checker

Find ADDITIONAL anomalies that rule-based analysis cannot catch:
- Ambiguous language: vague terms without definition ("reasonable", "timely", "best efforts")
- Industry-standard gaps: missing clauses typical for the contract type (force majeure, indemnification, governing law, dispute resolution)
- Asymmetric terms: unfairly one-sided provisions
- Inconsistent definitions: same term used differently across clauses
- Hidden implications: combinations of clauses that create unintended consequences

Respond with JSON only, in exactly this format:
{
  "anomalies": [
    {
      "type": "ambiguous_language|industry_standard_gap|asymmetric_terms|inconsistent_definitions|hidden_implications",
      "severity": "low|medium|high|critical",
      "description": "Clear explanation of the anomaly",
      "involved_clauses": ["node identifiers"],
      "lines": [1],
      "recommendation": "How to fix it"
    }
  ]
}

Do NOT repeat anomalies already found by the rule-based checker."#;

// ---------------------------------------------------------------------------
// LlmAnomalyAnalyzer
// ---------------------------------------------------------------------------

/// Secondary review of a contract graph through the Anthropic Messages API.
pub struct LlmAnomalyAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmAnomalyAnalyzer {
    pub fn new(config: &AppConfig) -> Result<Self> {
        if !config.ai_review_enabled() {
            return Err(ClauseGraphError::Config(
                "ANTHROPIC_API_KEY is required for AI review".into(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.anthropic_api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn call_llm(&self, prompt: String) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".into(),
                content: prompt,
            }],
        };

        debug!(model = %self.model, "sending review request to Anthropic API");

        let resp = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ClauseGraphError::Analyzer(format!("HTTP request to Anthropic failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".into());
            return Err(ClauseGraphError::Analyzer(format!(
                "Anthropic API returned {status}: {body}"
            )));
        }

        let api_resp: AnthropicResponse = resp.json().await.map_err(|e| {
            ClauseGraphError::Analyzer(format!("failed to parse Anthropic response: {e}"))
        })?;

        let text = api_resp
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        debug!(
            stop_reason = ?api_resp.stop_reason,
            response_len = text.len(),
            "received Anthropic API response"
        );

        Ok(text)
    }

    fn build_prompt(request: &ReviewRequest) -> Result<String> {
        let graph = serde_json::to_string_pretty(&request.graph)?;
        let already_found = if request.symbolic_anomalies.is_empty() {
            "None".to_string()
        } else {
            serde_json::to_string_pretty(&request.symbolic_anomalies)?
        };

        Ok(format!(
            "## Contract Text\n\n{}\n\n\
             ## Contract Graph Structure\n\n```json\n{graph}\n```\n\n\
             ## Already Detected Anomalies (rule-based)\n\n{already_found}\n\n\
             Please analyze this contract and return any additional anomalies you find.",
            request.original_text
        ))
    }

    /// Turn a model reply into anomalies.
    ///
    /// Markdown fences around the JSON are tolerated. Entries missing a
    /// required field or carrying an unknown severity are skipped; a reply
    /// that is not JSON at all yields an empty list.
    fn parse_response(raw: &str) -> Vec<Anomaly> {
        let cleaned = raw.trim();
        let cleaned = if cleaned.starts_with("```") {
            let start = cleaned.find('{').unwrap_or(0);
            let end = cleaned.rfind('}').map(|i| i + 1).unwrap_or(cleaned.len());
            cleaned.get(start..end).unwrap_or(cleaned)
        } else {
            cleaned
        };

        let output: ReviewOutput = match serde_json::from_str(cleaned) {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Discarding unparseable review response");
                return Vec::new();
            }
        };

        output
            .anomalies
            .into_iter()
            .filter_map(|value| {
                let entry: ReviewedAnomaly = match serde_json::from_value(value) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed review entry");
                        return None;
                    }
                };
                let Some(severity) = Severity::parse(&entry.severity) else {
                    warn!(severity = %entry.severity, "Skipping review entry with unknown severity");
                    return None;
                };

                let mut lines = entry.lines;
                lines.sort_unstable();
                lines.dedup();

                Some(Anomaly {
                    anomaly_type: AnomalyType::from(entry.anomaly_type),
                    severity,
                    description: entry.description,
                    involved_nodes: entry.involved_clauses,
                    lines,
                    recommendation: entry.recommendation.filter(|r| !r.trim().is_empty()),
                    source: AnomalySource::Ai,
                })
            })
            .collect()
    }
}

#[async_trait]
impl AnomalyAnalyzer for LlmAnomalyAnalyzer {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn review(&self, request: &ReviewRequest) -> Result<Vec<Anomaly>> {
        info!(
            nodes = request.graph.nodes.len(),
            symbolic = request.symbolic_anomalies.len(),
            "Starting AI review"
        );

        let prompt = Self::build_prompt(request)?;
        let raw = self.call_llm(prompt).await?;
        let anomalies = Self::parse_response(&raw);

        info!(anomalies = anomalies.len(), "AI review complete");
        Ok(anomalies)
    }
}
