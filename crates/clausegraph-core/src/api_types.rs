use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::GraphProjection;
use crate::reasoning::{Anomaly, Severity};

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ai_review_enabled: bool,
}

// --- Analysis ---

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default = "default_source_name")]
    pub source_name: String,
    pub text: String,
    #[serde(default = "default_ai_review")]
    pub ai_review: bool,
}

fn default_source_name() -> String {
    "request.txt".to_string()
}

fn default_ai_review() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub source_file: String,
    pub clause_count: usize,
    pub party_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeveritySummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
}

impl SeveritySummary {
    pub fn from_anomalies(anomalies: &[Anomaly]) -> Self {
        let mut by_severity = BTreeMap::new();
        for anomaly in anomalies {
            *by_severity.entry(anomaly.severity).or_insert(0) += 1;
        }
        Self {
            total: anomalies.len(),
            by_severity,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub metadata: ReportMetadata,
    pub parties: Vec<String>,
    pub graph: GraphProjection,
    pub anomalies: Vec<Anomaly>,
    pub summary: SeveritySummary,
}

impl AnalysisReport {
    pub fn new(
        metadata: ReportMetadata,
        parties: Vec<String>,
        graph: GraphProjection,
        anomalies: Vec<Anomaly>,
    ) -> Self {
        let summary = SeveritySummary::from_anomalies(&anomalies);
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            metadata,
            parties,
            graph,
            anomalies,
            summary,
        }
    }
}
