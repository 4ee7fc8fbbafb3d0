use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::GraphProjection;

/// Ordinal classification; `Critical` compares greatest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Report order, most severe first.
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySource {
    Symbolic,
    Ai,
}

/// Defect classes. The first six come from the symbolic detectors, the rest
/// from learned-model review; unrecognised labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnomalyType {
    CircularDependency,
    ContradictoryObligations,
    OrphanedObligation,
    DanglingCondition,
    MissingReciprocity,
    UnmatchedReference,
    AmbiguousLanguage,
    IndustryStandardGap,
    AsymmetricTerms,
    InconsistentDefinitions,
    HiddenImplications,
    Other(String),
}

impl AnomalyType {
    pub fn as_str(&self) -> &str {
        match self {
            AnomalyType::CircularDependency => "circular_dependency",
            AnomalyType::ContradictoryObligations => "contradictory_obligations",
            AnomalyType::OrphanedObligation => "orphaned_obligation",
            AnomalyType::DanglingCondition => "dangling_condition",
            AnomalyType::MissingReciprocity => "missing_reciprocity",
            AnomalyType::UnmatchedReference => "unmatched_reference",
            AnomalyType::AmbiguousLanguage => "ambiguous_language",
            AnomalyType::IndustryStandardGap => "industry_standard_gap",
            AnomalyType::AsymmetricTerms => "asymmetric_terms",
            AnomalyType::InconsistentDefinitions => "inconsistent_definitions",
            AnomalyType::HiddenImplications => "hidden_implications",
            AnomalyType::Other(label) => label,
        }
    }
}

impl From<String> for AnomalyType {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "circular_dependency" => AnomalyType::CircularDependency,
            "contradictory_obligations" => AnomalyType::ContradictoryObligations,
            "orphaned_obligation" => AnomalyType::OrphanedObligation,
            "dangling_condition" => AnomalyType::DanglingCondition,
            "missing_reciprocity" => AnomalyType::MissingReciprocity,
            "unmatched_reference" => AnomalyType::UnmatchedReference,
            "ambiguous_language" => AnomalyType::AmbiguousLanguage,
            "industry_standard_gap" => AnomalyType::IndustryStandardGap,
            "asymmetric_terms" => AnomalyType::AsymmetricTerms,
            "inconsistent_definitions" => AnomalyType::InconsistentDefinitions,
            "hidden_implications" => AnomalyType::HiddenImplications,
            _ => AnomalyType::Other(s),
        }
    }
}

impl From<AnomalyType> for String {
    fn from(t: AnomalyType) -> Self {
        match t {
            AnomalyType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub description: String,
    pub involved_nodes: Vec<String>,
    /// Ascending, deduplicated source lines of the involved nodes.
    #[serde(default)]
    pub lines: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub source: AnomalySource,
}

impl Anomaly {
    pub fn symbolic(
        anomaly_type: AnomalyType,
        severity: Severity,
        description: impl Into<String>,
        involved_nodes: Vec<String>,
        lines: Vec<u32>,
    ) -> Self {
        Self {
            anomaly_type,
            severity,
            description: description.into(),
            involved_nodes,
            lines,
            recommendation: None,
            source: AnomalySource::Symbolic,
        }
    }
}

/// Everything a secondary reviewer sees: the projected graph, the document
/// text and what the symbolic pass already reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub graph: GraphProjection,
    pub original_text: String,
    pub symbolic_anomalies: Vec<Anomaly>,
}

/// A reviewer that contributes anomalies beyond the structural checks.
///
/// Implementations must turn unusable responses into an empty list; only
/// transport-level failures are returned as errors.
#[async_trait]
pub trait AnomalyAnalyzer: Send + Sync {
    fn name(&self) -> &str;
    async fn review(&self, request: &ReviewRequest) -> Result<Vec<Anomaly>>;
}
