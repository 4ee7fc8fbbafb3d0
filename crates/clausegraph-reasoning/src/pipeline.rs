use std::sync::Arc;

use tracing::{info, instrument, warn};

use clausegraph_core::api_types::{AnalysisReport, ReportMetadata};
use clausegraph_core::config::AppConfig;
use clausegraph_core::document::RawDocument;
use clausegraph_core::error::Result;
use clausegraph_core::node::ClauseNode;
use clausegraph_core::reasoning::{Anomaly, AnomalyAnalyzer, ReviewRequest};
use clausegraph_extraction::{assemble_graph, extract_parties, segment_clauses, FactExtractor};
use clausegraph_graph::ContractGraph;

use crate::llm::LlmAnomalyAnalyzer;
use crate::symbolic;

/// Output of the synchronous stages: everything up to and including the
/// symbolic pass.
#[derive(Debug)]
pub struct CompiledContract {
    pub clauses: Vec<ClauseNode>,
    pub parties: Vec<String>,
    pub graph: ContractGraph,
    pub anomalies: Vec<Anomaly>,
}

/// Document in, report out.
///
/// Segmentation, fact extraction, assembly and the symbolic pass run inline;
/// the optional reviewer is awaited last. A reviewer failure is logged and
/// the report carries the symbolic anomalies only.
#[derive(Clone, Default)]
pub struct ContractPipeline {
    extractor: FactExtractor,
    analyzer: Option<Arc<dyn AnomalyAnalyzer>>,
}

impl ContractPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with AI review attached when `config` carries an API key.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let pipeline = Self::new();
        if !config.ai_review_enabled() {
            info!("No ANTHROPIC_API_KEY configured; AI review disabled");
            return Ok(pipeline);
        }
        Ok(pipeline.with_analyzer(Arc::new(LlmAnomalyAnalyzer::new(config)?)))
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn AnomalyAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn without_analyzer(mut self) -> Self {
        self.analyzer = None;
        self
    }

    pub fn with_extractor(mut self, extractor: FactExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn has_analyzer(&self) -> bool {
        self.analyzer.is_some()
    }

    pub fn compile(&self, document: &RawDocument) -> Result<CompiledContract> {
        let clauses = segment_clauses(&document.content);
        let parties = extract_parties(&document.content);
        let facts = self.extractor.extract(&clauses);
        if facts.is_empty() {
            warn!(source = %document.source, "No obligations, rights or conditions recognised");
        }
        let graph = assemble_graph(&clauses, facts)?;
        let anomalies = symbolic::analyze(&graph);

        info!(
            source = %document.source,
            lines = document.line_count(),
            clauses = clauses.len(),
            parties = parties.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            anomalies = anomalies.len(),
            "Compiled contract"
        );

        Ok(CompiledContract {
            clauses,
            parties,
            graph,
            anomalies,
        })
    }

    #[instrument(skip(self, document), fields(source = %document.source))]
    pub async fn run(&self, document: &RawDocument) -> Result<AnalysisReport> {
        let compiled = self.compile(document)?;
        let projection = compiled.graph.to_projection();
        let mut anomalies = compiled.anomalies;

        if let Some(analyzer) = &self.analyzer {
            let request = ReviewRequest {
                graph: projection.clone(),
                original_text: document.content.clone(),
                symbolic_anomalies: anomalies.clone(),
            };
            match analyzer.review(&request).await {
                Ok(reviewed) => {
                    info!(analyzer = analyzer.name(), added = reviewed.len(), "Review merged");
                    anomalies.extend(reviewed);
                }
                Err(e) => {
                    warn!(
                        analyzer = analyzer.name(),
                        error = %e,
                        "Review failed; reporting symbolic anomalies only"
                    );
                }
            }
        }

        let metadata = ReportMetadata {
            source_file: document.source.clone(),
            clause_count: compiled.clauses.len(),
            party_count: compiled.parties.len(),
        };

        Ok(AnalysisReport::new(
            metadata,
            compiled.parties,
            projection,
            anomalies,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clausegraph_core::error::ClauseGraphError;
    use clausegraph_core::reasoning::{AnomalySource, AnomalyType, Severity};

    const LEASE: &str = "1. Rent\n\
The Tenant shall pay rent within 5 days of the due date.\n\
2. Repairs\n\
The Landlord shall repair the roof.\n\
The Landlord may enter the premises.\n\
3. Default\n\
If rent is unpaid under Section 9, the Landlord may terminate.\n";

    struct FixedReviewer(Vec<Anomaly>);

    #[async_trait]
    impl AnomalyAnalyzer for FixedReviewer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn review(&self, _request: &ReviewRequest) -> Result<Vec<Anomaly>> {
            Ok(self.0.clone())
        }
    }

    struct FailingReviewer;

    #[async_trait]
    impl AnomalyAnalyzer for FailingReviewer {
        fn name(&self) -> &str {
            "failing"
        }

        async fn review(&self, _request: &ReviewRequest) -> Result<Vec<Anomaly>> {
            Err(ClauseGraphError::Analyzer("connection reset".into()))
        }
    }

    fn ai_finding() -> Anomaly {
        Anomaly {
            anomaly_type: AnomalyType::IndustryStandardGap,
            severity: Severity::Low,
            description: "No governing law clause".into(),
            involved_nodes: Vec::new(),
            lines: Vec::new(),
            recommendation: Some("Add a governing law clause".into()),
            source: AnomalySource::Ai,
        }
    }

    #[test]
    fn test_compile_runs_symbolic_pass() {
        let compiled = ContractPipeline::new()
            .compile(&RawDocument::new("lease.txt", LEASE))
            .unwrap();

        assert_eq!(compiled.clauses.len(), 3);
        assert_eq!(compiled.parties, vec!["Landlord", "Tenant"]);

        let kinds: Vec<&AnomalyType> = compiled.anomalies.iter().map(|a| &a.anomaly_type).collect();
        assert!(kinds.contains(&&AnomalyType::MissingReciprocity));
        assert!(kinds.contains(&&AnomalyType::UnmatchedReference));
        assert!(kinds.contains(&&AnomalyType::DanglingCondition));
    }

    #[tokio::test]
    async fn test_run_without_analyzer() {
        let report = ContractPipeline::new()
            .run(&RawDocument::new("lease.txt", LEASE))
            .await
            .unwrap();

        assert_eq!(report.metadata.source_file, "lease.txt");
        assert_eq!(report.metadata.clause_count, 3);
        assert_eq!(report.metadata.party_count, 2);
        assert_eq!(report.summary.total, report.anomalies.len());
        assert!(report
            .anomalies
            .iter()
            .all(|a| a.source == AnomalySource::Symbolic));
    }

    #[tokio::test]
    async fn test_run_appends_review_after_symbolic() {
        let pipeline =
            ContractPipeline::new().with_analyzer(Arc::new(FixedReviewer(vec![ai_finding()])));
        let report = pipeline
            .run(&RawDocument::new("lease.txt", LEASE))
            .await
            .unwrap();

        let last = report.anomalies.last().unwrap();
        assert_eq!(last.source, AnomalySource::Ai);
        assert_eq!(report.summary.count(Severity::Low), 1);
    }

    #[tokio::test]
    async fn test_review_failure_keeps_symbolic_results() {
        let document = RawDocument::new("lease.txt", LEASE);
        let baseline = ContractPipeline::new().compile(&document).unwrap().anomalies;

        let report = ContractPipeline::new()
            .with_analyzer(Arc::new(FailingReviewer))
            .run(&document)
            .await
            .unwrap();
        assert_eq!(report.anomalies, baseline);
    }

    #[test]
    fn test_from_config_without_key_disables_review() {
        let pipeline = ContractPipeline::from_config(&AppConfig::default()).unwrap();
        assert!(!pipeline.has_analyzer());
    }
}
