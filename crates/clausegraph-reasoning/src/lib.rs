//! Anomaly detection over an assembled contract graph.
//!
//! [`symbolic`] runs the deterministic structural checks, [`llm`] asks a
//! learned model for anything the rules cannot see, and [`pipeline`] drives a
//! document through extraction and both passes into a report.

pub mod llm;
pub mod pipeline;
pub mod symbolic;

pub use llm::LlmAnomalyAnalyzer;
pub use pipeline::{CompiledContract, ContractPipeline};
pub use symbolic::analyze;
