pub mod api_types;
pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod graph;
pub mod node;
pub mod reasoning;

pub use config::AppConfig;
pub use document::RawDocument;
pub use error::{ClauseGraphError, Result};
pub use extraction::ExtractedFacts;
pub use graph::GraphProjection;
pub use node::{
    ClauseNode, ConditionNode, Edge, EdgeType, Node, NodeKind, ObligationNode, RightNode,
};
pub use reasoning::{Anomaly, AnomalyAnalyzer, AnomalySource, AnomalyType, ReviewRequest, Severity};
