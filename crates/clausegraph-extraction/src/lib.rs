//! From document text to an assembled contract graph.
//!
//! - [`ingest`] reads plain-text and PDF source documents.
//! - [`segment`] splits text into hierarchical clauses.
//! - [`facts`] derives obligation, right and condition nodes from clauses.
//! - [`parties`] holds the closed role-noun list and the party roster.
//! - [`assemble`] joins clauses and facts into a [`ContractGraph`].
//!
//! [`ContractGraph`]: clausegraph_graph::ContractGraph

pub mod assemble;
pub mod facts;
pub mod ingest;
pub mod parties;
pub mod segment;

pub use assemble::assemble_graph;
pub use facts::{
    clause_references, extract_facts, Anchor, FactCategory, FactExtractor, FactMatch, FactRule,
};
pub use ingest::{load_document, pdf_text};
pub use parties::{detect_target_party, extract_parties, ROLE_NOUNS};
pub use segment::segment_clauses;
