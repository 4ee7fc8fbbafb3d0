use std::collections::HashSet;

use regex::RegexBuilder;

use clausegraph_core::error::Result;
use clausegraph_core::extraction::ExtractedFacts;
use clausegraph_core::node::{ClauseNode, EdgeType};
use clausegraph_graph::{ContractGraph, GraphBuilder};

use crate::facts::clause_references;

/// Join clauses and extracted facts into one frozen graph.
///
/// Clause nodes are inserted first in document order, then fact nodes, then
/// the extractor's edges. Finally a `references` edge is added from a clause
/// to every other clause its body cites, either by title
/// ("see Section Payment") or by section number ("see Section 4.2"). At most
/// one reference edge is added per ordered clause pair.
pub fn assemble_graph(clauses: &[ClauseNode], facts: ExtractedFacts) -> Result<ContractGraph> {
    let mut builder = GraphBuilder::new();

    for clause in clauses {
        builder.add_node(clause.clone())?;
    }
    for node in facts.nodes {
        builder.add_node(node)?;
    }
    for edge in facts.edges {
        builder.insert_edge(edge)?;
    }

    let references = cross_references(clauses);
    let reference_count = references.len();
    for (from, to) in references {
        builder.add_edge(from, to, EdgeType::References)?;
    }

    tracing::debug!(
        nodes = builder.node_count(),
        edges = builder.edge_count(),
        references = reference_count,
        "Assembled contract graph"
    );

    Ok(builder.build())
}

fn cross_references(clauses: &[ClauseNode]) -> Vec<(&str, &str)> {
    let title_patterns: Vec<Option<regex::Regex>> = clauses
        .iter()
        .map(|clause| {
            let title = clause.title.trim();
            if title.is_empty() {
                return None;
            }
            RegexBuilder::new(&format!(r"(?:clause|section)\s+{}", regex::escape(title)))
                .case_insensitive(true)
                .build()
                .ok()
        })
        .collect();

    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for clause in clauses {
        let cited_numbers = clause_references(&clause.body);

        for (other, title_pattern) in clauses.iter().zip(&title_patterns) {
            if clause.id == other.id {
                continue;
            }

            let by_title = title_pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(&clause.body));
            let by_number = section_number(other)
                .is_some_and(|number| cited_numbers.iter().any(|cited| cited == number));

            if (by_title || by_number) && seen.insert((clause.id.as_str(), other.id.as_str())) {
                pairs.push((clause.id.as_str(), other.id.as_str()));
            }
        }
    }

    pairs
}

/// Numeric part of a clause label; "Article 3" yields "3".
fn section_number(clause: &ClauseNode) -> Option<&str> {
    let number = clause.number.as_deref()?.trim();
    let stripped = number
        .get(..8)
        .filter(|prefix| prefix.eq_ignore_ascii_case("article "))
        .map_or(number, |_| number[8..].trim());
    Some(stripped).filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::extract_facts;
    use crate::segment::segment_clauses;
    use clausegraph_core::error::ClauseGraphError;
    use clausegraph_core::node::{Edge, NodeKind, ObligationNode};

    const AGREEMENT: &str = "1. Delivery\n\
The Seller shall deliver the goods within 30 days.\n\
2. Payment\n\
The Buyer shall pay the price. See Section Delivery for timing.\n\
3. Remedies\n\
If delivery fails under Section 1, the Buyer may terminate.\n";

    #[test]
    fn test_assembles_clauses_facts_and_references() {
        let clauses = segment_clauses(AGREEMENT);
        let facts = extract_facts(&clauses);
        let fact_count = facts.nodes.len();
        let graph = assemble_graph(&clauses, facts).unwrap();

        assert_eq!(graph.node_count(), clauses.len() + fact_count);
        assert_eq!(graph.nodes_of_kind(NodeKind::Clause).count(), 3);

        let references: Vec<&Edge> = graph
            .edges()
            .filter(|e| e.edge_type == EdgeType::References)
            .collect();
        assert_eq!(references.len(), 2);
        assert!(references.contains(&&Edge::new("clause_2", "clause_1", EdgeType::References)));
        assert!(references.contains(&&Edge::new("clause_3", "clause_1", EdgeType::References)));
    }

    #[test]
    fn test_one_reference_edge_per_pair() {
        let clauses = vec![
            ClauseNode::new("clause_1", "Scope", "Scope of work.", 1, None).with_number("1"),
            ClauseNode::new(
                "clause_2",
                "Fees",
                "Per Section Scope and section 1, fees apply.",
                1,
                None,
            )
            .with_number("2"),
        ];
        let graph = assemble_graph(&clauses, ExtractedFacts::default()).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_article_numbers_are_matched_without_prefix() {
        let clauses = vec![
            ClauseNode::new("clause_1", "Scope", "", 1, None).with_number("Article 3"),
            ClauseNode::new("clause_2", "Fees", "As stated in article 3.", 1, None)
                .with_number("Article 4"),
        ];
        let graph = assemble_graph(&clauses, ExtractedFacts::default()).unwrap();
        let edges: Vec<&Edge> = graph.edges().collect();
        assert_eq!(
            edges,
            vec![&Edge::new("clause_2", "clause_1", EdgeType::References)]
        );
    }

    #[test]
    fn test_duplicate_fact_id_fails() {
        let clauses = vec![ClauseNode::new("clause_1", "A", "", 1, None)];
        let facts = ExtractedFacts {
            nodes: vec![
                ObligationNode::new("obl_1", "Seller", "ship").into(),
                ObligationNode::new("obl_1", "Buyer", "pay").into(),
            ],
            edges: Vec::new(),
        };
        let err = assemble_graph(&clauses, facts).unwrap_err();
        assert!(matches!(err, ClauseGraphError::DuplicateNode(id) if id == "obl_1"));
    }

    #[test]
    fn test_dangling_fact_edge_fails() {
        let facts = ExtractedFacts {
            nodes: Vec::new(),
            edges: vec![Edge::new("clause_9", "obl_1", EdgeType::DerivedFrom)],
        };
        let err = assemble_graph(&[], facts).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
