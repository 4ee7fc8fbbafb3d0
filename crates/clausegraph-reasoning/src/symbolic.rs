use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use clausegraph_core::node::{ConditionNode, EdgeType, Node, NodeKind, ObligationNode, RightNode};
use clausegraph_core::reasoning::{Anomaly, AnomalyType, Severity};
use clausegraph_graph::ContractGraph;

static NEGATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnot\s+").expect("valid negation regex"));

/// Token overlap above which two actions count as the same undertaking.
const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Run every structural check against `graph`.
///
/// Results are concatenated in a fixed detector order: circular dependencies,
/// contradictory obligations, orphaned obligations, dangling conditions,
/// missing reciprocity, unmatched references. The graph is never modified, so
/// repeated runs over the same graph yield identical output.
pub fn analyze(graph: &ContractGraph) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    anomalies.extend(circular_dependencies(graph));
    anomalies.extend(contradictory_obligations(graph));
    anomalies.extend(orphaned_obligations(graph));
    anomalies.extend(dangling_conditions(graph));
    anomalies.extend(missing_reciprocity(graph));
    anomalies.extend(unmatched_references(graph));

    tracing::debug!(
        nodes = graph.node_count(),
        anomalies = anomalies.len(),
        "Symbolic analysis complete"
    );

    anomalies
}

// --- Detectors ---

fn circular_dependencies(graph: &ContractGraph) -> Vec<Anomaly> {
    graph
        .cycle_detect()
        .into_iter()
        .map(|cycle| {
            let lines = node_lines(graph, &cycle);
            Anomaly::symbolic(
                AnomalyType::CircularDependency,
                Severity::Critical,
                format!("Circular dependency detected: {}", cycle.join(" -> ")),
                cycle,
                lines,
            )
        })
        .collect()
}

fn contradictory_obligations(graph: &ContractGraph) -> Vec<Anomaly> {
    let obligations: Vec<&ObligationNode> = obligations(graph).collect();
    let mut anomalies = Vec::new();

    for (i, first) in obligations.iter().enumerate() {
        for second in &obligations[i + 1..] {
            if first.party.to_lowercase() != second.party.to_lowercase() {
                continue;
            }

            let action_a = first.action.to_lowercase();
            let action_b = second.action.to_lowercase();
            let negated_a = action_a.contains("not ");
            let negated_b = action_b.contains("not ");
            if negated_a == negated_b {
                continue;
            }

            let stripped_a = NEGATION.replace_all(&action_a, "");
            let stripped_b = NEGATION.replace_all(&action_b, "");
            if jaccard(&stripped_a, &stripped_b) <= SIMILARITY_THRESHOLD {
                continue;
            }

            let involved = vec![first.id.clone(), second.id.clone()];
            let lines = node_lines(graph, &involved);
            anomalies.push(Anomaly::symbolic(
                AnomalyType::ContradictoryObligations,
                Severity::Critical,
                format!(
                    "{} has contradictory obligations: '{}' vs '{}'",
                    first.party, first.action, second.action
                ),
                involved,
                lines,
            ));
        }
    }

    anomalies
}

fn orphaned_obligations(graph: &ContractGraph) -> Vec<Anomaly> {
    obligations(graph)
        .filter(|obligation| obligation.party.trim().is_empty())
        .map(|obligation| {
            Anomaly::symbolic(
                AnomalyType::OrphanedObligation,
                Severity::High,
                format!("Obligation '{}' has no associated party", obligation.action),
                vec![obligation.id.clone()],
                obligation.line.into_iter().collect(),
            )
        })
        .collect()
}

fn dangling_conditions(graph: &ContractGraph) -> Vec<Anomaly> {
    conditions(graph)
        .filter(|condition| {
            let used = graph
                .outgoing(&condition.id)
                .any(|edge| edge.edge_type != EdgeType::DerivedFrom);
            let depended_on = graph
                .incoming(&condition.id)
                .any(|edge| edge.edge_type == EdgeType::DependsOn);
            !used && !depended_on
        })
        .map(|condition| {
            Anomaly::symbolic(
                AnomalyType::DanglingCondition,
                Severity::Medium,
                format!(
                    "Condition '{}' is defined but never referenced by any obligation or right",
                    condition.trigger
                ),
                vec![condition.id.clone()],
                condition.line.into_iter().collect(),
            )
        })
        .collect()
}

fn missing_reciprocity(graph: &ContractGraph) -> Vec<Anomaly> {
    let entitled: HashSet<String> = graph
        .nodes_of_kind(NodeKind::Right)
        .filter_map(Node::as_right)
        .map(|right: &RightNode| right.party.to_lowercase())
        .collect();

    // Lowercased party, grouped in first-seen order. A blank party is a
    // group of its own.
    let mut obligated: Vec<(String, Vec<&ObligationNode>)> = Vec::new();
    for obligation in obligations(graph) {
        let key = obligation.party.to_lowercase();
        match obligated.iter_mut().find(|(k, _)| *k == key) {
            Some((_, list)) => list.push(obligation),
            None => obligated.push((key, vec![obligation])),
        }
    }

    obligated
        .into_iter()
        .filter(|(party, _)| !entitled.contains(party))
        .map(|(party, list)| {
            let involved: Vec<String> = list.iter().map(|o| o.id.clone()).collect();
            let lines = node_lines(graph, &involved);
            Anomaly::symbolic(
                AnomalyType::MissingReciprocity,
                Severity::Medium,
                format!("Party '{party}' has obligations but no corresponding rights"),
                involved,
                lines,
            )
        })
        .collect()
}

fn unmatched_references(graph: &ContractGraph) -> Vec<Anomaly> {
    let clause_ids: Vec<&str> = graph.nodes_of_kind(NodeKind::Clause).map(Node::id).collect();
    let mut anomalies = Vec::new();

    for condition in conditions(graph) {
        for reference in &condition.referenced_clauses {
            if clause_ids.iter().any(|id| id.contains(reference.as_str())) {
                continue;
            }
            anomalies.push(Anomaly::symbolic(
                AnomalyType::UnmatchedReference,
                Severity::High,
                format!(
                    "Condition '{}' references clause '{}' which does not exist",
                    condition.trigger, reference
                ),
                vec![condition.id.clone()],
                condition.line.into_iter().collect(),
            ));
        }
    }

    anomalies
}

// --- Helpers ---

fn obligations(graph: &ContractGraph) -> impl Iterator<Item = &ObligationNode> + '_ {
    graph
        .nodes_of_kind(NodeKind::Obligation)
        .filter_map(Node::as_obligation)
}

fn conditions(graph: &ContractGraph) -> impl Iterator<Item = &ConditionNode> + '_ {
    graph
        .nodes_of_kind(NodeKind::Condition)
        .filter_map(Node::as_condition)
}

/// Ascending, deduplicated source lines of the given nodes.
fn node_lines(graph: &ContractGraph, ids: &[String]) -> Vec<u32> {
    let mut lines: Vec<u32> = ids
        .iter()
        .filter_map(|id| graph.find_node(id).and_then(Node::line))
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Jaccard similarity of the whitespace token sets of `a` and `b`.
fn jaccard(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}
