use petgraph::graph::NodeIndex;
use petgraph::visit::{depth_first_search, DfsEvent};
use petgraph::Direction;

use clausegraph_core::node::Node;

use crate::store::ContractGraph;

impl ContractGraph {
    /// Every elementary cycle reached by depth-first traversal.
    ///
    /// Traversal starts from each unvisited node in insertion order. When an
    /// edge leads back to a node on the current recursion path, the path
    /// suffix from that node plus the node itself is recorded, so a two-node
    /// loop comes out as `[a, b, a]`. Cycles sharing nodes are not merged.
    pub fn cycle_detect(&self) -> Vec<Vec<String>> {
        let n = self.graph.node_count();
        let mut visited = vec![false; n];
        let mut on_path = vec![false; n];
        let mut path = Vec::new();
        let mut cycles = Vec::new();

        for start in self.graph.node_indices() {
            if !visited[start.index()] {
                self.cycle_dfs(start, &mut visited, &mut on_path, &mut path, &mut cycles);
            }
        }

        cycles.into_iter().map(|cycle| self.ids(&cycle)).collect()
    }

    fn cycle_dfs(
        &self,
        node: NodeIndex,
        visited: &mut [bool],
        on_path: &mut [bool],
        path: &mut Vec<NodeIndex>,
        cycles: &mut Vec<Vec<NodeIndex>>,
    ) {
        visited[node.index()] = true;
        on_path[node.index()] = true;
        path.push(node);

        for (_, next) in self.ordered_edges(node, Direction::Outgoing) {
            if !visited[next.index()] {
                self.cycle_dfs(next, visited, on_path, path, cycles);
            } else if on_path[next.index()] {
                if let Some(start) = path.iter().position(|&p| p == next) {
                    let mut cycle = path[start..].to_vec();
                    cycle.push(next);
                    cycles.push(cycle);
                }
            }
        }

        path.pop();
        on_path[node.index()] = false;
    }

    /// Reverse depth-first postorder over all nodes, roots tried in
    /// insertion order.
    ///
    /// On a cyclic graph this still returns a total order, but nodes inside a
    /// cycle are not guaranteed to respect edge direction.
    pub fn topological_sort(&self) -> Vec<&Node> {
        let mut finished = Vec::with_capacity(self.graph.node_count());
        depth_first_search(&self.graph, self.graph.node_indices(), |event| {
            if let DfsEvent::Finish(node, _) = event {
                finished.push(node);
            }
        });

        finished.iter().rev().map(|&idx| &self.graph[idx]).collect()
    }

    /// All simple paths from `from` to `to`, as node id lists.
    ///
    /// Worst-case exponential in the number of branching routes between the
    /// endpoints. Only call this on small graphs. Parallel edges yield
    /// repeated paths. Unknown endpoints yield no paths.
    pub fn find_paths(&self, from: &str, to: &str) -> Vec<Vec<String>> {
        let (Some(&start), Some(&target)) = (self.node_map.get(from), self.node_map.get(to))
        else {
            return Vec::new();
        };

        let mut on_path = vec![false; self.graph.node_count()];
        let mut path = Vec::new();
        let mut paths = Vec::new();
        self.paths_dfs(start, target, &mut on_path, &mut path, &mut paths);

        paths.into_iter().map(|p| self.ids(&p)).collect()
    }

    fn paths_dfs(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        on_path: &mut [bool],
        path: &mut Vec<NodeIndex>,
        paths: &mut Vec<Vec<NodeIndex>>,
    ) {
        path.push(current);
        on_path[current.index()] = true;

        if current == target {
            paths.push(path.clone());
        } else {
            for (_, next) in self.ordered_edges(current, Direction::Outgoing) {
                if !on_path[next.index()] {
                    self.paths_dfs(next, target, on_path, path, paths);
                }
            }
        }

        path.pop();
        on_path[current.index()] = false;
    }

    fn ids(&self, nodes: &[NodeIndex]) -> Vec<String> {
        nodes
            .iter()
            .map(|&idx| self.graph[idx].id().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clausegraph_core::node::{ClauseNode, ConditionNode, EdgeType, ObligationNode};

    use crate::store::{ContractGraph, GraphBuilder};

    fn chain_graph(extra_shortcut: bool) -> ContractGraph {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(ClauseNode::new("c1", "Definitions", "Terms defined here.", 1, None))
            .unwrap();
        builder
            .add_node(ClauseNode::new("c2", "Obligations", "Seller shall deliver.", 1, None))
            .unwrap();
        builder
            .add_node(ObligationNode::new("obl1", "Seller", "deliver goods"))
            .unwrap();
        builder.add_edge("c1", "c2", EdgeType::References).unwrap();
        builder.add_edge("c2", "obl1", EdgeType::DerivedFrom).unwrap();
        if extra_shortcut {
            builder.add_edge("c1", "obl1", EdgeType::DerivedFrom).unwrap();
        }
        builder.build()
    }

    fn two_condition_loop() -> ContractGraph {
        let mut builder = GraphBuilder::new();
        builder.add_node(ConditionNode::new("cond1", "if A", "then B")).unwrap();
        builder.add_node(ConditionNode::new("cond2", "if B", "then A")).unwrap();
        builder.add_edge("cond1", "cond2", EdgeType::DependsOn).unwrap();
        builder.add_edge("cond2", "cond1", EdgeType::DependsOn).unwrap();
        builder.build()
    }

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|x| x == id).unwrap()
    }

    #[test]
    fn test_cycle_detect_empty_on_acyclic_graph() {
        assert!(chain_graph(true).cycle_detect().is_empty());
    }

    #[test]
    fn test_cycle_detect_two_node_loop() {
        let cycles = two_condition_loop().cycle_detect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["cond1", "cond2", "cond1"]);
    }

    #[test]
    fn test_cycle_detect_self_loop() {
        let mut builder = GraphBuilder::new();
        builder.add_node(ConditionNode::new("cond1", "if A", "then A")).unwrap();
        builder.add_edge("cond1", "cond1", EdgeType::DependsOn).unwrap();

        let cycles = builder.build().cycle_detect();
        assert_eq!(cycles, vec![vec!["cond1".to_string(), "cond1".to_string()]]);
    }

    #[test]
    fn test_cycle_detect_reports_overlapping_cycles() {
        // a -> b -> a and a -> b -> c -> a share the a/b segment.
        let mut builder = GraphBuilder::new();
        for id in ["a", "b", "c"] {
            builder.add_node(ClauseNode::new(id, id, "", 1, None)).unwrap();
        }
        builder.add_edge("a", "b", EdgeType::DependsOn).unwrap();
        builder.add_edge("b", "a", EdgeType::DependsOn).unwrap();
        builder.add_edge("b", "c", EdgeType::DependsOn).unwrap();
        builder.add_edge("c", "a", EdgeType::DependsOn).unwrap();

        let cycles = builder.build().cycle_detect();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0], vec!["a", "b", "a"]);
        assert_eq!(cycles[1], vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_topological_sort_respects_edges() {
        let graph = chain_graph(false);
        let order: Vec<String> = graph
            .topological_sort()
            .iter()
            .map(|n| n.id().to_string())
            .collect();

        assert_eq!(order.len(), 3);
        assert!(position(&order, "c1") < position(&order, "c2"));
        assert!(position(&order, "c2") < position(&order, "obl1"));
    }

    #[test]
    fn test_topological_sort_diamond() {
        let mut builder = GraphBuilder::new();
        for id in ["d", "b", "a", "c"] {
            builder.add_node(ClauseNode::new(id, id, "", 1, None)).unwrap();
        }
        builder.add_edge("a", "b", EdgeType::DependsOn).unwrap();
        builder.add_edge("a", "c", EdgeType::DependsOn).unwrap();
        builder.add_edge("b", "d", EdgeType::DependsOn).unwrap();
        builder.add_edge("c", "d", EdgeType::DependsOn).unwrap();
        let graph = builder.build();

        let order: Vec<String> = graph
            .topological_sort()
            .iter()
            .map(|n| n.id().to_string())
            .collect();
        assert_eq!(order.len(), 4);
        for (from, to) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
            assert!(position(&order, from) < position(&order, to), "{from} before {to}");
        }
        assert_eq!(graph.topological_sort().len(), order.len());
    }

    #[test]
    fn test_topological_sort_terminates_on_cycles() {
        let graph = two_condition_loop();
        let order = graph.topological_sort();
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_find_paths_enumerates_both_routes() {
        let paths = chain_graph(true).find_paths("c1", "obl1");
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&vec!["c1".to_string(), "c2".to_string(), "obl1".to_string()]));
        assert!(paths.contains(&vec!["c1".to_string(), "obl1".to_string()]));
    }

    #[test]
    fn test_find_paths_repeats_parallel_edges() {
        let mut builder = GraphBuilder::new();
        builder.add_node(ClauseNode::new("c1", "A", "", 1, None)).unwrap();
        builder.add_node(ClauseNode::new("c2", "B", "", 1, None)).unwrap();
        builder.add_edge("c1", "c2", EdgeType::References).unwrap();
        builder.add_edge("c1", "c2", EdgeType::DependsOn).unwrap();

        let paths = builder.build().find_paths("c1", "c2");
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p == &vec!["c1".to_string(), "c2".to_string()]));
    }

    #[test]
    fn test_find_paths_skips_nodes_on_path() {
        let paths = two_condition_loop().find_paths("cond1", "cond2");
        assert_eq!(paths, vec![vec!["cond1".to_string(), "cond2".to_string()]]);
    }

    #[test]
    fn test_find_paths_unknown_endpoint() {
        assert!(chain_graph(true).find_paths("c1", "missing").is_empty());
        assert!(chain_graph(true).find_paths("obl1", "c1").is_empty());
    }
}
