use std::collections::VecDeque;

use crate::config::NodeAlign;

use super::LayoutError;
use super::graph::GraphModel;

/// Column assignment for every node of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub column: Vec<usize>,
    pub max_column: usize,
}

impl Columns {
    /// Node indices grouped by column, each group in node order.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.max_column + 1];
        for (idx, &column) in self.column.iter().enumerate() {
            groups[column].push(idx);
        }
        groups
    }
}

pub(super) fn assign_columns(model: &GraphModel, align: NodeAlign) -> Result<Columns, LayoutError> {
    let topo = topological_order(model)?;
    let depth = longest_path_from_sources(model, &topo);
    let max_column = depth.iter().copied().max().unwrap_or(0);

    let column = match align {
        NodeAlign::Left => depth,
        NodeAlign::Right => {
            let height = longest_path_to_sinks(model, &topo);
            height.iter().map(|h| max_column - h).collect()
        }
        NodeAlign::Justify => model
            .nodes
            .iter()
            .zip(&depth)
            .map(|(node, &d)| if node.outgoing.is_empty() { max_column } else { d })
            .collect(),
        NodeAlign::Center => model
            .nodes
            .iter()
            .zip(&depth)
            .map(|(node, &d)| {
                if !node.incoming.is_empty() || node.outgoing.is_empty() {
                    return d;
                }
                let consumers: Vec<usize> = node
                    .outgoing
                    .iter()
                    .map(|&link| depth[model.links[link].target])
                    .collect();
                let sum: usize = consumers.iter().sum();
                let mean_floor = sum / consumers.len();
                // Consumers sit at depth >= 1, so both terms stay non-negative.
                let nearest = consumers.iter().copied().min().unwrap_or(1);
                mean_floor.min(nearest).saturating_sub(1)
            })
            .collect(),
    };

    let max_column = column.iter().copied().max().unwrap_or(0);
    Ok(Columns { column, max_column })
}

/// Kahn's algorithm seeded in node order.
fn topological_order(model: &GraphModel) -> Result<Vec<usize>, LayoutError> {
    let node_count = model.nodes.len();
    let mut indegree: Vec<usize> = model.nodes.iter().map(|n| n.incoming.len()).collect();
    let mut queue: VecDeque<usize> = indegree
        .iter()
        .enumerate()
        .filter_map(|(idx, deg)| (*deg == 0).then_some(idx))
        .collect();
    let mut topo = Vec::with_capacity(node_count);
    while let Some(node_idx) = queue.pop_front() {
        topo.push(node_idx);
        for &link_idx in &model.nodes[node_idx].outgoing {
            let to_idx = model.links[link_idx].target;
            indegree[to_idx] -= 1;
            if indegree[to_idx] == 0 {
                queue.push_back(to_idx);
            }
        }
    }

    if topo.len() < node_count {
        // Kahn leaves cycles and everything downstream of them; only nodes
        // that can reach themselves are reported.
        let stuck: Vec<bool> = indegree.iter().map(|deg| *deg > 0).collect();
        let nodes = (0..node_count)
            .filter(|&idx| stuck[idx] && reaches_itself(model, idx, &stuck))
            .map(|idx| model.nodes[idx].id.clone())
            .collect();
        return Err(LayoutError::CycleDetected { nodes });
    }
    Ok(topo)
}

fn reaches_itself(model: &GraphModel, start: usize, allowed: &[bool]) -> bool {
    let mut seen = vec![false; model.nodes.len()];
    let mut queue = VecDeque::from([start]);
    while let Some(node_idx) = queue.pop_front() {
        for &link_idx in &model.nodes[node_idx].outgoing {
            let to_idx = model.links[link_idx].target;
            if to_idx == start {
                return true;
            }
            if allowed[to_idx] && !seen[to_idx] {
                seen[to_idx] = true;
                queue.push_back(to_idx);
            }
        }
    }
    false
}

fn longest_path_from_sources(model: &GraphModel, topo: &[usize]) -> Vec<usize> {
    let mut depth = vec![0usize; model.nodes.len()];
    for &node_idx in topo {
        for &link_idx in &model.nodes[node_idx].outgoing {
            let to_idx = model.links[link_idx].target;
            depth[to_idx] = depth[to_idx].max(depth[node_idx] + 1);
        }
    }
    depth
}

fn longest_path_to_sinks(model: &GraphModel, topo: &[usize]) -> Vec<usize> {
    let mut height = vec![0usize; model.nodes.len()];
    for &node_idx in topo.iter().rev() {
        for &link_idx in &model.nodes[node_idx].outgoing {
            let to_idx = model.links[link_idx].target;
            height[node_idx] = height[node_idx].max(height[to_idx] + 1);
        }
    }
    height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::GraphSpec;

    fn model(links: &[(&str, &str)]) -> GraphModel {
        let mut spec = GraphSpec::new();
        for (from, to) in links {
            spec.add_link(from, to, 1.0);
        }
        GraphModel::from_spec(&spec).unwrap()
    }

    fn column_of(model: &GraphModel, columns: &Columns, id: &str) -> usize {
        let idx = model.nodes.iter().position(|n| n.id == id).unwrap();
        columns.column[idx]
    }

    fn assert_links_point_forward(model: &GraphModel, columns: &Columns) {
        for link in &model.links {
            assert!(
                columns.column[link.source] < columns.column[link.target],
                "{} -> {}",
                model.nodes[link.source].id,
                model.nodes[link.target].id
            );
        }
    }

    // A feeds both a long chain and directly into its tail; S is a second
    // short source joining at the end; T is a short sink off A.
    fn uneven() -> GraphModel {
        model(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
            ("A", "D"),
            ("S", "D"),
            ("A", "T"),
        ])
    }

    #[test]
    fn left_uses_longest_path_depth() {
        let m = uneven();
        let columns = assign_columns(&m, NodeAlign::Left).unwrap();
        assert_eq!(columns.max_column, 3);
        assert_eq!(column_of(&m, &columns, "A"), 0);
        assert_eq!(column_of(&m, &columns, "S"), 0);
        assert_eq!(column_of(&m, &columns, "D"), 3);
        assert_eq!(column_of(&m, &columns, "T"), 1);
        assert_links_point_forward(&m, &columns);
    }

    #[test]
    fn right_aligns_sinks_to_last_column() {
        let m = uneven();
        let columns = assign_columns(&m, NodeAlign::Right).unwrap();
        assert_eq!(column_of(&m, &columns, "T"), 3);
        assert_eq!(column_of(&m, &columns, "S"), 2);
        assert_eq!(column_of(&m, &columns, "A"), 0);
        assert_links_point_forward(&m, &columns);
    }

    #[test]
    fn justify_moves_only_sinks() {
        let m = uneven();
        let columns = assign_columns(&m, NodeAlign::Justify).unwrap();
        assert_eq!(column_of(&m, &columns, "T"), 3);
        assert_eq!(column_of(&m, &columns, "S"), 0);
        assert_eq!(column_of(&m, &columns, "C"), 2);
        assert_links_point_forward(&m, &columns);
    }

    #[test]
    fn center_pulls_lone_sources_inward() {
        let m = uneven();
        let columns = assign_columns(&m, NodeAlign::Center).unwrap();
        assert_eq!(column_of(&m, &columns, "S"), 2);
        // B and T consume A from column 1, so A cannot move.
        assert_eq!(column_of(&m, &columns, "A"), 0);
        assert_links_point_forward(&m, &columns);
    }

    #[test]
    fn center_rounds_mean_down() {
        let m = model(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
            ("D", "E"),
            ("S", "D"),
            ("S", "E"),
        ]);
        let columns = assign_columns(&m, NodeAlign::Center).unwrap();
        // Consumers at 3 and 4: floor(3.5) - 1 = 2.
        assert_eq!(column_of(&m, &columns, "S"), 2);
        assert_links_point_forward(&m, &columns);
    }

    #[test]
    fn isolated_nodes_stay_in_first_column() {
        let mut spec = GraphSpec::new();
        spec.add_node("E", None, None);
        let m = GraphModel::from_spec(&spec).unwrap();
        for align in [NodeAlign::Left, NodeAlign::Right, NodeAlign::Center] {
            let columns = assign_columns(&m, align).unwrap();
            assert_eq!(columns.column, vec![0]);
            assert_eq!(columns.max_column, 0);
        }
    }

    #[test]
    fn detects_cycles() {
        let m = model(&[("A", "B"), ("B", "A"), ("X", "A")]);
        let err = assign_columns(&m, NodeAlign::Left).unwrap_err();
        assert_eq!(
            err,
            LayoutError::CycleDetected {
                nodes: vec!["A".to_string(), "B".to_string()]
            }
        );

        let m = model(&[("A", "A")]);
        assert!(matches!(
            assign_columns(&m, NodeAlign::Left),
            Err(LayoutError::CycleDetected { .. })
        ));
    }

    #[test]
    fn nodes_downstream_of_a_cycle_are_not_reported() {
        let m = model(&[("A", "B"), ("B", "A"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "D")]);
        let err = assign_columns(&m, NodeAlign::Left).unwrap_err();
        assert_eq!(
            err,
            LayoutError::CycleDetected {
                nodes: ["A", "B", "D", "E"].map(String::from).to_vec()
            }
        );
        assert_eq!(err.to_string(), "graph contains a cycle through: A, B, D, E");
    }

    #[test]
    fn groups_follow_node_order() {
        let m = model(&[("A", "C"), ("B", "C")]);
        let columns = assign_columns(&m, NodeAlign::Left).unwrap();
        assert_eq!(columns.groups(), vec![vec![0, 2], vec![1]]);
    }
}
