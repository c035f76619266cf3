use std::collections::HashMap;

use crate::ir::GraphSpec;

use super::LayoutError;

#[derive(Debug, Clone)]
pub struct ModelNode {
    pub id: String,
    pub label: String,
    pub color: Option<String>,
    /// Created from a link endpoint rather than declared.
    pub implicit: bool,
    pub incoming: Vec<usize>,
    pub outgoing: Vec<usize>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ModelLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Validated node/link arena. Nodes and links refer to each other by index.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    pub nodes: Vec<ModelNode>,
    pub links: Vec<ModelLink>,
}

impl GraphModel {
    pub fn from_spec(spec: &GraphSpec) -> Result<Self, LayoutError> {
        let mut nodes: Vec<ModelNode> = Vec::with_capacity(spec.nodes.len());
        let mut id_to_idx: HashMap<String, usize> = HashMap::new();

        for node in &spec.nodes {
            if id_to_idx.contains_key(&node.id) {
                return Err(LayoutError::DuplicateNodeId {
                    id: node.id.clone(),
                });
            }
            id_to_idx.insert(node.id.clone(), nodes.len());
            nodes.push(ModelNode {
                id: node.id.clone(),
                label: node.label.clone().unwrap_or_else(|| node.id.clone()),
                color: node.color.clone(),
                implicit: false,
                incoming: Vec::new(),
                outgoing: Vec::new(),
                value: 0.0,
            });
        }

        let mut links = Vec::with_capacity(spec.links.len());
        for link in &spec.links {
            if !(link.value.is_finite() && link.value > 0.0) {
                return Err(LayoutError::InvalidValue {
                    from: link.source.clone(),
                    to: link.target.clone(),
                    value: link.value,
                });
            }
            let source = ensure_node(&mut nodes, &mut id_to_idx, &link.source);
            let target = ensure_node(&mut nodes, &mut id_to_idx, &link.target);
            let link_idx = links.len();
            links.push(ModelLink {
                source,
                target,
                value: link.value,
            });
            nodes[source].outgoing.push(link_idx);
            nodes[target].incoming.push(link_idx);
        }

        for node in &mut nodes {
            let input: f64 = node.incoming.iter().map(|&idx| links[idx].value).sum();
            let output: f64 = node.outgoing.iter().map(|&idx| links[idx].value).sum();
            node.value = input.max(output);
        }

        Ok(Self { nodes, links })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn ensure_node(
    nodes: &mut Vec<ModelNode>,
    id_to_idx: &mut HashMap<String, usize>,
    id: &str,
) -> usize {
    if let Some(&idx) = id_to_idx.get(id) {
        return idx;
    }
    let idx = nodes.len();
    id_to_idx.insert(id.to_string(), idx);
    nodes.push(ModelNode {
        id: id.to_string(),
        label: id.to_string(),
        color: None,
        implicit: true,
        incoming: Vec::new(),
        outgoing: Vec::new(),
        value: 0.0,
    });
    idx
}
