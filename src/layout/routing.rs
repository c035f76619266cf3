use super::graph::GraphModel;

/// Attachment geometry for every link plus the per-node link order.
#[derive(Debug, Clone, Default)]
pub(super) struct RoutedLinks {
    pub width: Vec<f64>,
    /// Band centre on the source face.
    pub y0: Vec<f64>,
    /// Band centre on the target face.
    pub y1: Vec<f64>,
    pub incoming: Vec<Vec<usize>>,
    pub outgoing: Vec<Vec<usize>>,
}

pub(super) fn route_links(model: &GraphModel, extents: &[(f64, f64)], ky: f64) -> RoutedLinks {
    let width: Vec<f64> = model.links.iter().map(|link| link.value * ky).collect();
    let mut y0 = vec![0.0; model.links.len()];
    let mut y1 = vec![0.0; model.links.len()];
    let mut incoming = Vec::with_capacity(model.nodes.len());
    let mut outgoing = Vec::with_capacity(model.nodes.len());

    for (node_idx, node) in model.nodes.iter().enumerate() {
        let mut out_order = node.outgoing.clone();
        out_order.sort_by(|&a, &b| {
            let ta = extents[model.links[a].target].0;
            let tb = extents[model.links[b].target].0;
            ta.total_cmp(&tb).then(a.cmp(&b))
        });
        let mut y = extents[node_idx].0;
        for &link_idx in &out_order {
            y0[link_idx] = y + width[link_idx] / 2.0;
            y += width[link_idx];
        }

        let mut in_order = node.incoming.clone();
        in_order.sort_by(|&a, &b| {
            let sa = extents[model.links[a].source].0;
            let sb = extents[model.links[b].source].0;
            sa.total_cmp(&sb).then(a.cmp(&b))
        });
        let mut y = extents[node_idx].0;
        for &link_idx in &in_order {
            y1[link_idx] = y + width[link_idx] / 2.0;
            y += width[link_idx];
        }

        outgoing.push(out_order);
        incoming.push(in_order);
    }

    RoutedLinks {
        width,
        y0,
        y1,
        incoming,
        outgoing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::GraphSpec;

    #[test]
    fn orders_links_by_opposite_node_position() {
        let mut spec = GraphSpec::new();
        spec.add_link("A", "low", 2.0);
        spec.add_link("A", "high", 1.0);
        spec.add_link("other", "low", 3.0);
        let model = GraphModel::from_spec(&spec).unwrap();
        // A, low, high, other
        let extents = vec![(0.0, 3.0), (50.0, 55.0), (10.0, 11.0), (20.0, 23.0)];
        let routed = route_links(&model, &extents, 1.0);

        assert_eq!(routed.outgoing[0], vec![1, 0]);
        assert_eq!(routed.y0[1], 0.5);
        assert_eq!(routed.y0[0], 2.0);

        // low is fed by A (top 0) above `other` (top 20).
        assert_eq!(routed.incoming[1], vec![0, 2]);
        assert_eq!(routed.y1[0], 51.0);
        assert_eq!(routed.y1[2], 53.5);
    }

    #[test]
    fn band_widths_fill_each_face() {
        let mut spec = GraphSpec::new();
        spec.add_link("A", "B", 3.0);
        spec.add_link("A", "C", 4.0);
        spec.add_link("B", "D", 3.0);
        spec.add_link("C", "D", 4.0);
        let model = GraphModel::from_spec(&spec).unwrap();
        let ky = 2.0;
        let extents = vec![(0.0, 14.0), (0.0, 6.0), (10.0, 18.0), (0.0, 14.0)];
        let routed = route_links(&model, &extents, ky);
        for (idx, node) in model.nodes.iter().enumerate() {
            let out: f64 = routed.outgoing[idx].iter().map(|&l| routed.width[l]).sum();
            let inc: f64 = routed.incoming[idx].iter().map(|&l| routed.width[l]).sum();
            if !node.outgoing.is_empty() {
                assert_eq!(out, node.value * ky);
            }
            if !node.incoming.is_empty() {
                assert_eq!(inc, node.value * ky);
            }
        }
        // D: B's band sits above C's.
        assert_eq!(routed.incoming[3], vec![2, 3]);
        assert_eq!(routed.y1[2], 3.0);
        assert_eq!(routed.y1[3], 10.0);
    }
}
