//! Sankey layout engine.
//!
//! The pipeline runs in fixed stages over a freshly built [`graph::GraphModel`]:
//! column assignment, horizontal scaling, node sizing, vertical relaxation
//! and link routing. Every stage works on index-based arrays owned by the
//! call, so a layout is a pure function of its inputs.

mod error;
mod graph;
mod ranking;
mod relax;
mod routing;
mod scale;
mod sizing;
pub(crate) mod types;

pub use error::{LayoutError, LayoutWarning};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::GraphSpec;

use graph::GraphModel;
use ranking::assign_columns;
use relax::VerticalRelaxer;
use routing::route_links;
use scale::horizontal_extents;
use sizing::{node_heights, stack_columns, vertical_scale};

pub fn compute_layout(spec: &GraphSpec, config: &LayoutConfig) -> Result<Layout, LayoutError> {
    let model = GraphModel::from_spec(spec)?;
    if model.is_empty() {
        return Ok(empty_layout(config));
    }

    let columns = assign_columns(&model, config.alignment)?;
    let mut groups = columns.groups();
    tracing::debug!(
        nodes = model.nodes.len(),
        links = model.links.len(),
        columns = groups.len(),
        align = config.alignment.as_str(),
        "assigned sankey columns"
    );

    let xs = horizontal_extents(config, &columns);
    let scale = vertical_scale(&model, &groups, config);
    tracing::debug!(ky = scale.ky, padding = scale.padding, "sized sankey nodes");

    let heights = node_heights(&model, scale.ky, config);
    let mut ys = stack_columns(&groups, &heights, scale.padding, config);
    VerticalRelaxer::new(&model, config, scale.padding).relax(&mut groups, &mut ys);

    let routed = route_links(&model, &ys, scale.ky);

    let nodes: Vec<NodeLayout> = model
        .nodes
        .into_iter()
        .zip(routed.incoming.into_iter().zip(routed.outgoing))
        .enumerate()
        .map(|(idx, (node, (incoming, outgoing)))| NodeLayout {
            id: node.id,
            label: node.label,
            color: node.color,
            implicit: node.implicit,
            column: columns.column[idx],
            x0: xs[idx].0,
            x1: xs[idx].1,
            y0: ys[idx].0,
            y1: ys[idx].1,
            value: node.value,
            incoming,
            outgoing,
        })
        .collect();

    let links = model
        .links
        .iter()
        .enumerate()
        .map(|(idx, link)| LinkLayout {
            source: nodes[link.source].id.clone(),
            target: nodes[link.target].id.clone(),
            source_index: link.source,
            target_index: link.target,
            value: link.value,
            width: routed.width[idx],
            x0: nodes[link.source].x1,
            y0: routed.y0[idx],
            x1: nodes[link.target].x0,
            y1: routed.y1[idx],
        })
        .collect();

    Ok(Layout {
        width: config.width,
        height: config.height,
        margin: config.margin,
        node_width: config.node_width,
        node_padding: scale.padding,
        alignment: config.alignment,
        ky: scale.ky,
        max_column: columns.max_column,
        nodes,
        links,
        warnings: scale.warning.into_iter().collect(),
    })
}

fn empty_layout(config: &LayoutConfig) -> Layout {
    Layout {
        width: config.width,
        height: config.height,
        margin: config.margin,
        node_width: config.node_width,
        node_padding: config.node_padding,
        alignment: config.alignment,
        ky: 0.0,
        max_column: 0,
        nodes: Vec::new(),
        links: Vec::new(),
        warnings: Vec::new(),
    }
}
