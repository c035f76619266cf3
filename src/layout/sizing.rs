use crate::config::LayoutConfig;

use super::LayoutWarning;
use super::graph::GraphModel;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct VerticalScale {
    /// Pixels per unit of flow.
    pub ky: f64,
    /// Padding actually used; 0 when the requested padding did not fit.
    pub padding: f64,
    pub warning: Option<LayoutWarning>,
}

pub(super) fn vertical_scale(
    model: &GraphModel,
    groups: &[Vec<usize>],
    config: &LayoutConfig,
) -> VerticalScale {
    let max_column_value = groups
        .iter()
        .map(|group| group.iter().map(|&idx| model.nodes[idx].value).sum::<f64>())
        .fold(0.0f64, f64::max);
    let max_nodes = groups.iter().map(Vec::len).max().unwrap_or(0);
    let inner_height = config.height - 2.0 * config.margin;
    let gaps = max_nodes.saturating_sub(1) as f64;

    let mut padding = config.node_padding;
    let mut warning = None;
    let mut available = inner_height - gaps * padding;
    if available < 0.0 && padding > 0.0 {
        tracing::warn!(
            padding,
            inner_height,
            max_nodes,
            "node padding does not fit the densest column, dropping it"
        );
        warning = Some(LayoutWarning::InsufficientHeight {
            requested_padding: padding,
            available_height: inner_height,
        });
        padding = 0.0;
        available = inner_height;
    }

    let ky = if max_column_value > 0.0 {
        (available / max_column_value).max(0.0)
    } else {
        0.0
    };
    let ky = fit_floored_nodes(model, groups, ky, inner_height, padding, config.min_node_height);
    VerticalScale {
        ky,
        padding,
        warning,
    }
}

/// Shrinks `ky` until every column, with its minimum-height nodes counted at
/// `min_height`, fits `inner_height`. Lowering `ky` can only floor more
/// nodes, so each column settles after a few rounds.
fn fit_floored_nodes(
    model: &GraphModel,
    groups: &[Vec<usize>],
    mut ky: f64,
    inner_height: f64,
    padding: f64,
    min_height: f64,
) -> f64 {
    for group in groups {
        let gaps = group.len().saturating_sub(1) as f64;
        while ky > 0.0 {
            let mut floored = 0usize;
            let mut flowing = 0.0;
            for &idx in group {
                let value = model.nodes[idx].value;
                if value * ky < min_height {
                    floored += 1;
                } else {
                    flowing += value;
                }
            }
            if flowing <= 0.0 {
                break;
            }
            let fitted = (inner_height - gaps * padding - floored as f64 * min_height) / flowing;
            if fitted >= ky {
                break;
            }
            tracing::debug!(ky, fitted, floored, "shrinking scale for minimum-height nodes");
            ky = fitted.max(0.0);
        }
    }
    ky
}

pub(super) fn node_heights(model: &GraphModel, ky: f64, config: &LayoutConfig) -> Vec<f64> {
    model
        .nodes
        .iter()
        .map(|node| (node.value * ky).max(config.min_node_height))
        .collect()
}

/// First-pass `(y0, y1)`: each column stacked downward from the top margin.
pub(super) fn stack_columns(
    groups: &[Vec<usize>],
    heights: &[f64],
    padding: f64,
    config: &LayoutConfig,
) -> Vec<(f64, f64)> {
    let mut extents = vec![(0.0, 0.0); heights.len()];
    for group in groups {
        let mut y = config.margin;
        for &idx in group {
            extents[idx] = (y, y + heights[idx]);
            y += heights[idx] + padding;
        }
    }
    extents
}
