use crate::config::LayoutConfig;

use super::graph::GraphModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Forward,
    Backward,
}

/// Moves nodes vertically toward the flow-weighted centre of their
/// neighbours, alternating sweep direction, then keeps every column
/// overlap-free.
pub(super) struct VerticalRelaxer<'a> {
    model: &'a GraphModel,
    config: &'a LayoutConfig,
    padding: f64,
}

impl<'a> VerticalRelaxer<'a> {
    pub(super) fn new(model: &'a GraphModel, config: &'a LayoutConfig, padding: f64) -> Self {
        Self {
            model,
            config,
            padding,
        }
    }

    /// Runs the configured number of passes. `groups` ends up sorted by `y0`
    /// within each column.
    pub(super) fn relax(&self, groups: &mut [Vec<usize>], extents: &mut [(f64, f64)]) {
        for group in groups.iter_mut() {
            self.resolve_collisions(group, extents);
        }
        for pass in 0..self.config.iterations {
            let sweep = if pass % 2 == 0 {
                Sweep::Forward
            } else {
                Sweep::Backward
            };
            tracing::trace!(pass, ?sweep, "relaxation pass");
            match sweep {
                Sweep::Forward => {
                    for group in groups.iter_mut() {
                        self.relax_column(group, extents, sweep);
                    }
                }
                Sweep::Backward => {
                    for group in groups.iter_mut().rev() {
                        self.relax_column(group, extents, sweep);
                    }
                }
            }
        }
    }

    fn relax_column(&self, group: &mut [usize], extents: &mut [(f64, f64)], sweep: Sweep) {
        for &idx in group.iter() {
            let Some(center) = self.neighbour_center(idx, extents, sweep) else {
                continue;
            };
            let half = (extents[idx].1 - extents[idx].0) / 2.0;
            extents[idx] = (center - half, center + half);
        }
        self.resolve_collisions(group, extents);
    }

    fn neighbour_center(&self, idx: usize, extents: &[(f64, f64)], sweep: Sweep) -> Option<f64> {
        let node = &self.model.nodes[idx];
        let links = match sweep {
            Sweep::Forward => &node.incoming,
            Sweep::Backward => &node.outgoing,
        };
        if links.is_empty() {
            return None;
        }
        let mut weighted = 0.0;
        let mut total = 0.0;
        for &link_idx in links {
            let link = &self.model.links[link_idx];
            let other = match sweep {
                Sweep::Forward => link.source,
                Sweep::Backward => link.target,
            };
            let (y0, y1) = extents[other];
            weighted += (y0 + y1) / 2.0 * link.value;
            total += link.value;
        }
        Some(weighted / total)
    }

    fn resolve_collisions(&self, group: &mut [usize], extents: &mut [(f64, f64)]) {
        group.sort_by(|&a, &b| extents[a].0.total_cmp(&extents[b].0).then(a.cmp(&b)));

        let mut y = self.config.margin;
        for &idx in group.iter() {
            let dy = y - extents[idx].0;
            if dy > 0.0 {
                shift(&mut extents[idx], dy);
            }
            y = extents[idx].1 + self.padding;
        }

        let bottom = self.config.height - self.config.margin;
        let Some(&last) = group.last() else {
            return;
        };
        if extents[last].1 <= bottom {
            return;
        }
        // Push back up from the bottom, closing gaps before moving the top.
        let mut y = bottom;
        for &idx in group.iter().rev() {
            let dy = extents[idx].1 - y;
            if dy > 0.0 {
                shift(&mut extents[idx], -dy);
            }
            y = extents[idx].0 - self.padding;
        }
    }
}

fn shift(extent: &mut (f64, f64), dy: f64) {
    extent.0 += dy;
    extent.1 += dy;
}
