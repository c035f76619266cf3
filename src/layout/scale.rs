use crate::config::LayoutConfig;

use super::ranking::Columns;

/// Horizontal distance between the left faces of adjacent columns.
pub(super) fn column_step(config: &LayoutConfig, max_column: usize) -> f64 {
    if max_column == 0 {
        return 0.0;
    }
    let span = config.width - 2.0 * config.margin - config.node_width;
    (span / max_column as f64).max(0.0)
}

/// Returns `(x0, x1)` for every node.
pub(super) fn horizontal_extents(config: &LayoutConfig, columns: &Columns) -> Vec<(f64, f64)> {
    let step = column_step(config, columns.max_column);
    columns
        .column
        .iter()
        .map(|&column| {
            let x0 = config.margin + column as f64 * step;
            (x0, x0 + config.node_width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreads_columns_across_width() {
        let config = LayoutConfig::default();
        let columns = Columns {
            column: vec![0, 1, 2, 1],
            max_column: 2,
        };
        let xs = horizontal_extents(&config, &columns);
        // (900 - 20 - 40) / 2
        assert_eq!(column_step(&config, 2), 420.0);
        assert_eq!(xs[0], (10.0, 50.0));
        assert_eq!(xs[1], (430.0, 470.0));
        assert_eq!(xs[2], (850.0, 890.0));
        assert_eq!(xs[1], xs[3]);
    }

    #[test]
    fn single_column_has_no_step() {
        let config = LayoutConfig::default();
        assert_eq!(column_step(&config, 0), 0.0);
    }

    #[test]
    fn narrow_drawing_collapses_columns() {
        let config = LayoutConfig {
            width: 30.0,
            ..LayoutConfig::default()
        };
        assert_eq!(column_step(&config, 3), 0.0);
    }
}
