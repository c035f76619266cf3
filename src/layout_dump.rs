use crate::layout::{Layout, LayoutWarning};
use crate::theme::Theme;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Machine-readable form of a computed layout, with resolved node colours.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub alignment: String,
    pub node_padding: f64,
    pub ky: f64,
    pub columns: usize,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    pub warnings: Vec<LayoutWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub color: String,
    pub implicit: bool,
    pub column: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub value: f64,
    pub incoming: Vec<usize>,
    pub outgoing: Vec<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub width: f64,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub path: [[f64; 2]; 4],
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, theme: &Theme) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                color: theme.node_color(node.color.as_deref(), idx),
                implicit: node.implicit,
                column: node.column,
                x0: node.x0,
                x1: node.x1,
                y0: node.y0,
                y1: node.y1,
                value: node.value,
                incoming: node.incoming.clone(),
                outgoing: node.outgoing.clone(),
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                source: link.source.clone(),
                target: link.target.clone(),
                value: link.value,
                width: link.width,
                x0: link.x0,
                y0: link.y0,
                x1: link.x1,
                y1: link.y1,
                path: link.control_points().map(|(x, y)| [x, y]),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            alignment: layout.alignment.as_str().to_string(),
            node_padding: layout.node_padding,
            ky: layout.ky,
            columns: layout.column_count(),
            nodes,
            links,
            warnings: layout.warnings.clone(),
        }
    }
}

pub fn layout_to_json(layout: &Layout, theme: &Theme) -> anyhow::Result<String> {
    let dump = LayoutDump::from_layout(layout, theme);
    Ok(serde_json::to_string_pretty(&dump)?)
}

pub fn write_layout_dump(path: &Path, layout: &Layout, theme: &Theme) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, theme);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::GraphSpec;
    use crate::layout::compute_layout;

    #[test]
    fn dumps_nodes_links_and_warnings() {
        let mut spec = GraphSpec::new();
        for idx in 0..40 {
            spec.add_link("hub", &format!("leaf{idx}"), 1.0);
        }
        let config = LayoutConfig {
            height: 200.0,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&spec, &config).unwrap();
        let json = layout_to_json(&layout, &Theme::classic()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["columns"], 2);
        assert_eq!(value["alignment"], "left");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 41);
        assert_eq!(value["links"].as_array().unwrap().len(), 40);
        assert_eq!(value["nodes"][0]["id"], "hub");
        assert_eq!(value["nodes"][0]["color"], "#1f77b4");
        assert_eq!(value["links"][0]["path"].as_array().unwrap().len(), 4);
        assert_eq!(value["warnings"][0]["kind"], "insufficientHeight");
        assert!(value["warnings"][0]["requestedPadding"].is_number());
    }
}
