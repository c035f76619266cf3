use crate::config::NodeAlign;

use super::LayoutWarning;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    /// Colour as declared in the input, unvalidated.
    pub color: Option<String>,
    pub implicit: bool,
    pub column: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub value: f64,
    /// Incoming link indices, top to bottom along the left face.
    pub incoming: Vec<usize>,
    /// Outgoing link indices, top to bottom along the right face.
    pub outgoing: Vec<usize>,
}

impl NodeLayout {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

/// A link band. `y0`/`y1` are the band centre lines on the source and target
/// faces; the band spans `y ± width / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkLayout {
    pub source: String,
    pub target: String,
    pub source_index: usize,
    pub target_index: usize,
    pub value: f64,
    pub width: f64,
    /// Right face of the source node.
    pub x0: f64,
    pub y0: f64,
    /// Left face of the target node.
    pub x1: f64,
    pub y1: f64,
}

impl LinkLayout {
    /// Start, two control points and end of the horizontal cubic connector.
    pub fn control_points(&self) -> [(f64, f64); 4] {
        let mid_x = (self.x0 + self.x1) / 2.0;
        [
            (self.x0, self.y0),
            (mid_x, self.y0),
            (mid_x, self.y1),
            (self.x1, self.y1),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub node_width: f64,
    /// Vertical padding actually applied between nodes.
    pub node_padding: f64,
    pub alignment: NodeAlign,
    /// Pixels per unit of flow.
    pub ky: f64,
    pub max_column: usize,
    pub nodes: Vec<NodeLayout>,
    /// Links in input order.
    pub links: Vec<LinkLayout>,
    pub warnings: Vec<LayoutWarning>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn column_count(&self) -> usize {
        if self.nodes.is_empty() {
            0
        } else {
            self.max_column + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
