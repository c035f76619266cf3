use serde::{Deserialize, Serialize};

/// A node declaration as produced by the notation parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(alias = "name")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// Raw graph description handed to the layout engine.
///
/// Nothing here is validated yet: duplicate ids, bad values and links to
/// undeclared nodes are all resolved when the graph model is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<NodeSpec>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: Vec<LinkSpec>,
}

impl GraphSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: &str, label: Option<String>, color: Option<String>) {
        self.nodes.push(NodeSpec {
            id: id.to_string(),
            label,
            color,
        });
    }

    pub fn add_link(&mut self, source: &str, target: &str, value: f64) {
        self.links.push(LinkSpec {
            source: source.to_string(),
            target: target.to_string(),
            value,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_name_alias_and_null_lists() {
        let spec: GraphSpec =
            serde_json::from_str(r#"{"nodes":[{"name":"A","color":"red"}],"links":null}"#)
                .unwrap();
        assert_eq!(spec.nodes[0].id, "A");
        assert_eq!(spec.nodes[0].color.as_deref(), Some("red"));
        assert!(spec.links.is_empty());
    }

    #[test]
    fn builder_keeps_insertion_order() {
        let mut spec = GraphSpec::new();
        spec.add_node("B", None, None);
        spec.add_node("A", Some("Alpha".to_string()), None);
        spec.add_link("A", "B", 2.5);
        assert_eq!(spec.nodes[0].id, "B");
        assert_eq!(spec.nodes[1].label.as_deref(), Some("Alpha"));
        assert_eq!(spec.links[0].value, 2.5);
        assert!(!spec.is_empty());
    }
}
