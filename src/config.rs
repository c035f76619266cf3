use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column assignment policy applied after the forward longest-path ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum NodeAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

impl NodeAlign {
    pub const ALL: [NodeAlign; 4] = [
        NodeAlign::Left,
        NodeAlign::Right,
        NodeAlign::Center,
        NodeAlign::Justify,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" | "centre" => Some(Self::Center),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeAlign::Left => "left",
            NodeAlign::Right => "right",
            NodeAlign::Center => "center",
            NodeAlign::Justify => "justify",
        }
    }
}

/// Which endpoint colour a link is painted with. Layout never reads this.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LinkColorMode {
    #[default]
    None,
    Source,
    Target,
}

impl LinkColorMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "source" => Some(Self::Source),
            "target" => Some(Self::Target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub node_width: f64,
    /// Minimum vertical gap between neighbours in one column.
    pub node_padding: f64,
    pub alignment: NodeAlign,
    pub iterations: usize,
    /// Floor applied to node heights so empty nodes stay visible.
    pub min_node_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 600.0,
            margin: 10.0,
            node_width: 40.0,
            node_padding: 16.0,
            alignment: NodeAlign::Left,
            iterations: 6,
            min_node_height: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub link_color: LinkColorMode,
    pub link_opacity: f32,
    /// Horizontal distance between a node face and its label.
    pub label_offset: f32,
    pub show_values: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            link_color: LinkColorMode::None,
            link_opacity: 0.3,
            label_offset: 6.0,
            show_values: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    primary_text_color: Option<String>,
    text_color: Option<String>,
    background: Option<String>,
    line_color: Option<String>,
    node_colors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<f64>,
    node_width: Option<NumberOrString>,
    node_padding: Option<NumberOrString>,
    #[serde(alias = "nodeAlignment")]
    node_align: Option<String>,
    iterations: Option<usize>,
    min_node_height: Option<f64>,
    link_color: Option<String>,
    link_opacity: Option<f32>,
    show_values: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    sankey: Option<SankeyConfigFile>,
}

/// Loads the config file, if any. Ignored settings come back as warnings.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<(Config, Vec<String>)> {
    let mut config = Config::default();
    let mut warnings = Vec::new();
    let Some(path) = path else {
        return Ok((config, warnings));
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_config_file(&mut config, parsed, &mut warnings);
    Ok((config, warnings))
}

/// Overlays a JSON object shaped like the config file (for example the body
/// of a `%%{init: ...}%%` directive) onto `config`, returning one warning per
/// setting that was ignored.
pub fn merge_config_value(
    config: &mut Config,
    value: serde_json::Value,
) -> anyhow::Result<Vec<String>> {
    let parsed: ConfigFile = serde_json::from_value(value)?;
    let mut warnings = Vec::new();
    apply_config_file(config, parsed, &mut warnings);
    Ok(warnings)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile, warnings: &mut Vec<String>) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::from_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => {
                tracing::warn!(theme = theme_name, "unknown theme, keeping current");
                warnings.push(format!("unknown theme `{theme_name}`, keeping current"));
            }
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f64) {
            config.theme.font_size = v as f32;
        }
        if let Some(v) = vars.primary_text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.link_color = v;
        }
        if let Some(v) = vars.node_colors {
            if !v.is_empty() {
                config.theme.palette = v;
            }
        }
    }

    if let Some(sankey) = parsed.sankey {
        apply_sankey_section(config, sankey, warnings);
    }
}

fn apply_sankey_section(
    config: &mut Config,
    sankey: SankeyConfigFile,
    warnings: &mut Vec<String>,
) {
    let layout = &mut config.layout;
    if let Some(v) = sankey.width.filter(|v| *v > 0.0) {
        layout.width = v;
    }
    if let Some(v) = sankey.height.filter(|v| *v > 0.0) {
        layout.height = v;
    }
    if let Some(v) = sankey.margin.filter(|v| *v >= 0.0) {
        layout.margin = v;
    }
    // Non-positive widths and paddings are rejected, the previous value stays.
    if let Some(raw) = sankey.node_width {
        match raw.as_f64() {
            Some(v) if v > 0.0 && v.is_finite() => layout.node_width = v,
            _ => {
                tracing::warn!(?raw, "ignoring invalid nodeWidth");
                warnings.push(format!("ignoring invalid nodeWidth {raw:?}"));
            }
        }
    }
    if let Some(raw) = sankey.node_padding {
        match raw.as_f64() {
            Some(v) if v > 0.0 && v.is_finite() => layout.node_padding = v,
            _ => {
                tracing::warn!(?raw, "ignoring invalid nodePadding");
                warnings.push(format!("ignoring invalid nodePadding {raw:?}"));
            }
        }
    }
    if let Some(token) = sankey.node_align.as_deref() {
        match NodeAlign::from_token(token) {
            Some(align) => layout.alignment = align,
            None => {
                tracing::warn!(token, "ignoring unknown nodeAlign");
                warnings.push(format!("ignoring unknown nodeAlign `{token}`"));
            }
        }
    }
    if let Some(v) = sankey.iterations {
        layout.iterations = v;
    }
    if let Some(v) = sankey.min_node_height.filter(|v| *v >= 0.0) {
        layout.min_node_height = v;
    }

    let render = &mut config.render;
    if let Some(token) = sankey.link_color.as_deref() {
        match LinkColorMode::from_token(token) {
            Some(mode) => render.link_color = mode,
            None => {
                tracing::warn!(token, "ignoring unknown linkColor");
                warnings.push(format!("ignoring unknown linkColor `{token}`"));
            }
        }
    }
    if let Some(v) = sankey.link_opacity {
        render.link_opacity = v.clamp(0.0, 1.0);
    }
    if let Some(v) = sankey.show_values {
        render.show_values = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_sankey_defaults() {
        let config = Config::default();
        assert_eq!(config.layout.node_width, 40.0);
        assert_eq!(config.layout.node_padding, 16.0);
        assert_eq!(config.layout.alignment, NodeAlign::Left);
        assert_eq!(config.layout.iterations, 6);
        assert_eq!(config.render.link_color, LinkColorMode::None);
    }

    #[test]
    fn merges_sankey_section() {
        let mut config = Config::default();
        let warnings = merge_config_value(
            &mut config,
            json!({
                "theme": "modern",
                "sankey": {
                    "nodeAlign": "justify",
                    "nodeWidth": "24",
                    "nodePadding": 8,
                    "linkColor": "source",
                    "iterations": 3
                }
            }),
        )
        .unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.layout.alignment, NodeAlign::Justify);
        assert_eq!(config.layout.node_width, 24.0);
        assert_eq!(config.layout.node_padding, 8.0);
        assert_eq!(config.layout.iterations, 3);
        assert_eq!(config.render.link_color, LinkColorMode::Source);
        assert_eq!(config.theme.font_size, Theme::modern().font_size);
    }

    #[test]
    fn rejects_non_positive_sizes() {
        let mut config = Config::default();
        let warnings = merge_config_value(
            &mut config,
            json!({ "sankey": { "nodeWidth": 0, "nodePadding": -4, "nodeAlign": "diagonal" } }),
        )
        .unwrap();
        assert_eq!(config.layout.node_width, 40.0);
        assert_eq!(config.layout.node_padding, 16.0);
        assert_eq!(config.layout.alignment, NodeAlign::Left);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("nodeWidth"), "{warnings:?}");
        assert!(warnings[1].contains("nodePadding"), "{warnings:?}");
        assert!(warnings[2].contains("`diagonal`"), "{warnings:?}");
    }

    #[test]
    fn reports_unknown_theme_and_link_colour() {
        let mut config = Config::default();
        let warnings = merge_config_value(
            &mut config,
            json!({ "theme": "sepia", "sankey": { "linkColor": "rainbow" } }),
        )
        .unwrap();
        assert_eq!(
            warnings,
            [
                "unknown theme `sepia`, keeping current",
                "ignoring unknown linkColor `rainbow`"
            ]
        );
        assert_eq!(config.render.link_color, LinkColorMode::None);
    }

    #[test]
    fn missing_config_file_path_means_defaults() {
        let (config, warnings) = load_config(None).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.layout.node_width, 40.0);
    }

    #[test]
    fn parses_tokens() {
        assert_eq!(NodeAlign::from_token(" Center "), Some(NodeAlign::Center));
        assert_eq!(NodeAlign::from_token("up"), None);
        assert_eq!(LinkColorMode::from_token("TARGET"), Some(LinkColorMode::Target));
        for align in NodeAlign::ALL {
            assert_eq!(NodeAlign::from_token(align.as_str()), Some(align));
        }
    }
}
