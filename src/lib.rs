#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, LinkColorMode, NodeAlign, RenderConfig};
pub use ir::GraphSpec;
pub use layout::{Layout, LayoutError, LayoutWarning, compute_layout};
pub use layout_dump::{LayoutDump, layout_to_json};
pub use parser::{ParseOutput, extract_sankey_blocks, parse_sankey};
pub use render::{render_error_svg, render_svg};
pub use theme::Theme;

use anyhow::{Context, Result};

/// Everything needed to turn diagram text into a drawing.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::default()
        }
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
        }
    }
}

impl From<RenderOptions> for Config {
    fn from(options: RenderOptions) -> Self {
        Self {
            theme: options.theme,
            layout: options.layout,
            render: options.render,
        }
    }
}

/// Parses `code`, applies its init directive on top of `options` and lays it
/// out. Returns the layout with the options it was computed under.
pub fn layout_with_options(code: &str, options: RenderOptions) -> Result<(Layout, RenderOptions)> {
    let parsed = parse_sankey(code)?;
    let mut config = Config::from(options);
    if let Some(init) = parsed.init_config {
        config::merge_config_value(&mut config, init).context("invalid init directive")?;
    }
    let layout = compute_layout(&parsed.graph, &config.layout)?;
    Ok((layout, config.into()))
}

pub fn render_with_options(code: &str, options: RenderOptions) -> Result<String> {
    let (layout, options) = layout_with_options(code, options)?;
    Ok(render_svg(&layout, &options.theme, &options.render))
}
