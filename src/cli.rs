use crate::config::{Config, LinkColorMode, NodeAlign, load_config, merge_config_value};
use crate::layout::{Layout, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::parser::{extract_sankey_blocks, parse_sankey};
use crate::render::{render_error_svg, render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sankr", version, about = "Sankey diagram layout and renderer")]
pub struct Args {
    /// Input file (.csv, .yaml, .json, .md) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, sankey section)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Drawing width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Drawing height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Column alignment
    #[arg(long = "align", value_enum)]
    pub align: Option<NodeAlign>,

    #[arg(long = "nodeWidth")]
    pub node_width: Option<f64>,

    /// Vertical gap between nodes of a column
    #[arg(long = "nodePadding")]
    pub node_padding: Option<f64>,

    /// Link colouring
    #[arg(long = "linkColor", value_enum)]
    pub link_color: Option<LinkColorMode>,

    /// Relaxation passes
    #[arg(long = "iterations")]
    pub iterations: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "json",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let (base_config, config_warnings) = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;
    for warning in &config_warnings {
        eprintln!("warning: config: {warning}");
    }

    let (input, is_markdown) = read_input(args.input.as_deref())?;
    let diagrams = if is_markdown {
        extract_sankey_blocks(&input)
    } else {
        vec![input]
    };

    if diagrams.is_empty() {
        return Err(anyhow::anyhow!("No sankey diagrams found in input"));
    }

    if diagrams.len() == 1 {
        let output = match args.output_format {
            OutputFormat::Png => Some(ensure_output(&args.output, "png")?),
            _ => args.output.clone(),
        };
        return render_one(&diagrams[0], &base_config, &args, output.as_deref());
    }

    // Multiple diagrams (Markdown input)
    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, diagrams.len())?;
    for (idx, diagram) in diagrams.iter().enumerate() {
        render_one(diagram, &base_config, &args, Some(&outputs[idx]))
            .with_context(|| format!("diagram {} of {}", idx + 1, diagrams.len()))?;
    }

    Ok(())
}

fn render_one(code: &str, base: &Config, args: &Args, output: Option<&Path>) -> Result<()> {
    let mut config = base.clone();
    let (layout, input_warnings) = match prepare_layout(code, &mut config, args) {
        Ok(prepared) => prepared,
        Err(err) => {
            if args.output_format == OutputFormat::Svg {
                write_output_svg(&render_error_svg(&format!("{err:#}"), &config.theme), output)?;
            }
            return Err(err);
        }
    };
    for warning in &input_warnings {
        eprintln!("warning: {warning}");
    }
    for warning in &layout.warnings {
        eprintln!("warning: {warning}");
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.render);
            write_output_svg(&svg, output)?;
        }
        OutputFormat::Json => match output {
            Some(path) => write_layout_dump(path, &layout, &config.theme)?,
            None => println!("{}", crate::layout_dump::layout_to_json(&layout, &config.theme)?),
        },
        OutputFormat::Png => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_png(&layout, &config, output)?;
        }
    }
    Ok(())
}

/// Parses and lays out one diagram. Skipped rows and ignored directive
/// settings come back alongside the layout.
fn prepare_layout(code: &str, config: &mut Config, args: &Args) -> Result<(Layout, Vec<String>)> {
    let parsed = parse_sankey(code)?;
    let mut warnings = parsed.warnings;
    if let Some(init_cfg) = parsed.init_config {
        let ignored = merge_config_value(config, init_cfg).context("invalid init directive")?;
        warnings.extend(ignored.into_iter().map(|w| format!("init directive: {w}")));
    }
    apply_overrides(config, args);
    let layout = compute_layout(&parsed.graph, &config.layout)?;
    Ok((layout, warnings))
}

/// Command-line flags win over the config file and init directives.
fn apply_overrides(config: &mut Config, args: &Args) {
    let layout = &mut config.layout;
    if let Some(width) = args.width {
        layout.width = width;
    }
    if let Some(height) = args.height {
        layout.height = height;
    }
    if let Some(align) = args.align {
        layout.alignment = align;
    }
    if let Some(node_width) = args.node_width {
        if node_width > 0.0 {
            layout.node_width = node_width;
        } else {
            eprintln!("warning: ignoring non-positive --nodeWidth {node_width}");
        }
    }
    if let Some(node_padding) = args.node_padding {
        if node_padding > 0.0 {
            layout.node_padding = node_padding;
        } else {
            eprintln!("warning: ignoring non-positive --nodePadding {node_padding}");
        }
    }
    if let Some(iterations) = args.iterations {
        layout.iterations = iterations;
    }
    if let Some(mode) = args.link_color {
        config.render.link_color = mode;
    }
}

#[cfg(feature = "png")]
fn write_png(layout: &Layout, config: &Config, output: &Path) -> Result<()> {
    let svg = render_svg(layout, &config.theme, &config.render);
    crate::render::write_output_png(&svg, output, layout.width, layout.height)
}

#[cfg(not(feature = "png"))]
fn write_png(_layout: &Layout, _config: &Config, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let is_md = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext, "md" | "markdown"))
            .unwrap_or(false);
        return Ok((content, is_md));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for markdown input"))?;
    if base.is_dir() {
        let mut outputs = Vec::new();
        for idx in 0..count {
            outputs.push(base.join(format!("sankey-{}.{}", idx + 1, ext)));
        }
        return Ok(outputs);
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("sankey");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    let mut outputs = Vec::new();
    for idx in 0..count {
        outputs.push(parent.join(format!("{}-{}.{}", stem, idx + 1, ext)));
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_outputs_are_numbered() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/flows.svg")), OutputFormat::Json, 2).unwrap();
        assert_eq!(outputs[0], Path::new("out/flows-1.json"));
        assert_eq!(outputs[1], Path::new("out/flows-2.json"));
        assert!(resolve_multi_outputs(None, OutputFormat::Svg, 2).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "sankr",
            "--align",
            "justify",
            "--nodeWidth",
            "0",
            "--nodePadding",
            "4",
            "--linkColor",
            "target",
            "-w",
            "640",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.layout.alignment, NodeAlign::Justify);
        assert_eq!(config.layout.node_width, 40.0);
        assert_eq!(config.layout.node_padding, 4.0);
        assert_eq!(config.layout.width, 640.0);
        assert_eq!(config.render.link_color, LinkColorMode::Target);
    }

    #[test]
    fn skipped_input_is_reported() {
        let args = Args::parse_from(["sankr"]);
        let mut config = Config::default();
        let code = "%%{init: {sankey: {nodeAlign: 'sideways'}}}%%\nsankey\nA,B,1\nA,B\n";
        let (layout, warnings) = prepare_layout(code, &mut config, &args).unwrap();
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert!(warnings[0].starts_with("line 4:"), "{warnings:?}");
        assert_eq!(warnings[1], "init directive: ignoring unknown nodeAlign `sideways`");
    }
}
