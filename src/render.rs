use crate::config::{LinkColorMode, RenderConfig};
use crate::layout::{Layout, LinkLayout, NodeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));

    let node_colors: Vec<String> = layout
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| theme.node_color(node.color.as_deref(), idx))
        .collect();

    svg.push_str("<g class=\"links\" fill=\"none\">");
    for link in &layout.links {
        let stroke = match config.link_color {
            LinkColorMode::None => theme.link_color.as_str(),
            LinkColorMode::Source => node_colors[link.source_index].as_str(),
            LinkColorMode::Target => node_colors[link.target_index].as_str(),
        };
        svg.push_str(&format!(
            "<path d=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-opacity=\"{}\"><title>{}</title></path>",
            link_path(link),
            escape_xml(stroke),
            link.width.max(1.0),
            config.link_opacity,
            escape_xml(&format!(
                "{} → {}: {}",
                layout.nodes[link.source_index].label,
                layout.nodes[link.target_index].label,
                format_value(link.value)
            ))
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for (node, color) in layout.nodes.iter().zip(&node_colors) {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\"/>",
            node.x0,
            node.y0,
            node.width(),
            node.height(),
            escape_xml(color),
            escape_xml(&theme.node_stroke)
        ));
    }
    svg.push_str("</g>");

    svg.push_str(&format!(
        "<g class=\"labels\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
        escape_xml(&theme.text_color)
    ));
    for node in &layout.nodes {
        svg.push_str(&node_label_svg(node, layout.width, config));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

/// Replacement drawing for input that could not be laid out.
pub fn render_error_svg(message: &str, theme: &Theme) -> String {
    let lines: Vec<&str> = message.lines().filter(|line| !line.trim().is_empty()).collect();
    let line_height = theme.font_size * 1.5;
    let width = 480.0;
    let height = 48.0 + line_height * lines.len().max(1) as f32;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\" stroke=\"#d62728\" stroke-width=\"2\"/>",
        escape_xml(&theme.background)
    ));
    svg.push_str(&format!(
        "<text x=\"16\" y=\"24\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"#d62728\">Sankey layout error</text>",
        escape_xml(&theme.font_family),
        theme.font_size
    ));
    for (idx, line) in lines.iter().enumerate() {
        let y = 24.0 + line_height * (idx + 1) as f32;
        svg.push_str(&format!(
            "<text x=\"16\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            escape_xml(&theme.text_color),
            escape_xml(line)
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn link_path(link: &LinkLayout) -> String {
    let [start, c1, c2, end] = link.control_points();
    format!(
        "M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        start.0, start.1, c1.0, c1.1, c2.0, c2.1, end.0, end.1
    )
}

fn node_label_svg(node: &NodeLayout, width: f64, config: &RenderConfig) -> String {
    let offset = config.label_offset as f64;
    let (x, anchor) = if node.x0 < width / 2.0 {
        (node.x1 + offset, "start")
    } else {
        (node.x0 - offset, "end")
    };
    let text = if config.show_values {
        format!("{}: {}", node.label, format_value(node.value))
    } else {
        node.label.clone()
    };
    format!(
        "<text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" dominant-baseline=\"middle\">{}</text>",
        node.center_y(),
        escape_xml(&text)
    )
}

/// Integral values print without decimals, others with at most two.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, width: f64, height: f64) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(width as f32, height as f32)
        .ok_or_else(|| anyhow::anyhow!("invalid drawing size {width}x{height}"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::GraphSpec;
    use crate::layout::compute_layout;

    fn sample_layout() -> Layout {
        let mut spec = GraphSpec::new();
        spec.add_node("A", Some("Alpha & co".to_string()), Some("#123456".to_string()));
        spec.add_link("A", "B", 5.0);
        spec.add_link("A", "C", 2.5);
        compute_layout(&spec, &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn render_svg_basic() {
        let layout = sample_layout();
        let svg = render_svg(&layout, &Theme::classic(), &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path ").count(), 2);
        assert!(svg.contains("Alpha &amp; co: 7.5"));
        assert!(svg.contains("fill=\"#123456\""));
        assert!(svg.contains("stroke-opacity=\"0.3\""));
    }

    #[test]
    fn link_colour_follows_mode() {
        let layout = sample_layout();
        let theme = Theme::classic();
        let by_source = RenderConfig {
            link_color: LinkColorMode::Source,
            ..RenderConfig::default()
        };
        let svg = render_svg(&layout, &theme, &by_source);
        assert_eq!(svg.matches("stroke=\"#123456\"").count(), 2);

        let plain = render_svg(&layout, &theme, &RenderConfig::default());
        let expected = format!("stroke=\"{}\"", theme.link_color);
        assert_eq!(plain.matches(&expected).count(), 2);
    }

    #[test]
    fn labels_flip_side_past_the_middle() {
        let layout = sample_layout();
        let config = RenderConfig {
            show_values: false,
            ..RenderConfig::default()
        };
        let svg = render_svg(&layout, &Theme::classic(), &config);
        assert!(svg.contains("text-anchor=\"start\" dominant-baseline=\"middle\">Alpha &amp; co<"));
        assert!(svg.contains("text-anchor=\"end\" dominant-baseline=\"middle\">B<"));
    }

    #[test]
    fn empty_layout_is_a_blank_drawing() {
        let layout = compute_layout(&GraphSpec::new(), &LayoutConfig::default()).unwrap();
        let svg = render_svg(&layout, &Theme::modern(), &RenderConfig::default());
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn error_svg_lists_message_lines() {
        let svg = render_error_svg("cycle detected\namong A, B", &Theme::classic());
        assert!(svg.contains(">cycle detected<"));
        assert!(svg.contains(">among A, B<"));
    }

    #[test]
    fn theme_colours_are_escaped() {
        let theme = Theme {
            background: "white\"/><script>x</script><rect fill=\"".to_string(),
            node_stroke: "#000\" onclick=\"x".to_string(),
            text_color: "red\" onload=\"x".to_string(),
            ..Theme::classic()
        };
        let svg = render_svg(&sample_layout(), &theme, &RenderConfig::default());
        let error = render_error_svg("bad input", &theme);
        for out in [&svg, &error] {
            assert!(!out.contains("<script>"));
            assert!(!out.contains("onload=\""));
            assert!(out.contains("fill=\"red&quot; onload=&quot;x\""));
        }
        assert!(!svg.contains("onclick=\""));
        assert!(svg.contains("stroke=\"#000&quot; onclick=&quot;x\""));
    }

    #[test]
    fn formats_values() {
        assert_eq!(format_value(40.0), "40");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(1.0 / 3.0), "0.33");
        assert_eq!(format_value(0.0), "0");
    }
}
