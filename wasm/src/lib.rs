use sankey_rs_renderer::{
    LinkColorMode, NodeAlign, RenderOptions, layout_to_json, layout_with_options,
    render_with_options,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f64>,
    height: Option<f64>,
    node_align: Option<NodeAlign>,
    node_width: Option<f64>,
    node_padding: Option<f64>,
    iterations: Option<usize>,
    link_color: Option<LinkColorMode>,
}

fn build_render_options(options: SankeyRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }

    let layout = &mut render_options.layout;
    if let Some(width) = options.width.filter(|v| *v > 0.0) {
        layout.width = width;
    }
    if let Some(height) = options.height.filter(|v| *v > 0.0) {
        layout.height = height;
    }
    if let Some(align) = options.node_align {
        layout.alignment = align;
    }
    if let Some(node_width) = options.node_width.filter(|v| *v > 0.0) {
        layout.node_width = node_width;
    }
    if let Some(node_padding) = options.node_padding.filter(|v| *v > 0.0) {
        layout.node_padding = node_padding;
    }
    if let Some(iterations) = options.iterations {
        layout.iterations = iterations;
    }
    if let Some(mode) = options.link_color {
        render_options.render.link_color = mode;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<SankeyRenderOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<SankeyRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(SankeyRenderOptions::default()),
    }
}

#[wasm_bindgen]
pub fn render_sankey_svg(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_with_options(code, render_options).map_err(|error| JsValue::from_str(&format!("{error:#}")))
}

#[wasm_bindgen]
pub fn layout_sankey_json(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    let (layout, render_options) = layout_with_options(code, render_options)
        .map_err(|error| JsValue::from_str(&format!("{error:#}")))?;
    layout_to_json(&layout, &render_options.theme)
        .map_err(|error| JsValue::from_str(&format!("{error:#}")))
}
