use crate::ir::GraphSpec;
use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^sankey(-beta)?\s*$").unwrap());
static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());
static YAML_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(nodes|links)\s*:").unwrap());

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub graph: GraphSpec,
    pub init_config: Option<serde_json::Value>,
    /// Input lines that were skipped or ignored, one message each.
    pub warnings: Vec<String>,
}

/// Input notations accepted by [`parse_sankey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// `source,target,value` rows.
    Rows,
    /// A document with top-level `nodes:` / `links:` keys.
    Yaml,
    /// A JSON or JSON5 object with `nodes` / `links` arrays.
    Json,
}

struct SourceLine {
    number: usize,
    text: String,
}

pub fn parse_sankey(input: &str) -> Result<ParseOutput> {
    let mut warnings = Vec::new();
    let (lines, init_config) = preprocess_input(input, &mut warnings);
    let graph = match detect_notation(&lines) {
        Notation::Json => {
            let text = join_lines(&lines);
            json5::from_str::<GraphSpec>(&text).context("invalid sankey JSON document")?
        }
        Notation::Yaml => {
            let text = join_lines(&lines);
            serde_yaml::from_str::<GraphSpec>(&text).context("invalid sankey YAML document")?
        }
        Notation::Rows => parse_rows(&lines, &mut warnings)?,
    };
    tracing::debug!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "parsed sankey input"
    );
    Ok(ParseOutput {
        graph,
        init_config,
        warnings,
    })
}

/// Picks the notation of a diagram body, ignoring the header and comments.
pub fn detect_notation_of(input: &str) -> Notation {
    let (lines, _) = preprocess_input(input, &mut Vec::new());
    detect_notation(&lines)
}

fn detect_notation(lines: &[SourceLine]) -> Notation {
    let Some(first) = lines.first() else {
        return Notation::Rows;
    };
    if first.text.trim_start().starts_with('{') {
        return Notation::Json;
    }
    if lines.iter().any(|line| YAML_KEY_RE.is_match(&line.text)) {
        return Notation::Yaml;
    }
    Notation::Rows
}

/// Drops blank lines, `%%` comment lines and the diagram header, and pulls
/// out the last `%%{init: ...}%%` directive. Indentation is preserved.
fn preprocess_input(
    input: &str,
    warnings: &mut Vec<String>,
) -> (Vec<SourceLine>, Option<serde_json::Value>) {
    let mut init_config: Option<serde_json::Value> = None;
    let mut lines = Vec::new();
    let mut seen_content = false;

    for (idx, raw_line) in input.lines().enumerate() {
        let trimmed_line = raw_line.trim();
        if trimmed_line.is_empty() {
            continue;
        }
        if let Some(caps) = INIT_RE.captures(trimmed_line) {
            if let Some(json_str) = caps.get(1).map(|m| m.as_str()) {
                match json5::from_str::<serde_json::Value>(json_str) {
                    Ok(value) => init_config = Some(value),
                    Err(err) => {
                        tracing::warn!(line = idx + 1, %err, "ignoring malformed init directive");
                        warnings.push(format!(
                            "line {}: ignoring malformed init directive: {err}",
                            idx + 1
                        ));
                    }
                }
            }
            continue;
        }
        if trimmed_line.starts_with("%%") {
            continue;
        }
        if !seen_content && HEADER_RE.is_match(trimmed_line) {
            seen_content = true;
            continue;
        }
        seen_content = true;
        lines.push(SourceLine {
            number: idx + 1,
            text: raw_line.trim_end().to_string(),
        });
    }

    (lines, init_config)
}

fn join_lines(lines: &[SourceLine]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(&line.text);
        text.push('\n');
    }
    text
}

fn parse_rows(lines: &[SourceLine], warnings: &mut Vec<String>) -> Result<GraphSpec> {
    let mut graph = GraphSpec::new();
    for line in lines {
        let row = strip_trailing_comment(&line.text);
        if row.is_empty() {
            continue;
        }
        let parts = split_args(&row);
        if parts.len() != 3 {
            tracing::warn!(
                line = line.number,
                fields = parts.len(),
                "skipping sankey row without exactly three fields"
            );
            warnings.push(format!(
                "line {}: skipping `{}`: expected 3 fields, found {}",
                line.number,
                line.text.trim(),
                parts.len()
            ));
            continue;
        }
        let source = strip_quotes(&parts[0]);
        let target = strip_quotes(&parts[1]);
        if source.is_empty() || target.is_empty() {
            tracing::warn!(line = line.number, "skipping sankey row with an empty node name");
            warnings.push(format!(
                "line {}: skipping `{}`: empty node name",
                line.number,
                line.text.trim()
            ));
            continue;
        }
        let raw_value = strip_quotes(&parts[2]);
        let value = raw_value.parse::<f64>().map_err(|_| {
            anyhow!(
                "line {}: invalid flow value `{}` in `{}`",
                line.number,
                raw_value,
                line.text.trim()
            )
        })?;
        graph.add_link(&source, &target, value);
    }
    Ok(graph)
}

/// Splits a row on commas outside double quotes. Empty fields are kept so
/// the row arity stays visible.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for ch in input.chars() {
        if ch == '"' {
            quoted = !quoted;
            current.push(ch);
            continue;
        }
        if ch == ',' && !quoted {
            args.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(ch);
    }
    args.push(current.trim().to_string());
    args
}

fn strip_trailing_comment(line: &str) -> String {
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            quoted = !quoted;
        } else if !quoted && ch == '%' && chars.peek() == Some(&'%') {
            break;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Removes surrounding double quotes and unescapes `""`.
fn strip_quotes(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"").trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Bodies of the fenced sankey blocks of a Markdown document, in order.
pub fn extract_sankey_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut current = Vec::new();
    let mut fence = String::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if !in_block {
            if let Some(start_fence) = detect_sankey_fence(trimmed) {
                in_block = true;
                fence = start_fence;
            }
            continue;
        }
        if is_fence_end(trimmed, &fence) {
            in_block = false;
            blocks.push(current.join("\n"));
            current.clear();
            continue;
        }
        current.push(line.to_string());
    }

    blocks
}

/// Opening fence of a ```` ```sankey ```` or ```` ```sankey-beta ```` block.
fn detect_sankey_fence(line: &str) -> Option<String> {
    for marker in ["```", "~~~"] {
        if !line.starts_with(marker) {
            continue;
        }
        let fence_char = marker.chars().next().unwrap_or('`');
        let rest = line.trim_start_matches(fence_char).trim();
        let info = rest.split_whitespace().next().unwrap_or("");
        if info.eq_ignore_ascii_case("sankey") || info.eq_ignore_ascii_case("sankey-beta") {
            return Some(marker.to_string());
        }
    }
    None
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    if !line.starts_with(fence) {
        return false;
    }
    line[fence.len()..].trim().is_empty()
}
