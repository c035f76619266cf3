use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const CLASSIC_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const MODERN_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

const NAMED_COLORS: [&str; 149] = [
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "transparent", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});
static FUNC_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:rgba?|hsla?)\(\s*-?[\d.]+%?\s*(?:,\s*-?[\d.]+%?\s*){2,3}\)$").unwrap()
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub background: String,
    /// Link stroke used when links are not coloured by an endpoint.
    pub link_color: String,
    pub node_stroke: String,
    pub palette: Vec<String>,
}

impl Theme {
    /// Plain look: white page, black translucent links.
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 10.0,
            text_color: "#000000".to_string(),
            background: "white".to_string(),
            link_color: "black".to_string(),
            node_stroke: "none".to_string(),
            palette: CLASSIC_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            link_color: "#7A8AA6".to_string(),
            node_stroke: "none".to_string(),
            palette: MODERN_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "base" => Some(Self::classic()),
            _ => None,
        }
    }

    /// Picks the fill for the node at `index`: the declared colour when it is
    /// a usable CSS colour, the palette entry otherwise.
    pub fn node_color(&self, declared: Option<&str>, index: usize) -> String {
        if let Some(color) = declared.map(str::trim) {
            if is_valid_color(color) {
                return normalize_color(color);
            }
            tracing::debug!(color, "ignoring invalid node colour");
        }
        if self.palette.is_empty() {
            return self.link_color.clone();
        }
        self.palette[index % self.palette.len()].clone()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

pub fn is_valid_color(color: &str) -> bool {
    let color = color.trim();
    if color.is_empty() {
        return false;
    }
    if HEX_COLOR_RE.is_match(color) || FUNC_COLOR_RE.is_match(color) {
        return true;
    }
    let lower = color.to_ascii_lowercase();
    NAMED_COLORS.binary_search(&lower.as_str()).is_ok()
}

fn normalize_color(color: &str) -> String {
    if color.starts_with('#') {
        color.to_string()
    } else {
        color.to_ascii_lowercase()
    }
}
