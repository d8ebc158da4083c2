use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema generation of an element, inferred from its structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    /// Legacy schema with theme-aware color objects and provenance metadata
    V1,
    /// Standardized schema with plain string colors
    V2,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V1 => "v1",
            Version::V2 => "v2",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version of a whole collection of elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusVersion {
    V1,
    V2,
    Mixed,
}

/// Element discriminator, read from the `type` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Shape,
    Image,
    Line,
    Chart,
    Table,
    Latex,
    Video,
    Audio,
    /// V1-only AI placeholder without a V2 equivalent
    None,
    /// Unrecognized or missing type tag
    Unknown(String),
}

impl ElementKind {
    /// Parse a `type` tag. A missing tag becomes `Unknown("undefined")`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("text") => ElementKind::Text,
            Some("shape") => ElementKind::Shape,
            Some("image") => ElementKind::Image,
            Some("line") => ElementKind::Line,
            Some("chart") => ElementKind::Chart,
            Some("table") => ElementKind::Table,
            Some("latex") => ElementKind::Latex,
            Some("video") => ElementKind::Video,
            Some("audio") => ElementKind::Audio,
            Some("none") => ElementKind::None,
            Some(other) => ElementKind::Unknown(other.to_string()),
            None => ElementKind::Unknown("undefined".to_string()),
        }
    }

    /// Read the kind of a JSON element
    pub fn of(element: &serde_json::Value) -> Self {
        Self::from_tag(element.get("type").and_then(|v| v.as_str()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Shape => "shape",
            ElementKind::Image => "image",
            ElementKind::Line => "line",
            ElementKind::Chart => "chart",
            ElementKind::Table => "table",
            ElementKind::Latex => "latex",
            ElementKind::Video => "video",
            ElementKind::Audio => "audio",
            ElementKind::None => "none",
            ElementKind::Unknown(tag) => tag,
        }
    }
}

/// Named palette slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColorType {
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Dk1,
    Dk2,
    Lt1,
    Lt2,
}

/// Structured theme reference inside a V1 color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColorRef {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: ThemeColorType,
}

/// V1 color value: resolved color plus optional theme metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConfig {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<ThemeColorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_type: Option<ThemeColorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ColorConfig {
    /// Color config carrying only a resolved color
    pub fn plain(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
}

impl GradientType {
    /// Lenient parse: anything other than "radial" is linear
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("radial") => GradientType::Radial,
            _ => GradientType::Linear,
        }
    }
}

/// One stop of a V2 gradient ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientColor {
    /// Position along the ramp, 0-100
    pub pos: f64,
    pub color: String,
}

/// V2 gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientType,
    pub colors: Vec<GradientColor>,
    pub rotate: f64,
}

/// V1 gradient: always exactly two theme-aware colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1Gradient {
    #[serde(rename = "type")]
    pub kind: GradientType,
    pub theme_color: [ColorConfig; 2],
    pub rotate: f64,
}

/// V2 element shadow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub h: f64,
    pub v: f64,
    pub blur: f64,
    pub color: String,
}

/// V1 element shadow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1Shadow {
    pub h: f64,
    pub v: f64,
    pub blur: f64,
    pub theme_color: ColorConfig,
}

/// V2 element outline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// V1 element outline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1Outline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<ColorConfig>,
}
