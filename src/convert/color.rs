use crate::error::{ConvertError, Result};
use crate::types::{
    ColorConfig, Gradient, GradientColor, GradientType, Outline, Shadow, V1Gradient, V1Outline,
    V1Shadow,
};
use serde_json::Value as JsonValue;

/// Color used whenever a V1 color cannot be resolved
pub const DEFAULT_COLOR: &str = "#000000";

/// Color used for the second stop of an empty V2 gradient
const DEFAULT_SECOND_STOP: &str = "#FFFFFF";

/// Resolve a V1 color value to a V2 color string
///
/// Resolution order:
/// - the `color` field when it is a non-empty string
/// - `themeColor.color` (structured theme reference)
/// - `themeColor` itself when it is a bare string (legacy form)
/// - `#000000`
///
/// A bare non-empty string is accepted as an already-resolved color.
/// Never fails.
///
/// # Examples
/// ```
/// use slidever::convert::color_to_v2;
/// use serde_json::json;
///
/// let config = json!({"color": "", "themeColor": {"color": "#00ff00", "type": "accent1"}});
/// assert_eq!(color_to_v2(Some(&config)), "#00ff00");
/// assert_eq!(color_to_v2(None), "#000000");
/// ```
pub fn color_to_v2(config: Option<&JsonValue>) -> String {
    let Some(value) = config else {
        return DEFAULT_COLOR.to_string();
    };

    match value {
        JsonValue::String(s) if !s.is_empty() => s.clone(),
        JsonValue::Object(map) => {
            if let Some(color) = non_empty_str(map.get("color")) {
                return color.to_string();
            }

            match map.get("themeColor") {
                Some(JsonValue::Object(theme)) => non_empty_str(theme.get("color"))
                    .unwrap_or(DEFAULT_COLOR)
                    .to_string(),
                Some(legacy) => non_empty_str(Some(legacy))
                    .unwrap_or(DEFAULT_COLOR)
                    .to_string(),
                None => DEFAULT_COLOR.to_string(),
            }
        }
        _ => DEFAULT_COLOR.to_string(),
    }
}

/// Wrap a V2 color string in a V1 color config
///
/// Only `color` is populated; theme metadata is not reconstructed.
pub fn color_to_v1(color: &str) -> ColorConfig {
    ColorConfig::plain(color)
}

/// Convert a V1 gradient (`themeColor` pair) to a V2 gradient (`colors` stops)
///
/// # Returns
/// * `Ok(Gradient)` - Stops at positions `i * 100`
/// * `Err(ConvertError::GradientTooFewColors)` - If `themeColor` is missing or holds fewer than 2 entries
pub fn gradient_to_v2(gradient: &JsonValue) -> Result<Gradient> {
    let theme_colors = gradient
        .get("themeColor")
        .and_then(|v| v.as_array())
        .map(|arr| arr.as_slice())
        .unwrap_or(&[]);

    if theme_colors.len() < 2 {
        return Err(ConvertError::GradientTooFewColors {
            found: theme_colors.len(),
        });
    }

    let colors = theme_colors
        .iter()
        .enumerate()
        .map(|(i, config)| GradientColor {
            pos: (i * 100) as f64,
            color: color_to_v2(Some(config)),
        })
        .collect();

    Ok(Gradient {
        kind: GradientType::from_tag(gradient.get("type").and_then(|v| v.as_str())),
        colors,
        rotate: number_or_zero(gradient.get("rotate")),
    })
}

/// Convert a V2 gradient to a V1 gradient
///
/// Keeps the first two stops. A single stop is duplicated; an empty stop list
/// falls back to black and white. Never fails.
pub fn gradient_to_v1(gradient: &JsonValue) -> V1Gradient {
    let stops: Vec<&str> = gradient
        .get("colors")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .take(2)
                .map(|stop| stop.get("color").and_then(|c| c.as_str()).unwrap_or(DEFAULT_COLOR))
                .collect()
        })
        .unwrap_or_default();

    let (first, second) = match stops.as_slice() {
        [] => (DEFAULT_COLOR, DEFAULT_SECOND_STOP),
        [only] => (*only, *only),
        [first, second, ..] => (*first, *second),
    };

    V1Gradient {
        kind: GradientType::from_tag(gradient.get("type").and_then(|v| v.as_str())),
        theme_color: [color_to_v1(first), color_to_v1(second)],
        rotate: number_or_zero(gradient.get("rotate")),
    }
}

/// Convert a V1 shadow (`themeColor` object) to a V2 shadow (`color` string)
///
/// Absent input stays absent.
pub fn shadow_to_v2(shadow: Option<&JsonValue>) -> Option<Shadow> {
    let shadow = present(shadow)?;
    Some(Shadow {
        h: number_or_zero(shadow.get("h")),
        v: number_or_zero(shadow.get("v")),
        blur: number_or_zero(shadow.get("blur")),
        color: color_to_v2(shadow.get("themeColor")),
    })
}

/// Convert a V2 shadow to a V1 shadow
pub fn shadow_to_v1(shadow: Option<&JsonValue>) -> Option<V1Shadow> {
    let shadow = present(shadow)?;
    Some(V1Shadow {
        h: number_or_zero(shadow.get("h")),
        v: number_or_zero(shadow.get("v")),
        blur: number_or_zero(shadow.get("blur")),
        theme_color: color_to_v1(
            shadow
                .get("color")
                .and_then(|c| c.as_str())
                .unwrap_or(DEFAULT_COLOR),
        ),
    })
}

/// Convert a V1 outline to a V2 outline
///
/// The color always resolves (missing `themeColor` gives `#000000`);
/// `style` and `width` stay absent when absent.
pub fn outline_to_v2(outline: Option<&JsonValue>) -> Option<Outline> {
    let outline = present(outline)?;
    Some(Outline {
        style: outline.get("style").and_then(|v| v.as_str()).map(str::to_string),
        width: outline.get("width").and_then(|v| v.as_f64()),
        color: Some(color_to_v2(outline.get("themeColor"))),
    })
}

/// Convert a V2 outline to a V1 outline
pub fn outline_to_v1(outline: Option<&JsonValue>) -> Option<V1Outline> {
    let outline = present(outline)?;
    Some(V1Outline {
        style: outline.get("style").and_then(|v| v.as_str()).map(str::to_string),
        width: outline.get("width").and_then(|v| v.as_f64()),
        theme_color: outline
            .get("color")
            .and_then(|v| v.as_str())
            .map(color_to_v1),
    })
}

/// Treat JSON null the same as a missing field
fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}

fn non_empty_str(value: Option<&JsonValue>) -> Option<&str> {
    value.and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn number_or_zero(value: Option<&JsonValue>) -> f64 {
    value.and_then(|v| v.as_f64()).unwrap_or(0.0)
}
