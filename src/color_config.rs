//! Helpers for building and checking V1 color configs

use crate::error::{ConvertError, Result};
use crate::types::{ColorConfig, ThemeColorRef, ThemeColorType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Partial color config; `Some` fields override the base in [`merge_color_config`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConfigPatch {
    pub color: Option<String>,
    pub theme_color: Option<ThemeColorRef>,
    pub color_type: Option<ThemeColorType>,
    pub color_index: Option<i32>,
    pub opacity: Option<f64>,
}

/// Wrap a color string in a config carrying only `color`
pub fn string_to_color_config(color: &str) -> ColorConfig {
    ColorConfig::plain(color)
}

pub fn color_config_to_string(config: &ColorConfig) -> String {
    config.color.clone()
}

/// Build a theme-bound color config
///
/// Sets `colorType` and a structured `themeColor { color, type }`.
///
/// # Returns
/// * `Ok(ColorConfig)` - The populated config
/// * `Err(ConvertError::InvalidInput)` - If `color` is empty
pub fn create_theme_color_config(
    color: &str,
    color_type: ThemeColorType,
    color_index: Option<i32>,
    opacity: Option<f64>,
) -> Result<ColorConfig> {
    if color.is_empty() {
        return Err(ConvertError::InvalidInput(
            "theme color config requires a non-empty color".to_string(),
        ));
    }

    Ok(ColorConfig {
        color: color.to_string(),
        theme_color: Some(ThemeColorRef {
            color: color.to_string(),
            kind: color_type,
        }),
        color_type: Some(color_type),
        color_index,
        opacity,
    })
}

pub fn is_theme_color(config: &ColorConfig) -> bool {
    config.color_type.is_some() || config.theme_color.is_some()
}

pub fn merge_color_config(base: &ColorConfig, patch: ColorConfigPatch) -> ColorConfig {
    ColorConfig {
        color: patch.color.unwrap_or_else(|| base.color.clone()),
        theme_color: patch.theme_color.or_else(|| base.theme_color.clone()),
        color_type: patch.color_type.or(base.color_type),
        color_index: patch.color_index.or(base.color_index),
        opacity: patch.opacity.or(base.opacity),
    }
}

/// Check that an untyped value is a well-formed color config
///
/// Requires a string `color`. When present, `themeColor` must be an object
/// with string `color` and `type`, `colorType` a string, `colorIndex` a
/// number and `opacity` a number in `[0, 1]`.
pub fn validate_color_config(value: &JsonValue) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };

    if !map.get("color").is_some_and(|v| v.is_string()) {
        return false;
    }

    if let Some(theme) = map.get("themeColor") {
        let Some(theme) = theme.as_object() else {
            return false;
        };
        let strings = ["color", "type"]
            .iter()
            .all(|key| theme.get(*key).is_some_and(|v| v.is_string()));
        if !strings {
            return false;
        }
    }

    if map.get("colorType").is_some_and(|v| !v.is_string()) {
        return false;
    }
    if map.get("colorIndex").is_some_and(|v| !v.is_number()) {
        return false;
    }

    match map.get("opacity") {
        None => true,
        Some(opacity) => opacity.as_f64().is_some_and(|o| (0.0..=1.0).contains(&o)),
    }
}
