//! Corpus and gradient compatibility checks

use crate::convert::{gradient_to_v1, gradient_to_v2};
use crate::error::Result;
use crate::types::Version;
use crate::unified::{UnifiedElementCollection, VersionStats};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Outcome of [`check_compatibility`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Check a collection for version mixing and V1-only element kinds
///
/// The collection is compatible when no issue is raised.
pub fn check_compatibility(elements: &[JsonValue]) -> CompatibilityReport {
    let collection = UnifiedElementCollection::from_slice(elements);
    let stats = collection.version_stats();
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if stats.v1 > 0 && stats.v2 > 0 {
        issues.push(format!(
            "Mixed versions detected: {} V1 elements, {} V2 elements",
            stats.v1, stats.v2
        ));
        recommendations.push("Normalize all elements to V2 for best compatibility".to_string());
    }

    let none_count = collection
        .iter()
        .filter(|el| el.version() == Version::V1 && el.element_type() == Some("none"))
        .count();
    if none_count > 0 {
        issues.push(format!(
            "Found {} V1-only 'none' elements, which V2 does not support",
            none_count
        ));
        recommendations
            .push("Convert 'none' elements to text or another V2 element type, or drop them".to_string());
    }

    CompatibilityReport {
        compatible: issues.is_empty(),
        issues,
        recommendations,
    }
}

/// Per-version counts before normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OriginalStats {
    pub v1: usize,
    pub v2: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub original: OriginalStats,
    pub converted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Normalized {
    pub converted: Vec<JsonValue>,
    pub stats: NormalizeStats,
}

/// Bring a mixed collection to one version
///
/// Toward V2, elements without a V2 form are dropped and counted as skipped.
/// Toward V1, the first unsupported element fails the whole call.
pub fn normalize_to_version(elements: &[JsonValue], target: Version) -> Result<Normalized> {
    let collection = UnifiedElementCollection::from_slice(elements);
    let VersionStats { v1, v2, total } = collection.version_stats();

    let converted = match target {
        Version::V1 => collection.as_v1_array()?,
        Version::V2 => collection.as_v2_array()?,
    };

    Ok(Normalized {
        stats: NormalizeStats {
            original: OriginalStats { v1, v2 },
            converted: converted.len(),
            skipped: total - converted.len(),
        },
        converted,
    })
}

/// Version of a standalone gradient value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientVersion {
    V1,
    V2,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientReport {
    pub version: GradientVersion,
    pub valid: bool,
    pub issues: Vec<String>,
}

fn is_v1_gradient(gradient: &JsonValue) -> bool {
    gradient.get("themeColor").is_some_and(|v| v.is_array())
}

/// Convert a gradient to `target`, detecting its current version
///
/// A gradient already in the target shape is returned as-is.
pub fn smart_convert_gradient(gradient: &JsonValue, target: Version) -> Result<JsonValue> {
    match (is_v1_gradient(gradient), target) {
        (true, Version::V2) => Ok(serde_json::to_value(gradient_to_v2(gradient)?)?),
        (false, Version::V1) => Ok(serde_json::to_value(gradient_to_v1(gradient))?),
        _ => Ok(gradient.clone()),
    }
}

/// Validate a gradient's structure against its detected version
///
/// V1 gradients need exactly two entries, each with `color` or `themeColor`.
/// V2 gradients need at least two stops with a numeric `pos` and string `color`.
pub fn check_gradient_compatibility(gradient: &JsonValue) -> GradientReport {
    let mut issues = Vec::new();

    let version = if let Some(entries) = gradient.get("themeColor").and_then(|v| v.as_array()) {
        if entries.len() != 2 {
            issues.push(format!(
                "V1 gradient must contain exactly 2 colors, found {}",
                entries.len()
            ));
        }
        for (index, entry) in entries.iter().enumerate() {
            let has_color = ["color", "themeColor"]
                .iter()
                .any(|key| entry.get(*key).is_some_and(is_truthy));
            if !has_color {
                issues.push(format!(
                    "V1 gradient color {} is missing color or themeColor",
                    index + 1
                ));
            }
        }
        GradientVersion::V1
    } else if let Some(stops) = gradient.get("colors").and_then(|v| v.as_array()) {
        if stops.len() < 2 {
            issues.push(format!(
                "V2 gradient must contain at least 2 colors, found {}",
                stops.len()
            ));
        }
        for (index, stop) in stops.iter().enumerate() {
            let well_formed = stop.get("pos").is_some_and(|v| v.is_number())
                && stop.get("color").is_some_and(|v| v.is_string());
            if !well_formed {
                issues.push(format!("V2 gradient stop {} is malformed", index + 1));
            }
        }
        GradientVersion::V2
    } else {
        issues.push("Unrecognized gradient format".to_string());
        GradientVersion::Unknown
    };

    GradientReport {
        version,
        valid: issues.is_empty(),
        issues,
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}
