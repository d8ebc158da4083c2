use super::color::{
    color_to_v1, color_to_v2, gradient_to_v1, gradient_to_v2, outline_to_v1, outline_to_v2,
    shadow_to_v1, shadow_to_v2, DEFAULT_COLOR,
};
use crate::error::{ConvertError, Result};
use crate::types::ElementKind;
use serde_json::{json, Map, Value as JsonValue};

type JsonMap = Map<String, JsonValue>;

/// Business/provenance metadata that only exists on V1 elements
pub const V1_METADATA_KEYS: [&str; 4] = ["tag", "index", "from", "isDefault"];

/// Convert any V1 element to V2, dispatching on its `type`
///
/// # Returns
/// * `Ok(Some(JsonValue))` - Converted text, shape, image or line element
/// * `Ok(None)` - `none` or unrecognized type: no V2 representation exists
/// * `Err(ConvertError)` - If a nested gradient fails validation
pub fn element_to_v2(element: &JsonValue) -> Result<Option<JsonValue>> {
    let converted = match ElementKind::of(element) {
        ElementKind::Text => text_to_v2(element)?,
        ElementKind::Shape => shape_to_v2(element)?,
        ElementKind::Image => image_to_v2(element),
        ElementKind::Line => line_to_v2(element)?,
        _ => return Ok(None),
    };
    Ok(Some(converted))
}

/// Convert any V2 element to V1, dispatching on its `type`
///
/// Unlike [`element_to_v2`] there is no "no representation" result: any type
/// other than text, shape, image or line is an error naming the type.
pub fn element_to_v1(element: &JsonValue) -> Result<JsonValue> {
    match ElementKind::of(element) {
        ElementKind::Text => text_to_v1(element),
        ElementKind::Shape => shape_to_v1(element),
        ElementKind::Image => Ok(image_to_v1(element)),
        ElementKind::Line => line_to_v1(element),
        other => Err(ConvertError::UnsupportedElementType(other.as_str().to_string())),
    }
}

/// Convert a batch of V1 elements, dropping the ones without a V2 representation
pub fn elements_to_v2(elements: &[JsonValue]) -> Result<Vec<JsonValue>> {
    let mut converted = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(value) = element_to_v2(element)? {
            converted.push(value);
        }
    }
    Ok(converted)
}

/// Convert a batch of V2 elements; the first unsupported element aborts the batch
pub fn elements_to_v1(elements: &[JsonValue]) -> Result<Vec<JsonValue>> {
    elements.iter().map(element_to_v1).collect()
}

/// V1 text → V2 text
///
/// Drops V1 metadata and `enableShrink`, resolves `defaultColor`, renames
/// `themeFill` to `fill` and defaults `textType` to `content`.
pub fn text_to_v2(element: &JsonValue) -> Result<JsonValue> {
    let mut map = v1_base(element, &["enableShrink"]);

    let default_color = map.remove("defaultColor");
    map.insert(
        "defaultColor".to_string(),
        JsonValue::String(color_to_v2(default_color.as_ref())),
    );

    if let Some(fill) = map.remove("themeFill").filter(|v| !v.is_null()) {
        map.insert("fill".to_string(), JsonValue::String(color_to_v2(Some(&fill))));
    }

    styling_to_v2(&mut map)?;
    map.entry("textType").or_insert_with(|| json!("content"));

    Ok(JsonValue::Object(map))
}

/// V1 shape → V2 shape
///
/// A non-string `path` (V1 allows command arrays) is serialized to a JSON string.
pub fn shape_to_v2(element: &JsonValue) -> Result<JsonValue> {
    let mut map = v1_base(element, &["keypoint"]);

    if let Some(path) = map.get_mut("path").filter(|p| !p.is_string() && !p.is_null()) {
        *path = JsonValue::String(serde_json::to_string(&*path)?);
    }

    let fill = map.remove("themeFill");
    map.insert("fill".to_string(), JsonValue::String(color_to_v2(fill.as_ref())));

    if let Some(gradient) = map.remove("gradient").filter(|v| !v.is_null()) {
        let gradient = if is_v2_gradient(&gradient) {
            gradient
        } else {
            serde_json::to_value(gradient_to_v2(&gradient)?)?
        };
        map.insert("gradient".to_string(), gradient);
    }

    styling_to_v2(&mut map)?;
    Ok(JsonValue::Object(map))
}

/// V1 image → V2 image
pub fn image_to_v2(element: &JsonValue) -> JsonValue {
    let mut map = v1_base(element, &["size", "loading"]);
    map.entry("fixedRatio").or_insert(JsonValue::Bool(false));
    JsonValue::Object(map)
}

/// V1 line → V2 line
///
/// `themeColor` becomes `color` and `lineWidth` becomes `width` (1 when unset or zero).
pub fn line_to_v2(element: &JsonValue) -> Result<JsonValue> {
    let mut map = v1_base(element, &[]);

    let color = map.remove("themeColor");
    map.insert("color".to_string(), JsonValue::String(color_to_v2(color.as_ref())));

    let width = map
        .remove("lineWidth")
        .and_then(|v| v.as_f64())
        .filter(|w| *w != 0.0)
        .unwrap_or(1.0);
    map.insert("width".to_string(), json!(width));

    styling_to_v2(&mut map)?;
    Ok(JsonValue::Object(map))
}

/// V2 text → V1 text
pub fn text_to_v1(element: &JsonValue) -> Result<JsonValue> {
    let mut map = v2_base(element, &["textType"]);

    let default_color = map.remove("defaultColor");
    map.insert("defaultColor".to_string(), color_field_to_v1(default_color)?);

    if let Some(fill) = map.remove("fill").filter(|v| !v.is_null()) {
        map.insert("themeFill".to_string(), color_field_to_v1(Some(fill))?);
    }

    styling_to_v1(&mut map)?;
    map.entry("enableShrink").or_insert(JsonValue::Bool(false));
    Ok(JsonValue::Object(map))
}

/// V2 shape → V1 shape
pub fn shape_to_v1(element: &JsonValue) -> Result<JsonValue> {
    let mut map = v2_base(element, &[]);

    let fill = map.remove("fill");
    map.insert("themeFill".to_string(), color_field_to_v1(fill)?);

    if let Some(gradient) = map.remove("gradient").filter(|v| !v.is_null()) {
        let gradient = if is_v2_gradient(&gradient) {
            serde_json::to_value(gradient_to_v1(&gradient))?
        } else {
            gradient
        };
        map.insert("gradient".to_string(), gradient);
    }

    styling_to_v1(&mut map)?;
    Ok(JsonValue::Object(map))
}

/// V2 image → V1 image
pub fn image_to_v1(element: &JsonValue) -> JsonValue {
    let mut map = v2_base(element, &["imageType"]);
    map.insert("loading".to_string(), JsonValue::Bool(false));
    JsonValue::Object(map)
}

/// V2 line → V1 line
///
/// Fills in the geometry V1 requires: height 2, rotate 0, start `[0, 0]`
/// and end `[100, 100]` when missing.
pub fn line_to_v1(element: &JsonValue) -> Result<JsonValue> {
    let mut map = v2_base(element, &[]);

    if map.get("height").and_then(|v| v.as_f64()).unwrap_or(0.0) == 0.0 {
        map.insert("height".to_string(), json!(2));
    }
    if map.get("rotate").and_then(|v| v.as_f64()).is_none() {
        map.insert("rotate".to_string(), json!(0));
    }
    if !map.get("start").is_some_and(|v| v.is_array()) {
        map.insert("start".to_string(), json!([0, 0]));
    }
    if !map.get("end").is_some_and(|v| v.is_array()) {
        map.insert("end".to_string(), json!([100, 100]));
    }

    let color = map.remove("color");
    map.insert("themeColor".to_string(), color_field_to_v1(color)?);

    if let Some(width) = map.get("width").cloned() {
        map.insert("lineWidth".to_string(), width);
    }

    styling_to_v1(&mut map)?;
    Ok(JsonValue::Object(map))
}

/// Copy an element's fields without V1 metadata and the given V1-only keys
fn v1_base(element: &JsonValue, extra: &[&str]) -> JsonMap {
    let mut map = element.as_object().cloned().unwrap_or_default();
    for key in V1_METADATA_KEYS.iter().chain(extra) {
        map.remove(*key);
    }
    map
}

/// Copy an element's fields without the given V2-only keys, marking it as V1
fn v2_base(element: &JsonValue, extra: &[&str]) -> JsonMap {
    let mut map = element.as_object().cloned().unwrap_or_default();
    for key in extra {
        map.remove(*key);
    }
    map.entry("isDefault").or_insert(JsonValue::Bool(false));
    map
}

/// A V2 color string becomes a color config; an existing object is kept
fn color_field_to_v1(value: Option<JsonValue>) -> Result<JsonValue> {
    match value {
        Some(JsonValue::Object(map)) => Ok(JsonValue::Object(map)),
        Some(JsonValue::String(s)) => Ok(serde_json::to_value(color_to_v1(&s))?),
        _ => Ok(serde_json::to_value(color_to_v1(DEFAULT_COLOR))?),
    }
}

fn is_v2_gradient(gradient: &JsonValue) -> bool {
    gradient.get("colors").is_some_and(|v| v.is_array())
        && !gradient.get("themeColor").is_some_and(|v| v.is_array())
}

/// Already-V2 styling: a string `color` and no `themeColor`
fn has_v2_color(style: &JsonValue) -> bool {
    style.get("color").is_some_and(|v| v.is_string()) && style.get("themeColor").is_none()
}

fn styling_to_v2(map: &mut JsonMap) -> Result<()> {
    if let Some(shadow) = map.get("shadow").filter(|s| !has_v2_color(s)) {
        match shadow_to_v2(Some(shadow)) {
            Some(converted) => {
                let converted = serde_json::to_value(converted)?;
                map.insert("shadow".to_string(), converted);
            }
            None => {
                map.remove("shadow");
            }
        }
    }

    if let Some(outline) = map.get("outline").filter(|o| !has_v2_color(o)) {
        match outline_to_v2(Some(outline)) {
            Some(converted) => {
                let converted = serde_json::to_value(converted)?;
                map.insert("outline".to_string(), converted);
            }
            None => {
                map.remove("outline");
            }
        }
    }

    Ok(())
}

fn styling_to_v1(map: &mut JsonMap) -> Result<()> {
    if let Some(shadow) = map.get("shadow").filter(|s| s.get("themeColor").is_none()) {
        match shadow_to_v1(Some(shadow)) {
            Some(converted) => {
                let converted = serde_json::to_value(converted)?;
                map.insert("shadow".to_string(), converted);
            }
            None => {
                map.remove("shadow");
            }
        }
    }

    if let Some(outline) = map.get("outline").filter(|o| o.get("themeColor").is_none()) {
        match outline_to_v1(Some(outline)) {
            Some(converted) => {
                let converted = serde_json::to_value(converted)?;
                map.insert("outline".to_string(), converted);
            }
            None => {
                map.remove("outline");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_text() -> JsonValue {
        json!({
            "id": "text-1",
            "type": "text",
            "left": 100, "top": 100, "width": 200, "height": 50, "rotate": 0,
            "content": "Hello World",
            "defaultFontName": "Arial",
            "defaultColor": {"color": "#000000", "themeColor": {"color": "#000000", "type": "dk1"}},
            "themeFill": {"color": "#ffffff"},
            "lineHeight": 1.5,
            "fit": "none",
            "enableShrink": true,
            "tag": "title",
            "index": 1,
            "from": "user",
            "isDefault": false
        })
    }

    fn v1_shape() -> JsonValue {
        json!({
            "id": "shape-1",
            "type": "shape",
            "left": 50, "top": 200, "width": 300, "height": 200, "rotate": 15,
            "viewBox": [0, 0],
            "path": "M0,0 L300,0 L300,200 L0,200 Z",
            "fixedRatio": false,
            "themeFill": {"color": "#4285f4"},
            "gradient": {
                "type": "linear",
                "themeColor": [{"color": "#4285f4"}, {"color": "#34a853"}],
                "rotate": 45
            },
            "keypoint": 50,
            "tag": "background-shape"
        })
    }

    #[test]
    fn test_text_to_v2() {
        let result = text_to_v2(&v1_text()).unwrap();

        assert_eq!(result["id"], "text-1");
        assert_eq!(result["content"], "Hello World");
        assert_eq!(result["defaultColor"], "#000000");
        assert_eq!(result["fill"], "#ffffff");
        assert_eq!(result["textType"], "content");
        for key in ["tag", "index", "from", "isDefault", "enableShrink", "themeFill"] {
            assert!(result.get(key).is_none(), "{} should be stripped", key);
        }
    }

    #[test]
    fn test_text_to_v2_missing_fields() {
        let result = text_to_v2(&json!({"id": "text-1", "type": "text", "left": 100, "top": 100})).unwrap();
        assert_eq!(result["id"], "text-1");
        assert_eq!(result["defaultColor"], "#000000");
        assert!(result.get("fill").is_none());
    }

    #[test]
    fn test_text_to_v2_converts_shadow_and_outline() {
        let mut element = v1_text();
        element["shadow"] = json!({"h": 1, "v": 2, "blur": 3, "themeColor": {"color": "#333333"}});
        element["outline"] = json!({"style": "solid", "width": 1, "themeColor": {"color": "#444444"}});

        let result = text_to_v2(&element).unwrap();
        assert_eq!(result["shadow"]["color"], "#333333");
        assert!(result["shadow"].get("themeColor").is_none());
        assert_eq!(result["outline"]["color"], "#444444");
    }

    #[test]
    fn test_shape_to_v2() {
        let result = shape_to_v2(&v1_shape()).unwrap();

        assert_eq!(result["fill"], "#4285f4");
        assert_eq!(result["gradient"]["colors"].as_array().unwrap().len(), 2);
        assert_eq!(result["gradient"]["colors"][1]["color"], "#34a853");
        assert_eq!(result["gradient"]["colors"][1]["pos"].as_f64(), Some(100.0));
        assert!(result.get("keypoint").is_none());
        assert!(result.get("themeFill").is_none());
        assert!(result.get("tag").is_none());
    }

    #[test]
    fn test_shape_to_v2_serializes_array_path() {
        let mut element = v1_shape();
        element["path"] = json!([["M", 0, 0], ["L", 10, 10]]);
        let result = shape_to_v2(&element).unwrap();
        assert_eq!(result["path"], json!(r#"[["M",0,0],["L",10,10]]"#));

        let result = shape_to_v2(&v1_shape()).unwrap();
        assert_eq!(result["path"], v1_shape()["path"]);
    }

    #[test]
    fn test_shape_to_v2_bad_gradient_fails() {
        let mut element = v1_shape();
        element["gradient"]["themeColor"] = json!([{"color": "#fff"}]);
        assert!(matches!(
            shape_to_v2(&element),
            Err(ConvertError::GradientTooFewColors { found: 1 })
        ));
    }

    #[test]
    fn test_image_to_v2_fixed_ratio() {
        let element = json!({"id": "img-1", "type": "image", "src": "a.png", "size": "medium", "loading": true, "tag": "x"});
        let result = image_to_v2(&element);
        assert_eq!(result["fixedRatio"], false);
        assert!(result.get("size").is_none());
        assert!(result.get("loading").is_none());

        let element = json!({"id": "img-1", "type": "image", "src": "a.png", "fixedRatio": true});
        assert_eq!(image_to_v2(&element)["fixedRatio"], true);
    }

    #[test]
    fn test_line_to_v2() {
        let element = json!({
            "id": "line-1", "type": "line",
            "left": 0, "top": 0, "width": 100, "height": 2, "rotate": 0,
            "start": [0, 0], "end": [100, 0],
            "themeColor": {"color": "#ff0000"},
            "lineWidth": 3,
            "style": "solid",
            "tag": "divider"
        });
        let result = line_to_v2(&element).unwrap();
        assert_eq!(result["color"], "#ff0000");
        assert_eq!(result["width"].as_f64(), Some(3.0));
        assert_eq!(result["end"], json!([100, 0]));
        assert!(result.get("themeColor").is_none());
        assert!(result.get("lineWidth").is_none());

        let result = line_to_v2(&json!({"id": "l", "type": "line"})).unwrap();
        assert_eq!(result["width"].as_f64(), Some(1.0));
    }

    #[test]
    fn test_element_to_v2_unsupported_returns_none() {
        assert!(element_to_v2(&json!({"id": "n", "type": "none", "tag": "ai"})).unwrap().is_none());
        assert!(element_to_v2(&json!({"id": "u", "type": "unknown-type"})).unwrap().is_none());
        assert!(element_to_v2(&json!({"id": "c", "type": "chart"})).unwrap().is_none());
    }

    #[test]
    fn test_elements_to_v2_filters_nulls() {
        let elements = vec![
            v1_text(),
            json!({"id": "none-1", "type": "none"}),
            json!({"id": "unknown-1", "type": "unknown"}),
        ];
        let result = elements_to_v2(&elements).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["id"], "text-1");
    }

    #[test]
    fn test_element_to_v1_unsupported_type_errors() {
        let err = element_to_v1(&json!({"id": "c", "type": "chart"})).unwrap_err();
        assert!(err.to_string().contains("chart"));

        let err = element_to_v1(&json!({"id": "test"})).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedElementType(_)));
    }

    #[test]
    fn test_elements_to_v1_aborts_on_first_error() {
        let elements = vec![
            json!({"id": "t", "type": "text", "defaultColor": "#000"}),
            json!({"id": "v", "type": "video"}),
        ];
        assert!(elements_to_v1(&elements).is_err());
    }

    #[test]
    fn test_text_round_trip() {
        let v2 = text_to_v2(&v1_text()).unwrap();
        let back = text_to_v1(&v2).unwrap();

        assert_eq!(back["id"], "text-1");
        assert_eq!(back["content"], "Hello World");
        assert_eq!(back["defaultColor"], json!({"color": "#000000"}));
        assert_eq!(back["themeFill"]["color"], "#ffffff");
        assert_eq!(back["lineHeight"], 1.5);
        assert_eq!(back["enableShrink"], false);
        assert_eq!(back["isDefault"], false);
        assert!(back.get("fill").is_none());
        assert!(back.get("textType").is_none());
    }

    #[test]
    fn test_shape_to_v1() {
        let element = json!({
            "id": "s", "type": "shape",
            "fill": "#4285f4",
            "gradient": {"type": "radial", "colors": [{"pos": 0, "color": "#111111"}], "rotate": 10},
            "shadow": {"h": 1, "v": 1, "blur": 2, "color": "#222222"}
        });
        let result = shape_to_v1(&element).unwrap();
        assert_eq!(result["themeFill"], json!({"color": "#4285f4"}));
        assert_eq!(result["gradient"]["themeColor"][1]["color"], "#111111");
        assert_eq!(result["shadow"]["themeColor"]["color"], "#222222");
        assert!(result.get("fill").is_none());
    }

    #[test]
    fn test_image_to_v1() {
        let element = json!({"id": "i", "type": "image", "src": "a.png", "fixedRatio": true, "imageType": "content"});
        let result = image_to_v1(&element);
        assert_eq!(result["loading"], false);
        assert_eq!(result["fixedRatio"], true);
        assert!(result.get("imageType").is_none());
    }

    #[test]
    fn test_line_to_v1_defaults() {
        let element = json!({"id": "l", "type": "line", "left": 0, "top": 0, "width": 4, "color": "#00ff00"});
        let result = line_to_v1(&element).unwrap();
        assert_eq!(result["height"], 2);
        assert_eq!(result["rotate"], 0);
        assert_eq!(result["start"], json!([0, 0]));
        assert_eq!(result["end"], json!([100, 100]));
        assert_eq!(result["themeColor"], json!({"color": "#00ff00"}));
        assert_eq!(result["lineWidth"], 4);
    }

    #[test]
    fn test_conversion_does_not_mutate_input() {
        let original = v1_text();
        let snapshot = original.clone();
        let _ = text_to_v2(&original).unwrap();
        assert_eq!(original, snapshot);
    }
}
