use crate::adapter::{all_to_v1, all_to_v2};
use crate::convert::{color_to_v1, color_to_v2, gradient_to_v1, gradient_to_v2};
use crate::error::Result;
use serde_json::{json, Value as JsonValue};

/// Default background image sizing
const DEFAULT_IMAGE_SIZE: &str = "cover";

/// Convert a slide to V2
///
/// Returns a new slide with its `elements` brought to V2 (elements without a V2
/// representation are dropped) and its `background` converted. All other slide
/// fields are carried over unchanged.
///
/// # Arguments
/// * `slide` - Slide object with `elements` and optional `background`
///
/// # Returns
/// * `Ok(JsonValue)` - Converted slide
/// * `Err(ConvertError)` - If an element or background gradient fails validation
pub fn slide_to_v2(slide: &JsonValue) -> Result<JsonValue> {
    let mut slide = slide.clone();

    if let Some(obj) = slide.as_object_mut() {
        if let Some(elements) = obj.get("elements").and_then(|v| v.as_array()) {
            let converted = all_to_v2(elements)?;
            obj.insert("elements".to_string(), JsonValue::Array(converted));
        }

        if let Some(background) = obj.get("background").filter(|v| !v.is_null()) {
            let converted = background_to_v2(background)?;
            obj.insert("background".to_string(), converted);
        }
    }

    Ok(slide)
}

/// Convert a slide to V1
///
/// Fails on the first element whose type has no V1 form.
pub fn slide_to_v1(slide: &JsonValue) -> Result<JsonValue> {
    let mut slide = slide.clone();

    if let Some(obj) = slide.as_object_mut() {
        if let Some(elements) = obj.get("elements").and_then(|v| v.as_array()) {
            let converted = all_to_v1(elements)?;
            obj.insert("elements".to_string(), JsonValue::Array(converted));
        }

        if let Some(background) = obj.get("background").filter(|v| !v.is_null()) {
            let converted = background_to_v1(background)?;
            obj.insert("background".to_string(), converted);
        }
    }

    Ok(slide)
}

/// Convert a V1 slide background to V2
///
/// - solid: `themeColor` config → `color` string
/// - image: flat `image` + `imageSize` → `image: {src, size}`
/// - gradient: flat `gradientType` / `gradientColor` / `gradientRotate` → `gradient`
///
/// Backgrounds already in V2 shape are returned unchanged.
pub fn background_to_v2(background: &JsonValue) -> Result<JsonValue> {
    let kind = background.get("type").and_then(|v| v.as_str());

    let converted = match kind {
        Some("solid") if background.get("themeColor").is_some() => json!({
            "type": "solid",
            "color": color_to_v2(background.get("themeColor")),
        }),
        Some("image") if background.get("image").is_some_and(|v| v.is_string()) => json!({
            "type": "image",
            "image": {
                "src": background["image"],
                "size": background
                    .get("imageSize")
                    .and_then(|v| v.as_str())
                    .unwrap_or(DEFAULT_IMAGE_SIZE),
            },
        }),
        Some("gradient") if background.get("gradientColor").is_some() => {
            let v1_gradient = json!({
                "type": background.get("gradientType").cloned().unwrap_or(JsonValue::Null),
                "themeColor": background["gradientColor"],
                "rotate": background.get("gradientRotate").cloned().unwrap_or(json!(0)),
            });
            json!({
                "type": "gradient",
                "gradient": serde_json::to_value(gradient_to_v2(&v1_gradient)?)?,
            })
        }
        _ => background.clone(),
    };

    Ok(converted)
}

/// Convert a V2 slide background to V1
pub fn background_to_v1(background: &JsonValue) -> Result<JsonValue> {
    let kind = background.get("type").and_then(|v| v.as_str());

    let converted = match kind {
        Some("solid") if background.get("color").is_some_and(|v| v.is_string()) => {
            let color = background["color"].as_str().unwrap_or_default();
            json!({
                "type": "solid",
                "themeColor": serde_json::to_value(color_to_v1(color))?,
            })
        }
        Some("image") if background.get("image").is_some_and(|v| v.is_object()) => {
            let image = &background["image"];
            json!({
                "type": "image",
                "image": image.get("src").cloned().unwrap_or(JsonValue::Null),
                "imageSize": image
                    .get("size")
                    .and_then(|v| v.as_str())
                    .unwrap_or(DEFAULT_IMAGE_SIZE),
            })
        }
        Some("gradient") if background.get("gradient").is_some_and(|v| v.is_object()) => {
            let gradient = gradient_to_v1(&background["gradient"]);
            json!({
                "type": "gradient",
                "gradientType": gradient.kind,
                "gradientColor": serde_json::to_value(&gradient.theme_color)?,
                "gradientRotate": gradient.rotate,
            })
        }
        _ => background.clone(),
    };

    Ok(converted)
}
