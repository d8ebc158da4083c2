use crate::convert::{element_to_v1, element_to_v2};
use crate::detect::is_v1_element;
use crate::error::Result;
use serde_json::Value as JsonValue;
use std::borrow::Cow;

/// Bring an element of unknown version to V2
///
/// Already-V2 elements are returned borrowed, untouched.
///
/// # Returns
/// * `Ok(Some(Cow::Borrowed))` - Element was already V2
/// * `Ok(Some(Cow::Owned))` - Converted V1 element
/// * `Ok(None)` - Null input, or a V1 element without V2 representation
/// * `Err(ConvertError)` - If a nested gradient fails validation
pub fn to_v2(element: &JsonValue) -> Result<Option<Cow<'_, JsonValue>>> {
    if element.is_null() {
        return Ok(None);
    }
    if is_v1_element(element) {
        return Ok(element_to_v2(element)?.map(Cow::Owned));
    }
    Ok(Some(Cow::Borrowed(element)))
}

/// Bring an element of unknown version to V1
///
/// Fails for V2 element types that have no V1 form.
pub fn to_v1(element: &JsonValue) -> Result<Cow<'_, JsonValue>> {
    if is_v1_element(element) {
        return Ok(Cow::Borrowed(element));
    }
    Ok(Cow::Owned(element_to_v1(element)?))
}

/// Bring a batch to V2, dropping nulls and elements without V2 representation
pub fn all_to_v2(elements: &[JsonValue]) -> Result<Vec<JsonValue>> {
    let mut converted = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(value) = to_v2(element)? {
            converted.push(value.into_owned());
        }
    }
    Ok(converted)
}

/// Bring a batch to V1; the first failure aborts the batch
pub fn all_to_v1(elements: &[JsonValue]) -> Result<Vec<JsonValue>> {
    elements
        .iter()
        .map(|el| to_v1(el).map(Cow::into_owned))
        .collect()
}
