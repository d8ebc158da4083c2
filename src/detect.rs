//! Structural version detection
//!
//! Elements carry no version tag, so the version is guessed from their shape.
//! An element is V1 when any signal in [`V1_SIGNALS`] matches; everything else,
//! including empty or malformed objects, is V2.

use crate::convert::V1_METADATA_KEYS;
use crate::types::{CorpusVersion, Version};
use serde_json::{Map, Value as JsonValue};

/// Color fields that hold a `ColorConfig` object on V1 elements
const V1_COLOR_FIELDS: [&str; 2] = ["defaultColor", "themeFill"];

/// A named structural predicate that marks an element as V1
pub struct V1Signal {
    pub name: &'static str,
    pub matches: fn(&Map<String, JsonValue>) -> bool,
}

/// Ordered V1 detection rules
pub const V1_SIGNALS: &[V1Signal] = &[
    V1Signal {
        name: "legacy-metadata",
        matches: has_legacy_metadata,
    },
    V1Signal {
        name: "color-config-object",
        matches: has_color_config_object,
    },
    V1Signal {
        name: "tuple-gradient",
        matches: has_tuple_gradient,
    },
];

/// Any of `tag`, `index`, `from`, `isDefault` is present
fn has_legacy_metadata(map: &Map<String, JsonValue>) -> bool {
    V1_METADATA_KEYS.iter().any(|key| map.contains_key(*key))
}

/// A designated color field holds an object with both `color` and `themeColor`
fn has_color_config_object(map: &Map<String, JsonValue>) -> bool {
    V1_COLOR_FIELDS.iter().any(|field| {
        map.get(*field)
            .and_then(|v| v.as_object())
            .is_some_and(|obj| obj.contains_key("color") && obj.contains_key("themeColor"))
    })
}

/// `gradient.themeColor` is an array
fn has_tuple_gradient(map: &Map<String, JsonValue>) -> bool {
    map.get("gradient")
        .and_then(|g| g.get("themeColor"))
        .is_some_and(|v| v.is_array())
}

/// Classify an element's schema version
///
/// Non-objects (null, numbers, strings, ...) classify as V2.
pub fn classify(element: &JsonValue) -> Version {
    if is_v1_element(element) {
        Version::V1
    } else {
        Version::V2
    }
}

/// Check whether an element looks like a V1 element
pub fn is_v1_element(element: &JsonValue) -> bool {
    element
        .as_object()
        .is_some_and(|map| V1_SIGNALS.iter().any(|signal| (signal.matches)(map)))
}

/// V2 is the fallback classification: anything that is not V1
pub fn is_v2_element(element: &JsonValue) -> bool {
    !is_v1_element(element)
}

/// Names of the V1 signals an element matches, in rule order
pub fn matched_signals(element: &JsonValue) -> Vec<&'static str> {
    match element.as_object() {
        Some(map) => V1_SIGNALS
            .iter()
            .filter(|signal| (signal.matches)(map))
            .map(|signal| signal.name)
            .collect(),
        None => Vec::new(),
    }
}

/// Detect the version of a collection of elements
///
/// An empty collection is V2.
pub fn detect_elements_version(elements: &[JsonValue]) -> CorpusVersion {
    let v1_count = elements.iter().filter(|el| is_v1_element(el)).count();

    if v1_count == 0 {
        CorpusVersion::V2
    } else if v1_count == elements.len() {
        CorpusVersion::V1
    } else {
        CorpusVersion::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_metadata_marks_v1() {
        for key in ["tag", "index", "from", "isDefault"] {
            let mut element = json!({"id": "x", "type": "text"});
            element[key] = json!(null);
            assert!(is_v1_element(&element), "{} should mark V1", key);
        }
    }

    #[test]
    fn test_non_objects_are_not_v1() {
        for value in [json!(null), json!(42), json!("str"), json!(true), json!([])] {
            assert!(!is_v1_element(&value));
            assert!(is_v2_element(&value));
        }
    }

    #[test]
    fn test_empty_object_is_v2() {
        assert!(!is_v1_element(&json!({})));
        assert_eq!(classify(&json!({})), Version::V2);
    }

    #[test]
    fn test_color_config_object_marks_v1() {
        let element = json!({
            "id": "text-1",
            "defaultColor": {"color": "#000000", "themeColor": {"color": "#000000", "type": "dk1"}}
        });
        assert!(is_v1_element(&element));
        assert_eq!(matched_signals(&element), vec!["color-config-object"]);
    }

    #[test]
    fn test_malformed_color_is_not_v1() {
        let element = json!({"id": "test", "defaultColor": {"invalidProp": "value"}});
        assert!(!is_v1_element(&element));
    }

    #[test]
    fn test_tuple_gradient_marks_v1() {
        let element = json!({
            "id": "shape-1",
            "gradient": {"type": "linear", "themeColor": [{"color": "#f00"}, {"color": "#00f"}], "rotate": 0}
        });
        assert!(is_v1_element(&element));

        let malformed = json!({"id": "test", "gradient": {"type": "linear", "invalidProp": "value"}});
        assert!(!is_v1_element(&malformed));
    }

    #[test]
    fn test_v2_element_is_not_v1() {
        let element = json!({
            "id": "text-1", "type": "text",
            "defaultColor": "#000000",
            "gradient": {"type": "linear", "colors": [], "rotate": 0}
        });
        assert!(!is_v1_element(&element));
        assert!(matched_signals(&element).is_empty());
    }

    #[test]
    fn test_detect_elements_version() {
        let v1 = json!({"id": "1", "tag": "title"});
        let v2 = json!({"id": "2", "defaultColor": "#000"});

        assert_eq!(detect_elements_version(&[]), CorpusVersion::V2);
        assert_eq!(detect_elements_version(&[v1.clone(), v1.clone()]), CorpusVersion::V1);
        assert_eq!(detect_elements_version(&[v2.clone()]), CorpusVersion::V2);
        assert_eq!(detect_elements_version(&[v1, v2]), CorpusVersion::Mixed);
    }
}
