//! Version-agnostic element wrappers
//!
//! [`UnifiedElement`] holds one element of unknown version together with the
//! version detected at construction. Setters are copy-on-write: they consume
//! the wrapper and return an updated one, so no two wrappers ever alias the
//! same data.

use crate::adapter::{to_v1, to_v2};
use crate::detect::classify;
use crate::error::Result;
use crate::types::Version;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::borrow::Cow;

/// Canvas position and size of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Partial position update; `None` fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Per-version element counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VersionStats {
    pub v1: usize,
    pub v2: usize,
    pub total: usize,
}

/// One element of unknown version
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedElement {
    data: JsonValue,
    version: Version,
}

impl UnifiedElement {
    pub fn new(data: JsonValue) -> Self {
        let version = classify(&data);
        Self { data, version }
    }

    /// The element in V1 form; borrowed when already V1
    pub fn as_v1(&self) -> Result<Cow<'_, JsonValue>> {
        match self.version {
            Version::V1 => Ok(Cow::Borrowed(&self.data)),
            Version::V2 => to_v1(&self.data),
        }
    }

    /// The element in V2 form; `None` when it has no V2 representation
    pub fn as_v2(&self) -> Result<Option<Cow<'_, JsonValue>>> {
        match self.version {
            Version::V2 => Ok(Some(Cow::Borrowed(&self.data))),
            Version::V1 => to_v2(&self.data),
        }
    }

    /// Materialize the element in the requested version
    pub fn as_version(&self, version: Version) -> Result<Option<Cow<'_, JsonValue>>> {
        match version {
            Version::V1 => self.as_v1().map(Some),
            Version::V2 => self.as_v2(),
        }
    }

    pub fn raw(&self) -> &JsonValue {
        &self.data
    }

    pub fn into_raw(self) -> JsonValue {
        self.data
    }

    /// Version detected at construction
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn id(&self) -> Option<&str> {
        self.data.get("id").and_then(|v| v.as_str())
    }

    pub fn element_type(&self) -> Option<&str> {
        self.data.get("type").and_then(|v| v.as_str())
    }

    /// Position and size; missing fields read as 0
    pub fn position(&self) -> Position {
        Position {
            left: self.number("left"),
            top: self.number("top"),
            width: self.number("width"),
            height: self.number("height"),
        }
    }

    /// Merge a partial position into the element
    pub fn with_position(mut self, patch: PositionPatch) -> Self {
        let fields = [
            ("left", patch.left),
            ("top", patch.top),
            ("width", patch.width),
            ("height", patch.height),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                self.set(key, json!(value));
            }
        }
        self
    }

    pub fn rotation(&self) -> f64 {
        self.number("rotate")
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.set("rotate", json!(degrees));
        self
    }

    pub fn is_locked(&self) -> bool {
        self.data.get("lock").and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.set("lock", JsonValue::Bool(locked));
        self
    }

    pub fn group_id(&self) -> Option<&str> {
        self.data.get("groupId").and_then(|v| v.as_str())
    }

    /// Set or clear the group id
    pub fn with_group_id(mut self, group_id: Option<&str>) -> Self {
        match group_id {
            Some(id) => self.set("groupId", json!(id)),
            None => {
                if let Some(obj) = self.data.as_object_mut() {
                    obj.remove("groupId");
                }
            }
        }
        self
    }

    fn number(&self, key: &str) -> f64 {
        self.data.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    /// Non-object payloads are left alone
    fn set(&mut self, key: &str, value: JsonValue) {
        if let Some(obj) = self.data.as_object_mut() {
            obj.insert(key.to_string(), value);
        }
    }
}

impl From<JsonValue> for UnifiedElement {
    fn from(data: JsonValue) -> Self {
        Self::new(data)
    }
}

/// Ordered collection of wrapped elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedElementCollection {
    elements: Vec<UnifiedElement>,
}

impl UnifiedElementCollection {
    pub fn new(elements: Vec<JsonValue>) -> Self {
        Self {
            elements: elements.into_iter().map(UnifiedElement::new).collect(),
        }
    }

    /// Wrap a borrowed slice, copying each element
    pub fn from_slice(elements: &[JsonValue]) -> Self {
        Self::new(elements.to_vec())
    }

    pub fn add(&mut self, element: impl Into<UnifiedElement>) {
        self.elements.push(element.into());
    }

    /// Remove the first element with the given id
    pub fn remove(&mut self, id: &str) -> bool {
        match self.elements.iter().position(|el| el.id() == Some(id)) {
            Some(index) => {
                self.elements.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&UnifiedElement> {
        self.elements.iter().find(|el| el.id() == Some(id))
    }

    pub fn filter_by_type(&self, element_type: &str) -> Vec<&UnifiedElement> {
        self.elements
            .iter()
            .filter(|el| el.element_type() == Some(element_type))
            .collect()
    }

    pub fn all(&self) -> &[UnifiedElement] {
        &self.elements
    }

    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Every element in V1 form; the first unsupported element fails the batch
    pub fn as_v1_array(&self) -> Result<Vec<JsonValue>> {
        self.elements
            .iter()
            .map(|el| el.as_v1().map(Cow::into_owned))
            .collect()
    }

    /// Every element in V2 form, dropping those without V2 representation
    pub fn as_v2_array(&self) -> Result<Vec<JsonValue>> {
        let mut converted = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            if let Some(value) = element.as_v2()? {
                converted.push(value.into_owned());
            }
        }
        Ok(converted)
    }

    pub fn version_stats(&self) -> VersionStats {
        let v1 = self
            .elements
            .iter()
            .filter(|el| el.version() == Version::V1)
            .count();
        VersionStats {
            v1,
            v2: self.elements.len() - v1,
            total: self.elements.len(),
        }
    }

    /// Replace every element, in order, with `update(element)`
    pub fn batch_update<F>(&mut self, mut update: F)
    where
        F: FnMut(UnifiedElement) -> UnifiedElement,
    {
        self.elements = std::mem::take(&mut self.elements)
            .into_iter()
            .map(&mut update)
            .collect();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedElement> {
        self.elements.iter()
    }

    /// Raw element data, in order
    pub fn to_json(&self) -> Vec<JsonValue> {
        self.elements.iter().map(|el| el.raw().clone()).collect()
    }
}

impl<'a> IntoIterator for &'a UnifiedElementCollection {
    type Item = &'a UnifiedElement;
    type IntoIter = std::slice::Iter<'a, UnifiedElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl IntoIterator for UnifiedElementCollection {
    type Item = UnifiedElement;
    type IntoIter = std::vec::IntoIter<UnifiedElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl FromIterator<JsonValue> for UnifiedElementCollection {
    fn from_iter<I: IntoIterator<Item = JsonValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
