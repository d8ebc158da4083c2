//! Opt-in identity-keyed memoization of conversions
//!
//! Repeated conversion of the *same* `Rc<JsonValue>` returns the *same* output
//! `Rc`. Equal but distinct inputs are converted independently. Each cache
//! keeps its inputs alive, so a pointer address cannot be reused for another
//! value while its entry exists.
//!
//! Outputs are shared: callers must clone before mutating them.

use crate::convert::{color_to_v2, element_to_v1, element_to_v2};
use crate::error::Result;
use serde_json::Value as JsonValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Cache mapping an input's identity to a computed output
pub struct IdentityCache<V> {
    entries: RefCell<HashMap<*const JsonValue, (Rc<JsonValue>, V)>>,
}

impl<V: Clone> IdentityCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Return the cached output for `input`, computing it on first use
    ///
    /// Errors are not cached.
    pub fn get_or_try_insert<F>(&self, input: &Rc<JsonValue>, compute: F) -> Result<V>
    where
        F: FnOnce(&JsonValue) -> Result<V>,
    {
        let key = Rc::as_ptr(input);
        if let Some((_, cached)) = self.entries.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let value = compute(input.as_ref())?;
        self.entries
            .borrow_mut()
            .insert(key, (Rc::clone(input), value.clone()));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<V: Clone> Default for IdentityCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoizing front-end for the color and element converters
///
/// Produces the same values as the plain functions in [`crate::convert`].
/// Caches are unbounded and pin their inputs, so long-lived callers must call
/// [`MemoizedConverter::clear`] periodically.
#[derive(Default)]
pub struct MemoizedConverter {
    colors: IdentityCache<Rc<str>>,
    to_v2: IdentityCache<Option<Rc<JsonValue>>>,
    to_v1: IdentityCache<Rc<JsonValue>>,
}

impl MemoizedConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized [`color_to_v2`]
    pub fn color_to_v2(&self, config: &Rc<JsonValue>) -> Rc<str> {
        // color_to_v2 never fails
        self.colors
            .get_or_try_insert(config, |value| Ok(Rc::from(color_to_v2(Some(value)))))
            .unwrap_or_else(|_| Rc::from(crate::convert::DEFAULT_COLOR))
    }

    /// Memoized [`element_to_v2`]
    pub fn element_to_v2(&self, element: &Rc<JsonValue>) -> Result<Option<Rc<JsonValue>>> {
        self.to_v2
            .get_or_try_insert(element, |value| Ok(element_to_v2(value)?.map(Rc::new)))
    }

    /// Memoized [`element_to_v1`]
    pub fn element_to_v1(&self, element: &Rc<JsonValue>) -> Result<Rc<JsonValue>> {
        self.to_v1
            .get_or_try_insert(element, |value| Ok(Rc::new(element_to_v1(value)?)))
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.colors.clear();
        self.to_v2.clear();
        self.to_v1.clear();
    }
}
