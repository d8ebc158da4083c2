//! Strategy-based version conversion
//!
//! A [`SmartVersionConverter`] holds a registry of named strategies. For each
//! element it picks the highest-priority strategy matching the element's
//! detected version, the target version and the strategy's own predicate, then
//! applies it under the configured [`ErrorHandling`] policy.

use crate::adapter::{to_v1, to_v2};
use crate::compat::check_compatibility;
use crate::convert::{shape_to_v2, text_to_v2};
use crate::detect::classify;
use crate::error::{ConvertError, Result};
use crate::types::{ElementKind, Version};
use crate::unified::UnifiedElementCollection;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub type ConvertFn = Arc<dyn Fn(&JsonValue) -> Result<Option<JsonValue>> + Send + Sync>;
pub type ValidateFn = Arc<dyn Fn(&JsonValue) -> bool + Send + Sync>;
pub type ConvertCallback = Box<dyn Fn(&JsonValue, &JsonValue) + Send + Sync>;
pub type ErrorCallback = Box<dyn Fn(&ConvertError, &JsonValue) + Send + Sync>;

/// Name reported for conversions produced by the generic adapter fallback
pub const FALLBACK_STRATEGY: &str = "adapter-fallback";

/// A named, prioritized conversion rule
#[derive(Clone)]
pub struct ConversionStrategy {
    pub name: String,
    pub description: String,
    pub from: Version,
    pub to: Version,
    /// Higher wins
    pub priority: i32,
    validate: Option<ValidateFn>,
    convert: ConvertFn,
}

impl ConversionStrategy {
    pub fn new<F>(name: impl Into<String>, from: Version, to: Version, convert: F) -> Self
    where
        F: Fn(&JsonValue) -> Result<Option<JsonValue>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            from,
            to,
            priority: 0,
            validate: None,
            convert: Arc::new(convert),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Restrict the strategy to elements accepted by `validate`
    pub fn with_validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&JsonValue) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Whether this strategy handles `element` going `from` → `to`
    pub fn accepts(&self, element: &JsonValue, from: Version, to: Version) -> bool {
        self.from == from
            && self.to == to
            && match &self.validate {
                Some(validate) => validate(element),
                None => true,
            }
    }

    pub fn convert(&self, element: &JsonValue) -> Result<Option<JsonValue>> {
        (self.convert)(element)
    }
}

impl fmt::Debug for ConversionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionStrategy")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("priority", &self.priority)
            .finish()
    }
}

/// What to do when a strategy fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandling {
    /// Propagate the error
    Throw,
    /// Drop the element
    #[default]
    Skip,
    /// Retry with the generic adapter
    Default,
}

pub struct ConversionOptions {
    pub error_handling: ErrorHandling,
    /// Keep elements with no applicable strategy in batch output
    pub preserve_unsupported: bool,
    /// Check that each result classifies as the target version
    pub validate: bool,
    pub custom_strategies: Vec<ConversionStrategy>,
    pub on_convert: Option<ConvertCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            error_handling: ErrorHandling::Skip,
            preserve_unsupported: false,
            validate: true,
            custom_strategies: Vec::new(),
            on_convert: None,
            on_error: None,
        }
    }
}

impl ConversionOptions {
    pub fn with_error_handling(mut self, error_handling: ErrorHandling) -> Self {
        self.error_handling = error_handling;
        self
    }

    pub fn with_preserve_unsupported(mut self, preserve: bool) -> Self {
        self.preserve_unsupported = preserve;
        self
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_strategy(mut self, strategy: ConversionStrategy) -> Self {
        self.custom_strategies.push(strategy);
        self
    }

    pub fn on_convert<F>(mut self, callback: F) -> Self
    where
        F: Fn(&JsonValue, &JsonValue) + Send + Sync + 'static,
    {
        self.on_convert = Some(Box::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ConvertError, &JsonValue) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }
}

/// Detailed result of converting one element
#[derive(Debug, Clone, PartialEq)]
pub enum SmartOutcome {
    /// Element already at the target version
    Unchanged,
    Converted { strategy: String, value: JsonValue },
    /// Element needs conversion but no strategy accepts it
    NoStrategy,
    /// The strategy ran but produced no element
    Empty { strategy: String },
    /// The strategy failed and the error was swallowed
    Failed { strategy: String, error: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchConversion {
    pub converted: Vec<JsonValue>,
    /// Inputs whose strategy produced nothing
    pub failed: Vec<JsonValue>,
    pub stats: BatchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewStatus {
    Convert,
    Skip,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewDetail {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: PreviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSummary {
    pub total: usize,
    pub will_convert: usize,
    pub will_skip: usize,
    pub will_fail: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionPreview {
    pub summary: PreviewSummary,
    pub details: Vec<PreviewDetail>,
}

/// Advisory target-version recommendation for a corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInference {
    pub recommended_version: Version,
    /// 0..=1
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

/// Point values used by [`SmartVersionConverter::infer_best_strategy`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceWeights {
    /// Share above which a version counts as the majority
    pub majority_threshold: f64,
    pub v2_majority: f64,
    pub v1_majority: f64,
    pub v2_features: f64,
    /// Awarded to V2 when the corpus is compatible, to V1 otherwise
    pub compatibility: f64,
    pub forward_bias: f64,
}

pub const INFERENCE_WEIGHTS: InferenceWeights = InferenceWeights {
    majority_threshold: 0.7,
    v2_majority: 40.0,
    v1_majority: 30.0,
    v2_features: 30.0,
    compatibility: 20.0,
    forward_bias: 10.0,
};

/// Fields only V2 elements carry
const V2_FEATURE_FIELDS: [&str; 3] = ["textType", "imageType", "pattern"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoConvertOutcome {
    pub converted: Vec<JsonValue>,
    pub strategy: Version,
    pub confidence: f64,
}

/// Strategy registry plus conversion options
pub struct SmartVersionConverter {
    strategies: Vec<ConversionStrategy>,
    options: ConversionOptions,
}

impl Default for SmartVersionConverter {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

impl SmartVersionConverter {
    /// Build a converter with the built-in strategies, then `options.custom_strategies`
    pub fn new(mut options: ConversionOptions) -> Self {
        let custom = std::mem::take(&mut options.custom_strategies);
        let mut converter = Self {
            strategies: Vec::new(),
            options,
        };
        for strategy in builtin_strategies().into_iter().chain(custom) {
            converter.register_strategy(strategy);
        }
        converter
    }

    /// Add a strategy, replacing any registered under the same name
    ///
    /// A replacement keeps the original's registration slot.
    pub fn register_strategy(&mut self, strategy: ConversionStrategy) {
        match self.strategies.iter_mut().find(|s| s.name == strategy.name) {
            Some(existing) => *existing = strategy,
            None => self.strategies.push(strategy),
        }
    }

    pub fn strategies(&self) -> &[ConversionStrategy] {
        &self.strategies
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Highest-priority strategy for bringing `element` to `target`
    ///
    /// `None` when the element is already at `target` or nothing accepts it.
    /// Ties go to the earliest registered strategy.
    pub fn applicable_strategy(&self, element: &JsonValue, target: Version) -> Option<&ConversionStrategy> {
        let current = classify(element);
        if current == target {
            return None;
        }

        let mut best: Option<&ConversionStrategy> = None;
        for strategy in self
            .strategies
            .iter()
            .filter(|s| s.accepts(element, current, target))
        {
            if !best.is_some_and(|b| strategy.priority <= b.priority) {
                best = Some(strategy);
            }
        }
        best
    }

    /// Convert one element and report exactly what happened
    ///
    /// # Returns
    /// * `Ok(SmartOutcome)` - Outcome of the conversion
    /// * `Err(ConvertError)` - Only under [`ErrorHandling::Throw`]
    pub fn smart_convert_outcome(&self, element: &JsonValue, target: Version) -> Result<SmartOutcome> {
        if classify(element) == target {
            return Ok(SmartOutcome::Unchanged);
        }

        let Some(strategy) = self.applicable_strategy(element, target) else {
            debug!("No strategy converts element to {}", target);
            return Ok(SmartOutcome::NoStrategy);
        };

        debug!("Converting element to {} with {}", target, strategy.name);
        match self.run_strategy(strategy, element, target) {
            Ok(Some(value)) => Ok(self.converted(element, strategy.name.clone(), value)),
            Ok(None) => Ok(SmartOutcome::Empty {
                strategy: strategy.name.clone(),
            }),
            Err(e) => self.handle_error(e, &strategy.name, element, target),
        }
    }

    /// Convert one element
    ///
    /// Elements already at `target`, or with no applicable strategy, come back
    /// unchanged. `None` means the conversion produced nothing or failed under
    /// [`ErrorHandling::Skip`].
    pub fn smart_convert(&self, element: &JsonValue, target: Version) -> Result<Option<JsonValue>> {
        Ok(match self.smart_convert_outcome(element, target)? {
            SmartOutcome::Unchanged | SmartOutcome::NoStrategy => Some(element.clone()),
            SmartOutcome::Converted { value, .. } => Some(value),
            SmartOutcome::Empty { .. } | SmartOutcome::Failed { .. } => None,
        })
    }

    /// Convert a batch, partitioning into converted, failed and skipped
    ///
    /// Elements already at `target` count as converted. Elements with no
    /// applicable strategy are skipped unless `preserve_unsupported` is set.
    pub fn smart_batch_convert(&self, elements: &[JsonValue], target: Version) -> Result<BatchConversion> {
        let mut converted = Vec::with_capacity(elements.len());
        let mut failed = Vec::new();
        let mut skipped = 0;

        for element in elements {
            match self.smart_convert_outcome(element, target)? {
                SmartOutcome::Unchanged => converted.push(element.clone()),
                SmartOutcome::Converted { value, .. } => converted.push(value),
                SmartOutcome::NoStrategy if self.options.preserve_unsupported => {
                    converted.push(element.clone())
                }
                SmartOutcome::NoStrategy => skipped += 1,
                SmartOutcome::Empty { .. } | SmartOutcome::Failed { .. } => {
                    failed.push(element.clone())
                }
            }
        }

        let stats = BatchStats {
            total: elements.len(),
            converted: converted.len(),
            failed: failed.len(),
            skipped,
        };
        debug!(
            "Batch to {}: {} converted, {} failed, {} skipped",
            target, stats.converted, stats.failed, stats.skipped
        );

        Ok(BatchConversion {
            converted,
            failed,
            stats,
        })
    }

    /// Recommend a target version for a corpus
    ///
    /// Advisory only: a fixed point-scoring heuristic over version shares,
    /// V2-only fields and the compatibility report, with a bias toward V2.
    /// Ties recommend V1.
    pub fn infer_best_strategy(&self, elements: &[JsonValue]) -> StrategyInference {
        let weights = INFERENCE_WEIGHTS;
        let collection = UnifiedElementCollection::from_slice(elements);
        let stats = collection.version_stats();
        let mut reasoning = Vec::new();
        let mut v1_score = 0.0;
        let mut v2_score = 0.0;

        let (v1_ratio, v2_ratio) = if stats.total == 0 {
            (0.0, 0.0)
        } else {
            (
                stats.v1 as f64 / stats.total as f64,
                stats.v2 as f64 / stats.total as f64,
            )
        };

        if v2_ratio > weights.majority_threshold {
            v2_score += weights.v2_majority;
            reasoning.push(format!("{}% of elements are already V2", (v2_ratio * 100.0).round()));
        }
        if v1_ratio > weights.majority_threshold {
            v1_score += weights.v1_majority;
            reasoning.push(format!("{}% of elements are V1", (v1_ratio * 100.0).round()));
        }

        let has_v2_features = collection
            .iter()
            .filter(|el| el.version() == Version::V2)
            .any(|el| V2_FEATURE_FIELDS.iter().any(|key| el.raw().get(*key).is_some()));
        if has_v2_features {
            v2_score += weights.v2_features;
            reasoning.push("V2-only features detected".to_string());
        }

        if check_compatibility(elements).compatible {
            v2_score += weights.compatibility;
            reasoning.push("Fully compatible with V2".to_string());
        } else {
            v1_score += weights.compatibility;
            reasoning.push("V2 compatibility issues found".to_string());
        }

        v2_score += weights.forward_bias;

        let recommended_version = if v2_score > v1_score {
            Version::V2
        } else {
            Version::V1
        };
        let max = f64::max(v1_score, v2_score);
        let confidence = if max == 0.0 {
            0.0
        } else {
            ((v2_score - v1_score).abs() / max).min(1.0)
        };
        reasoning.push(format!(
            "Recommend {} (confidence {}%)",
            recommended_version.as_str().to_uppercase(),
            (confidence * 100.0).round()
        ));

        StrategyInference {
            recommended_version,
            confidence,
            reasoning,
        }
    }

    /// Dry run: classify each element as convert, skip or fail
    pub fn preview_conversion(&self, elements: &[JsonValue], target: Version) -> ConversionPreview {
        let mut summary = PreviewSummary {
            total: elements.len(),
            ..Default::default()
        };
        let mut details = Vec::with_capacity(elements.len());

        for (index, element) in elements.iter().enumerate() {
            let id = element.get("id").and_then(|v| v.as_str()).map(str::to_string);
            let (status, strategy, reason) = if classify(element) == target {
                summary.will_skip += 1;
                (PreviewStatus::Skip, None, Some("Already at target version"))
            } else if let Some(strategy) = self.applicable_strategy(element, target) {
                summary.will_convert += 1;
                (PreviewStatus::Convert, Some(strategy.name.clone()), None)
            } else {
                summary.will_fail += 1;
                (PreviewStatus::Fail, None, Some("No applicable conversion strategy"))
            };

            details.push(PreviewDetail {
                index,
                id,
                status,
                strategy,
                reason: reason.map(str::to_string),
            });
        }

        ConversionPreview { summary, details }
    }

    fn run_strategy(
        &self,
        strategy: &ConversionStrategy,
        element: &JsonValue,
        target: Version,
    ) -> Result<Option<JsonValue>> {
        let result = strategy.convert(element)?;
        if self.options.validate {
            if let Some(value) = &result {
                let actual = classify(value);
                if actual != target {
                    return Err(ConvertError::VersionMismatch {
                        expected: target,
                        actual,
                    });
                }
            }
        }
        Ok(result)
    }

    fn converted(&self, element: &JsonValue, strategy: String, value: JsonValue) -> SmartOutcome {
        if let Some(callback) = &self.options.on_convert {
            callback(element, &value);
        }
        SmartOutcome::Converted { strategy, value }
    }

    fn handle_error(
        &self,
        error: ConvertError,
        strategy: &str,
        element: &JsonValue,
        target: Version,
    ) -> Result<SmartOutcome> {
        if let Some(callback) = &self.options.on_error {
            callback(&error, element);
        }

        match self.options.error_handling {
            ErrorHandling::Throw => Err(error),
            ErrorHandling::Skip => {
                warn!("Strategy {} failed, skipping element: {}", strategy, error);
                Ok(SmartOutcome::Failed {
                    strategy: strategy.to_string(),
                    error: error.to_string(),
                })
            }
            ErrorHandling::Default => {
                warn!("Strategy {} failed, falling back to adapter: {}", strategy, error);
                let fallback = match target {
                    Version::V2 => to_v2(element).map(|v| v.map(|cow| cow.into_owned())),
                    Version::V1 => to_v1(element).map(|cow| Some(cow.into_owned())),
                };
                match fallback {
                    Ok(Some(value)) => Ok(self.converted(element, FALLBACK_STRATEGY.to_string(), value)),
                    Ok(None) => Ok(SmartOutcome::Empty {
                        strategy: FALLBACK_STRATEGY.to_string(),
                    }),
                    Err(e) => Ok(SmartOutcome::Failed {
                        strategy: FALLBACK_STRATEGY.to_string(),
                        error: e.to_string(),
                    }),
                }
            }
        }
    }
}

fn is_kind(element: &JsonValue, kind: ElementKind) -> bool {
    ElementKind::of(element) == kind
}

fn builtin_strategies() -> Vec<ConversionStrategy> {
    vec![
        ConversionStrategy::new("v1-to-v2-text", Version::V1, Version::V2, |el| {
            text_to_v2(el).map(Some)
        })
        .with_description("V1 text element to V2")
        .with_priority(100)
        .with_validate(|el| is_kind(el, ElementKind::Text)),
        ConversionStrategy::new("v1-to-v2-shape", Version::V1, Version::V2, |el| {
            shape_to_v2(el).map(Some)
        })
        .with_description("V1 shape element to V2")
        .with_priority(100)
        .with_validate(|el| is_kind(el, ElementKind::Shape)),
        ConversionStrategy::new("v1-to-v2-generic", Version::V1, Version::V2, |el| {
            Ok(to_v2(el)?.map(|cow| cow.into_owned()))
        })
        .with_description("V1 image and line elements to V2")
        .with_priority(10)
        .with_validate(|el| is_kind(el, ElementKind::Image) || is_kind(el, ElementKind::Line)),
        ConversionStrategy::new("v2-to-v1-generic", Version::V2, Version::V1, |el| {
            Ok(Some(to_v1(el)?.into_owned()))
        })
        .with_description("V2 element to V1")
        .with_priority(50),
    ]
}

/// Default options: skip failures, validate results
pub fn standard_converter() -> SmartVersionConverter {
    SmartVersionConverter::default()
}

/// Skip failures and keep elements no strategy handles
pub fn conservative_converter() -> SmartVersionConverter {
    SmartVersionConverter::new(
        ConversionOptions::default()
            .with_error_handling(ErrorHandling::Skip)
            .with_preserve_unsupported(true)
            .with_validate(true),
    )
}

/// Fall back to the generic adapter on failure, without result validation
pub fn aggressive_converter() -> SmartVersionConverter {
    SmartVersionConverter::new(
        ConversionOptions::default()
            .with_error_handling(ErrorHandling::Default)
            .with_preserve_unsupported(false)
            .with_validate(false),
    )
}

/// Batch-convert to V2, keeping only the converted elements
pub fn to_v2_all(converter: &SmartVersionConverter, elements: &[JsonValue]) -> Result<Vec<JsonValue>> {
    Ok(converter.smart_batch_convert(elements, Version::V2)?.converted)
}

/// Batch-convert to V1, keeping only the converted elements
pub fn to_v1_all(converter: &SmartVersionConverter, elements: &[JsonValue]) -> Result<Vec<JsonValue>> {
    Ok(converter.smart_batch_convert(elements, Version::V1)?.converted)
}

/// Convert a corpus to the version [`SmartVersionConverter::infer_best_strategy`] recommends
pub fn auto_convert(converter: &SmartVersionConverter, elements: &[JsonValue]) -> Result<AutoConvertOutcome> {
    let inference = converter.infer_best_strategy(elements);
    let batch = converter.smart_batch_convert(elements, inference.recommended_version)?;
    Ok(AutoConvertOutcome {
        converted: batch.converted,
        strategy: inference.recommended_version,
        confidence: inference.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn v1_text() -> JsonValue {
        json!({
            "id": "text-1", "type": "text", "content": "Hello",
            "defaultColor": {"color": "#333333", "themeColor": {"color": "#333333", "type": "dk1"}},
            "tag": "title"
        })
    }

    fn v1_shape() -> JsonValue {
        json!({
            "id": "shape-1", "type": "shape", "path": "M 0 0 L 10 10",
            "themeFill": {"color": "#ff0000"},
            "gradient": {"type": "linear", "themeColor": [{"color": "#f00"}, {"color": "#00f"}], "rotate": 0},
            "index": 2
        })
    }

    fn v1_image() -> JsonValue {
        json!({"id": "image-1", "type": "image", "src": "a.png", "size": 1024, "from": "upload"})
    }

    fn v1_none() -> JsonValue {
        json!({"id": "none-1", "type": "none", "tag": "ai-placeholder"})
    }

    fn v2_image() -> JsonValue {
        json!({"id": "image-2", "type": "image", "src": "b.png", "fixedRatio": true})
    }

    fn passthrough(name: &str, priority: i32) -> ConversionStrategy {
        let tag = name.to_string();
        ConversionStrategy::new(name, Version::V2, Version::V1, move |el| {
            let mut out = el.clone();
            out["tag"] = json!(tag);
            Ok(Some(out))
        })
        .with_priority(priority)
    }

    #[test]
    fn test_builtin_strategy_selection() {
        let converter = standard_converter();
        let pick = |el: &JsonValue, target| {
            converter
                .applicable_strategy(el, target)
                .map(|s| s.name.clone())
        };

        assert_eq!(pick(&v1_text(), Version::V2).as_deref(), Some("v1-to-v2-text"));
        assert_eq!(pick(&v1_shape(), Version::V2).as_deref(), Some("v1-to-v2-shape"));
        assert_eq!(pick(&v1_image(), Version::V2).as_deref(), Some("v1-to-v2-generic"));
        assert_eq!(pick(&v1_none(), Version::V2), None);
        assert_eq!(pick(&v2_image(), Version::V1).as_deref(), Some("v2-to-v1-generic"));
        assert_eq!(pick(&v2_image(), Version::V2), None);
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_order() {
        let mut converter = standard_converter();
        converter.register_strategy(passthrough("low", 60));
        converter.register_strategy(passthrough("high", 90));
        assert_eq!(converter.applicable_strategy(&v2_image(), Version::V1).unwrap().name, "high");

        let mut converter = standard_converter();
        converter.register_strategy(passthrough("high", 90));
        converter.register_strategy(passthrough("low", 60));
        assert_eq!(converter.applicable_strategy(&v2_image(), Version::V1).unwrap().name, "high");
    }

    #[test]
    fn test_register_strategy_overwrites_by_name() {
        let mut converter = standard_converter();
        let count = converter.strategies().len();
        converter.register_strategy(passthrough("custom", 60));
        converter.register_strategy(passthrough("custom", 70));

        assert_eq!(converter.strategies().len(), count + 1);
        assert_eq!(converter.strategies()[count].priority, 70);
    }

    #[test]
    fn test_custom_strategies_from_options() {
        let converter = SmartVersionConverter::new(
            ConversionOptions::default().with_strategy(passthrough("custom", 80)),
        );
        let result = converter.smart_convert(&v2_image(), Version::V1).unwrap().unwrap();
        assert_eq!(result["tag"], "custom");
    }

    #[test]
    fn test_smart_convert_outcomes() {
        let converter = standard_converter();

        assert_eq!(
            converter.smart_convert_outcome(&v2_image(), Version::V2).unwrap(),
            SmartOutcome::Unchanged
        );
        assert_eq!(
            converter.smart_convert_outcome(&v1_none(), Version::V2).unwrap(),
            SmartOutcome::NoStrategy
        );
        match converter.smart_convert_outcome(&v1_text(), Version::V2).unwrap() {
            SmartOutcome::Converted { strategy, value } => {
                assert_eq!(strategy, "v1-to-v2-text");
                assert_eq!(value["defaultColor"], "#333333");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_smart_convert_no_strategy_returns_input() {
        let converter = standard_converter();
        let none = v1_none();
        assert_eq!(converter.smart_convert(&none, Version::V2).unwrap(), Some(none));
    }

    #[test]
    fn test_batch_migration() {
        let converter = standard_converter();
        let elements = [v1_text(), v1_shape(), v1_image(), v1_none()];
        let result = converter.smart_batch_convert(&elements, Version::V2).unwrap();

        assert_eq!(result.converted.len(), 3);
        assert!(result.failed.is_empty());
        assert_eq!(
            result.stats,
            BatchStats { total: 4, converted: 3, failed: 0, skipped: 1 }
        );
        assert!(result.converted.iter().all(|el| classify(el) == Version::V2));
    }

    #[test]
    fn test_preserve_unsupported_keeps_none() {
        let converter = conservative_converter();
        let result = converter
            .smart_batch_convert(&[v1_text(), v1_none()], Version::V2)
            .unwrap();
        assert_eq!(result.stats.converted, 2);
        assert_eq!(result.stats.skipped, 0);
        assert_eq!(result.converted[1]["type"], "none");
    }

    #[test]
    fn test_error_handling_skip() {
        let broken = json!({
            "id": "s", "type": "shape",
            "gradient": {"type": "linear", "themeColor": [{"color": "#f00"}], "rotate": 0}
        });
        let errors = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&errors);
        let converter = SmartVersionConverter::new(ConversionOptions::default().on_error(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(matches!(
            converter.smart_convert_outcome(&broken, Version::V2).unwrap(),
            SmartOutcome::Failed { .. }
        ));
        assert_eq!(converter.smart_convert(&broken, Version::V2).unwrap(), None);
        assert_eq!(errors.load(Ordering::SeqCst), 2);

        let batch = converter.smart_batch_convert(&[broken], Version::V2).unwrap();
        assert_eq!(batch.stats.failed, 1);
    }

    #[test]
    fn test_error_handling_throw() {
        let broken = json!({
            "id": "s", "type": "shape",
            "gradient": {"type": "linear", "themeColor": [], "rotate": 0}
        });
        let converter = SmartVersionConverter::new(
            ConversionOptions::default().with_error_handling(ErrorHandling::Throw),
        );
        assert!(matches!(
            converter.smart_convert(&broken, Version::V2),
            Err(ConvertError::GradientTooFewColors { found: 0 })
        ));
    }

    #[test]
    fn test_error_handling_default_falls_back_to_adapter() {
        let failing = ConversionStrategy::new("broken-image", Version::V1, Version::V2, |_| {
            Err(ConvertError::InvalidInput("boom".to_string()))
        })
        .with_priority(200)
        .with_validate(|el| el["type"] == "image");

        let converter = SmartVersionConverter::new(
            ConversionOptions::default()
                .with_error_handling(ErrorHandling::Default)
                .with_strategy(failing),
        );

        match converter.smart_convert_outcome(&v1_image(), Version::V2).unwrap() {
            SmartOutcome::Converted { strategy, value } => {
                assert_eq!(strategy, FALLBACK_STRATEGY);
                assert!(value.get("size").is_none());
                assert_eq!(value["fixedRatio"], false);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_result_validation() {
        let lazy = ConversionStrategy::new("identity", Version::V2, Version::V1, |el| Ok(Some(el.clone())))
            .with_priority(99);

        let strict = SmartVersionConverter::new(
            ConversionOptions::default()
                .with_error_handling(ErrorHandling::Throw)
                .with_strategy(lazy.clone()),
        );
        assert!(matches!(
            strict.smart_convert(&v2_image(), Version::V1),
            Err(ConvertError::VersionMismatch { expected: Version::V1, actual: Version::V2 })
        ));

        let lenient = SmartVersionConverter::new(
            ConversionOptions::default().with_validate(false).with_strategy(lazy),
        );
        assert_eq!(lenient.smart_convert(&v2_image(), Version::V1).unwrap(), Some(v2_image()));
    }

    #[test]
    fn test_on_convert_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let converter = SmartVersionConverter::new(ConversionOptions::default().on_convert(move |from, to| {
            assert_ne!(from, to);
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        converter
            .smart_batch_convert(&[v1_text(), v2_image(), v1_none()], Version::V2)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_preview_does_not_convert() {
        let converter = standard_converter();
        let elements = [v1_text(), v2_image(), v1_none()];
        let preview = converter.preview_conversion(&elements, Version::V2);

        assert_eq!(
            preview.summary,
            PreviewSummary { total: 3, will_convert: 1, will_skip: 1, will_fail: 1 }
        );
        assert_eq!(preview.details[0].strategy.as_deref(), Some("v1-to-v2-text"));
        assert_eq!(preview.details[1].status, PreviewStatus::Skip);
        assert_eq!(preview.details[2].status, PreviewStatus::Fail);
        assert_eq!(preview.details[2].id.as_deref(), Some("none-1"));
    }

    #[test]
    fn test_inference_favors_v2_corpus() {
        let converter = standard_converter();
        let elements = [
            v2_image(),
            json!({"id": "t", "type": "text", "textType": "title", "defaultColor": "#000"}),
        ];
        let inference = converter.infer_best_strategy(&elements);
        assert_eq!(inference.recommended_version, Version::V2);
        assert!(inference.confidence > 0.9);
    }

    #[test]
    fn test_inference_moves_toward_v1() {
        let converter = standard_converter();
        let v2_only = converter.infer_best_strategy(&[v2_image()]);
        let v1_heavy = converter.infer_best_strategy(&[v1_text(), v1_shape(), v1_image(), v1_none()]);

        assert_eq!(v1_heavy.recommended_version, Version::V1);
        assert!(v1_heavy.confidence > 0.0);
        assert!(v1_heavy.confidence <= 1.0);
        assert_eq!(v2_only.recommended_version, Version::V2);
    }

    #[test]
    fn test_inference_empty_corpus() {
        let inference = standard_converter().infer_best_strategy(&[]);
        assert_eq!(inference.recommended_version, Version::V2);
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn test_auto_convert() {
        let converter = standard_converter();
        let elements = [v2_image(), v2_image(), v2_image(), v1_image()];
        let outcome = auto_convert(&converter, &elements).unwrap();

        assert_eq!(outcome.strategy, Version::V2);
        assert_eq!(outcome.converted.len(), 4);
        assert!(outcome.converted.iter().all(|el| classify(el) == Version::V2));
    }

    #[test]
    fn test_to_all_helpers() {
        let converter = standard_converter();
        assert_eq!(to_v2_all(&converter, &[v1_text(), v1_none()]).unwrap().len(), 1);

        let v1 = to_v1_all(&converter, &[v2_image()]).unwrap();
        assert_eq!(classify(&v1[0]), Version::V1);
    }
}
