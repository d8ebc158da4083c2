//! Configuration-driven version processing for data entering or leaving the editor
//!
//! A [`VersionMiddleware`] resolves a target version from the calling context,
//! brings every element to it and shapes the output for its destination (API
//! payload, storage record or display projection).

use crate::adapter::{to_v1, to_v2};
use crate::compat::check_compatibility;
use crate::detect::classify;
use crate::error::{ConvertError, Result};
use crate::types::Version;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::borrow::Cow;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Where processed data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Api,
    Ui,
    Storage,
    Import,
    Export,
}

/// What processed data is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTarget {
    Api,
    Ui,
    Storage,
    Display,
    Processing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiddlewareErrorHandling {
    /// Abort on the first element failure
    Throw,
    /// Record failures
    Skip,
    /// Record failures and warn about elements that were dropped
    #[default]
    Warn,
}

/// Middleware log verbosity, from quietest to loudest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MiddlewareConfig {
    pub default_version: Version,
    /// When false, elements pass through untouched
    pub auto_convert: bool,
    /// Attach the unprocessed input to every result
    pub preserve_original: bool,
    pub error_handling: MiddlewareErrorHandling,
    pub log_level: LogLevel,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            default_version: Version::V2,
            auto_convert: true,
            preserve_original: false,
            error_handling: MiddlewareErrorHandling::Warn,
            log_level: LogLevel::Warn,
        }
    }
}

/// Partial config update; `None` fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiddlewareConfigPatch {
    pub default_version: Option<Version>,
    pub auto_convert: Option<bool>,
    pub preserve_original: Option<bool>,
    pub error_handling: Option<MiddlewareErrorHandling>,
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingContext {
    pub source: DataSource,
    pub target: DataTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_version: Option<Version>,
    #[serde(default)]
    pub force_conversion: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, JsonValue>,
}

impl ProcessingContext {
    pub fn new(source: DataSource, target: DataTarget) -> Self {
        Self {
            source,
            target,
            preferred_version: None,
            force_conversion: false,
            metadata: Map::new(),
        }
    }

    pub fn with_preferred_version(mut self, version: Version) -> Self {
        self.preferred_version = Some(version);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub processed: usize,
    /// Elements whose version actually changed
    pub converted: usize,
    /// Elements dropped for lack of a target-version form
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<JsonValue>,
    pub stats: ProcessingStats,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,
}

impl<T> ProcessingResult<T> {
    /// Transform `data`, keeping stats and messages
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ProcessingResult<U> {
        ProcessingResult {
            data: f(self.data),
            original: self.original,
            stats: self.stats,
            warnings: self.warnings,
            errors: self.errors,
            processing_time_ms: self.processing_time_ms,
        }
    }
}

/// Per-call accumulator
#[derive(Default)]
struct Tally {
    stats: ProcessingStats,
    warnings: Vec<String>,
    errors: Vec<String>,
}

pub struct VersionMiddleware {
    config: MiddlewareConfig,
}

impl Default for VersionMiddleware {
    fn default() -> Self {
        Self::new(MiddlewareConfig::default())
    }
}

impl VersionMiddleware {
    pub fn new(config: MiddlewareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MiddlewareConfig {
        &self.config
    }

    pub fn update_config(&mut self, patch: MiddlewareConfigPatch) {
        if let Some(v) = patch.default_version {
            self.config.default_version = v;
        }
        if let Some(v) = patch.auto_convert {
            self.config.auto_convert = v;
        }
        if let Some(v) = patch.preserve_original {
            self.config.preserve_original = v;
        }
        if let Some(v) = patch.error_handling {
            self.config.error_handling = v;
        }
        if let Some(v) = patch.log_level {
            self.config.log_level = v;
        }
        self.log(LogLevel::Info, &format!("Middleware config updated: {:?}", self.config));
    }

    /// Version to convert to for a given context
    ///
    /// An explicit preference always wins. Otherwise data from storage, or
    /// from the API on its way to storage, goes to V2; everything else uses
    /// the configured default.
    pub fn target_version(&self, context: &ProcessingContext) -> Version {
        if let Some(version) = context.preferred_version {
            return version;
        }
        match (context.source, context.target) {
            (DataSource::Api, DataTarget::Storage) => Version::V2,
            (DataSource::Storage, _) => Version::V2,
            _ => self.config.default_version,
        }
    }

    /// Process one element
    ///
    /// `data` is `None` when the element has no form in the target version or
    /// failed to convert.
    pub fn process_element(
        &self,
        element: &JsonValue,
        context: &ProcessingContext,
    ) -> Result<ProcessingResult<Option<JsonValue>>> {
        let started = Instant::now();
        let target = self.target_version(context);
        let mut tally = Tally::default();

        self.log(
            LogLevel::Debug,
            &format!("Processing {} element to {}", element_label(element), target),
        );
        let data = self.process_one(element, target, &mut tally)?;

        Ok(self.finish(data, element.clone(), tally, started))
    }

    /// Process a batch of elements
    ///
    /// Compatibility issues are reported as warnings. A failing element is
    /// recorded in `errors` and left out of `data`, unless error handling is
    /// [`MiddlewareErrorHandling::Throw`].
    pub fn process_elements(
        &self,
        elements: &[JsonValue],
        context: &ProcessingContext,
    ) -> Result<ProcessingResult<Vec<JsonValue>>> {
        let started = Instant::now();
        let target = self.target_version(context);
        let mut tally = Tally::default();

        self.log(
            LogLevel::Info,
            &format!("Processing {} elements to {}", elements.len(), target),
        );

        let compatibility = check_compatibility(elements);
        if !compatibility.compatible {
            self.log(
                LogLevel::Warn,
                &format!("Compatibility issues: {}", compatibility.issues.join("; ")),
            );
            tally.warnings.extend(compatibility.issues);
        }

        let mut data = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(value) = self.process_one(element, target, &mut tally)? {
                data.push(value);
            }
        }

        if tally.stats.skipped > 0 {
            tally.warnings.push(format!(
                "Skipped {} elements that could not be converted",
                tally.stats.skipped
            ));
        }
        self.log(
            LogLevel::Info,
            &format!(
                "Batch done: {} converted, {} skipped, {} errors",
                tally.stats.converted, tally.stats.skipped, tally.stats.errors
            ),
        );

        Ok(self.finish(data, JsonValue::Array(elements.to_vec()), tally, started))
    }

    /// Normalize raw input into an element list, then process it
    ///
    /// Accepts an element array, an object with an `elements` array, or a
    /// single element object.
    pub fn preprocess_input(
        &self,
        input: &JsonValue,
        context: &ProcessingContext,
    ) -> Result<ProcessingResult<Vec<JsonValue>>> {
        let elements = input_elements(input)?;
        self.log(
            LogLevel::Debug,
            &format!("Preprocessing input with {} elements", elements.len()),
        );
        self.process_elements(&elements, context)
    }

    /// Process elements, then shape them for `context.target`
    ///
    /// - api: `{elements, metadata: {version, processedAt, stats}}`
    /// - storage: `{version, elements, checksum}`
    /// - display: `{id, type, left, top, width, height}` per element
    /// - anything else: the processed element array
    pub fn postprocess_output(
        &self,
        elements: &[JsonValue],
        context: &ProcessingContext,
    ) -> Result<ProcessingResult<JsonValue>> {
        let processed = self.process_elements(elements, context)?;
        let version = self.target_version(context);
        let stats = processed.stats;

        Ok(processed.map_data(|data| match context.target {
            DataTarget::Api => json!({
                "elements": data,
                "metadata": {
                    "version": version,
                    "processedAt": Utc::now().to_rfc3339(),
                    "stats": stats,
                },
            }),
            DataTarget::Storage => {
                let checksum = checksum(&data);
                json!({
                    "version": version,
                    "elements": data,
                    "checksum": checksum,
                })
            }
            DataTarget::Display => JsonValue::Array(data.iter().map(display_projection).collect()),
            DataTarget::Ui | DataTarget::Processing => JsonValue::Array(data),
        }))
    }

    fn process_one(
        &self,
        element: &JsonValue,
        target: Version,
        tally: &mut Tally,
    ) -> Result<Option<JsonValue>> {
        tally.stats.processed += 1;

        if !self.config.auto_convert {
            return Ok(Some(element.clone()));
        }

        let version = classify(element);
        let converted = match target {
            Version::V1 => to_v1(element).map(|cow| Some(cow.into_owned())),
            Version::V2 => to_v2(element).map(|v| v.map(Cow::into_owned)),
        };

        match converted {
            Ok(Some(value)) => {
                if version != target {
                    tally.stats.converted += 1;
                }
                Ok(Some(value))
            }
            Ok(None) => {
                tally.stats.skipped += 1;
                if self.config.error_handling == MiddlewareErrorHandling::Warn {
                    tally.warnings.push(format!(
                        "Element {} has no {} form",
                        element_label(element),
                        target
                    ));
                }
                Ok(None)
            }
            Err(e) => self.record_failure(e, element, tally),
        }
    }

    fn record_failure(
        &self,
        err: ConvertError,
        element: &JsonValue,
        tally: &mut Tally,
    ) -> Result<Option<JsonValue>> {
        let message = format!("Failed to process element {}: {}", element_label(element), err);
        self.log(LogLevel::Error, &message);

        if self.config.error_handling == MiddlewareErrorHandling::Throw {
            return Err(err);
        }
        tally.stats.errors += 1;
        tally.errors.push(message);
        Ok(None)
    }

    fn finish<T>(&self, data: T, original: JsonValue, tally: Tally, started: Instant) -> ProcessingResult<T> {
        ProcessingResult {
            data,
            original: self.config.preserve_original.then_some(original),
            stats: tally.stats,
            warnings: tally.warnings,
            errors: tally.errors,
            processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Emit through `tracing` when `level` is within the configured verbosity
    fn log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::None || level > self.config.log_level {
            return;
        }
        match level {
            LogLevel::Error => error!("[VersionMiddleware] {}", message),
            LogLevel::Warn => warn!("[VersionMiddleware] {}", message),
            LogLevel::Info => info!("[VersionMiddleware] {}", message),
            LogLevel::Debug => debug!("[VersionMiddleware] {}", message),
            LogLevel::None => {}
        }
    }
}

fn element_label(element: &JsonValue) -> String {
    let kind = element.get("type").and_then(|v| v.as_str()).unwrap_or("unknown");
    match element.get("id").and_then(|v| v.as_str()) {
        Some(id) => format!("{} ({})", id, kind),
        None => kind.to_string(),
    }
}

/// Element list of an input document
///
/// Accepts an element array, an object with an `elements` array, or a single
/// element (an object whose `elements` is missing or null).
pub fn input_elements(input: &JsonValue) -> Result<Vec<JsonValue>> {
    match input {
        JsonValue::Array(elements) => Ok(elements.clone()),
        JsonValue::Object(map) => match map.get("elements") {
            Some(JsonValue::Array(elements)) => Ok(elements.clone()),
            Some(other) if !other.is_null() => Err(ConvertError::InvalidInput(
                "`elements` must be an array".to_string(),
            )),
            _ => Ok(vec![input.clone()]),
        },
        other => Err(ConvertError::InvalidInput(format!(
            "expected an element, an element array or an object with `elements`, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn display_projection(element: &JsonValue) -> JsonValue {
    let field = |key: &str| element.get(key).cloned().unwrap_or(JsonValue::Null);
    let height = element
        .get("height")
        .filter(|v| v.as_f64().is_some_and(|h| h != 0.0))
        .cloned()
        .unwrap_or(json!(0));

    json!({
        "id": field("id"),
        "type": field("type"),
        "left": field("left"),
        "top": field("top"),
        "width": field("width"),
        "height": height,
    })
}

/// Non-cryptographic drift checksum of a serialized element list
///
/// 32-bit `h * 31 + c` string hash over the UTF-16 units of the compact JSON,
/// rendered as lowercase hex of its absolute value.
pub fn checksum(elements: &[JsonValue]) -> String {
    let serialized = serde_json::to_string(elements).unwrap_or_default();
    let hash = serialized.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    format!("{:x}", i64::from(hash).abs())
}

/// Middleware for data sent to API clients
pub fn api_middleware() -> VersionMiddleware {
    VersionMiddleware::new(MiddlewareConfig::default())
}

/// Middleware for persisted documents: keeps the original, logs errors only
pub fn storage_middleware() -> VersionMiddleware {
    VersionMiddleware::new(MiddlewareConfig {
        preserve_original: true,
        error_handling: MiddlewareErrorHandling::Skip,
        log_level: LogLevel::Error,
        ..MiddlewareConfig::default()
    })
}

/// Silent middleware for rendering
pub fn ui_middleware() -> VersionMiddleware {
    VersionMiddleware::new(MiddlewareConfig {
        error_handling: MiddlewareErrorHandling::Skip,
        log_level: LogLevel::None,
        ..MiddlewareConfig::default()
    })
}

/// Middleware for imported documents, defaulting to `preferred`
pub fn import_middleware(preferred: Version) -> VersionMiddleware {
    VersionMiddleware::new(MiddlewareConfig {
        default_version: preferred,
        preserve_original: true,
        log_level: LogLevel::Info,
        ..MiddlewareConfig::default()
    })
}

fn as_element_list(data: &JsonValue) -> Vec<JsonValue> {
    match data {
        JsonValue::Array(elements) => elements.clone(),
        other => vec![other.clone()],
    }
}

/// Shape elements as an API payload
pub fn for_api(data: &JsonValue) -> Result<ProcessingResult<JsonValue>> {
    api_middleware().postprocess_output(
        &as_element_list(data),
        &ProcessingContext::new(DataSource::Api, DataTarget::Api),
    )
}

/// Shape elements as a storage record
pub fn for_storage(data: &JsonValue) -> Result<ProcessingResult<JsonValue>> {
    storage_middleware().postprocess_output(
        &as_element_list(data),
        &ProcessingContext::new(DataSource::Ui, DataTarget::Storage),
    )
}

/// Project elements for display
pub fn for_ui(data: &JsonValue) -> Result<ProcessingResult<JsonValue>> {
    ui_middleware().postprocess_output(
        &as_element_list(data),
        &ProcessingContext::new(DataSource::Api, DataTarget::Display),
    )
}

/// Normalize imported data to `preferred`
pub fn for_import(data: &JsonValue, preferred: Version) -> Result<ProcessingResult<Vec<JsonValue>>> {
    import_middleware(preferred).preprocess_input(
        data,
        &ProcessingContext::new(DataSource::Import, DataTarget::Processing).with_preferred_version(preferred),
    )
}
