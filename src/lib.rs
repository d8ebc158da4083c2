//! # slidever
//!
//! Version detection and conversion between the two generations (V1 and V2)
//! of a presentation editor's slide-element schema.
//!
//! Elements are untyped JSON objects. Their version is inferred from their
//! structure, then converted element by element, per slide, or in batches
//! through a strategy-based converter or a context-driven middleware.
//!
//! ## Example
//!
//! ```
//! use slidever::{adapter, detect, CorpusVersion, Version};
//! use serde_json::json;
//!
//! let elements = vec![
//!     json!({"id": "t1", "type": "text", "content": "Title",
//!            "defaultColor": {"color": "#333333"}, "tag": "title"}),
//!     json!({"id": "n1", "type": "none", "tag": "ai-placeholder"}),
//! ];
//!
//! assert_eq!(detect::detect_elements_version(&elements), CorpusVersion::V1);
//!
//! // V1 `none` elements have no V2 form and are dropped
//! let v2 = adapter::all_to_v2(&elements).unwrap();
//! assert_eq!(v2.len(), 1);
//! assert_eq!(v2[0]["defaultColor"], "#333333");
//! assert_eq!(detect::classify(&v2[0]), Version::V2);
//! ```

pub mod adapter;
pub mod color_config;
pub mod compat;
pub mod convert;
pub mod detect;
pub mod error;
pub mod memo;
pub mod middleware;
pub mod slide;
pub mod smart;
pub mod types;
pub mod unified;

// Re-export commonly used items
pub use error::{ConvertError, Result};
pub use middleware::{MiddlewareConfig, ProcessingContext, VersionMiddleware};
pub use smart::{ConversionOptions, ConversionStrategy, ErrorHandling, SmartVersionConverter};
pub use types::{ColorConfig, CorpusVersion, ElementKind, Version};
pub use unified::{UnifiedElement, UnifiedElementCollection};
