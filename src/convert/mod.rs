/// V1 ⇄ V2 conversion passes
///
/// This module contains the conversions applied to a single element when moving
/// between the two schema generations:
///
/// - `color`: Style primitives (color, gradient, shadow, outline)
/// - `element`: Per-kind element conversion and type-tag dispatch
pub mod color;
pub mod element;

// Re-export commonly used functions
pub use color::{
    color_to_v1, color_to_v2, gradient_to_v1, gradient_to_v2, outline_to_v1, outline_to_v2,
    shadow_to_v1, shadow_to_v2, DEFAULT_COLOR,
};
pub use element::{
    element_to_v1, element_to_v2, elements_to_v1, elements_to_v2, image_to_v1, image_to_v2,
    line_to_v1, line_to_v2, shape_to_v1, shape_to_v2, text_to_v1, text_to_v2, V1_METADATA_KEYS,
};
