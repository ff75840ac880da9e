//! Prompt templates for each rendering style.

use crate::types::Style;

/// Build the text-to-image prompt for a predicted label.
pub fn build_prompt(label: &str, style: Style) -> String {
    match style {
        Style::Realistic => format!(
            "a highly detailed, photorealistic {label}, professional photography, 4k, sharp focus, natural lighting"
        ),
        Style::Artistic => format!(
            "a beautiful artistic painting of a {label}, oil painting style, vibrant colors, masterpiece"
        ),
        Style::Cartoon => format!(
            "a cute cartoon illustration of a {label}, colorful, friendly, child-friendly art style"
        ),
        Style::Sketch => format!(
            "a detailed pencil sketch of a {label}, professional drawing, shading, realistic proportions"
        ),
    }
}
