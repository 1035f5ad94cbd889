//! Atomic validation rules.
//!
//! `field` arguments name the offending field in the message.

use diagramkit_core::{AnchorPosition, Dimensions, Position};

use super::{color::is_valid_color, ValidationResult};

pub const MAX_STROKE_WIDTH: f64 = 100.0;

pub fn id(id: &str) -> ValidationResult {
    ValidationResult::check(!id.trim().is_empty(), || {
        "id must be a non-empty string".to_string()
    })
}

pub fn position(field: &str, position: &Position) -> ValidationResult {
    ValidationResult::check(position.is_finite(), || {
        format!("{field} must have finite x and y, got ({}, {})", position.x, position.y)
    })
}

/// Finite and non-negative; shapes additionally require `allow_zero = false`.
pub fn dimensions(dimensions: &Dimensions, allow_zero: bool) -> ValidationResult {
    if !dimensions.is_finite() {
        return ValidationResult::invalid(format!(
            "dimensions must be finite, got {}x{}",
            dimensions.width, dimensions.height
        ));
    }

    let mut result = ValidationResult::valid();
    for (name, value) in [("width", dimensions.width), ("height", dimensions.height)] {
        if value < 0.0 {
            result.merge(ValidationResult::invalid(format!(
                "{name} must not be negative, got {value}"
            )));
        } else if value == 0.0 && !allow_zero {
            result.merge(ValidationResult::invalid(format!(
                "{name} must be greater than 0"
            )));
        }
    }
    result
}

pub fn stroke_width(field: &str, width: f64) -> ValidationResult {
    ValidationResult::check(
        width.is_finite() && (0.0..=MAX_STROKE_WIDTH).contains(&width),
        || format!("{field} must be between 0 and {MAX_STROKE_WIDTH}, got {width}"),
    )
}

pub fn color(field: &str, value: &str) -> ValidationResult {
    ValidationResult::check(is_valid_color(value), || {
        format!("{field} '{value}' is not a valid color")
    })
}

/// Raw anchor token check for adapters that build connection points from text.
pub fn anchor_token(field: &str, token: &str) -> ValidationResult {
    ValidationResult::check(token.parse::<AnchorPosition>().is_ok(), || {
        format!(
            "{field} '{token}' is not one of {}",
            AnchorPosition::ALL
                .iter()
                .map(AnchorPosition::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

pub fn non_negative(field: &str, value: f64) -> ValidationResult {
    ValidationResult::check(value.is_finite() && value >= 0.0, || {
        format!("{field} must be a finite non-negative number, got {value}")
    })
}

pub fn non_empty(field: &str, value: &str) -> ValidationResult {
    ValidationResult::check(!value.trim().is_empty(), || {
        format!("{field} must not be empty")
    })
}
