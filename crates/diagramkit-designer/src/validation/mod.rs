//! Composable validation engine
//!
//! A rule inspects one entity (plus an optional [`ValidationContext`]) and
//! returns a [`ValidationResult`]. Rules are combined with a
//! [`ValidationBuilder`], which runs all of them and concatenates every
//! message. Validation never mutates; callers decide whether to reject.

mod builder;
pub mod color;
mod composite;
pub mod rules;

pub use builder::ValidationBuilder;
pub use color::is_valid_color;
pub use composite::{connector_rule, shape_rule, validate_entity};

use diagramkit_core::DiagramError;

use crate::model::ShapeLookup;
use crate::registry::ShapeValidators;

/// Outcome of running one or more rules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// `valid()` when `condition` holds, otherwise `invalid(message())`.
    pub fn check(condition: bool, message: impl FnOnce() -> String) -> Self {
        if condition {
            Self::valid()
        } else {
            Self::invalid(message())
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Appends the errors of `other` after this result's own.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Converts into a `Result`, tagging failures with `entity_id`.
    pub fn into_result(self, entity_id: &str) -> diagramkit_core::Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DiagramError::validation(entity_id, self.errors))
        }
    }
}

impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        let mut out = ValidationResult::valid();
        for result in iter {
            out.merge(result);
        }
        out
    }
}

/// Cross-entity information a rule may consult.
#[derive(Clone, Copy, Default)]
pub struct ValidationContext<'a> {
    /// Shape map for endpoint-existence checks; skipped when absent.
    pub shapes: Option<&'a dyn ShapeLookup>,
    /// Extra per-shape-type rules.
    pub validators: Option<&'a ShapeValidators>,
}

impl<'a> ValidationContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes(mut self, shapes: &'a dyn ShapeLookup) -> Self {
        self.shapes = Some(shapes);
        self
    }

    pub fn with_validators(mut self, validators: &'a ShapeValidators) -> Self {
        self.validators = Some(validators);
        self
    }
}
