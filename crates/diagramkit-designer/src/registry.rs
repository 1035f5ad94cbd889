//! Runtime-extensible handler registries
//!
//! A [`HandlerRegistry`] maps a type key (`"task"`) or a composite
//! `type:subType` key (`"event:end"`) to a handler. Lookups try the
//! composite key first and fall back to the base type, so a kind can be
//! specialised per sub-type without touching dispatch code.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::{Shape, ShapeKind};
use crate::validation::{rules, ValidationResult};

/// Extra validation applied to shapes of the key's type.
pub type ShapeValidatorFn = Arc<dyn Fn(&Shape) -> ValidationResult + Send + Sync>;

/// Registry of per-shape-type validators.
pub type ShapeValidators = HandlerRegistry<ShapeValidatorFn>;

/// `base:sub` key used for sub-type specific handlers.
pub fn composite_key(base: &str, sub_type: &str) -> String {
    format!("{}:{}", base, sub_type)
}

/// Map from type key to handler, seeded with built-ins.
#[derive(Clone)]
pub struct HandlerRegistry<H> {
    handlers: HashMap<String, H>,
    builtins: Vec<(String, H)>,
}

impl<H: Clone> HandlerRegistry<H> {
    /// Create an empty registry with no built-ins
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            builtins: Vec::new(),
        }
    }

    /// Create a registry seeded with `builtins`; [`reset`](Self::reset) returns to them
    pub fn with_builtins<K, I>(builtins: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, H)>,
    {
        let builtins: Vec<(String, H)> = builtins
            .into_iter()
            .map(|(key, handler)| (key.into(), handler))
            .collect();
        let handlers = builtins.iter().cloned().collect();
        Self { handlers, builtins }
    }

    /// Register a handler, returning the one it replaced
    pub fn register(&mut self, key: impl Into<String>, handler: H) -> Option<H> {
        let key = key.into();
        tracing::debug!("Registering handler for '{}'", key);
        self.handlers.insert(key, handler)
    }

    pub fn unregister(&mut self, key: &str) -> Option<H> {
        let removed = self.handlers.remove(key);
        if removed.is_some() {
            tracing::debug!("Unregistered handler for '{}'", key);
        }
        removed
    }

    /// Drop every registration and restore the built-ins
    pub fn reset(&mut self) {
        self.handlers = self.builtins.iter().cloned().collect();
    }

    pub fn get(&self, key: &str) -> Option<&H> {
        self.handlers.get(key)
    }

    /// Handler for `base:sub_type` if registered, otherwise for `base`
    pub fn resolve(&self, base: &str, sub_type: Option<&str>) -> Option<&H> {
        sub_type
            .and_then(|sub| self.handlers.get(&composite_key(base, sub)))
            .or_else(|| self.handlers.get(base))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.handlers.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: Clone> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort_unstable();
        f.debug_struct("HandlerRegistry").field("keys", &keys).finish()
    }
}

/// Validator registry seeded with the built-in per-type rules.
pub fn default_shape_validators() -> ShapeValidators {
    let pool: ShapeValidatorFn = Arc::new(|shape: &Shape| match shape.kind {
        ShapeKind::Pool { header_width } => ValidationResult::check(
            header_width <= shape.dimensions.width,
            || {
                format!(
                    "headerWidth {} exceeds pool width {}",
                    header_width, shape.dimensions.width
                )
            },
        ),
        _ => ValidationResult::valid(),
    });
    let task: ShapeValidatorFn = Arc::new(|shape: &Shape| match shape.kind {
        ShapeKind::Task { corner_radius } => {
            let limit = shape.dimensions.width.min(shape.dimensions.height) / 2.0;
            let mut result = rules::non_negative("cornerRadius", corner_radius);
            if result.is_valid() && corner_radius > limit {
                result.merge(ValidationResult::invalid(format!(
                    "cornerRadius {} exceeds half the smaller side ({})",
                    corner_radius, limit
                )));
            }
            result
        }
        _ => ValidationResult::valid(),
    });
    HandlerRegistry::with_builtins([("pool", pool), ("task", task)])
}
