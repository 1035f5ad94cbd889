//! Entity system facade
//!
//! Stateless dispatch of bounds, hit testing and validation over the
//! tagged [`Entity`] set. Connector operations need the shape map in the
//! [`EntityContext`]; without it they yield `None`/`false`.

use diagramkit_core::Bounds;

use crate::connector_geometry::{self, GeometryOptions};
use crate::model::{Entity, ShapeLookup};
use crate::registry::ShapeValidators;
use crate::validation::{validate_entity, ValidationContext, ValidationResult};

/// Default connector hit tolerance in diagram units.
pub const DEFAULT_HIT_TOLERANCE: f64 = 5.0;

#[derive(Clone, Copy)]
pub struct EntityContext<'a> {
    pub shapes: Option<&'a dyn ShapeLookup>,
    pub validators: Option<&'a ShapeValidators>,
    pub tolerance: f64,
    pub geometry: GeometryOptions,
}

impl Default for EntityContext<'_> {
    fn default() -> Self {
        Self {
            shapes: None,
            validators: None,
            tolerance: DEFAULT_HIT_TOLERANCE,
            geometry: GeometryOptions::default(),
        }
    }
}

impl<'a> EntityContext<'a> {
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

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryOptions) -> Self {
        self.geometry = geometry;
        self
    }

    fn validation(&self) -> ValidationContext<'a> {
        ValidationContext {
            shapes: self.shapes,
            validators: self.validators,
        }
    }
}

/// Shapes report their own box; connectors their padded path bounds.
pub fn get_bounds(entity: &Entity, context: &EntityContext<'_>) -> Option<Bounds> {
    match entity {
        Entity::Shape(shape) => Some(shape.bounds()),
        Entity::Connector(connector) => connector_geometry::connector_bounds(
            connector,
            context.shapes?,
            &context.geometry,
        ),
    }
}

pub fn hit_test(entity: &Entity, x: f64, y: f64, context: &EntityContext<'_>) -> bool {
    match entity {
        Entity::Shape(shape) => shape.contains_point(x, y, 0.0),
        Entity::Connector(connector) => context.shapes.is_some_and(|shapes| {
            connector_geometry::hit_test_connector(
                connector,
                shapes,
                x,
                y,
                context.tolerance,
                &context.geometry,
            )
        }),
    }
}

/// Topmost hit: `entities` is in z-order, so the last match wins.
pub fn find_entity_at_point<'e, I>(
    entities: I,
    x: f64,
    y: f64,
    context: &EntityContext<'_>,
) -> Option<&'e Entity>
where
    I: IntoIterator<Item = &'e Entity>,
    I::IntoIter: DoubleEndedIterator,
{
    entities
        .into_iter()
        .rev()
        .find(|entity| hit_test(entity, x, y, context))
}

/// Entities whose bounds intersect `area`, in z-order.
pub fn find_entities_in_box<'e, I>(
    entities: I,
    area: &Bounds,
    context: &EntityContext<'_>,
) -> Vec<&'e Entity>
where
    I: IntoIterator<Item = &'e Entity>,
{
    entities
        .into_iter()
        .filter(|entity| get_bounds(entity, context).is_some_and(|b| b.intersects(area)))
        .collect()
}

pub fn validate(entity: &Entity, context: &EntityContext<'_>) -> ValidationResult {
    validate_entity(entity, context.validation())
}

/// Failing entities with their results, in input order.
pub fn validate_many<'e, I>(
    entities: I,
    context: &EntityContext<'_>,
) -> Vec<(String, ValidationResult)>
where
    I: IntoIterator<Item = &'e Entity>,
{
    entities
        .into_iter()
        .map(|entity| (entity.id().to_string(), validate(entity, context)))
        .filter(|(_, result)| !result.is_valid())
        .collect()
}
