//! Diagram entity model: shapes, connectors and the tagged [`Entity`] wrapper.

mod connector;
mod shape;
mod text;

pub use connector::{ConnectionPoint, Connector, ConnectorKind, DEFAULT_CURVATURE};
pub use shape::{
    EventType, GatewayType, Shape, ShapeKind, ShapeStyle, DEFAULT_POOL_HEADER_WIDTH,
    DEFAULT_TASK_CORNER_RADIUS,
};
pub use text::{TextLayout, TextPlacement, TextTruncation, BELOW_LABEL_GAP};

use diagramkit_core::{Dimensions, EntityKind, Position};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Any entity in a diagram, discriminated by its top-level tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Shape(Shape),
    Connector(Connector),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Shape(s) => s.id(),
            Entity::Connector(c) => c.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Shape(_) => EntityKind::Shape,
            Entity::Connector(_) => EntityKind::Connector,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Entity::Shape(s) => s.position,
            Entity::Connector(c) => c.position,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        match self {
            Entity::Shape(s) => s.dimensions,
            Entity::Connector(c) => c.dimensions,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Entity::Shape(s) => Some(s),
            Entity::Connector(_) => None,
        }
    }

    pub fn as_connector(&self) -> Option<&Connector> {
        match self {
            Entity::Connector(c) => Some(c),
            Entity::Shape(_) => None,
        }
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, Entity::Shape(_))
    }
}

impl From<Shape> for Entity {
    fn from(shape: Shape) -> Self {
        Entity::Shape(shape)
    }
}

impl From<Connector> for Entity {
    fn from(connector: Connector) -> Self {
        Entity::Connector(connector)
    }
}

/// Read-only shape lookup by id, the context connector geometry needs.
pub trait ShapeLookup {
    fn shape(&self, id: &str) -> Option<&Shape>;
}

impl ShapeLookup for HashMap<String, Shape> {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.get(id)
    }
}

impl ShapeLookup for IndexMap<String, Shape> {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.get(id)
    }
}

impl ShapeLookup for [Shape] {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.iter().find(|s| s.id() == id)
    }
}

impl ShapeLookup for Vec<Shape> {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.as_slice().shape(id)
    }
}

/// A lookup that sees `overrides` on top of `base`.
///
/// Used to validate or measure against a shape set that does not exist yet:
/// shapes about to be restored, or shapes at their in-flight drag positions.
pub struct ShapeOverlay<'a> {
    base: &'a dyn ShapeLookup,
    overrides: HashMap<String, Shape>,
}

impl<'a> ShapeOverlay<'a> {
    pub fn new(base: &'a dyn ShapeLookup) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    pub fn with(mut self, shape: Shape) -> Self {
        self.insert(shape);
        self
    }

    pub fn insert(&mut self, shape: Shape) {
        self.overrides.insert(shape.id().to_string(), shape);
    }
}

impl ShapeLookup for ShapeOverlay<'_> {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.overrides.get(id).or_else(|| self.base.shape(id))
    }
}
