//! Entity factories
//!
//! Build shapes and connectors from numeric coordinates and options, then
//! validate them. Expected problems come back as
//! `DiagramError::Validation`, never as panics.

use uuid::Uuid;

use diagramkit_core::{AnchorPosition, ConnectorType, Dimensions, Position, Result};
use diagramkit_settings::ConnectorSettings;

use crate::connector_geometry::nearest_anchor;
use crate::model::{
    ConnectionPoint, Connector, ConnectorKind, Shape, ShapeKind, ShapeLookup, ShapeStyle,
    TextLayout, DEFAULT_CURVATURE,
};
use crate::registry::ShapeValidators;
use crate::validation::{connector_rule, shape_rule, ValidationContext};

/// Which point of the new shape `(x, y)` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePoint {
    #[default]
    Center,
    TopLeft,
}

#[derive(Debug, Clone, Default)]
pub struct ShapeOptions {
    pub id: Option<String>,
    pub kind: ShapeKind,
    /// Defaults to the kind's standard size
    pub dimensions: Option<Dimensions>,
    pub style: ShapeStyle,
    pub text: TextLayout,
}

impl ShapeOptions {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_dimensions(mut self, width: f64, height: f64) -> Self {
        self.dimensions = Some(Dimensions::new(width, height));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.text = text.into();
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    pub id: Option<String>,
    pub connector_type: ConnectorType,
    /// Curvature for curved connectors
    pub curvature: f64,
    pub waypoints: Vec<Position>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub arrow_start: bool,
    pub arrow_end: bool,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            id: None,
            connector_type: ConnectorType::Straight,
            curvature: DEFAULT_CURVATURE,
            waypoints: Vec::new(),
            stroke_color: None,
            stroke_width: None,
            arrow_start: false,
            arrow_end: true,
        }
    }
}

impl ConnectorOptions {
    /// Options seeded from the configured connector defaults.
    pub fn from_settings(settings: &ConnectorSettings) -> Self {
        Self {
            connector_type: settings.default_type,
            curvature: settings.default_curvature,
            ..Self::default()
        }
    }

    pub fn with_type(mut self, connector_type: ConnectorType) -> Self {
        self.connector_type = connector_type;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Standard size for each built-in shape kind.
pub fn default_dimensions(kind: &ShapeKind) -> Dimensions {
    match kind {
        ShapeKind::Rectangle | ShapeKind::Task { .. } | ShapeKind::Custom { .. } => {
            Dimensions::new(120.0, 60.0)
        }
        ShapeKind::Event { .. } => Dimensions::new(36.0, 36.0),
        ShapeKind::Gateway { .. } => Dimensions::new(50.0, 50.0),
        ShapeKind::Pool { .. } => Dimensions::new(600.0, 200.0),
    }
}

/// Fresh id such as `shape-3f2a…`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub fn create_shape(
    x: f64,
    y: f64,
    reference: ReferencePoint,
    options: ShapeOptions,
    validators: Option<&ShapeValidators>,
) -> Result<Shape> {
    let dimensions = options
        .dimensions
        .unwrap_or_else(|| default_dimensions(&options.kind));
    let position = match reference {
        ReferencePoint::TopLeft => Position::new(x, y),
        ReferencePoint::Center => {
            Position::new(x - dimensions.width / 2.0, y - dimensions.height / 2.0)
        }
    };
    let id = options.id.unwrap_or_else(|| generate_id("shape"));

    let shape = Shape::new(id, options.kind, position, dimensions)
        .with_style(options.style)
        .with_text(options.text);

    let mut context = ValidationContext::new();
    if let Some(validators) = validators {
        context = context.with_validators(validators);
    }
    shape_rule(&shape, context).into_result(shape.id())?;
    Ok(shape)
}

/// Builds a connector between two connection points. Endpoint existence is
/// checked only when `shapes` is given.
pub fn create_connector(
    source: ConnectionPoint,
    target: ConnectionPoint,
    options: ConnectorOptions,
    shapes: Option<&dyn ShapeLookup>,
) -> Result<Connector> {
    let id = options.id.unwrap_or_else(|| generate_id("connector"));
    let kind = match options.connector_type {
        ConnectorType::Orthogonal => ConnectorKind::Orthogonal {
            waypoints: options.waypoints,
        },
        other => ConnectorKind::from_type(other, options.curvature),
    };

    let mut connector = Connector::new(id, source, target, kind);
    connector.stroke_color = options.stroke_color;
    connector.stroke_width = options.stroke_width;
    connector.arrow_start = options.arrow_start;
    connector.arrow_end = options.arrow_end;

    let mut context = ValidationContext::new();
    if let Some(shapes) = shapes {
        context = context.with_shapes(shapes);
    }
    connector_rule(&connector, context).into_result(connector.id())?;
    Ok(connector)
}

/// Connector between two shape ids, anchored at the nearest anchor pair
/// when both shapes can be looked up and at the centers otherwise.
pub fn connect_shapes(
    source: &str,
    target: &str,
    options: ConnectorOptions,
    shapes: Option<&dyn ShapeLookup>,
) -> Result<Connector> {
    let (source_anchor, target_anchor) = shapes
        .and_then(|lookup| Some((lookup.shape(source)?, lookup.shape(target)?)))
        .map(|(s, t)| (nearest_anchor(s, t.center()), nearest_anchor(t, s.center())))
        .unwrap_or((AnchorPosition::Center, AnchorPosition::Center));
    create_connector(
        ConnectionPoint::new(source, source_anchor),
        ConnectionPoint::new(target, target_anchor),
        options,
        shapes,
    )
}
