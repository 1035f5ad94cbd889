use serde::{Deserialize, Serialize};

use diagramkit_core::{AnchorPosition, ConnectorType, Dimensions, Position};

pub const DEFAULT_CURVATURE: f64 = 1.0;

fn default_curvature() -> f64 {
    DEFAULT_CURVATURE
}

fn default_true() -> bool {
    true
}

/// Where a connector attaches: a shape id plus one of its nine anchors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPoint {
    pub shape_id: String,
    pub anchor: AnchorPosition,
}

impl ConnectionPoint {
    pub fn new(shape_id: impl Into<String>, anchor: AnchorPosition) -> Self {
        Self {
            shape_id: shape_id.into(),
            anchor,
        }
    }
}

/// Routing style with the data only that style carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "connectorType", rename_all = "lowercase")]
pub enum ConnectorKind {
    Straight,
    Orthogonal {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        waypoints: Vec<Position>,
    },
    Curved {
        #[serde(default = "default_curvature")]
        curvature: f64,
    },
}

impl Default for ConnectorKind {
    fn default() -> Self {
        ConnectorKind::Straight
    }
}

impl ConnectorKind {
    pub fn connector_type(&self) -> ConnectorType {
        match self {
            ConnectorKind::Straight => ConnectorType::Straight,
            ConnectorKind::Orthogonal { .. } => ConnectorType::Orthogonal,
            ConnectorKind::Curved { .. } => ConnectorType::Curved,
        }
    }

    pub fn from_type(connector_type: ConnectorType, curvature: f64) -> Self {
        match connector_type {
            ConnectorType::Straight => ConnectorKind::Straight,
            ConnectorType::Orthogonal => ConnectorKind::Orthogonal {
                waypoints: Vec::new(),
            },
            ConnectorType::Curved => ConnectorKind::Curved { curvature },
        }
    }

    pub fn waypoints(&self) -> &[Position] {
        match self {
            ConnectorKind::Orthogonal { waypoints } => waypoints,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    id: String,
    /// Derived from the endpoint shapes; refreshed whenever they move.
    #[serde(default)]
    pub position: Position,
    /// Derived from the endpoint shapes; refreshed whenever they move.
    #[serde(default)]
    pub dimensions: Dimensions,
    pub source: ConnectionPoint,
    pub target: ConnectionPoint,
    #[serde(flatten)]
    pub kind: ConnectorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub arrow_start: bool,
    #[serde(default = "default_true")]
    pub arrow_end: bool,
}

impl Connector {
    pub fn new(
        id: impl Into<String>,
        source: ConnectionPoint,
        target: ConnectionPoint,
        kind: ConnectorKind,
    ) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            dimensions: Dimensions::default(),
            source,
            target,
            kind,
            stroke_color: None,
            stroke_width: None,
            arrow_start: false,
            arrow_end: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connector_type(&self) -> ConnectorType {
        self.kind.connector_type()
    }

    pub fn is_attached_to(&self, shape_id: &str) -> bool {
        self.source.shape_id == shape_id || self.target.shape_id == shape_id
    }
}
