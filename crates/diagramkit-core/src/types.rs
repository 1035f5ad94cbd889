//! Tags shared across the designer, settings and event layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level discriminator of a diagram entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Shape,
    Connector,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape => write!(f, "shape"),
            Self::Connector => write!(f, "connector"),
        }
    }
}

/// Routing style of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorType {
    #[default]
    Straight,
    Orthogonal,
    Curved,
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Straight => write!(f, "straight"),
            Self::Orthogonal => write!(f, "orthogonal"),
            Self::Curved => write!(f, "curved"),
        }
    }
}

/// What happens to attached connectors when a shape is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadePolicy {
    /// Attached connectors are removed together with the shape.
    #[default]
    Delete,
    /// Attached connectors stay in the model with a dangling endpoint.
    Detach,
}
