use serde::{Deserialize, Serialize};

use diagramkit_core::{AnchorPosition, Bounds, Dimensions, Position};

use super::text::TextLayout;

pub const DEFAULT_TASK_CORNER_RADIUS: f64 = 10.0;
pub const DEFAULT_POOL_HEADER_WIDTH: f64 = 30.0;

fn default_corner_radius() -> f64 {
    DEFAULT_TASK_CORNER_RADIUS
}

fn default_header_width() -> f64 {
    DEFAULT_POOL_HEADER_WIDTH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Start,
    End,
    Intermediate,
    Timer,
    Message,
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Start => "start",
            EventType::End => "end",
            EventType::Intermediate => "intermediate",
            EventType::Timer => "timer",
            EventType::Message => "message",
            EventType::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayType {
    #[default]
    Exclusive,
    Parallel,
    Inclusive,
    EventBased,
}

impl GatewayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayType::Exclusive => "exclusive",
            GatewayType::Parallel => "parallel",
            GatewayType::Inclusive => "inclusive",
            GatewayType::EventBased => "eventbased",
        }
    }
}

/// Shape category with the fields that only exist for that category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shapeType", rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Task {
        #[serde(rename = "cornerRadius", default = "default_corner_radius")]
        corner_radius: f64,
    },
    Event {
        #[serde(rename = "subType", default)]
        event_type: EventType,
    },
    Gateway {
        #[serde(rename = "subType", default)]
        gateway_type: GatewayType,
    },
    Pool {
        #[serde(rename = "headerWidth", default = "default_header_width")]
        header_width: f64,
    },
    /// Kind registered at runtime; `type_name` is the registry key.
    Custom {
        #[serde(rename = "typeName")]
        type_name: String,
        #[serde(rename = "subType", default, skip_serializing_if = "Option::is_none")]
        sub_type: Option<String>,
    },
}

impl Default for ShapeKind {
    fn default() -> Self {
        ShapeKind::Rectangle
    }
}

impl ShapeKind {
    pub fn task() -> Self {
        ShapeKind::Task {
            corner_radius: DEFAULT_TASK_CORNER_RADIUS,
        }
    }

    pub fn event(event_type: EventType) -> Self {
        ShapeKind::Event { event_type }
    }

    pub fn gateway(gateway_type: GatewayType) -> Self {
        ShapeKind::Gateway { gateway_type }
    }

    pub fn pool() -> Self {
        ShapeKind::Pool {
            header_width: DEFAULT_POOL_HEADER_WIDTH,
        }
    }

    /// Base category used as the registry key.
    pub fn shape_type(&self) -> &str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Task { .. } => "task",
            ShapeKind::Event { .. } => "event",
            ShapeKind::Gateway { .. } => "gateway",
            ShapeKind::Pool { .. } => "pool",
            ShapeKind::Custom { type_name, .. } => type_name,
        }
    }

    pub fn sub_type(&self) -> Option<&str> {
        match self {
            ShapeKind::Event { event_type } => Some(event_type.as_str()),
            ShapeKind::Gateway { gateway_type } => Some(gateway_type.as_str()),
            ShapeKind::Custom { sub_type, .. } => sub_type.as_deref(),
            _ => None,
        }
    }
}

/// Optional style overrides; unset fields fall back to the render theme.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    id: String,
    pub position: Position,
    pub dimensions: Dimensions,
    #[serde(flatten)]
    pub kind: ShapeKind,
    #[serde(flatten)]
    pub style: ShapeStyle,
    #[serde(flatten)]
    pub text: TextLayout,
}

impl Shape {
    pub fn new(
        id: impl Into<String>,
        kind: ShapeKind,
        position: Position,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            dimensions,
            kind,
            style: ShapeStyle::default(),
            text: TextLayout::default(),
        }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_text(mut self, text: TextLayout) -> Self {
        self.text = text;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shape_type(&self) -> &str {
        self.kind.shape_type()
    }

    pub fn sub_type(&self) -> Option<&str> {
        self.kind.sub_type()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_position_dimensions(self.position, self.dimensions)
    }

    pub fn center(&self) -> Position {
        self.bounds().center()
    }

    pub fn anchor_point(&self, anchor: AnchorPosition) -> Position {
        self.bounds().anchor_point(anchor)
    }

    /// Point-in-silhouette test: ellipse for events, diamond for gateways,
    /// rectangle otherwise. `tolerance` grows the silhouette outwards.
    pub fn contains_point(&self, x: f64, y: f64, tolerance: f64) -> bool {
        let b = self.bounds();
        let hw = b.width / 2.0 + tolerance;
        let hh = b.height / 2.0 + tolerance;
        if hw <= 0.0 || hh <= 0.0 {
            return false;
        }
        let c = b.center();
        let dx = (x - c.x).abs();
        let dy = (y - c.y).abs();
        match self.kind {
            ShapeKind::Event { .. } => (dx / hw).powi(2) + (dy / hh).powi(2) <= 1.0,
            ShapeKind::Gateway { .. } => dx / hw + dy / hh <= 1.0,
            _ => dx <= hw && dy <= hh,
        }
    }
}
