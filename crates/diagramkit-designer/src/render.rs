//! Rendering boundary
//!
//! Builds rendering-agnostic visuals (lyon outline paths plus resolved
//! colors) for shapes and connectors. Pixel painting happens outside this
//! crate; colors fall back to a caller-supplied [`RenderTheme`].

use std::sync::Arc;

use lyon::math::{point, Box2D, Point};
use lyon::path::builder::BorderRadii;
use lyon::path::{Path, Winding};

use diagramkit_core::{Bounds, Position};
use diagramkit_settings::ThemeSettings;

use crate::connector_geometry::{ConnectorGeometry, ConnectorPath};
use crate::model::{Connector, EventType, Shape, ShapeKind, TextLayout};
use crate::registry::HandlerRegistry;
use crate::validation::rules::MAX_STROKE_WIDTH;

/// Stroke multiplier for end events.
pub const END_EVENT_STROKE_FACTOR: f64 = 2.0;

/// Fallback colors for entities without explicit style.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTheme {
    pub fill_color: String,
    pub stroke_color: String,
    pub text_color: String,
    pub connector_color: String,
    pub stroke_width: f64,
}

impl Default for RenderTheme {
    fn default() -> Self {
        Self::from(&ThemeSettings::default())
    }
}

impl From<&ThemeSettings> for RenderTheme {
    fn from(theme: &ThemeSettings) -> Self {
        Self {
            fill_color: theme.fill_color.clone(),
            stroke_color: theme.stroke_color.clone(),
            text_color: theme.text_color.clone(),
            connector_color: theme.connector_color.clone(),
            stroke_width: theme.stroke_width,
        }
    }
}

/// Resolved outline and paint for one shape.
#[derive(Debug, Clone)]
pub struct ShapeVisual {
    pub outline: Path,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub text_color: String,
    /// Label layout, `None` when the shape has no text.
    pub text: Option<TextLayout>,
    pub text_anchor: Position,
    pub bounds: Bounds,
}

/// Arrowhead at a connector end; `angle` is the direction the tip points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub tip: Position,
    pub angle: f64,
}

impl Arrowhead {
    /// Triangle `[tip, left, right]` with sides of `length` opening by `spread` radians.
    pub fn triangle(&self, length: f64, spread: f64) -> [Position; 3] {
        let wing = |a: f64| {
            Position::new(self.tip.x - length * a.cos(), self.tip.y - length * a.sin())
        };
        [self.tip, wing(self.angle - spread), wing(self.angle + spread)]
    }
}

/// Resolved path and paint for one connector.
#[derive(Debug, Clone)]
pub struct ConnectorVisual {
    pub path: Path,
    pub arrowheads: Vec<Arrowhead>,
    pub stroke: String,
    pub stroke_width: f64,
}

pub type ShapeRenderFn = Arc<dyn Fn(&Shape, &RenderTheme) -> ShapeVisual + Send + Sync>;
pub type ConnectorRenderFn =
    Arc<dyn Fn(&Connector, &ConnectorGeometry, &RenderTheme) -> ConnectorVisual + Send + Sync>;

fn pt(p: Position) -> Point {
    point(p.x as f32, p.y as f32)
}

fn rect_box(bounds: &Bounds) -> Box2D {
    Box2D::new(
        point(bounds.min_x() as f32, bounds.min_y() as f32),
        point(bounds.max_x() as f32, bounds.max_y() as f32),
    )
}

fn base_visual(shape: &Shape, theme: &RenderTheme, outline: Path) -> ShapeVisual {
    let bounds = shape.bounds();
    let style = &shape.style;
    ShapeVisual {
        outline,
        fill: style
            .fill_color
            .clone()
            .unwrap_or_else(|| theme.fill_color.clone()),
        stroke: style
            .stroke_color
            .clone()
            .unwrap_or_else(|| theme.stroke_color.clone()),
        stroke_width: style.stroke_width.unwrap_or(theme.stroke_width),
        text_color: style
            .text_color
            .clone()
            .unwrap_or_else(|| theme.text_color.clone()),
        text: (!shape.text.text.is_empty()).then(|| shape.text.clone()),
        text_anchor: shape.text.anchor_in(&bounds),
        bounds,
    }
}

pub fn rectangle_outline(shape: &Shape, theme: &RenderTheme) -> ShapeVisual {
    let mut builder = Path::builder();
    builder.add_rectangle(&rect_box(&shape.bounds()), Winding::Positive);
    base_visual(shape, theme, builder.build())
}

pub fn task_outline(shape: &Shape, theme: &RenderTheme) -> ShapeVisual {
    let bounds = shape.bounds();
    let radius = match shape.kind {
        ShapeKind::Task { corner_radius } => corner_radius,
        _ => 0.0,
    }
    .min(bounds.width.min(bounds.height) / 2.0)
    .max(0.0);

    let mut builder = Path::builder();
    if radius > 0.0 {
        builder.add_rounded_rectangle(
            &rect_box(&bounds),
            &BorderRadii::new(radius as f32),
            Winding::Positive,
        );
    } else {
        builder.add_rectangle(&rect_box(&bounds), Winding::Positive);
    }
    base_visual(shape, theme, builder.build())
}

pub fn event_outline(shape: &Shape, theme: &RenderTheme) -> ShapeVisual {
    let bounds = shape.bounds();
    let mut builder = Path::builder();
    builder.add_ellipse(
        pt(bounds.center()),
        lyon::math::vector((bounds.width / 2.0) as f32, (bounds.height / 2.0) as f32),
        lyon::math::Angle::radians(0.0),
        Winding::Positive,
    );
    let mut visual = base_visual(shape, theme, builder.build());
    if matches!(
        shape.kind,
        ShapeKind::Event {
            event_type: EventType::End
        }
    ) {
        visual.stroke_width = (visual.stroke_width * END_EVENT_STROKE_FACTOR).min(MAX_STROKE_WIDTH);
    }
    visual
}

pub fn gateway_outline(shape: &Shape, theme: &RenderTheme) -> ShapeVisual {
    let b = shape.bounds();
    let c = b.center();
    let mut builder = Path::builder();
    builder.begin(pt(Position::new(c.x, b.min_y())));
    builder.line_to(pt(Position::new(b.max_x(), c.y)));
    builder.line_to(pt(Position::new(c.x, b.max_y())));
    builder.line_to(pt(Position::new(b.min_x(), c.y)));
    builder.close();
    base_visual(shape, theme, builder.build())
}

pub fn pool_outline(shape: &Shape, theme: &RenderTheme) -> ShapeVisual {
    let b = shape.bounds();
    let header = match shape.kind {
        ShapeKind::Pool { header_width } => header_width.clamp(0.0, b.width),
        _ => 0.0,
    };
    let mut builder = Path::builder();
    builder.add_rectangle(&rect_box(&b), Winding::Positive);
    if header > 0.0 {
        builder.begin(pt(Position::new(b.min_x() + header, b.min_y())));
        builder.line_to(pt(Position::new(b.min_x() + header, b.max_y())));
        builder.end(false);
    }
    let mut visual = base_visual(shape, theme, builder.build());
    // pool labels sit in the header band
    if header > 0.0 {
        visual.text_anchor = Position::new(b.min_x() + header / 2.0, b.center().y);
    }
    visual
}

pub fn connector_outline(
    connector: &Connector,
    geometry: &ConnectorGeometry,
    theme: &RenderTheme,
) -> ConnectorVisual {
    let mut builder = Path::builder();
    match &geometry.path {
        ConnectorPath::Polyline(points) => {
            if let Some((first, rest)) = points.split_first() {
                builder.begin(pt(*first));
                for p in rest {
                    builder.line_to(pt(*p));
                }
                builder.end(false);
            }
        }
        ConnectorPath::Cubic {
            start,
            ctrl1,
            ctrl2,
            end,
        } => {
            builder.begin(pt(*start));
            builder.cubic_bezier_to(pt(*ctrl1), pt(*ctrl2), pt(*end));
            builder.end(false);
        }
    }

    let mut arrowheads = Vec::new();
    if connector.arrow_start {
        arrowheads.push(Arrowhead {
            tip: geometry.start,
            angle: geometry.start_angle,
        });
    }
    if connector.arrow_end {
        arrowheads.push(Arrowhead {
            tip: geometry.end,
            angle: geometry.end_angle,
        });
    }

    ConnectorVisual {
        path: builder.build(),
        arrowheads,
        stroke: connector
            .stroke_color
            .clone()
            .unwrap_or_else(|| theme.connector_color.clone()),
        stroke_width: connector.stroke_width.unwrap_or(theme.stroke_width),
    }
}

fn builtin_shape_renderers() -> Vec<(&'static str, ShapeRenderFn)> {
    vec![
        ("rectangle", Arc::new(rectangle_outline) as ShapeRenderFn),
        ("task", Arc::new(task_outline) as ShapeRenderFn),
        ("event", Arc::new(event_outline) as ShapeRenderFn),
        ("gateway", Arc::new(gateway_outline) as ShapeRenderFn),
        ("pool", Arc::new(pool_outline) as ShapeRenderFn),
    ]
}

fn builtin_connector_renderers() -> Vec<(&'static str, ConnectorRenderFn)> {
    ["straight", "orthogonal", "curved"]
        .into_iter()
        .map(|key| (key, Arc::new(connector_outline) as ConnectorRenderFn))
        .collect()
}

/// Shape and connector renderer registries.
#[derive(Clone, Debug)]
pub struct Renderers {
    pub shapes: HandlerRegistry<ShapeRenderFn>,
    pub connectors: HandlerRegistry<ConnectorRenderFn>,
}

impl Default for Renderers {
    fn default() -> Self {
        Self {
            shapes: HandlerRegistry::with_builtins(builtin_shape_renderers()),
            connectors: HandlerRegistry::with_builtins(builtin_connector_renderers()),
        }
    }
}

impl Renderers {
    /// Renders with the handler for `shapeType:subType`, then `shapeType`,
    /// then the rectangle outline.
    pub fn render_shape(&self, shape: &Shape, theme: &RenderTheme) -> ShapeVisual {
        match self.shapes.resolve(shape.shape_type(), shape.sub_type()) {
            Some(render) => render(shape, theme),
            None => {
                tracing::debug!(
                    "No renderer for shape type '{}', using rectangle",
                    shape.shape_type()
                );
                rectangle_outline(shape, theme)
            }
        }
    }

    pub fn render_connector(
        &self,
        connector: &Connector,
        geometry: &ConnectorGeometry,
        theme: &RenderTheme,
    ) -> ConnectorVisual {
        let key = connector.connector_type().to_string();
        match self.connectors.resolve(&key, None) {
            Some(render) => render(connector, geometry, theme),
            None => connector_outline(connector, geometry, theme),
        }
    }

    pub fn reset(&mut self) {
        self.shapes.reset();
        self.connectors.reset();
    }
}
