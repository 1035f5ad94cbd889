//! Connector geometry
//!
//! Resolves connector endpoints against the shape map, generates the
//! connector path for each routing style, and derives the arrow angles,
//! bounds, hit test and nearest-anchor recalculation from it.
//!
//! Every function that needs an endpoint shape returns `None` (or `false`)
//! when the shape is missing; missing endpoints are tolerated, never errors.

use std::f64::consts::PI;

use lyon::geom::{point, CubicBezierSegment};

use diagramkit_core::{AnchorPosition, Bounds, Dimensions, Position};
use diagramkit_settings::Config;

use crate::model::{Connector, ConnectorKind, Shape, ShapeLookup};
use crate::routing;

/// Fraction of the endpoint distance used to place curve control points.
pub const CONTROL_POINT_FACTOR: f64 = 0.4;

/// Segments used when flattening curved connectors for hit testing.
pub const CURVE_SAMPLES: usize = 32;

/// Padding around connector bounds.
pub const DEFAULT_CONNECTOR_PADDING: f64 = 10.0;

/// Tunables for path generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryOptions {
    pub padding: f64,
    pub anchor_aware_routing: bool,
    pub stub_length: f64,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_CONNECTOR_PADDING,
            anchor_aware_routing: false,
            stub_length: 20.0,
        }
    }
}

impl GeometryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            padding: config.interaction.connector_padding,
            anchor_aware_routing: config.connectors.anchor_aware_routing,
            stub_length: config.connectors.stub_length,
        }
    }
}

/// Routed connector path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorPath {
    Polyline(Vec<Position>),
    Cubic {
        start: Position,
        ctrl1: Position,
        ctrl2: Position,
        end: Position,
    },
}

impl ConnectorPath {
    fn segment(&self) -> Option<CubicBezierSegment<f64>> {
        match self {
            ConnectorPath::Polyline(_) => None,
            ConnectorPath::Cubic {
                start,
                ctrl1,
                ctrl2,
                end,
            } => Some(CubicBezierSegment {
                from: point(start.x, start.y),
                ctrl1: point(ctrl1.x, ctrl1.y),
                ctrl2: point(ctrl2.x, ctrl2.y),
                to: point(end.x, end.y),
            }),
        }
    }

    /// Path as a polyline; curves are sampled into `segments` pieces.
    pub fn flatten(&self, segments: usize) -> Vec<Position> {
        match self {
            ConnectorPath::Polyline(points) => points.clone(),
            ConnectorPath::Cubic { .. } => {
                let Some(curve) = self.segment() else {
                    return Vec::new();
                };
                let segments = segments.max(1);
                (0..=segments)
                    .map(|i| {
                        let p = curve.sample(i as f64 / segments as f64);
                        Position::new(p.x, p.y)
                    })
                    .collect()
            }
        }
    }

    /// Defining points: polyline vertices or the curve's four points.
    pub fn control_points(&self) -> Vec<Position> {
        match self {
            ConnectorPath::Polyline(points) => points.clone(),
            ConnectorPath::Cubic {
                start,
                ctrl1,
                ctrl2,
                end,
            } => vec![*start, *ctrl1, *ctrl2, *end],
        }
    }
}

/// Everything a renderer or hit test needs about one connector.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorGeometry {
    pub start: Position,
    pub end: Position,
    pub path: ConnectorPath,
    /// Orientation of an arrowhead at the start, pointing back into the source.
    pub start_angle: f64,
    /// Orientation of an arrowhead at the end, pointing into the target.
    pub end_angle: f64,
    /// Padded bounds of the whole path.
    pub bounds: Bounds,
}

/// World-space start and end points, or `None` if either shape is missing.
pub fn resolve_endpoints(
    connector: &Connector,
    shapes: &dyn ShapeLookup,
) -> Option<(Position, Position)> {
    let source = shapes.shape(&connector.source.shape_id)?;
    let target = shapes.shape(&connector.target.shape_id)?;
    Some((
        source.anchor_point(connector.source.anchor),
        target.anchor_point(connector.target.anchor),
    ))
}

/// Cubic control points bowed along the horizontal axis.
pub fn curve_control_points(
    start: Position,
    end: Position,
    curvature: f64,
) -> (Position, Position) {
    let offset = start.distance_to(&end) * CONTROL_POINT_FACTOR * curvature;
    let sign = if end.x >= start.x { 1.0 } else { -1.0 };
    (
        start.offset(sign * offset, 0.0),
        end.offset(-sign * offset, 0.0),
    )
}

/// Generates the path for `connector` between already resolved endpoints.
///
/// `target` is the end shape's bounds, used to keep routed paths out of it.
pub fn build_path(
    connector: &Connector,
    start: Position,
    end: Position,
    target: Option<Bounds>,
    options: &GeometryOptions,
) -> ConnectorPath {
    match &connector.kind {
        ConnectorKind::Straight => ConnectorPath::Polyline(vec![start, end]),
        ConnectorKind::Orthogonal { waypoints } if !waypoints.is_empty() => {
            let mut points = Vec::with_capacity(waypoints.len() + 2);
            points.push(start);
            points.extend(waypoints.iter().copied());
            points.push(end);
            ConnectorPath::Polyline(points)
        }
        ConnectorKind::Orthogonal { .. } => {
            if options.anchor_aware_routing {
                ConnectorPath::Polyline(routing::route_orthogonal(
                    start,
                    connector.source.anchor.direction(),
                    end,
                    connector.target.anchor.direction(),
                    target,
                    options.stub_length,
                ))
            } else {
                ConnectorPath::Polyline(routing::default_elbow(start, end))
            }
        }
        ConnectorKind::Curved { curvature } => {
            let (ctrl1, ctrl2) = curve_control_points(start, end, *curvature);
            ConnectorPath::Cubic {
                start,
                ctrl1,
                ctrl2,
                end,
            }
        }
    }
}

fn direct_angle(start: Position, end: Position) -> f64 {
    start.angle_to(&end)
}

fn polyline_angles(points: &[Position]) -> Option<(f64, f64)> {
    let first = points
        .windows(2)
        .find(|w| w[0].distance_to(&w[1]) > f64::EPSILON)?;
    let last = points
        .windows(2)
        .rev()
        .find(|w| w[0].distance_to(&w[1]) > f64::EPSILON)?;
    Some((first[1].angle_to(&first[0]), last[0].angle_to(&last[1])))
}

fn path_angles(path: &ConnectorPath, start: Position, end: Position) -> (f64, f64) {
    let fallback = || {
        let angle = direct_angle(start, end);
        (angle + PI, angle)
    };
    match path {
        ConnectorPath::Polyline(points) => polyline_angles(points).unwrap_or_else(fallback),
        ConnectorPath::Cubic { .. } => {
            let Some(curve) = path.segment() else {
                return fallback();
            };
            let d0 = curve.derivative(0.0);
            let d1 = curve.derivative(1.0);
            let (direct_start, direct_end) = fallback();
            let start_angle = if d0.square_length() > f64::EPSILON {
                d0.y.atan2(d0.x) + PI
            } else {
                direct_start
            };
            let end_angle = if d1.square_length() > f64::EPSILON {
                d1.y.atan2(d1.x)
            } else {
                direct_end
            };
            (start_angle, end_angle)
        }
    }
}

fn path_bounds(path: &ConnectorPath, padding: f64) -> Option<Bounds> {
    let tight = match path {
        ConnectorPath::Polyline(points) => Bounds::from_points(points.iter().copied())?,
        ConnectorPath::Cubic { start, end, .. } => {
            let ends = Bounds::from_points([*start, *end])?;
            match path.segment() {
                Some(curve) => {
                    let bb = curve.bounding_box();
                    ends.union(&Bounds::new(
                        bb.min.x,
                        bb.min.y,
                        bb.max.x - bb.min.x,
                        bb.max.y - bb.min.y,
                    ))
                }
                None => ends,
            }
        }
    };
    Some(tight.expand(padding))
}

/// Full geometry for `connector`, or `None` if an endpoint shape is missing.
pub fn compute_geometry(
    connector: &Connector,
    shapes: &dyn ShapeLookup,
    options: &GeometryOptions,
) -> Option<ConnectorGeometry> {
    let (start, end) = resolve_endpoints(connector, shapes)?;
    let target = shapes.shape(&connector.target.shape_id).map(|s| s.bounds());
    let path = build_path(connector, start, end, target, options);
    let (start_angle, end_angle) = path_angles(&path, start, end);
    let bounds = path_bounds(&path, options.padding)?;
    Some(ConnectorGeometry {
        start,
        end,
        path,
        start_angle,
        end_angle,
        bounds,
    })
}

pub fn connector_bounds(
    connector: &Connector,
    shapes: &dyn ShapeLookup,
    options: &GeometryOptions,
) -> Option<Bounds> {
    compute_geometry(connector, shapes, options).map(|g| g.bounds)
}

/// Derived `(position, dimensions)` stored on the connector.
pub fn derived_frame(
    connector: &Connector,
    shapes: &dyn ShapeLookup,
    options: &GeometryOptions,
) -> Option<(Position, Dimensions)> {
    connector_bounds(connector, shapes, options).map(|b| (b.position(), b.dimensions()))
}

pub fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f64::EPSILON {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Position::new(a.x + t * abx, a.y + t * aby))
}

/// Shortest distance from `(x, y)` to the connector's path.
pub fn distance_to_path(geometry: &ConnectorGeometry, x: f64, y: f64) -> f64 {
    let p = Position::new(x, y);
    let points = geometry.path.flatten(CURVE_SAMPLES);
    match points.as_slice() {
        [] => f64::INFINITY,
        [only] => p.distance_to(only),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// True when `(x, y)` lies within `tolerance` of the connector's path.
pub fn hit_test_connector(
    connector: &Connector,
    shapes: &dyn ShapeLookup,
    x: f64,
    y: f64,
    tolerance: f64,
    options: &GeometryOptions,
) -> bool {
    compute_geometry(connector, shapes, options)
        .is_some_and(|geometry| distance_to_path(&geometry, x, y) <= tolerance)
}

/// Perimeter anchor of `shape` closest to `toward`. Ties keep the earlier
/// anchor in clockwise order from `n`.
pub fn nearest_anchor(shape: &Shape, toward: Position) -> AnchorPosition {
    let bounds = shape.bounds();
    let mut best = AnchorPosition::N;
    let mut best_distance = f64::INFINITY;
    for anchor in AnchorPosition::PERIMETER {
        let distance = bounds.anchor_point(anchor).distance_to(&toward);
        if distance < best_distance {
            best = anchor;
            best_distance = distance;
        }
    }
    best
}

/// Nearest `(source, target)` anchor pair: each side picks the anchor
/// closest to the other shape's center.
pub fn recalculate_anchors(
    connector: &Connector,
    shapes: &dyn ShapeLookup,
) -> Option<(AnchorPosition, AnchorPosition)> {
    let source = shapes.shape(&connector.source.shape_id)?;
    let target = shapes.shape(&connector.target.shape_id)?;
    Some((
        nearest_anchor(source, target.center()),
        nearest_anchor(target, source.center()),
    ))
}

/// A connector is valid when both endpoint shapes exist.
pub fn is_connector_valid(connector: &Connector, shapes: &dyn ShapeLookup) -> bool {
    shapes.shape(&connector.source.shape_id).is_some()
        && shapes.shape(&connector.target.shape_id).is_some()
}
