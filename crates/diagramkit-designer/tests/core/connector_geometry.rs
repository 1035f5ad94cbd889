use std::collections::HashMap;
use std::f64::consts::PI;

use diagramkit_core::{AnchorPosition, Dimensions, Position};
use diagramkit_designer::connector_geometry::{
    compute_geometry, hit_test_connector, is_connector_valid, nearest_anchor,
    recalculate_anchors, ConnectorPath, GeometryOptions,
};
use diagramkit_designer::model::{ConnectionPoint, Connector, ConnectorKind, Shape, ShapeKind};

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape::new(
        id,
        ShapeKind::Rectangle,
        Position::new(x, y),
        Dimensions::new(100.0, 50.0),
    )
}

fn two_shapes() -> HashMap<String, Shape> {
    [rect("a", 0.0, 0.0), rect("b", 200.0, 0.0)]
        .into_iter()
        .map(|s| (s.id().to_string(), s))
        .collect()
}

fn connector(kind: ConnectorKind) -> Connector {
    Connector::new(
        "c1",
        ConnectionPoint::new("a", AnchorPosition::E),
        ConnectionPoint::new("b", AnchorPosition::W),
        kind,
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_straight_east_to_west() {
    let shapes = two_shapes();
    let geometry = compute_geometry(
        &connector(ConnectorKind::Straight),
        &shapes,
        &GeometryOptions::default(),
    )
    .expect("both shapes exist");

    assert_eq!(geometry.start, Position::new(100.0, 25.0));
    assert_eq!(geometry.end, Position::new(200.0, 25.0));
    assert!(approx(geometry.end_angle, 0.0));
    assert!(approx(geometry.start_angle.abs(), PI));
    assert_eq!(
        geometry.path,
        ConnectorPath::Polyline(vec![Position::new(100.0, 25.0), Position::new(200.0, 25.0)])
    );
}

#[test]
fn test_bounds_include_padding() {
    let shapes = two_shapes();
    let geometry = compute_geometry(
        &connector(ConnectorKind::Straight),
        &shapes,
        &GeometryOptions::default(),
    )
    .expect("both shapes exist");
    assert!(approx(geometry.bounds.x, 90.0));
    assert!(approx(geometry.bounds.y, 15.0));
    assert!(approx(geometry.bounds.width, 120.0));
    assert!(approx(geometry.bounds.height, 20.0));
}

#[test]
fn test_orthogonal_default_elbow() {
    let mut shapes = two_shapes();
    shapes.insert("b".to_string(), rect("b", 200.0, 100.0));
    let geometry = compute_geometry(
        &connector(ConnectorKind::Orthogonal {
            waypoints: Vec::new(),
        }),
        &shapes,
        &GeometryOptions::default(),
    )
    .expect("both shapes exist");

    assert_eq!(
        geometry.path.control_points(),
        vec![
            Position::new(100.0, 25.0),
            Position::new(150.0, 25.0),
            Position::new(150.0, 125.0),
            Position::new(200.0, 125.0),
        ]
    );
    assert!(approx(geometry.end_angle, 0.0));
}

#[test]
fn test_orthogonal_waypoints_are_used_verbatim() {
    let shapes = two_shapes();
    let waypoints = vec![Position::new(120.0, 25.0), Position::new(120.0, 80.0)];
    let geometry = compute_geometry(
        &connector(ConnectorKind::Orthogonal {
            waypoints: waypoints.clone(),
        }),
        &shapes,
        &GeometryOptions::default(),
    )
    .expect("both shapes exist");
    let points = geometry.path.control_points();
    assert_eq!(points.len(), 4);
    assert_eq!(&points[1..3], waypoints.as_slice());
}

#[test]
fn test_curved_path_endpoints_and_angles() {
    let shapes = two_shapes();
    let geometry = compute_geometry(
        &connector(ConnectorKind::Curved { curvature: 1.0 }),
        &shapes,
        &GeometryOptions::default(),
    )
    .expect("both shapes exist");

    let ConnectorPath::Cubic { ctrl1, ctrl2, .. } = &geometry.path else {
        panic!("curved connector should produce a cubic path");
    };
    assert!(ctrl1.x > 100.0);
    assert!(ctrl2.x < 200.0);
    assert!(approx(geometry.end_angle, 0.0));

    let flat = geometry.path.flatten(16);
    assert_eq!(flat.len(), 17);
    assert_eq!(flat[0], Position::new(100.0, 25.0));
    assert_eq!(flat[16], Position::new(200.0, 25.0));
}

#[test]
fn test_missing_shape_yields_none() {
    let mut shapes = two_shapes();
    shapes.remove("b");
    let c = connector(ConnectorKind::Straight);
    assert!(compute_geometry(&c, &shapes, &GeometryOptions::default()).is_none());
    assert!(!is_connector_valid(&c, &shapes));
}

#[test]
fn test_hit_test_at_tolerance_boundary() {
    let shapes = two_shapes();
    let c = connector(ConnectorKind::Straight);
    let options = GeometryOptions::default();

    assert!(hit_test_connector(&c, &shapes, 150.0, 25.0, 5.0, &options));
    assert!(hit_test_connector(&c, &shapes, 150.0, 30.0, 5.0, &options));
    assert!(!hit_test_connector(&c, &shapes, 150.0, 31.0, 5.0, &options));
}

#[test]
fn test_nearest_anchor_and_recalculation() {
    let shapes = two_shapes();
    let a = &shapes["a"];
    assert_eq!(nearest_anchor(a, Position::new(500.0, 25.0)), AnchorPosition::E);
    assert_eq!(nearest_anchor(a, Position::new(50.0, -300.0)), AnchorPosition::N);

    let c = Connector::new(
        "c1",
        ConnectionPoint::new("a", AnchorPosition::N),
        ConnectionPoint::new("b", AnchorPosition::S),
        ConnectorKind::Straight,
    );
    assert_eq!(
        recalculate_anchors(&c, &shapes),
        Some((AnchorPosition::E, AnchorPosition::W))
    );
}

#[test]
fn test_anchor_aware_route_wraps_around_same_facing_target() {
    let shapes = two_shapes();
    let link = Connector::new(
        "c1",
        ConnectionPoint::new("a", AnchorPosition::E),
        ConnectionPoint::new("b", AnchorPosition::E),
        ConnectorKind::Orthogonal { waypoints: vec![] },
    );
    let options = GeometryOptions {
        anchor_aware_routing: true,
        ..GeometryOptions::default()
    };
    let geometry = compute_geometry(&link, &shapes, &options).unwrap();
    let ConnectorPath::Polyline(points) = &geometry.path else {
        panic!("orthogonal connectors route as polylines");
    };

    assert_eq!(points.last(), Some(&Position::new(300.0, 25.0)));
    // every segment stays outside b's bounds (200, 0)..(300, 50)
    for w in points.windows(2) {
        let mid = Position::new((w[0].x + w[1].x) / 2.0, (w[0].y + w[1].y) / 2.0);
        assert!(!(mid.x > 200.0 && mid.x < 300.0 && mid.y > 0.0 && mid.y < 50.0));
    }
    assert!(approx(geometry.end_angle, PI));
}
