use std::collections::HashMap;

use diagramkit_core::{AnchorPosition, Bounds, Dimensions, Position};
use diagramkit_designer::entity_system::{
    find_entities_in_box, find_entity_at_point, get_bounds, hit_test, validate_many,
    EntityContext,
};
use diagramkit_designer::model::{
    ConnectionPoint, Connector, ConnectorKind, Entity, EventType, GatewayType, Shape, ShapeKind,
};

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape::new(
        id,
        ShapeKind::Rectangle,
        Position::new(x, y),
        Dimensions::new(100.0, 50.0),
    )
}

fn entities() -> (Vec<Entity>, HashMap<String, Shape>) {
    let a = rect("a", 0.0, 0.0);
    let b = rect("b", 200.0, 0.0);
    let c = Connector::new(
        "c1",
        ConnectionPoint::new("a", AnchorPosition::E),
        ConnectionPoint::new("b", AnchorPosition::W),
        ConnectorKind::Straight,
    );
    let shapes = [a.clone(), b.clone()]
        .into_iter()
        .map(|s| (s.id().to_string(), s))
        .collect();
    (vec![a.into(), b.into(), c.into()], shapes)
}

#[test]
fn test_connector_without_shapes_has_no_bounds() {
    let (entities, shapes) = entities();
    let bare = EntityContext::new();
    assert!(get_bounds(&entities[2], &bare).is_none());
    assert!(!hit_test(&entities[2], 150.0, 25.0, &bare));

    let ctx = EntityContext::new().with_shapes(&shapes);
    assert!(get_bounds(&entities[2], &ctx).is_some());
    assert!(hit_test(&entities[2], 150.0, 25.0, &ctx));
}

#[test]
fn test_shape_bounds_are_its_box() {
    let (entities, _) = entities();
    assert_eq!(
        get_bounds(&entities[0], &EntityContext::new()),
        Some(Bounds::new(0.0, 0.0, 100.0, 50.0))
    );
}

#[test]
fn test_topmost_entity_wins() {
    let mut entities = vec![Entity::Shape(rect("under", 0.0, 0.0))];
    entities.push(Entity::Shape(rect("over", 50.0, 0.0)));
    let hit = find_entity_at_point(&entities, 75.0, 25.0, &EntityContext::new());
    assert_eq!(hit.map(Entity::id), Some("over"));
    let hit = find_entity_at_point(&entities, 25.0, 25.0, &EntityContext::new());
    assert_eq!(hit.map(Entity::id), Some("under"));
    assert!(find_entity_at_point(&entities, 500.0, 500.0, &EntityContext::new()).is_none());
}

#[test]
fn test_event_and_gateway_silhouettes() {
    let event = Shape::new(
        "e",
        ShapeKind::event(EventType::Start),
        Position::new(0.0, 0.0),
        Dimensions::new(40.0, 40.0),
    );
    assert!(event.contains_point(20.0, 20.0, 0.0));
    // bounding box corner is outside the circle
    assert!(!event.contains_point(1.0, 1.0, 0.0));

    let gateway = Shape::new(
        "g",
        ShapeKind::gateway(GatewayType::Parallel),
        Position::new(0.0, 0.0),
        Dimensions::new(40.0, 40.0),
    );
    assert!(gateway.contains_point(20.0, 2.0, 0.0));
    assert!(!gateway.contains_point(3.0, 3.0, 0.0));
}

#[test]
fn test_box_selection_uses_bounds() {
    let (entities, shapes) = entities();
    let ctx = EntityContext::new().with_shapes(&shapes);
    let area = Bounds::new(190.0, 0.0, 20.0, 20.0);
    let ids: Vec<&str> = find_entities_in_box(&entities, &area, &ctx)
        .into_iter()
        .map(Entity::id)
        .collect();
    assert_eq!(ids, vec!["b", "c1"]);
}

#[test]
fn test_validate_many_reports_failures_only() {
    let (mut entities, _) = entities();
    entities.push(Entity::Shape(Shape::new(
        "bad",
        ShapeKind::Rectangle,
        Position::new(0.0, 0.0),
        Dimensions::new(0.0, 10.0),
    )));
    let failures = validate_many(&entities, &EntityContext::new());
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "bad");
}
