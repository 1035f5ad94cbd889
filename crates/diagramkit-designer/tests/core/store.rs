use diagramkit_core::{
    AnchorPosition, CascadePolicy, DiagramError, DiagramEvent, Dimensions, Position,
};
use diagramkit_designer::model::{
    ConnectionPoint, Connector, ConnectorKind, Entity, Shape, ShapeKind, ShapeLookup,
};
use diagramkit_designer::store::EntityStore;

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape::new(
        id,
        ShapeKind::Rectangle,
        Position::new(x, y),
        Dimensions::new(100.0, 50.0),
    )
}

fn link(id: &str, from: &str, to: &str) -> Connector {
    Connector::new(
        id,
        ConnectionPoint::new(from, AnchorPosition::E),
        ConnectionPoint::new(to, AnchorPosition::W),
        ConnectorKind::Straight,
    )
}

fn populated() -> EntityStore {
    let mut store = EntityStore::new();
    store.internal_add(rect("a", 0.0, 0.0).into()).unwrap();
    store.internal_add(rect("b", 200.0, 0.0).into()).unwrap();
    store.internal_add(link("c1", "a", "b").into()).unwrap();
    store.take_events();
    store
}

#[test]
fn test_ids_are_unique_across_kinds() {
    let mut store = populated();
    let err = store
        .internal_add(rect("c1", 0.0, 0.0).into())
        .unwrap_err();
    assert_eq!(err, DiagramError::DuplicateId { id: "c1".to_string() });
    assert_eq!(store.len(), 3);
}

#[test]
fn test_connector_to_missing_shape_is_rejected() {
    let mut store = populated();
    let err = store
        .internal_add(link("c2", "a", "ghost").into())
        .unwrap_err();
    assert!(err.is_validation());
    assert!(!store.contains("c2"));
}

#[test]
fn test_connector_frame_is_derived_on_add() {
    let store = populated();
    let connector = store.connector("c1").unwrap();
    assert_eq!(connector.position, Position::new(90.0, 15.0));
    assert_eq!(connector.dimensions, Dimensions::new(120.0, 20.0));
}

#[test]
fn test_moving_shape_refreshes_attached_connector() {
    let mut store = populated();
    let mut moved = store.shape("b").unwrap().clone();
    moved.position = Position::new(200.0, 100.0);
    store.internal_update(moved.into()).unwrap();

    let connector = store.connector("c1").unwrap();
    assert_eq!(connector.dimensions.height, 120.0);
    let events = store.take_events();
    assert!(events.contains(&DiagramEvent::EntityUpdated {
        id: "c1".to_string(),
        kind: diagramkit_core::EntityKind::Connector,
    }));
}

#[test]
fn test_update_rejects_kind_change_and_unknown_id() {
    let mut store = populated();
    let err = store
        .internal_update(Entity::Shape(rect("c1", 0.0, 0.0)))
        .unwrap_err();
    assert!(matches!(err, DiagramError::KindMismatch { .. }));
    let err = store.internal_update(rect("zzz", 0.0, 0.0).into()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_invalid_update_leaves_store_untouched() {
    let mut store = populated();
    let mut bad = store.shape("a").unwrap().clone();
    bad.dimensions = Dimensions::new(-1.0, 50.0);
    assert!(store.internal_update(bad.into()).is_err());
    assert_eq!(store.shape("a").unwrap().dimensions.width, 100.0);
}

#[test]
fn test_cascade_delete_and_restore_preserves_order() {
    let mut store = populated();
    store.internal_add(rect("c", 400.0, 0.0).into()).unwrap();
    store.internal_add(link("c2", "b", "c").into()).unwrap();
    let before: Vec<String> = store.ids().map(str::to_string).collect();

    let removal = store.internal_delete("b").unwrap();
    assert_eq!(removal.len(), 3);
    assert!(removal.contains("c1") && removal.contains("c2"));
    assert_eq!(store.ids().collect::<Vec<_>>(), vec!["a", "c"]);

    store.internal_restore(&removal).unwrap();
    let after: Vec<String> = store.ids().map(str::to_string).collect();
    assert_eq!(before, after);
}

#[test]
fn test_detach_policy_keeps_connectors() {
    let mut store = populated();
    store.set_cascade_policy(CascadePolicy::Detach);
    let removal = store.internal_delete("b").unwrap();
    assert_eq!(removal.ids(), vec!["b"]);
    assert!(store.contains("c1"));
}

#[test]
fn test_detached_connector_restores_after_delete() {
    let mut store = populated();
    store.set_cascade_policy(CascadePolicy::Detach);
    let shape_removal = store.internal_delete("b").unwrap();
    let connector_removal = store.internal_delete("c1").unwrap();
    assert_eq!(connector_removal.entries()[0].dangling, vec!["b".to_string()]);

    store.internal_restore(&connector_removal).unwrap();
    assert_eq!(store.index_of("c1"), Some(1));
    store.internal_restore(&shape_removal).unwrap();
    assert_eq!(store.ids().collect::<Vec<_>>(), vec!["a", "b", "c1"]);
}

#[test]
fn test_detached_connector_accepts_updates_but_not_new_dangling_ends() {
    let mut store = populated();
    store.internal_add(rect("d", 400.0, 0.0).into()).unwrap();
    store.set_cascade_policy(CascadePolicy::Detach);
    store.internal_delete("b").unwrap();

    let mut recolored = store.connector("c1").unwrap().clone();
    recolored.stroke_color = Some("red".to_string());
    store.internal_update(recolored.into()).unwrap();
    assert_eq!(store.connector("c1").unwrap().stroke_color.as_deref(), Some("red"));

    let mut rewired = store.connector("c1").unwrap().clone();
    rewired.source.shape_id = "ghost".to_string();
    let err = store.internal_update(rewired.into()).unwrap_err();
    assert_eq!(
        err,
        DiagramError::Validation {
            entity_id: "c1".to_string(),
            errors: vec!["source shape 'ghost' does not exist".to_string()],
        }
    );

    let mut reattached = store.connector("c1").unwrap().clone();
    reattached.target.shape_id = "d".to_string();
    store.internal_update(reattached.into()).unwrap();
    let connector = store.connector("c1").unwrap();
    assert!(store.shape(&connector.target.shape_id).is_some());
}

#[test]
fn test_delete_many_is_all_or_nothing() {
    let mut store = populated();
    let err = store.internal_delete_many(&["a", "nope"]).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.len(), 3);
}

#[test]
fn test_replace_all_rejects_duplicates() {
    let mut store = populated();
    let err = store
        .replace_all(vec![rect("x", 0.0, 0.0).into(), rect("x", 10.0, 0.0).into()])
        .unwrap_err();
    assert!(matches!(err, DiagramError::DuplicateId { .. }));
    assert_eq!(store.len(), 3);
}
