use diagramkit_core::{AnchorPosition, CascadePolicy, Dimensions, Position};
use diagramkit_designer::commands::{Command, DiagramCommand, EntityMove, MoveEntities};
use diagramkit_designer::history::CommandHistory;
use diagramkit_designer::model::{
    ConnectionPoint, Connector, ConnectorKind, Shape, ShapeKind, ShapeLookup,
};
use diagramkit_designer::store::EntityStore;
use proptest::prelude::*;

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape::new(
        id,
        ShapeKind::Rectangle,
        Position::new(x, y),
        Dimensions::new(40.0, 20.0),
    )
}

fn run(history: &mut CommandHistory, store: &mut EntityStore, mut cmd: DiagramCommand) {
    cmd.execute(store).unwrap();
    history.record(cmd);
}

#[test]
fn test_history_creation() {
    let history = CommandHistory::new(50);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.max_depth(), 50);
}

#[test]
fn test_undo_then_redo() {
    let mut store = EntityStore::new();
    let mut history = CommandHistory::new(50);
    run(&mut history, &mut store, DiagramCommand::add(rect("a", 0.0, 0.0)));
    assert_eq!(history.undo_name(), Some("Add shape"));

    assert!(history.undo(&mut store).unwrap());
    assert!(store.is_empty());
    assert!(history.can_redo());

    assert!(history.redo(&mut store).unwrap());
    assert!(store.contains("a"));
    assert!(!history.can_redo());
}

#[test]
fn test_empty_stacks_are_noops() {
    let mut store = EntityStore::new();
    let mut history = CommandHistory::new(10);
    assert!(!history.undo(&mut store).unwrap());
    assert!(!history.redo(&mut store).unwrap());
}

#[test]
fn test_new_command_clears_redo() {
    let mut store = EntityStore::new();
    let mut history = CommandHistory::new(50);
    run(&mut history, &mut store, DiagramCommand::add(rect("a", 0.0, 0.0)));
    history.undo(&mut store).unwrap();
    run(&mut history, &mut store, DiagramCommand::add(rect("b", 0.0, 0.0)));
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 1);
}

#[test]
fn test_max_depth_drops_oldest() {
    let mut store = EntityStore::new();
    let mut history = CommandHistory::new(3);
    for i in 0..5 {
        run(
            &mut history,
            &mut store,
            DiagramCommand::add(rect(&format!("s{i}"), 0.0, 0.0)),
        );
    }
    assert_eq!(history.undo_depth(), 3);
    while history.undo(&mut store).unwrap() {}
    assert_eq!(store.ids().collect::<Vec<_>>(), vec!["s0", "s1"]);
}

#[test]
fn test_disabled_history_records_nothing() {
    let mut store = EntityStore::new();
    let mut history = CommandHistory::new(10);
    history.set_enabled(false);
    run(&mut history, &mut store, DiagramCommand::add(rect("a", 0.0, 0.0)));
    assert!(!history.can_undo());
    assert!(store.contains("a"));
}

#[derive(Debug, Clone)]
enum Op {
    Add(f64, f64),
    Move(usize, f64, f64),
    Connect(usize, usize),
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-500.0..500.0f64, -500.0..500.0f64).prop_map(|(x, y)| Op::Add(x, y)),
        (0usize..8, -50.0..50.0f64, -50.0..50.0f64).prop_map(|(i, dx, dy)| Op::Move(i, dx, dy)),
        (0usize..8, 0usize..8).prop_map(|(i, j)| Op::Connect(i, j)),
        (0usize..8).prop_map(Op::Delete),
    ]
}

fn command_for(store: &EntityStore, op: &Op, n: usize) -> Option<DiagramCommand> {
    let ids: Vec<String> = store.ids().map(str::to_string).collect();
    match op {
        Op::Add(x, y) => Some(DiagramCommand::add(rect(&format!("p{n}"), *x, *y))),
        Op::Move(i, dx, dy) => {
            let id = ids.get(i % ids.len().max(1))?;
            let from = store.shape(id)?.position;
            Some(
                MoveEntities::new(vec![EntityMove {
                    entity_id: id.clone(),
                    from,
                    to: from.offset(*dx, *dy),
                }])
                .into(),
            )
        }
        Op::Connect(i, j) => {
            let shapes: Vec<&str> = store.shapes().map(|s| s.id()).collect();
            let source = shapes.get(i % shapes.len().max(1))?;
            let target = shapes.get(j % shapes.len().max(1))?;
            Some(DiagramCommand::add(Connector::new(
                format!("c{n}"),
                ConnectionPoint::new(*source, AnchorPosition::E),
                ConnectionPoint::new(*target, AnchorPosition::W),
                ConnectorKind::Straight,
            )))
        }
        Op::Delete(i) => {
            let id = ids.get(i % ids.len().max(1))?;
            Some(DiagramCommand::delete([id.as_str()]))
        }
    }
}

proptest! {
    #[test]
    fn prop_undo_all_restores_initial_state(
        ops in prop::collection::vec(op(), 1..20),
        detach in any::<bool>(),
    ) {
        let mut store = EntityStore::new();
        if detach {
            store.set_cascade_policy(CascadePolicy::Detach);
        }
        store.internal_add(rect("seed", 0.0, 0.0).into()).unwrap();
        let initial = store.snapshot();
        let mut history = CommandHistory::new(100);

        let mut states = vec![initial.clone()];
        for (n, op) in ops.iter().enumerate() {
            if let Some(mut cmd) = command_for(&store, op, n) {
                if cmd.execute(&mut store).is_ok() {
                    history.record(cmd);
                    states.push(store.snapshot());
                }
            }
        }

        while history.undo(&mut store).unwrap() {}
        prop_assert_eq!(store.snapshot(), initial);

        while history.redo(&mut store).unwrap() {}
        prop_assert_eq!(&store.snapshot(), states.last().unwrap());
    }
}
