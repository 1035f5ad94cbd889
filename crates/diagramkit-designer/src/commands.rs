use tracing::debug;

use diagramkit_core::{AnchorPosition, DiagramError, EntityKind, Position, Result};

use crate::model::{ConnectorKind, Entity};
use crate::store::{EntityStore, Removal};

/// A reversible mutation of the entity store.
pub trait Command {
    /// Executes the command; on error the store is left unchanged.
    fn execute(&mut self, store: &mut EntityStore) -> Result<()>;

    /// Reverts a previously executed command.
    fn undo(&mut self, store: &mut EntityStore) -> Result<()>;

    /// Returns the name of the command for display.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum DiagramCommand {
    AddEntity(AddEntity),
    UpdateEntity(UpdateEntity),
    DeleteEntities(DeleteEntities),
    MoveEntities(MoveEntities),
    RecalculateAnchors(RecalculateAnchors),
    Composite(CompositeCommand),
}

#[derive(Debug, Clone)]
pub struct AddEntity {
    pub entity: Entity,
    pub name: String,
    // Set once undone, so redo restores the original z-order slot
    pub removal: Option<Removal>,
}

#[derive(Debug, Clone)]
pub struct UpdateEntity {
    pub before: Entity,
    pub after: Entity,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteEntities {
    pub ids: Vec<String>,
    pub name: String,
    /// Everything removed by the last execution, cascades included.
    pub removal: Option<Removal>,
}

/// Absolute from/to position of one shape in a batch move.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMove {
    pub entity_id: String,
    pub from: Position,
    pub to: Position,
}

/// Absolute from/to waypoints of one orthogonal connector in a batch move.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointMove {
    pub connector_id: String,
    pub from: Vec<Position>,
    pub to: Vec<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPair {
    pub source: AnchorPosition,
    pub target: AnchorPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnchorChange {
    pub connector_id: String,
    pub from: AnchorPair,
    pub to: AnchorPair,
}

/// One drag gesture (or programmatic batch move) as a single undo step.
#[derive(Debug, Clone, Default)]
pub struct MoveEntities {
    pub moves: Vec<EntityMove>,
    pub waypoint_moves: Vec<WaypointMove>,
    pub anchor_changes: Vec<AnchorChange>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RecalculateAnchors {
    pub changes: Vec<AnchorChange>,
    pub name: String,
}

/// Sub-commands applied as one atomic unit.
#[derive(Debug, Clone)]
pub struct CompositeCommand {
    pub commands: Vec<DiagramCommand>,
    pub name: String,
}

impl DiagramCommand {
    pub fn add(entity: impl Into<Entity>) -> Self {
        let entity = entity.into();
        let name = format!("Add {}", entity.kind());
        DiagramCommand::AddEntity(AddEntity {
            entity,
            name,
            removal: None,
        })
    }

    /// `None` when `before` and `after` are identical.
    pub fn update(before: Entity, after: Entity) -> Option<Self> {
        if before == after {
            return None;
        }
        let name = format!("Update {}", after.kind());
        Some(DiagramCommand::UpdateEntity(UpdateEntity {
            before,
            after,
            name,
        }))
    }

    pub fn delete<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let name = match ids.len() {
            1 => "Delete entity".to_string(),
            n => format!("Delete {} entities", n),
        };
        DiagramCommand::DeleteEntities(DeleteEntities {
            ids,
            name,
            removal: None,
        })
    }

    pub fn move_entities(moves: MoveEntities) -> Self {
        moves.into()
    }

    pub fn recalculate_anchors(changes: Vec<AnchorChange>) -> Self {
        DiagramCommand::RecalculateAnchors(RecalculateAnchors {
            changes,
            name: "Recalculate anchors".to_string(),
        })
    }

    pub fn composite(name: impl Into<String>, commands: Vec<DiagramCommand>) -> Self {
        DiagramCommand::Composite(CompositeCommand {
            commands,
            name: name.into(),
        })
    }
}

impl MoveEntities {
    pub fn new(moves: Vec<EntityMove>) -> Self {
        Self {
            moves,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.waypoint_moves.is_empty() && self.anchor_changes.is_empty()
    }

    fn display_name(&self) -> String {
        match self.moves.len() + self.waypoint_moves.len() {
            1 => "Move entity".to_string(),
            n => format!("Move {} entities", n),
        }
    }

    /// Entities with the `to` (or `from`) side of every change applied.
    /// An entity touched by several changes appears once.
    fn targets(&self, store: &EntityStore, forward: bool) -> Result<Vec<Entity>> {
        let mut out: Vec<Entity> = Vec::new();

        for m in &self.moves {
            let i = slot(store, &mut out, &m.entity_id)?;
            match &mut out[i] {
                Entity::Shape(shape) => shape.position = if forward { m.to } else { m.from },
                Entity::Connector(_) => {
                    return Err(DiagramError::KindMismatch {
                        id: m.entity_id.clone(),
                        expected: EntityKind::Shape,
                    })
                }
            }
        }
        for m in &self.waypoint_moves {
            let i = slot(store, &mut out, &m.connector_id)?;
            let waypoints = if forward { &m.to } else { &m.from };
            match &mut out[i] {
                Entity::Connector(connector) => {
                    if let ConnectorKind::Orthogonal { waypoints: current } = &mut connector.kind {
                        *current = waypoints.clone();
                    }
                }
                Entity::Shape(_) => {
                    return Err(DiagramError::KindMismatch {
                        id: m.connector_id.clone(),
                        expected: EntityKind::Connector,
                    })
                }
            }
        }
        for change in &self.anchor_changes {
            let i = slot(store, &mut out, &change.connector_id)?;
            if let Entity::Connector(connector) = &mut out[i] {
                let pair = if forward { change.to } else { change.from };
                connector.source.anchor = pair.source;
                connector.target.anchor = pair.target;
            }
        }
        Ok(out)
    }
}

/// Index of `id` in `out`, cloning it from the store on first use.
fn slot(store: &EntityStore, out: &mut Vec<Entity>, id: &str) -> Result<usize> {
    if let Some(i) = out.iter().position(|e| e.id() == id) {
        return Ok(i);
    }
    let entity = store
        .get(id)
        .cloned()
        .ok_or_else(|| DiagramError::not_found(id))?;
    out.push(entity);
    Ok(out.len() - 1)
}

fn anchor_targets(
    store: &EntityStore,
    changes: &[AnchorChange],
    forward: bool,
) -> Result<Vec<Entity>> {
    changes
        .iter()
        .map(|change| {
            let mut connector = store
                .connector(&change.connector_id)
                .cloned()
                .ok_or_else(|| DiagramError::not_found(&change.connector_id))?;
            let pair = if forward { change.to } else { change.from };
            connector.source.anchor = pair.source;
            connector.target.anchor = pair.target;
            Ok(Entity::Connector(connector))
        })
        .collect()
}

/// Applies every update in order; on the first failure the already applied
/// ones are reverted and the error returned.
fn apply_updates(store: &mut EntityStore, updates: Vec<Entity>) -> Result<()> {
    let mut applied: Vec<Entity> = Vec::with_capacity(updates.len());
    for entity in updates {
        let before = match store.get(entity.id()) {
            Some(before) => before.clone(),
            None => {
                let err = DiagramError::not_found(entity.id());
                rollback(store, applied);
                return Err(err);
            }
        };
        if let Err(err) = store.internal_update(entity) {
            rollback(store, applied);
            return Err(err);
        }
        applied.push(before);
    }
    Ok(())
}

fn rollback(store: &mut EntityStore, applied: Vec<Entity>) {
    for before in applied.into_iter().rev() {
        if let Err(err) = store.internal_update(before) {
            tracing::error!("Rollback failed: {}", err);
        }
    }
}

impl Command for DiagramCommand {
    fn execute(&mut self, store: &mut EntityStore) -> Result<()> {
        let result = match self {
            DiagramCommand::AddEntity(cmd) => match cmd.removal.take() {
                Some(removal) => store.internal_restore(&removal).inspect_err(|_| {
                    cmd.removal = Some(removal.clone());
                }),
                None => store.internal_add(cmd.entity.clone()),
            },
            DiagramCommand::UpdateEntity(cmd) => store.internal_update(cmd.after.clone()),
            DiagramCommand::DeleteEntities(cmd) => {
                let removal = store.internal_delete_many(cmd.ids.as_slice())?;
                cmd.removal = Some(removal);
                Ok(())
            }
            DiagramCommand::MoveEntities(cmd) => {
                let updates = cmd.targets(store, true)?;
                apply_updates(store, updates)
            }
            DiagramCommand::RecalculateAnchors(cmd) => {
                let updates = anchor_targets(store, &cmd.changes, true)?;
                apply_updates(store, updates)
            }
            DiagramCommand::Composite(cmd) => {
                for i in 0..cmd.commands.len() {
                    if let Err(err) = cmd.commands[i].execute(store) {
                        for done in cmd.commands[..i].iter_mut().rev() {
                            if let Err(undo_err) = done.undo(store) {
                                tracing::error!("Composite rollback failed: {}", undo_err);
                            }
                        }
                        return Err(err);
                    }
                }
                Ok(())
            }
        };
        if result.is_ok() {
            debug!("Executed '{}'", self.name());
        }
        result
    }

    fn undo(&mut self, store: &mut EntityStore) -> Result<()> {
        let result = match self {
            DiagramCommand::AddEntity(cmd) => {
                let removal = store.internal_delete(cmd.entity.id())?;
                cmd.removal = Some(removal);
                Ok(())
            }
            DiagramCommand::UpdateEntity(cmd) => store.internal_update(cmd.before.clone()),
            DiagramCommand::DeleteEntities(cmd) => match &cmd.removal {
                Some(removal) => store.internal_restore(removal),
                None => Err(DiagramError::other("delete was never executed")),
            },
            DiagramCommand::MoveEntities(cmd) => {
                let updates = cmd.targets(store, false)?;
                apply_updates(store, updates)
            }
            DiagramCommand::RecalculateAnchors(cmd) => {
                let updates = anchor_targets(store, &cmd.changes, false)?;
                apply_updates(store, updates)
            }
            DiagramCommand::Composite(cmd) => {
                let len = cmd.commands.len();
                for i in (0..len).rev() {
                    if let Err(err) = cmd.commands[i].undo(store) {
                        for undone in cmd.commands[i + 1..].iter_mut() {
                            if let Err(redo_err) = undone.execute(store) {
                                tracing::error!("Composite rollback failed: {}", redo_err);
                            }
                        }
                        return Err(err);
                    }
                }
                Ok(())
            }
        };
        if result.is_ok() {
            debug!("Undid '{}'", self.name());
        }
        result
    }

    fn name(&self) -> &str {
        match self {
            DiagramCommand::AddEntity(cmd) => &cmd.name,
            DiagramCommand::UpdateEntity(cmd) => &cmd.name,
            DiagramCommand::DeleteEntities(cmd) => &cmd.name,
            DiagramCommand::MoveEntities(cmd) => &cmd.name,
            DiagramCommand::RecalculateAnchors(cmd) => &cmd.name,
            DiagramCommand::Composite(cmd) => &cmd.name,
        }
    }
}

impl From<MoveEntities> for DiagramCommand {
    fn from(mut moves: MoveEntities) -> Self {
        if moves.name.is_empty() {
            moves.name = moves.display_name();
        }
        DiagramCommand::MoveEntities(moves)
    }
}
