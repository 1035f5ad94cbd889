//! Diagram editing session
//!
//! [`DiagramSession`] is the explicit owner of one diagram: the entity
//! store, undo/redo history, selection, renderer registries, configuration
//! and change-notification bus. UI layers hold a session, call its
//! operations and subscribe to its events.
//!
//! Committed edits go through commands and land on the history. Live
//! interactions (a drag in progress) use the store's internal mutators
//! directly and commit a single command on release.

use diagramkit_core::{
    Bounds, DiagramError, DiagramEvent, EntityKind, EventBus, EventBusConfig, EventFilter,
    Position, Result, SubscriptionId,
};
use diagramkit_settings::Config;
use tracing::{debug, info, warn};

use crate::commands::{
    AnchorChange, AnchorPair, Command, DiagramCommand, EntityMove, MoveEntities, WaypointMove,
};
use crate::connector_geometry::{self, ConnectorGeometry};
use crate::document::{DiagramDocument, DiagramType};
use crate::entity_system::{self, EntityContext};
use crate::factory::{self, ConnectorOptions, ReferencePoint, ShapeOptions};
use crate::history::CommandHistory;
use crate::model::{
    ConnectionPoint, Connector, ConnectorKind, Entity, Shape, ShapeLookup, ShapeOverlay,
};
use crate::registry::ShapeValidators;
use crate::render::{ConnectorVisual, RenderTheme, Renderers, ShapeVisual};
use crate::selection_manager::SelectionManager;
use crate::store::EntityStore;
use crate::validation::ValidationResult;

/// Start positions captured when a drag begins.
#[derive(Debug, Clone)]
struct DragState {
    shapes: Vec<(String, Position)>,
    waypoints: Vec<(String, Vec<Position>)>,
    dx: f64,
    dy: f64,
}

pub struct DiagramSession {
    store: EntityStore,
    history: CommandHistory,
    selection: SelectionManager,
    renderers: Renderers,
    theme: RenderTheme,
    config: Config,
    events: EventBus,
    drag: Option<DragState>,
    diagram_type: DiagramType,
}

impl Default for DiagramSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramSession {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let events = EventBus::with_config(EventBusConfig {
            enable_history: config.events.enable_history,
            max_history_size: config.events.max_history_size,
        });
        Self {
            store: EntityStore::from_config(&config),
            history: CommandHistory::new(config.history.max_depth),
            selection: SelectionManager::new(),
            renderers: Renderers::default(),
            theme: RenderTheme::from(&config.theme),
            config,
            events,
            drag: None,
            diagram_type: DiagramType::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn renderers_mut(&mut self) -> &mut Renderers {
        &mut self.renderers
    }

    pub fn validators_mut(&mut self) -> &mut ShapeValidators {
        self.store.validators_mut()
    }

    pub fn theme(&self) -> &RenderTheme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: RenderTheme) {
        self.theme = theme;
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(DiagramEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(filter, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn context(&self) -> EntityContext<'_> {
        entity_context(&self.store, &self.config)
    }

    // ---- notifications ----

    fn publish(&self, event: DiagramEvent) {
        // no subscribers is not an error for the session
        let _ = self.events.publish(event);
    }

    fn flush_events(&mut self) {
        for event in self.store.take_events() {
            self.publish(event);
        }
    }

    fn publish_history(&self) {
        self.publish(DiagramEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn publish_selection(&self) {
        self.publish(DiagramEvent::SelectionChanged {
            ids: self.selection.selected_ids(),
        });
    }

    fn prune_selection(&mut self) {
        if self.selection.retain_existing(&self.store) {
            self.publish_selection();
        }
    }

    // ---- commands ----

    /// Executes `command` and records it only if it succeeded.
    pub fn push_command(&mut self, mut command: DiagramCommand) -> Result<()> {
        if self.drag.is_some() {
            warn!("Command '{}' issued during a drag; committing drag first", command.name());
            self.end_drag()?;
        }
        let result = command.execute(&mut self.store);
        self.flush_events();
        result?;
        self.history.record(command);
        self.publish_history();
        self.prune_selection();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.cancel_drag()?;
        let result = self.history.undo(&mut self.store);
        self.flush_events();
        let undone = result?;
        if undone {
            self.publish_history();
            self.prune_selection();
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.cancel_drag()?;
        let result = self.history.redo(&mut self.store);
        self.flush_events();
        let redone = result?;
        if redone {
            self.publish_history();
            self.prune_selection();
        }
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.publish_history();
    }

    // ---- entity operations ----

    pub fn add_shape(&mut self, shape: Shape) -> Result<String> {
        let id = shape.id().to_string();
        self.push_command(DiagramCommand::add(shape))?;
        Ok(id)
    }

    /// Builds a shape with the factory and adds it.
    pub fn create_shape(
        &mut self,
        x: f64,
        y: f64,
        reference: ReferencePoint,
        options: ShapeOptions,
    ) -> Result<String> {
        let shape =
            factory::create_shape(x, y, reference, options, Some(self.store.validators()))?;
        self.add_shape(shape)
    }

    pub fn add_connector(&mut self, connector: Connector) -> Result<String> {
        let id = connector.id().to_string();
        self.push_command(DiagramCommand::add(connector))?;
        Ok(id)
    }

    /// Connects two shapes with the configured connector defaults.
    pub fn connect(
        &mut self,
        source: ConnectionPoint,
        target: ConnectionPoint,
    ) -> Result<String> {
        let options = ConnectorOptions::from_settings(&self.config.connectors);
        let shapes: &dyn ShapeLookup = &self.store;
        let connector = factory::create_connector(source, target, options, Some(shapes))?;
        self.add_connector(connector)
    }

    /// Connects two shapes at their nearest anchor pair.
    pub fn connect_shapes(&mut self, source_id: &str, target_id: &str) -> Result<String> {
        let options = ConnectorOptions::from_settings(&self.config.connectors);
        let shapes: &dyn ShapeLookup = &self.store;
        let connector = factory::connect_shapes(source_id, target_id, options, Some(shapes))?;
        self.add_connector(connector)
    }

    /// Applies `edit` to a copy of the shape and commits the result.
    ///
    /// Returns `Ok(false)` when the edit changed nothing.
    pub fn update_shape<F>(&mut self, id: &str, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Shape),
    {
        let before = self.shape_or_err(id)?.clone();
        let mut after = before.clone();
        edit(&mut after);
        self.commit_update(Entity::Shape(before), Entity::Shape(after))
    }

    pub fn update_connector<F>(&mut self, id: &str, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Connector),
    {
        let before = self
            .store
            .connector(id)
            .cloned()
            .ok_or_else(|| self.missing(id, EntityKind::Connector))?;
        let mut after = before.clone();
        edit(&mut after);
        self.commit_update(Entity::Connector(before), Entity::Connector(after))
    }

    fn commit_update(&mut self, before: Entity, after: Entity) -> Result<bool> {
        match DiagramCommand::update(before, after) {
            Some(command) => self.push_command(command).map(|_| true),
            None => Ok(false),
        }
    }

    fn missing(&self, id: &str, expected: EntityKind) -> DiagramError {
        match self.store.get(id) {
            Some(_) => DiagramError::KindMismatch {
                id: id.to_string(),
                expected,
            },
            None => {
                warn!("Entity '{}' not found", id);
                DiagramError::not_found(id)
            }
        }
    }

    fn shape_or_err(&self, id: &str) -> Result<&Shape> {
        self.store
            .shape(id)
            .ok_or_else(|| self.missing(id, EntityKind::Shape))
    }

    /// Deletes `ids` (and cascaded connectors) as one undo step.
    ///
    /// Returns the number of entities removed.
    pub fn delete_entities<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let before = self.store.len();
        self.push_command(DiagramCommand::delete(ids.iter().map(|id| id.as_ref())))?;
        Ok(before - self.store.len())
    }

    pub fn delete_selected(&mut self) -> Result<usize> {
        let ids = self.selection.selected_ids();
        self.delete_entities(&ids)
    }

    /// Moves shapes (and waypoints of orthogonal connectors) in `ids` by
    /// `(dx, dy)` as one command.
    pub fn move_entities<S: AsRef<str>>(&mut self, ids: &[S], dx: f64, dy: f64) -> Result<bool> {
        if dx == 0.0 && dy == 0.0 {
            return Ok(false);
        }
        let mut moves = MoveEntities::default();
        for id in ids.iter().map(|id| id.as_ref()) {
            match self.store.get(id) {
                Some(Entity::Shape(shape)) => moves.moves.push(EntityMove {
                    entity_id: id.to_string(),
                    from: shape.position,
                    to: shape.position.offset(dx, dy),
                }),
                Some(Entity::Connector(connector)) => {
                    let waypoints = connector.kind.waypoints();
                    if !waypoints.is_empty() {
                        moves.waypoint_moves.push(WaypointMove {
                            connector_id: id.to_string(),
                            from: waypoints.to_vec(),
                            to: waypoints.iter().map(|p| p.offset(dx, dy)).collect(),
                        });
                    }
                }
                None => return Err(self.missing(id, EntityKind::Shape)),
            }
        }

        if self.config.connectors.auto_recalculate_anchors {
            let mut overlay = ShapeOverlay::new(&self.store);
            for m in &moves.moves {
                if let Some(shape) = self.store.shape(&m.entity_id) {
                    let mut moved = shape.clone();
                    moved.position = m.to;
                    overlay.insert(moved);
                }
            }
            let shape_ids: Vec<&str> = moves.moves.iter().map(|m| m.entity_id.as_str()).collect();
            moves.anchor_changes = self.anchor_changes(&shape_ids, &overlay);
        }

        if moves.is_empty() {
            return Ok(false);
        }
        self.push_command(moves.into())?;
        Ok(true)
    }

    /// Nearest-anchor changes for connectors attached to `shape_ids`,
    /// measured against `shapes`.
    fn anchor_changes(&self, shape_ids: &[&str], shapes: &dyn ShapeLookup) -> Vec<AnchorChange> {
        self.store
            .connectors()
            .filter(|c| shape_ids.iter().any(|s| c.is_attached_to(s)))
            .filter_map(|c| anchor_change(c, shapes))
            .collect()
    }

    // ---- drag lifecycle ----

    /// Captures start positions of the shapes and waypoint connectors in `ids`.
    pub fn begin_drag<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<()> {
        if self.drag.is_some() {
            self.cancel_drag()?;
        }
        let mut drag = DragState {
            shapes: Vec::new(),
            waypoints: Vec::new(),
            dx: 0.0,
            dy: 0.0,
        };
        for id in ids.iter().map(|id| id.as_ref()) {
            match self.store.get(id) {
                Some(Entity::Shape(shape)) => drag.shapes.push((id.to_string(), shape.position)),
                Some(Entity::Connector(connector)) => {
                    let waypoints = connector.kind.waypoints();
                    if !waypoints.is_empty() {
                        drag.waypoints.push((id.to_string(), waypoints.to_vec()));
                    }
                }
                None => return Err(self.missing(id, EntityKind::Shape)),
            }
        }
        debug!(
            "Drag started with {} shapes, {} connectors",
            drag.shapes.len(),
            drag.waypoints.len()
        );
        self.drag = Some(drag);
        Ok(())
    }

    /// Live preview at total offset `(dx, dy)` from the drag start. Bypasses
    /// the history.
    pub fn drag_to(&mut self, dx: f64, dy: f64) -> Result<()> {
        let Some(drag) = self.drag.as_mut() else {
            return Err(DiagramError::other("no drag in progress"));
        };
        drag.dx = dx;
        drag.dy = dy;
        let drag = drag.clone();
        let result = self.apply_drag_offset(&drag, dx, dy);
        self.flush_events();
        result
    }

    fn apply_drag_offset(&mut self, drag: &DragState, dx: f64, dy: f64) -> Result<()> {
        for (id, origin) in &drag.shapes {
            let Some(mut shape) = self.store.shape(id).cloned() else {
                continue;
            };
            shape.position = origin.offset(dx, dy);
            self.store.internal_update(Entity::Shape(shape))?;
        }
        for (id, origin) in &drag.waypoints {
            let Some(mut connector) = self.store.connector(id).cloned() else {
                continue;
            };
            if let ConnectorKind::Orthogonal { waypoints } = &mut connector.kind {
                *waypoints = origin.iter().map(|p| p.offset(dx, dy)).collect();
            }
            self.store.internal_update(Entity::Connector(connector))?;
        }
        Ok(())
    }

    /// Commits the drag as one `MoveEntities` command. Returns `Ok(false)`
    /// when nothing moved.
    pub fn end_drag(&mut self) -> Result<bool> {
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };
        if drag.dx == 0.0 && drag.dy == 0.0 {
            debug!("Drag ended without movement");
            return Ok(false);
        }

        let mut moves = MoveEntities::default();
        for (id, origin) in &drag.shapes {
            moves.moves.push(EntityMove {
                entity_id: id.clone(),
                from: *origin,
                to: origin.offset(drag.dx, drag.dy),
            });
        }
        for (id, origin) in &drag.waypoints {
            moves.waypoint_moves.push(WaypointMove {
                connector_id: id.clone(),
                from: origin.clone(),
                to: origin.iter().map(|p| p.offset(drag.dx, drag.dy)).collect(),
            });
        }
        if self.config.connectors.auto_recalculate_anchors {
            let shape_ids: Vec<&str> = drag.shapes.iter().map(|(id, _)| id.as_str()).collect();
            moves.anchor_changes = self.anchor_changes(&shape_ids, &self.store);
        }

        let mut command: DiagramCommand = moves.into();
        let result = command.execute(&mut self.store);
        if let Err(err) = result {
            warn!("Drag commit failed, reverting: {}", err);
            let revert = self.apply_drag_offset(&drag, 0.0, 0.0);
            self.flush_events();
            revert?;
            return Err(err);
        }
        self.flush_events();
        self.history.record(command);
        self.publish_history();
        Ok(true)
    }

    /// Returns dragged entities to their start positions without recording.
    pub fn cancel_drag(&mut self) -> Result<()> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        let result = self.apply_drag_offset(&drag, 0.0, 0.0);
        self.flush_events();
        result
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ---- anchors ----

    /// Re-picks the nearest anchor pair for each connector as one command.
    ///
    /// Returns the number of connectors whose anchors changed.
    pub fn recalculate_anchors<S: AsRef<str>>(&mut self, connector_ids: &[S]) -> Result<usize> {
        let mut changes = Vec::new();
        for id in connector_ids.iter().map(|id| id.as_ref()) {
            let connector = self
                .store
                .connector(id)
                .ok_or_else(|| self.missing(id, EntityKind::Connector))?;
            if let Some(change) = anchor_change(connector, &self.store) {
                changes.push(change);
            }
        }
        let count = changes.len();
        if count > 0 {
            self.push_command(DiagramCommand::recalculate_anchors(changes))?;
        }
        Ok(count)
    }

    pub fn recalculate_anchors_for_shape(&mut self, shape_id: &str) -> Result<usize> {
        self.shape_or_err(shape_id)?;
        let ids = self.store.attached_connectors(shape_id);
        self.recalculate_anchors(&ids)
    }

    // ---- selection ----

    pub fn select_at(&mut self, x: f64, y: f64, multi: bool) -> Option<String> {
        let context = entity_context(&self.store, &self.config);
        let (hit, changed) = self
            .selection
            .select_at(&self.store, x, y, &context, multi);
        if changed {
            self.publish_selection();
        }
        hit
    }

    pub fn select_in_box(&mut self, area: &Bounds, multi: bool) -> usize {
        let context = entity_context(&self.store, &self.config);
        if self
            .selection
            .select_in_box(&self.store, area, &context, multi)
        {
            self.publish_selection();
        }
        self.selection.len()
    }

    pub fn select(&mut self, id: &str, multi: bool) -> Result<()> {
        if !self.store.contains(id) {
            return Err(DiagramError::not_found(id));
        }
        if self.selection.select(id, multi) {
            self.publish_selection();
        }
        Ok(())
    }

    pub fn select_all(&mut self) {
        if self.selection.select_all(&self.store) {
            self.publish_selection();
        }
    }

    pub fn deselect_all(&mut self) {
        if self.selection.deselect_all() {
            self.publish_selection();
        }
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.selected_ids()
    }

    // ---- queries ----

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.store.get(id)
    }

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.store.shape(id)
    }

    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.store.connector(id)
    }

    /// Entities in z-order, bottom first
    pub fn entities(&self) -> impl DoubleEndedIterator<Item = &Entity> {
        self.store.iter()
    }

    pub fn entity_at(&self, x: f64, y: f64) -> Option<&Entity> {
        entity_system::find_entity_at_point(self.store.iter(), x, y, &self.context())
    }

    pub fn entities_in_box(&self, area: &Bounds) -> Vec<&Entity> {
        entity_system::find_entities_in_box(self.store.iter(), area, &self.context())
    }

    pub fn bounds_of(&self, id: &str) -> Option<Bounds> {
        let entity = self.store.get(id)?;
        entity_system::get_bounds(entity, &self.context())
    }

    /// Bounds of every entity with resolvable geometry.
    pub fn diagram_bounds(&self) -> Option<Bounds> {
        let context = self.context();
        self.store
            .iter()
            .filter_map(|e| entity_system::get_bounds(e, &context))
            .reduce(|a, b| a.union(&b))
    }

    pub fn connector_geometry(&self, id: &str) -> Option<ConnectorGeometry> {
        let connector = self.store.connector(id)?;
        connector_geometry::compute_geometry(connector, &self.store, self.store.geometry())
    }

    /// Ids of connectors with a missing endpoint shape.
    pub fn dangling_connectors(&self) -> Vec<String> {
        self.store
            .connectors()
            .filter(|c| !connector_geometry::is_connector_valid(c, &self.store))
            .map(|c| c.id().to_string())
            .collect()
    }

    /// Re-validates every entity; only failures are returned.
    pub fn validate_all(&self) -> Vec<(String, ValidationResult)> {
        entity_system::validate_many(self.store.iter(), &self.context())
    }

    pub fn render_shape(&self, id: &str) -> Option<ShapeVisual> {
        let shape = self.store.shape(id)?;
        Some(self.renderers.render_shape(shape, &self.theme))
    }

    /// `None` for unknown ids and connectors with a missing endpoint.
    pub fn render_connector(&self, id: &str) -> Option<ConnectorVisual> {
        let connector = self.store.connector(id)?;
        let geometry = self.connector_geometry(id)?;
        Some(
            self.renderers
                .render_connector(connector, &geometry, &self.theme),
        )
    }

    // ---- documents ----

    /// Replaces the session contents; clears history and selection.
    pub fn import_document(&mut self, document: DiagramDocument) -> Result<()> {
        self.cancel_drag()?;
        let diagram_type = document.diagram_type;
        let count = document.len();
        let result = self.store.replace_all(document.into_entities());
        self.flush_events();
        result?;
        self.diagram_type = diagram_type;
        self.history.clear();
        self.publish_history();
        if self.selection.deselect_all() {
            self.publish_selection();
        }
        info!("Imported {} document with {} entities", diagram_type_name(diagram_type), count);
        Ok(())
    }

    pub fn export_document(&self) -> DiagramDocument {
        DiagramDocument::from_entities(self.diagram_type, self.store.iter())
    }
}

fn entity_context<'a>(store: &'a EntityStore, config: &Config) -> EntityContext<'a> {
    EntityContext::new()
        .with_shapes(store)
        .with_validators(store.validators())
        .with_tolerance(config.interaction.hit_tolerance)
        .with_geometry(*store.geometry())
}

fn diagram_type_name(diagram_type: DiagramType) -> &'static str {
    match diagram_type {
        DiagramType::Flowchart => "flowchart",
        DiagramType::Bpmn => "bpmn",
        DiagramType::Process => "process",
    }
}

fn anchor_change(connector: &Connector, shapes: &dyn ShapeLookup) -> Option<AnchorChange> {
    let (source, target) = connector_geometry::recalculate_anchors(connector, shapes)?;
    let from = AnchorPair {
        source: connector.source.anchor,
        target: connector.target.anchor,
    };
    let to = AnchorPair { source, target };
    (from != to).then(|| AnchorChange {
        connector_id: connector.id().to_string(),
        from,
        to,
    })
}
