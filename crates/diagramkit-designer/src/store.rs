//! Entity store and internal mutators
//!
//! The store owns every entity of a diagram in one insertion-ordered map:
//! O(1) lookup by id and a stable z-order (later entries draw on top).
//! Shapes and connectors share the id namespace.
//!
//! The `internal_*` mutators are the single enforcement point for entity
//! validity: they validate first and leave the store untouched on failure.
//! They do not record history; the command layer wraps them.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, error, warn};

use diagramkit_core::{CascadePolicy, DiagramError, DiagramEvent, EntityKind, Result};
use diagramkit_settings::Config;

use crate::connector_geometry::{self, GeometryOptions};
use crate::model::{Connector, Entity, Shape, ShapeLookup, ShapeOverlay};
use crate::registry::{default_shape_validators, ShapeValidators};
use crate::validation::{validate_entity, ValidationContext, ValidationResult};

/// An entity taken out of the store together with its z-order index.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedEntity {
    pub index: usize,
    pub entity: Entity,
    /// Endpoint shape ids a connector was already missing when removed.
    pub dangling: Vec<String>,
}

/// Everything one delete removed, ordered by original index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Removal {
    entries: Vec<RemovedEntity>,
}

impl Removal {
    pub fn entries(&self) -> &[RemovedEntity] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.entity.id()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.entity.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.entries.iter().filter_map(|e| e.entity.as_shape())
    }
}

#[derive(Debug)]
pub struct EntityStore {
    entities: IndexMap<String, Entity>,
    validators: ShapeValidators,
    geometry: GeometryOptions,
    cascade_policy: CascadePolicy,
    pending_events: Vec<DiagramEvent>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeLookup for EntityStore {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.entities.get(id).and_then(Entity::as_shape)
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: IndexMap::new(),
            validators: default_shape_validators(),
            geometry: GeometryOptions::default(),
            cascade_policy: CascadePolicy::default(),
            pending_events: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            geometry: GeometryOptions::from_config(config),
            cascade_policy: config.connectors.cascade_policy,
            ..Self::new()
        }
    }

    // ---- queries ----

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.entities.get(id).and_then(Entity::as_connector)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Z-order index of `id`
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entities.get_index_of(id)
    }

    /// Entities in z-order, bottom first
    pub fn iter(&self) -> indexmap::map::Values<'_, String, Entity> {
        self.entities.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.entities.values().filter_map(Entity::as_shape)
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.entities.values().filter_map(Entity::as_connector)
    }

    /// Ids of connectors with an endpoint on `shape_id`, in z-order
    pub fn attached_connectors(&self, shape_id: &str) -> Vec<String> {
        self.connectors()
            .filter(|c| c.is_attached_to(shape_id))
            .map(|c| c.id().to_string())
            .collect()
    }

    /// Cloned entities in z-order
    pub fn snapshot(&self) -> Vec<Entity> {
        self.entities.values().cloned().collect()
    }

    pub fn validators(&self) -> &ShapeValidators {
        &self.validators
    }

    pub fn validators_mut(&mut self) -> &mut ShapeValidators {
        &mut self.validators
    }

    pub fn geometry(&self) -> &GeometryOptions {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: GeometryOptions) {
        self.geometry = geometry;
        self.refresh_all_connectors();
    }

    pub fn cascade_policy(&self) -> CascadePolicy {
        self.cascade_policy
    }

    pub fn set_cascade_policy(&mut self, policy: CascadePolicy) {
        self.cascade_policy = policy;
    }

    /// Drains the change events queued by mutations
    pub fn take_events(&mut self) -> Vec<DiagramEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn validate_against(&self, entity: &Entity, shapes: &dyn ShapeLookup) -> Result<()> {
        let context = ValidationContext::new()
            .with_shapes(shapes)
            .with_validators(&self.validators);
        validate_entity(entity, context).into_result(entity.id())
    }

    /// Like [`Self::validate_against`], but a connector endpoint listed in
    /// `tolerated` may be missing from `shapes`.
    fn validate_tolerating(
        &self,
        entity: &Entity,
        shapes: &dyn ShapeLookup,
        tolerated: &[String],
    ) -> Result<()> {
        let Entity::Connector(connector) = entity else {
            return self.validate_against(entity, shapes);
        };
        if tolerated.is_empty() {
            return self.validate_against(entity, shapes);
        }

        let context = ValidationContext::new().with_validators(&self.validators);
        let mut result = validate_entity(entity, context);
        for (end, point) in [("source", &connector.source), ("target", &connector.target)] {
            let id = &point.shape_id;
            if id.trim().is_empty() || tolerated.contains(id) {
                continue;
            }
            result.merge(ValidationResult::check(shapes.shape(id).is_some(), || {
                format!("{end} shape '{id}' does not exist")
            }));
        }
        result.into_result(entity.id())
    }

    /// Endpoint shape ids of `connector` that do not resolve in the store.
    fn missing_endpoints(&self, connector: &Connector) -> Vec<String> {
        let mut missing = Vec::new();
        for point in [&connector.source, &connector.target] {
            if self.shape(&point.shape_id).is_none() && !missing.contains(&point.shape_id) {
                missing.push(point.shape_id.clone());
            }
        }
        missing
    }

    // ---- internal mutators ----

    /// Appends `entity` on top of the z-order.
    pub fn internal_add(&mut self, entity: Entity) -> Result<()> {
        let id = entity.id().to_string();
        if self.entities.contains_key(&id) {
            error!("Rejected add of '{}': id already in use", id);
            return Err(DiagramError::DuplicateId { id });
        }
        if let Err(err) = self.validate_against(&entity, &*self) {
            error!("Rejected add: {}", err);
            return Err(err);
        }

        let kind = entity.kind();
        let mut entity = entity;
        if let Entity::Connector(connector) = &mut entity {
            self.apply_frame(connector);
        }
        self.entities.insert(id.clone(), entity);
        debug!("Added {} {}", kind, id);
        self.pending_events.push(DiagramEvent::EntityAdded { id, kind });
        Ok(())
    }

    /// Replaces the entity with the same id, keeping its z-order slot.
    pub fn internal_update(&mut self, entity: Entity) -> Result<()> {
        let id = entity.id().to_string();
        let Some(existing) = self.entities.get(&id) else {
            warn!("Update ignored: entity '{}' not found", id);
            return Err(DiagramError::not_found(id));
        };
        if existing.kind() != entity.kind() {
            warn!("Update ignored: '{}' is a {}", id, existing.kind());
            return Err(DiagramError::KindMismatch {
                id,
                expected: existing.kind(),
            });
        }

        let result = match &entity {
            Entity::Shape(shape) => {
                let overlay = ShapeOverlay::new(&*self).with(shape.clone());
                self.validate_against(&entity, &overlay)
            }
            Entity::Connector(_) => {
                let dangling = existing
                    .as_connector()
                    .map(|before| self.missing_endpoints(before))
                    .unwrap_or_default();
                self.validate_tolerating(&entity, &*self, &dangling)
            }
        };
        if let Err(err) = result {
            error!("Rejected update: {}", err);
            return Err(err);
        }

        let kind = entity.kind();
        let mut entity = entity;
        if let Entity::Connector(connector) = &mut entity {
            self.apply_frame(connector);
        }
        let is_shape = entity.is_shape();
        self.entities.insert(id.clone(), entity);
        self.pending_events.push(DiagramEvent::EntityUpdated {
            id: id.clone(),
            kind,
        });
        if is_shape {
            self.refresh_connectors_for(&[id.as_str()]);
        }
        Ok(())
    }

    /// Removes `id`, cascading to attached connectors per the store's policy.
    pub fn internal_delete(&mut self, id: &str) -> Result<Removal> {
        self.internal_delete_many(&[id])
    }

    /// Removes every id as one unit. Unknown ids fail the whole call
    /// without removing anything.
    pub fn internal_delete_many<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<Removal> {
        if let Some(missing) = ids.iter().map(|id| id.as_ref()).find(|id| !self.contains(id)) {
            warn!("Delete ignored: entity '{}' not found", missing);
            return Err(DiagramError::not_found(missing));
        }

        let mut targets: HashSet<&str> = HashSet::new();
        for id in ids.iter().map(|id| id.as_ref()) {
            targets.insert(id);
            if self.cascade_policy == CascadePolicy::Delete
                && self.get(id).is_some_and(Entity::is_shape)
            {
                for connector in self.connectors().filter(|c| c.is_attached_to(id)) {
                    targets.insert(connector.id());
                }
            }
        }

        let mut indices: Vec<usize> = targets
            .iter()
            .filter_map(|id| self.entities.get_index_of(*id))
            .collect();
        indices.sort_unstable();

        let dangling: Vec<Vec<String>> = indices
            .iter()
            .map(|&index| {
                self.entities
                    .get_index(index)
                    .and_then(|(_, entity)| entity.as_connector())
                    .map(|connector| self.missing_endpoints(connector))
                    .unwrap_or_default()
            })
            .collect();

        let mut entries = Vec::with_capacity(indices.len());
        for (&index, dangling) in indices.iter().zip(dangling).rev() {
            if let Some((_, entity)) = self.entities.shift_remove_index(index) {
                entries.push(RemovedEntity {
                    index,
                    entity,
                    dangling,
                });
            }
        }
        entries.reverse();

        for entry in &entries {
            debug!("Removed {} {}", entry.entity.kind(), entry.entity.id());
            self.pending_events.push(DiagramEvent::EntityRemoved {
                id: entry.entity.id().to_string(),
                kind: entry.entity.kind(),
            });
        }
        Ok(Removal { entries })
    }

    /// Re-inserts a [`Removal`] at its original z-order indices.
    pub fn internal_restore(&mut self, removal: &Removal) -> Result<()> {
        if let Some(taken) = removal
            .entries
            .iter()
            .find(|e| self.contains(e.entity.id()))
        {
            let id = taken.entity.id().to_string();
            error!("Rejected restore of '{}': id already in use", id);
            return Err(DiagramError::DuplicateId { id });
        }

        let mut overlay = ShapeOverlay::new(&*self);
        for shape in removal.shapes() {
            overlay.insert(shape.clone());
        }
        for entry in &removal.entries {
            if let Err(err) = self.validate_tolerating(&entry.entity, &overlay, &entry.dangling) {
                error!("Rejected restore: {}", err);
                return Err(err);
            }
        }

        for entry in &removal.entries {
            let index = entry.index.min(self.entities.len());
            let id = entry.entity.id().to_string();
            let kind = entry.entity.kind();
            self.entities.shift_insert(index, id.clone(), entry.entity.clone());
            self.pending_events.push(DiagramEvent::EntityAdded { id, kind });
        }

        let shape_ids: Vec<&str> = removal.shapes().map(Shape::id).collect();
        self.refresh_connectors_for(&shape_ids);
        Ok(())
    }

    /// Replaces the whole collection, validating the new set against itself.
    pub fn replace_all(&mut self, entities: Vec<Entity>) -> Result<()> {
        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity.id()) {
                error!("Rejected import: duplicate id '{}'", entity.id());
                return Err(DiagramError::DuplicateId {
                    id: entity.id().to_string(),
                });
            }
        }

        let shapes: HashMap<String, Shape> = entities
            .iter()
            .filter_map(Entity::as_shape)
            .map(|s| (s.id().to_string(), s.clone()))
            .collect();
        for entity in &entities {
            if let Err(err) = self.validate_against(entity, &shapes) {
                error!("Rejected import: {}", err);
                return Err(err);
            }
        }

        self.clear();
        for entity in entities {
            let id = entity.id().to_string();
            let kind = entity.kind();
            self.entities.insert(id.clone(), entity);
            self.pending_events.push(DiagramEvent::EntityAdded { id, kind });
        }
        self.refresh_all_connectors();
        Ok(())
    }

    pub fn clear(&mut self) {
        for (id, entity) in self.entities.drain(..) {
            self.pending_events.push(DiagramEvent::EntityRemoved {
                id,
                kind: entity.kind(),
            });
        }
    }

    // ---- derived connector frames ----

    fn apply_frame(&self, connector: &mut Connector) {
        if let Some((position, dimensions)) =
            connector_geometry::derived_frame(connector, &*self, &self.geometry)
        {
            connector.position = position;
            connector.dimensions = dimensions;
        }
    }

    /// Recomputes derived bounds of connectors attached to `shape_ids`.
    fn refresh_connectors_for(&mut self, shape_ids: &[&str]) {
        let ids: Vec<String> = self
            .connectors()
            .filter(|c| shape_ids.iter().any(|s| c.is_attached_to(s)))
            .map(|c| c.id().to_string())
            .collect();
        self.refresh_connectors(&ids);
    }

    fn refresh_all_connectors(&mut self) {
        let ids: Vec<String> = self.connectors().map(|c| c.id().to_string()).collect();
        self.refresh_connectors(&ids);
    }

    fn refresh_connectors(&mut self, ids: &[String]) {
        let frames: Vec<_> = ids
            .iter()
            .filter_map(|id| {
                let connector = self.connector(id)?;
                let frame = connector_geometry::derived_frame(connector, &*self, &self.geometry)?;
                Some((id.clone(), frame))
            })
            .collect();

        for (id, (position, dimensions)) in frames {
            if let Some(Entity::Connector(connector)) = self.entities.get_mut(&id) {
                if connector.position != position || connector.dimensions != dimensions {
                    connector.position = position;
                    connector.dimensions = dimensions;
                    self.pending_events.push(DiagramEvent::EntityUpdated {
                        id,
                        kind: EntityKind::Connector,
                    });
                }
            }
        }
    }
}
