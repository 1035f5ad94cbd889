use diagramkit_core::Bounds;
use indexmap::IndexSet;

use crate::entity_system::{self, EntityContext};
use crate::store::EntityStore;

/// Tracks which entities are selected.
///
/// `SelectionManager` is responsible for:
/// - Tracking the selected ids in selection order
/// - Tracking the "primary" selection (the most recently selected entity)
/// - Point selection (clicking on an entity, topmost first)
/// - Box selection (drag-select over entity bounds)
/// - Multi-select (Shift+click adds to or toggles the selection)
///
/// # Design
///
/// Selection is held by id only; the manager never owns entities. Every
/// mutating method returns `true` when the selection actually changed, so
/// the session can publish a change notification only when needed.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: IndexSet<String>,
    primary: Option<String>,
}

impl SelectionManager {
    /// Creates a new `SelectionManager` with no selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagramkit_designer::selection_manager::SelectionManager;
    ///
    /// let manager = SelectionManager::new();
    /// assert_eq!(manager.primary_id(), None);
    /// assert!(manager.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the primary selected entity.
    pub fn primary_id(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Returns every selected id in selection order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selects `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - The entity to select
    /// * `multi` - Keep the existing selection (Shift held)
    pub fn select(&mut self, id: &str, multi: bool) -> bool {
        let before = self.selected.clone();
        if !multi {
            self.selected.clear();
        }
        self.selected.insert(id.to_string());
        self.primary = Some(id.to_string());
        before != self.selected
    }

    /// Adds `id` if absent, removes it otherwise.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.shift_remove(id) {
            if self.primary.as_deref() == Some(id) {
                self.primary = self.selected.last().cloned();
            }
        } else {
            self.selected.insert(id.to_string());
            self.primary = Some(id.to_string());
        }
        true
    }

    /// Selects the topmost entity at `(x, y)`.
    ///
    /// Clicking empty space clears the selection unless `multi` is set.
    /// With `multi`, clicking a selected entity toggles it off.
    ///
    /// # Returns
    ///
    /// `(hit, changed)`: the id under the point, if any, and whether the
    /// selection changed.
    pub fn select_at(
        &mut self,
        store: &EntityStore,
        x: f64,
        y: f64,
        context: &EntityContext<'_>,
        multi: bool,
    ) -> (Option<String>, bool) {
        let hit = entity_system::find_entity_at_point(store.iter(), x, y, context)
            .map(|e| e.id().to_string());
        let changed = match (&hit, multi) {
            (Some(id), true) => self.toggle(id),
            (Some(id), false) => self.select(id, false),
            (None, true) => false,
            (None, false) => self.deselect_all(),
        };
        (hit, changed)
    }

    /// Selects every entity whose bounds intersect `area`.
    ///
    /// # Returns
    ///
    /// `true` if the selection changed
    pub fn select_in_box(
        &mut self,
        store: &EntityStore,
        area: &Bounds,
        context: &EntityContext<'_>,
        multi: bool,
    ) -> bool {
        let before = self.selected.clone();
        if !multi {
            self.selected.clear();
            self.primary = None;
        }
        for entity in entity_system::find_entities_in_box(store.iter(), area, context) {
            self.selected.insert(entity.id().to_string());
            self.primary = Some(entity.id().to_string());
        }
        before != self.selected
    }

    pub fn select_all(&mut self, store: &EntityStore) -> bool {
        let before = std::mem::take(&mut self.selected);
        self.selected = store.ids().map(str::to_string).collect();
        self.primary = self.selected.last().cloned();
        before != self.selected
    }

    /// Clears the selection and the primary id.
    pub fn deselect_all(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        self.primary = None;
        changed
    }

    /// Drops ids that no longer exist in `store`.
    pub fn retain_existing(&mut self, store: &EntityStore) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| store.contains(id));
        if self
            .primary
            .as_deref()
            .is_some_and(|id| !store.contains(id))
        {
            self.primary = self.selected.last().cloned();
        }
        before != self.selected.len()
    }
}
