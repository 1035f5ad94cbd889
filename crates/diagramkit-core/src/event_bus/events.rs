//! Change-notification events published by a diagram session.
//!
//! Events carry ids and tags only; subscribers read the updated entities
//! back from the session.

use serde::{Deserialize, Serialize};

use crate::types::EntityKind;

/// Root event enum for session change notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagramEvent {
    /// An entity was inserted into the collection
    EntityAdded { id: String, kind: EntityKind },
    /// An entity was replaced with a new version
    EntityUpdated { id: String, kind: EntityKind },
    /// An entity was removed from the collection
    EntityRemoved { id: String, kind: EntityKind },
    /// Undo/redo availability changed
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// The selection set changed
    SelectionChanged { ids: Vec<String> },
}

impl DiagramEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            DiagramEvent::EntityAdded { .. }
            | DiagramEvent::EntityUpdated { .. }
            | DiagramEvent::EntityRemoved { .. } => EventCategory::Entity,
            DiagramEvent::HistoryChanged { .. } => EventCategory::History,
            DiagramEvent::SelectionChanged { .. } => EventCategory::Selection,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            DiagramEvent::EntityAdded { id, kind } => format!("Added {} {}", kind, id),
            DiagramEvent::EntityUpdated { id, kind } => format!("Updated {} {}", kind, id),
            DiagramEvent::EntityRemoved { id, kind } => format!("Removed {} {}", kind, id),
            DiagramEvent::HistoryChanged { can_undo, can_redo } => {
                format!("History changed (undo: {}, redo: {})", can_undo, can_redo)
            }
            DiagramEvent::SelectionChanged { ids } => format!("Selection: {} entities", ids.len()),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Entity collection changes.
    Entity,
    /// Undo/redo stack changes.
    History,
    /// Selection changes.
    Selection,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Entity => write!(f, "Entity"),
            EventCategory::History => write!(f, "History"),
            EventCategory::Selection => write!(f, "Selection"),
        }
    }
}
