//! Import/export boundary
//!
//! [`DiagramDocument`] is the `{shapes, connectors}` form exchanged with
//! text adapters (Mermaid-style import/export). Adapters own the wire
//! syntax; this module only guarantees the entity invariants.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use diagramkit_core::{DiagramError, Result};

use crate::model::{Connector, Entity, Shape};
use crate::registry::ShapeValidators;
use crate::validation::{validate_entity, ValidationContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    #[default]
    Flowchart,
    Bpmn,
    Process,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    #[serde(default)]
    pub diagram_type: DiagramType,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

impl DiagramDocument {
    pub fn new(diagram_type: DiagramType) -> Self {
        Self {
            diagram_type,
            ..Self::default()
        }
    }

    /// Splits entities into shapes and connectors, keeping their relative order.
    pub fn from_entities<'a, I>(diagram_type: DiagramType, entities: I) -> Self
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let mut doc = Self::new(diagram_type);
        for entity in entities {
            match entity {
                Entity::Shape(s) => doc.shapes.push(s.clone()),
                Entity::Connector(c) => doc.connectors.push(c.clone()),
            }
        }
        doc
    }

    /// Shapes first, then connectors, so every connector lands above its endpoints.
    pub fn into_entities(self) -> Vec<Entity> {
        self.shapes
            .into_iter()
            .map(Entity::Shape)
            .chain(self.connectors.into_iter().map(Entity::Connector))
            .collect()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DiagramError::Document(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiagramError::Document(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.shapes.len() + self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.connectors.is_empty()
    }
}

/// Problems found in one entity of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentProblem {
    pub entity_id: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentReport {
    pub problems: Vec<DocumentProblem>,
}

impl DocumentReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// Every message prefixed with its entity id.
    pub fn messages(&self) -> Vec<String> {
        self.problems
            .iter()
            .flat_map(|p| {
                p.messages
                    .iter()
                    .map(move |m| format!("{}: {}", p.entity_id, m))
            })
            .collect()
    }
}

/// Checks id uniqueness, every entity's rules and connector endpoint
/// existence, collecting all problems.
pub fn validate_document(
    document: &DiagramDocument,
    validators: Option<&ShapeValidators>,
) -> DocumentReport {
    let shapes: HashMap<String, Shape> = document
        .shapes
        .iter()
        .map(|s| (s.id().to_string(), s.clone()))
        .collect();
    let mut context = ValidationContext::new().with_shapes(&shapes);
    if let Some(validators) = validators {
        context = context.with_validators(validators);
    }

    let mut report = DocumentReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let entities = document
        .shapes
        .iter()
        .cloned()
        .map(Entity::Shape)
        .chain(document.connectors.iter().cloned().map(Entity::Connector));

    for entity in entities {
        let mut messages = Vec::new();
        if !seen.insert(entity.id().to_string()) {
            messages.push(format!("duplicate id '{}'", entity.id()));
        }
        messages.extend(validate_entity(&entity, context).into_errors());
        if !messages.is_empty() {
            report.problems.push(DocumentProblem {
                entity_id: entity.id().to_string(),
                messages,
            });
        }
    }
    report
}
