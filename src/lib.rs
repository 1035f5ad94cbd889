//! # DiagramKit
//!
//! Entity core for interactive flowchart and BPMN diagram editors:
//! - Shapes and connectors with typed kinds, styles and text layout
//! - Connector geometry, routing and hit testing
//! - Declarative validation with pluggable per-type validators
//! - Undoable editing through commands and a bounded history
//!
//! ## Architecture
//!
//! DiagramKit is organized as a workspace with multiple crates:
//!
//! 1. **diagramkit-core** - Geometry primitives, errors, events
//! 2. **diagramkit-settings** - Editor configuration and persistence
//! 3. **diagramkit-designer** - Entity model, store, commands, session
//! 4. **diagramkit** - Re-exports and the `diagramkit` inspection binary

pub use diagramkit_core as core;
pub use diagramkit_designer as designer;
pub use diagramkit_settings as settings;

pub use diagramkit_core::{
    AnchorPosition, Bounds, DiagramError, DiagramEvent, Dimensions, EntityKind, EventFilter,
    Position, Result,
};
pub use diagramkit_designer::{
    validate_document, Connector, ConnectorGeometry, DiagramDocument, DiagramSession,
    DiagramType, DocumentReport, Entity, Shape,
};
pub use diagramkit_settings::Config;

/// Initialize structured logging with tracing
///
/// `RUST_LOG` directives are honoured on top of an INFO default.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
