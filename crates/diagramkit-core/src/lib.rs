//! # DiagramKit Core
//!
//! Core types shared by every DiagramKit crate: geometry primitives,
//! entity and connector tags, the error taxonomy, and the session
//! event bus.

pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod types;

pub use error::{DiagramError, Result};
pub use event_bus::{
    DiagramEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter,
    SubscriptionId,
};
pub use geometry::{AnchorPosition, Bounds, Dimensions, Direction, ParseAnchorError, Position};
pub use types::{CascadePolicy, ConnectorType, EntityKind};
