//! # Event Bus Module
//!
//! Publish/subscribe change notifications for a diagram session:
//! - The session publishes typed events after each committed mutation
//! - UI layers subscribe with a filter and re-read the entities they need
//!
//! ## Usage
//!
//! ```rust
//! use diagramkit_core::event_bus::{EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Entity]),
//!     |event| println!("{}", event.description()),
//! );
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
