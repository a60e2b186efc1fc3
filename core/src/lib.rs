//! Two-tier save synchronization for scene-based games.
//!
//! The temp record carries progress from scene to scene; the permanent
//! record holds what the player last committed. SyncEngine reconciles
//! the two at session boundaries, and TransitionCoordinator choreographs
//! the save-fade-switch dance between scenes.
//!
//! LAYERING (outer calls inner, never the reverse):
//!   transition -> engine -> directory / codec -> store
//!
//! RULES:
//!   - Only store.rs touches the filesystem.
//!   - Only engine.rs decides when records change.
//!   - Gameplay state crosses the boundary as opaque fragments; the
//!     engine never learns what is inside one.

pub mod codec;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod saveable;
pub mod store;
pub mod transition;
pub mod types;
