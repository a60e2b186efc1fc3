//! Shared primitive types used across the entire save system.

/// An in-game day count. Day 0 is a fresh game.
pub type Day = u32;

/// The name a scene is loaded under ("Room1", "MainHall", ...).
pub type SceneName = String;

/// A stable entity-kind name. Fragments group by this.
pub type KindName = String;
