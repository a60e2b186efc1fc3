//! The entity capability seam for saving and loading.
//!
//! RULE: Every persistent entity implements Saveable.
//! The sync engine walks a scene's live entities and calls these methods;
//! it never reaches into gameplay state directly, and it never learns what
//! is inside a fragment payload.

use crate::directory::Fragment;

/// The contract every persistent entity must fulfill.
pub trait Saveable {
    /// Stable kind name. Fragments group by this; order within a kind is
    /// discovery order during a pass.
    fn kind(&self) -> &'static str;

    /// Bring derived or cached fields into a save-ready state.
    /// Called before every save and load pass.
    fn refresh_before_save(&mut self);

    /// Copy the entity's live fields out into a fragment.
    fn write_fragment(&self) -> Fragment;

    /// Copy a fragment's fields back into the live entity.
    fn read_fragment(&mut self, fragment: &Fragment);
}
