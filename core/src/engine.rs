//! The synchronization engine: one front door for every save operation.
//!
//! Two records back the system. The temp record is the working copy that
//! rides along from scene to scene; the permanent record only changes
//! when the player commits a real save. Reconciliation between the two
//! is a verbatim byte copy, never a re-encode.
//!
//! RULES:
//!   - Gameplay code calls SyncEngine; it never touches RecordStore.
//!   - bootstrap_sync runs once per process, before the first scene load.
//!   - Mid-play saves and loads never abort gameplay; their failures are
//!     logged and play continues with what is in memory.
//!   - Only commit_save and reset_all write the permanent record.

use crate::{
    codec,
    directory::{PassCursor, SaveDirectory, SAVE_VERSION},
    error::{SaveError, SaveResult},
    saveable::Saveable,
    store::{RecordKey, RecordStore},
    types::{Day, KindName},
};

/// Cross-cutting consumer of the day counter. A reset pushes day zero
/// back into whatever tracks mornings.
pub trait DayCounter {
    fn set_day(&mut self, day: Day);
}

pub struct SyncEngine {
    store:        RecordStore,
    kinds:        Vec<KindName>,
    bootstrapped: bool,
    day_counter:  Box<dyn DayCounter>,
}

impl SyncEngine {
    pub fn new(store: RecordStore, kinds: Vec<KindName>, day_counter: Box<dyn DayCounter>) -> Self {
        Self {
            store,
            kinds,
            bootstrapped: false,
            day_counter,
        }
    }

    /// Guarantee both records exist, creating whichever is missing.
    ///
    /// A fresh temp record starts with one empty fragment slot per
    /// recognized kind. A fresh permanent record starts without them; it
    /// first gains fragments when a commit copies the temp bytes across.
    pub fn ensure_storage(&self) -> SaveResult<()> {
        if !self.store.exists(RecordKey::Temp) {
            let mut directory = SaveDirectory::default();
            directory.set_initial_references(&self.kinds);
            self.create_record(RecordKey::Temp, &directory)?;
        }
        if !self.store.exists(RecordKey::Permanent) {
            self.create_record(RecordKey::Permanent, &SaveDirectory::default())?;
        }
        Ok(())
    }

    fn create_record(&self, key: RecordKey, directory: &SaveDirectory) -> SaveResult<()> {
        match self.store.create(key) {
            Ok(()) => {}
            Err(SaveError::AlreadyExists(key)) => {
                // Raced with another writer. Keep the bytes already there.
                log::error!("record '{key}' already present; keeping existing bytes");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        self.store.write(key, &codec::encode(directory)?)
    }

    /// Copy the permanent record over the temp record, once per process.
    ///
    /// Runs before the first scene load so abandoned temp progress from a
    /// previous session is discarded. Later calls are no-ops: scene loads
    /// mid-session must keep the temp progress they ride on.
    pub fn bootstrap_sync(&mut self) -> SaveResult<()> {
        if self.bootstrapped {
            return Ok(());
        }
        self.bootstrapped = true;
        let bytes = self.store.read(RecordKey::Permanent)?;
        self.store.write(RecordKey::Temp, &bytes)?;
        log::info!("bootstrap: permanent record copied over temp");
        Ok(())
    }

    /// Persist one scene's live entities into the temp record.
    ///
    /// This is the routine scene-transition save. Failures are logged and
    /// swallowed; a broken disk must not end the play session.
    pub fn save_scene(&self, entities: &mut [&mut dyn Saveable]) {
        let mut directory = self.load_or_default(RecordKey::Temp);
        let mut cursor = PassCursor::new();
        for entity in entities.iter_mut() {
            entity.refresh_before_save();
            directory.save_all(&**entity, &mut cursor);
        }
        directory.saved_at = Some(chrono::Utc::now());
        if let Err(e) = self.persist(RecordKey::Temp, &directory) {
            log::error!("scene save failed, progress stays in memory only: {e}");
        }
    }

    /// Restore one scene's live entities from the temp record.
    ///
    /// An empty entity list means a scene forgot to register its
    /// persistent objects; that is logged and the pass is skipped. The
    /// record stays untouched either way.
    pub fn load_scene(&self, entities: &mut [&mut dyn Saveable]) {
        if entities.is_empty() {
            log::warn!("scene load skipped: no live entities registered");
            return;
        }
        let directory = self.load_or_default(RecordKey::Temp);
        let mut cursor = PassCursor::new();
        for entity in entities.iter_mut() {
            entity.refresh_before_save();
            directory.load_all(&mut **entity, &mut cursor);
        }
    }

    /// A real save: capture the scene into temp, then copy temp's exact
    /// bytes into the permanent record.
    pub fn commit_save(&self, entities: &mut [&mut dyn Saveable]) -> SaveResult<()> {
        self.save_scene(entities);
        let bytes = self.store.read(RecordKey::Temp)?;
        self.store.write(RecordKey::Permanent, &bytes)?;
        log::info!("permanent record updated from temp ({} bytes)", bytes.len());
        Ok(())
    }

    /// Advance the day counter and every tracked days-since counter in
    /// the temp record. Runs at the day rollover, between scenes; live
    /// entities pick the new values up on their next load pass.
    pub fn increment_day(&self) {
        let mut directory = self.load_or_default(RecordKey::Temp);
        directory.increment_all_day_since_data();
        let day = directory.day;
        match self.persist(RecordKey::Temp, &directory) {
            Ok(()) => log::debug!("day advanced to {day}"),
            Err(e) => log::error!("day rollover save failed: {e}"),
        }
    }

    /// Wipe both records and rebuild fresh ones. The day counter snaps
    /// back to zero along with them.
    pub fn reset_all(&mut self) -> SaveResult<()> {
        self.store.delete(RecordKey::Temp)?;
        self.store.delete(RecordKey::Permanent)?;
        self.ensure_storage()?;
        self.day_counter.set_day(0);
        log::info!("all save data reset");
        Ok(())
    }

    /// Day counter as the temp record sees it right now.
    pub fn current_day(&self) -> Day {
        self.load_or_default(RecordKey::Temp).day
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Decode a record, falling back to a fresh default on any recoverable
    /// failure. Missing records, undecodable bytes, and version drift all
    /// land here as "start clean".
    fn load_or_default(&self, key: RecordKey) -> SaveDirectory {
        let bytes = match self.store.read(key) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("record '{key}' unreadable, using defaults: {e}");
                return self.fresh_directory(key);
            }
        };
        match codec::decode::<SaveDirectory>(&bytes) {
            Ok(directory) if directory.version == SAVE_VERSION => directory,
            Ok(directory) => {
                log::warn!(
                    "record '{key}' is version {}, expected {SAVE_VERSION}; using defaults",
                    directory.version
                );
                self.fresh_directory(key)
            }
            Err(e) => {
                log::warn!("record '{key}' undecodable, using defaults: {e}");
                self.fresh_directory(key)
            }
        }
    }

    /// What a brand-new directory for this record looks like. The temp
    /// side gets the initial fragment slots, the permanent side does not.
    fn fresh_directory(&self, key: RecordKey) -> SaveDirectory {
        let mut directory = SaveDirectory::default();
        if key == RecordKey::Temp {
            directory.set_initial_references(&self.kinds);
        }
        directory
    }

    fn persist(&self, key: RecordKey, directory: &SaveDirectory) -> SaveResult<()> {
        self.store.write(key, &codec::encode(directory)?)
    }
}
