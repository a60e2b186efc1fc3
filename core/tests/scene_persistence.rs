//! Integration tests for scene save and load passes.
//!
//! Tests verify how live entities map onto the temp record:
//! 1. a saved scene loads back with nothing lost, in discovery order
//! 2. repeat saves overwrite fragments in place instead of growing
//! 3. a kind with no live instances keeps its fragment slot untouched
//! 4. fragments beyond a smaller scene survive the save pass
//! 5. loading with zero live entities is a warned no-op
//! 6. the day rollover bumps the day and only the tracked counters

use savesync_core::{
    codec,
    directory::{Fragment, SaveDirectory},
    engine::{DayCounter, SyncEngine},
    saveable::Saveable,
    store::{RecordKey, RecordStore},
    types::Day,
};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

struct NoDays;

impl DayCounter for NoDays {
    fn set_day(&mut self, _day: Day) {}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AnimalState {
    name:   String,
    hunger: u32,
}

/// Zoo animal. Tracks how long since it was last fed.
#[derive(Debug, Default)]
struct Animal {
    state:          AnimalState,
    days_since_fed: u32,
}

impl Animal {
    fn new(name: &str, hunger: u32) -> Self {
        Self {
            state: AnimalState { name: name.into(), hunger },
            days_since_fed: 0,
        }
    }
}

impl Saveable for Animal {
    fn kind(&self) -> &'static str {
        "animal"
    }

    fn refresh_before_save(&mut self) {}

    fn write_fragment(&self) -> Fragment {
        Fragment {
            payload: serde_json::to_value(&self.state).expect("animal state to json"),
            days_since_data: Some(self.days_since_fed),
        }
    }

    fn read_fragment(&mut self, fragment: &Fragment) {
        if let Ok(state) = serde_json::from_value(fragment.payload.clone()) {
            self.state = state;
        }
        if let Some(days) = fragment.days_since_data {
            self.days_since_fed = days;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ExhibitState {
    theme:       String,
    cleanliness: u32,
}

/// Zoo exhibit. No days-since counter; its fragment carries None.
#[derive(Debug, Default)]
struct Exhibit {
    state: ExhibitState,
}

impl Exhibit {
    fn new(theme: &str, cleanliness: u32) -> Self {
        Self {
            state: ExhibitState { theme: theme.into(), cleanliness },
        }
    }
}

impl Saveable for Exhibit {
    fn kind(&self) -> &'static str {
        "exhibit"
    }

    fn refresh_before_save(&mut self) {}

    fn write_fragment(&self) -> Fragment {
        Fragment {
            payload: serde_json::to_value(&self.state).expect("exhibit state to json"),
            days_since_data: None,
        }
    }

    fn read_fragment(&mut self, fragment: &Fragment) {
        if let Ok(state) = serde_json::from_value(fragment.payload.clone()) {
            self.state = state;
        }
    }
}

/// Build an engine over a throwaway store root, records already created.
fn build(dir: &TempDir) -> SyncEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = RecordStore::open(dir.path()).expect("open store");
    let engine = SyncEngine::new(
        store,
        vec!["animal".into(), "exhibit".into()],
        Box::new(NoDays),
    );
    engine.ensure_storage().expect("ensure_storage");
    engine
}

fn temp_directory(engine: &SyncEngine) -> SaveDirectory {
    let bytes = engine.store().read(RecordKey::Temp).expect("read temp");
    codec::decode(&bytes).expect("decode temp")
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: save then load round-trips every entity, in discovery order
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn saved_scene_loads_back_without_loss() {
    let dir = TempDir::new().expect("temp dir");
    let engine = build(&dir);

    let mut otter = Animal::new("otter", 40);
    otter.days_since_fed = 2;
    let mut heron = Animal::new("heron", 15);
    let mut pond = Exhibit::new("wetland", 80);
    engine.save_scene(&mut [
        &mut otter as &mut dyn Saveable,
        &mut heron,
        &mut pond,
    ]);

    // A fresh set of default entities stands in for the reloaded scene.
    let mut otter2 = Animal::default();
    let mut heron2 = Animal::default();
    let mut pond2 = Exhibit::default();
    engine.load_scene(&mut [
        &mut otter2 as &mut dyn Saveable,
        &mut heron2,
        &mut pond2,
    ]);

    assert_eq!(otter2.state, otter.state, "first animal must load first");
    assert_eq!(otter2.days_since_fed, 2);
    assert_eq!(heron2.state, heron.state, "second animal must load second");
    assert_eq!(pond2.state, pond.state);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: repeat saves overwrite in place
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn repeat_saves_overwrite_fragments_in_place() {
    let dir = TempDir::new().expect("temp dir");
    let engine = build(&dir);

    let mut otter = Animal::new("otter", 40);
    engine.save_scene(&mut [&mut otter as &mut dyn Saveable]);
    otter.state.hunger = 10;
    engine.save_scene(&mut [&mut otter as &mut dyn Saveable]);

    let directory = temp_directory(&engine);
    let fragments = directory.fragments("animal");
    assert_eq!(fragments.len(), 1, "second save must not append a duplicate");

    let mut back = Animal::default();
    engine.load_scene(&mut [&mut back as &mut dyn Saveable]);
    assert_eq!(back.state.hunger, 10, "latest save wins");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: a kind with zero live instances keeps its slot untouched
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn absent_kind_keeps_its_initial_slot() {
    let dir = TempDir::new().expect("temp dir");
    let engine = build(&dir);
    let before = temp_directory(&engine);
    let exhibit_slot_before = before.fragments("exhibit").to_vec();

    // Two animals, no exhibits in this scene.
    let mut otter = Animal::new("otter", 40);
    let mut heron = Animal::new("heron", 15);
    engine.save_scene(&mut [&mut otter as &mut dyn Saveable, &mut heron]);

    let after = temp_directory(&engine);
    assert_eq!(after.fragments("animal").len(), 2);
    assert_eq!(
        after.fragments("exhibit"),
        exhibit_slot_before.as_slice(),
        "untouched kind must keep its slot exactly"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: fragments beyond a smaller scene survive
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn surplus_fragments_survive_a_smaller_scene() {
    let dir = TempDir::new().expect("temp dir");
    let engine = build(&dir);

    let mut otter = Animal::new("otter", 40);
    let mut heron = Animal::new("heron", 15);
    engine.save_scene(&mut [&mut otter as &mut dyn Saveable, &mut heron]);

    // The next scene only instantiates one animal. Saving it must leave
    // the heron's fragment in place for whichever scene spawns it again.
    let mut lone = Animal::new("otter", 5);
    engine.save_scene(&mut [&mut lone as &mut dyn Saveable]);

    let directory = temp_directory(&engine);
    assert_eq!(directory.fragments("animal").len(), 2, "lists only grow");

    let mut first = Animal::default();
    let mut second = Animal::default();
    engine.load_scene(&mut [&mut first as &mut dyn Saveable, &mut second]);
    assert_eq!(first.state.hunger, 5, "slot 0 reflects the latest save");
    assert_eq!(second.state, heron.state, "slot 1 survives untouched");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: loading with zero entities is a warned no-op
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn loading_an_empty_scene_changes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let engine = build(&dir);

    let mut otter = Animal::new("otter", 40);
    engine.save_scene(&mut [&mut otter as &mut dyn Saveable]);
    let before = engine.store().read(RecordKey::Temp).expect("read temp");

    engine.load_scene(&mut []);

    let after = engine.store().read(RecordKey::Temp).expect("read temp again");
    assert_eq!(before, after, "an empty load pass must not touch the record");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: the day rollover bumps the day and only the tracked counters
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn day_rollover_advances_day_and_tracked_counters() {
    let dir = TempDir::new().expect("temp dir");
    let engine = build(&dir);

    let mut otter = Animal::new("otter", 40);
    otter.days_since_fed = 2;
    let mut pond = Exhibit::new("wetland", 80);
    engine.save_scene(&mut [&mut otter as &mut dyn Saveable, &mut pond]);

    engine.increment_day();
    engine.increment_day();

    assert_eq!(engine.current_day(), 2);

    let mut otter2 = Animal::default();
    let mut pond2 = Exhibit::default();
    engine.load_scene(&mut [&mut otter2 as &mut dyn Saveable, &mut pond2]);
    assert_eq!(otter2.days_since_fed, 4, "tracked counter advances with the day");
    assert_eq!(pond2.state, pond.state, "untracked entities ride along unchanged");

    let directory = temp_directory(&engine);
    assert_eq!(
        directory.fragments("exhibit")[0].days_since_data, None,
        "untracked fragments never grow a counter"
    );
}
