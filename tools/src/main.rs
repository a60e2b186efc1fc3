//! save-runner: headless walkthrough of the two-tier save flow.
//!
//! Usage:
//!   save-runner --root save-data --days 3 --rooms 2
//!   save-runner --config save.json
//!   save-runner --root save-data --reset

use anyhow::Result;
use savesync_core::{
    config::SaveConfig,
    directory::Fragment,
    engine::{DayCounter, SyncEngine},
    saveable::Saveable,
    store::{RecordKey, RecordStore},
    transition::{
        AudioCrossfade, FadeEffect, SceneLoader, SystemClock, TransitionCoordinator,
    },
    types::Day,
};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::env;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

const ROOMS: [&str; 3] = ["MainHall", "Aviary", "OtterPond"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AnimalState {
    name:   String,
    hunger: u32,
}

/// Demo zoo animal. Hunger climbs as the day goes; feeding clears it and
/// restarts the fed-tracking counter.
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

    fn graze(&mut self, appetite: u32) {
        self.state.hunger += appetite;
    }

    fn feed(&mut self) {
        self.state.hunger = 0;
        self.days_since_fed = 0;
    }
}

impl Saveable for Animal {
    fn kind(&self) -> &'static str {
        "animal"
    }

    fn refresh_before_save(&mut self) {}

    fn write_fragment(&self) -> Fragment {
        Fragment {
            payload: serde_json::to_value(&self.state).unwrap_or(serde_json::Value::Null),
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

/// Demo exhibit. Wears down as visitors pass through.
struct Exhibit {
    state: ExhibitState,
}

impl Exhibit {
    fn new(theme: &str, cleanliness: u32) -> Self {
        Self {
            state: ExhibitState { theme: theme.into(), cleanliness },
        }
    }

    fn weather(&mut self, wear: u32) {
        self.state.cleanliness = self.state.cleanliness.saturating_sub(wear);
    }
}

impl Saveable for Exhibit {
    fn kind(&self) -> &'static str {
        "exhibit"
    }

    fn refresh_before_save(&mut self) {}

    fn write_fragment(&self) -> Fragment {
        Fragment {
            payload: serde_json::to_value(&self.state).unwrap_or(serde_json::Value::Null),
            days_since_data: None,
        }
    }

    fn read_fragment(&mut self, fragment: &Fragment) {
        if let Ok(state) = serde_json::from_value(fragment.payload.clone()) {
            self.state = state;
        }
    }
}

/// Morning tracker stand-in. Only hears from the engine on a reset.
struct MorningLog;

impl DayCounter for MorningLog {
    fn set_day(&mut self, day: Day) {
        println!("  morning tracker reset to day {day}");
    }
}

/// Real-time fade stand-in: active for a fixed span once the fade starts.
/// The audio ramp shares the start instant with its own, shorter span.
#[derive(Clone)]
struct FadeTimer {
    started:  Rc<Cell<Option<Instant>>>,
    duration: Duration,
}

impl FadeTimer {
    fn running(&self) -> bool {
        self.started
            .get()
            .map(|t| t.elapsed() < self.duration)
            .unwrap_or(false)
    }
}

impl FadeEffect for FadeTimer {
    fn begin_fade_out(&mut self) {
        self.started.set(Some(Instant::now()));
    }

    fn is_active(&self) -> bool {
        self.running()
    }
}

impl AudioCrossfade for FadeTimer {
    fn is_active(&self) -> bool {
        self.running()
    }
}

/// Scene loader stand-in that just tracks which room is live.
struct RoomLoader {
    current: Rc<RefCell<String>>,
}

impl SceneLoader for RoomLoader {
    fn load(&mut self, scene: &str) {
        println!("  >> entering {scene}");
        *self.current.borrow_mut() = scene.to_string();
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let days = parse_arg(&args, "--days", 2u32);
    let rooms = parse_arg(&args, "--rooms", ROOMS.len()).clamp(1, ROOMS.len());
    let reset = args.iter().any(|a| a == "--reset");
    let root = args
        .windows(2)
        .find(|w| w[0] == "--root")
        .map(|w| w[1].as_str())
        .unwrap_or("save-data");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => {
            if args.iter().any(|a| a == "--root") {
                log::warn!("--root is ignored when --config is given");
            }
            SaveConfig::load(path)?
        }
        None => SaveConfig {
            save_root:    root.to_string(),
            entity_kinds: vec!["animal".into(), "exhibit".into()],
            fade_poll_ms: 50,
        },
    };

    println!("save-runner");
    println!("  root:  {}", config.save_root);
    println!("  days:  {days}");
    println!("  rooms: {rooms}");
    println!("  poll:  {}ms", config.fade_poll_ms);
    println!();

    let store = RecordStore::open(&config.save_root)?;
    let mut engine = SyncEngine::new(store, config.entity_kinds.clone(), Box::new(MorningLog));

    if reset {
        engine.reset_all()?;
        println!("save data wiped; fresh records ready under {}", config.save_root);
        return Ok(());
    }

    engine.ensure_storage()?;
    engine.bootstrap_sync()?;

    let mut otter = Animal::new("otter", 20);
    let mut heron = Animal::new("heron", 10);
    let mut pond = Exhibit::new("wetland", 90);

    let current_room = Rc::new(RefCell::new(ROOMS[0].to_string()));
    let fade_started = Rc::new(Cell::new(None));
    let fade = FadeTimer {
        started:  fade_started.clone(),
        duration: Duration::from_millis(120),
    };
    let audio = FadeTimer {
        started:  fade_started,
        duration: Duration::from_millis(80),
    };
    let loader = RoomLoader { current: current_room.clone() };
    let mut coordinator = TransitionCoordinator::with_clock(
        Box::new(fade),
        Box::new(audio),
        Box::new(loader),
        Box::new(SystemClock::new()),
        config.fade_poll_interval(),
    );

    let circuit = &ROOMS[..rooms];
    for day in 1..=days {
        println!("day {day}");
        for (i, room) in circuit.iter().enumerate() {
            // Arriving: restore whatever the temp record knows.
            engine.load_scene(&mut scene(&mut otter, &mut heron, &mut pond));

            // The visit itself.
            otter.graze(3);
            heron.graze(2);
            pond.weather(1);
            if *room == "OtterPond" {
                otter.feed();
            }
            println!(
                "  {room}: otter hunger {}, heron hunger {}, pond cleanliness {}",
                otter.state.hunger, heron.state.hunger, pond.state.cleanliness
            );

            // Leaving: save, fade, then hand over the next room.
            let next = circuit[(i + 1) % circuit.len()];
            coordinator.request_scene(next, &engine, &mut scene(&mut otter, &mut heron, &mut pond));
            while !coordinator.is_idle() {
                coordinator.poll();
                thread::sleep(Duration::from_millis(10));
            }
        }
        engine.increment_day();
        println!("  night falls (day {} begins)", engine.current_day());
    }

    engine.commit_save(&mut scene(&mut otter, &mut heron, &mut pond))?;
    print_summary(&engine, &current_room.borrow())?;
    Ok(())
}

fn scene<'a>(
    otter: &'a mut Animal,
    heron: &'a mut Animal,
    pond: &'a mut Exhibit,
) -> [&'a mut dyn Saveable; 3] {
    [otter as &mut dyn Saveable, heron, pond]
}

fn print_summary(engine: &SyncEngine, room: &str) -> Result<()> {
    let temp = engine.store().read(RecordKey::Temp)?;
    let perma = engine.store().read(RecordKey::Permanent)?;

    println!();
    println!("=== SAVE SUMMARY ===");
    println!("  root:        {}", engine.store().root().display());
    println!("  day:         {}", engine.current_day());
    println!("  last room:   {room}");
    println!("  temp bytes:  {}", temp.len());
    println!("  perma bytes: {}", perma.len());
    println!("  committed:   {}", if temp == perma { "yes" } else { "no" });
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
