//! Scene transition choreography: save first, fade, then switch.
//!
//! RULES:
//!   - The outgoing scene is saved BEFORE the fade begins; a transition
//!     never loses the scene it is leaving.
//!   - The switch waits until the fade overlay and the audio crossfade
//!     both report inactive, sampled on a fixed poll interval.
//!   - One transition at a time. Requests made mid-transition are
//!     dropped with a warning.

use crate::engine::SyncEngine;
use crate::saveable::Saveable;
use crate::types::SceneName;
use std::time::{Duration, Instant};

/// How often the coordinator re-samples the fade and audio signals.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Visual fade overlay. The switch waits for `is_active` to clear.
pub trait FadeEffect {
    /// Start fading the outgoing scene to black.
    fn begin_fade_out(&mut self);
    fn is_active(&self) -> bool;
}

/// Audio ramp that accompanies the fade. The switch waits for this too.
pub trait AudioCrossfade {
    fn is_active(&self) -> bool;
}

/// Hands the actual scene switch to whatever owns scene lifecycles.
pub trait SceneLoader {
    fn load(&mut self, scene: &str);
}

/// Clock the coordinator polls against. Injectable so tests can step
/// time by hand.
pub trait PollClock {
    fn now(&self) -> Duration;
}

/// Wall clock, measured from construction.
pub struct SystemClock(Instant);

impl SystemClock {
    pub fn new() -> Self {
        Self(Instant::now())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PollClock for SystemClock {
    fn now(&self) -> Duration {
        self.0.elapsed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionState {
    /// No transition in flight.
    Idle,
    /// Scene saved, fade running. Signals are next sampled at `next_poll_at`.
    Fading {
        scene:        SceneName,
        next_poll_at: Duration,
    },
    /// Signals cleared. The switch happens on the next poll.
    SwitchRequested { scene: SceneName },
}

pub struct TransitionCoordinator {
    state:         TransitionState,
    fade:          Box<dyn FadeEffect>,
    audio:         Box<dyn AudioCrossfade>,
    loader:        Box<dyn SceneLoader>,
    clock:         Box<dyn PollClock>,
    poll_interval: Duration,
}

impl TransitionCoordinator {
    pub fn new(
        fade: Box<dyn FadeEffect>,
        audio: Box<dyn AudioCrossfade>,
        loader: Box<dyn SceneLoader>,
    ) -> Self {
        Self::with_clock(fade, audio, loader, Box::new(SystemClock::new()), POLL_INTERVAL)
    }

    /// Like `new`, with the clock and poll interval under caller control.
    pub fn with_clock(
        fade: Box<dyn FadeEffect>,
        audio: Box<dyn AudioCrossfade>,
        loader: Box<dyn SceneLoader>,
        clock: Box<dyn PollClock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            state: TransitionState::Idle,
            fade,
            audio,
            loader,
            clock,
            poll_interval,
        }
    }

    /// Start a transition to `scene`. The outgoing scene's entities are
    /// saved before anything fades.
    ///
    /// A request made while a transition is in flight is dropped; the one
    /// already running finishes first.
    pub fn request_scene(
        &mut self,
        scene: &str,
        engine: &SyncEngine,
        entities: &mut [&mut dyn Saveable],
    ) {
        if self.state != TransitionState::Idle {
            log::warn!("transition to '{scene}' ignored: another is in flight");
            return;
        }
        engine.save_scene(entities);
        self.fade.begin_fade_out();
        self.state = TransitionState::Fading {
            scene:        scene.to_string(),
            next_poll_at: self.clock.now() + self.poll_interval,
        };
        log::debug!("transition to '{scene}' started");
    }

    /// Drive the transition forward. Call once per frame; at most one
    /// state change happens per call.
    pub fn poll(&mut self) {
        match std::mem::replace(&mut self.state, TransitionState::Idle) {
            TransitionState::Idle => {}
            TransitionState::Fading { scene, next_poll_at } => {
                if self.clock.now() < next_poll_at {
                    // Not due yet. Keep waiting for the same deadline.
                    self.state = TransitionState::Fading { scene, next_poll_at };
                } else if self.fade.is_active() || self.audio.is_active() {
                    self.state = TransitionState::Fading {
                        scene,
                        next_poll_at: self.clock.now() + self.poll_interval,
                    };
                } else {
                    log::debug!("fade finished; switching to '{scene}'");
                    self.state = TransitionState::SwitchRequested { scene };
                }
            }
            TransitionState::SwitchRequested { scene } => {
                self.loader.load(&scene);
                self.state = TransitionState::Idle;
            }
        }
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransitionState::Idle
    }
}
