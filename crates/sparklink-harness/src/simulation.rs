//! Engine simulation on a virtual clock.
//!
//! [`Simulation`] plays the role of the runtime: it executes the app's
//! actions, keeps the timer queue, and delivers timers when virtual time is
//! advanced past their deadlines. Every state change the app publishes is
//! recorded for assertions.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use sparklink_app::{App, AppAction, AppError, AppEvent, StateChange};
use sparklink_core::{EngineConfig, Environment, PeerId, Timer, TimerQueue};
use tracing::trace;

use crate::SimEnv;

/// An app, its timers and a virtual clock.
pub struct Simulation {
    env: SimEnv,
    app: App<SimEnv>,
    timers: TimerQueue<Timer>,
    changes: Arc<Mutex<Vec<StateChange>>>,
    renders: usize,
}

impl Simulation {
    /// Simulation with default configuration.
    pub fn new(seed: u64) -> Self {
        let env = SimEnv::with_seed(seed);
        let app = App::with_defaults(env.clone());
        Self::from_app(env, app)
    }

    /// Simulation with a custom configuration.
    pub fn with_config(seed: u64, config: EngineConfig) -> Result<Self, AppError> {
        let env = SimEnv::with_seed(seed);
        let app = App::new(env.clone(), config)?;
        Ok(Self::from_app(env, app))
    }

    /// Wrap an existing app. `env` must be the app's environment.
    pub fn from_app(env: SimEnv, mut app: App<SimEnv>) -> Self {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        app.subscribe(move |change| {
            sink.lock().unwrap_or_else(PoisonError::into_inner).push(change.clone());
        });
        Self { env, app, timers: TimerQueue::new(), changes, renders: 0 }
    }

    /// The app under test.
    pub fn app(&self) -> &App<SimEnv> {
        &self.app
    }

    /// The shared environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Virtual time since the simulation started.
    pub fn elapsed(&self) -> Duration {
        self.env.elapsed()
    }

    /// Timers still queued, stale ones included.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of render requests so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// State changes published so far.
    pub fn changes(&self) -> Vec<StateChange> {
        self.changes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain the recorded state changes.
    pub fn take_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut *self.changes.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// First visible peer, if any.
    pub fn first_nearby(&self) -> Option<PeerId> {
        self.app.discovery().nearby().first().map(|peer| peer.id)
    }

    /// Deliver an event at the current virtual time.
    pub fn apply(&mut self, event: AppEvent) -> Result<(), AppError> {
        let actions = self.app.handle(event)?;
        self.execute(actions);
        Ok(())
    }

    /// Advance virtual time by `by`, firing every timer that becomes due.
    ///
    /// Timers fire at their own deadlines, in deadline order, so state
    /// reached at each firing sees the right clock. Returns the number of
    /// timers delivered (stale ones included).
    pub fn advance(&mut self, by: Duration) -> usize {
        let target = self.env.now() + by;
        let mut fired = 0;

        while let Some(deadline) = self.timers.next_deadline() {
            if deadline > target {
                break;
            }
            self.env.advance_to(deadline);
            while let Some(timer) = self.timers.pop_due(deadline) {
                trace!(?timer, elapsed = ?self.env.elapsed(), "firing timer");
                fired += 1;
                self.fire(timer);
            }
        }

        self.env.advance_to(target);
        fired
    }

    /// Fire every queued timer, advancing the clock as far as needed.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some((deadline, timer)) = self.timers.pop_next() {
            self.env.advance_to(deadline);
            fired += 1;
            self.fire(timer);
        }
        fired
    }

    fn fire(&mut self, timer: Timer) {
        // Timer delivery never fails; stale timers yield no actions.
        if let Ok(actions) = self.app.handle(AppEvent::TimerFired(timer)) {
            self.execute(actions);
        }
    }

    fn execute(&mut self, actions: Vec<AppAction>) {
        for action in actions {
            match action {
                AppAction::ScheduleTimer { delay, timer } => {
                    self.timers.schedule(self.env.now(), delay, timer);
                },
                AppAction::Render => self.renders += 1,
                AppAction::Quit => {},
            }
        }
    }
}
