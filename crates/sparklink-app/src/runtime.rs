//! Generic runtime.
//!
//! Runs an [`App`] against any [`Driver`]. The runtime owns the timer queue:
//! it executes [`AppAction::ScheduleTimer`] by queueing the timer, sleeps on
//! the app's environment until the earliest deadline, and feeds due timers
//! back as [`AppEvent::TimerFired`] in deadline order (FIFO for ties). User
//! input and timers are handled one at a time on a single task.

use std::future::pending;

use sparklink_core::{Environment, Timer, TimerQueue};
use tracing::{debug, warn};

use crate::{App, AppAction, AppEvent, Driver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Orchestration loop connecting an [`App`] to a [`Driver`].
pub struct Runtime<D: Driver, E: Environment> {
    app: App<E>,
    driver: D,
    timers: TimerQueue<Timer>,
}

impl<D: Driver, E: Environment> Runtime<D, E> {
    /// Create a runtime.
    pub fn new(app: App<E>, driver: D) -> Self {
        Self { app, driver, timers: TimerQueue::new() }
    }

    /// The app being driven.
    pub fn app(&self) -> &App<E> {
        &self.app
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Timers still queued, stale ones included.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Run until the driver runs out of input or the app quits.
    ///
    /// Rejected intents are reported to the driver and do not stop the run.
    ///
    /// # Errors
    ///
    /// Returns the first driver error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app.snapshot())?;

        loop {
            let env = self.app.env().clone();
            let wait = self
                .timers
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(env.now()));
            let timer_due = async move {
                match wait {
                    Some(wait) => env.sleep(wait).await,
                    None => pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                () = timer_due => {
                    if self.fire_due_timers()? == Flow::Quit {
                        return Ok(());
                    }
                },
                event = self.driver.poll_event() => {
                    let Some(event) = event? else {
                        debug!("input exhausted");
                        return Ok(());
                    };
                    if self.dispatch(event)? == Flow::Quit {
                        return Ok(());
                    }
                },
            }
        }
    }

    fn fire_due_timers(&mut self) -> Result<Flow, D::Error> {
        let now = self.app.env().now();
        while let Some(timer) = self.timers.pop_due(now) {
            if self.dispatch(AppEvent::TimerFired(timer))? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, event: AppEvent) -> Result<Flow, D::Error> {
        match self.app.handle(event) {
            Ok(actions) => self.execute(actions),
            Err(error) => {
                warn!(%error, "intent rejected");
                self.driver.report_error(&error)?;
                Ok(Flow::Continue)
            },
        }
    }

    fn execute(&mut self, actions: Vec<AppAction>) -> Result<Flow, D::Error> {
        for action in actions {
            match action {
                AppAction::ScheduleTimer { delay, timer } => {
                    let now = self.app.env().now();
                    self.timers.schedule(now, delay, timer);
                },
                AppAction::Render => self.driver.render(&self.app.snapshot())?,
                AppAction::Quit => return Ok(Flow::Quit),
            }
        }
        Ok(Flow::Continue)
    }
}
