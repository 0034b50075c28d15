//! Runtime tests on tokio's paused clock.
//!
//! A scripted driver feeds intents and waits; tokio auto-advances virtual
//! time whenever the runtime is idle, so the discovery and reply timers fire
//! without real sleeping.

use std::{collections::VecDeque, convert::Infallible, time::Duration};

use sparklink_app::{App, AppError, AppEvent, Driver, Runtime, Snapshot, SystemEnv};
use sparklink_core::{
    DiscoveryStatus, EngineConfig, EngineError, Sender, ValidationError, chat::DEFAULT_CANNED_REPLY,
};

enum Step {
    Event(AppEvent),
    /// Open a chat with the first peer in the last rendered snapshot.
    OpenFirstNearby,
    Wait(Duration),
}

struct ScriptedDriver {
    steps: VecDeque<Step>,
    wait_until: Option<tokio::time::Instant>,
    renders: Vec<Snapshot>,
    errors: Vec<AppError>,
}

impl ScriptedDriver {
    fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            wait_until: None,
            renders: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn last(&self) -> &Snapshot {
        self.renders.last().expect("at least one render")
    }
}

impl Driver for ScriptedDriver {
    type Error = Infallible;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        loop {
            match self.steps.front() {
                None => return Ok(None),
                Some(Step::Wait(duration)) => {
                    // Deadline survives cancellation by the runtime's timer branch
                    let duration = *duration;
                    let deadline = *self
                        .wait_until
                        .get_or_insert_with(|| tokio::time::Instant::now() + duration);
                    tokio::time::sleep_until(deadline).await;
                    self.wait_until = None;
                    self.steps.pop_front();
                },
                Some(Step::OpenFirstNearby) => {
                    self.steps.pop_front();
                    let peer_id =
                        self.last().nearby.first().map(|peer| peer.id).expect("peer visible");
                    return Ok(Some(AppEvent::OpenChat { peer_id }));
                },
                Some(Step::Event(_)) => {
                    if let Some(Step::Event(event)) = self.steps.pop_front() {
                        return Ok(Some(event));
                    }
                },
            }
        }
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        self.renders.push(snapshot.clone());
        Ok(())
    }

    fn report_error(&mut self, error: &AppError) -> Result<(), Self::Error> {
        self.errors.push(error.clone());
        Ok(())
    }
}

fn runtime(steps: Vec<Step>) -> Runtime<ScriptedDriver, SystemEnv> {
    let app = App::new(SystemEnv, EngineConfig::default()).expect("valid config");
    Runtime::new(app, ScriptedDriver::new(steps))
}

#[tokio::test(start_paused = true)]
async fn beacon_finds_peer_after_delay() {
    let mut rt = runtime(vec![
        Step::Event(AppEvent::ActivateBeacon),
        Step::Wait(Duration::from_millis(1999)),
    ]);
    rt.run().await.unwrap();
    assert_eq!(rt.driver().last().status, DiscoveryStatus::Scanning);

    let mut rt = runtime(vec![
        Step::Event(AppEvent::ActivateBeacon),
        Step::Wait(Duration::from_millis(2001)),
    ]);
    rt.run().await.unwrap();
    let last = rt.driver().last();
    assert_eq!(last.status, DiscoveryStatus::Found);
    assert_eq!(last.nearby_count(), 1);
    assert!(last.prompt.is_some());
}

#[tokio::test(start_paused = true)]
async fn deactivate_before_delay_keeps_dormant() {
    let mut rt = runtime(vec![
        Step::Event(AppEvent::ActivateBeacon),
        Step::Wait(Duration::from_secs(1)),
        Step::Event(AppEvent::DeactivateBeacon),
        Step::Wait(Duration::from_secs(5)),
    ]);
    rt.run().await.unwrap();

    assert_eq!(rt.app().status(), DiscoveryStatus::Dormant);
    assert_eq!(rt.driver().last().nearby_count(), 0);
    assert!(rt.driver().renders.iter().all(|snapshot| snapshot.status != DiscoveryStatus::Found));
    // The stale timer was still delivered and discarded
    assert_eq!(rt.pending_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn superseded_reply_scenario() {
    let mut rt = runtime(vec![
        Step::Event(AppEvent::ActivateBeacon),
        Step::Wait(Duration::from_secs(2)),
        Step::OpenFirstNearby,
        Step::Event(AppEvent::SendMessage { text: "hi".into() }),
        Step::Wait(Duration::from_millis(500)),
        Step::Event(AppEvent::SendMessage { text: "there".into() }),
        Step::Wait(Duration::from_secs(3)),
    ]);
    rt.run().await.unwrap();

    let chat = rt.driver().last().chat.clone().expect("chat open");
    let transcript: Vec<_> = chat.messages.iter().map(|m| (m.sender, m.text.as_str())).collect();
    assert_eq!(
        transcript,
        vec![(Sender::User, "hi"), (Sender::User, "there"), (Sender::Peer, DEFAULT_CANNED_REPLY)]
    );

    // Reply came 1.5s after the second send, not the first
    let second = &chat.messages[1];
    let reply = &chat.messages[2];
    assert_eq!(reply.timestamp - second.timestamp, Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn rejected_intents_are_reported_not_fatal() {
    let mut rt = runtime(vec![
        Step::Event(AppEvent::DeactivateBeacon),
        Step::Event(AppEvent::ActivateBeacon),
        Step::Wait(Duration::from_secs(2)),
        Step::OpenFirstNearby,
        Step::Event(AppEvent::SendMessage { text: "   ".into() }),
        Step::Event(AppEvent::CloseChat),
    ]);
    rt.run().await.unwrap();

    let errors = &rt.driver().errors;
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], AppError::Engine(EngineError::InvalidStateTransition { .. })));
    assert_eq!(errors[1], AppError::Engine(EngineError::Validation(ValidationError::EmptyMessage)));
    assert!(rt.driver().last().chat.is_none());
}

#[tokio::test(start_paused = true)]
async fn quit_stops_the_run() {
    let mut rt = runtime(vec![
        Step::Event(AppEvent::ActivateBeacon),
        Step::Event(AppEvent::Quit),
        Step::Event(AppEvent::DeactivateBeacon),
    ]);
    rt.run().await.unwrap();

    // Deactivate after quit was never processed
    assert_eq!(rt.app().status(), DiscoveryStatus::Scanning);
    assert_eq!(rt.pending_timers(), 1);
}
