//! SparkLink engine core
//!
//! Pure state machine logic for beacon discovery and anonymous chat,
//! completely decoupled from I/O, wall-clock time and scheduling.
//!
//! # Architecture
//!
//! Every operation takes its inputs explicitly (current time, a random
//! source) and returns declarative actions such as "schedule this timer in
//! 2 seconds". A runtime or test harness interprets those actions. Delayed
//! work is never cancelled: each timer carries a token and the state machine
//! re-validates it on delivery, so a timer source that cannot cancel is still
//! safe.
//!
//! # Components
//!
//! - [`mod@env`]: Environment abstraction (time, sleep, RNG)
//! - [`timer`]: One-shot timer queue with FIFO ordering for equal deadlines
//! - [`token`]: Opaque tokens that invalidate superseded timers
//! - [`discovery`]: Beacon state machine (Dormant, Scanning, Found)
//! - [`chat`]: Message log and scripted auto-reply for one peer
//! - [`prompt`]: Conversation-starter selection
//! - [`peer`]: Anonymous peer profiles and factories
//! - [`config`]: Engine configuration
//! - [`error`]: Error types

pub mod chat;
pub mod config;
pub mod discovery;
pub mod env;
pub mod error;
pub mod peer;
pub mod prompt;
pub mod timer;
pub mod token;

pub use chat::{ChatMessage, ChatSession, MessageId, Sender};
pub use config::{ConfigError, EngineConfig, MAX_DELAY, PeerSelection, delay_from_secs};
pub use discovery::{DiscoveryAction, DiscoverySession, DiscoveryStatus};
pub use env::{EnvRng, Environment};
pub use error::{EngineError, ValidationError};
pub use peer::{
    CatalogPeerFactory, FixedPeerFactory, PeerFactory, PeerId, PeerProfile, ProfileTemplate,
};
pub use prompt::PromptGenerator;
pub use timer::TimerQueue;
pub use token::{ActivationToken, ChatId, ReplyToken, Timer};
