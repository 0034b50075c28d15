//! Conversation-starter prompts.

use rand::{RngCore, seq::SliceRandom};

/// Prompt returned when the pool is empty.
pub const FALLBACK_PROMPT: &str = "Say Hello!";

/// Default conversation starters.
pub const DEFAULT_PROMPTS: [&str; 3] = [
    "Ask about their favorite queer-friendly art class!",
    "See if they want to study at the 'Rainbow Cafe'.",
    "Ask: 'What is your favorite safe space on campus?'",
];

/// Selects a conversation starter from a fixed pool.
///
/// Stateless: the only input besides the pool is the caller's RNG, so a
/// seeded RNG gives reproducible prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptGenerator {
    pool: Vec<String>,
}

impl PromptGenerator {
    /// Generator over `pool`.
    pub fn new(pool: Vec<String>) -> Self {
        Self { pool }
    }

    /// Pick one prompt uniformly at random.
    ///
    /// Never fails; an empty pool yields [`FALLBACK_PROMPT`].
    pub fn generate(&self, rng: &mut dyn RngCore) -> String {
        self.pool.choose(rng).map_or_else(|| FALLBACK_PROMPT.to_string(), Clone::clone)
    }

    /// The configured pool.
    pub fn pool(&self) -> &[String] {
        &self.pool
    }
}

impl Default for PromptGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPTS.iter().map(|prompt| (*prompt).to_string()).collect())
    }
}
