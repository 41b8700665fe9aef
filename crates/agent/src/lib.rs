//! The exchange loop at the center of homehub.
//!
//! One utterance becomes one reply:
//!
//! 1. **Seed** a transcript with the user's utterance
//! 2. **Complete**: send transcript, system prompt and tool catalog to the provider
//! 3. **If tool requests**: execute them in order, append the results, go to 2
//! 4. **If final text**: return it
//!
//! The loop stops after a fixed number of completion rounds and answers
//! with a short acknowledgement if no final text arrived by then.

pub mod executor;
pub mod orchestrator;
pub mod prompt;

#[cfg(test)]
mod test_helpers;

pub use executor::ToolExecutor;
pub use orchestrator::{FALLBACK_REPLY, Finish, Orchestrator, Reply};
pub use prompt::Persona;
