//! The conversational side of parley.
//!
//! A chat turn follows a **send → act → observe** cycle:
//!
//! 1. **Build context** (persona system prompt + prior turns + the new message)
//! 2. **Send to LLM** with the persona tools advertised
//! 3. **If tool calls**: execute them in order, append results, loop back to step 2
//! 4. **If text response**: return it to the caller
//!
//! The loop ends when the LLM answers without tool calls or the round limit
//! is reached.

pub mod chat;
pub mod loop_runner;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chat::{ChatContext, ChatTurn, PersonaChat};
pub use loop_runner::{DEFAULT_MAX_ROUNDS, ToolLoop, execute_call};
