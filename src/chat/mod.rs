//! Conversation side of the pipeline: session memory, question
//! condensation, grounded synthesis and the per-turn orchestrator.

pub mod condenser;
pub mod memory;
pub mod orchestrator;
pub mod synthesizer;

pub use condenser::Condenser;
pub use memory::{ConversationMemory, Turn};
pub use orchestrator::{Orchestrator, TurnOutcome, TurnPhase};
pub use synthesizer::Synthesizer;
