//! The tool-calling agent loop.

pub mod errors;
pub mod execution;
pub mod instructions;
pub mod machine;
pub mod models;
pub mod reasoning;
pub mod router;
pub mod runner;

pub use errors::{AgentError, ReasoningFailure};
pub use execution::ToolExecutor;
pub use machine::{LoopState, StepEvent};
pub use models::{AgentOptions, AgentOutcome};
pub use reasoning::ReasoningStep;
pub use router::{Route, route};
pub use runner::Agent;
