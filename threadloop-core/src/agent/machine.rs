//! States of one agent invocation.
//!
//! ```text
//! Start -> Reasoning(1) -> Routing(1) -> Tools(1) -> Reasoning(2) -> ... -> End
//!                                   \-> End
//! ```
//!
//! A cycle is one reasoning step plus the tool step it triggers. When the
//! reasoning step of the last allowed cycle still asks for tools the machine
//! refuses to continue.

use super::router::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Start,
    Reasoning { cycle: usize },
    Routing { cycle: usize },
    Tools { cycle: usize },
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Begin,
    Reasoned,
    Routed(Route),
    ToolsExecuted,
}

impl StepEvent {
    pub fn name(self) -> &'static str {
        match self {
            StepEvent::Begin => "begin",
            StepEvent::Reasoned => "reasoned",
            StepEvent::Routed(_) => "routed",
            StepEvent::ToolsExecuted => "tools_executed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    LimitExceeded { cycle: usize },
    OutOfOrder { state: LoopState, event: StepEvent },
}

impl LoopState {
    pub fn next(self, event: StepEvent, limit: usize) -> Result<LoopState, Halt> {
        match (self, event) {
            (LoopState::Start, StepEvent::Begin) => Ok(LoopState::Reasoning { cycle: 1 }),
            (LoopState::Reasoning { cycle }, StepEvent::Reasoned) => {
                Ok(LoopState::Routing { cycle })
            }
            (LoopState::Routing { .. }, StepEvent::Routed(Route::Stop)) => Ok(LoopState::End),
            (LoopState::Routing { cycle }, StepEvent::Routed(Route::Tools)) => {
                if cycle >= limit {
                    Err(Halt::LimitExceeded { cycle })
                } else {
                    Ok(LoopState::Tools { cycle })
                }
            }
            (LoopState::Tools { cycle }, StepEvent::ToolsExecuted) => {
                Ok(LoopState::Reasoning { cycle: cycle + 1 })
            }
            (state, event) => Err(Halt::OutOfOrder { state, event }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == LoopState::End
    }
}
