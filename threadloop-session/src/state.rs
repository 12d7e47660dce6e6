use crate::error::MessageError;
use crate::message::{Message, MessageRole};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Generates a thread id from the current request time.
///
/// A short random suffix keeps ids unique when two requests land in the
/// same millisecond.
pub fn generate_thread_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// Ordered, append-only history of one conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    thread_id: String,
    #[serde(default)]
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            messages: Vec::new(),
        }
    }

    /// Rebuilds a state from persisted messages.
    pub fn restore(thread_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            thread_id: thread_id.into(),
            messages,
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Whether `self` is `earlier` with zero or more messages appended.
    pub fn extends(&self, earlier: &[Message]) -> bool {
        self.messages.len() >= earlier.len() && self.messages[..earlier.len()] == *earlier
    }

    /// Checks that every tool result answers the next outstanding call of the
    /// assistant message that precedes it, in call order.
    ///
    /// Calls left unanswered before a later human or assistant message are
    /// tolerated; that happens when an invocation stops at the cycle limit.
    pub fn validate(&self) -> Result<(), MessageError> {
        let mut outstanding: VecDeque<&str> = VecDeque::new();

        for (index, message) in self.messages.iter().enumerate() {
            match message.role {
                MessageRole::Assistant => {
                    outstanding = message
                        .tool_calls
                        .iter()
                        .map(|call| call.call_id.as_str())
                        .collect();
                }
                MessageRole::Human => outstanding.clear(),
                MessageRole::ToolResult => {
                    let Some(reply_to) = message.in_reply_to.as_deref() else {
                        return Err(MessageError::MissingReplyTarget { index });
                    };
                    match outstanding.pop_front() {
                        Some(expected) if expected == reply_to => {}
                        Some(expected) => {
                            return Err(MessageError::UnexpectedReply {
                                index,
                                expected: expected.to_string(),
                                found: reply_to.to_string(),
                            });
                        }
                        None => {
                            return Err(MessageError::OrphanToolResult {
                                index,
                                call_id: reply_to.to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
