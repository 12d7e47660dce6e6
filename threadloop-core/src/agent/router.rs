use threadloop_session::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tools,
    Stop,
}

/// Decides what follows a reasoning step, looking only at the latest message.
///
/// The final-answer marker is not consulted; an assistant message that
/// requests tools always goes to the tools.
pub fn route(messages: &[Message]) -> Route {
    match messages.last() {
        Some(message) if message.requests_tools() => Route::Tools,
        _ => Route::Stop,
    }
}
