//! Model clients

mod gemini;
mod openai;
mod transport;

pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
