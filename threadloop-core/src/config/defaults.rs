pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PROVIDER_ID: &str = "gemini";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are helpful HR Chatbot Agent";
pub const DEFAULT_RECURSION_LIMIT: usize = 15;
pub const DEFAULT_REASONING_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_CHECKPOINT_PATH: &str = "data/checkpoints.sqlite";
pub const DEFAULT_SEARCH_INDEX: &str = "vector_index";
pub const DEFAULT_SEARCH_RESULTS: usize = 10;

/// Marker the model is asked to put in front of a finished answer.
pub const FINAL_ANSWER_MARKER: &str = "FINAL ANSWER";

pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"You are a helpful AI assistant, collaborating with other assistants.
Use the provided tools to progress towards answering the question.
If you are unable to fully answer, that's OK, another assistant with different tools will help where you left off.
Execute what you can to make progress.
If you or any of the other assistants have the final answer or deliverable, prefix your response with FINAL ANSWER so the team knows to stop.
You have access to the following tools: {{tool_names}}.
{{system_message}}
Current time: {{time}}."#;
