//! Application constants

/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

/// Text returned by `GET /`.
pub const SERVER_BANNER: &str = "threadloop agent server";
