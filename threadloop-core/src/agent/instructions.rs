use chrono::{DateTime, SecondsFormat, Utc};

/// Fills the instruction template.
///
/// Recognised placeholders are `{{tool_names}}`, `{{system_message}}` and
/// `{{time}}`; anything else is left as written.
pub fn render_instructions(
    template: &str,
    tool_names: &str,
    system_message: &str,
    now: DateTime<Utc>,
) -> String {
    let tool_names = if tool_names.is_empty() {
        "none"
    } else {
        tool_names
    };
    template
        .replace("{{tool_names}}", tool_names)
        .replace("{{system_message}}", system_message)
        .replace("{{time}}", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
}
