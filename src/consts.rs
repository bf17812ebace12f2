//! Project-wide constants.

use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");

/// Default Gemini model when none is specified.
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Gemini REST API base.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// LangSmith API base.
pub const DEFAULT_TRACE_ENDPOINT: &str = "https://api.smith.langchain.com";

/// How long one run upload may take before it is abandoned.
pub const DEFAULT_TRACE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long shutdown waits for run uploads still in flight.
pub const TRACE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracing project runs are filed under when none is given.
pub const DEFAULT_PROJECT: &str = "default";

/// Environment variable holding the Gemini API key.
pub const MODEL_KEY_VAR: &str = "GEM_API_KEY";

/// Environment variable holding the tracing-service API key.
pub const TRACING_KEY_VAR: &str = "LANG_API";

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
