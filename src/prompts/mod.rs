pub mod query;

pub use query::{Prompt, PromptMessage, Query, Role, SYSTEM_INSTRUCTION};
