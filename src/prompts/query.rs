use serde::Serialize;

/// Fixed instruction sent ahead of every question.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant. Please response to the user queries";

/// One user submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub question: String,
}

impl Query {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// A role-tagged message segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// The system instruction followed by the user's question.
///
/// Only [`Prompt::for_query`] builds one, so a prompt always holds exactly
/// one system message and then exactly one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    messages: [PromptMessage; 2],
}

impl Prompt {
    pub fn for_query(query: &Query) -> Self {
        Self {
            messages: [
                PromptMessage {
                    role: Role::System,
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                PromptMessage {
                    role: Role::User,
                    content: query.question.clone(),
                },
            ],
        }
    }

    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    pub fn system(&self) -> &str {
        &self.messages[0].content
    }

    pub fn question(&self) -> &str {
        &self.messages[1].content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_then_user() {
        let prompt = Prompt::for_query(&Query::new("hi"));
        let roles: Vec<Role> = prompt.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
    }

    #[test]
    fn user_content_is_the_literal_question() {
        let prompt = Prompt::for_query(&Query::new("What is the capital of France?"));
        assert_eq!(prompt.question(), "What is the capital of France?");
        assert!(!prompt.question().starts_with("Question:"));
    }

    #[test]
    fn system_content_is_fixed() {
        let a = Prompt::for_query(&Query::new("one"));
        let b = Prompt::for_query(&Query::new("two"));
        assert_eq!(a.system(), SYSTEM_INSTRUCTION);
        assert_eq!(a.system(), b.system());
    }

    #[test]
    fn empty_question_still_builds_two_messages() {
        let prompt = Prompt::for_query(&Query::new(""));
        assert_eq!(prompt.messages().len(), 2);
        assert_eq!(prompt.question(), "");
    }

    #[test]
    fn whitespace_is_preserved() {
        let prompt = Prompt::for_query(&Query::new("  spaced out \n"));
        assert_eq!(prompt.question(), "  spaced out \n");
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&Prompt::for_query(&Query::new("q")).messages()).unwrap();
        assert_eq!(
            json,
            format!(r#"[{{"role":"system","content":"{SYSTEM_INSTRUCTION}"}},{{"role":"user","content":"q"}}]"#)
        );
    }
}
