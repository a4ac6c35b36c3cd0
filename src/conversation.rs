//! Session-scoped chat history and draft input.
//!
//! The conversation is append-only for the lifetime of the process; nothing
//! is persisted across runs. Messages are never edited or reordered after
//! they are pushed.

use serde::{Deserialize, Serialize};

/// The sender of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in the conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered message history for the current session. Unbounded.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

/// In-progress user input: the text being typed plus at most one staged
/// image reference and one staged file name.
///
/// Attachments are recorded locally as placeholder messages on submit and
/// are never uploaded to the completion API.
#[derive(Debug, Default)]
pub struct Draft {
    pub text: String,
    /// Cursor position as a char index into `text`.
    pub cursor: usize,
    pub image: Option<String>,
    pub file: Option<String>,
}

impl Draft {
    /// True when there is nothing to submit: no non-blank text and no
    /// staged attachment.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none() && self.file.is_none()
    }

    pub fn has_attachment(&self) -> bool {
        self.image.is_some() || self.file.is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.image = None;
        self.file = None;
    }
}

/// Placeholder content recorded for a staged image.
pub fn image_placeholder(reference: &str) -> String {
    format!("[Image: {reference}]")
}

/// Placeholder content recorded for a staged file.
pub fn file_placeholder(name: &str) -> String {
    format!("[File: {name}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut convo = Conversation::new();
        convo.push(Message::user("first"));
        convo.push(Message::assistant("second"));
        convo.push(Message::user("third"));

        let contents: Vec<&str> = convo.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(convo.messages()[0].role, Role::User);
        assert_eq!(convo.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_clear_empties_conversation() {
        let mut convo = Conversation::new();
        convo.push(Message::user("hello"));
        convo.clear();
        assert!(convo.is_empty());
        assert_eq!(convo.len(), 0);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn test_blank_draft_is_empty() {
        let mut draft = Draft::default();
        assert!(draft.is_empty());
        draft.text = "   \n\t".to_string();
        assert!(draft.is_empty());
    }

    #[test]
    fn test_attachment_alone_makes_draft_non_empty() {
        let mut draft = Draft::default();
        draft.image = Some("photo.png".to_string());
        assert!(!draft.is_empty());

        let mut draft = Draft::default();
        draft.file = Some("notes.txt".to_string());
        assert!(!draft.is_empty());
    }

    #[test]
    fn test_draft_clear_drops_attachments() {
        let mut draft = Draft {
            text: "hello".to_string(),
            cursor: 5,
            image: Some("a.png".to_string()),
            file: Some("b.txt".to_string()),
        };
        draft.clear();
        assert!(draft.is_empty());
        assert_eq!(draft.cursor, 0);
    }

    #[test]
    fn test_placeholder_formats() {
        assert_eq!(image_placeholder("blob:1234"), "[Image: blob:1234]");
        assert_eq!(file_placeholder("report.pdf"), "[File: report.pdf]");
    }
}
