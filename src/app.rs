use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::conversation::{self, Conversation, Draft, Message};
use crate::error::ChatError;
use crate::openai::OpenAIClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Whole-session UI state: the conversation, the draft being composed, and
/// the single in-flight completion task.
pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    pub conversation: Conversation,
    pub draft: Draft,

    /// True from submission until the reply (or error) is appended.
    pub loading: bool,
    chat_task: Option<JoinHandle<Result<String, ChatError>>>,

    // Transcript scroll state; height/width are recorded during render
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    /// 0-2, drives the "Thinking..." ellipsis.
    pub animation_frame: u8,

    pub client: OpenAIClient,
}

impl App {
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            conversation: Conversation::new(),
            draft: Draft::default(),
            loading: false,
            chat_task: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            client,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.chat_task.is_some()
    }

    /// Submit the current draft.
    ///
    /// Rejected when the draft is empty or a request is already in flight
    /// (single-flight: at most one outstanding call per session). Staged
    /// attachments become local placeholder messages; only non-blank text
    /// triggers a network exchange.
    pub fn submit(&mut self) {
        if self.draft.is_empty() || self.in_flight() {
            return;
        }

        if let Some(reference) = self.draft.image.take() {
            self.conversation
                .push(Message::user(conversation::image_placeholder(&reference)));
        }
        if let Some(name) = self.draft.file.take() {
            self.conversation
                .push(Message::user(conversation::file_placeholder(&name)));
        }

        if !self.draft.text.trim().is_empty() {
            self.conversation.push(Message::user(self.draft.text.clone()));
            self.loading = true;
            self.input_mode = InputMode::Normal;

            // Snapshot the history as of this submission
            let history: Vec<Message> = self.conversation.messages().to_vec();
            let client = self.client.clone();
            info!(turns = self.conversation.len(), "submitting conversation");
            self.chat_task = Some(tokio::spawn(async move { client.complete(&history).await }));
        }

        self.draft.clear();
        self.scroll_to_bottom();
    }

    /// Fold a finished completion task back into the conversation.
    ///
    /// Taking the handle drops the busy state on every outcome; failures
    /// are appended as an assistant message rather than raised.
    pub async fn poll_completion(&mut self) {
        let finished = self.chat_task.as_ref().is_some_and(JoinHandle::is_finished);
        if !finished {
            return;
        }
        let Some(task) = self.chat_task.take() else {
            return;
        };

        let content = match task.await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                warn!(error = %err, "completion failed");
                format!("Error: {err}")
            }
            Err(err) => {
                warn!(error = %err, "completion task panicked");
                format!("Error: {err}")
            }
        };

        self.conversation.push(Message::assistant(content));
        self.loading = false;
        self.scroll_to_bottom();
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        self.chat_scroll = 0;
    }

    /// Tick animation frame (called by the Tick event).
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = (self.chat_scroll + 1).min(self.max_scroll());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let visible = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.transcript_lines().saturating_sub(visible)
    }

    /// Estimate of rendered transcript height, accounting for wrapping.
    fn transcript_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;
        for msg in self.conversation.messages() {
            total += 1; // role line ("You:" or "AI:")
            for line in msg.content.lines() {
                // Char count, not byte length, for UTF-8 content
                let chars = line.chars().count();
                total += if chars == 0 {
                    1
                } else {
                    ((chars / wrap_width) + 1) as u16
                };
            }
            total += 1; // blank line after message
        }

        if self.loading {
            total += 2; // "AI:" + "Thinking..."
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::openai::{DEFAULT_MODEL, OpenAIClient};

    fn keyless_app() -> App {
        // No API key: submissions spawn a task that fails without touching
        // the network.
        App::new(OpenAIClient::new(None, "http://192.0.2.1", DEFAULT_MODEL))
    }

    async fn wait_for_reply(app: &mut App) {
        while app.in_flight() {
            app.poll_completion().await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_submit_appends_user_message_synchronously() {
        let mut app = keyless_app();
        app.draft.text = "hello".to_string();
        app.submit();

        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.conversation.messages()[0].role, Role::User);
        assert_eq!(app.conversation.messages()[0].content, "hello");
        assert!(app.loading);
        assert!(app.in_flight());
        assert!(app.draft.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_appends_error_message() {
        let mut app = keyless_app();
        app.draft.text = "hello".to_string();
        app.submit();
        wait_for_reply(&mut app).await;

        assert_eq!(app.conversation.len(), 2);
        let reply = &app.conversation.messages()[1];
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.starts_with("Error:"));
        assert!(reply.content.contains("API key not configured"));
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_second_submit_blocked_while_in_flight() {
        let mut app = keyless_app();
        app.draft.text = "one".to_string();
        app.submit();
        assert!(app.in_flight());

        app.draft.text = "two".to_string();
        app.submit();

        // Second submission was rejected: no new message, draft untouched
        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.draft.text, "two");

        wait_for_reply(&mut app).await;
        assert_eq!(app.conversation.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_draft_rejected() {
        let mut app = keyless_app();
        app.draft.text = "   ".to_string();
        app.submit();

        assert!(app.conversation.is_empty());
        assert!(!app.in_flight());
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_attachment_only_submit_records_placeholders_without_network() {
        let mut app = keyless_app();
        app.draft.image = Some("photo.png".to_string());
        app.draft.file = Some("notes.txt".to_string());
        app.submit();

        let contents: Vec<&str> = app
            .conversation
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["[Image: photo.png]", "[File: notes.txt]"]);
        assert!(app.conversation.messages().iter().all(|m| m.role == Role::User));
        assert!(!app.in_flight());
        assert!(!app.loading);
        assert!(app.draft.is_empty());
    }

    #[tokio::test]
    async fn test_attachments_precede_text_message() {
        let mut app = keyless_app();
        app.draft.text = "see attached".to_string();
        app.draft.image = Some("a.png".to_string());
        app.submit();

        assert_eq!(app.conversation.len(), 2);
        assert_eq!(app.conversation.messages()[0].content, "[Image: a.png]");
        assert_eq!(app.conversation.messages()[1].content, "see attached");
        assert!(app.in_flight());

        wait_for_reply(&mut app).await;
    }

    #[tokio::test]
    async fn test_clear_conversation_resets_history() {
        let mut app = keyless_app();
        app.draft.text = "hello".to_string();
        app.submit();
        wait_for_reply(&mut app).await;

        app.clear_conversation();
        assert!(app.conversation.is_empty());
        assert_eq!(app.chat_scroll, 0);
    }
}
