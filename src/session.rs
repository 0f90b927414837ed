use serde::{Deserialize, Serialize};

/// Text shown in the transcript while a diagnosis request is outstanding.
pub const PENDING_TEXT: &str = "I'm analyzing your symptoms...";

/// Fixed reply appended when the diagnosis service fails in any way.
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error processing your symptoms. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single transcript entry. Messages are never mutated after creation; the
/// one exception is the pending placeholder, which is removed (not edited)
/// once its response settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub pending: bool,
}

/// State machine for one chat session on the Diagnose screen.
///
/// Transitions are `submit` (Idle -> AwaitingResponse) and `resolve`/`fail`
/// (AwaitingResponse -> Idle). The at-most-one-outstanding-request rule is
/// enforced here, not by the UI: `submit` refuses while a placeholder exists.
/// The session owns the draft input as well, so the whole thing can be driven
/// and tested without a terminal.
///
/// A session lives as long as the Diagnose screen is shown and is dropped
/// when the user navigates away; nothing persists.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    draft: String,
    draft_cursor: usize, // char index into draft
    in_flight: bool,
}

/// Convert a character index to a byte index for UTF-8 safe string edits.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_cursor(&self) -> usize {
        self.draft_cursor
    }

    /// True while exactly one diagnosis request is outstanding.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Take the draft and move to `AwaitingResponse`.
    ///
    /// Returns the text to send to the diagnosis service, or `None` when the
    /// draft is empty/whitespace-only or a request is already in flight. On
    /// success the user message and a pending assistant placeholder are
    /// appended and the draft is cleared immediately, independent of when the
    /// response arrives.
    pub fn submit(&mut self) -> Option<String> {
        if self.in_flight || self.draft.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.draft);
        self.draft_cursor = 0;
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: text.clone(),
            pending: false,
        });
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            text: PENDING_TEXT.to_string(),
            pending: true,
        });
        self.in_flight = true;
        Some(text)
    }

    /// Settle the outstanding request with the service's reply.
    pub fn resolve(&mut self, reply: String) {
        self.settle(reply);
    }

    /// Settle the outstanding request as failed. Transport errors, non-2xx
    /// statuses and decode errors all land here; the user sees one fixed
    /// apology and the session returns to Idle so they can retry.
    pub fn fail(&mut self) {
        self.settle(ERROR_REPLY.to_string());
    }

    fn settle(&mut self, reply: String) {
        self.messages.retain(|m| !m.pending);
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            text: reply,
            pending: false,
        });
        self.in_flight = false;
    }

    // Draft editing

    pub fn insert_char(&mut self, c: char) {
        let at = char_to_byte_index(&self.draft, self.draft_cursor);
        self.draft.insert(at, c);
        self.draft_cursor += 1;
    }

    pub fn delete_back(&mut self) {
        if self.draft_cursor > 0 {
            self.draft_cursor -= 1;
            let at = char_to_byte_index(&self.draft, self.draft_cursor);
            self.draft.remove(at);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.draft_cursor < self.draft.chars().count() {
            let at = char_to_byte_index(&self.draft, self.draft_cursor);
            self.draft.remove(at);
        }
    }

    pub fn cursor_left(&mut self) {
        self.draft_cursor = self.draft_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.draft.chars().count();
        self.draft_cursor = (self.draft_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.draft_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.draft_cursor = self.draft.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_draft(text: &str) -> ChatSession {
        let mut session = ChatSession::new();
        for c in text.chars() {
            session.insert_char(c);
        }
        session
    }

    fn pending_count(session: &ChatSession) -> usize {
        session.messages().iter().filter(|m| m.pending).count()
    }

    #[test]
    fn blank_submissions_are_ignored() {
        for draft in ["", "   ", "\t \n"] {
            let mut session = session_with_draft(draft);
            assert_eq!(session.submit(), None);
            assert!(session.messages().is_empty());
            assert!(!session.in_flight());
        }
    }

    #[test]
    fn submit_appends_user_message_and_placeholder() {
        let mut session = session_with_draft("I have a headache");
        let payload = session.submit();

        assert_eq!(payload.as_deref(), Some("I have a headache"));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].role, ChatRole::User);
        assert_eq!(session.messages()[0].text, "I have a headache");
        assert!(!session.messages()[0].pending);
        assert_eq!(session.messages()[1].role, ChatRole::Assistant);
        assert_eq!(session.messages()[1].text, PENDING_TEXT);
        assert!(session.messages()[1].pending);
        assert!(session.in_flight());
        assert!(session.draft().is_empty());
    }

    #[test]
    fn placeholder_is_unique_and_last() {
        let mut session = session_with_draft("fever and chills");
        session.submit();

        assert_eq!(pending_count(&session), 1);
        assert!(session.messages().last().map(|m| m.pending).unwrap_or(false));
    }

    #[test]
    fn submit_while_in_flight_is_a_noop() {
        let mut session = session_with_draft("sore throat");
        session.submit();

        for c in "also a cough".chars() {
            session.insert_char(c);
        }
        assert_eq!(session.submit(), None);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(pending_count(&session), 1);
        // The second draft is kept for after the round trip settles.
        assert_eq!(session.draft(), "also a cough");
    }

    #[test]
    fn resolve_replaces_placeholder_with_reply() {
        let mut session = session_with_draft("mild fever");
        session.submit();
        session.resolve("Take rest.".to_string());

        let last = session.messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, "Take rest.");
        assert!(!last.pending);
        assert_eq!(pending_count(&session), 0);
        assert!(!session.in_flight());
    }

    #[test]
    fn failure_appends_fixed_apology() {
        let mut session = session_with_draft("chest pain");
        session.submit();
        session.fail();

        let last = session.messages().last().unwrap();
        assert_eq!(last.text, ERROR_REPLY);
        assert!(!last.pending);
        assert!(!session.in_flight());
    }

    #[test]
    fn each_round_trip_grows_transcript_by_two() {
        let mut session = ChatSession::new();
        for (symptoms, reply) in [("headache", "Drink water."), ("fatigue", "Take rest.")] {
            for c in symptoms.chars() {
                session.insert_char(c);
            }
            session.submit();
            session.resolve(reply.to_string());
            assert!(session.draft().is_empty());
            assert!(!session.in_flight());
        }
        assert_eq!(session.messages().len(), 4);
        assert_eq!(pending_count(&session), 0);
    }

    #[test]
    fn session_accepts_retry_after_failure() {
        let mut session = session_with_draft("dizzy");
        session.submit();
        session.fail();

        for c in "still dizzy".chars() {
            session.insert_char(c);
        }
        assert!(session.submit().is_some());
        assert!(session.in_flight());
        assert_eq!(session.messages().len(), 4);
    }

    #[test]
    fn draft_editing_is_utf8_safe() {
        let mut session = ChatSession::new();
        for c in "héllo".chars() {
            session.insert_char(c);
        }
        session.cursor_left();
        session.cursor_left();
        session.insert_char('w');
        assert_eq!(session.draft(), "hélwlo");

        session.delete_back();
        assert_eq!(session.draft(), "héllo");

        session.cursor_home();
        session.delete_forward();
        assert_eq!(session.draft(), "éllo");

        session.cursor_end();
        session.delete_back();
        assert_eq!(session.draft(), "éll");
    }
}
