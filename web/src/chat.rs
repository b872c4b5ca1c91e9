//! The assistant panel's conversation. Replies are canned until a chat
//! backend exists.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const GREETING: &str = "안녕하세요! 실버타운, 요양원, 양로원 찾기를 도와드릴까요?";
pub const PLACEHOLDER_REPLY: &str =
    "더 자세한 정보가 필요하시면 말씀해주세요. 어떤 지역의 시설을 찾고 계신가요?";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub is_bot: bool,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    open: bool,
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Closed, with the greeting already in place.
    pub fn new() -> Self {
        let mut session = Self {
            open: false,
            messages: Vec::new(),
            next_id: 1,
        };
        session.push(GREETING, true);
        session
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Appends `input` and the bot's reply. Blank input is dropped.
    pub fn send(&mut self, input: &str) -> bool {
        if input.trim().is_empty() {
            return false;
        }

        self.push(input, false);
        self.push(PLACEHOLDER_REPLY, true);
        debug!("Chat now holds {} messages", self.messages.len());
        true
    }

    fn push(&mut self, text: &str, is_bot: bool) {
        self.messages.push(ChatMessage {
            id: self.next_id,
            text: text.to_string(),
            is_bot,
        });
        self.next_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed_with_greeting() {
        let chat = ChatSession::new();
        assert!(!chat.is_open());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, GREETING);
        assert!(chat.messages()[0].is_bot);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut chat = ChatSession::new();
        assert!(!chat.send(""));
        assert!(!chat.send("  \n\t"));
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn each_message_gets_a_reply() {
        let mut chat = ChatSession::new();
        assert!(chat.send(" 강남 실버타운 "));
        assert!(chat.send("가격은요?"));

        let messages = chat.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1].text, " 강남 실버타운 ");
        assert!(!messages[1].is_bot);
        assert_eq!(messages[2].text, PLACEHOLDER_REPLY);
        assert!(messages[2].is_bot);
        assert_eq!(
            messages.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn toggling_keeps_the_conversation() {
        let mut chat = ChatSession::new();
        assert!(chat.toggle());
        chat.send("안녕하세요");
        chat.close();
        assert!(!chat.is_open());
        chat.open();
        assert_eq!(chat.messages().len(), 3);
    }
}
