/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Message history plus the routing flag set by each pipeline stage.
///
/// Messages are append-only: stages read the last message and push a new
/// one, history from earlier turns is never rewritten.
pub struct ConversationState {
    messages: Vec<Message>,
    valid_input: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            valid_input: false,
        }
    }

    pub fn add_user_message(&mut self, content: &str) {
        self.messages.push(Message::user(content));
    }

    pub fn add_assistant_message(&mut self, content: &str) {
        self.messages.push(Message::assistant(content));
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn valid_input(&self) -> bool {
        self.valid_input
    }

    pub fn set_valid_input(&mut self, valid: bool) {
        self.valid_input = valid;
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_invalid() {
        let state = ConversationState::new();
        assert!(state.get_messages().is_empty());
        assert!(state.last_message().is_none());
        assert!(!state.valid_input());
    }

    #[test]
    fn appends_preserve_order_and_roles() {
        let mut state = ConversationState::new();
        state.add_user_message("best beaches in Portugal");
        state.add_assistant_message("Portugal beaches");

        let messages = state.get_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(state.last_message().unwrap().content, "Portugal beaches");
    }

    #[test]
    fn valid_input_flag_round_trips() {
        let mut state = ConversationState::new();
        state.set_valid_input(true);
        assert!(state.valid_input());
        state.set_valid_input(false);
        assert!(!state.valid_input());
    }
}
