use crate::clock::Timestamp;
use crate::ids::{MessageId, SessionId};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Author {
    User,
    Assistant,
}

/// One utterance. Content never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub content: String,
    pub created_at: Timestamp,
}

impl Message {
    pub fn new(
        id: MessageId,
        author: Author,
        content: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            created_at,
        }
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// One chat conversation with an append-only history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    title: String,
    messages: Vec<Message>,
    created_at: Timestamp,
    last_activity_at: Timestamp,
}

impl Session {
    pub(crate) fn new(id: SessionId, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id,
            title: title.into(),
            messages: Vec::new(),
            created_at,
            last_activity_at: created_at,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn push(&mut self, message: Message) {
        // Activity never trails the newest message, even if the clock stepped backwards.
        self.last_activity_at = self.last_activity_at.max(message.created_at);
        self.messages.push(message);
    }
}
